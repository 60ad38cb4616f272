//! Lineage Resolver — ancestor reconstruction over the ledger
//!
//! Walks producing blocks through the genome index: a genome's producing
//! block, then its first parent's ancestry, then its second parent's. A
//! genome with no producing block is a founder and ends its branch. A
//! visited set keeps corrupted or self-referencing data from looping.

use crate::block::BreedingEvent;
use crate::diagnostics::Diagnostic;
use crate::ledger::BreedingLedger;
use std::collections::HashSet;

/// One node of an ancestor tree
#[derive(Debug, Clone, PartialEq)]
pub enum LineageNode<'a> {
    /// No recorded producing event
    Founder { genome_hash: String },
    /// Produced by a recorded cross or genesis block
    Bred {
        genome_hash: String,
        event: &'a BreedingEvent,
        parents: Vec<LineageNode<'a>>,
    },
    /// Already shown elsewhere in the tree
    Repeated { genome_hash: String },
}

impl LineageNode<'_> {
    pub fn genome_hash(&self) -> &str {
        match self {
            LineageNode::Founder { genome_hash }
            | LineageNode::Bred { genome_hash, .. }
            | LineageNode::Repeated { genome_hash } => genome_hash,
        }
    }

    /// Number of recorded events in this subtree
    pub fn event_count(&self) -> usize {
        match self {
            LineageNode::Bred { parents, .. } => {
                1 + parents.iter().map(|p| p.event_count()).sum::<usize>()
            }
            _ => 0,
        }
    }
}

/// Tree node whose parents are still being built
struct OpenNode<'a> {
    genome_hash: String,
    event: &'a BreedingEvent,
    /// Parents not yet visited, next one last
    pending: Vec<&'a str>,
    parents: Vec<LineageNode<'a>>,
}

enum Visit<'a> {
    Leaf(LineageNode<'a>),
    Open(OpenNode<'a>),
}

/// Read-only ancestry queries against one ledger
pub struct LineageResolver<'a> {
    ledger: &'a BreedingLedger,
}

impl<'a> LineageResolver<'a> {
    pub fn new(ledger: &'a BreedingLedger) -> Self {
        Self { ledger }
    }

    /// Ancestor blocks oldest first; the block producing `genome_hash` is last
    pub fn get_lineage(&self, genome_hash: &str) -> Vec<&'a BreedingEvent> {
        let (mut events, _) = self.walk(genome_hash);
        events.reverse();
        events
    }

    /// Genomes reached by the walk that have no producing block
    pub fn founders(&self, genome_hash: &str) -> Vec<String> {
        self.walk(genome_hash).1
    }

    /// Nested ancestor tree rooted at `genome_hash`.
    ///
    /// Built depth-first on an explicit stack; the open nodes are the path
    /// from the root, so a genome reappearing on it is a cycle.
    pub fn lineage_tree(&self, genome_hash: &str) -> LineageNode<'a> {
        let mut shown = HashSet::new();
        let mut open = match self.visit(genome_hash, &mut shown, &[]) {
            Visit::Open(node) => vec![node],
            Visit::Leaf(leaf) => return leaf,
        };

        loop {
            let top = open.len() - 1;
            match open[top].pending.pop() {
                Some(parent) => match self.visit(parent, &mut shown, &open) {
                    Visit::Open(node) => open.push(node),
                    Visit::Leaf(leaf) => open[top].parents.push(leaf),
                },
                None => {
                    let done = open.remove(top);
                    let node = LineageNode::Bred {
                        genome_hash: done.genome_hash,
                        event: done.event,
                        parents: done.parents,
                    };
                    match open.last_mut() {
                        Some(child) => child.parents.push(node),
                        None => return node,
                    }
                }
            }
        }
    }

    /// Pre-order walk. Returns producing blocks in discovery order and the
    /// founder genomes met along the way.
    fn walk(&self, genome_hash: &str) -> (Vec<&'a BreedingEvent>, Vec<String>) {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut events = Vec::new();
        let mut founders = Vec::new();
        let mut stack: Vec<&str> = vec![genome_hash];

        while let Some(hash) = stack.pop() {
            if hash.is_empty() || !visited.insert(hash) {
                continue;
            }
            let block = match self.ledger.producing_event(hash) {
                Some(block) => block,
                None => {
                    founders.push(hash.to_string());
                    continue;
                }
            };
            events.push(block);
            // parent 1 is popped first
            stack.push(block.parent_hash_2.as_str());
            stack.push(block.parent_hash_1.as_str());
        }
        (events, founders)
    }

    fn visit(&self, genome_hash: &str, shown: &mut HashSet<String>, path: &[OpenNode<'a>]) -> Visit<'a> {
        if path.iter().any(|open| open.genome_hash == genome_hash) {
            self.ledger.report(Diagnostic::LineageCycle { genome_hash: genome_hash.to_string() });
            return Visit::Leaf(LineageNode::Repeated { genome_hash: genome_hash.to_string() });
        }
        if !shown.insert(genome_hash.to_string()) {
            return Visit::Leaf(LineageNode::Repeated { genome_hash: genome_hash.to_string() });
        }
        let event = match self.ledger.producing_event(genome_hash) {
            Some(event) => event,
            None => return Visit::Leaf(LineageNode::Founder { genome_hash: genome_hash.to_string() }),
        };
        let mut pending = event.parent_hashes();
        // parent 1 is popped first
        pending.reverse();
        Visit::Open(OpenNode { genome_hash: genome_hash.to_string(), event, pending, parents: Vec::new() })
    }
}
