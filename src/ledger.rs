//! BreedingLedger — append-only chain of breeding events
//!
//! The block sequence is the only source of truth. The three indexes
//! (block hash, genome hash, generation) are projections of it and are
//! rebuilt by replay whenever the sequence is loaded.
//!
//! The ledger is not internally synchronised. Appends take `&mut self`;
//! an embedder sharing it across threads wraps it in a lock.

use crate::block::{BreedingEvent, GENESIS_GENERATION};
use crate::config::{LedgerConfig, RecoveryPolicy};
use crate::diagnostics::{Diagnostic, DiagnosticsSink, LogSink};
use crate::error::{CorruptionError, CorruptionKind, ValidationError};
use crate::lineage::LineageResolver;
use crate::pow::{meets_difficulty, validate_block_pow};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Aggregate numbers for status displays
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerStats {
    pub chain_length: usize,
    pub genesis_blocks: usize,
    pub unique_genomes: usize,
    pub breeders: usize,
    pub max_generation: u32,
    pub quarantined: usize,
}

pub struct BreedingLedger {
    config: LedgerConfig,
    blocks: Vec<BreedingEvent>,
    /// block_hash -> position in `blocks`
    hash_index: HashMap<String, usize>,
    /// genome hash -> positions of blocks producing or consuming it
    genome_index: HashMap<String, Vec<usize>>,
    /// offspring genome hash -> declared generation
    generation_cache: HashMap<String, u32>,
    /// Blocks cut off by `RecoveryPolicy::QuarantineSuffix`
    quarantined: Vec<BreedingEvent>,
    sink: Arc<dyn DiagnosticsSink>,
}

impl BreedingLedger {
    /// Empty ledger reporting through the `log` facade
    pub fn new(config: LedgerConfig) -> Self {
        Self::with_sink(config, Arc::new(LogSink))
    }

    /// Empty ledger with an injected diagnostics sink
    pub fn with_sink(config: LedgerConfig, sink: Arc<dyn DiagnosticsSink>) -> Self {
        Self {
            config,
            blocks: Vec::new(),
            hash_index: HashMap::new(),
            genome_index: HashMap::new(),
            generation_cache: HashMap::new(),
            quarantined: Vec::new(),
            sink,
        }
    }

    /// Rebuild a ledger from a persisted block sequence.
    ///
    /// Indexes are replayed, then the chain is audited once. A corrupt chain
    /// is rejected under `FailClosed`; under `QuarantineSuffix` the first bad
    /// block and everything after it move to [`quarantined`](Self::quarantined).
    pub fn from_blocks(
        config: LedgerConfig,
        blocks: Vec<BreedingEvent>,
        sink: Arc<dyn DiagnosticsSink>,
    ) -> Result<Self, CorruptionError> {
        let mut ledger = Self::with_sink(config, sink);
        ledger.blocks = blocks;
        ledger.replay_indexes();

        let err = match ledger.audit_chain() {
            Ok(()) => {
                ledger.report(Diagnostic::IndexesRebuilt { blocks: ledger.blocks.len() });
                return Ok(ledger);
            }
            Err(err) => err,
        };
        match ledger.config.recovery {
            RecoveryPolicy::FailClosed => Err(err),
            RecoveryPolicy::QuarantineSuffix => {
                ledger.quarantined = ledger.blocks.split_off(err.index);
                ledger.rebuild_indexes();
                ledger.report(Diagnostic::Quarantined {
                    kept: ledger.blocks.len(),
                    quarantined: ledger.quarantined.len(),
                });
                Ok(ledger)
            }
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn difficulty(&self) -> usize {
        self.config.difficulty
    }

    /// Validate and append. On error nothing is changed.
    pub fn add_block(&mut self, block: BreedingEvent) -> Result<(), ValidationError> {
        if let Err(reason) = self.check_block(&block) {
            self.report(Diagnostic::BlockRejected { reason: reason.clone() });
            return Err(reason);
        }
        let index = self.blocks.len();
        self.index_block(index, &block);
        let block_hash = block.block_hash.clone();
        self.blocks.push(block);
        self.report(Diagnostic::BlockAppended { index, block_hash });
        Ok(())
    }

    pub fn validate_block(&self, block: &BreedingEvent) -> bool {
        self.check_block(block).is_ok()
    }

    /// Admission checks in order: work, parents, content hash, duplicates, linkage.
    /// Only a genesis block opening an empty chain is exempt from linkage.
    pub fn check_block(&self, block: &BreedingEvent) -> Result<(), ValidationError> {
        if !validate_block_pow(block, self.config.difficulty) {
            return Err(ValidationError::InsufficientWork);
        }
        if !block.is_genesis() && !self.blocks.is_empty() {
            let known = block.parent_hashes().iter().any(|p| self.is_known_parent(p));
            if !known {
                return Err(ValidationError::UnknownParents);
            }
        }
        if !block.verify_hash() {
            return Err(ValidationError::HashMismatch);
        }
        if self.hash_index.contains_key(&block.block_hash) {
            return Err(ValidationError::Duplicate);
        }
        let links = !block.is_genesis() || !self.blocks.is_empty();
        if links && block.previous_block_hash != self.tail_hash() {
            return Err(ValidationError::BrokenLinkage);
        }
        Ok(())
    }

    /// True when the whole chain passes its audit
    pub fn validate_chain(&self) -> bool {
        self.audit_chain().is_ok()
    }

    /// Re-check every stored block: content hash, work, linkage to its
    /// predecessor and uniqueness. Reports and returns the first failing index.
    pub fn audit_chain(&self) -> Result<(), CorruptionError> {
        let result = audit_blocks(&self.blocks, self.config.difficulty);
        if let Err(err) = &result {
            self.report(Diagnostic::ChainCorrupted { index: err.index, kind: err.kind });
        }
        result
    }

    /// Drop and replay all indexes from the block sequence
    pub fn rebuild_indexes(&mut self) {
        self.replay_indexes();
        self.report(Diagnostic::IndexesRebuilt { blocks: self.blocks.len() });
    }

    fn replay_indexes(&mut self) {
        self.hash_index.clear();
        self.genome_index.clear();
        self.generation_cache.clear();
        let blocks = std::mem::take(&mut self.blocks);
        for (index, block) in blocks.iter().enumerate() {
            self.index_block(index, block);
        }
        self.blocks = blocks;
    }

    fn index_block(&mut self, index: usize, block: &BreedingEvent) {
        self.hash_index.insert(block.block_hash.clone(), index);

        let mut keys: Vec<&str> = Vec::with_capacity(3);
        for key in std::iter::once(block.offspring_genome_hash.as_str()).chain(block.parent_hashes()) {
            if !key.is_empty() && !keys.contains(&key) {
                keys.push(key);
            }
        }
        for key in keys {
            self.genome_index.entry(key.to_string()).or_default().push(index);
        }

        if !block.offspring_genome_hash.is_empty() {
            // first producing block wins, matching `producing_event`
            self.generation_cache
                .entry(block.offspring_genome_hash.clone())
                .or_insert(block.generation);
        }
    }

    fn tail_hash(&self) -> &str {
        self.blocks.last().map(|b| b.block_hash.as_str()).unwrap_or("")
    }

    pub(crate) fn report(&self, diagnostic: Diagnostic) {
        self.sink.record(diagnostic);
    }

    /// A parent counts as known if it is a recorded block hash or the
    /// offspring genome of a recorded block
    pub fn is_known_parent(&self, hash: &str) -> bool {
        self.hash_index.contains_key(hash) || self.generation_cache.contains_key(hash)
    }

    pub fn get_block_by_hash(&self, block_hash: &str) -> Option<&BreedingEvent> {
        self.hash_index.get(block_hash).map(|&i| &self.blocks[i])
    }

    pub fn get_latest_block_hash(&self) -> Option<&str> {
        self.blocks.last().map(|b| b.block_hash.as_str())
    }

    pub fn get_chain_length(&self) -> usize {
        self.blocks.len()
    }

    /// Declared generation of the block that produced this genome
    pub fn get_generation(&self, genome_hash: &str) -> Option<u32> {
        self.generation_cache.get(genome_hash).copied()
    }

    /// Every block recorded by one breeder, in chain order
    pub fn get_player_events(&self, breeder_signature: &str) -> Vec<&BreedingEvent> {
        self.blocks
            .iter()
            .filter(|b| b.breeder_signature == breeder_signature)
            .collect()
    }

    /// Blocks producing or consuming a genome, in chain order
    pub fn events_for_genome(&self, genome_hash: &str) -> Vec<&BreedingEvent> {
        self.genome_index
            .get(genome_hash)
            .map(|positions| positions.iter().map(|&i| &self.blocks[i]).collect())
            .unwrap_or_default()
    }

    /// Earliest block whose offspring is this genome
    pub fn producing_event(&self, genome_hash: &str) -> Option<&BreedingEvent> {
        self.genome_index.get(genome_hash).and_then(|positions| {
            positions
                .iter()
                .map(|&i| &self.blocks[i])
                .find(|b| b.offspring_genome_hash == genome_hash)
        })
    }

    /// Ancestor blocks of a genome, oldest first
    pub fn get_lineage(&self, genome_hash: &str) -> Vec<&BreedingEvent> {
        LineageResolver::new(self).get_lineage(genome_hash)
    }

    /// Generation a cross of these parents should declare.
    /// Unrecorded parents count as founders.
    pub fn next_generation(&self, parent_hash_1: &str, parent_hash_2: &str) -> u32 {
        if parent_hash_1.is_empty() && parent_hash_2.is_empty() {
            return GENESIS_GENERATION;
        }
        let g1 = self.get_generation(parent_hash_1).unwrap_or(GENESIS_GENERATION);
        let g2 = self.get_generation(parent_hash_2).unwrap_or(GENESIS_GENERATION);
        g1.max(g2) + 1
    }

    /// Unsealed founder block linked to the current tail
    pub fn draft_genesis(
        &self,
        offspring_genome_hash: &str,
        breeder_signature: &str,
        strain_name: &str,
    ) -> BreedingEvent {
        BreedingEvent::genesis(offspring_genome_hash, breeder_signature, strain_name, self.tail_hash())
    }

    /// Unsealed cross linked to the current tail, with its generation filled in
    pub fn draft_cross(
        &self,
        parent_hash_1: &str,
        parent_hash_2: &str,
        offspring_genome_hash: &str,
        mutation_seed: u64,
        breeder_signature: &str,
        strain_name: &str,
    ) -> BreedingEvent {
        BreedingEvent::cross(
            parent_hash_1,
            parent_hash_2,
            offspring_genome_hash,
            mutation_seed,
            breeder_signature,
            strain_name,
            self.next_generation(parent_hash_1, parent_hash_2),
            self.tail_hash(),
        )
    }

    pub fn blocks(&self) -> &[BreedingEvent] {
        &self.blocks
    }

    pub fn quarantined(&self) -> &[BreedingEvent] {
        &self.quarantined
    }

    /// Wipe the chain and every index. Only for explicit game resets.
    pub fn clear(&mut self) {
        let removed = self.blocks.len();
        self.blocks.clear();
        self.hash_index.clear();
        self.genome_index.clear();
        self.generation_cache.clear();
        self.quarantined.clear();
        self.report(Diagnostic::Cleared { removed });
    }

    pub fn stats(&self) -> LedgerStats {
        let breeders: HashSet<&str> = self
            .blocks
            .iter()
            .map(|b| b.breeder_signature.as_str())
            .collect();
        LedgerStats {
            chain_length: self.blocks.len(),
            genesis_blocks: self.blocks.iter().filter(|b| b.is_genesis()).count(),
            unique_genomes: self.genome_index.len(),
            breeders: breeders.len(),
            max_generation: self.blocks.iter().map(|b| b.generation).max().unwrap_or(0),
            quarantined: self.quarantined.len(),
        }
    }

    pub fn summary(&self) -> String {
        let stats = self.stats();
        format!(
            "BreedingLedger | {} blocks | {} genomes | {} breeders | max F{} | difficulty {}",
            stats.chain_length, stats.unique_genomes, stats.breeders, stats.max_generation,
            self.config.difficulty
        )
    }
}

/// Audit a block sequence without building a ledger.
///
/// Every block after the first must link to its predecessor, genesis blocks
/// included. A non-genesis first block must carry an empty previous hash.
pub fn audit_blocks(blocks: &[BreedingEvent], difficulty: usize) -> Result<(), CorruptionError> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(blocks.len());
    for (index, block) in blocks.iter().enumerate() {
        let fail = |kind| Err(CorruptionError { index, kind });
        if !block.verify_hash() {
            return fail(CorruptionKind::HashMismatch);
        }
        if !meets_difficulty(&block.block_hash, difficulty) {
            return fail(CorruptionKind::InsufficientWork);
        }
        if !seen.insert(block.block_hash.as_str()) {
            return fail(CorruptionKind::DuplicateBlock);
        }
        let expected = match index {
            0 if block.is_genesis() => None,
            0 => Some(""),
            _ => Some(blocks[index - 1].block_hash.as_str()),
        };
        if expected.is_some_and(|prev| block.previous_block_hash != prev) {
            return fail(CorruptionKind::BrokenLinkage);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::MemorySink;
    use crate::testing::{append_cross, append_genesis, flip_last_char, test_ledger};

    #[test]
    fn test_empty_ledger() {
        let ledger = test_ledger(1);
        assert_eq!(ledger.get_chain_length(), 0);
        assert_eq!(ledger.get_latest_block_hash(), None);
        assert!(ledger.validate_chain());
    }

    #[test]
    fn test_genesis_admission() {
        let mut ledger = test_ledger(2);
        let block = append_genesis(&mut ledger, "h1");
        assert!(block.is_genesis());
        assert_eq!(ledger.get_chain_length(), 1);
        assert_eq!(ledger.get_latest_block_hash(), Some(block.block_hash.as_str()));
        assert_eq!(ledger.get_generation("h1"), Some(GENESIS_GENERATION));
        assert_eq!(ledger.get_block_by_hash(&block.block_hash), Some(&block));
    }

    #[test]
    fn test_scenario_unknown_second_parent() {
        let mut ledger = test_ledger(4);
        append_genesis(&mut ledger, "h1");

        let draft = BreedingEvent::cross(
            "h1", "h2", "h3", 99, "player-1", "Import Cross", 1,
            ledger.get_latest_block_hash().unwrap_or(""),
        );
        let block = crate::miner::search_nonce(draft, 4, 10_000_000).unwrap();
        assert!(ledger.validate_block(&block));
        ledger.add_block(block).unwrap();
        assert_eq!(ledger.get_generation("h3"), Some(1));
        assert!(ledger.validate_chain());
    }

    #[test]
    fn test_rejects_insufficient_work() {
        let mut ledger = test_ledger(3);
        append_genesis(&mut ledger, "h1");
        let mut draft = ledger.draft_cross("h1", "", "h2", 1, "player-1", "Weak");
        // find a nonce that does not clear the target
        let mut nonce = 0;
        while meets_difficulty(&draft.hash_with_nonce(nonce), 3) {
            nonce += 1;
        }
        draft.seal(nonce);
        assert_eq!(ledger.check_block(&draft), Err(ValidationError::InsufficientWork));
    }

    #[test]
    fn test_rejects_unknown_parents() {
        let mut ledger = test_ledger(1);
        append_genesis(&mut ledger, "h1");
        let draft = ledger.draft_cross("x1", "x2", "h9", 1, "player-1", "Orphan");
        let block = crate::miner::search_nonce(draft, 1, 1_000_000).unwrap();
        assert_eq!(ledger.check_block(&block), Err(ValidationError::UnknownParents));
    }

    #[test]
    fn test_first_block_may_have_unknown_parents() {
        let mut ledger = test_ledger(1);
        let draft = ledger.draft_cross("x1", "x2", "h9", 1, "player-1", "Imported");
        let block = crate::miner::search_nonce(draft, 1, 1_000_000).unwrap();
        assert!(ledger.add_block(block).is_ok());
        assert_eq!(ledger.get_generation("h9"), Some(1));
    }

    #[test]
    fn test_rejects_hash_mismatch() {
        let mut ledger = test_ledger(1);
        append_genesis(&mut ledger, "h1");
        let mut forged = ledger.draft_cross("h1", "", "h2", 1, "player-1", "Forged");
        forged = crate::miner::search_nonce(forged, 1, 1_000_000).unwrap();
        // block_hash left over from a different nonce
        forged.nonce += 1;
        while !validate_block_pow(&forged, 1) {
            forged.nonce += 1;
        }
        assert_eq!(ledger.check_block(&forged), Err(ValidationError::HashMismatch));
    }

    #[test]
    fn test_rejects_broken_linkage() {
        let mut ledger = test_ledger(1);
        append_genesis(&mut ledger, "h1");
        let draft = BreedingEvent::cross("h1", "", "h2", 1, "player-1", "Detached", 1, "not-the-tail");
        let block = crate::miner::search_nonce(draft, 1, 1_000_000).unwrap();
        assert_eq!(ledger.check_block(&block), Err(ValidationError::BrokenLinkage));
    }

    #[test]
    fn test_rejects_duplicate() {
        let mut ledger = test_ledger(1);
        let block = append_genesis(&mut ledger, "h1");
        assert_eq!(ledger.add_block(block), Err(ValidationError::Duplicate));
        assert_eq!(ledger.get_chain_length(), 1);
    }

    #[test]
    fn test_failed_append_changes_nothing() {
        let mut ledger = test_ledger(1);
        append_genesis(&mut ledger, "h1");
        append_cross(&mut ledger, "h1", "ext", "h2", "player-1");

        let length = ledger.get_chain_length();
        let tail = ledger.get_latest_block_hash().map(str::to_string);
        let hash_index = ledger.hash_index.clone();
        let genome_index = ledger.genome_index.clone();
        let generations = ledger.generation_cache.clone();

        let draft = BreedingEvent::cross("h2", "", "h3", 1, "player-2", "Late", 2, "stale");
        let block = crate::miner::search_nonce(draft, 1, 1_000_000).unwrap();
        assert!(ledger.add_block(block).is_err());

        assert_eq!(ledger.get_chain_length(), length);
        assert_eq!(ledger.get_latest_block_hash().map(str::to_string), tail);
        assert_eq!(ledger.hash_index, hash_index);
        assert_eq!(ledger.genome_index, genome_index);
        assert_eq!(ledger.generation_cache, generations);
        assert_eq!(ledger.get_generation("h3"), None);
    }

    #[test]
    fn test_genome_index_entries() {
        let mut ledger = test_ledger(1);
        append_genesis(&mut ledger, "a");
        append_genesis(&mut ledger, "b");
        append_cross(&mut ledger, "a", "b", "c", "player-1");
        append_cross(&mut ledger, "c", "c", "d", "player-1");

        assert_eq!(ledger.events_for_genome("a").len(), 2);
        assert_eq!(ledger.events_for_genome("c").len(), 2);
        assert_eq!(ledger.events_for_genome("d").len(), 1);
        assert!(ledger.events_for_genome("zzz").is_empty());
        assert_eq!(ledger.get_generation("c"), Some(1));
        assert_eq!(ledger.get_generation("d"), Some(2));
        assert_eq!(ledger.producing_event("c").map(|b| b.generation), Some(1));
    }

    #[test]
    fn test_chain_integrity_and_tamper() {
        let mut ledger = test_ledger(1);
        append_genesis(&mut ledger, "g0");
        let mut prev = "g0".to_string();
        for i in 1..6 {
            let child = format!("g{}", i);
            append_cross(&mut ledger, &prev, "", &child, "player-1");
            prev = child;
        }
        assert!(ledger.validate_chain());

        for i in 0..ledger.blocks.len() {
            let mut tampered = ledger.blocks.clone();
            flip_last_char(&mut tampered[i].block_hash);
            let err = audit_blocks(&tampered, 1).unwrap_err();
            assert_eq!(err.index, i);

            let mut relinked = ledger.blocks.clone();
            flip_last_char(&mut relinked[i].previous_block_hash);
            let err = audit_blocks(&relinked, 1).unwrap_err();
            assert_eq!(err.index, i);
        }
    }

    /// G(a), C(b), G(d), C(e)
    fn mixed_chain() -> BreedingLedger {
        let mut ledger = test_ledger(1);
        append_genesis(&mut ledger, "a");
        append_cross(&mut ledger, "a", "", "b", "p");
        append_genesis(&mut ledger, "d");
        append_cross(&mut ledger, "d", "b", "e", "p");
        ledger
    }

    #[test]
    fn test_audit_detects_deleted_block_before_genesis() {
        let ledger = mixed_chain();
        assert!(ledger.validate_chain());
        let mut blocks = ledger.blocks().to_vec();
        blocks.remove(1);
        let err = audit_blocks(&blocks, 1).unwrap_err();
        assert_eq!(err.index, 1);
        assert_eq!(err.kind, CorruptionKind::BrokenLinkage);
    }

    #[test]
    fn test_audit_detects_reordered_genesis() {
        let mut ledger = test_ledger(1);
        append_genesis(&mut ledger, "a");
        append_genesis(&mut ledger, "d");
        let mut blocks = ledger.blocks().to_vec();
        blocks.swap(0, 1);
        let err = audit_blocks(&blocks, 1).unwrap_err();
        assert_eq!(err.index, 1);
        assert_eq!(err.kind, CorruptionKind::BrokenLinkage);

        let mut blocks = mixed_chain().blocks().to_vec();
        blocks.swap(0, 2);
        assert_eq!(audit_blocks(&blocks, 1).unwrap_err().index, 1);
    }

    #[test]
    fn test_audit_detects_repeated_genesis() {
        let ledger = mixed_chain();
        let mut blocks = ledger.blocks().to_vec();
        blocks.push(blocks[0].clone());
        let err = audit_blocks(&blocks, 1).unwrap_err();
        assert_eq!(err.index, 4);
        assert_eq!(err.kind, CorruptionKind::DuplicateBlock);

        // adjacent copy
        let mut blocks = ledger.blocks().to_vec();
        blocks.insert(2, blocks[2].clone());
        let err = audit_blocks(&blocks, 1).unwrap_err();
        assert_eq!(err.index, 3);
    }

    #[test]
    fn test_genesis_must_link_after_first_block() {
        let mut ledger = test_ledger(1);
        append_genesis(&mut ledger, "a");
        let draft = BreedingEvent::genesis("b", "player-1", "Detached", "");
        let block = crate::miner::search_nonce(draft, 1, 1_000_000).unwrap();
        assert_eq!(ledger.check_block(&block), Err(ValidationError::BrokenLinkage));

        let draft = ledger.draft_genesis("b", "player-1", "Linked");
        let linked = crate::miner::search_nonce(draft, 1, 1_000_000).unwrap();
        assert!(ledger.add_block(linked).is_ok());
        assert!(ledger.validate_chain());
    }

    #[test]
    fn test_tampered_tail_blocks_next_append() {
        let mut ledger = test_ledger(1);
        append_genesis(&mut ledger, "g0");
        append_cross(&mut ledger, "g0", "", "g1", "player-1");
        let draft = ledger.draft_cross("g1", "", "g2", 5, "player-1", "Next");
        let block = crate::miner::search_nonce(draft, 1, 1_000_000).unwrap();

        let last = ledger.blocks.len() - 1;
        flip_last_char(&mut ledger.blocks[last].block_hash);
        let err = ledger.audit_chain().unwrap_err();
        assert_eq!(err.index, last);
        assert_eq!(err.kind, CorruptionKind::HashMismatch);
        assert_eq!(ledger.add_block(block), Err(ValidationError::BrokenLinkage));
    }

    #[test]
    fn test_player_events() {
        let mut ledger = test_ledger(1);
        append_genesis(&mut ledger, "a");
        append_cross(&mut ledger, "a", "", "b", "alice");
        append_cross(&mut ledger, "b", "", "c", "bob");
        append_cross(&mut ledger, "c", "", "d", "alice");
        let alice: Vec<&str> = ledger
            .get_player_events("alice")
            .iter()
            .map(|b| b.offspring_genome_hash.as_str())
            .collect();
        assert_eq!(alice, vec!["b", "d"]);
        assert!(ledger.get_player_events("nobody").is_empty());
    }

    #[test]
    fn test_next_generation() {
        let mut ledger = test_ledger(1);
        append_genesis(&mut ledger, "a");
        append_cross(&mut ledger, "a", "", "b", "p");
        assert_eq!(ledger.next_generation("", ""), 0);
        assert_eq!(ledger.next_generation("a", "unknown"), 1);
        assert_eq!(ledger.next_generation("b", "a"), 2);
    }

    #[test]
    fn test_clear() {
        let sink = MemorySink::new();
        let mut ledger = BreedingLedger::with_sink(LedgerConfig::default().with_difficulty(1), Arc::new(sink.clone()));
        append_genesis(&mut ledger, "a");
        append_cross(&mut ledger, "a", "", "b", "p");
        ledger.clear();
        assert_eq!(ledger.get_chain_length(), 0);
        assert_eq!(ledger.get_generation("a"), None);
        assert!(ledger.events_for_genome("a").is_empty());
        assert!(sink.events().contains(&Diagnostic::Cleared { removed: 2 }));
        // a cleared ledger accepts a fresh genesis
        append_genesis(&mut ledger, "a");
        assert_eq!(ledger.get_chain_length(), 1);
    }

    #[test]
    fn test_rejection_is_reported() {
        let sink = MemorySink::new();
        let mut ledger = BreedingLedger::with_sink(LedgerConfig::default().with_difficulty(1), Arc::new(sink.clone()));
        let block = append_genesis(&mut ledger, "a");
        let _ = ledger.add_block(block);
        let events = sink.events();
        assert!(matches!(events[0], Diagnostic::BlockAppended { index: 0, .. }));
        assert_eq!(events[1], Diagnostic::BlockRejected { reason: ValidationError::Duplicate });
    }

    #[test]
    fn test_from_blocks_fail_closed() {
        let mut source = test_ledger(1);
        append_genesis(&mut source, "a");
        append_cross(&mut source, "a", "", "b", "p");
        append_cross(&mut source, "b", "", "c", "p");

        let restored = BreedingLedger::from_blocks(
            source.config().clone(),
            source.blocks().to_vec(),
            Arc::new(crate::diagnostics::NullSink),
        )
        .unwrap();
        assert_eq!(restored.get_chain_length(), 3);
        assert_eq!(restored.get_generation("c"), Some(2));
        assert_eq!(restored.get_lineage("c").len(), 3);

        let mut damaged = source.blocks().to_vec();
        damaged[1].mutation_seed += 1;
        let err = BreedingLedger::from_blocks(
            source.config().clone(),
            damaged,
            Arc::new(crate::diagnostics::NullSink),
        )
        .err()
        .unwrap();
        assert_eq!(err.index, 1);
        assert_eq!(err.to_string(), "save data invalid");
    }

    fn fail_closed_load(blocks: Vec<BreedingEvent>) -> Result<BreedingLedger, CorruptionError> {
        BreedingLedger::from_blocks(
            LedgerConfig::default().with_difficulty(1),
            blocks,
            Arc::new(crate::diagnostics::NullSink),
        )
    }

    #[test]
    fn test_fail_closed_boundaries() {
        let source = mixed_chain();

        // untouched save loads unchanged
        let intact = fail_closed_load(source.blocks().to_vec()).unwrap();
        assert_eq!(intact.blocks(), source.blocks());
        assert_eq!(intact.get_latest_block_hash(), source.get_latest_block_hash());
        assert!(intact.quarantined().is_empty());

        // first block invalid
        let mut first_bad = source.blocks().to_vec();
        flip_last_char(&mut first_bad[0].block_hash);
        let err = fail_closed_load(first_bad).err().unwrap();
        assert_eq!(err.index, 0);
        assert_eq!(err.kind, CorruptionKind::HashMismatch);

        // every block invalid
        let mut all_bad = source.blocks().to_vec();
        for block in all_bad.iter_mut() {
            flip_last_char(&mut block.block_hash);
        }
        let err = fail_closed_load(all_bad).err().unwrap();
        assert_eq!(err.index, 0);
    }

    #[test]
    fn test_load_reports_one_rebuild() {
        let source = mixed_chain();
        let mut damaged = source.blocks().to_vec();
        damaged[2].mutation_seed += 1;

        let sink = MemorySink::new();
        let config = LedgerConfig::default()
            .with_difficulty(1)
            .with_recovery(RecoveryPolicy::QuarantineSuffix);
        let ledger = BreedingLedger::from_blocks(config, damaged, Arc::new(sink.clone())).unwrap();
        assert_eq!(ledger.get_chain_length(), 2);

        let rebuilds: Vec<Diagnostic> = sink
            .events()
            .into_iter()
            .filter(|d| matches!(d, Diagnostic::IndexesRebuilt { .. }))
            .collect();
        assert_eq!(rebuilds, vec![Diagnostic::IndexesRebuilt { blocks: 2 }]);

        let sink = MemorySink::new();
        let config = LedgerConfig::default().with_difficulty(1);
        BreedingLedger::from_blocks(config, source.blocks().to_vec(), Arc::new(sink.clone())).unwrap();
        assert!(sink.events().contains(&Diagnostic::IndexesRebuilt { blocks: 4 }));
        let rebuilds = sink
            .events()
            .iter()
            .filter(|d| matches!(d, Diagnostic::IndexesRebuilt { .. }))
            .count();
        assert_eq!(rebuilds, 1);
    }

    fn quarantine_load(blocks: Vec<BreedingEvent>) -> BreedingLedger {
        let config = LedgerConfig::default()
            .with_difficulty(1)
            .with_recovery(RecoveryPolicy::QuarantineSuffix);
        BreedingLedger::from_blocks(config, blocks, Arc::new(crate::diagnostics::NullSink)).unwrap()
    }

    #[test]
    fn test_quarantine_keeps_valid_prefix() {
        let mut source = test_ledger(1);
        append_genesis(&mut source, "a");
        append_cross(&mut source, "a", "", "b", "p");
        append_cross(&mut source, "b", "", "c", "p");
        append_cross(&mut source, "c", "", "d", "p");

        let mut damaged = source.blocks().to_vec();
        damaged[2].breeder_signature = "mallory".into();
        let ledger = quarantine_load(damaged);
        assert_eq!(ledger.get_chain_length(), 2);
        assert_eq!(ledger.quarantined().len(), 2);
        assert!(ledger.validate_chain());
        assert_eq!(ledger.get_generation("b"), Some(1));
        assert_eq!(ledger.get_generation("c"), None);
        assert_eq!(ledger.get_latest_block_hash(), Some(source.blocks()[1].block_hash.as_str()));
    }

    #[test]
    fn test_quarantine_boundaries() {
        let mut source = test_ledger(1);
        append_genesis(&mut source, "a");
        append_cross(&mut source, "a", "", "b", "p");

        // untouched save keeps everything
        let intact = quarantine_load(source.blocks().to_vec());
        assert_eq!(intact.get_chain_length(), 2);
        assert!(intact.quarantined().is_empty());

        // first block invalid: nothing survives
        let mut first_bad = source.blocks().to_vec();
        flip_last_char(&mut first_bad[0].block_hash);
        let ledger = quarantine_load(first_bad);
        assert_eq!(ledger.get_chain_length(), 0);
        assert_eq!(ledger.quarantined().len(), 2);

        // every block invalid
        let mut all_bad = source.blocks().to_vec();
        for block in all_bad.iter_mut() {
            block.mutation_seed += 1;
        }
        let ledger = quarantine_load(all_bad);
        assert_eq!(ledger.get_chain_length(), 0);
        assert_eq!(ledger.quarantined().len(), 2);
        assert_eq!(ledger.stats().quarantined, 2);
    }

    #[test]
    fn test_stats() {
        let mut ledger = test_ledger(1);
        append_genesis(&mut ledger, "a");
        append_genesis(&mut ledger, "b");
        append_cross(&mut ledger, "a", "b", "c", "alice");
        let stats = ledger.stats();
        assert_eq!(stats.chain_length, 3);
        assert_eq!(stats.genesis_blocks, 2);
        assert_eq!(stats.unique_genomes, 3);
        assert_eq!(stats.max_generation, 1);
        println!("{}", ledger.summary());
    }
}
