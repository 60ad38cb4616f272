//! Shared helpers for unit tests

use crate::block::BreedingEvent;
use crate::config::LedgerConfig;
use crate::diagnostics::NullSink;
use crate::ledger::BreedingLedger;
use crate::miner::search_nonce;
use std::sync::Arc;

pub fn test_ledger(difficulty: usize) -> BreedingLedger {
    BreedingLedger::with_sink(LedgerConfig::default().with_difficulty(difficulty), Arc::new(NullSink))
}

pub fn append_genesis(ledger: &mut BreedingLedger, genome: &str) -> BreedingEvent {
    let draft = ledger.draft_genesis(genome, "player-1", &format!("Founder {}", genome));
    let block = search_nonce(draft, ledger.difficulty(), 10_000_000).unwrap();
    ledger.add_block(block.clone()).unwrap();
    block
}

pub fn append_cross(
    ledger: &mut BreedingLedger,
    parent_1: &str,
    parent_2: &str,
    child: &str,
    breeder: &str,
) -> BreedingEvent {
    let draft = ledger.draft_cross(parent_1, parent_2, child, 7, breeder, &format!("Cross {}", child));
    let block = search_nonce(draft, ledger.difficulty(), 10_000_000).unwrap();
    ledger.add_block(block.clone()).unwrap();
    block
}

/// Change one character of a stored hash
pub fn flip_last_char(hash: &mut String) {
    match hash.pop() {
        Some('0') => hash.push('1'),
        Some(_) => hash.push('0'),
        None => hash.push('f'),
    }
}
