//! Nonce search for breeding code
//!
//! The ledger only verifies work. Whoever produces a block calls
//! [`search_nonce`] on the draft before submitting it.

use crate::block::BreedingEvent;
use crate::error::LedgerError;
use crate::pow::meets_difficulty;

/// Try nonces from zero upward until the block hash clears `difficulty`.
/// Returns the sealed block, or `Exhausted` after `max_attempts` nonces.
pub fn search_nonce(
    mut draft: BreedingEvent,
    difficulty: usize,
    max_attempts: u64,
) -> Result<BreedingEvent, LedgerError> {
    for nonce in 0..max_attempts {
        let hash = draft.hash_with_nonce(nonce);
        if meets_difficulty(&hash, difficulty) {
            draft.nonce = nonce;
            draft.block_hash = hash;
            return Ok(draft);
        }
    }
    Err(LedgerError::Exhausted(max_attempts))
}
