//! Proof-of-work validation
//!
//! A hash meets difficulty `d` when its first `d` hex characters are `'0'`.
//! This module only verifies; the nonce search lives with the breeding code
//! (see [`crate::miner`]).

use crate::block::BreedingEvent;

/// True iff the first `difficulty` characters of `hash` are all `'0'`
pub fn meets_difficulty(hash: &str, difficulty: usize) -> bool {
    if difficulty == 0 {
        return true;
    }
    let bytes = hash.as_bytes();
    bytes.len() >= difficulty && bytes[..difficulty].iter().all(|&b| b == b'0')
}

/// Number of leading `'0'` characters
pub fn count_leading_zeros(hash: &str) -> usize {
    hash.bytes().take_while(|&b| b == b'0').count()
}

/// Recompute the block's content hash and check it against the target
pub fn validate_block_pow(block: &BreedingEvent, difficulty: usize) -> bool {
    meets_difficulty(&block.compute_hash(), difficulty)
}
