//! Error types for the provenance ledger
//!
//! Display strings are shown to players, so none of them carry hashes,
//! nonces or block identifiers. The structured fields are for diagnostics.

/// Why `add_block` refused a block. Never retried: it means either a bug in
/// the breeding code or forged input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Breeding record rejected: proof-of-work not satisfied")]
    InsufficientWork,

    #[error("Breeding record rejected: neither parent is recorded")]
    UnknownParents,

    #[error("Breeding record rejected: content does not match its hash")]
    HashMismatch,

    #[error("Breeding record rejected: does not extend the current chain")]
    BrokenLinkage,

    #[error("Breeding record rejected: already recorded")]
    Duplicate,
}

/// Which check failed for a stored block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorruptionKind {
    HashMismatch,
    InsufficientWork,
    BrokenLinkage,
    /// Same block hash stored twice
    DuplicateBlock,
}

/// First invalid block found while auditing a loaded chain
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("save data invalid")]
pub struct CorruptionError {
    /// Position of the first failing block
    pub index: usize,
    pub kind: CorruptionKind,
}

/// Errors surfaced by loading, saving and building ledger content
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error(transparent)]
    Corrupted(#[from] CorruptionError),

    #[error(transparent)]
    Rejected(#[from] ValidationError),

    #[error("save data could not be read: {0}")]
    Io(#[from] std::io::Error),

    #[error("save data invalid: {0}")]
    Format(#[from] serde_json::Error),

    #[error("save data uses unsupported format version {0}")]
    UnsupportedVersion(u32),

    #[error("proof-of-work search gave up after {0} attempts")]
    Exhausted(u64),
}
