//! LedgerConfig — difficulty and load-time recovery rules

use serde::{Deserialize, Serialize};

/// What to do when a loaded chain fails its audit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecoveryPolicy {
    /// Reject the whole save
    FailClosed,
    /// Keep the valid prefix, quarantine the first bad block and everything after it
    QuarantineSuffix,
}

/// Settings shared by every block of one ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Leading hex zeros required of every block hash
    pub difficulty: usize,
    /// Behaviour when the persisted chain is corrupt
    pub recovery: RecoveryPolicy,
    /// Upper bound on nonces tried by the breeding-side search
    pub max_nonce_attempts: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            difficulty: 4,
            recovery: RecoveryPolicy::FailClosed,
            max_nonce_attempts: 10_000_000,
        }
    }
}

impl LedgerConfig {
    /// Low difficulty, keeps the valid prefix of damaged saves
    pub fn relaxed() -> Self {
        Self {
            difficulty: 2,
            recovery: RecoveryPolicy::QuarantineSuffix,
            max_nonce_attempts: 1_000_000,
        }
    }

    /// Higher difficulty, rejects damaged saves outright
    pub fn strict() -> Self {
        Self {
            difficulty: 5,
            recovery: RecoveryPolicy::FailClosed,
            max_nonce_attempts: 100_000_000,
        }
    }

    pub fn with_difficulty(mut self, difficulty: usize) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_recovery(mut self, recovery: RecoveryPolicy) -> Self {
        self.recovery = recovery;
        self
    }
}
