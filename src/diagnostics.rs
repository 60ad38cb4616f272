//! Diagnostics sink — where the ledger reports what it did
//!
//! The ledger never logs directly. It is handed a sink at construction;
//! `LogSink` forwards to the `log` facade, `NullSink` drops everything and
//! `MemorySink` keeps events for inspection in tests and tooling.

use crate::error::{CorruptionKind, ValidationError};
use log::{debug, info, warn};
use std::sync::{Arc, Mutex};

/// Something the ledger wants reported
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    BlockAppended { index: usize, block_hash: String },
    BlockRejected { reason: ValidationError },
    ChainCorrupted { index: usize, kind: CorruptionKind },
    Quarantined { kept: usize, quarantined: usize },
    IndexesRebuilt { blocks: usize },
    Cleared { removed: usize },
    LineageCycle { genome_hash: String },
}

/// Receiver of ledger diagnostics
pub trait DiagnosticsSink: Send + Sync {
    fn record(&self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticsSink for LogSink {
    fn record(&self, diagnostic: Diagnostic) {
        match diagnostic {
            Diagnostic::BlockAppended { index, block_hash } => {
                debug!("Appended block #{} ({})", index, crate::genome::short_hash(&block_hash, 8, 4));
            }
            Diagnostic::BlockRejected { reason } => warn!("{}", reason),
            Diagnostic::ChainCorrupted { index, kind } => {
                warn!("Chain audit failed at block #{}: {:?}", index, kind);
            }
            Diagnostic::Quarantined { kept, quarantined } => {
                warn!("Quarantined {} blocks, kept {} valid blocks", quarantined, kept);
            }
            Diagnostic::IndexesRebuilt { blocks } => info!("Rebuilt ledger indexes from {} blocks", blocks),
            Diagnostic::Cleared { removed } => info!("Cleared ledger ({} blocks removed)", removed),
            Diagnostic::LineageCycle { genome_hash } => {
                warn!("Lineage cycle at genome {}", crate::genome::short_hash(&genome_hash, 8, 4));
            }
        }
    }
}

/// Discards every diagnostic
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticsSink for NullSink {
    fn record(&self, _diagnostic: Diagnostic) {}
}

/// Collects diagnostics in memory. Clones share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<Diagnostic>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far
    pub fn events(&self) -> Vec<Diagnostic> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl DiagnosticsSink for MemorySink {
    fn record(&self, diagnostic: Diagnostic) {
        match self.events.lock() {
            Ok(mut events) => events.push(diagnostic),
            Err(poisoned) => poisoned.into_inner().push(diagnostic),
        }
    }
}
