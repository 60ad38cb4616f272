//! Strain Ledger — tamper-evident provenance for bred genetic lineages
//!
//! Every cross between two genetic profiles becomes an immutable,
//! hash-linked breeding event guarded by a small proof-of-work, so the
//! ancestry of a strain can be verified from the chain alone.
//!
//! Lifecycle: create (or load) a [`BreedingLedger`], audit it once, append
//! sealed [`BreedingEvent`]s, query lineage, save the block list.

pub mod genome;
pub mod pow;
pub mod block;
pub mod miner;
pub mod ledger;
pub mod lineage;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod storage;

#[cfg(test)]
mod testing;

pub use genome::{compute_genome_hash, short_hash, verify_genome_hash, GeneticProfile};
pub use block::BreedingEvent;
pub use ledger::{BreedingLedger, LedgerStats};
pub use lineage::{LineageNode, LineageResolver};
pub use config::{LedgerConfig, RecoveryPolicy};
pub use diagnostics::{Diagnostic, DiagnosticsSink, LogSink, MemorySink, NullSink};
pub use error::{CorruptionError, LedgerError, ValidationError};
pub use storage::SaveData;
