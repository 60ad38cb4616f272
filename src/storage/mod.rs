//! Save data for the provenance ledger
//!
//! Only the flat, ordered block list is persisted. Indexes are derived, so a
//! load always replays them and audits the chain before handing the ledger out.

use crate::block::BreedingEvent;
use crate::config::LedgerConfig;
use crate::diagnostics::DiagnosticsSink;
use crate::error::LedgerError;
use crate::ledger::BreedingLedger;
use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Current save layout version
pub const SAVE_FORMAT_VERSION: u32 = 1;

/// Persisted form of a ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveData {
    pub format_version: u32,
    pub saved_at: DateTime<Utc>,
    pub blocks: Vec<BreedingEvent>,
}

impl SaveData {
    pub fn from_ledger(ledger: &BreedingLedger) -> Self {
        Self {
            format_version: SAVE_FORMAT_VERSION,
            saved_at: Utc::now(),
            blocks: ledger.blocks().to_vec(),
        }
    }

    pub fn to_json(&self) -> Result<String, LedgerError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, LedgerError> {
        let data: Self = serde_json::from_str(json)?;
        if data.format_version != SAVE_FORMAT_VERSION {
            return Err(LedgerError::UnsupportedVersion(data.format_version));
        }
        Ok(data)
    }

    /// Replay and audit into a usable ledger
    pub fn into_ledger(
        self,
        config: LedgerConfig,
        sink: Arc<dyn DiagnosticsSink>,
    ) -> Result<BreedingLedger, LedgerError> {
        Ok(BreedingLedger::from_blocks(config, self.blocks, sink)?)
    }
}

/// Write the ledger's block list as JSON
pub fn save_ledger(ledger: &BreedingLedger, path: impl AsRef<Path>) -> Result<(), LedgerError> {
    let path = path.as_ref();
    let json = SaveData::from_ledger(ledger).to_json()?;
    std::fs::write(path, json)?;
    info!("Saved {} breeding events to {}", ledger.get_chain_length(), path.display());
    Ok(())
}

/// Read, replay and audit a saved ledger
pub fn load_ledger(
    path: impl AsRef<Path>,
    config: LedgerConfig,
    sink: Arc<dyn DiagnosticsSink>,
) -> Result<BreedingLedger, LedgerError> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)?;
    let ledger = SaveData::from_json(&json)?.into_ledger(config, sink)?;
    info!("Loaded {} breeding events from {}", ledger.get_chain_length(), path.display());
    Ok(ledger)
}
