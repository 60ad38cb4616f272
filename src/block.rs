//! BreedingEvent — the immutable block appended to the provenance ledger
//!
//! A block records one cross (or one founder strain) and is content-addressed:
//! `block_hash` is SHA256 over the parents, mutation seed, timestamp, breeder,
//! previous block hash and nonce. Every field goes in with an 8-byte length
//! prefix so no concatenation of two different field tuples can collide.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Generation assigned to founder strains
pub const GENESIS_GENERATION: u32 = 0;

/// One recorded breeding (or genesis) event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreedingEvent {
    /// Locally unique event identifier
    pub packet_id: String,
    /// Genome hash of the first parent (empty for genesis)
    pub parent_hash_1: String,
    /// Genome hash of the second parent (empty for genesis)
    pub parent_hash_2: String,
    /// Seed handed to the crossover engine, kept for reproducibility
    pub mutation_seed: u64,
    pub timestamp: DateTime<Utc>,
    /// Who performed the cross
    pub breeder_signature: String,
    /// Tail block hash at the moment this block was appended
    pub previous_block_hash: String,
    /// Value found by the proof-of-work search
    pub nonce: u64,
    /// Content hash of this record
    pub block_hash: String,
    /// Genome hash of the resulting profile
    pub offspring_genome_hash: String,
    pub strain_name: String,
    pub generation: u32,
}

impl BreedingEvent {
    /// Draft a cross between two parents. The nonce starts at zero and the
    /// block hash is computed for it; run the nonce search before submitting.
    #[allow(clippy::too_many_arguments)]
    pub fn cross(
        parent_hash_1: impl Into<String>,
        parent_hash_2: impl Into<String>,
        offspring_genome_hash: impl Into<String>,
        mutation_seed: u64,
        breeder_signature: impl Into<String>,
        strain_name: impl Into<String>,
        generation: u32,
        previous_block_hash: impl Into<String>,
    ) -> Self {
        let mut event = Self {
            packet_id: Uuid::new_v4().to_string(),
            parent_hash_1: parent_hash_1.into(),
            parent_hash_2: parent_hash_2.into(),
            mutation_seed,
            timestamp: Utc::now(),
            breeder_signature: breeder_signature.into(),
            previous_block_hash: previous_block_hash.into(),
            nonce: 0,
            block_hash: String::new(),
            offspring_genome_hash: offspring_genome_hash.into(),
            strain_name: strain_name.into(),
            generation,
        };
        event.block_hash = event.compute_hash();
        event
    }

    /// Draft a founder strain with no recorded parents
    pub fn genesis(
        offspring_genome_hash: impl Into<String>,
        breeder_signature: impl Into<String>,
        strain_name: impl Into<String>,
        previous_block_hash: impl Into<String>,
    ) -> Self {
        Self::cross(
            "",
            "",
            offspring_genome_hash,
            0,
            breeder_signature,
            strain_name,
            GENESIS_GENERATION,
            previous_block_hash,
        )
    }

    /// Both parents empty
    pub fn is_genesis(&self) -> bool {
        self.parent_hash_1.is_empty() && self.parent_hash_2.is_empty()
    }

    /// Non-empty parent hashes, deduplicated
    pub fn parent_hashes(&self) -> Vec<&str> {
        let mut parents = Vec::with_capacity(2);
        for p in [self.parent_hash_1.as_str(), self.parent_hash_2.as_str()] {
            if !p.is_empty() && !parents.contains(&p) {
                parents.push(p);
            }
        }
        parents
    }

    /// Recompute the content hash from the hashed fields
    pub fn compute_hash(&self) -> String {
        Self::hash_fields(self, self.nonce)
    }

    /// Content hash as it would be with a different nonce
    pub fn hash_with_nonce(&self, nonce: u64) -> String {
        Self::hash_fields(self, nonce)
    }

    /// Set the nonce and refresh `block_hash`
    pub fn seal(&mut self, nonce: u64) {
        self.nonce = nonce;
        self.block_hash = self.compute_hash();
    }

    /// Stored hash matches the recomputed one
    pub fn verify_hash(&self) -> bool {
        self.block_hash == self.compute_hash()
    }

    fn hash_fields(&self, nonce: u64) -> String {
        let timestamp = self.timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true);
        let mut hasher = Sha256::new();
        update_field(&mut hasher, self.parent_hash_1.as_bytes());
        update_field(&mut hasher, self.parent_hash_2.as_bytes());
        update_field(&mut hasher, &self.mutation_seed.to_le_bytes());
        update_field(&mut hasher, timestamp.as_bytes());
        update_field(&mut hasher, self.breeder_signature.as_bytes());
        update_field(&mut hasher, self.previous_block_hash.as_bytes());
        update_field(&mut hasher, &nonce.to_le_bytes());
        hex::encode(hasher.finalize())
    }

    /// One-line description for logs and tooling
    pub fn summary(&self) -> String {
        format!(
            "BreedingEvent '{}' | F{} | breeder={} | genome={} | block={}",
            self.strain_name,
            self.generation,
            self.breeder_signature,
            crate::genome::short_hash(&self.offspring_genome_hash, 8, 4),
            crate::genome::short_hash(&self.block_hash, 8, 4),
        )
    }
}

fn update_field(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}
