//! Genetics as seen by the ledger: profiles and their fingerprints

mod profile;
mod hasher;

pub use profile::{GeneticProfile, StrainType, TraitSet, TraitValue};
pub use hasher::{
    canonical_form, compute_genome_hash, short_hash, verify_genome_hash, TRAIT_PRECISION,
};
