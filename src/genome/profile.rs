//! GeneticProfile — the breeding engine's view of a strain's genetics
//!
//! The ledger treats a profile as opaque input. It is never mutated here,
//! only fingerprinted through its canonical form.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Categorical strain type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrainType {
    Indica,
    Sativa,
    Hybrid,
    Ruderalis,
}

impl StrainType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrainType::Indica => "indica",
            StrainType::Sativa => "sativa",
            StrainType::Hybrid => "hybrid",
            StrainType::Ruderalis => "ruderalis",
        }
    }
}

impl Default for StrainType {
    fn default() -> Self {
        StrainType::Hybrid
    }
}

/// Declared numeric traits carried by every profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraitSet {
    /// THC content (percent)
    pub thc: f64,
    /// CBD content (percent)
    pub cbd: f64,
    /// Relative yield potential (0..1)
    pub yield_potential: f64,
    /// Flowering time in days
    pub flowering_days: f64,
    /// Mature height in metres
    pub height: f64,
    /// Growth vigor (0..1)
    pub vigor: f64,
    /// Disease resistance (0..1)
    pub disease_resistance: f64,
}

impl TraitSet {
    /// Traits in canonical hashing order
    pub fn declared(&self) -> [(&'static str, f64); 7] {
        [
            ("thc", self.thc),
            ("cbd", self.cbd),
            ("yield_potential", self.yield_potential),
            ("flowering_days", self.flowering_days),
            ("height", self.height),
            ("vigor", self.vigor),
            ("disease_resistance", self.disease_resistance),
        ]
    }
}

/// A value in the open-ended extra trait mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TraitValue {
    Number(f64),
    Flag(bool),
    Category(String),
}

/// Genetic profile as handed over by the crossover engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneticProfile {
    pub id: String,
    pub name: String,
    pub species: String,
    pub strain_type: StrainType,
    pub traits: TraitSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_traits: Option<HashMap<String, TraitValue>>,
}

impl GeneticProfile {
    pub fn new(id: impl Into<String>, name: impl Into<String>, species: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            species: species.into(),
            ..Self::default()
        }
    }

    pub fn with_traits(mut self, traits: TraitSet) -> Self {
        self.traits = traits;
        self
    }

    pub fn with_strain_type(mut self, strain_type: StrainType) -> Self {
        self.strain_type = strain_type;
        self
    }

    /// Insert an extra trait, creating the mapping on first use
    pub fn set_extra(&mut self, key: impl Into<String>, value: TraitValue) {
        self.extra_traits
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value);
    }

    /// A profile without identity carries no genetics
    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
    }
}
