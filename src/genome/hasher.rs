//! Genome Hasher — deterministic fingerprints of genetic profiles
//!
//! The fingerprint is SHA256 over a canonical string. Every field is written
//! as `key=len:value;` in a fixed order, floats use 8 fractional digits and the
//! extra trait mapping is sorted by key, so the same genetics hash identically
//! on every machine regardless of map iteration order.

use super::profile::{GeneticProfile, TraitValue};
use sha2::{Digest, Sha256};

/// Fractional digits used when formatting numeric traits
pub const TRAIT_PRECISION: usize = 8;

/// Fingerprint a profile. Missing or empty profiles yield an empty hash.
pub fn compute_genome_hash(profile: Option<&GeneticProfile>) -> String {
    match profile {
        Some(p) if !p.is_empty() => {
            let canonical = canonical_form(p);
            hex::encode(Sha256::digest(canonical.as_bytes()))
        }
        _ => String::new(),
    }
}

/// Recompute the fingerprint and compare it with a claimed hash
pub fn verify_genome_hash(profile: Option<&GeneticProfile>, claimed_hash: &str) -> bool {
    if claimed_hash.is_empty() {
        return false;
    }
    compute_genome_hash(profile) == claimed_hash.to_ascii_lowercase()
}

/// Display-only truncation, e.g. `3fa9c1...e07b`. Never compare these.
pub fn short_hash(full_hash: &str, prefix_len: usize, suffix_len: usize) -> String {
    let chars: Vec<char> = full_hash.chars().collect();
    if chars.len() <= prefix_len + suffix_len {
        return full_hash.to_string();
    }
    let prefix: String = chars[..prefix_len].iter().collect();
    let suffix: String = chars[chars.len() - suffix_len..].iter().collect();
    format!("{}...{}", prefix, suffix)
}

/// The canonical string that gets hashed
pub fn canonical_form(profile: &GeneticProfile) -> String {
    let mut out = String::new();
    push_field(&mut out, "id", &profile.id);
    push_field(&mut out, "name", &profile.name);
    push_field(&mut out, "species", &profile.species);
    push_field(&mut out, "strain_type", profile.strain_type.as_str());
    for (key, value) in profile.traits.declared() {
        push_field(&mut out, key, &format_number(value));
    }
    if let Some(extra) = &profile.extra_traits {
        let mut entries: Vec<(&String, &TraitValue)> = extra.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        for (key, value) in entries {
            push_field(&mut out, &format!("x.{}", key), &format_value(value));
        }
    }
    out
}

fn push_field(out: &mut String, key: &str, value: &str) {
    out.push_str(&format!("{}={}:{};", key, value.len(), value));
}

fn format_number(value: f64) -> String {
    // -0.0 and 0.0 must fingerprint the same
    let value = if value == 0.0 { 0.0 } else { value };
    format!("{:.*}", TRAIT_PRECISION, value)
}

fn format_value(value: &TraitValue) -> String {
    match value {
        TraitValue::Number(n) => format!("n{}", format_number(*n)),
        TraitValue::Flag(b) => format!("b{}", b),
        TraitValue::Category(s) => format!("s{}", s),
    }
}
