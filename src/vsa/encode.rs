//! Name-to-vector encoding.
//!
//! Maps concept names into hypervector space using deterministic seeded
//! random generation, ensuring the same name always maps to the same vector.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use super::HyperVector;
use super::ops::VsaOps;

/// Derive the generation seed for a concept name.
///
/// The same name always produces the same seed within a build. Persisted
/// registries store prototypes directly, so reloading never depends on this
/// hash staying stable across toolchains.
pub fn seed_for_name(name: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    name.hash(&mut hasher);
    hasher.finish()
}

/// Encode a concept name into its prototype hypervector.
pub fn encode_name(ops: &VsaOps, name: &str) -> HyperVector {
    ops.seeded(seed_for_name(name))
}
