//! Weighted bundler: a lazy accumulator that superposes many vectors into one.
//!
//! Writes are O(1) and only mark the cached superposition dirty; the next
//! read rebuilds it from the full ledger of `(vector, weight)` entries.

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::error::VsaError;

use super::ops::{VsaOps, VsaResult};
use super::{Dimension, HyperVector};

/// Default seed for the bundling RNG.
pub const DEFAULT_BUNDLE_SEED: u64 = 0x5EED_B00D_1E5_u64;

/// Upper bound on an entry's repeat count.
///
/// After `w` repeats only a `0.5^w` share of the entry's 1-bits is still
/// clear, so repeats past this point change nothing measurable but still
/// cost a bundle step each on every rebuild.
pub const MAX_ENTRY_WEIGHT: u32 = 64;

/// Handle to an entry recorded in a [`WeightedBundler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(usize);

impl EntryId {
    /// Position of the entry in the bundler's ledger.
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Entry {
    vector: HyperVector,
    weight: u32,
}

/// Lazy, weight-aware superposition of many vectors.
///
/// Weights are clamped to [`MAX_ENTRY_WEIGHT`]. `build` starts from the zero vector and bundles each entry `weight`
/// times in insertion order. The RNG is re-seeded at the start of every
/// rebuild, so two bundlers with the same seed and ledger produce the same
/// result.
#[derive(Debug, Clone)]
pub struct WeightedBundler {
    dim: Dimension,
    seed: u64,
    entries: Vec<Entry>,
    cached: HyperVector,
    dirty: bool,
}

impl WeightedBundler {
    /// Create an empty bundler. An empty bundler builds to the zero vector.
    pub fn new(dim: Dimension, seed: u64) -> Self {
        Self {
            dim,
            seed,
            entries: Vec::new(),
            cached: HyperVector::zero(dim),
            dirty: false,
        }
    }

    /// Record `vector` with the given repeat count and mark the result dirty.
    ///
    /// A vector of another dimension is rejected before anything is
    /// recorded, so a failed `add` leaves the bundler buildable.
    pub fn add(&mut self, vector: HyperVector, weight: u32) -> VsaResult<EntryId> {
        if vector.dim() != self.dim {
            return Err(VsaError::DimensionMismatch {
                expected: self.dim.0,
                actual: vector.dim().0,
            });
        }
        let id = EntryId(self.entries.len());
        self.entries.push(Entry {
            vector,
            weight: weight.min(MAX_ENTRY_WEIGHT),
        });
        self.dirty = true;
        Ok(id)
    }

    /// Increase the repeat count of an existing entry.
    ///
    /// Returns `false` if `id` doesn't belong to this bundler.
    pub fn reinforce(&mut self, id: EntryId, weight: u32) -> bool {
        match self.entries.get_mut(id.0) {
            Some(entry) => {
                entry.weight = entry.weight.saturating_add(weight).min(MAX_ENTRY_WEIGHT);
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    /// Current weight of an entry.
    pub fn weight(&self, id: EntryId) -> Option<u32> {
        self.entries.get(id.0).map(|e| e.weight)
    }

    /// Return the superposition, rebuilding it first if any write happened
    /// since the last build.
    pub fn build(&mut self, ops: &VsaOps) -> VsaResult<&HyperVector> {
        if self.dirty {
            let mut rng = StdRng::seed_from_u64(self.seed);
            let mut acc = HyperVector::zero(self.dim);
            for entry in &self.entries {
                for _ in 0..entry.weight {
                    ops.bundle_into(&mut acc, &entry.vector, &mut rng)?;
                }
            }
            tracing::debug!(
                entries = self.entries.len(),
                total_weight = self.total_weight(),
                density = acc.density(),
                "rebuilt superposition"
            );
            self.cached = acc;
            self.dirty = false;
        }
        Ok(&self.cached)
    }

    /// Whether the cached result is stale.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all entry weights (the number of bundle steps per rebuild).
    pub fn total_weight(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.weight)).sum()
    }

    /// The RNG seed used for rebuilds.
    pub fn seed(&self) -> u64 {
        self.seed
    }
}
