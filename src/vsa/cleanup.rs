//! Cleanup memory: the registry of named prototype vectors.
//!
//! A computed vector (the noisy result of unbinding a hologram) is "cleaned
//! up" by finding the registered prototype it most resembles. The registry
//! is append-only: concepts are defined lazily and never removed.

use std::collections::HashMap;

use rayon::prelude::*;

use crate::error::VsaError;

use super::encode::encode_name;
use super::ops::{VsaOps, VsaResult};
use super::{Dimension, HyperVector};

/// A confident decode result.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    /// The registered concept name.
    pub name: String,
    /// Similarity between the query and the concept's prototype.
    pub similarity: f32,
}

/// Registry of named prototypes with nearest-match decoding.
///
/// Entries keep insertion order; decode ties resolve to the earlier entry.
#[derive(Debug, Clone)]
pub struct CleanupMemory {
    dim: Dimension,
    names: Vec<String>,
    prototypes: Vec<HyperVector>,
    index: HashMap<String, usize>,
}

impl CleanupMemory {
    /// Create an empty registry for vectors of the given dimension.
    pub fn new(dim: Dimension) -> Self {
        Self {
            dim,
            names: Vec::new(),
            prototypes: Vec::new(),
            index: HashMap::new(),
        }
    }

    fn check_dim(&self, dim: Dimension) -> VsaResult<()> {
        if dim != self.dim {
            return Err(VsaError::DimensionMismatch {
                expected: self.dim.0,
                actual: dim.0,
            });
        }
        Ok(())
    }

    /// Get the prototype for `name`, creating it if it doesn't exist.
    ///
    /// The first definition wins; later calls return the registered vector.
    pub fn define(&mut self, ops: &VsaOps, name: &str) -> VsaResult<HyperVector> {
        if let Some(&idx) = self.index.get(name) {
            return Ok(self.prototypes[idx].clone());
        }
        self.check_dim(ops.dim())?;
        let vec = encode_name(ops, name);
        self.push(name.to_string(), vec.clone());
        Ok(vec)
    }

    /// Define many names at once, generating new prototypes in parallel.
    ///
    /// Registration happens in input order, so the result is identical to
    /// calling [`define`](Self::define) for each name in turn. Returns the
    /// number of newly registered concepts.
    pub fn define_batch(&mut self, ops: &VsaOps, names: &[&str]) -> VsaResult<usize> {
        self.check_dim(ops.dim())?;

        let mut fresh: Vec<&str> = Vec::new();
        for &name in names {
            if !self.index.contains_key(name) && !fresh.contains(&name) {
                fresh.push(name);
            }
        }

        let vecs: Vec<(&str, HyperVector)> = fresh
            .par_iter()
            .map(|&name| (name, encode_name(ops, name)))
            .collect();

        let count = vecs.len();
        for (name, vec) in vecs {
            self.push(name.to_string(), vec);
        }
        Ok(count)
    }

    /// Register a specific prototype for `name`.
    ///
    /// First write wins: returns `false` (leaving the registry untouched) if
    /// the name is already defined.
    pub fn insert(&mut self, name: &str, vec: HyperVector) -> VsaResult<bool> {
        self.check_dim(vec.dim())?;
        if self.index.contains_key(name) {
            return Ok(false);
        }
        self.push(name.to_string(), vec);
        Ok(true)
    }

    fn push(&mut self, name: String, vec: HyperVector) {
        self.index.insert(name.clone(), self.names.len());
        self.names.push(name);
        self.prototypes.push(vec);
    }

    /// Decode a query to the best-matching concept name.
    ///
    /// Scans every prototype; the strictly highest similarity wins and is
    /// returned only if it is `> threshold`. `None` means no confident match.
    pub fn decode(
        &self,
        ops: &VsaOps,
        query: &HyperVector,
        threshold: f32,
    ) -> VsaResult<Option<Match>> {
        self.check_dim(query.dim())?;

        let mut best: Option<(usize, f32)> = None;
        for (idx, proto) in self.prototypes.iter().enumerate() {
            let sim = ops.similarity(query, proto)?;
            if best.is_none_or(|(_, best_sim)| sim > best_sim) {
                best = Some((idx, sim));
            }
        }

        Ok(best
            .filter(|&(_, sim)| sim > threshold)
            .map(|(idx, similarity)| Match {
                name: self.names[idx].clone(),
                similarity,
            }))
    }

    /// The `k` most similar concepts to `query`, sorted by descending similarity.
    pub fn top_k(&self, ops: &VsaOps, query: &HyperVector, k: usize) -> VsaResult<Vec<Match>> {
        self.check_dim(query.dim())?;
        let mut scored = Vec::with_capacity(self.prototypes.len());
        for (name, proto) in self.names.iter().zip(&self.prototypes) {
            scored.push(Match {
                name: name.clone(),
                similarity: ops.similarity(query, proto)?,
            });
        }
        scored.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        scored.truncate(k);
        Ok(scored)
    }

    /// Get the prototype for a name, if it exists.
    pub fn get(&self, name: &str) -> Option<&HyperVector> {
        self.index.get(name).map(|&idx| &self.prototypes[idx])
    }

    /// Check if a name has been defined.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Number of concepts stored.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// The dimension of every stored prototype.
    pub fn dim(&self) -> Dimension {
        self.dim
    }

    /// Registered names in definition order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Iterate over `(name, prototype)` pairs in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &HyperVector)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.prototypes.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simd;

    fn test_ops() -> VsaOps {
        VsaOps::new(simd::best_kernel(), Dimension::TEST)
    }

    #[test]
    fn define_is_idempotent() {
        let ops = test_ops();
        let mut mem = CleanupMemory::new(Dimension::TEST);
        let v1 = mem.define(&ops, "Sky").unwrap();
        let v2 = mem.define(&ops, "Sky").unwrap();
        assert_eq!(v1, v2);
        assert_eq!(mem.len(), 1);
        assert_eq!(v1, encode_name(&ops, "Sky"));
    }

    #[test]
    fn first_write_wins() {
        let ops = test_ops();
        let mut mem = CleanupMemory::new(Dimension::TEST);
        let custom = ops.seeded(12345);
        assert!(mem.insert("Sky", custom.clone()).unwrap());
        assert!(!mem.insert("Sky", ops.seeded(1)).unwrap());
        assert_eq!(mem.define(&ops, "Sky").unwrap(), custom);
    }

    #[test]
    fn decode_finds_self() {
        let ops = test_ops();
        let mut mem = CleanupMemory::new(Dimension::TEST);
        for name in ["Sun", "Moon", "Star", "Comet", "Planet"] {
            mem.define(&ops, name).unwrap();
        }
        let query = encode_name(&ops, "Star");
        let hit = mem.decode(&ops, &query, 0.5).unwrap().unwrap();
        assert_eq!(hit.name, "Star");
        assert_eq!(hit.similarity, 1.0);
    }

    #[test]
    fn decode_tolerates_noise() {
        let ops = test_ops();
        let mut mem = CleanupMemory::new(Dimension::TEST);
        for name in ["red", "green", "blue"] {
            mem.define(&ops, name).unwrap();
        }
        // Flip the first 20% of components of "green".
        let mut words = mem.get("green").unwrap().words().to_vec();
        for i in 0..200 {
            words[i / 64] ^= 1 << (i % 64);
        }
        let noisy = HyperVector::from_words(words, Dimension::TEST).unwrap();
        let hit = mem.decode(&ops, &noisy, 0.6).unwrap().unwrap();
        assert_eq!(hit.name, "green");
        assert!((hit.similarity - 0.8).abs() < 1e-6);
    }

    #[test]
    fn decode_threshold_is_strict() {
        let ops = test_ops();
        let mut mem = CleanupMemory::new(Dimension::TEST);
        let sky = mem.define(&ops, "Sky").unwrap();
        // Exact match has similarity 1.0; a threshold of exactly 1.0 must reject it.
        assert!(mem.decode(&ops, &sky, 1.0).unwrap().is_none());
        assert!(mem.decode(&ops, &sky, 0.999).unwrap().is_some());
    }

    #[test]
    fn decode_empty_registry_is_unknown() {
        let ops = test_ops();
        let mem = CleanupMemory::new(Dimension::TEST);
        let q = ops.seeded(5);
        assert!(mem.decode(&ops, &q, 0.0).unwrap().is_none());
    }

    #[test]
    fn decode_rejects_mismatched_query() {
        let ops = test_ops();
        let mem = CleanupMemory::new(Dimension::TEST);
        let q = HyperVector::zero(Dimension(64));
        assert!(matches!(
            mem.decode(&ops, &q, 0.5),
            Err(VsaError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn define_batch_matches_sequential_define() {
        let ops = test_ops();
        let mut batch = CleanupMemory::new(Dimension::TEST);
        let added = batch
            .define_batch(&ops, &["a", "b", "a", "c"])
            .unwrap();
        assert_eq!(added, 3);

        let mut seq = CleanupMemory::new(Dimension::TEST);
        for name in ["a", "b", "c"] {
            seq.define(&ops, name).unwrap();
        }
        assert_eq!(batch.names(), seq.names());
        for (name, vec) in seq.iter() {
            assert_eq!(batch.get(name), Some(vec));
        }
        assert_eq!(batch.define_batch(&ops, &["c", "d"]).unwrap(), 1);
    }

    #[test]
    fn top_k_is_sorted() {
        let ops = test_ops();
        let mut mem = CleanupMemory::new(Dimension::TEST);
        for name in ["w", "x", "y", "z"] {
            mem.define(&ops, name).unwrap();
        }
        let q = encode_name(&ops, "y");
        let top = mem.top_k(&ops, &q, 3).unwrap();
        assert_eq!(top.len(), 3);
        assert_eq!(top[0].name, "y");
        assert!(top.windows(2).all(|w| w[0].similarity >= w[1].similarity));
    }
}
