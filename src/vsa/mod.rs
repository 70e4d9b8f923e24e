//! Vector Symbolic Architecture (VSA) core.
//!
//! This module implements hyperdimensional computing (HDC) with configurable
//! dimensions (default 10,000). It provides:
//!
//! - [`HyperVector`]: the fundamental fixed-width bit vector
//! - [`VsaOps`](ops::VsaOps): seeded generation, bind, bundle, permute, similarity
//! - [`CleanupMemory`](cleanup::CleanupMemory): name ↔ prototype registry with nearest-match decode
//! - [`WeightedBundler`](bundler::WeightedBundler): lazy, weight-aware superposition
//! - Encoding from names to deterministic seeds

pub mod bundler;
pub mod cleanup;
pub mod encode;
pub mod ops;

use serde::{Deserialize, Serialize};

use crate::error::VsaError;
use ops::VsaResult;

/// Configurable hypervector dimensionality.
///
/// Typical values: 10,000 for good capacity, 1,000 for testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimension(pub usize);

impl Dimension {
    /// Standard high-capacity dimension.
    pub const DEFAULT: Self = Self(10_000);

    /// Smaller dimension for fast testing.
    pub const TEST: Self = Self(1_000);

    /// Number of `u64` words needed to store a vector at this dimension.
    pub fn word_len(self) -> usize {
        self.0.div_ceil(64)
    }

    /// Mask of the valid bits in the last storage word.
    pub fn tail_mask(self) -> u64 {
        match self.0 % 64 {
            0 => u64::MAX,
            used => (1u64 << used) - 1,
        }
    }
}

impl Default for Dimension {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A hypervector: a symbol or composite meaning.
///
/// Stores `dim` bits packed into `u64` words. Component `i` is bit `i % 64`
/// of word `i / 64`; bits past `dim` in the last word are always zero.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HyperVector {
    words: Vec<u64>,
    dim: Dimension,
}

impl HyperVector {
    /// Build a hypervector from packed words, validating the layout.
    ///
    /// Fails when the word count doesn't match `dim` or when bits beyond the
    /// last component are set.
    pub fn from_words(words: Vec<u64>, dim: Dimension) -> VsaResult<Self> {
        if dim.0 == 0 {
            return Err(VsaError::InvalidDimension { dim: dim.0 });
        }
        if words.len() != dim.word_len() {
            return Err(VsaError::MalformedVector {
                message: format!(
                    "expected {} words for dimension {}, got {}",
                    dim.word_len(),
                    dim.0,
                    words.len()
                ),
            });
        }
        if let Some(&last) = words.last() {
            if last & !dim.tail_mask() != 0 {
                return Err(VsaError::MalformedVector {
                    message: format!("bits set beyond component {}", dim.0 - 1),
                });
            }
        }
        Ok(Self { words, dim })
    }

    /// Construct without validation; callers guarantee the layout invariant.
    pub(crate) fn from_words_unchecked(words: Vec<u64>, dim: Dimension) -> Self {
        debug_assert_eq!(words.len(), dim.word_len());
        Self { words, dim }
    }

    /// Create a zero hypervector (all bits 0).
    pub fn zero(dim: Dimension) -> Self {
        Self {
            words: vec![0u64; dim.word_len()],
            dim,
        }
    }

    /// Packed word data of this hypervector.
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    pub(crate) fn words_mut(&mut self) -> &mut [u64] {
        &mut self.words
    }

    /// The dimension of this hypervector.
    pub fn dim(&self) -> Dimension {
        self.dim
    }

    /// Get a single component. Returns `true` if the bit is 1.
    pub fn get_bit(&self, index: usize) -> bool {
        debug_assert!(index < self.dim.0);
        (self.words[index / 64] >> (index % 64)) & 1 == 1
    }

    /// Number of components set to 1.
    pub fn count_ones(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }

    /// Fraction of components set to 1.
    pub fn density(&self) -> f32 {
        self.count_ones() as f32 / self.dim.0 as f32
    }

    /// Consume the vector, returning its packed words.
    pub fn into_words(self) -> Vec<u64> {
        self.words
    }
}

impl std::fmt::Display for HyperVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HV[{}/{} bits set]", self.count_ones(), self.dim.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_word_lengths() {
        assert_eq!(Dimension(1).word_len(), 1);
        assert_eq!(Dimension(64).word_len(), 1);
        assert_eq!(Dimension(65).word_len(), 2);
        assert_eq!(Dimension(10_000).word_len(), 157);
        assert_eq!(Dimension(64).tail_mask(), u64::MAX);
        assert_eq!(Dimension(10_000).tail_mask(), 0xFFFF);
    }

    #[test]
    fn zero_vector_has_no_bits() {
        let hv = HyperVector::zero(Dimension::TEST);
        assert_eq!(hv.dim(), Dimension::TEST);
        assert_eq!(hv.count_ones(), 0);
        assert_eq!(hv.words().len(), 16);
    }

    #[test]
    fn from_words_rejects_wrong_length() {
        let err = HyperVector::from_words(vec![0; 3], Dimension(64)).unwrap_err();
        assert!(matches!(err, VsaError::MalformedVector { .. }));
    }

    #[test]
    fn from_words_rejects_tail_bits() {
        let err = HyperVector::from_words(vec![0, 1 << 40], Dimension(100)).unwrap_err();
        assert!(matches!(err, VsaError::MalformedVector { .. }));

        let ok = HyperVector::from_words(vec![u64::MAX, (1 << 36) - 1], Dimension(100)).unwrap();
        assert_eq!(ok.count_ones(), 100);
        assert!(ok.get_bit(99));
    }

    #[test]
    fn from_words_rejects_zero_dimension() {
        let err = HyperVector::from_words(Vec::new(), Dimension(0)).unwrap_err();
        assert!(matches!(err, VsaError::InvalidDimension { dim: 0 }));
    }
}
