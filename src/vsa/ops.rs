//! VSA operations: seeded generation, bind, bundle, permute, similarity.
//!
//! These are the core algebraic operations of the Vector Symbolic Architecture.
//! Word-level work is dispatched through the SIMD kernel.

use rand::{Rng, SeedableRng};

use crate::error::VsaError;
use crate::simd::VsaKernel;

use super::{Dimension, HyperVector};

/// Result type for VSA operations.
pub type VsaResult<T> = std::result::Result<T, VsaError>;

/// Ensure two hypervectors have matching dimensions.
fn check_compatible(a: &HyperVector, b: &HyperVector) -> VsaResult<()> {
    if a.dim() != b.dim() {
        return Err(VsaError::DimensionMismatch {
            expected: a.dim().0,
            actual: b.dim().0,
        });
    }
    Ok(())
}

/// VSA operations backed by a SIMD kernel.
pub struct VsaOps {
    kernel: Box<dyn VsaKernel>,
    dim: Dimension,
}

impl VsaOps {
    /// Create VSA operations with the given kernel and dimension.
    pub fn new(kernel: Box<dyn VsaKernel>, dim: Dimension) -> Self {
        Self { kernel, dim }
    }

    /// The dimension these ops generate vectors at.
    pub fn dim(&self) -> Dimension {
        self.dim
    }

    /// The SIMD instruction set level this kernel uses.
    pub fn isa_level(&self) -> crate::simd::IsaLevel {
        self.kernel.isa_level()
    }

    /// Generate a random hypervector using the given RNG.
    ///
    /// Every component is an independent fair coin flip.
    pub fn random(&self, rng: &mut impl Rng) -> HyperVector {
        let mut words: Vec<u64> = (0..self.dim.word_len()).map(|_| rng.r#gen()).collect();
        if let Some(last) = words.last_mut() {
            *last &= self.dim.tail_mask();
        }
        HyperVector::from_words_unchecked(words, self.dim)
    }

    /// Deterministic hypervector for a seed: the same seed always yields the same bits.
    pub fn seeded(&self, seed: u64) -> HyperVector {
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        self.random(&mut rng)
    }

    /// Bind two hypervectors (XOR).
    ///
    /// Binding creates a representation that is dissimilar to both inputs,
    /// the VSA equivalent of role-filler pairing. It is self-inverse and
    /// commutative: `bind(bind(a, b), b) == a`.
    pub fn bind(&self, a: &HyperVector, b: &HyperVector) -> VsaResult<HyperVector> {
        check_compatible(a, b)?;
        let mut out = vec![0u64; a.words().len()];
        self.kernel.xor_words(a.words(), b.words(), &mut out);
        Ok(HyperVector::from_words_unchecked(out, a.dim()))
    }

    /// Unbind (same as bind, since XOR is its own inverse).
    pub fn unbind(&self, bound: &HyperVector, key: &HyperVector) -> VsaResult<HyperVector> {
        self.bind(bound, key)
    }

    /// Superpose `src` into `acc` in place.
    ///
    /// For every component where `src` is 1, the corresponding component of
    /// `acc` is set to 1 with probability 0.5. Components are never cleared,
    /// so repeated bundling drifts toward the union of the operands' 1-bits.
    pub fn bundle_into(
        &self,
        acc: &mut HyperVector,
        src: &HyperVector,
        rng: &mut impl Rng,
    ) -> VsaResult<()> {
        check_compatible(acc, src)?;
        // Each bit of a uniformly random word is an independent Bernoulli(0.5) draw.
        let mask: Vec<u64> = (0..src.words().len()).map(|_| rng.r#gen()).collect();
        self.kernel
            .or_masked_words(acc.words_mut(), src.words(), &mask);
        Ok(())
    }

    /// Non-mutating form of [`bundle_into`](Self::bundle_into).
    pub fn bundle(
        &self,
        a: &HyperVector,
        b: &HyperVector,
        rng: &mut impl Rng,
    ) -> VsaResult<HyperVector> {
        let mut out = a.clone();
        self.bundle_into(&mut out, b, rng)?;
        Ok(out)
    }

    /// Permute a hypervector by a cyclic rotation of `shift` positions.
    ///
    /// Component `i` moves to `(i + shift) mod D`; a negative shift rotates
    /// the other way, so `permute(permute(v, k), -k) == v`.
    pub fn permute(&self, v: &HyperVector, shift: isize) -> HyperVector {
        let dim = v.dim().0;
        if dim == 0 {
            return v.clone();
        }
        let shift = shift.rem_euclid(dim as isize) as usize;
        let mut out = vec![0u64; v.words().len()];
        self.kernel.rotate(v.words(), dim, shift, &mut out);
        HyperVector::from_words_unchecked(out, v.dim())
    }

    /// Number of components on which `a` and `b` differ (popcount of `a XOR b`).
    pub fn hamming_distance(&self, a: &HyperVector, b: &HyperVector) -> VsaResult<u32> {
        check_compatible(a, b)?;
        Ok(self.kernel.hamming_words(a.words(), b.words()))
    }

    /// Compute similarity between two hypervectors.
    ///
    /// Returns normalized Hamming similarity in `[0.0, 1.0]` where 1.0 means
    /// identical and 0.5 means uncorrelated (random).
    pub fn similarity(&self, a: &HyperVector, b: &HyperVector) -> VsaResult<f32> {
        let hamming = self.hamming_distance(a, b)?;
        Ok(1.0 - (hamming as f32 / a.dim().0 as f32))
    }
}

impl std::fmt::Debug for VsaOps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VsaOps")
            .field("dim", &self.dim)
            .field("isa", &self.kernel.isa_level())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simd;

    fn test_ops() -> VsaOps {
        VsaOps::new(simd::best_kernel(), Dimension::TEST)
    }

    fn seeded_rng() -> rand::rngs::StdRng {
        rand::rngs::StdRng::seed_from_u64(42)
    }

    #[test]
    fn seeded_is_deterministic() {
        let ops = test_ops();
        let a = ops.seeded(7);
        let b = ops.seeded(7);
        assert_eq!(a, b);
        assert_eq!(ops.similarity(&a, &b).unwrap(), 1.0);
        assert_ne!(a, ops.seeded(8));
    }

    #[test]
    fn seeded_respects_tail_invariant() {
        let ops = VsaOps::new(simd::best_kernel(), Dimension(10_000));
        let v = ops.seeded(99);
        assert_eq!(v.words().last().unwrap() & !Dimension(10_000).tail_mask(), 0);
        // Roughly half the bits are set.
        let density = v.density();
        assert!(density > 0.45 && density < 0.55, "density={density}");
    }

    #[test]
    fn random_vectors_are_roughly_uncorrelated() {
        let ops = test_ops();
        let mut rng = seeded_rng();
        let a = ops.random(&mut rng);
        let b = ops.random(&mut rng);
        let sim = ops.similarity(&a, &b).unwrap();
        assert!(sim > 0.4 && sim < 0.6, "similarity was {sim}, expected ~0.5");
    }

    #[test]
    fn seeded_pairs_average_near_half() {
        let ops = VsaOps::new(simd::best_kernel(), Dimension::DEFAULT);
        let pairs = 200u64;
        let total: f32 = (0..pairs)
            .map(|i| {
                ops.similarity(&ops.seeded(2 * i), &ops.seeded(2 * i + 1))
                    .unwrap()
            })
            .sum();
        let mean = total / pairs as f32;
        assert!((0.45..=0.55).contains(&mean), "mean similarity {mean}");
    }

    #[test]
    fn self_similarity_is_one() {
        let ops = test_ops();
        let mut rng = seeded_rng();
        for _ in 0..10 {
            let a = ops.random(&mut rng);
            assert_eq!(ops.similarity(&a, &a).unwrap(), 1.0);
        }
    }

    #[test]
    fn bind_is_dissimilar_to_inputs() {
        let ops = test_ops();
        let mut rng = seeded_rng();
        let a = ops.random(&mut rng);
        let b = ops.random(&mut rng);
        let bound = ops.bind(&a, &b).unwrap();

        let sim_a = ops.similarity(&bound, &a).unwrap();
        let sim_b = ops.similarity(&bound, &b).unwrap();
        assert!(sim_a > 0.4 && sim_a < 0.6, "sim_a={sim_a}");
        assert!(sim_b > 0.4 && sim_b < 0.6, "sim_b={sim_b}");
    }

    #[test]
    fn bind_is_an_involution_and_commutative() {
        let ops = test_ops();
        let mut rng = seeded_rng();
        for _ in 0..20 {
            let a = ops.random(&mut rng);
            let b = ops.random(&mut rng);
            let ab = ops.bind(&a, &b).unwrap();
            assert_eq!(ops.bind(&ab, &b).unwrap(), a);
            assert_eq!(ops.unbind(&ab, &a).unwrap(), b);
            assert_eq!(ab, ops.bind(&b, &a).unwrap());
        }
    }

    #[test]
    fn bundle_never_clears_bits() {
        let ops = test_ops();
        let mut rng = seeded_rng();
        let a = ops.random(&mut rng);
        let b = ops.random(&mut rng);
        let bundled = ops.bundle(&a, &b, &mut rng).unwrap();

        for i in 0..ops.dim().0 {
            if a.get_bit(i) {
                assert!(bundled.get_bit(i), "bit {i} was cleared");
            }
            if bundled.get_bit(i) {
                assert!(a.get_bit(i) || b.get_bit(i), "bit {i} appeared from nowhere");
            }
        }
    }

    #[test]
    fn bundle_sets_about_half_of_the_new_bits() {
        let ops = VsaOps::new(simd::best_kernel(), Dimension::DEFAULT);
        let mut rng = seeded_rng();
        let zero = HyperVector::zero(ops.dim());
        let b = ops.random(&mut rng);
        let bundled = ops.bundle(&zero, &b, &mut rng).unwrap();
        let ratio = bundled.count_ones() as f32 / b.count_ones() as f32;
        assert!(ratio > 0.45 && ratio < 0.55, "ratio={ratio}");
    }

    #[test]
    fn permute_is_dissimilar() {
        let ops = test_ops();
        let mut rng = seeded_rng();
        let a = ops.random(&mut rng);
        let permuted = ops.permute(&a, 1);
        let sim = ops.similarity(&a, &permuted).unwrap();
        assert!(sim > 0.4 && sim < 0.6, "sim={sim}");
    }

    #[test]
    fn permute_has_an_inverse() {
        let ops = VsaOps::new(simd::best_kernel(), Dimension(10_000));
        let v = ops.seeded(3);
        for k in [1isize, 2, 63, 64, 65, 9_999, 10_000, 25_017, -1, -2, -130] {
            let there = ops.permute(&v, k);
            assert_eq!(ops.permute(&there, -k), v, "k={k}");
        }
        assert_eq!(ops.permute(&v, 0), v);
        assert_eq!(ops.permute(&v, 10_000), v);
    }

    #[test]
    fn permute_moves_single_bit() {
        let ops = VsaOps::new(simd::best_kernel(), Dimension(100));
        let v = HyperVector::from_words(vec![1, 0], Dimension(100)).unwrap();
        let moved = ops.permute(&v, -1);
        assert!(moved.get_bit(99));
        assert_eq!(moved.count_ones(), 1);
    }

    #[test]
    fn hamming_distance_counts_differences() {
        let ops = VsaOps::new(simd::best_kernel(), Dimension(100));
        let zero = HyperVector::zero(Dimension(100));
        let ones = HyperVector::from_words(vec![u64::MAX, (1 << 36) - 1], Dimension(100)).unwrap();
        assert_eq!(ops.hamming_distance(&zero, &ones).unwrap(), 100);
        assert_eq!(ops.similarity(&zero, &ones).unwrap(), 0.0);
    }

    #[test]
    fn dimension_mismatch_detected() {
        let ops = test_ops();
        let a = HyperVector::zero(Dimension(100));
        let mut b = HyperVector::zero(Dimension(200));
        let mut rng = seeded_rng();
        assert!(matches!(ops.bind(&a, &b), Err(VsaError::DimensionMismatch { .. })));
        assert!(matches!(ops.similarity(&a, &b), Err(VsaError::DimensionMismatch { .. })));
        assert!(matches!(
            ops.bundle_into(&mut b, &a, &mut rng),
            Err(VsaError::DimensionMismatch { expected: 200, actual: 100 })
        ));
    }
}
