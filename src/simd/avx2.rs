//! AVX2 (256-bit) SIMD kernel for x86_64 VSA operations.
//!
//! Processes four `u64` words per register and falls through to scalar code
//! for tail words that don't fill a full 256-bit register.

use super::{IsaLevel, VsaKernel};

/// AVX2-accelerated VSA kernel.
///
/// Uses 256-bit SIMD for bulk operations and scalar fallback for tails.
#[derive(Debug, Clone, Copy)]
pub struct Avx2Kernel;

#[cfg(target_arch = "x86_64")]
impl VsaKernel for Avx2Kernel {
    fn isa_level(&self) -> IsaLevel {
        IsaLevel::Avx2
    }

    fn xor_words(&self, a: &[u64], b: &[u64], out: &mut [u64]) {
        debug_assert_eq!(a.len(), b.len());
        debug_assert_eq!(a.len(), out.len());

        if is_x86_feature_detected!("avx2") {
            // Safety: we've confirmed AVX2 support at runtime.
            unsafe { self.xor_words_avx2(a, b, out) }
        } else {
            super::generic::GenericKernel.xor_words(a, b, out);
        }
    }

    fn or_masked_words(&self, acc: &mut [u64], src: &[u64], mask: &[u64]) {
        debug_assert_eq!(acc.len(), src.len());
        debug_assert_eq!(acc.len(), mask.len());

        if is_x86_feature_detected!("avx2") {
            unsafe { self.or_masked_words_avx2(acc, src, mask) }
        } else {
            super::generic::GenericKernel.or_masked_words(acc, src, mask);
        }
    }

    fn hamming_words(&self, a: &[u64], b: &[u64]) -> u32 {
        // AVX2 has no vector popcount; scalar popcnt on u64 is already one instruction per word.
        super::generic::GenericKernel.hamming_words(a, b)
    }

    fn rotate(&self, data: &[u64], dim: usize, shift: usize, out: &mut [u64]) {
        // Cross-word bit rotation doesn't benefit much from SIMD for arbitrary shifts.
        super::generic::GenericKernel.rotate(data, dim, shift, out);
    }
}

#[cfg(target_arch = "x86_64")]
impl Avx2Kernel {
    #[target_feature(enable = "avx2")]
    unsafe fn xor_words_avx2(&self, a: &[u64], b: &[u64], out: &mut [u64]) {
        use std::arch::x86_64::*;

        let len = a.len();
        let chunks = len / 4;

        for i in 0..chunks {
            let offset = i * 4;
            unsafe {
                let va = _mm256_loadu_si256(a.as_ptr().add(offset) as *const __m256i);
                let vb = _mm256_loadu_si256(b.as_ptr().add(offset) as *const __m256i);
                let result = _mm256_xor_si256(va, vb);
                _mm256_storeu_si256(out.as_mut_ptr().add(offset) as *mut __m256i, result);
            }
        }

        // Scalar tail
        for i in chunks * 4..len {
            out[i] = a[i] ^ b[i];
        }
    }

    #[target_feature(enable = "avx2")]
    unsafe fn or_masked_words_avx2(&self, acc: &mut [u64], src: &[u64], mask: &[u64]) {
        use std::arch::x86_64::*;

        let len = acc.len();
        let chunks = len / 4;

        for i in 0..chunks {
            let offset = i * 4;
            unsafe {
                let va = _mm256_loadu_si256(acc.as_ptr().add(offset) as *const __m256i);
                let vs = _mm256_loadu_si256(src.as_ptr().add(offset) as *const __m256i);
                let vm = _mm256_loadu_si256(mask.as_ptr().add(offset) as *const __m256i);
                let result = _mm256_or_si256(va, _mm256_and_si256(vs, vm));
                _mm256_storeu_si256(acc.as_mut_ptr().add(offset) as *mut __m256i, result);
            }
        }

        // Scalar tail
        for i in chunks * 4..len {
            acc[i] |= src[i] & mask[i];
        }
    }
}
