//! Pure-Rust scalar fallback for VSA kernel operations.
//!
//! This implementation works on all platforms and serves as the reference
//! implementation for correctness testing. `u64::count_ones` lowers to the
//! hardware `popcnt` instruction where available.

use super::{IsaLevel, VsaKernel};

/// Pure-Rust scalar VSA kernel with no SIMD intrinsics.
#[derive(Debug, Clone, Copy)]
pub struct GenericKernel;

impl VsaKernel for GenericKernel {
    fn isa_level(&self) -> IsaLevel {
        IsaLevel::Generic
    }

    fn xor_words(&self, a: &[u64], b: &[u64], out: &mut [u64]) {
        debug_assert_eq!(a.len(), b.len());
        debug_assert_eq!(a.len(), out.len());
        for ((o, &av), &bv) in out.iter_mut().zip(a.iter()).zip(b.iter()) {
            *o = av ^ bv;
        }
    }

    fn or_masked_words(&self, acc: &mut [u64], src: &[u64], mask: &[u64]) {
        debug_assert_eq!(acc.len(), src.len());
        debug_assert_eq!(acc.len(), mask.len());
        for ((a, &s), &m) in acc.iter_mut().zip(src.iter()).zip(mask.iter()) {
            *a |= s & m;
        }
    }

    fn hamming_words(&self, a: &[u64], b: &[u64]) -> u32 {
        debug_assert_eq!(a.len(), b.len());
        a.iter()
            .zip(b.iter())
            .map(|(&av, &bv)| (av ^ bv).count_ones())
            .sum()
    }

    fn rotate(&self, data: &[u64], dim: usize, shift: usize, out: &mut [u64]) {
        debug_assert_eq!(data.len(), out.len());
        debug_assert!(shift < dim.max(1));
        if shift == 0 {
            out.copy_from_slice(data);
            return;
        }

        // rotl(v, s) over `dim` bits = (v << s) | (v >> (dim - s)), truncated to `dim`.
        let len = data.len();
        let (lw, lb) = (shift / 64, shift % 64);
        let back = dim - shift;
        let (rw, rb) = (back / 64, back % 64);

        for (i, o) in out.iter_mut().enumerate() {
            let mut left = 0u64;
            if i >= lw {
                left = data[i - lw] << lb;
                if lb > 0 && i > lw {
                    left |= data[i - lw - 1] >> (64 - lb);
                }
            }

            let mut right = 0u64;
            if i + rw < len {
                right = data[i + rw] >> rb;
                if rb > 0 && i + rw + 1 < len {
                    right |= data[i + rw + 1] << (64 - rb);
                }
            }

            *o = left | right;
        }

        let used = dim % 64;
        if used != 0 {
            if let Some(last) = out.last_mut() {
                *last &= (1u64 << used) - 1;
            }
        }
    }
}
