//! SIMD-accelerated kernels for VSA operations.
//!
//! This module provides a `VsaKernel` trait with CPU-specific implementations
//! over packed `u64` words. At runtime, [`detect_isa`] determines the best
//! available instruction set and [`best_kernel`] returns the fastest
//! implementation for the current CPU.
//!
//! # Supported ISA levels
//!
//! - **Generic**: Pure-Rust scalar fallback using hardware popcount, works everywhere
//! - **AVX2**: 256-bit SIMD for x86_64 systems with AVX2 support

pub mod avx2;
pub mod generic;

/// Instruction set architecture level detected at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IsaLevel {
    /// Pure-Rust scalar operations, no SIMD.
    Generic,
    /// x86_64 AVX2 (256-bit vectors).
    Avx2,
}

impl std::fmt::Display for IsaLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IsaLevel::Generic => write!(f, "Generic (scalar)"),
            IsaLevel::Avx2 => write!(f, "AVX2 (256-bit)"),
        }
    }
}

/// Detect the best ISA level available on the current CPU.
pub fn detect_isa() -> IsaLevel {
    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("avx2") {
            return IsaLevel::Avx2;
        }
    }
    IsaLevel::Generic
}

/// Trait for SIMD-accelerated VSA kernels.
///
/// Each method operates on packed `u64` word slices. Bit `i` of a vector is
/// bit `i % 64` of word `i / 64`. All slices passed to one call have the
/// same length.
pub trait VsaKernel: Send + Sync {
    /// The ISA level this kernel targets.
    fn isa_level(&self) -> IsaLevel;

    /// Word-wise XOR: `out[i] = a[i] ^ b[i]`.
    fn xor_words(&self, a: &[u64], b: &[u64], out: &mut [u64]);

    /// Masked one-directional OR: `acc[i] |= src[i] & mask[i]`.
    ///
    /// Bits of `acc` never go from 1 to 0.
    fn or_masked_words(&self, acc: &mut [u64], src: &[u64], mask: &[u64]);

    /// Number of differing bits between `a` and `b`.
    fn hamming_words(&self, a: &[u64], b: &[u64]) -> u32;

    /// Rotate the low `dim` bits of `data` toward higher bit indices by
    /// `shift` positions (`shift < dim`). Bits at or above `dim` stay zero.
    fn rotate(&self, data: &[u64], dim: usize, shift: usize, out: &mut [u64]);
}

/// Return the best available kernel for the current CPU.
pub fn best_kernel() -> Box<dyn VsaKernel> {
    match detect_isa() {
        #[cfg(target_arch = "x86_64")]
        IsaLevel::Avx2 => Box::new(avx2::Avx2Kernel),
        _ => Box::new(generic::GenericKernel),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_isa_returns_valid_level() {
        let level = detect_isa();
        assert!(level >= IsaLevel::Generic);
    }

    #[test]
    fn best_kernel_returns_working_kernel() {
        let kernel = best_kernel();
        assert!(kernel.isa_level() >= IsaLevel::Generic);
    }

    /// Run the full kernel test suite against any implementation.
    pub fn kernel_conformance_tests(kernel: &dyn VsaKernel) {
        // XOR
        let a = vec![u64::MAX; 19];
        let b = vec![0xAAAA_AAAA_AAAA_AAAA_u64; 19];
        let mut out = vec![0u64; 19];
        kernel.xor_words(&a, &b, &mut out);
        assert!(out.iter().all(|&w| w == 0x5555_5555_5555_5555));

        // XOR self = zero
        kernel.xor_words(&a, &a, &mut out);
        assert!(out.iter().all(|&w| w == 0));

        // Masked OR only adds bits
        let mut acc = vec![0xF0F0_F0F0_F0F0_F0F0_u64; 19];
        let src = vec![0x0FF0_0FF0_0FF0_0FF0_u64; 19];
        let mask = vec![0x00FF_00FF_00FF_00FF_u64; 19];
        kernel.or_masked_words(&mut acc, &src, &mask);
        assert!(acc.iter().all(|&w| w == 0xF0F0_F0F0_F0F0_F0F0 | 0x00F0_00F0_00F0_00F0));

        // Hamming
        let zeros = vec![0u64; 19];
        assert_eq!(kernel.hamming_words(&a, &zeros), 19 * 64);
        assert_eq!(kernel.hamming_words(&a, &a), 0);

        // Rotation by one bit within a 70-bit vector wraps bit 69 to bit 0.
        let mut data = vec![0u64; 2];
        data[1] = 1 << 5; // bit 69
        let mut out = vec![0u64; 2];
        kernel.rotate(&data, 70, 1, &mut out);
        assert_eq!(out, vec![1, 0]);

        // Bit 0 moves to bit 64 when rotating by 64.
        let data = vec![1u64, 0];
        kernel.rotate(&data, 70, 64, &mut out);
        assert_eq!(out, vec![0, 1]);
    }

    #[test]
    fn generic_kernel_conformance() {
        kernel_conformance_tests(&generic::GenericKernel);
    }

    #[cfg(target_arch = "x86_64")]
    #[test]
    fn avx2_kernel_conformance() {
        if detect_isa() >= IsaLevel::Avx2 {
            kernel_conformance_tests(&avx2::Avx2Kernel);
        }
    }
}
