//! AVX512 lowering of the primitive layer on 512-bit `zmm` registers.
//!
//! Comparisons produce `k` mask registers (`__mmask8` .. `__mmask64`), which
//! are bitsets already, so mask conversions are plain integer casts and blends
//! use the `mask_blend` family. 8- and 16-bit lanes need AVX512BW; without it
//! they keep the lane-wise defaults with a full-width register as the mask.

#[cfg(target_arch = "x86")]
use std::arch::x86::*;

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use crate::simd::storage::{Register, Storage};

mod float;
mod int;

// SAFETY: AVX512 registers are plain 512-bit values; every bit pattern is
// valid.
unsafe impl Register for __m512 {}
unsafe impl Register for __m512d {}
unsafe impl Register for __m512i {}

/// Moves the register down by `bytes`, filling with zeros.
#[inline(always)]
pub(crate) fn shift_bytes_down(a: __m512i, bytes: usize) -> __m512i {
    unsafe {
        let zero = _mm512_setzero_si512();
        match bytes {
            0 => a,
            4 => _mm512_alignr_epi32::<1>(zero, a),
            8 => _mm512_alignr_epi32::<2>(zero, a),
            16 => _mm512_alignr_epi32::<4>(zero, a),
            32 => _mm512_alignr_epi32::<8>(zero, a),
            b if b >= 64 => zero,
            b => {
                let a = Storage::<u8, __m512i>::from_raw(a);
                let mut out = Storage::<u8, __m512i>::zeroed();
                for i in 0..64 - b {
                    out.set(i, a.get(i + b));
                }
                out.raw()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shift_bytes_down() {
        let a = Storage::<u8, __m512i>::from_lanes(std::array::from_fn::<u8, 64, _>(|i| i as u8 + 1));
        for bytes in [0usize, 2, 4, 8, 16, 32, 40, 64] {
            let out = Storage::<u8, __m512i>::from_raw(shift_bytes_down(a.raw(), bytes));
            for i in 0..64 {
                let expected = if i + bytes < 64 { a.get(i + bytes) } else { 0 };
                assert_eq!(out.get(i), expected, "bytes={bytes} lane={i}");
            }
        }
    }
}
