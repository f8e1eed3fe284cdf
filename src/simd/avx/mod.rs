//! AVX / AVX2 lowering of the primitive layer on 256-bit `ymm` registers.
//!
//! Float lanes need AVX. Integer lanes need AVX2; with AVX alone they keep the
//! lane-wise defaults, and the ABI layer does not consider them native.
//!
//! Most AVX2 integer instructions operate on two independent 128-bit halves.
//! Pack/unpack pairs are used only where both directions stay inside a half,
//! which preserves lane order.

#[cfg(target_arch = "x86")]
use std::arch::x86::*;

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use crate::simd::sse;
use crate::simd::storage::{Register, Storage};

mod float;
#[cfg(have_avx2)]
mod int;
#[cfg(not(have_avx2))]
mod int_fallback;

// SAFETY: AVX registers are plain 256-bit values; every bit pattern is valid.
unsafe impl Register for __m256 {}
unsafe impl Register for __m256d {}
unsafe impl Register for __m256i {}

/// Moves the register down by `bytes`, filling with zeros.
#[inline(always)]
pub(crate) fn shift_bytes_down(a: __m256i, bytes: usize) -> __m256i {
    unsafe {
        match bytes {
            0 => a,
            16 => _mm256_permute2f128_si256::<0x81>(a, a),
            b if b >= 32 => _mm256_setzero_si256(),
            b => {
                let a = Storage::<u8, __m256i>::from_raw(a);
                let mut out = Storage::<u8, __m256i>::zeroed();
                for i in 0..32 - b {
                    out.set(i, a.get(i + b));
                }
                out.raw()
            }
        }
    }
}

/// Full-width mask with lane `i` set where bit `i` of `bits` is set. Built
/// from two SSE halves so that it needs no AVX2.
#[inline(always)]
pub(crate) fn bits_to_mask(bits: u64, lane_bytes: usize) -> __m256i {
    let per_half = 16 / lane_bytes;
    let lo = sse::bits_to_mask(bits, lane_bytes);
    let hi = sse::bits_to_mask(bits >> per_half, lane_bytes);
    unsafe { _mm256_set_m128i(hi, lo) }
}
