//! SSE lowering of the primitive layer.
//!
//! SSE2 is the baseline; SSE3, SSSE3, SSE4.1, SSE4.2, AVX2 (for the VEX
//! encoded variable shifts on `xmm` registers) and FMA are picked up through
//! the `have_*` cfg flags emitted by the build script. Every override keeps
//! the exact lane semantics of the scalar reference.
//!
//! # Masks
//!
//! A mask is a full `xmm` register whose lanes are all-ones or all-zeros, as
//! produced by the `cmp*` instructions. Conversion to a bitset uses the
//! `movemask` family; the reverse direction ANDs a broadcast of the bitset
//! with per-lane select constants and compares for equality.

#[cfg(target_arch = "x86")]
use std::arch::x86::*;

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use crate::simd::storage::{Register, Storage};

mod float;
mod int;

#[cfg(have_avx)]
pub(crate) use int::bits_to_mask;

// SAFETY: SSE registers are plain 128-bit values; every bit pattern is valid.
unsafe impl Register for __m128 {}
unsafe impl Register for __m128d {}
unsafe impl Register for __m128i {}

/// All bits set.
#[inline(always)]
pub(crate) fn ones() -> __m128i {
    unsafe { _mm_set1_epi32(-1) }
}

/// Moves the register down by `bytes`, filling with zeros.
#[inline(always)]
pub(crate) fn shift_bytes_down(a: __m128i, bytes: usize) -> __m128i {
    unsafe {
        match bytes {
            0 => a,
            1 => _mm_srli_si128::<1>(a),
            2 => _mm_srli_si128::<2>(a),
            4 => _mm_srli_si128::<4>(a),
            8 => _mm_srli_si128::<8>(a),
            b if b >= 16 => _mm_setzero_si128(),
            b => {
                let a = Storage::<u8, __m128i>::from_raw(a);
                let mut out = Storage::<u8, __m128i>::zeroed();
                for i in 0..16 - b {
                    out.set(i, a.get(i + b));
                }
                out.raw()
            }
        }
    }
}

/// Shift count register for the `sll`/`srl`/`sra` family.
#[inline(always)]
pub(crate) fn shift_count(count: u32) -> __m128i {
    unsafe { _mm_cvtsi32_si128(count as i32) }
}

/// `b` where `k` is set, `a` elsewhere.
#[inline(always)]
pub(crate) fn select_si128(k: __m128i, a: __m128i, b: __m128i) -> __m128i {
    unsafe {
        #[cfg(have_sse4_1)]
        {
            _mm_blendv_epi8(a, b, k)
        }
        #[cfg(not(have_sse4_1))]
        {
            _mm_or_si128(_mm_andnot_si128(k, a), _mm_and_si128(k, b))
        }
    }
}

/// Each 64-bit lane filled with its sign bit.
#[inline(always)]
pub(crate) fn sign_fill_epi64(a: __m128i) -> __m128i {
    unsafe { _mm_shuffle_epi32::<0xF5>(_mm_srai_epi32::<31>(a)) }
}

/// Signed 16-bit division through `f32`; exact for every 16-bit quotient.
#[inline(always)]
pub(crate) fn div_epi16(a: __m128i, b: __m128i) -> __m128i {
    unsafe {
        let a_lo = _mm_srai_epi32::<16>(_mm_unpacklo_epi16(a, a));
        let a_hi = _mm_srai_epi32::<16>(_mm_unpackhi_epi16(a, a));
        let b_lo = _mm_srai_epi32::<16>(_mm_unpacklo_epi16(b, b));
        let b_hi = _mm_srai_epi32::<16>(_mm_unpackhi_epi16(b, b));
        narrow_epi32(div_widened(a_lo, b_lo), div_widened(a_hi, b_hi))
    }
}

/// Unsigned 16-bit division through `f32`.
#[inline(always)]
pub(crate) fn div_epu16(a: __m128i, b: __m128i) -> __m128i {
    unsafe {
        let zero = _mm_setzero_si128();
        let a_lo = _mm_unpacklo_epi16(a, zero);
        let a_hi = _mm_unpackhi_epi16(a, zero);
        let b_lo = _mm_unpacklo_epi16(b, zero);
        let b_hi = _mm_unpackhi_epi16(b, zero);
        narrow_epi32(div_widened(a_lo, b_lo), div_widened(a_hi, b_hi))
    }
}

#[inline(always)]
fn div_widened(a: __m128i, b: __m128i) -> __m128i {
    unsafe { _mm_cvttps_epi32(_mm_div_ps(_mm_cvtepi32_ps(a), _mm_cvtepi32_ps(b))) }
}

/// Keeps the low 16 bits of each 32-bit lane, wrapping like `as i16`.
#[inline(always)]
fn narrow_epi32(lo: __m128i, hi: __m128i) -> __m128i {
    unsafe {
        let lo = _mm_srai_epi32::<16>(_mm_slli_epi32::<16>(lo));
        let hi = _mm_srai_epi32::<16>(_mm_slli_epi32::<16>(hi));
        _mm_packs_epi32(lo, hi)
    }
}
