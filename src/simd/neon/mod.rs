//! NEON (AArch64 Advanced SIMD) lowering of the primitive layer.
//!
//! Masks are unsigned registers of the lane width with all-ones / all-zeros
//! lanes, as produced by `vceq`/`vclt`/`vcle`. NEON has no movemask: the
//! bitset is formed by ANDing the mask with per-lane powers of two and summing
//! across the register; the reverse direction uses `vtst` against the same
//! weights.

use std::arch::aarch64::*;

use crate::simd::storage::{Register, Storage};

mod float;
mod int;

macro_rules! neon_registers {
    ($($t:ty),*) => {
        $(
            // SAFETY: NEON vector types are plain 128-bit values.
            unsafe impl Register for $t {}
        )*
    };
}

neon_registers!(
    int8x16_t, uint8x16_t, int16x8_t, uint16x8_t, int32x4_t, uint32x4_t, int64x2_t, uint64x2_t,
    float32x4_t, float64x2_t
);

const BYTE_WEIGHTS: [u8; 16] = [1, 2, 4, 8, 16, 32, 64, 128, 1, 2, 4, 8, 16, 32, 64, 128];
const HALF_WEIGHTS: [u16; 8] = [1, 2, 4, 8, 16, 32, 64, 128];
const WORD_WEIGHTS: [u32; 4] = [1, 2, 4, 8];
const DOUBLE_WEIGHTS: [u64; 2] = [1, 2];

#[inline(always)]
pub(crate) fn movemask_u8(k: uint8x16_t) -> u64 {
    unsafe {
        let weighted = vandq_u8(k, vld1q_u8(BYTE_WEIGHTS.as_ptr()));
        let lo = vaddv_u8(vget_low_u8(weighted)) as u64;
        let hi = vaddv_u8(vget_high_u8(weighted)) as u64;
        lo | (hi << 8)
    }
}

#[inline(always)]
pub(crate) fn movemask_u16(k: uint16x8_t) -> u64 {
    unsafe { vaddvq_u16(vandq_u16(k, vld1q_u16(HALF_WEIGHTS.as_ptr()))) as u64 }
}

#[inline(always)]
pub(crate) fn movemask_u32(k: uint32x4_t) -> u64 {
    unsafe { vaddvq_u32(vandq_u32(k, vld1q_u32(WORD_WEIGHTS.as_ptr()))) as u64 }
}

#[inline(always)]
pub(crate) fn movemask_u64(k: uint64x2_t) -> u64 {
    unsafe { vaddvq_u64(vandq_u64(k, vld1q_u64(DOUBLE_WEIGHTS.as_ptr()))) }
}

#[inline(always)]
pub(crate) fn mask_u8(bits: u64) -> uint8x16_t {
    unsafe {
        let spread = vcombine_u8(vdup_n_u8(bits as u8), vdup_n_u8((bits >> 8) as u8));
        vtstq_u8(spread, vld1q_u8(BYTE_WEIGHTS.as_ptr()))
    }
}

#[inline(always)]
pub(crate) fn mask_u16(bits: u64) -> uint16x8_t {
    unsafe { vtstq_u16(vdupq_n_u16(bits as u16), vld1q_u16(HALF_WEIGHTS.as_ptr())) }
}

#[inline(always)]
pub(crate) fn mask_u32(bits: u64) -> uint32x4_t {
    unsafe { vtstq_u32(vdupq_n_u32(bits as u32), vld1q_u32(WORD_WEIGHTS.as_ptr())) }
}

#[inline(always)]
pub(crate) fn mask_u64(bits: u64) -> uint64x2_t {
    unsafe { vtstq_u64(vdupq_n_u64(bits), vld1q_u64(DOUBLE_WEIGHTS.as_ptr())) }
}

/// Moves the register down by `bytes`, filling with zeros.
#[inline(always)]
pub(crate) fn shift_bytes_down(a: uint8x16_t, bytes: usize) -> uint8x16_t {
    unsafe {
        let zero = vdupq_n_u8(0);
        match bytes {
            0 => a,
            1 => vextq_u8::<1>(a, zero),
            2 => vextq_u8::<2>(a, zero),
            4 => vextq_u8::<4>(a, zero),
            8 => vextq_u8::<8>(a, zero),
            b if b >= 16 => zero,
            b => {
                let a = Storage::<u8, uint8x16_t>::from_raw(a);
                let mut out = Storage::<u8, uint8x16_t>::zeroed();
                for i in 0..16 - b {
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
    fn test_movemask_roundtrip() {
        for bits in [0u64, 1, 0x8001, 0xA5A5, 0xFFFF] {
            assert_eq!(movemask_u8(mask_u8(bits)), bits);
            assert_eq!(movemask_u16(mask_u16(bits)), bits & 0xFF);
            assert_eq!(movemask_u32(mask_u32(bits)), bits & 0xF);
            assert_eq!(movemask_u64(mask_u64(bits)), bits & 0x3);
        }
    }

    #[test]
    fn test_shift_bytes_down() {
        let a = Storage::<u8, uint8x16_t>::from_lanes(std::array::from_fn::<u8, 16, _>(|i| i as u8));
        for bytes in [0usize, 1, 3, 8, 16] {
            let out = Storage::<u8, uint8x16_t>::from_raw(shift_bytes_down(a.raw(), bytes));
            for i in 0..16 {
                let expected = if i + bytes < 16 { a.get(i + bytes) } else { 0 };
                assert_eq!(out.get(i), expected);
            }
        }
    }
}
