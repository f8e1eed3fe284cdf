//! Integer lanes in NEON registers.
//!
//! `vshl` shifts left by positive and right by negative per-lane counts, so
//! common-count shifts clamp the count to the lane width and negate it for
//! right shifts. 64-bit lanes have no multiply, min or max instruction.

use std::arch::aarch64::*;

use super::{
    mask_u16, mask_u32, mask_u64, mask_u8, movemask_u16, movemask_u32, movemask_u64, movemask_u8,
    shift_bytes_down,
};
use crate::simd::element::Vectorizable;
use crate::simd::isa::{zip_lanes, IsaIntLane, IsaLane, Neon};

#[inline(always)]
fn lanewise_mul<T: Vectorizable, R: crate::simd::storage::Register>(a: R, b: R) -> R {
    zip_lanes(a, b, T::lane_mul)
}

#[inline(always)]
fn lanewise_div<T: Vectorizable, R: crate::simd::storage::Register>(a: R, b: R) -> R {
    zip_lanes(a, b, T::lane_div)
}

#[inline(always)]
fn not_u64(a: uint64x2_t) -> uint64x2_t {
    unsafe { veorq_u64(a, vdupq_n_u64(u64::MAX)) }
}

macro_rules! native {
    ($($name:ident($($arg:ident: $ty:ty),*) -> $ret:ty = $op:ident;)*) => {
        $(
            #[inline(always)]
            fn $name($($arg: $ty),*) -> $ret {
                unsafe { $op($($arg),*) }
            }
        )*
    };
}

native! {
    not_u8(a: uint8x16_t) -> uint8x16_t = vmvnq_u8;
    not_u16(a: uint16x8_t) -> uint16x8_t = vmvnq_u16;
    not_u32(a: uint32x4_t) -> uint32x4_t = vmvnq_u32;

    neg_s8(a: int8x16_t) -> int8x16_t = vnegq_s8;
    neg_s16(a: int16x8_t) -> int16x8_t = vnegq_s16;
    neg_s32(a: int32x4_t) -> int32x4_t = vnegq_s32;
    neg_s64(a: int64x2_t) -> int64x2_t = vnegq_s64;
    abs_s8(a: int8x16_t) -> int8x16_t = vabsq_s8;
    abs_s16(a: int16x8_t) -> int16x8_t = vabsq_s16;
    abs_s32(a: int32x4_t) -> int32x4_t = vabsq_s32;
    abs_s64(a: int64x2_t) -> int64x2_t = vabsq_s64;

    mul_s8(a: int8x16_t, b: int8x16_t) -> int8x16_t = vmulq_s8;
    mul_u8(a: uint8x16_t, b: uint8x16_t) -> uint8x16_t = vmulq_u8;
    mul_s16(a: int16x8_t, b: int16x8_t) -> int16x8_t = vmulq_s16;
    mul_u16(a: uint16x8_t, b: uint16x8_t) -> uint16x8_t = vmulq_u16;
    mul_s32(a: int32x4_t, b: int32x4_t) -> int32x4_t = vmulq_s32;
    mul_u32(a: uint32x4_t, b: uint32x4_t) -> uint32x4_t = vmulq_u32;

    min_s8(a: int8x16_t, b: int8x16_t) -> int8x16_t = vminq_s8;
    max_s8(a: int8x16_t, b: int8x16_t) -> int8x16_t = vmaxq_s8;
    min_u8(a: uint8x16_t, b: uint8x16_t) -> uint8x16_t = vminq_u8;
    max_u8(a: uint8x16_t, b: uint8x16_t) -> uint8x16_t = vmaxq_u8;
    min_s16(a: int16x8_t, b: int16x8_t) -> int16x8_t = vminq_s16;
    max_s16(a: int16x8_t, b: int16x8_t) -> int16x8_t = vmaxq_s16;
    min_u16(a: uint16x8_t, b: uint16x8_t) -> uint16x8_t = vminq_u16;
    max_u16(a: uint16x8_t, b: uint16x8_t) -> uint16x8_t = vmaxq_u16;
    min_s32(a: int32x4_t, b: int32x4_t) -> int32x4_t = vminq_s32;
    max_s32(a: int32x4_t, b: int32x4_t) -> int32x4_t = vmaxq_s32;
    min_u32(a: uint32x4_t, b: uint32x4_t) -> uint32x4_t = vminq_u32;
    max_u32(a: uint32x4_t, b: uint32x4_t) -> uint32x4_t = vmaxq_u32;
}

#[inline(always)]
fn identity<R>(a: R) -> R {
    a
}

#[inline(always)]
fn neg_u8(a: uint8x16_t) -> uint8x16_t {
    unsafe { vsubq_u8(vdupq_n_u8(0), a) }
}

#[inline(always)]
fn neg_u16(a: uint16x8_t) -> uint16x8_t {
    unsafe { vsubq_u16(vdupq_n_u16(0), a) }
}

#[inline(always)]
fn neg_u32(a: uint32x4_t) -> uint32x4_t {
    unsafe { vsubq_u32(vdupq_n_u32(0), a) }
}

#[inline(always)]
fn neg_u64(a: uint64x2_t) -> uint64x2_t {
    unsafe { vsubq_u64(vdupq_n_u64(0), a) }
}

#[inline(always)]
fn min_s64(a: int64x2_t, b: int64x2_t) -> int64x2_t {
    unsafe { vbslq_s64(vcltq_s64(a, b), a, b) }
}

#[inline(always)]
fn max_s64(a: int64x2_t, b: int64x2_t) -> int64x2_t {
    unsafe { vbslq_s64(vcltq_s64(b, a), a, b) }
}

#[inline(always)]
fn min_u64(a: uint64x2_t, b: uint64x2_t) -> uint64x2_t {
    unsafe { vbslq_u64(vcltq_u64(a, b), a, b) }
}

#[inline(always)]
fn max_u64(a: uint64x2_t, b: uint64x2_t) -> uint64x2_t {
    unsafe { vbslq_u64(vcltq_u64(b, a), a, b) }
}

macro_rules! neon_int {
    (
        $t:ty, $reg:ty, $mask:ty, $bytes:expr, $bits:expr,
        dup: $dup:ident, load: $load:ident, store: $store:ident,
        add: $add:ident, sub: $sub:ident, mul: $mul:path, neg: $neg:path, abs: $abs:path,
        min: $min:path, max: $max:path,
        and: $and:ident, orr: $orr:ident, eor: $eor:ident, bic: $bic:ident,
        mand: $mand:ident, morr: $morr:ident, meor: $meor:ident, mnot: $mnot:path,
        ceq: $ceq:ident, clt: $clt:ident, cle: $cle:ident, bsl: $bsl:ident,
        movemask: $movemask:path, from_mask: $from_mask:path,
        shl: $shl:ident, count_dup: $count_dup:ident, count_ty: $count_ty:ty,
        to_u8: $to_u8:ident, from_u8: $from_u8:ident, all_ones: $all_ones:expr
    ) => {
        impl IsaLane<Neon> for $t {
            type Reg = $reg;
            type MaskReg = $mask;

            #[inline(always)]
            fn zeroed() -> $reg {
                unsafe { $dup(0) }
            }

            #[inline(always)]
            fn splat(x: $t) -> $reg {
                unsafe { $dup(x) }
            }

            #[inline(always)]
            unsafe fn load_aligned(ptr: *const $t) -> $reg {
                $load(ptr)
            }

            #[inline(always)]
            unsafe fn load_unaligned(ptr: *const $t) -> $reg {
                $load(ptr)
            }

            #[inline(always)]
            unsafe fn store_aligned(ptr: *mut $t, a: $reg) {
                $store(ptr, a)
            }

            #[inline(always)]
            unsafe fn store_unaligned(ptr: *mut $t, a: $reg) {
                $store(ptr, a)
            }

            #[inline(always)]
            fn add(a: $reg, b: $reg) -> $reg {
                unsafe { $add(a, b) }
            }

            #[inline(always)]
            fn sub(a: $reg, b: $reg) -> $reg {
                unsafe { $sub(a, b) }
            }

            #[inline(always)]
            fn mul(a: $reg, b: $reg) -> $reg {
                $mul(a, b)
            }

            #[inline(always)]
            fn div(a: $reg, b: $reg) -> $reg {
                lanewise_div::<$t, $reg>(a, b)
            }

            #[inline(always)]
            fn neg(a: $reg) -> $reg {
                $neg(a)
            }

            #[inline(always)]
            fn abs(a: $reg) -> $reg {
                $abs(a)
            }

            #[inline(always)]
            fn min(a: $reg, b: $reg) -> $reg {
                $min(a, b)
            }

            #[inline(always)]
            fn max(a: $reg, b: $reg) -> $reg {
                $max(a, b)
            }

            #[inline(always)]
            fn bit_and(a: $reg, b: $reg) -> $reg {
                unsafe { $and(a, b) }
            }

            #[inline(always)]
            fn bit_or(a: $reg, b: $reg) -> $reg {
                unsafe { $orr(a, b) }
            }

            #[inline(always)]
            fn bit_xor(a: $reg, b: $reg) -> $reg {
                unsafe { $eor(a, b) }
            }

            #[inline(always)]
            fn andnot(a: $reg, b: $reg) -> $reg {
                unsafe { $bic(b, a) }
            }

            #[inline(always)]
            fn bit_not(a: $reg) -> $reg {
                unsafe { $eor(a, $dup($all_ones)) }
            }

            #[inline(always)]
            fn cmp_eq(a: $reg, b: $reg) -> $mask {
                unsafe { $ceq(a, b) }
            }

            #[inline(always)]
            fn cmp_lt(a: $reg, b: $reg) -> $mask {
                unsafe { $clt(a, b) }
            }

            #[inline(always)]
            fn cmp_le(a: $reg, b: $reg) -> $mask {
                unsafe { $cle(a, b) }
            }

            #[inline(always)]
            fn blend(k: $mask, a: $reg, b: $reg) -> $reg {
                unsafe { $bsl(k, b, a) }
            }

            #[inline(always)]
            fn mask_to_bits(k: $mask) -> u64 {
                $movemask(k)
            }

            #[inline(always)]
            fn mask_from_bits(bits: u64) -> $mask {
                $from_mask(bits)
            }

            #[inline(always)]
            fn mask_and(a: $mask, b: $mask) -> $mask {
                unsafe { $mand(a, b) }
            }

            #[inline(always)]
            fn mask_or(a: $mask, b: $mask) -> $mask {
                unsafe { $morr(a, b) }
            }

            #[inline(always)]
            fn mask_xor(a: $mask, b: $mask) -> $mask {
                unsafe { $meor(a, b) }
            }

            #[inline(always)]
            fn mask_not(a: $mask) -> $mask {
                $mnot(a)
            }

            #[inline(always)]
            fn shift_down(a: $reg, lanes: usize) -> $reg {
                unsafe { $from_u8(shift_bytes_down($to_u8(a), lanes * $bytes)) }
            }
        }

        impl IsaIntLane<Neon> for $t {
            #[inline(always)]
            fn shl_scalar(a: $reg, count: u32) -> $reg {
                let count = count.min($bits) as $count_ty;
                unsafe { $shl(a, $count_dup(count)) }
            }

            #[inline(always)]
            fn shr_scalar(a: $reg, count: u32) -> $reg {
                let count = count.min($bits) as $count_ty;
                unsafe { $shl(a, $count_dup(-count)) }
            }
        }
    };
}

neon_int!(
    i8, int8x16_t, uint8x16_t, 1, 8,
    dup: vdupq_n_s8, load: vld1q_s8, store: vst1q_s8,
    add: vaddq_s8, sub: vsubq_s8, mul: mul_s8, neg: neg_s8, abs: abs_s8,
    min: min_s8, max: max_s8,
    and: vandq_s8, orr: vorrq_s8, eor: veorq_s8, bic: vbicq_s8,
    mand: vandq_u8, morr: vorrq_u8, meor: veorq_u8, mnot: not_u8,
    ceq: vceqq_s8, clt: vcltq_s8, cle: vcleq_s8, bsl: vbslq_s8,
    movemask: movemask_u8, from_mask: mask_u8,
    shl: vshlq_s8, count_dup: vdupq_n_s8, count_ty: i8,
    to_u8: vreinterpretq_u8_s8, from_u8: vreinterpretq_s8_u8, all_ones: -1
);

neon_int!(
    u8, uint8x16_t, uint8x16_t, 1, 8,
    dup: vdupq_n_u8, load: vld1q_u8, store: vst1q_u8,
    add: vaddq_u8, sub: vsubq_u8, mul: mul_u8, neg: neg_u8, abs: identity,
    min: min_u8, max: max_u8,
    and: vandq_u8, orr: vorrq_u8, eor: veorq_u8, bic: vbicq_u8,
    mand: vandq_u8, morr: vorrq_u8, meor: veorq_u8, mnot: not_u8,
    ceq: vceqq_u8, clt: vcltq_u8, cle: vcleq_u8, bsl: vbslq_u8,
    movemask: movemask_u8, from_mask: mask_u8,
    shl: vshlq_u8, count_dup: vdupq_n_s8, count_ty: i8,
    to_u8: identity, from_u8: identity, all_ones: u8::MAX
);

neon_int!(
    i16, int16x8_t, uint16x8_t, 2, 16,
    dup: vdupq_n_s16, load: vld1q_s16, store: vst1q_s16,
    add: vaddq_s16, sub: vsubq_s16, mul: mul_s16, neg: neg_s16, abs: abs_s16,
    min: min_s16, max: max_s16,
    and: vandq_s16, orr: vorrq_s16, eor: veorq_s16, bic: vbicq_s16,
    mand: vandq_u16, morr: vorrq_u16, meor: veorq_u16, mnot: not_u16,
    ceq: vceqq_s16, clt: vcltq_s16, cle: vcleq_s16, bsl: vbslq_s16,
    movemask: movemask_u16, from_mask: mask_u16,
    shl: vshlq_s16, count_dup: vdupq_n_s16, count_ty: i16,
    to_u8: vreinterpretq_u8_s16, from_u8: vreinterpretq_s16_u8, all_ones: -1
);

neon_int!(
    u16, uint16x8_t, uint16x8_t, 2, 16,
    dup: vdupq_n_u16, load: vld1q_u16, store: vst1q_u16,
    add: vaddq_u16, sub: vsubq_u16, mul: mul_u16, neg: neg_u16, abs: identity,
    min: min_u16, max: max_u16,
    and: vandq_u16, orr: vorrq_u16, eor: veorq_u16, bic: vbicq_u16,
    mand: vandq_u16, morr: vorrq_u16, meor: veorq_u16, mnot: not_u16,
    ceq: vceqq_u16, clt: vcltq_u16, cle: vcleq_u16, bsl: vbslq_u16,
    movemask: movemask_u16, from_mask: mask_u16,
    shl: vshlq_u16, count_dup: vdupq_n_s16, count_ty: i16,
    to_u8: vreinterpretq_u8_u16, from_u8: vreinterpretq_u16_u8, all_ones: u16::MAX
);

neon_int!(
    i32, int32x4_t, uint32x4_t, 4, 32,
    dup: vdupq_n_s32, load: vld1q_s32, store: vst1q_s32,
    add: vaddq_s32, sub: vsubq_s32, mul: mul_s32, neg: neg_s32, abs: abs_s32,
    min: min_s32, max: max_s32,
    and: vandq_s32, orr: vorrq_s32, eor: veorq_s32, bic: vbicq_s32,
    mand: vandq_u32, morr: vorrq_u32, meor: veorq_u32, mnot: not_u32,
    ceq: vceqq_s32, clt: vcltq_s32, cle: vcleq_s32, bsl: vbslq_s32,
    movemask: movemask_u32, from_mask: mask_u32,
    shl: vshlq_s32, count_dup: vdupq_n_s32, count_ty: i32,
    to_u8: vreinterpretq_u8_s32, from_u8: vreinterpretq_s32_u8, all_ones: -1
);

neon_int!(
    u32, uint32x4_t, uint32x4_t, 4, 32,
    dup: vdupq_n_u32, load: vld1q_u32, store: vst1q_u32,
    add: vaddq_u32, sub: vsubq_u32, mul: mul_u32, neg: neg_u32, abs: identity,
    min: min_u32, max: max_u32,
    and: vandq_u32, orr: vorrq_u32, eor: veorq_u32, bic: vbicq_u32,
    mand: vandq_u32, morr: vorrq_u32, meor: veorq_u32, mnot: not_u32,
    ceq: vceqq_u32, clt: vcltq_u32, cle: vcleq_u32, bsl: vbslq_u32,
    movemask: movemask_u32, from_mask: mask_u32,
    shl: vshlq_u32, count_dup: vdupq_n_s32, count_ty: i32,
    to_u8: vreinterpretq_u8_u32, from_u8: vreinterpretq_u32_u8, all_ones: u32::MAX
);

neon_int!(
    i64, int64x2_t, uint64x2_t, 8, 64,
    dup: vdupq_n_s64, load: vld1q_s64, store: vst1q_s64,
    add: vaddq_s64, sub: vsubq_s64, mul: lanewise_mul::<i64, int64x2_t>, neg: neg_s64, abs: abs_s64,
    min: min_s64, max: max_s64,
    and: vandq_s64, orr: vorrq_s64, eor: veorq_s64, bic: vbicq_s64,
    mand: vandq_u64, morr: vorrq_u64, meor: veorq_u64, mnot: not_u64,
    ceq: vceqq_s64, clt: vcltq_s64, cle: vcleq_s64, bsl: vbslq_s64,
    movemask: movemask_u64, from_mask: mask_u64,
    shl: vshlq_s64, count_dup: vdupq_n_s64, count_ty: i64,
    to_u8: vreinterpretq_u8_s64, from_u8: vreinterpretq_s64_u8, all_ones: -1
);

neon_int!(
    u64, uint64x2_t, uint64x2_t, 8, 64,
    dup: vdupq_n_u64, load: vld1q_u64, store: vst1q_u64,
    add: vaddq_u64, sub: vsubq_u64, mul: lanewise_mul::<u64, uint64x2_t>, neg: neg_u64, abs: identity,
    min: min_u64, max: max_u64,
    and: vandq_u64, orr: vorrq_u64, eor: veorq_u64, bic: vbicq_u64,
    mand: vandq_u64, morr: vorrq_u64, meor: veorq_u64, mnot: not_u64,
    ceq: vceqq_u64, clt: vcltq_u64, cle: vcleq_u64, bsl: vbslq_u64,
    movemask: movemask_u64, from_mask: mask_u64,
    shl: vshlq_u64, count_dup: vdupq_n_s64, count_ty: i64,
    to_u8: vreinterpretq_u8_u64, from_u8: vreinterpretq_u64_u8, all_ones: u64::MAX
);
