//! `f32` / `f64` lanes in NEON registers.

use std::arch::aarch64::*;

use super::{movemask_u32, movemask_u64, mask_u32, mask_u64, shift_bytes_down};
use crate::simd::isa::{IsaFloatLane, IsaLane, Neon};

macro_rules! neon_float {
    (
        $t:ty, $reg:ty, $mask:ty, $bytes:expr,
        dup: $dup:ident, load: $load:ident, store: $store:ident,
        add: $add:ident, sub: $sub:ident, mul: $mul:ident, div: $div:ident,
        neg: $neg:ident, abs: $abs:ident, sqrt: $sqrt:ident, fma: $fma:ident,
        ceq: $ceq:ident, clt: $clt:ident, cle: $cle:ident, bsl: $bsl:ident,
        to_bits: $to_bits:ident, from_bits: $from_bits:ident, to_signed: $to_signed:ident,
        and: $and:ident, orr: $orr:ident, eor: $eor:ident, bic: $bic:ident,
        mask_not: $mask_not:path, sign_lt: $sign_lt:ident, signed_zero: $signed_zero:expr,
        movemask: $movemask:path, from_mask: $from_mask:path,
        rndz: $rndz:ident, rndm: $rndm:ident, rndp: $rndp:ident, rnda: $rnda:ident,
        to_u8: $to_u8:ident, from_u8: $from_u8:ident
    ) => {
        impl IsaLane<Neon> for $t {
            type Reg = $reg;
            type MaskReg = $mask;

            #[inline(always)]
            fn zeroed() -> $reg {
                unsafe { $dup(0.0) }
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
                unsafe { $mul(a, b) }
            }

            #[inline(always)]
            fn div(a: $reg, b: $reg) -> $reg {
                unsafe { $div(a, b) }
            }

            #[inline(always)]
            fn neg(a: $reg) -> $reg {
                unsafe { $neg(a) }
            }

            #[inline(always)]
            fn abs(a: $reg) -> $reg {
                unsafe { $abs(a) }
            }

            // fmin/fmax propagate NaN; select on `a < b` to keep the
            // second-operand rule of the lane semantics.
            #[inline(always)]
            fn min(a: $reg, b: $reg) -> $reg {
                unsafe { $bsl($clt(a, b), a, b) }
            }

            #[inline(always)]
            fn max(a: $reg, b: $reg) -> $reg {
                unsafe { $bsl($clt(b, a), a, b) }
            }

            #[inline(always)]
            fn bit_and(a: $reg, b: $reg) -> $reg {
                unsafe { $from_bits($and($to_bits(a), $to_bits(b))) }
            }

            #[inline(always)]
            fn bit_or(a: $reg, b: $reg) -> $reg {
                unsafe { $from_bits($orr($to_bits(a), $to_bits(b))) }
            }

            #[inline(always)]
            fn bit_xor(a: $reg, b: $reg) -> $reg {
                unsafe { $from_bits($eor($to_bits(a), $to_bits(b))) }
            }

            #[inline(always)]
            fn andnot(a: $reg, b: $reg) -> $reg {
                unsafe { $from_bits($bic($to_bits(b), $to_bits(a))) }
            }

            #[inline(always)]
            fn bit_not(a: $reg) -> $reg {
                unsafe { $from_bits($mask_not($to_bits(a))) }
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
                unsafe { $and(a, b) }
            }

            #[inline(always)]
            fn mask_or(a: $mask, b: $mask) -> $mask {
                unsafe { $orr(a, b) }
            }

            #[inline(always)]
            fn mask_xor(a: $mask, b: $mask) -> $mask {
                unsafe { $eor(a, b) }
            }

            #[inline(always)]
            fn mask_not(a: $mask) -> $mask {
                $mask_not(a)
            }

            #[inline(always)]
            fn shift_down(a: $reg, lanes: usize) -> $reg {
                unsafe { $from_u8(shift_bytes_down($to_u8(a), lanes * $bytes)) }
            }
        }

        impl IsaFloatLane<Neon> for $t {
            #[inline(always)]
            fn sqrt(a: $reg) -> $reg {
                unsafe { $sqrt(a) }
            }

            #[inline(always)]
            fn trunc(a: $reg) -> $reg {
                unsafe { $rndz(a) }
            }

            #[inline(always)]
            fn floor(a: $reg) -> $reg {
                unsafe { $rndm(a) }
            }

            #[inline(always)]
            fn ceil(a: $reg) -> $reg {
                unsafe { $rndp(a) }
            }

            #[inline(always)]
            fn round(a: $reg) -> $reg {
                unsafe { $rnda(a) }
            }

            #[inline(always)]
            fn sign_mask(a: $reg) -> $mask {
                unsafe { $sign_lt($to_signed(a), $signed_zero) }
            }

            #[inline(always)]
            fn fma(a: $reg, b: $reg, c: $reg) -> $reg {
                unsafe { $fma(c, a, b) }
            }
        }
    };
}

#[inline(always)]
fn not_u32(a: uint32x4_t) -> uint32x4_t {
    unsafe { vmvnq_u32(a) }
}

#[inline(always)]
fn not_u64(a: uint64x2_t) -> uint64x2_t {
    unsafe { veorq_u64(a, vdupq_n_u64(u64::MAX)) }
}

neon_float!(
    f32, float32x4_t, uint32x4_t, 4,
    dup: vdupq_n_f32, load: vld1q_f32, store: vst1q_f32,
    add: vaddq_f32, sub: vsubq_f32, mul: vmulq_f32, div: vdivq_f32,
    neg: vnegq_f32, abs: vabsq_f32, sqrt: vsqrtq_f32, fma: vfmaq_f32,
    ceq: vceqq_f32, clt: vcltq_f32, cle: vcleq_f32, bsl: vbslq_f32,
    to_bits: vreinterpretq_u32_f32, from_bits: vreinterpretq_f32_u32, to_signed: vreinterpretq_s32_f32,
    and: vandq_u32, orr: vorrq_u32, eor: veorq_u32, bic: vbicq_u32,
    mask_not: not_u32, sign_lt: vcltq_s32, signed_zero: vdupq_n_s32(0),
    movemask: movemask_u32, from_mask: mask_u32,
    rndz: vrndq_f32, rndm: vrndmq_f32, rndp: vrndpq_f32, rnda: vrndaq_f32,
    to_u8: vreinterpretq_u8_f32, from_u8: vreinterpretq_f32_u8
);

neon_float!(
    f64, float64x2_t, uint64x2_t, 8,
    dup: vdupq_n_f64, load: vld1q_f64, store: vst1q_f64,
    add: vaddq_f64, sub: vsubq_f64, mul: vmulq_f64, div: vdivq_f64,
    neg: vnegq_f64, abs: vabsq_f64, sqrt: vsqrtq_f64, fma: vfmaq_f64,
    ceq: vceqq_f64, clt: vcltq_f64, cle: vcleq_f64, bsl: vbslq_f64,
    to_bits: vreinterpretq_u64_f64, from_bits: vreinterpretq_f64_u64, to_signed: vreinterpretq_s64_f64,
    and: vandq_u64, orr: vorrq_u64, eor: veorq_u64, bic: vbicq_u64,
    mask_not: not_u64, sign_lt: vcltq_s64, signed_zero: vdupq_n_s64(0),
    movemask: movemask_u64, from_mask: mask_u64,
    rndz: vrndq_f64, rndm: vrndmq_f64, rndp: vrndpq_f64, rnda: vrndaq_f64,
    to_u8: vreinterpretq_u8_f64, from_u8: vreinterpretq_f64_u8
);
