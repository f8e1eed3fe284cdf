//! `f32` / `f64` lanes in `ymm` registers.

#[cfg(target_arch = "x86")]
use std::arch::x86::*;

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use super::{bits_to_mask, shift_bytes_down};
use crate::simd::isa::{Avx, IsaFloatLane, IsaLane};

macro_rules! avx_float {
    (
        $t:ty, $reg:ty, $bytes:expr,
        set1: $set1:ident, setzero: $setzero:ident,
        load: $load:ident, loadu: $loadu:ident, store: $store:ident, storeu: $storeu:ident,
        add: $add:ident, sub: $sub:ident, mul: $mul:ident, div: $div:ident,
        min: $min:ident, max: $max:ident, sqrt: $sqrt:ident,
        and: $and:ident, or: $or:ident, xor: $xor:ident, andnot: $andnot:ident,
        cmp: $cmp:ident, blendv: $blendv:ident, movemask: $movemask:ident,
        cast_from_si: $from_si:ident, cast_to_si: $to_si:ident,
        round: $round:ident, fmadd: $fmadd:ident, below_half: $below_half:expr
    ) => {
        impl IsaLane<Avx> for $t {
            type Reg = $reg;
            type MaskReg = $reg;

            #[inline(always)]
            fn zeroed() -> $reg {
                unsafe { $setzero() }
            }

            #[inline(always)]
            fn splat(x: $t) -> $reg {
                unsafe { $set1(x) }
            }

            #[inline(always)]
            unsafe fn load_aligned(ptr: *const $t) -> $reg {
                $load(ptr)
            }

            #[inline(always)]
            unsafe fn load_unaligned(ptr: *const $t) -> $reg {
                $loadu(ptr)
            }

            #[inline(always)]
            unsafe fn store_aligned(ptr: *mut $t, a: $reg) {
                $store(ptr, a)
            }

            #[inline(always)]
            unsafe fn store_unaligned(ptr: *mut $t, a: $reg) {
                $storeu(ptr, a)
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
                unsafe { $xor(a, $set1(-0.0)) }
            }

            #[inline(always)]
            fn abs(a: $reg) -> $reg {
                unsafe { $andnot($set1(-0.0), a) }
            }

            #[inline(always)]
            fn min(a: $reg, b: $reg) -> $reg {
                unsafe { $min(a, b) }
            }

            #[inline(always)]
            fn max(a: $reg, b: $reg) -> $reg {
                unsafe { $max(a, b) }
            }

            #[inline(always)]
            fn bit_and(a: $reg, b: $reg) -> $reg {
                unsafe { $and(a, b) }
            }

            #[inline(always)]
            fn bit_or(a: $reg, b: $reg) -> $reg {
                unsafe { $or(a, b) }
            }

            #[inline(always)]
            fn bit_xor(a: $reg, b: $reg) -> $reg {
                unsafe { $xor(a, b) }
            }

            #[inline(always)]
            fn andnot(a: $reg, b: $reg) -> $reg {
                unsafe { $andnot(a, b) }
            }

            #[inline(always)]
            fn bit_not(a: $reg) -> $reg {
                unsafe { $xor(a, $from_si(_mm256_set1_epi32(-1))) }
            }

            #[inline(always)]
            fn cmp_eq(a: $reg, b: $reg) -> $reg {
                unsafe { $cmp::<_CMP_EQ_OQ>(a, b) }
            }

            #[inline(always)]
            fn cmp_lt(a: $reg, b: $reg) -> $reg {
                unsafe { $cmp::<_CMP_LT_OQ>(a, b) }
            }

            #[inline(always)]
            fn cmp_le(a: $reg, b: $reg) -> $reg {
                unsafe { $cmp::<_CMP_LE_OQ>(a, b) }
            }

            #[inline(always)]
            fn blend(k: $reg, a: $reg, b: $reg) -> $reg {
                unsafe { $blendv(a, b, k) }
            }

            #[inline(always)]
            fn mask_to_bits(k: $reg) -> u64 {
                unsafe { $movemask(k) as u32 as u64 }
            }

            #[inline(always)]
            fn mask_from_bits(bits: u64) -> $reg {
                unsafe { $from_si(bits_to_mask(bits, $bytes)) }
            }

            #[inline(always)]
            fn mask_and(a: $reg, b: $reg) -> $reg {
                unsafe { $and(a, b) }
            }

            #[inline(always)]
            fn mask_or(a: $reg, b: $reg) -> $reg {
                unsafe { $or(a, b) }
            }

            #[inline(always)]
            fn mask_xor(a: $reg, b: $reg) -> $reg {
                unsafe { $xor(a, b) }
            }

            #[inline(always)]
            fn mask_not(a: $reg) -> $reg {
                <Self as IsaLane<Avx>>::bit_not(a)
            }

            #[inline(always)]
            fn shift_down(a: $reg, lanes: usize) -> $reg {
                unsafe { $from_si(shift_bytes_down($to_si(a), lanes * $bytes)) }
            }
        }

        impl IsaFloatLane<Avx> for $t {
            #[inline(always)]
            fn sqrt(a: $reg) -> $reg {
                unsafe { $sqrt(a) }
            }

            #[inline(always)]
            fn trunc(a: $reg) -> $reg {
                unsafe { $round::<{ _MM_FROUND_TO_ZERO | _MM_FROUND_NO_EXC }>(a) }
            }

            #[inline(always)]
            fn floor(a: $reg) -> $reg {
                unsafe { $round::<{ _MM_FROUND_TO_NEG_INF | _MM_FROUND_NO_EXC }>(a) }
            }

            #[inline(always)]
            fn ceil(a: $reg) -> $reg {
                unsafe { $round::<{ _MM_FROUND_TO_POS_INF | _MM_FROUND_NO_EXC }>(a) }
            }

            #[inline(always)]
            fn round(a: $reg) -> $reg {
                unsafe {
                    let half = $or($set1($below_half), $and(a, $set1(-0.0)));
                    <Self as IsaFloatLane<Avx>>::trunc($add(a, half))
                }
            }

            // movemask already reads the sign bits.
            #[inline(always)]
            fn sign_mask(a: $reg) -> $reg {
                <Self as IsaLane<Avx>>::mask_from_bits(<Self as IsaLane<Avx>>::mask_to_bits(a))
            }

            #[inline(always)]
            fn fma(a: $reg, b: $reg, c: $reg) -> $reg {
                #[cfg(have_fma)]
                {
                    unsafe { $fmadd(a, b, c) }
                }
                #[cfg(not(have_fma))]
                {
                    crate::simd::isa::zip3_lanes(a, b, c, <$t>::mul_add)
                }
            }
        }
    };
}

avx_float!(
    f32, __m256, 4,
    set1: _mm256_set1_ps, setzero: _mm256_setzero_ps,
    load: _mm256_load_ps, loadu: _mm256_loadu_ps, store: _mm256_store_ps, storeu: _mm256_storeu_ps,
    add: _mm256_add_ps, sub: _mm256_sub_ps, mul: _mm256_mul_ps, div: _mm256_div_ps,
    min: _mm256_min_ps, max: _mm256_max_ps, sqrt: _mm256_sqrt_ps,
    and: _mm256_and_ps, or: _mm256_or_ps, xor: _mm256_xor_ps, andnot: _mm256_andnot_ps,
    cmp: _mm256_cmp_ps, blendv: _mm256_blendv_ps, movemask: _mm256_movemask_ps,
    cast_from_si: _mm256_castsi256_ps, cast_to_si: _mm256_castps_si256,
    round: _mm256_round_ps, fmadd: _mm256_fmadd_ps, below_half: 0.499_999_97
);

avx_float!(
    f64, __m256d, 8,
    set1: _mm256_set1_pd, setzero: _mm256_setzero_pd,
    load: _mm256_load_pd, loadu: _mm256_loadu_pd, store: _mm256_store_pd, storeu: _mm256_storeu_pd,
    add: _mm256_add_pd, sub: _mm256_sub_pd, mul: _mm256_mul_pd, div: _mm256_div_pd,
    min: _mm256_min_pd, max: _mm256_max_pd, sqrt: _mm256_sqrt_pd,
    and: _mm256_and_pd, or: _mm256_or_pd, xor: _mm256_xor_pd, andnot: _mm256_andnot_pd,
    cmp: _mm256_cmp_pd, blendv: _mm256_blendv_pd, movemask: _mm256_movemask_pd,
    cast_from_si: _mm256_castsi256_pd, cast_to_si: _mm256_castpd_si256,
    round: _mm256_round_pd, fmadd: _mm256_fmadd_pd, below_half: 0.499_999_999_999_999_94
);
