//! `f32` / `f64` lanes in `xmm` registers.

#[cfg(target_arch = "x86")]
use std::arch::x86::*;

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use super::{ones, shift_bytes_down, sign_fill_epi64};
use crate::simd::isa::{IsaFloatLane, IsaLane, Sse};

macro_rules! sse_float {
    (
        $t:ty, $reg:ty, $bytes:expr,
        set1: $set1:ident, setzero: $setzero:ident,
        load: $load:ident, loadu: $loadu:ident, store: $store:ident, storeu: $storeu:ident,
        add: $add:ident, sub: $sub:ident, mul: $mul:ident, div: $div:ident,
        min: $min:ident, max: $max:ident, sqrt: $sqrt:ident,
        and: $and:ident, or: $or:ident, xor: $xor:ident, andnot: $andnot:ident,
        cmpeq: $cmpeq:ident, cmplt: $cmplt:ident, cmple: $cmple:ident,
        cmpgt: $cmpgt:ident, cmpnlt: $cmpnlt:ident,
        blendv: $blendv:ident, movemask: $movemask:ident,
        cast_from_si: $from_si:ident, cast_to_si: $to_si:ident,
        round: $round:ident, sign_mask: $sign_mask:ident,
        fmadd: $fmadd:ident, magic: $magic:expr, below_half: $below_half:expr
    ) => {
        impl IsaLane<Sse> for $t {
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

            // minps/maxps return the second operand when either is NaN.
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
                unsafe { $xor(a, $from_si(ones())) }
            }

            #[inline(always)]
            fn cmp_eq(a: $reg, b: $reg) -> $reg {
                unsafe { $cmpeq(a, b) }
            }

            #[inline(always)]
            fn cmp_lt(a: $reg, b: $reg) -> $reg {
                unsafe { $cmplt(a, b) }
            }

            #[inline(always)]
            fn cmp_le(a: $reg, b: $reg) -> $reg {
                unsafe { $cmple(a, b) }
            }

            #[inline(always)]
            fn blend(k: $reg, a: $reg, b: $reg) -> $reg {
                unsafe {
                    #[cfg(have_sse4_1)]
                    {
                        $blendv(a, b, k)
                    }
                    #[cfg(not(have_sse4_1))]
                    {
                        $or($andnot(k, a), $and(k, b))
                    }
                }
            }

            #[inline(always)]
            fn mask_to_bits(k: $reg) -> u64 {
                unsafe { $movemask(k) as u32 as u64 }
            }

            #[inline(always)]
            fn mask_from_bits(bits: u64) -> $reg {
                unsafe { $from_si(super::int::bits_to_mask(bits, $bytes)) }
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
                <Self as IsaLane<Sse>>::bit_not(a)
            }

            #[inline(always)]
            fn shift_down(a: $reg, lanes: usize) -> $reg {
                unsafe { $from_si(shift_bytes_down($to_si(a), lanes * $bytes)) }
            }
        }

        impl IsaFloatLane<Sse> for $t {
            #[inline(always)]
            fn sqrt(a: $reg) -> $reg {
                unsafe { $sqrt(a) }
            }

            // Without SSE4.1, rounding goes through the 2^mantissa magic
            // constant; values at or above it (and NaN) are already integral.
            #[inline(always)]
            fn trunc(a: $reg) -> $reg {
                unsafe {
                    #[cfg(have_sse4_1)]
                    {
                        $round::<{ _MM_FROUND_TO_ZERO | _MM_FROUND_NO_EXC }>(a)
                    }
                    #[cfg(not(have_sse4_1))]
                    {
                        let sign = $set1(-0.0);
                        let one = $set1(1.0);
                        let magic = $set1($magic);
                        let abs = $andnot(sign, a);
                        let nearest = $sub($add(abs, magic), magic);
                        let truncated = $sub(nearest, $and($cmpgt(nearest, abs), one));
                        let signed = $or(truncated, $and(a, sign));
                        let big = $cmpnlt(abs, magic);
                        <Self as IsaLane<Sse>>::blend(big, signed, a)
                    }
                }
            }

            #[inline(always)]
            fn floor(a: $reg) -> $reg {
                unsafe {
                    #[cfg(have_sse4_1)]
                    {
                        $round::<{ _MM_FROUND_TO_NEG_INF | _MM_FROUND_NO_EXC }>(a)
                    }
                    #[cfg(not(have_sse4_1))]
                    {
                        let t = <Self as IsaFloatLane<Sse>>::trunc(a);
                        $sub(t, $and($cmpgt(t, a), $set1(1.0)))
                    }
                }
            }

            // The sign of `a` is restored so that (-1, 0) rounds up to -0.
            #[inline(always)]
            fn ceil(a: $reg) -> $reg {
                unsafe {
                    #[cfg(have_sse4_1)]
                    {
                        $round::<{ _MM_FROUND_TO_POS_INF | _MM_FROUND_NO_EXC }>(a)
                    }
                    #[cfg(not(have_sse4_1))]
                    {
                        let t = <Self as IsaFloatLane<Sse>>::trunc(a);
                        let up = $add(t, $and($cmplt(t, a), $set1(1.0)));
                        $or(up, $and(a, $set1(-0.0)))
                    }
                }
            }

            // Adding the largest value below one half keeps exact .5 ties
            // rounding away from zero without pushing smaller fractions over.
            #[inline(always)]
            fn round(a: $reg) -> $reg {
                unsafe {
                    let sign = $set1(-0.0);
                    let half = $or($set1($below_half), $and(a, sign));
                    <Self as IsaFloatLane<Sse>>::trunc($add(a, half))
                }
            }

            #[inline(always)]
            fn sign_mask(a: $reg) -> $reg {
                $sign_mask(a)
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

sse_float!(
    f32, __m128, 4,
    set1: _mm_set1_ps, setzero: _mm_setzero_ps,
    load: _mm_load_ps, loadu: _mm_loadu_ps, store: _mm_store_ps, storeu: _mm_storeu_ps,
    add: _mm_add_ps, sub: _mm_sub_ps, mul: _mm_mul_ps, div: _mm_div_ps,
    min: _mm_min_ps, max: _mm_max_ps, sqrt: _mm_sqrt_ps,
    and: _mm_and_ps, or: _mm_or_ps, xor: _mm_xor_ps, andnot: _mm_andnot_ps,
    cmpeq: _mm_cmpeq_ps, cmplt: _mm_cmplt_ps, cmple: _mm_cmple_ps,
    cmpgt: _mm_cmpgt_ps, cmpnlt: _mm_cmpnlt_ps,
    blendv: _mm_blendv_ps, movemask: _mm_movemask_ps,
    cast_from_si: _mm_castsi128_ps, cast_to_si: _mm_castps_si128,
    round: _mm_round_ps, sign_mask: sign_mask_ps,
    fmadd: _mm_fmadd_ps, magic: 8_388_608.0, below_half: 0.499_999_97
);

sse_float!(
    f64, __m128d, 8,
    set1: _mm_set1_pd, setzero: _mm_setzero_pd,
    load: _mm_load_pd, loadu: _mm_loadu_pd, store: _mm_store_pd, storeu: _mm_storeu_pd,
    add: _mm_add_pd, sub: _mm_sub_pd, mul: _mm_mul_pd, div: _mm_div_pd,
    min: _mm_min_pd, max: _mm_max_pd, sqrt: _mm_sqrt_pd,
    and: _mm_and_pd, or: _mm_or_pd, xor: _mm_xor_pd, andnot: _mm_andnot_pd,
    cmpeq: _mm_cmpeq_pd, cmplt: _mm_cmplt_pd, cmple: _mm_cmple_pd,
    cmpgt: _mm_cmpgt_pd, cmpnlt: _mm_cmpnlt_pd,
    blendv: _mm_blendv_pd, movemask: _mm_movemask_pd,
    cast_from_si: _mm_castsi128_pd, cast_to_si: _mm_castpd_si128,
    round: _mm_round_pd, sign_mask: sign_mask_pd,
    fmadd: _mm_fmadd_pd, magic: 4_503_599_627_370_496.0, below_half: 0.499_999_999_999_999_94
);

// Sign masks come straight from the sign bit.
#[inline(always)]
fn sign_mask_ps(a: __m128) -> __m128 {
    unsafe { _mm_castsi128_ps(_mm_srai_epi32::<31>(_mm_castps_si128(a))) }
}

#[inline(always)]
fn sign_mask_pd(a: __m128d) -> __m128d {
    unsafe { _mm_castsi128_pd(sign_fill_epi64(_mm_castpd_si128(a))) }
}
