//! Integer lanes in `zmm` registers.

#[cfg(target_arch = "x86")]
use std::arch::x86::*;

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use super::shift_bytes_down;
use crate::simd::isa::{clear_zero_divisor_lanes, Avx512, IsaIntLane, IsaLane};
use crate::simd::sse::shift_count;

#[inline(always)]
fn ones() -> __m512i {
    unsafe { _mm512_set1_epi32(-1) }
}

#[inline(always)]
fn identity(a: __m512i) -> __m512i {
    a
}

#[inline(always)]
fn mul_epi32(a: __m512i, b: __m512i) -> __m512i {
    unsafe { _mm512_mullo_epi32(a, b) }
}

#[inline(always)]
fn mul_epi64(a: __m512i, b: __m512i) -> __m512i {
    unsafe { _mm512_mullox_epi64(a, b) }
}

#[inline(always)]
fn div_epi32(a: __m512i, b: __m512i) -> __m512i {
    unsafe {
        let lo = _mm512_div_pd(
            _mm512_cvtepi32_pd(_mm512_castsi512_si256(a)),
            _mm512_cvtepi32_pd(_mm512_castsi512_si256(b)),
        );
        let hi = _mm512_div_pd(
            _mm512_cvtepi32_pd(_mm512_extracti64x4_epi64::<1>(a)),
            _mm512_cvtepi32_pd(_mm512_extracti64x4_epi64::<1>(b)),
        );
        _mm512_inserti64x4::<1>(
            _mm512_castsi256_si512(_mm512_cvttpd_epi32(lo)),
            _mm512_cvttpd_epi32(hi),
        )
    }
}

#[inline(always)]
fn lanewise_div<T: crate::simd::element::Vectorizable>(a: __m512i, b: __m512i) -> __m512i {
    crate::simd::isa::zip_lanes(a, b, T::lane_div)
}

macro_rules! unary {
    ($($name:ident = $op:ident;)*) => {
        $(
            #[inline(always)]
            fn $name(a: __m512i) -> __m512i {
                unsafe { $op(a) }
            }
        )*
    };
}

macro_rules! binary {
    ($($name:ident = $op:ident;)*) => {
        $(
            #[inline(always)]
            fn $name(a: __m512i, b: __m512i) -> __m512i {
                unsafe { $op(a, b) }
            }
        )*
    };
}

macro_rules! counted {
    ($($name:ident = $op:ident;)*) => {
        $(
            #[inline(always)]
            fn $name(a: __m512i, count: u32) -> __m512i {
                unsafe { $op(a, shift_count(count)) }
            }
        )*
    };
}

unary! {
    abs_epi32 = _mm512_abs_epi32;
    abs_epi64 = _mm512_abs_epi64;
}

binary! {
    min_epi32 = _mm512_min_epi32;
    max_epi32 = _mm512_max_epi32;
    min_epu32 = _mm512_min_epu32;
    max_epu32 = _mm512_max_epu32;
    min_epi64 = _mm512_min_epi64;
    max_epi64 = _mm512_max_epi64;
    min_epu64 = _mm512_min_epu64;
    max_epu64 = _mm512_max_epu64;
    sllv_epi32 = _mm512_sllv_epi32;
    srlv_epi32 = _mm512_srlv_epi32;
    srav_epi32 = _mm512_srav_epi32;
    sllv_epi64 = _mm512_sllv_epi64;
    srlv_epi64 = _mm512_srlv_epi64;
    srav_epi64 = _mm512_srav_epi64;
}

counted! {
    sll_epi32 = _mm512_sll_epi32;
    srl_epi32 = _mm512_srl_epi32;
    sra_epi32 = _mm512_sra_epi32;
    sll_epi64 = _mm512_sll_epi64;
    srl_epi64 = _mm512_srl_epi64;
    sra_epi64 = _mm512_sra_epi64;
}

macro_rules! avx512_int {
    (
        $t:ty, $st:ty, $k:ty, $bytes:expr,
        set1: $set1:ident, add: $add:ident, sub: $sub:ident,
        mul: $mul:path, div: $div:path, abs: $abs:path,
        min: $min:path, max: $max:path,
        eq: $eq:ident, lt: $lt:ident, le: $le:ident, blend: $blend:ident,
        shl: $shl:path, shr: $shr:path, shlv: $shlv:path, shrv: $shrv:path
    ) => {
        impl IsaLane<Avx512> for $t {
            type Reg = __m512i;
            type MaskReg = $k;

            #[inline(always)]
            fn zeroed() -> __m512i {
                unsafe { _mm512_setzero_si512() }
            }

            #[inline(always)]
            fn splat(x: $t) -> __m512i {
                unsafe { $set1(x as $st) }
            }

            #[inline(always)]
            fn add(a: __m512i, b: __m512i) -> __m512i {
                unsafe { $add(a, b) }
            }

            #[inline(always)]
            fn sub(a: __m512i, b: __m512i) -> __m512i {
                unsafe { $sub(a, b) }
            }

            #[inline(always)]
            fn mul(a: __m512i, b: __m512i) -> __m512i {
                $mul(a, b)
            }

            #[inline(always)]
            fn div(a: __m512i, b: __m512i) -> __m512i {
                clear_zero_divisor_lanes::<Avx512, $t>($div(a, b), b)
            }

            #[inline(always)]
            fn neg(a: __m512i) -> __m512i {
                unsafe { $sub(_mm512_setzero_si512(), a) }
            }

            #[inline(always)]
            fn abs(a: __m512i) -> __m512i {
                $abs(a)
            }

            #[inline(always)]
            fn min(a: __m512i, b: __m512i) -> __m512i {
                $min(a, b)
            }

            #[inline(always)]
            fn max(a: __m512i, b: __m512i) -> __m512i {
                $max(a, b)
            }

            #[inline(always)]
            fn bit_and(a: __m512i, b: __m512i) -> __m512i {
                unsafe { _mm512_and_si512(a, b) }
            }

            #[inline(always)]
            fn bit_or(a: __m512i, b: __m512i) -> __m512i {
                unsafe { _mm512_or_si512(a, b) }
            }

            #[inline(always)]
            fn bit_xor(a: __m512i, b: __m512i) -> __m512i {
                unsafe { _mm512_xor_si512(a, b) }
            }

            #[inline(always)]
            fn andnot(a: __m512i, b: __m512i) -> __m512i {
                unsafe { _mm512_andnot_si512(a, b) }
            }

            #[inline(always)]
            fn bit_not(a: __m512i) -> __m512i {
                unsafe { _mm512_xor_si512(a, ones()) }
            }

            #[inline(always)]
            fn cmp_eq(a: __m512i, b: __m512i) -> $k {
                unsafe { $eq(a, b) }
            }

            #[inline(always)]
            fn cmp_lt(a: __m512i, b: __m512i) -> $k {
                unsafe { $lt(a, b) }
            }

            #[inline(always)]
            fn cmp_le(a: __m512i, b: __m512i) -> $k {
                unsafe { $le(a, b) }
            }

            #[inline(always)]
            fn blend(k: $k, a: __m512i, b: __m512i) -> __m512i {
                unsafe { $blend(k, a, b) }
            }

            #[inline(always)]
            fn mask_to_bits(k: $k) -> u64 {
                k as u64
            }

            #[inline(always)]
            fn mask_from_bits(bits: u64) -> $k {
                bits as $k
            }

            #[inline(always)]
            fn mask_and(a: $k, b: $k) -> $k {
                a & b
            }

            #[inline(always)]
            fn mask_or(a: $k, b: $k) -> $k {
                a | b
            }

            #[inline(always)]
            fn mask_xor(a: $k, b: $k) -> $k {
                a ^ b
            }

            #[inline(always)]
            fn mask_not(a: $k) -> $k {
                !a
            }

            #[inline(always)]
            fn shift_down(a: __m512i, lanes: usize) -> __m512i {
                shift_bytes_down(a, lanes * $bytes)
            }
        }

        impl IsaIntLane<Avx512> for $t {
            #[inline(always)]
            fn shl(a: __m512i, b: __m512i) -> __m512i {
                $shlv(a, b)
            }

            #[inline(always)]
            fn shr(a: __m512i, b: __m512i) -> __m512i {
                $shrv(a, b)
            }

            #[inline(always)]
            fn shl_scalar(a: __m512i, count: u32) -> __m512i {
                $shl(a, count)
            }

            #[inline(always)]
            fn shr_scalar(a: __m512i, count: u32) -> __m512i {
                $shr(a, count)
            }
        }
    };
}

avx512_int!(
    i32, i32, __mmask16, 4,
    set1: _mm512_set1_epi32, add: _mm512_add_epi32, sub: _mm512_sub_epi32,
    mul: mul_epi32, div: div_epi32, abs: abs_epi32,
    min: min_epi32, max: max_epi32,
    eq: _mm512_cmpeq_epi32_mask, lt: _mm512_cmplt_epi32_mask, le: _mm512_cmple_epi32_mask,
    blend: _mm512_mask_blend_epi32,
    shl: sll_epi32, shr: sra_epi32, shlv: sllv_epi32, shrv: srav_epi32
);

avx512_int!(
    u32, i32, __mmask16, 4,
    set1: _mm512_set1_epi32, add: _mm512_add_epi32, sub: _mm512_sub_epi32,
    mul: mul_epi32, div: lanewise_div::<u32>, abs: identity,
    min: min_epu32, max: max_epu32,
    eq: _mm512_cmpeq_epu32_mask, lt: _mm512_cmplt_epu32_mask, le: _mm512_cmple_epu32_mask,
    blend: _mm512_mask_blend_epi32,
    shl: sll_epi32, shr: srl_epi32, shlv: sllv_epi32, shrv: srlv_epi32
);

avx512_int!(
    i64, i64, __mmask8, 8,
    set1: _mm512_set1_epi64, add: _mm512_add_epi64, sub: _mm512_sub_epi64,
    mul: mul_epi64, div: lanewise_div::<i64>, abs: abs_epi64,
    min: min_epi64, max: max_epi64,
    eq: _mm512_cmpeq_epi64_mask, lt: _mm512_cmplt_epi64_mask, le: _mm512_cmple_epi64_mask,
    blend: _mm512_mask_blend_epi64,
    shl: sll_epi64, shr: sra_epi64, shlv: sllv_epi64, shrv: srav_epi64
);

avx512_int!(
    u64, i64, __mmask8, 8,
    set1: _mm512_set1_epi64, add: _mm512_add_epi64, sub: _mm512_sub_epi64,
    mul: mul_epi64, div: lanewise_div::<u64>, abs: identity,
    min: min_epu64, max: max_epu64,
    eq: _mm512_cmpeq_epu64_mask, lt: _mm512_cmplt_epu64_mask, le: _mm512_cmple_epu64_mask,
    blend: _mm512_mask_blend_epi64,
    shl: sll_epi64, shr: srl_epi64, shlv: sllv_epi64, shrv: srlv_epi64
);

#[cfg(have_avx512bw)]
mod bytes {
    use super::*;
    use crate::simd::element::SimdInteger;
    use crate::simd::isa::zip_lanes;

    #[inline(always)]
    fn lanewise_shl<T: SimdInteger>(a: __m512i, b: __m512i) -> __m512i {
        zip_lanes(a, b, |x: T, n: T| x.lane_shl(n.shift_count()))
    }

    #[inline(always)]
    fn lanewise_shr<T: SimdInteger>(a: __m512i, b: __m512i) -> __m512i {
        zip_lanes(a, b, |x: T, n: T| x.lane_shr(n.shift_count()))
    }

    #[inline(always)]
    fn mul_epi8(a: __m512i, b: __m512i) -> __m512i {
        unsafe {
            let even = _mm512_mullo_epi16(a, b);
            let odd = _mm512_mullo_epi16(_mm512_srli_epi16::<8>(a), _mm512_srli_epi16::<8>(b));
            _mm512_or_si512(
                _mm512_slli_epi16::<8>(odd),
                _mm512_and_si512(even, _mm512_set1_epi16(0xFF)),
            )
        }
    }

    #[inline(always)]
    fn shl_epi8(a: __m512i, count: u32) -> __m512i {
        if count >= 8 {
            return unsafe { _mm512_setzero_si512() };
        }
        unsafe {
            _mm512_and_si512(
                _mm512_sll_epi16(a, shift_count(count)),
                _mm512_set1_epi8((0xFFu8 << count) as i8),
            )
        }
    }

    #[inline(always)]
    fn srl_epi8(a: __m512i, count: u32) -> __m512i {
        if count >= 8 {
            return unsafe { _mm512_setzero_si512() };
        }
        unsafe {
            _mm512_and_si512(
                _mm512_srl_epi16(a, shift_count(count)),
                _mm512_set1_epi8((0xFFu8 >> count) as i8),
            )
        }
    }

    #[inline(always)]
    fn sra_epi8(a: __m512i, count: u32) -> __m512i {
        unsafe {
            let c = shift_count(count.min(7));
            let hi = _mm512_and_si512(_mm512_sra_epi16(a, c), _mm512_set1_epi16(0xFF00u16 as i16));
            let lo = _mm512_srli_epi16::<8>(_mm512_sra_epi16(_mm512_slli_epi16::<8>(a), c));
            _mm512_or_si512(hi, lo)
        }
    }

    unary! {
        abs_epi8 = _mm512_abs_epi8;
        abs_epi16 = _mm512_abs_epi16;
    }

    binary! {
        mul_epi16 = _mm512_mullo_epi16;
        min_epi8 = _mm512_min_epi8;
        max_epi8 = _mm512_max_epi8;
        min_epu8 = _mm512_min_epu8;
        max_epu8 = _mm512_max_epu8;
        min_epi16 = _mm512_min_epi16;
        max_epi16 = _mm512_max_epi16;
        min_epu16 = _mm512_min_epu16;
        max_epu16 = _mm512_max_epu16;
        sllv_epi16 = _mm512_sllv_epi16;
        srlv_epi16 = _mm512_srlv_epi16;
        srav_epi16 = _mm512_srav_epi16;
    }

    counted! {
        sll_epi16 = _mm512_sll_epi16;
        srl_epi16 = _mm512_srl_epi16;
        sra_epi16 = _mm512_sra_epi16;
    }

    avx512_int!(
        i8, i8, __mmask64, 1,
        set1: _mm512_set1_epi8, add: _mm512_add_epi8, sub: _mm512_sub_epi8,
        mul: mul_epi8, div: lanewise_div::<i8>, abs: abs_epi8,
        min: min_epi8, max: max_epi8,
        eq: _mm512_cmpeq_epi8_mask, lt: _mm512_cmplt_epi8_mask, le: _mm512_cmple_epi8_mask,
        blend: _mm512_mask_blend_epi8,
        shl: shl_epi8, shr: sra_epi8, shlv: lanewise_shl::<i8>, shrv: lanewise_shr::<i8>
    );

    avx512_int!(
        u8, i8, __mmask64, 1,
        set1: _mm512_set1_epi8, add: _mm512_add_epi8, sub: _mm512_sub_epi8,
        mul: mul_epi8, div: lanewise_div::<u8>, abs: identity,
        min: min_epu8, max: max_epu8,
        eq: _mm512_cmpeq_epu8_mask, lt: _mm512_cmplt_epu8_mask, le: _mm512_cmple_epu8_mask,
        blend: _mm512_mask_blend_epi8,
        shl: shl_epi8, shr: srl_epi8, shlv: lanewise_shl::<u8>, shrv: lanewise_shr::<u8>
    );

    avx512_int!(
        i16, i16, __mmask32, 2,
        set1: _mm512_set1_epi16, add: _mm512_add_epi16, sub: _mm512_sub_epi16,
        mul: mul_epi16, div: lanewise_div::<i16>, abs: abs_epi16,
        min: min_epi16, max: max_epi16,
        eq: _mm512_cmpeq_epi16_mask, lt: _mm512_cmplt_epi16_mask, le: _mm512_cmple_epi16_mask,
        blend: _mm512_mask_blend_epi16,
        shl: sll_epi16, shr: sra_epi16, shlv: sllv_epi16, shrv: srav_epi16
    );

    avx512_int!(
        u16, i16, __mmask32, 2,
        set1: _mm512_set1_epi16, add: _mm512_add_epi16, sub: _mm512_sub_epi16,
        mul: mul_epi16, div: lanewise_div::<u16>, abs: identity,
        min: min_epu16, max: max_epu16,
        eq: _mm512_cmpeq_epu16_mask, lt: _mm512_cmplt_epu16_mask, le: _mm512_cmple_epu16_mask,
        blend: _mm512_mask_blend_epi16,
        shl: sll_epi16, shr: srl_epi16, shlv: sllv_epi16, shrv: srlv_epi16
    );
}

#[cfg(not(have_avx512bw))]
mod bytes {
    use super::*;

    macro_rules! avx512_int_fallback {
        ($($t:ty),*) => {
            $(
                impl IsaLane<Avx512> for $t {
                    type Reg = __m512i;
                    type MaskReg = __m512i;
                }

                impl IsaIntLane<Avx512> for $t {}
            )*
        };
    }

    avx512_int_fallback!(i8, u8, i16, u16);
}
