//! Integer lanes in `ymm` registers (AVX2).

#[cfg(target_arch = "x86")]
use std::arch::x86::*;

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use super::{bits_to_mask, shift_bytes_down};
use crate::simd::element::{SimdInteger, Vectorizable};
use crate::simd::isa::{clear_zero_divisor_lanes, zip_lanes, Avx, IsaIntLane, IsaLane};
use crate::simd::sse::shift_count;

#[inline(always)]
fn ones() -> __m256i {
    unsafe { _mm256_set1_epi32(-1) }
}

#[inline(always)]
fn select(k: __m256i, a: __m256i, b: __m256i) -> __m256i {
    unsafe { _mm256_blendv_epi8(a, b, k) }
}

#[inline(always)]
fn lanewise_div<T: Vectorizable>(a: __m256i, b: __m256i) -> __m256i {
    zip_lanes(a, b, T::lane_div)
}

#[inline(always)]
fn lanewise_shl<T: SimdInteger>(a: __m256i, b: __m256i) -> __m256i {
    zip_lanes(a, b, |x: T, n: T| x.lane_shl(n.shift_count()))
}

#[inline(always)]
fn lanewise_shr<T: SimdInteger>(a: __m256i, b: __m256i) -> __m256i {
    zip_lanes(a, b, |x: T, n: T| x.lane_shr(n.shift_count()))
}

#[inline(always)]
fn identity(a: __m256i) -> __m256i {
    a
}

// Division through f32, widening inside each 128-bit half.

#[inline(always)]
fn div_widened(a: __m256i, b: __m256i) -> __m256i {
    unsafe { _mm256_cvttps_epi32(_mm256_div_ps(_mm256_cvtepi32_ps(a), _mm256_cvtepi32_ps(b))) }
}

#[inline(always)]
fn narrow_epi32(lo: __m256i, hi: __m256i) -> __m256i {
    unsafe {
        let lo = _mm256_srai_epi32::<16>(_mm256_slli_epi32::<16>(lo));
        let hi = _mm256_srai_epi32::<16>(_mm256_slli_epi32::<16>(hi));
        _mm256_packs_epi32(lo, hi)
    }
}

#[inline(always)]
fn div_epi16(a: __m256i, b: __m256i) -> __m256i {
    unsafe {
        let a_lo = _mm256_srai_epi32::<16>(_mm256_unpacklo_epi16(a, a));
        let a_hi = _mm256_srai_epi32::<16>(_mm256_unpackhi_epi16(a, a));
        let b_lo = _mm256_srai_epi32::<16>(_mm256_unpacklo_epi16(b, b));
        let b_hi = _mm256_srai_epi32::<16>(_mm256_unpackhi_epi16(b, b));
        narrow_epi32(div_widened(a_lo, b_lo), div_widened(a_hi, b_hi))
    }
}

#[inline(always)]
fn div_epu16(a: __m256i, b: __m256i) -> __m256i {
    unsafe {
        let zero = _mm256_setzero_si256();
        let a_lo = _mm256_unpacklo_epi16(a, zero);
        let a_hi = _mm256_unpackhi_epi16(a, zero);
        let b_lo = _mm256_unpacklo_epi16(b, zero);
        let b_hi = _mm256_unpackhi_epi16(b, zero);
        narrow_epi32(div_widened(a_lo, b_lo), div_widened(a_hi, b_hi))
    }
}

#[inline(always)]
fn narrow_epi16(lo: __m256i, hi: __m256i) -> __m256i {
    unsafe {
        let low_byte = _mm256_set1_epi16(0xFF);
        _mm256_packus_epi16(_mm256_and_si256(lo, low_byte), _mm256_and_si256(hi, low_byte))
    }
}

#[inline(always)]
fn div_epi8(a: __m256i, b: __m256i) -> __m256i {
    unsafe {
        let a_lo = _mm256_srai_epi16::<8>(_mm256_unpacklo_epi8(a, a));
        let a_hi = _mm256_srai_epi16::<8>(_mm256_unpackhi_epi8(a, a));
        let b_lo = _mm256_srai_epi16::<8>(_mm256_unpacklo_epi8(b, b));
        let b_hi = _mm256_srai_epi16::<8>(_mm256_unpackhi_epi8(b, b));
        narrow_epi16(div_epi16(a_lo, b_lo), div_epi16(a_hi, b_hi))
    }
}

#[inline(always)]
fn div_epu8(a: __m256i, b: __m256i) -> __m256i {
    unsafe {
        let zero = _mm256_setzero_si256();
        let a_lo = _mm256_unpacklo_epi8(a, zero);
        let a_hi = _mm256_unpackhi_epi8(a, zero);
        let b_lo = _mm256_unpacklo_epi8(b, zero);
        let b_hi = _mm256_unpackhi_epi8(b, zero);
        narrow_epi16(div_epu16(a_lo, b_lo), div_epu16(a_hi, b_hi))
    }
}

#[inline(always)]
fn div_epi32(a: __m256i, b: __m256i) -> __m256i {
    unsafe {
        let lo = _mm256_div_pd(
            _mm256_cvtepi32_pd(_mm256_castsi256_si128(a)),
            _mm256_cvtepi32_pd(_mm256_castsi256_si128(b)),
        );
        let hi = _mm256_div_pd(
            _mm256_cvtepi32_pd(_mm256_extracti128_si256::<1>(a)),
            _mm256_cvtepi32_pd(_mm256_extracti128_si256::<1>(b)),
        );
        _mm256_set_m128i(_mm256_cvttpd_epi32(hi), _mm256_cvttpd_epi32(lo))
    }
}

// Multiplication.

#[inline(always)]
fn mul_epi8(a: __m256i, b: __m256i) -> __m256i {
    unsafe {
        let even = _mm256_mullo_epi16(a, b);
        let odd = _mm256_mullo_epi16(_mm256_srli_epi16::<8>(a), _mm256_srli_epi16::<8>(b));
        _mm256_or_si256(
            _mm256_slli_epi16::<8>(odd),
            _mm256_and_si256(even, _mm256_set1_epi16(0xFF)),
        )
    }
}

#[inline(always)]
fn mul_epi16(a: __m256i, b: __m256i) -> __m256i {
    unsafe { _mm256_mullo_epi16(a, b) }
}

#[inline(always)]
fn mul_epi32(a: __m256i, b: __m256i) -> __m256i {
    unsafe { _mm256_mullo_epi32(a, b) }
}

#[inline(always)]
fn mul_epi64(a: __m256i, b: __m256i) -> __m256i {
    unsafe {
        let a_hi = _mm256_srli_epi64::<32>(a);
        let b_hi = _mm256_srli_epi64::<32>(b);
        let low = _mm256_mul_epu32(a, b);
        let cross = _mm256_add_epi64(_mm256_mul_epu32(a_hi, b), _mm256_mul_epu32(a, b_hi));
        _mm256_add_epi64(low, _mm256_slli_epi64::<32>(cross))
    }
}

// Absolute value, min and max.

#[inline(always)]
fn abs_epi8(a: __m256i) -> __m256i {
    unsafe { _mm256_abs_epi8(a) }
}

#[inline(always)]
fn abs_epi16(a: __m256i) -> __m256i {
    unsafe { _mm256_abs_epi16(a) }
}

#[inline(always)]
fn abs_epi32(a: __m256i) -> __m256i {
    unsafe { _mm256_abs_epi32(a) }
}

#[inline(always)]
fn abs_epi64(a: __m256i) -> __m256i {
    unsafe {
        let s = _mm256_cmpgt_epi64(_mm256_setzero_si256(), a);
        _mm256_sub_epi64(_mm256_xor_si256(a, s), s)
    }
}

macro_rules! native_min_max {
    ($($min:ident = $min_op:ident, $max:ident = $max_op:ident;)*) => {
        $(
            #[inline(always)]
            fn $min(a: __m256i, b: __m256i) -> __m256i {
                unsafe { $min_op(a, b) }
            }

            #[inline(always)]
            fn $max(a: __m256i, b: __m256i) -> __m256i {
                unsafe { $max_op(a, b) }
            }
        )*
    };
}

native_min_max! {
    min_epi8 = _mm256_min_epi8, max_epi8 = _mm256_max_epi8;
    min_epu8 = _mm256_min_epu8, max_epu8 = _mm256_max_epu8;
    min_epi16 = _mm256_min_epi16, max_epi16 = _mm256_max_epi16;
    min_epu16 = _mm256_min_epu16, max_epu16 = _mm256_max_epu16;
    min_epi32 = _mm256_min_epi32, max_epi32 = _mm256_max_epi32;
    min_epu32 = _mm256_min_epu32, max_epu32 = _mm256_max_epu32;
}

#[inline(always)]
fn min_epi64(a: __m256i, b: __m256i) -> __m256i {
    select(lt_epi64(a, b), b, a)
}

#[inline(always)]
fn max_epi64(a: __m256i, b: __m256i) -> __m256i {
    select(lt_epi64(b, a), b, a)
}

#[inline(always)]
fn min_epu64(a: __m256i, b: __m256i) -> __m256i {
    select(lt_epu64(a, b), b, a)
}

#[inline(always)]
fn max_epu64(a: __m256i, b: __m256i) -> __m256i {
    select(lt_epu64(b, a), b, a)
}

// Comparisons. AVX2 only has signed greater-than; unsigned lanes are biased.

macro_rules! compares {
    ($($eq:ident = $eq_op:ident, $lt:ident, $ltu:ident = $gt_op:ident, $bias:expr;)*) => {
        $(
            #[inline(always)]
            fn $eq(a: __m256i, b: __m256i) -> __m256i {
                unsafe { $eq_op(a, b) }
            }

            #[inline(always)]
            fn $lt(a: __m256i, b: __m256i) -> __m256i {
                unsafe { $gt_op(b, a) }
            }

            #[inline(always)]
            fn $ltu(a: __m256i, b: __m256i) -> __m256i {
                unsafe {
                    let bias = $bias;
                    $gt_op(_mm256_xor_si256(b, bias), _mm256_xor_si256(a, bias))
                }
            }
        )*
    };
}

compares! {
    eq_epi8 = _mm256_cmpeq_epi8, lt_epi8, lt_epu8 = _mm256_cmpgt_epi8, _mm256_set1_epi8(i8::MIN);
    eq_epi16 = _mm256_cmpeq_epi16, lt_epi16, lt_epu16 = _mm256_cmpgt_epi16, _mm256_set1_epi16(i16::MIN);
    eq_epi32 = _mm256_cmpeq_epi32, lt_epi32, lt_epu32 = _mm256_cmpgt_epi32, _mm256_set1_epi32(i32::MIN);
    eq_epi64 = _mm256_cmpeq_epi64, lt_epi64, lt_epu64 = _mm256_cmpgt_epi64, _mm256_set1_epi64x(i64::MIN);
}

// Mask to bitset.

#[inline(always)]
fn movemask8(k: __m256i) -> u64 {
    unsafe { _mm256_movemask_epi8(k) as u32 as u64 }
}

// packs works per half: half 0 lands in bits 0..8, half 1 in bits 16..24.
#[inline(always)]
fn movemask16(k: __m256i) -> u64 {
    let m = unsafe { _mm256_movemask_epi8(_mm256_packs_epi16(k, _mm256_setzero_si256())) as u32 };
    ((m & 0xFF) | ((m >> 8) & 0xFF00)) as u64
}

#[inline(always)]
fn movemask32(k: __m256i) -> u64 {
    unsafe { _mm256_movemask_ps(_mm256_castsi256_ps(k)) as u32 as u64 }
}

#[inline(always)]
fn movemask64(k: __m256i) -> u64 {
    unsafe { _mm256_movemask_pd(_mm256_castsi256_pd(k)) as u32 as u64 }
}

// Shifts by a common count.

#[inline(always)]
fn shl_epi8(a: __m256i, count: u32) -> __m256i {
    if count >= 8 {
        return unsafe { _mm256_setzero_si256() };
    }
    unsafe {
        _mm256_and_si256(
            _mm256_sll_epi16(a, shift_count(count)),
            _mm256_set1_epi8((0xFFu8 << count) as i8),
        )
    }
}

#[inline(always)]
fn srl_epi8(a: __m256i, count: u32) -> __m256i {
    if count >= 8 {
        return unsafe { _mm256_setzero_si256() };
    }
    unsafe {
        _mm256_and_si256(
            _mm256_srl_epi16(a, shift_count(count)),
            _mm256_set1_epi8((0xFFu8 >> count) as i8),
        )
    }
}

#[inline(always)]
fn sra_epi8(a: __m256i, count: u32) -> __m256i {
    unsafe {
        let c = shift_count(count.min(7));
        let hi = _mm256_and_si256(_mm256_sra_epi16(a, c), _mm256_set1_epi16(0xFF00u16 as i16));
        let lo = _mm256_srli_epi16::<8>(_mm256_sra_epi16(_mm256_slli_epi16::<8>(a), c));
        _mm256_or_si256(hi, lo)
    }
}

macro_rules! count_shifts {
    ($($name:ident = $op:ident;)*) => {
        $(
            #[inline(always)]
            fn $name(a: __m256i, count: u32) -> __m256i {
                unsafe { $op(a, shift_count(count)) }
            }
        )*
    };
}

count_shifts! {
    sll_epi16 = _mm256_sll_epi16;
    srl_epi16 = _mm256_srl_epi16;
    sra_epi16 = _mm256_sra_epi16;
    sll_epi32 = _mm256_sll_epi32;
    srl_epi32 = _mm256_srl_epi32;
    sra_epi32 = _mm256_sra_epi32;
    sll_epi64 = _mm256_sll_epi64;
    srl_epi64 = _mm256_srl_epi64;
}

#[inline(always)]
fn sra_epi64(a: __m256i, count: u32) -> __m256i {
    let count = count.min(63);
    unsafe {
        let sign = _mm256_cmpgt_epi64(_mm256_setzero_si256(), a);
        let fill = _mm256_sll_epi64(sign, shift_count(64 - count));
        _mm256_or_si256(_mm256_srl_epi64(a, shift_count(count)), fill)
    }
}

// Per-lane shift counts.

macro_rules! variable_shifts {
    ($($name:ident = $op:ident;)*) => {
        $(
            #[inline(always)]
            fn $name(a: __m256i, b: __m256i) -> __m256i {
                unsafe { $op(a, b) }
            }
        )*
    };
}

variable_shifts! {
    sllv_epi32 = _mm256_sllv_epi32;
    srlv_epi32 = _mm256_srlv_epi32;
    srav_epi32 = _mm256_srav_epi32;
    sllv_epi64 = _mm256_sllv_epi64;
    srlv_epi64 = _mm256_srlv_epi64;
}

macro_rules! avx_int {
    (
        $t:ty, $st:ty, $bytes:expr,
        set1: $set1:ident, add: $add:ident, sub: $sub:ident,
        mul: $mul:path, div: $div:path, abs: $abs:path,
        min: $min:path, max: $max:path, eq: $eq:path, lt: $lt:path,
        movemask: $movemask:path,
        shl: $shl:path, shr: $shr:path, shlv: $shlv:path, shrv: $shrv:path
    ) => {
        impl IsaLane<Avx> for $t {
            type Reg = __m256i;
            type MaskReg = __m256i;

            #[inline(always)]
            fn zeroed() -> __m256i {
                unsafe { _mm256_setzero_si256() }
            }

            #[inline(always)]
            fn splat(x: $t) -> __m256i {
                unsafe { $set1(x as $st) }
            }

            #[inline(always)]
            unsafe fn load_aligned(ptr: *const $t) -> __m256i {
                _mm256_load_si256(ptr as *const __m256i)
            }

            #[inline(always)]
            unsafe fn load_unaligned(ptr: *const $t) -> __m256i {
                _mm256_loadu_si256(ptr as *const __m256i)
            }

            #[inline(always)]
            unsafe fn store_aligned(ptr: *mut $t, a: __m256i) {
                _mm256_store_si256(ptr as *mut __m256i, a)
            }

            #[inline(always)]
            unsafe fn store_unaligned(ptr: *mut $t, a: __m256i) {
                _mm256_storeu_si256(ptr as *mut __m256i, a)
            }

            #[inline(always)]
            fn add(a: __m256i, b: __m256i) -> __m256i {
                unsafe { $add(a, b) }
            }

            #[inline(always)]
            fn sub(a: __m256i, b: __m256i) -> __m256i {
                unsafe { $sub(a, b) }
            }

            #[inline(always)]
            fn mul(a: __m256i, b: __m256i) -> __m256i {
                $mul(a, b)
            }

            #[inline(always)]
            fn div(a: __m256i, b: __m256i) -> __m256i {
                clear_zero_divisor_lanes::<Avx, $t>($div(a, b), b)
            }

            #[inline(always)]
            fn neg(a: __m256i) -> __m256i {
                unsafe { $sub(_mm256_setzero_si256(), a) }
            }

            #[inline(always)]
            fn abs(a: __m256i) -> __m256i {
                $abs(a)
            }

            #[inline(always)]
            fn min(a: __m256i, b: __m256i) -> __m256i {
                $min(a, b)
            }

            #[inline(always)]
            fn max(a: __m256i, b: __m256i) -> __m256i {
                $max(a, b)
            }

            #[inline(always)]
            fn bit_and(a: __m256i, b: __m256i) -> __m256i {
                unsafe { _mm256_and_si256(a, b) }
            }

            #[inline(always)]
            fn bit_or(a: __m256i, b: __m256i) -> __m256i {
                unsafe { _mm256_or_si256(a, b) }
            }

            #[inline(always)]
            fn bit_xor(a: __m256i, b: __m256i) -> __m256i {
                unsafe { _mm256_xor_si256(a, b) }
            }

            #[inline(always)]
            fn andnot(a: __m256i, b: __m256i) -> __m256i {
                unsafe { _mm256_andnot_si256(a, b) }
            }

            #[inline(always)]
            fn bit_not(a: __m256i) -> __m256i {
                unsafe { _mm256_xor_si256(a, ones()) }
            }

            #[inline(always)]
            fn cmp_eq(a: __m256i, b: __m256i) -> __m256i {
                $eq(a, b)
            }

            #[inline(always)]
            fn cmp_lt(a: __m256i, b: __m256i) -> __m256i {
                $lt(a, b)
            }

            #[inline(always)]
            fn cmp_le(a: __m256i, b: __m256i) -> __m256i {
                unsafe { _mm256_xor_si256($lt(b, a), ones()) }
            }

            #[inline(always)]
            fn blend(k: __m256i, a: __m256i, b: __m256i) -> __m256i {
                select(k, a, b)
            }

            #[inline(always)]
            fn mask_to_bits(k: __m256i) -> u64 {
                $movemask(k)
            }

            #[inline(always)]
            fn mask_from_bits(bits: u64) -> __m256i {
                bits_to_mask(bits, $bytes)
            }

            #[inline(always)]
            fn mask_and(a: __m256i, b: __m256i) -> __m256i {
                unsafe { _mm256_and_si256(a, b) }
            }

            #[inline(always)]
            fn mask_or(a: __m256i, b: __m256i) -> __m256i {
                unsafe { _mm256_or_si256(a, b) }
            }

            #[inline(always)]
            fn mask_xor(a: __m256i, b: __m256i) -> __m256i {
                unsafe { _mm256_xor_si256(a, b) }
            }

            #[inline(always)]
            fn mask_not(a: __m256i) -> __m256i {
                unsafe { _mm256_xor_si256(a, ones()) }
            }

            #[inline(always)]
            fn shift_down(a: __m256i, lanes: usize) -> __m256i {
                shift_bytes_down(a, lanes * $bytes)
            }
        }

        impl IsaIntLane<Avx> for $t {
            #[inline(always)]
            fn shl(a: __m256i, b: __m256i) -> __m256i {
                $shlv(a, b)
            }

            #[inline(always)]
            fn shr(a: __m256i, b: __m256i) -> __m256i {
                $shrv(a, b)
            }

            #[inline(always)]
            fn shl_scalar(a: __m256i, count: u32) -> __m256i {
                $shl(a, count)
            }

            #[inline(always)]
            fn shr_scalar(a: __m256i, count: u32) -> __m256i {
                $shr(a, count)
            }
        }
    };
}

avx_int!(
    i8, i8, 1,
    set1: _mm256_set1_epi8, add: _mm256_add_epi8, sub: _mm256_sub_epi8,
    mul: mul_epi8, div: div_epi8, abs: abs_epi8,
    min: min_epi8, max: max_epi8, eq: eq_epi8, lt: lt_epi8,
    movemask: movemask8,
    shl: shl_epi8, shr: sra_epi8, shlv: lanewise_shl::<i8>, shrv: lanewise_shr::<i8>
);

avx_int!(
    u8, i8, 1,
    set1: _mm256_set1_epi8, add: _mm256_add_epi8, sub: _mm256_sub_epi8,
    mul: mul_epi8, div: div_epu8, abs: identity,
    min: min_epu8, max: max_epu8, eq: eq_epi8, lt: lt_epu8,
    movemask: movemask8,
    shl: shl_epi8, shr: srl_epi8, shlv: lanewise_shl::<u8>, shrv: lanewise_shr::<u8>
);

avx_int!(
    i16, i16, 2,
    set1: _mm256_set1_epi16, add: _mm256_add_epi16, sub: _mm256_sub_epi16,
    mul: mul_epi16, div: div_epi16, abs: abs_epi16,
    min: min_epi16, max: max_epi16, eq: eq_epi16, lt: lt_epi16,
    movemask: movemask16,
    shl: sll_epi16, shr: sra_epi16, shlv: lanewise_shl::<i16>, shrv: lanewise_shr::<i16>
);

avx_int!(
    u16, i16, 2,
    set1: _mm256_set1_epi16, add: _mm256_add_epi16, sub: _mm256_sub_epi16,
    mul: mul_epi16, div: div_epu16, abs: identity,
    min: min_epu16, max: max_epu16, eq: eq_epi16, lt: lt_epu16,
    movemask: movemask16,
    shl: sll_epi16, shr: srl_epi16, shlv: lanewise_shl::<u16>, shrv: lanewise_shr::<u16>
);

avx_int!(
    i32, i32, 4,
    set1: _mm256_set1_epi32, add: _mm256_add_epi32, sub: _mm256_sub_epi32,
    mul: mul_epi32, div: div_epi32, abs: abs_epi32,
    min: min_epi32, max: max_epi32, eq: eq_epi32, lt: lt_epi32,
    movemask: movemask32,
    shl: sll_epi32, shr: sra_epi32, shlv: sllv_epi32, shrv: srav_epi32
);

avx_int!(
    u32, i32, 4,
    set1: _mm256_set1_epi32, add: _mm256_add_epi32, sub: _mm256_sub_epi32,
    mul: mul_epi32, div: lanewise_div::<u32>, abs: identity,
    min: min_epu32, max: max_epu32, eq: eq_epi32, lt: lt_epu32,
    movemask: movemask32,
    shl: sll_epi32, shr: srl_epi32, shlv: sllv_epi32, shrv: srlv_epi32
);

avx_int!(
    i64, i64, 8,
    set1: _mm256_set1_epi64x, add: _mm256_add_epi64, sub: _mm256_sub_epi64,
    mul: mul_epi64, div: lanewise_div::<i64>, abs: abs_epi64,
    min: min_epi64, max: max_epi64, eq: eq_epi64, lt: lt_epi64,
    movemask: movemask64,
    shl: sll_epi64, shr: sra_epi64, shlv: sllv_epi64, shrv: lanewise_shr::<i64>
);

avx_int!(
    u64, i64, 8,
    set1: _mm256_set1_epi64x, add: _mm256_add_epi64, sub: _mm256_sub_epi64,
    mul: mul_epi64, div: lanewise_div::<u64>, abs: identity,
    min: min_epu64, max: max_epu64, eq: eq_epi64, lt: lt_epu64,
    movemask: movemask64,
    shl: sll_epi64, shr: srl_epi64, shlv: sllv_epi64, shrv: srlv_epi64
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simd::storage::Storage;

    fn reg<T: Vectorizable, const N: usize>(lanes: [T; N]) -> __m256i {
        Storage::<T, __m256i>::from_lanes(lanes).raw()
    }

    fn lanes<T: Vectorizable, const N: usize>(a: __m256i) -> [T; N] {
        let s = Storage::<T, __m256i>::from_raw(a);
        std::array::from_fn(|i| s.get(i))
    }

    #[test]
    fn test_division_keeps_lane_order() {
        let a: [i16; 16] = std::array::from_fn(|i| (i as i16 - 8) * 1000);
        let b: [i16; 16] = std::array::from_fn(|i| i as i16 % 5 + 1);
        let q = lanes::<i16, 16>(<i16 as IsaLane<Avx>>::div(reg(a), reg(b)));
        assert_eq!(q, std::array::from_fn(|i| a[i] / b[i]));

        let a: [u8; 32] = std::array::from_fn(|i| 255 - i as u8);
        let b: [u8; 32] = std::array::from_fn(|i| i as u8 % 7 + 1);
        let q = lanes::<u8, 32>(<u8 as IsaLane<Avx>>::div(reg(a), reg(b)));
        assert_eq!(q, std::array::from_fn(|i| a[i] / b[i]));

        let a = [i32::MIN, -9, 9, 1 << 30, 7, -7, 100, i32::MAX];
        let b = [-1, 2, -2, 3, 7, 8, -9, 1];
        let q = lanes::<i32, 8>(<i32 as IsaLane<Avx>>::div(reg(a), reg(b)));
        assert_eq!(q, std::array::from_fn(|i| a[i].wrapping_div(b[i])));
    }

    #[test]
    fn test_unsigned_compares_and_masks() {
        let a: [u16; 16] = std::array::from_fn(|i| if i % 2 == 0 { u16::MAX - i as u16 } else { i as u16 });
        let b = [0x8000u16; 16];
        let k = <u16 as IsaLane<Avx>>::cmp_lt(reg(a), reg(b));
        assert_eq!(<u16 as IsaLane<Avx>>::mask_to_bits(k), 0xAAAA);
        let roundtrip = <u16 as IsaLane<Avx>>::mask_from_bits(0x1234);
        assert_eq!(<u16 as IsaLane<Avx>>::mask_to_bits(roundtrip), 0x1234);

        let k = <u64 as IsaLane<Avx>>::cmp_le(reg([u64::MAX, 0, 5, 6]), reg([0u64, u64::MAX, 5, 5]));
        assert_eq!(<u64 as IsaLane<Avx>>::mask_to_bits(k), 0b0110);
    }

    #[test]
    fn test_64_bit_multiply_and_shift() {
        let a = [u64::MAX, 3, 1 << 40, 0xDEAD_BEEF_0000_0001];
        let b = [7u64, 5, 1 << 30, 0x1_0000_0001];
        let p = lanes::<u64, 4>(<u64 as IsaLane<Avx>>::mul(reg(a), reg(b)));
        assert_eq!(p, std::array::from_fn(|i| a[i].wrapping_mul(b[i])));

        let s = lanes::<i64, 4>(<i64 as IsaIntLane<Avx>>::shr_scalar(reg([-1024i64, 1024, i64::MIN, -1]), 4));
        assert_eq!(s, [-64, 64, i64::MIN >> 4, -1]);
    }
}
