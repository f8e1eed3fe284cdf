//! Integer lanes in `xmm` registers.
//!
//! SSE only has signed compares, so unsigned ordering XORs both operands with
//! the `1 << (bits - 1)` bias first. Operations without an instruction at any
//! SSE level (8-bit multiply, narrow division, 64-bit compares on plain SSE2)
//! are synthesised from wider or neighbouring instructions.

#[cfg(target_arch = "x86")]
use std::arch::x86::*;

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use super::{
    div_epi16, div_epu16, ones, select_si128, shift_bytes_down, shift_count, sign_fill_epi64,
};
use crate::simd::element::{SimdInteger, Vectorizable};
use crate::simd::isa::{clear_zero_divisor_lanes, zip_lanes, IsaIntLane, IsaLane, Sse};

/// Full-width mask with lane `i` set where bit `i` of `bits` is set.
#[inline(always)]
pub(crate) fn bits_to_mask(bits: u64, lane_bytes: usize) -> __m128i {
    unsafe {
        match lane_bytes {
            1 => {
                let v = _mm_unpacklo_epi64(
                    _mm_set1_epi8(bits as u8 as i8),
                    _mm_set1_epi8((bits >> 8) as u8 as i8),
                );
                let select = _mm_set1_epi64x(0x8040_2010_0804_0201u64 as i64);
                _mm_cmpeq_epi8(_mm_and_si128(v, select), select)
            }
            2 => {
                let select = _mm_setr_epi16(1, 2, 4, 8, 16, 32, 64, 128);
                _mm_cmpeq_epi16(_mm_and_si128(_mm_set1_epi16(bits as i16), select), select)
            }
            4 => {
                let select = _mm_setr_epi32(1, 2, 4, 8);
                _mm_cmpeq_epi32(_mm_and_si128(_mm_set1_epi32(bits as i32), select), select)
            }
            _ => {
                let select = _mm_setr_epi32(1, 1, 2, 2);
                _mm_cmpeq_epi32(_mm_and_si128(_mm_set1_epi32(bits as i32), select), select)
            }
        }
    }
}

#[inline(always)]
fn lanewise_div<T: Vectorizable>(a: __m128i, b: __m128i) -> __m128i {
    zip_lanes(a, b, T::lane_div)
}

#[inline(always)]
fn lanewise_shl<T: SimdInteger>(a: __m128i, b: __m128i) -> __m128i {
    zip_lanes(a, b, |x: T, n: T| x.lane_shl(n.shift_count()))
}

#[inline(always)]
fn lanewise_shr<T: SimdInteger>(a: __m128i, b: __m128i) -> __m128i {
    zip_lanes(a, b, |x: T, n: T| x.lane_shr(n.shift_count()))
}

#[inline(always)]
fn identity(a: __m128i) -> __m128i {
    a
}

// 8-bit lanes.

#[inline(always)]
fn mul_epi8(a: __m128i, b: __m128i) -> __m128i {
    unsafe {
        let even = _mm_mullo_epi16(a, b);
        let odd = _mm_mullo_epi16(_mm_srli_epi16::<8>(a), _mm_srli_epi16::<8>(b));
        _mm_or_si128(
            _mm_slli_epi16::<8>(odd),
            _mm_and_si128(even, _mm_set1_epi16(0xFF)),
        )
    }
}

#[inline(always)]
fn narrow_epi16(lo: __m128i, hi: __m128i) -> __m128i {
    unsafe {
        let low_byte = _mm_set1_epi16(0xFF);
        _mm_packus_epi16(_mm_and_si128(lo, low_byte), _mm_and_si128(hi, low_byte))
    }
}

#[inline(always)]
fn div_epi8(a: __m128i, b: __m128i) -> __m128i {
    unsafe {
        let a_lo = _mm_srai_epi16::<8>(_mm_unpacklo_epi8(a, a));
        let a_hi = _mm_srai_epi16::<8>(_mm_unpackhi_epi8(a, a));
        let b_lo = _mm_srai_epi16::<8>(_mm_unpacklo_epi8(b, b));
        let b_hi = _mm_srai_epi16::<8>(_mm_unpackhi_epi8(b, b));
        narrow_epi16(div_epi16(a_lo, b_lo), div_epi16(a_hi, b_hi))
    }
}

#[inline(always)]
fn div_epu8(a: __m128i, b: __m128i) -> __m128i {
    unsafe {
        let zero = _mm_setzero_si128();
        let a_lo = _mm_unpacklo_epi8(a, zero);
        let a_hi = _mm_unpackhi_epi8(a, zero);
        let b_lo = _mm_unpacklo_epi8(b, zero);
        let b_hi = _mm_unpackhi_epi8(b, zero);
        narrow_epi16(div_epu16(a_lo, b_lo), div_epu16(a_hi, b_hi))
    }
}

#[inline(always)]
fn abs_epi8(a: __m128i) -> __m128i {
    unsafe {
        #[cfg(have_ssse3)]
        {
            _mm_abs_epi8(a)
        }
        #[cfg(not(have_ssse3))]
        {
            let s = _mm_cmpgt_epi8(_mm_setzero_si128(), a);
            _mm_sub_epi8(_mm_xor_si128(a, s), s)
        }
    }
}

#[inline(always)]
fn bias8() -> __m128i {
    unsafe { _mm_set1_epi8(i8::MIN) }
}

#[inline(always)]
fn min_epi8(a: __m128i, b: __m128i) -> __m128i {
    unsafe {
        #[cfg(have_sse4_1)]
        {
            _mm_min_epi8(a, b)
        }
        #[cfg(not(have_sse4_1))]
        {
            let bias = bias8();
            _mm_xor_si128(_mm_min_epu8(_mm_xor_si128(a, bias), _mm_xor_si128(b, bias)), bias)
        }
    }
}

#[inline(always)]
fn max_epi8(a: __m128i, b: __m128i) -> __m128i {
    unsafe {
        #[cfg(have_sse4_1)]
        {
            _mm_max_epi8(a, b)
        }
        #[cfg(not(have_sse4_1))]
        {
            let bias = bias8();
            _mm_xor_si128(_mm_max_epu8(_mm_xor_si128(a, bias), _mm_xor_si128(b, bias)), bias)
        }
    }
}

#[inline(always)]
fn min_epu8(a: __m128i, b: __m128i) -> __m128i {
    unsafe { _mm_min_epu8(a, b) }
}

#[inline(always)]
fn max_epu8(a: __m128i, b: __m128i) -> __m128i {
    unsafe { _mm_max_epu8(a, b) }
}

#[inline(always)]
fn eq_epi8(a: __m128i, b: __m128i) -> __m128i {
    unsafe { _mm_cmpeq_epi8(a, b) }
}

#[inline(always)]
fn lt_epi8(a: __m128i, b: __m128i) -> __m128i {
    unsafe { _mm_cmplt_epi8(a, b) }
}

#[inline(always)]
fn lt_epu8(a: __m128i, b: __m128i) -> __m128i {
    unsafe {
        let bias = bias8();
        _mm_cmplt_epi8(_mm_xor_si128(a, bias), _mm_xor_si128(b, bias))
    }
}

#[inline(always)]
fn movemask8(k: __m128i) -> u64 {
    unsafe { _mm_movemask_epi8(k) as u32 as u64 }
}

#[inline(always)]
fn shl_epi8(a: __m128i, count: u32) -> __m128i {
    if count >= 8 {
        return unsafe { _mm_setzero_si128() };
    }
    unsafe {
        _mm_and_si128(
            _mm_sll_epi16(a, shift_count(count)),
            _mm_set1_epi8((0xFFu8 << count) as i8),
        )
    }
}

#[inline(always)]
fn srl_epi8(a: __m128i, count: u32) -> __m128i {
    if count >= 8 {
        return unsafe { _mm_setzero_si128() };
    }
    unsafe {
        _mm_and_si128(
            _mm_srl_epi16(a, shift_count(count)),
            _mm_set1_epi8((0xFFu8 >> count) as i8),
        )
    }
}

#[inline(always)]
fn sra_epi8(a: __m128i, count: u32) -> __m128i {
    unsafe {
        let c = shift_count(count.min(7));
        let hi = _mm_and_si128(_mm_sra_epi16(a, c), _mm_set1_epi16(0xFF00u16 as i16));
        let lo = _mm_srli_epi16::<8>(_mm_sra_epi16(_mm_slli_epi16::<8>(a), c));
        _mm_or_si128(hi, lo)
    }
}

// 16-bit lanes.

#[inline(always)]
fn bias16() -> __m128i {
    unsafe { _mm_set1_epi16(i16::MIN) }
}

#[inline(always)]
fn mul_epi16(a: __m128i, b: __m128i) -> __m128i {
    unsafe { _mm_mullo_epi16(a, b) }
}

#[inline(always)]
fn abs_epi16(a: __m128i) -> __m128i {
    unsafe {
        #[cfg(have_ssse3)]
        {
            _mm_abs_epi16(a)
        }
        #[cfg(not(have_ssse3))]
        {
            _mm_max_epi16(a, _mm_sub_epi16(_mm_setzero_si128(), a))
        }
    }
}

#[inline(always)]
fn min_epi16(a: __m128i, b: __m128i) -> __m128i {
    unsafe { _mm_min_epi16(a, b) }
}

#[inline(always)]
fn max_epi16(a: __m128i, b: __m128i) -> __m128i {
    unsafe { _mm_max_epi16(a, b) }
}

#[inline(always)]
fn min_epu16(a: __m128i, b: __m128i) -> __m128i {
    unsafe {
        #[cfg(have_sse4_1)]
        {
            _mm_min_epu16(a, b)
        }
        #[cfg(not(have_sse4_1))]
        {
            let bias = bias16();
            _mm_xor_si128(_mm_min_epi16(_mm_xor_si128(a, bias), _mm_xor_si128(b, bias)), bias)
        }
    }
}

#[inline(always)]
fn max_epu16(a: __m128i, b: __m128i) -> __m128i {
    unsafe {
        #[cfg(have_sse4_1)]
        {
            _mm_max_epu16(a, b)
        }
        #[cfg(not(have_sse4_1))]
        {
            let bias = bias16();
            _mm_xor_si128(_mm_max_epi16(_mm_xor_si128(a, bias), _mm_xor_si128(b, bias)), bias)
        }
    }
}

#[inline(always)]
fn eq_epi16(a: __m128i, b: __m128i) -> __m128i {
    unsafe { _mm_cmpeq_epi16(a, b) }
}

#[inline(always)]
fn lt_epi16(a: __m128i, b: __m128i) -> __m128i {
    unsafe { _mm_cmplt_epi16(a, b) }
}

#[inline(always)]
fn lt_epu16(a: __m128i, b: __m128i) -> __m128i {
    unsafe {
        let bias = bias16();
        _mm_cmplt_epi16(_mm_xor_si128(a, bias), _mm_xor_si128(b, bias))
    }
}

#[inline(always)]
fn movemask16(k: __m128i) -> u64 {
    unsafe { (_mm_movemask_epi8(_mm_packs_epi16(k, _mm_setzero_si128())) as u32 & 0xFF) as u64 }
}

#[inline(always)]
fn sll_epi16(a: __m128i, count: u32) -> __m128i {
    unsafe { _mm_sll_epi16(a, shift_count(count)) }
}

#[inline(always)]
fn srl_epi16(a: __m128i, count: u32) -> __m128i {
    unsafe { _mm_srl_epi16(a, shift_count(count)) }
}

#[inline(always)]
fn sra_epi16(a: __m128i, count: u32) -> __m128i {
    unsafe { _mm_sra_epi16(a, shift_count(count)) }
}

// 32-bit lanes.

#[inline(always)]
fn bias32() -> __m128i {
    unsafe { _mm_set1_epi32(i32::MIN) }
}

#[inline(always)]
fn mul_epi32(a: __m128i, b: __m128i) -> __m128i {
    unsafe {
        #[cfg(have_sse4_1)]
        {
            _mm_mullo_epi32(a, b)
        }
        #[cfg(not(have_sse4_1))]
        {
            let even = _mm_mul_epu32(a, b);
            let odd = _mm_mul_epu32(_mm_srli_epi64::<32>(a), _mm_srli_epi64::<32>(b));
            _mm_unpacklo_epi32(
                _mm_shuffle_epi32::<0x08>(even),
                _mm_shuffle_epi32::<0x08>(odd),
            )
        }
    }
}

// Every 32-bit quotient is exact after truncating the correctly rounded f64
// quotient.
#[inline(always)]
fn div_epi32(a: __m128i, b: __m128i) -> __m128i {
    unsafe {
        let lo = _mm_div_pd(_mm_cvtepi32_pd(a), _mm_cvtepi32_pd(b));
        let hi = _mm_div_pd(
            _mm_cvtepi32_pd(_mm_unpackhi_epi64(a, a)),
            _mm_cvtepi32_pd(_mm_unpackhi_epi64(b, b)),
        );
        _mm_unpacklo_epi64(_mm_cvttpd_epi32(lo), _mm_cvttpd_epi32(hi))
    }
}

#[inline(always)]
fn abs_epi32(a: __m128i) -> __m128i {
    unsafe {
        #[cfg(have_ssse3)]
        {
            _mm_abs_epi32(a)
        }
        #[cfg(not(have_ssse3))]
        {
            let s = _mm_srai_epi32::<31>(a);
            _mm_sub_epi32(_mm_xor_si128(a, s), s)
        }
    }
}

#[inline(always)]
fn eq_epi32(a: __m128i, b: __m128i) -> __m128i {
    unsafe { _mm_cmpeq_epi32(a, b) }
}

#[inline(always)]
fn lt_epi32(a: __m128i, b: __m128i) -> __m128i {
    unsafe { _mm_cmplt_epi32(a, b) }
}

#[inline(always)]
fn lt_epu32(a: __m128i, b: __m128i) -> __m128i {
    unsafe {
        let bias = bias32();
        _mm_cmplt_epi32(_mm_xor_si128(a, bias), _mm_xor_si128(b, bias))
    }
}

#[inline(always)]
fn min_epi32(a: __m128i, b: __m128i) -> __m128i {
    #[cfg(have_sse4_1)]
    {
        unsafe { _mm_min_epi32(a, b) }
    }
    #[cfg(not(have_sse4_1))]
    {
        select_si128(lt_epi32(a, b), b, a)
    }
}

#[inline(always)]
fn max_epi32(a: __m128i, b: __m128i) -> __m128i {
    #[cfg(have_sse4_1)]
    {
        unsafe { _mm_max_epi32(a, b) }
    }
    #[cfg(not(have_sse4_1))]
    {
        select_si128(lt_epi32(b, a), b, a)
    }
}

#[inline(always)]
fn min_epu32(a: __m128i, b: __m128i) -> __m128i {
    #[cfg(have_sse4_1)]
    {
        unsafe { _mm_min_epu32(a, b) }
    }
    #[cfg(not(have_sse4_1))]
    {
        select_si128(lt_epu32(a, b), b, a)
    }
}

#[inline(always)]
fn max_epu32(a: __m128i, b: __m128i) -> __m128i {
    #[cfg(have_sse4_1)]
    {
        unsafe { _mm_max_epu32(a, b) }
    }
    #[cfg(not(have_sse4_1))]
    {
        select_si128(lt_epu32(b, a), b, a)
    }
}

#[inline(always)]
fn movemask32(k: __m128i) -> u64 {
    unsafe { _mm_movemask_ps(_mm_castsi128_ps(k)) as u32 as u64 }
}

#[inline(always)]
fn sll_epi32(a: __m128i, count: u32) -> __m128i {
    unsafe { _mm_sll_epi32(a, shift_count(count)) }
}

#[inline(always)]
fn srl_epi32(a: __m128i, count: u32) -> __m128i {
    unsafe { _mm_srl_epi32(a, shift_count(count)) }
}

#[inline(always)]
fn sra_epi32(a: __m128i, count: u32) -> __m128i {
    unsafe { _mm_sra_epi32(a, shift_count(count)) }
}

#[inline(always)]
fn sllv_epi32(a: __m128i, b: __m128i) -> __m128i {
    #[cfg(have_avx2)]
    {
        unsafe { _mm_sllv_epi32(a, b) }
    }
    #[cfg(not(have_avx2))]
    {
        lanewise_shl::<u32>(a, b)
    }
}

#[inline(always)]
fn srlv_epi32(a: __m128i, b: __m128i) -> __m128i {
    #[cfg(have_avx2)]
    {
        unsafe { _mm_srlv_epi32(a, b) }
    }
    #[cfg(not(have_avx2))]
    {
        lanewise_shr::<u32>(a, b)
    }
}

#[inline(always)]
fn srav_epi32(a: __m128i, b: __m128i) -> __m128i {
    #[cfg(have_avx2)]
    {
        unsafe { _mm_srav_epi32(a, b) }
    }
    #[cfg(not(have_avx2))]
    {
        lanewise_shr::<i32>(a, b)
    }
}

// 64-bit lanes.

#[inline(always)]
fn mul_epi64(a: __m128i, b: __m128i) -> __m128i {
    unsafe {
        let a_hi = _mm_srli_epi64::<32>(a);
        let b_hi = _mm_srli_epi64::<32>(b);
        let low = _mm_mul_epu32(a, b);
        let cross = _mm_add_epi64(_mm_mul_epu32(a_hi, b), _mm_mul_epu32(a, b_hi));
        _mm_add_epi64(low, _mm_slli_epi64::<32>(cross))
    }
}

#[inline(always)]
fn abs_epi64(a: __m128i) -> __m128i {
    unsafe {
        let s = sign_fill_epi64(a);
        _mm_sub_epi64(_mm_xor_si128(a, s), s)
    }
}

#[inline(always)]
fn eq_epi64(a: __m128i, b: __m128i) -> __m128i {
    unsafe {
        #[cfg(have_sse4_1)]
        {
            _mm_cmpeq_epi64(a, b)
        }
        #[cfg(not(have_sse4_1))]
        {
            let halves = _mm_cmpeq_epi32(a, b);
            _mm_and_si128(halves, _mm_shuffle_epi32::<0xB1>(halves))
        }
    }
}

// Plain SSE2: the high dwords decide unless they are equal, in which case the
// borrow of `b - a` carries the unsigned order of the low dwords.
#[inline(always)]
fn gt_epi64(a: __m128i, b: __m128i) -> __m128i {
    unsafe {
        #[cfg(have_sse4_2)]
        {
            _mm_cmpgt_epi64(a, b)
        }
        #[cfg(not(have_sse4_2))]
        {
            let r = _mm_and_si128(_mm_cmpeq_epi32(a, b), _mm_sub_epi64(b, a));
            let r = _mm_or_si128(r, _mm_cmpgt_epi32(a, b));
            _mm_shuffle_epi32::<0xF5>(r)
        }
    }
}

#[inline(always)]
fn lt_epi64(a: __m128i, b: __m128i) -> __m128i {
    gt_epi64(b, a)
}

#[inline(always)]
fn lt_epu64(a: __m128i, b: __m128i) -> __m128i {
    unsafe {
        let bias = _mm_set1_epi64x(i64::MIN);
        gt_epi64(_mm_xor_si128(b, bias), _mm_xor_si128(a, bias))
    }
}

#[inline(always)]
fn min_epi64(a: __m128i, b: __m128i) -> __m128i {
    select_si128(lt_epi64(a, b), b, a)
}

#[inline(always)]
fn max_epi64(a: __m128i, b: __m128i) -> __m128i {
    select_si128(lt_epi64(b, a), b, a)
}

#[inline(always)]
fn min_epu64(a: __m128i, b: __m128i) -> __m128i {
    select_si128(lt_epu64(a, b), b, a)
}

#[inline(always)]
fn max_epu64(a: __m128i, b: __m128i) -> __m128i {
    select_si128(lt_epu64(b, a), b, a)
}

#[inline(always)]
fn movemask64(k: __m128i) -> u64 {
    unsafe { _mm_movemask_pd(_mm_castsi128_pd(k)) as u32 as u64 }
}

#[inline(always)]
fn sll_epi64(a: __m128i, count: u32) -> __m128i {
    unsafe { _mm_sll_epi64(a, shift_count(count)) }
}

#[inline(always)]
fn srl_epi64(a: __m128i, count: u32) -> __m128i {
    unsafe { _mm_srl_epi64(a, shift_count(count)) }
}

// No arithmetic 64-bit shift before AVX512: shift logically and OR the sign
// fill back into the vacated bits.
#[inline(always)]
fn sra_epi64(a: __m128i, count: u32) -> __m128i {
    let count = count.min(63);
    unsafe {
        let fill = _mm_sll_epi64(sign_fill_epi64(a), shift_count(64 - count));
        _mm_or_si128(_mm_srl_epi64(a, shift_count(count)), fill)
    }
}

#[inline(always)]
fn sllv_epi64(a: __m128i, b: __m128i) -> __m128i {
    #[cfg(have_avx2)]
    {
        unsafe { _mm_sllv_epi64(a, b) }
    }
    #[cfg(not(have_avx2))]
    {
        lanewise_shl::<u64>(a, b)
    }
}

#[inline(always)]
fn srlv_epi64(a: __m128i, b: __m128i) -> __m128i {
    #[cfg(have_avx2)]
    {
        unsafe { _mm_srlv_epi64(a, b) }
    }
    #[cfg(not(have_avx2))]
    {
        lanewise_shr::<u64>(a, b)
    }
}

macro_rules! sse_int {
    (
        $t:ty, $st:ty, $bytes:expr,
        set1: $set1:ident, add: $add:ident, sub: $sub:ident,
        mul: $mul:path, div: $div:path, abs: $abs:path,
        min: $min:path, max: $max:path, eq: $eq:path, lt: $lt:path,
        movemask: $movemask:path,
        shl: $shl:path, shr: $shr:path, shlv: $shlv:path, shrv: $shrv:path
    ) => {
        impl IsaLane<Sse> for $t {
            type Reg = __m128i;
            type MaskReg = __m128i;

            #[inline(always)]
            fn zeroed() -> __m128i {
                unsafe { _mm_setzero_si128() }
            }

            #[inline(always)]
            fn splat(x: $t) -> __m128i {
                unsafe { $set1(x as $st) }
            }

            #[inline(always)]
            unsafe fn load_aligned(ptr: *const $t) -> __m128i {
                _mm_load_si128(ptr as *const __m128i)
            }

            #[inline(always)]
            unsafe fn load_unaligned(ptr: *const $t) -> __m128i {
                _mm_loadu_si128(ptr as *const __m128i)
            }

            #[inline(always)]
            unsafe fn store_aligned(ptr: *mut $t, a: __m128i) {
                _mm_store_si128(ptr as *mut __m128i, a)
            }

            #[inline(always)]
            unsafe fn store_unaligned(ptr: *mut $t, a: __m128i) {
                _mm_storeu_si128(ptr as *mut __m128i, a)
            }

            #[inline(always)]
            fn add(a: __m128i, b: __m128i) -> __m128i {
                unsafe { $add(a, b) }
            }

            #[inline(always)]
            fn sub(a: __m128i, b: __m128i) -> __m128i {
                unsafe { $sub(a, b) }
            }

            #[inline(always)]
            fn mul(a: __m128i, b: __m128i) -> __m128i {
                $mul(a, b)
            }

            #[inline(always)]
            fn div(a: __m128i, b: __m128i) -> __m128i {
                clear_zero_divisor_lanes::<Sse, $t>($div(a, b), b)
            }

            #[inline(always)]
            fn neg(a: __m128i) -> __m128i {
                unsafe { $sub(_mm_setzero_si128(), a) }
            }

            #[inline(always)]
            fn abs(a: __m128i) -> __m128i {
                $abs(a)
            }

            #[inline(always)]
            fn min(a: __m128i, b: __m128i) -> __m128i {
                $min(a, b)
            }

            #[inline(always)]
            fn max(a: __m128i, b: __m128i) -> __m128i {
                $max(a, b)
            }

            #[inline(always)]
            fn bit_and(a: __m128i, b: __m128i) -> __m128i {
                unsafe { _mm_and_si128(a, b) }
            }

            #[inline(always)]
            fn bit_or(a: __m128i, b: __m128i) -> __m128i {
                unsafe { _mm_or_si128(a, b) }
            }

            #[inline(always)]
            fn bit_xor(a: __m128i, b: __m128i) -> __m128i {
                unsafe { _mm_xor_si128(a, b) }
            }

            #[inline(always)]
            fn andnot(a: __m128i, b: __m128i) -> __m128i {
                unsafe { _mm_andnot_si128(a, b) }
            }

            #[inline(always)]
            fn bit_not(a: __m128i) -> __m128i {
                unsafe { _mm_xor_si128(a, ones()) }
            }

            #[inline(always)]
            fn cmp_eq(a: __m128i, b: __m128i) -> __m128i {
                $eq(a, b)
            }

            #[inline(always)]
            fn cmp_lt(a: __m128i, b: __m128i) -> __m128i {
                $lt(a, b)
            }

            #[inline(always)]
            fn cmp_le(a: __m128i, b: __m128i) -> __m128i {
                unsafe { _mm_xor_si128($lt(b, a), ones()) }
            }

            #[inline(always)]
            fn blend(k: __m128i, a: __m128i, b: __m128i) -> __m128i {
                select_si128(k, a, b)
            }

            #[inline(always)]
            fn mask_to_bits(k: __m128i) -> u64 {
                $movemask(k)
            }

            #[inline(always)]
            fn mask_from_bits(bits: u64) -> __m128i {
                bits_to_mask(bits, $bytes)
            }

            #[inline(always)]
            fn mask_and(a: __m128i, b: __m128i) -> __m128i {
                unsafe { _mm_and_si128(a, b) }
            }

            #[inline(always)]
            fn mask_or(a: __m128i, b: __m128i) -> __m128i {
                unsafe { _mm_or_si128(a, b) }
            }

            #[inline(always)]
            fn mask_xor(a: __m128i, b: __m128i) -> __m128i {
                unsafe { _mm_xor_si128(a, b) }
            }

            #[inline(always)]
            fn mask_not(a: __m128i) -> __m128i {
                unsafe { _mm_xor_si128(a, ones()) }
            }

            #[inline(always)]
            fn shift_down(a: __m128i, lanes: usize) -> __m128i {
                shift_bytes_down(a, lanes * $bytes)
            }
        }

        impl IsaIntLane<Sse> for $t {
            #[inline(always)]
            fn shl(a: __m128i, b: __m128i) -> __m128i {
                $shlv(a, b)
            }

            #[inline(always)]
            fn shr(a: __m128i, b: __m128i) -> __m128i {
                $shrv(a, b)
            }

            #[inline(always)]
            fn shl_scalar(a: __m128i, count: u32) -> __m128i {
                $shl(a, count)
            }

            #[inline(always)]
            fn shr_scalar(a: __m128i, count: u32) -> __m128i {
                $shr(a, count)
            }
        }
    };
}

sse_int!(
    i8, i8, 1,
    set1: _mm_set1_epi8, add: _mm_add_epi8, sub: _mm_sub_epi8,
    mul: mul_epi8, div: div_epi8, abs: abs_epi8,
    min: min_epi8, max: max_epi8, eq: eq_epi8, lt: lt_epi8,
    movemask: movemask8,
    shl: shl_epi8, shr: sra_epi8, shlv: lanewise_shl::<i8>, shrv: lanewise_shr::<i8>
);

sse_int!(
    u8, i8, 1,
    set1: _mm_set1_epi8, add: _mm_add_epi8, sub: _mm_sub_epi8,
    mul: mul_epi8, div: div_epu8, abs: identity,
    min: min_epu8, max: max_epu8, eq: eq_epi8, lt: lt_epu8,
    movemask: movemask8,
    shl: shl_epi8, shr: srl_epi8, shlv: lanewise_shl::<u8>, shrv: lanewise_shr::<u8>
);

sse_int!(
    i16, i16, 2,
    set1: _mm_set1_epi16, add: _mm_add_epi16, sub: _mm_sub_epi16,
    mul: mul_epi16, div: div_epi16, abs: abs_epi16,
    min: min_epi16, max: max_epi16, eq: eq_epi16, lt: lt_epi16,
    movemask: movemask16,
    shl: sll_epi16, shr: sra_epi16, shlv: lanewise_shl::<i16>, shrv: lanewise_shr::<i16>
);

sse_int!(
    u16, i16, 2,
    set1: _mm_set1_epi16, add: _mm_add_epi16, sub: _mm_sub_epi16,
    mul: mul_epi16, div: div_epu16, abs: identity,
    min: min_epu16, max: max_epu16, eq: eq_epi16, lt: lt_epu16,
    movemask: movemask16,
    shl: sll_epi16, shr: srl_epi16, shlv: lanewise_shl::<u16>, shrv: lanewise_shr::<u16>
);

sse_int!(
    i32, i32, 4,
    set1: _mm_set1_epi32, add: _mm_add_epi32, sub: _mm_sub_epi32,
    mul: mul_epi32, div: div_epi32, abs: abs_epi32,
    min: min_epi32, max: max_epi32, eq: eq_epi32, lt: lt_epi32,
    movemask: movemask32,
    shl: sll_epi32, shr: sra_epi32, shlv: sllv_epi32, shrv: srav_epi32
);

sse_int!(
    u32, i32, 4,
    set1: _mm_set1_epi32, add: _mm_add_epi32, sub: _mm_sub_epi32,
    mul: mul_epi32, div: lanewise_div::<u32>, abs: identity,
    min: min_epu32, max: max_epu32, eq: eq_epi32, lt: lt_epu32,
    movemask: movemask32,
    shl: sll_epi32, shr: srl_epi32, shlv: sllv_epi32, shrv: srlv_epi32
);

sse_int!(
    i64, i64, 8,
    set1: _mm_set1_epi64x, add: _mm_add_epi64, sub: _mm_sub_epi64,
    mul: mul_epi64, div: lanewise_div::<i64>, abs: abs_epi64,
    min: min_epi64, max: max_epi64, eq: eq_epi64, lt: lt_epi64,
    movemask: movemask64,
    shl: sll_epi64, shr: sra_epi64, shlv: sllv_epi64, shrv: lanewise_shr::<i64>
);

sse_int!(
    u64, i64, 8,
    set1: _mm_set1_epi64x, add: _mm_add_epi64, sub: _mm_sub_epi64,
    mul: mul_epi64, div: lanewise_div::<u64>, abs: identity,
    min: min_epu64, max: max_epu64, eq: eq_epi64, lt: lt_epu64,
    movemask: movemask64,
    shl: sll_epi64, shr: srl_epi64, shlv: sllv_epi64, shrv: srlv_epi64
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simd::storage::Storage;

    fn reg<T: Vectorizable, const N: usize>(lanes: [T; N]) -> __m128i {
        Storage::<T, __m128i>::from_lanes(lanes).raw()
    }

    fn lanes<T: Vectorizable, const N: usize>(a: __m128i) -> [T; N] {
        let s = Storage::<T, __m128i>::from_raw(a);
        std::array::from_fn(|i| s.get(i))
    }

    fn bits<T: IsaLane<Sse, MaskReg = __m128i>>(k: __m128i) -> u64 {
        T::mask_to_bits(k)
    }

    mod unsigned_compare_tests {
        use super::*;

        #[test]
        fn test_bias_trick_orders_unsigned_lanes() {
            let a = reg([u32::MAX, 1, 0x8000_0000, 5]);
            let b = reg([1u32, u32::MAX, 0x7FFF_FFFF, 5]);
            assert_eq!(bits::<u32>(<u32 as IsaLane<Sse>>::cmp_lt(a, b)), 0b0010);
            assert_eq!(bits::<u32>(<u32 as IsaLane<Sse>>::cmp_le(a, b)), 0b1010);

            let a = reg([255u8; 16]);
            let b = reg([1u8; 16]);
            assert_eq!(bits::<u8>(<u8 as IsaLane<Sse>>::cmp_lt(a, b)), 0);
            assert_eq!(bits::<u8>(<u8 as IsaLane<Sse>>::cmp_lt(b, a)), 0xFFFF);

            let a = reg([u16::MAX, 0, 0x8000, 0x7FFF, 3, 3, 0, 1]);
            let b = reg([0u16, u16::MAX, 0x7FFF, 0x8000, 3, 4, 0, 0]);
            assert_eq!(bits::<u16>(<u16 as IsaLane<Sse>>::cmp_lt(a, b)), 0b0010_1010);
        }

        #[test]
        fn test_unsigned_64_bit_compare() {
            let a = reg([u64::MAX, 1]);
            let b = reg([1u64, u64::MAX]);
            assert_eq!(bits::<u64>(<u64 as IsaLane<Sse>>::cmp_lt(a, b)), 0b10);
            let m = lanes::<u64, 2>(<u64 as IsaLane<Sse>>::min(a, b));
            assert_eq!(m, [1, 1]);
        }

        #[test]
        fn test_signed_64_bit_compare() {
            let cases = [
                (i64::MIN, i64::MAX),
                (-1, 0),
                (0x1_0000_0000, 0xFFFF_FFFF),
                (0xFFFF_FFFF, 0x1_0000_0000),
                (5, 5),
                (-0x1_0000_0000, -0xFFFF_FFFF),
            ];
            for (x, y) in cases {
                let k = <i64 as IsaLane<Sse>>::cmp_lt(reg([x, y]), reg([y, x]));
                let expected = (x < y) as u64 | ((y < x) as u64) << 1;
                assert_eq!(bits::<i64>(k), expected, "{x} vs {y}");
                let k = <i64 as IsaLane<Sse>>::cmp_eq(reg([x, y]), reg([y, y]));
                assert_eq!(bits::<i64>(k), (x == y) as u64 | 0b10);
            }
        }
    }

    mod arithmetic_tests {
        use super::*;

        #[test]
        fn test_byte_multiply_and_divide() {
            let a: [i8; 16] = [-128, 127, -7, 7, 100, -100, 0, 1, 2, 3, 4, 5, 6, 7, 8, 9];
            let b: [i8; 16] = [-1, 2, 2, -2, 3, 3, 5, 1, -2, 3, 4, 5, 6, 7, 8, -9];
            let prod = lanes::<i8, 16>(<i8 as IsaLane<Sse>>::mul(reg(a), reg(b)));
            let quot = lanes::<i8, 16>(<i8 as IsaLane<Sse>>::div(reg(a), reg(b)));
            for i in 0..16 {
                assert_eq!(prod[i], a[i].wrapping_mul(b[i]), "mul lane {i}");
                assert_eq!(quot[i], a[i].wrapping_div(b[i]), "div lane {i}");
            }

            let a: [u8; 16] = std::array::from_fn(|i| 255 - i as u8 * 13);
            let b: [u8; 16] = std::array::from_fn(|i| 1 + i as u8 * 7);
            let quot = lanes::<u8, 16>(<u8 as IsaLane<Sse>>::div(reg(a), reg(b)));
            let prod = lanes::<u8, 16>(<u8 as IsaLane<Sse>>::mul(reg(a), reg(b)));
            for i in 0..16 {
                assert_eq!(quot[i], a[i] / b[i]);
                assert_eq!(prod[i], a[i].wrapping_mul(b[i]));
            }
        }

        #[test]
        fn test_word_multiply_and_divide() {
            let a = [i32::MIN, i32::MAX, -7, 1 << 20];
            let b = [-1, 3, 2, (1 << 12) + 1];
            let prod = lanes::<i32, 4>(<i32 as IsaLane<Sse>>::mul(reg(a), reg(b)));
            let quot = lanes::<i32, 4>(<i32 as IsaLane<Sse>>::div(reg(a), reg(b)));
            for i in 0..4 {
                assert_eq!(prod[i], a[i].wrapping_mul(b[i]));
                assert_eq!(quot[i], a[i].wrapping_div(b[i]));
            }

            let a = [u64::MAX, 0x1234_5678_9ABC_DEF0];
            let b = [3u64, 0xFEDC_BA98_7654_3210];
            let prod = lanes::<u64, 2>(<u64 as IsaLane<Sse>>::mul(reg(a), reg(b)));
            assert_eq!(prod, [a[0].wrapping_mul(b[0]), a[1].wrapping_mul(b[1])]);
        }

        #[test]
        fn test_remainder_and_abs() {
            let a = [7i16, -7, 7, -7, i16::MIN, 0, 100, -1];
            let b = [3i16, 3, -3, -3, -1, 9, 7, 5];
            let r = lanes::<i16, 8>(<i16 as IsaIntLane<Sse>>::rem(reg(a), reg(b)));
            for i in 0..8 {
                assert_eq!(r[i], a[i].wrapping_rem(b[i]));
            }
            let abs = lanes::<i16, 8>(<i16 as IsaLane<Sse>>::abs(reg(a)));
            assert_eq!(abs, a.map(i16::wrapping_abs));
            let abs = lanes::<i64, 2>(<i64 as IsaLane<Sse>>::abs(reg([i64::MIN + 1, -3])));
            assert_eq!(abs, [i64::MAX, 3]);
        }

        #[test]
        fn test_min_max_signed_bytes() {
            let a: [i8; 16] = std::array::from_fn(|i| (i as i8 - 8) * 15);
            let b: [i8; 16] = std::array::from_fn(|i| (8 - i as i8) * 9);
            let min = lanes::<i8, 16>(<i8 as IsaLane<Sse>>::min(reg(a), reg(b)));
            let max = lanes::<i8, 16>(<i8 as IsaLane<Sse>>::max(reg(a), reg(b)));
            for i in 0..16 {
                assert_eq!(min[i], a[i].min(b[i]));
                assert_eq!(max[i], a[i].max(b[i]));
            }
        }
    }

    mod shift_tests {
        use super::*;

        #[test]
        fn test_scalar_shifts_saturate_out_of_range_counts() {
            let a = reg([-128i8, -1, 64, 1, 0, 127, -2, 3, -128, -1, 64, 1, 0, 127, -2, 3]);
            for count in [0u32, 1, 3, 7, 8, 100] {
                let l = lanes::<i8, 16>(<i8 as IsaIntLane<Sse>>::shl_scalar(a, count));
                let r = lanes::<i8, 16>(<i8 as IsaIntLane<Sse>>::shr_scalar(a, count));
                let src = lanes::<i8, 16>(a);
                for i in 0..16 {
                    assert_eq!(l[i], src[i].lane_shl(count as u64), "shl {count}");
                    assert_eq!(r[i], src[i].lane_shr(count as u64), "shr {count}");
                }
            }

            let a = reg([i64::MIN, -5]);
            for count in [0u32, 1, 32, 63, 64, 1000] {
                let r = lanes::<i64, 2>(<i64 as IsaIntLane<Sse>>::shr_scalar(a, count));
                assert_eq!(r, [i64::MIN.lane_shr(count as u64), (-5i64).lane_shr(count as u64)]);
            }

            let a = reg([0xF0u8; 16]);
            let r = lanes::<u8, 16>(<u8 as IsaIntLane<Sse>>::shr_scalar(a, 3));
            assert_eq!(r, [0x1E; 16]);
        }

        #[test]
        fn test_variable_shifts() {
            let a = reg([1u32, 0x8000_0000, 3, 5]);
            let n = reg([31u32, 31, 32, u32::MAX]);
            assert_eq!(lanes::<u32, 4>(<u32 as IsaIntLane<Sse>>::shl(a, n)), [0x8000_0000, 0, 0, 0]);
            assert_eq!(lanes::<u32, 4>(<u32 as IsaIntLane<Sse>>::shr(a, n)), [0, 1, 0, 0]);

            let a = reg([-8i32, -8, 8, 8]);
            let n = reg([1i32, 40, 40, -1]);
            assert_eq!(lanes::<i32, 4>(<i32 as IsaIntLane<Sse>>::shr(a, n)), [-4, -1, 0, 0]);
        }
    }

    #[test]
    fn test_mask_bits_roundtrip_every_width() {
        for pattern in [0u64, 1, 0b1010, 0x8001, 0xFFFF, 0x5A5A] {
            assert_eq!(bits::<u8>(<u8 as IsaLane<Sse>>::mask_from_bits(pattern)), pattern & 0xFFFF);
            assert_eq!(bits::<i16>(<i16 as IsaLane<Sse>>::mask_from_bits(pattern)), pattern & 0xFF);
            assert_eq!(bits::<u32>(<u32 as IsaLane<Sse>>::mask_from_bits(pattern)), pattern & 0xF);
            assert_eq!(bits::<i64>(<i64 as IsaLane<Sse>>::mask_from_bits(pattern)), pattern & 0x3);
        }
    }
}
