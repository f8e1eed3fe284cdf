//! One-lane implementation: the member is the element itself and the mask a
//! `bool`.

use crate::simd::element::{SimdFloat, SimdInteger, Vectorizable};
use crate::simd::traits::{MaskImpl, ReduceOp, SimdFloatImpl, SimdImpl, SimdIntImpl};

pub struct ScalarImpl;

impl<T: Vectorizable> MaskImpl<T> for ScalarImpl {
    const LANES: usize = 1;

    type MaskMember = bool;

    #[inline(always)]
    fn mask_broadcast(value: bool) -> bool {
        value
    }

    #[inline(always)]
    fn mask_from_bitset(bits: u64) -> bool {
        bits & 1 == 1
    }

    #[inline(always)]
    fn mask_to_bitset(mask: bool) -> u64 {
        mask as u64
    }

    #[inline(always)]
    fn mask_and(a: bool, b: bool) -> bool {
        a & b
    }

    #[inline(always)]
    fn mask_or(a: bool, b: bool) -> bool {
        a | b
    }

    #[inline(always)]
    fn mask_xor(a: bool, b: bool) -> bool {
        a ^ b
    }

    #[inline(always)]
    fn mask_not(a: bool) -> bool {
        !a
    }
}

impl<T: Vectorizable> SimdImpl<T> for ScalarImpl {
    type SimdMember = T;

    #[inline(always)]
    unsafe fn load(ptr: *const T, _aligned: bool) -> T {
        ptr.read_unaligned()
    }

    #[inline(always)]
    unsafe fn store(value: T, ptr: *mut T, _aligned: bool) {
        ptr.write_unaligned(value)
    }

    #[inline(always)]
    unsafe fn masked_load(merge: T, k: bool, ptr: *const T) -> T {
        if k {
            ptr.read_unaligned()
        } else {
            merge
        }
    }

    #[inline(always)]
    unsafe fn masked_store(value: T, k: bool, ptr: *mut T) {
        if k {
            ptr.write_unaligned(value)
        }
    }

    #[inline(always)]
    fn broadcast(value: T) -> T {
        value
    }

    #[inline(always)]
    fn generate<F: FnMut(usize) -> T>(mut generator: F) -> T {
        generator(0)
    }

    #[inline(always)]
    fn get(value: T, i: usize) -> T {
        debug_assert!(i == 0, "lane {i} out of range");
        value
    }

    #[inline(always)]
    fn set(value: &mut T, i: usize, lane: T) {
        debug_assert!(i == 0, "lane {i} out of range");
        *value = lane;
    }

    #[inline(always)]
    fn add(a: T, b: T) -> T {
        a.lane_add(b)
    }

    #[inline(always)]
    fn sub(a: T, b: T) -> T {
        a.lane_sub(b)
    }

    #[inline(always)]
    fn mul(a: T, b: T) -> T {
        a.lane_mul(b)
    }

    #[inline(always)]
    fn div(a: T, b: T) -> T {
        a.lane_div(b)
    }

    #[inline(always)]
    fn neg(a: T) -> T {
        a.lane_neg()
    }

    #[inline(always)]
    fn bit_and(a: T, b: T) -> T {
        a.lane_and(b)
    }

    #[inline(always)]
    fn bit_or(a: T, b: T) -> T {
        a.lane_or(b)
    }

    #[inline(always)]
    fn bit_xor(a: T, b: T) -> T {
        a.lane_xor(b)
    }

    #[inline(always)]
    fn bit_not(a: T) -> T {
        a.lane_not()
    }

    #[inline(always)]
    fn eq(a: T, b: T) -> bool {
        a == b
    }

    #[inline(always)]
    fn lt(a: T, b: T) -> bool {
        a < b
    }

    #[inline(always)]
    fn le(a: T, b: T) -> bool {
        a <= b
    }

    #[inline(always)]
    fn min(a: T, b: T) -> T {
        a.lane_min(b)
    }

    #[inline(always)]
    fn max(a: T, b: T) -> T {
        a.lane_max(b)
    }

    #[inline(always)]
    fn abs(a: T) -> T {
        a.lane_abs()
    }

    #[inline(always)]
    fn blend(k: bool, a: T, b: T) -> T {
        if k {
            b
        } else {
            a
        }
    }

    #[inline(always)]
    fn reduce<Op: ReduceOp<T>>(value: T) -> T {
        value
    }
}

impl<T: SimdInteger> SimdIntImpl<T> for ScalarImpl {
    #[inline(always)]
    fn rem(a: T, b: T) -> T {
        a.lane_rem(b)
    }

    #[inline(always)]
    fn shl(a: T, b: T) -> T {
        a.lane_shl(b.shift_count())
    }

    #[inline(always)]
    fn shr(a: T, b: T) -> T {
        a.lane_shr(b.shift_count())
    }

    #[inline(always)]
    fn shl_scalar(a: T, count: u32) -> T {
        a.lane_shl(count as u64)
    }

    #[inline(always)]
    fn shr_scalar(a: T, count: u32) -> T {
        a.lane_shr(count as u64)
    }
}

impl<T: SimdFloat> SimdFloatImpl<T> for ScalarImpl {
    #[inline(always)]
    fn sqrt(a: T) -> T {
        <T as num::Float>::sqrt(a)
    }

    #[inline(always)]
    fn floor(a: T) -> T {
        <T as num::Float>::floor(a)
    }

    #[inline(always)]
    fn ceil(a: T) -> T {
        <T as num::Float>::ceil(a)
    }

    #[inline(always)]
    fn trunc(a: T) -> T {
        <T as num::Float>::trunc(a)
    }

    #[inline(always)]
    fn round(a: T) -> T {
        <T as num::Float>::round(a)
    }

    #[inline(always)]
    fn logb(a: T) -> T {
        a.lane_logb()
    }

    #[inline(always)]
    fn frexp(a: T) -> (T, T) {
        let (mantissa, exponent) = a.lane_frexp();
        (mantissa, T::from_i128(exponent as i128))
    }

    #[inline(always)]
    fn ldexp(a: T, exp: T) -> T {
        a.lane_ldexp(Vectorizable::to_f64(exp) as i32)
    }

    #[inline(always)]
    fn fma(a: T, b: T, c: T) -> T {
        <T as num::Float>::mul_add(a, b, c)
    }

    #[inline(always)]
    fn signbit(a: T) -> bool {
        <T as num::Float>::is_sign_negative(a)
    }

    #[inline(always)]
    fn isnan(a: T) -> bool {
        <T as num::Float>::is_nan(a)
    }

    #[inline(always)]
    fn isinf(a: T) -> bool {
        <T as num::Float>::is_infinite(a)
    }

    #[inline(always)]
    fn isfinite(a: T) -> bool {
        <T as num::Float>::is_finite(a)
    }

    #[inline(always)]
    fn isnormal(a: T) -> bool {
        <T as num::Float>::is_normal(a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simd::traits::Plus;

    #[test]
    fn test_one_lane_semantics() {
        assert_eq!(<ScalarImpl as SimdImpl<f32>>::add(1.0, 2.0), 3.0);
        assert_eq!(<ScalarImpl as SimdImpl<i8>>::add(i8::MAX, 1), i8::MIN);
        assert_eq!(<ScalarImpl as SimdImpl<u32>>::div(7, 0), 0);
        assert_eq!(<ScalarImpl as SimdImpl<u16>>::reduce::<Plus>(9), 9);
        assert!(<ScalarImpl as SimdImpl<f64>>::lt(-1.0, 0.0));
    }

    #[test]
    fn test_mask_bitset() {
        assert!(<ScalarImpl as MaskImpl<f32>>::mask_from_bitset(0b11));
        assert_eq!(<ScalarImpl as MaskImpl<f32>>::mask_to_bitset(true), 1);
        assert!(<ScalarImpl as MaskImpl<i32>>::mask_all(true));
        assert!(!<ScalarImpl as MaskImpl<i32>>::mask_some(true));
        assert_eq!(<ScalarImpl as MaskImpl<i32>>::mask_find_first_set(true), 0);
    }

    #[test]
    fn test_masked_memory() {
        let src = 5i64;
        let v = unsafe { <ScalarImpl as SimdImpl<i64>>::masked_load(1, false, &src) };
        assert_eq!(v, 1);
        let mut dst = 0i64;
        unsafe { <ScalarImpl as SimdImpl<i64>>::masked_store(3, true, &mut dst) };
        assert_eq!(dst, 3);
    }

    #[test]
    fn test_float_helpers() {
        assert_eq!(<ScalarImpl as SimdFloatImpl<f64>>::frexp(12.0), (0.75, 4.0));
        assert_eq!(<ScalarImpl as SimdFloatImpl<f64>>::ldexp(0.75, 4.0), 12.0);
        assert_eq!(<ScalarImpl as SimdFloatImpl<f32>>::round(-2.5), -3.0);
        assert!(<ScalarImpl as SimdFloatImpl<f32>>::signbit(-0.0));
        assert!(<ScalarImpl as SimdFloatImpl<f32>>::isunordered(1.0, f32::NAN));
    }
}
