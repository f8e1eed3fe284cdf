//! Horizontal operations: folding the lanes of a vector and summarising the
//! lanes of a mask.

use crate::simd::abi::AbiTraits;
use crate::simd::element::Vectorizable;
use crate::simd::mask::SimdMask;
use crate::simd::simd::Simd;
use crate::simd::traits::{MaskImpl, Maximum, Minimum, ReduceOp, SimdImpl};
use crate::simd::where_expr::ConstWhereExpression;

type Impl<T, A> = <A as AbiTraits<T>>::Impl;

/// Folds every lane of `x` with the associative operation `op`.
///
/// The grouping of the fold is unspecified, so float sums may differ from a
/// sequential left-to-right sum in the last bits.
///
/// ```rust
/// use simdabi::simd::{reduce, FixedSizeSimd, Multiplies, Plus};
///
/// let x = FixedSizeSimd::<i32, 5>::from_array([1, 2, 3, 4, 5]);
/// assert_eq!(reduce(x, Plus), 15);
/// assert_eq!(reduce(x, Multiplies), 120);
/// ```
#[inline]
pub fn reduce<T, A, Op>(x: Simd<T, A>, _op: Op) -> T
where
    T: Vectorizable,
    A: AbiTraits<T>,
    Op: ReduceOp<T>,
{
    <Impl<T, A> as SimdImpl<T>>::reduce::<Op>(x.member())
}

/// Folds the selected lanes of a where-expression. Unselected lanes count as
/// `identity`, which must be the identity element of `op`.
#[inline]
pub fn reduce_masked<T, A, Op>(expr: ConstWhereExpression<'_, Simd<T, A>>, identity: T, op: Op) -> T
where
    T: Vectorizable,
    A: AbiTraits<T>,
    Op: ReduceOp<T>,
{
    let filled = Simd::select(expr.mask(), expr.value(), Simd::splat(identity));
    reduce(filled, op)
}

/// Smallest lane.
#[inline]
pub fn hmin<T: Vectorizable, A: AbiTraits<T>>(x: Simd<T, A>) -> T {
    reduce(x, Minimum)
}

/// Largest lane.
#[inline]
pub fn hmax<T: Vectorizable, A: AbiTraits<T>>(x: Simd<T, A>) -> T {
    reduce(x, Maximum)
}

#[inline]
pub fn all_of<T: Vectorizable, A: AbiTraits<T>>(k: SimdMask<T, A>) -> bool {
    <Impl<T, A> as MaskImpl<T>>::mask_all(k.member())
}

#[inline]
pub fn any_of<T: Vectorizable, A: AbiTraits<T>>(k: SimdMask<T, A>) -> bool {
    <Impl<T, A> as MaskImpl<T>>::mask_any(k.member())
}

#[inline]
pub fn none_of<T: Vectorizable, A: AbiTraits<T>>(k: SimdMask<T, A>) -> bool {
    <Impl<T, A> as MaskImpl<T>>::mask_none(k.member())
}

/// At least one lane set and at least one lane clear.
#[inline]
pub fn some_of<T: Vectorizable, A: AbiTraits<T>>(k: SimdMask<T, A>) -> bool {
    <Impl<T, A> as MaskImpl<T>>::mask_some(k.member())
}

/// Number of set lanes.
#[inline]
pub fn popcount<T: Vectorizable, A: AbiTraits<T>>(k: SimdMask<T, A>) -> usize {
    <Impl<T, A> as MaskImpl<T>>::mask_popcount(k.member())
}

/// Index of the lowest set lane, `None` for an empty mask.
#[inline]
pub fn find_first_set<T: Vectorizable, A: AbiTraits<T>>(k: SimdMask<T, A>) -> Option<usize> {
    if none_of(k) {
        None
    } else {
        Some(<Impl<T, A> as MaskImpl<T>>::mask_find_first_set(k.member()))
    }
}

/// Index of the highest set lane, `None` for an empty mask.
#[inline]
pub fn find_last_set<T: Vectorizable, A: AbiTraits<T>>(k: SimdMask<T, A>) -> Option<usize> {
    if none_of(k) {
        None
    } else {
        Some(<Impl<T, A> as MaskImpl<T>>::mask_find_last_set(k.member()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simd::mask::FixedSizeSimdMask;
    use crate::simd::simd::{FixedSizeSimd, NativeSimd, ScalarSimd};
    use crate::simd::traits::{BitOr, BitXor, Plus};
    use crate::simd::where_expr::where_ref;

    mod value_tests {
        use super::*;

        #[test]
        fn test_sum_over_odd_widths() {
            let x3 = FixedSizeSimd::<u32, 3>::from_fn(|i| i as u32 + 1);
            let x13 = FixedSizeSimd::<i64, 13>::from_fn(|i| i as i64 - 6);
            let x31 = FixedSizeSimd::<u8, 31>::splat(9);

            assert_eq!(reduce(x3, Plus), 6);
            assert_eq!(reduce(x13, Plus), 0);
            assert_eq!(reduce(x31, Plus), (31u32 * 9 % 256) as u8);
        }

        #[test]
        fn test_min_max_and_bits() {
            let x = NativeSimd::<i16>::from_fn(|i| (i as i16 * 7) % 5 - 2);
            let lanes: Vec<i16> = x.to_vec();
            assert_eq!(hmin(x), *lanes.iter().min().unwrap());
            assert_eq!(hmax(x), *lanes.iter().max().unwrap());

            let y = FixedSizeSimd::<u16, 5>::from_array([1, 2, 4, 8, 8]);
            assert_eq!(reduce(y, BitOr), 15);
            assert_eq!(reduce(y, BitXor), 7);
            assert_eq!(reduce(ScalarSimd::<f64>::splat(2.5), Plus), 2.5);
        }

        #[test]
        fn test_masked_sum_ignores_unselected_lanes() {
            let x = FixedSizeSimd::<f32, 6>::from_fn(|i| i as f32);
            let k = x.simd_ge(3.0.into());
            assert_eq!(reduce_masked(where_ref(&k, &x), 0.0, Plus), 12.0);
            assert_eq!(reduce_masked(where_ref(&!k, &x), f32::INFINITY, Minimum), 0.0);
        }
    }

    mod mask_tests {
        use super::*;

        #[test]
        fn test_mask_predicates() {
            let all = FixedSizeSimdMask::<f64, 7>::splat(true);
            let none = FixedSizeSimdMask::<f64, 7>::splat(false);
            let some = FixedSizeSimdMask::<f64, 7>::from_bitset(0b0010_0100);

            assert!(all_of(all) && any_of(all) && !none_of(all) && !some_of(all));
            assert!(!all_of(none) && !any_of(none) && none_of(none) && !some_of(none));
            assert!(!all_of(some) && any_of(some) && !none_of(some) && some_of(some));
            assert_eq!(popcount(some), 2);
        }

        #[test]
        fn test_find_set_lanes() {
            let k = FixedSizeSimdMask::<i8, 20>::from_bitset((1 << 3) | (1 << 17));
            assert_eq!(find_first_set(k), Some(3));
            assert_eq!(find_last_set(k), Some(17));
            assert_eq!(find_first_set(FixedSizeSimdMask::<i8, 20>::splat(false)), None);

            let native = NativeSimd::<f32>::splat(1.0).simd_eq(1.0.into());
            assert_eq!(find_last_set(native), Some(NativeSimd::<f32>::LANES - 1));
        }
    }
}
