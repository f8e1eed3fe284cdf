//! Per-lane boolean masks.
//!
//! `SimdMask<T, A>` has the lane count of `Simd<T, A>` and the representation
//! the ABI uses for comparison results: a full-width register for SSE, AVX and
//! NEON, a `k` register for AVX512, a bitset for fixed-size vectors and a
//! `bool` for the scalar ABI.

use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not};

use crate::simd::abi::{AbiTraits, FixedSize, MaskMember, NativeAbi, Scalar};
use crate::simd::converter::convert_mask;
use crate::simd::element::Vectorizable;
use crate::simd::traits::MaskImpl;

type Impl<T, A> = <A as AbiTraits<T>>::Impl;

/// A mask with one boolean per lane of `Simd<T, A>`.
#[repr(transparent)]
pub struct SimdMask<T: Vectorizable, A: AbiTraits<T> = NativeAbi<T>> {
    data: MaskMember<T, A>,
}

pub type NativeSimdMask<T> = SimdMask<T, NativeAbi<T>>;

pub type FixedSizeSimdMask<T, const N: usize> = SimdMask<T, FixedSize<N>>;

pub type ScalarSimdMask<T> = SimdMask<T, Scalar>;

impl<T: Vectorizable, A: AbiTraits<T>> Clone for SimdMask<T, A> {
    #[inline(always)]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Vectorizable, A: AbiTraits<T>> Copy for SimdMask<T, A> {}

impl<T: Vectorizable, A: AbiTraits<T>> SimdMask<T, A> {
    pub const LANES: usize = A::LANES;

    #[inline(always)]
    pub(crate) fn from_member(data: MaskMember<T, A>) -> Self {
        Self { data }
    }

    #[inline(always)]
    pub(crate) fn member(self) -> MaskMember<T, A> {
        self.data
    }

    #[inline(always)]
    pub fn splat(value: bool) -> Self {
        Self::from_member(<Impl<T, A> as MaskImpl<T>>::mask_broadcast(value))
    }

    /// Lane `i` is bit `i` of `bits`; bits at or above `LANES` are ignored.
    #[inline(always)]
    pub fn from_bitset(bits: u64) -> Self {
        Self::from_member(<Impl<T, A> as MaskImpl<T>>::mask_from_bitset(bits))
    }

    /// Bit `i` is lane `i`; higher bits are zero.
    #[inline(always)]
    pub fn to_bitset(self) -> u64 {
        <Impl<T, A> as MaskImpl<T>>::mask_to_bitset(self.data)
    }

    pub fn from_array<const M: usize>(lanes: [bool; M]) -> Self {
        const { assert!(M == <A as AbiTraits<T>>::LANES, "array length differs from the lane count") };
        Self::from_bitset(
            lanes
                .iter()
                .enumerate()
                .fold(0u64, |bits, (i, &lane)| bits | ((lane as u64) << i)),
        )
    }

    pub fn from_fn<F: FnMut(usize) -> bool>(mut generator: F) -> Self {
        Self::from_bitset((0..Self::LANES).fold(0u64, |bits, i| bits | ((generator(i) as u64) << i)))
    }

    pub fn to_vec(self) -> Vec<bool> {
        (0..Self::LANES).map(|i| self.get(i)).collect()
    }

    #[inline]
    #[track_caller]
    pub fn get(&self, i: usize) -> bool {
        assert!(i < Self::LANES, "lane {i} out of range for {} lanes", Self::LANES);
        <Impl<T, A> as MaskImpl<T>>::mask_get(self.data, i)
    }

    #[inline]
    #[track_caller]
    pub fn set(&mut self, i: usize, value: bool) {
        assert!(i < Self::LANES, "lane {i} out of range for {} lanes", Self::LANES);
        <Impl<T, A> as MaskImpl<T>>::mask_set(&mut self.data, i, value);
    }

    /// Lane-wise logical and.
    #[inline(always)]
    pub fn and(self, other: Self) -> Self {
        self & other
    }

    /// Lane-wise logical or.
    #[inline(always)]
    pub fn or(self, other: Self) -> Self {
        self | other
    }

    /// The same lanes as a mask for elements of `U`.
    #[inline]
    pub fn cast<U: Vectorizable>(self) -> SimdMask<U, A>
    where
        A: AbiTraits<U>,
    {
        SimdMask::from_member(convert_mask::<T, A, U, A>(self.data))
    }

    /// The same lanes in the representation of another ABI with the same lane
    /// count.
    #[inline]
    pub fn convert<U: Vectorizable, B: AbiTraits<U>>(self) -> SimdMask<U, B> {
        SimdMask::from_member(convert_mask::<T, A, U, B>(self.data))
    }
}

impl<T: Vectorizable, A: AbiTraits<T>> Default for SimdMask<T, A> {
    fn default() -> Self {
        Self::splat(false)
    }
}

impl<T: Vectorizable, A: AbiTraits<T>> From<bool> for SimdMask<T, A> {
    #[inline(always)]
    fn from(value: bool) -> Self {
        Self::splat(value)
    }
}

impl<T: Vectorizable, A: AbiTraits<T>> PartialEq for SimdMask<T, A> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        <Impl<T, A> as MaskImpl<T>>::mask_eq(self.data, other.data)
    }
}

impl<T: Vectorizable, A: AbiTraits<T>> Eq for SimdMask<T, A> {}

impl<T: Vectorizable, A: AbiTraits<T>> fmt::Debug for SimdMask<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SimdMask<{}>", A::NAME)?;
        f.debug_list()
            .entries((0..Self::LANES).map(|i| self.get(i)))
            .finish()
    }
}

macro_rules! mask_ops {
    ($($op:ident::$method:ident, $assign:ident::$assign_method:ident => $f:ident;)*) => {$(
        impl<T: Vectorizable, A: AbiTraits<T>> $op for SimdMask<T, A> {
            type Output = Self;

            #[inline(always)]
            fn $method(self, rhs: Self) -> Self {
                Self::from_member(<Impl<T, A> as MaskImpl<T>>::$f(self.data, rhs.data))
            }
        }

        impl<T: Vectorizable, A: AbiTraits<T>> $op<bool> for SimdMask<T, A> {
            type Output = Self;

            #[inline(always)]
            fn $method(self, rhs: bool) -> Self {
                <Self as $op>::$method(self, Self::splat(rhs))
            }
        }

        impl<T: Vectorizable, A: AbiTraits<T>> $assign for SimdMask<T, A> {
            #[inline(always)]
            fn $assign_method(&mut self, rhs: Self) {
                *self = <Self as $op>::$method(*self, rhs);
            }
        }
    )*};
}

mask_ops! {
    BitAnd::bitand, BitAndAssign::bitand_assign => mask_and;
    BitOr::bitor, BitOrAssign::bitor_assign => mask_or;
    BitXor::bitxor, BitXorAssign::bitxor_assign => mask_xor;
}

impl<T: Vectorizable, A: AbiTraits<T>> Not for SimdMask<T, A> {
    type Output = Self;

    #[inline(always)]
    fn not(self) -> Self {
        Self::from_member(<Impl<T, A> as MaskImpl<T>>::mask_not(self.data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simd::simd::{FixedSizeSimd, NativeSimd};

    #[test]
    fn test_bitset_round_trip_ignores_high_bits() {
        let k = FixedSizeSimdMask::<u16, 5>::from_bitset(u64::MAX);
        assert_eq!(k.to_bitset(), 0b11111);
        assert_eq!(NativeSimdMask::<f32>::splat(true).to_bitset().count_ones() as usize, NativeSimdMask::<f32>::LANES);
    }

    #[test]
    fn test_logic_operators() {
        let a = FixedSizeSimdMask::<i32, 4>::from_array([true, true, false, false]);
        let b = FixedSizeSimdMask::<i32, 4>::from_array([true, false, true, false]);

        assert_eq!((a & b).to_vec(), vec![true, false, false, false]);
        assert_eq!((a | b).to_vec(), vec![true, true, true, false]);
        assert_eq!((a ^ b).to_vec(), vec![false, true, true, false]);
        assert_eq!((!a).to_bitset(), 0b1100);
        assert_eq!(a.and(b), a & b);
        assert_eq!((a | true).to_bitset(), 0b1111);
    }

    #[test]
    fn test_get_set() {
        let mut k = NativeSimdMask::<i8>::default();
        k.set(NativeSimdMask::<i8>::LANES - 1, true);
        assert!(k.get(NativeSimdMask::<i8>::LANES - 1));
        assert!(!k.get(0));
        k.set(NativeSimdMask::<i8>::LANES - 1, false);
        assert_eq!(k, NativeSimdMask::<i8>::splat(false));
    }

    #[test]
    fn test_comparison_masks_cast_between_elements() {
        let x = FixedSizeSimd::<f64, 6>::from_fn(|i| i as f64);
        let k = x.simd_ge(3.0.into());
        let widened = k.cast::<u8>();
        assert_eq!(widened.to_bitset(), 0b111000);

        let y = NativeSimd::<u32>::from_fn(|i| i as u32);
        let native = y.simd_lt(2.into());
        assert_eq!(native.cast::<f32>().to_bitset(), native.to_bitset());
        assert!(native.get(0));
    }
}
