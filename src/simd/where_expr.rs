//! Masked assignment.
//!
//! `where_(&mask, &mut v)` pairs a mask with a vector (or a mask) and exposes
//! operations that only touch the lanes where the mask is set:
//!
//! ```rust
//! use simdabi::simd::{where_, FixedSizeSimd};
//!
//! let x = FixedSizeSimd::<i32, 4>::from_array([-2, 5, -7, 1]);
//! let mut y = x;
//! where_(&x.simd_lt(0.into()), &mut y).assign(0.into());
//! assert_eq!(y.to_vec(), vec![0, 5, 0, 1]);
//! ```
//!
//! The expression is consumed by the operation, so a where-expression can
//! never outlive the single update it was built for.

use crate::simd::abi::AbiTraits;
use crate::simd::element::{SimdInteger, Vectorizable};
use crate::simd::flags::{assert_aligned, LoadStoreFlag};
use crate::simd::mask::SimdMask;
use crate::simd::simd::Simd;
use crate::simd::traits::{MaskImpl, SimdImpl, SimdIntImpl};

type Impl<T, A> = <A as AbiTraits<T>>::Impl;

/// Values that can be the target of a where-expression.
pub trait Masked: Copy {
    type Mask: Copy;
}

impl<T: Vectorizable, A: AbiTraits<T>> Masked for Simd<T, A> {
    type Mask = SimdMask<T, A>;
}

impl<T: Vectorizable, A: AbiTraits<T>> Masked for SimdMask<T, A> {
    type Mask = SimdMask<T, A>;
}

/// A mutable target restricted to the lanes of a mask.
#[must_use = "a where-expression does nothing until one of its operations is called"]
pub struct WhereExpression<'a, V: Masked> {
    mask: &'a V::Mask,
    target: &'a mut V,
}

/// A read-only target restricted to the lanes of a mask.
#[must_use = "a where-expression does nothing until one of its operations is called"]
pub struct ConstWhereExpression<'a, V: Masked> {
    mask: &'a V::Mask,
    target: &'a V,
}

#[inline(always)]
pub fn where_<'a, V: Masked>(mask: &'a V::Mask, target: &'a mut V) -> WhereExpression<'a, V> {
    WhereExpression { mask, target }
}

#[inline(always)]
pub fn where_ref<'a, V: Masked>(mask: &'a V::Mask, target: &'a V) -> ConstWhereExpression<'a, V> {
    ConstWhereExpression { mask, target }
}

impl<'a, V: Masked> WhereExpression<'a, V> {
    pub fn mask(&self) -> V::Mask {
        *self.mask
    }

    pub fn value(&self) -> V {
        *self.target
    }
}

impl<'a, V: Masked> ConstWhereExpression<'a, V> {
    pub fn mask(&self) -> V::Mask {
        *self.mask
    }

    pub fn value(&self) -> V {
        *self.target
    }

    /// The whole target, unmasked.
    pub fn get(&self) -> &'a V {
        self.target
    }
}

/// Index one past the highest selected lane.
#[inline(always)]
fn selected_extent(bits: u64) -> usize {
    64 - bits.leading_zeros() as usize
}

impl<'a, T: Vectorizable, A: AbiTraits<T>> WhereExpression<'a, Simd<T, A>> {
    #[inline(always)]
    fn update<F>(self, rhs: Simd<T, A>, op: F)
    where
        F: FnOnce(
            <Impl<T, A> as SimdImpl<T>>::SimdMember,
            <Impl<T, A> as SimdImpl<T>>::SimdMember,
        ) -> <Impl<T, A> as SimdImpl<T>>::SimdMember,
    {
        let mut data = self.target.member();
        <Impl<T, A> as SimdImpl<T>>::masked_cassign(self.mask.member(), &mut data, rhs.member(), op);
        *self.target = Simd::from_member(data);
    }

    /// Selected lanes become the lanes of `value`.
    #[inline(always)]
    pub fn assign(self, value: Simd<T, A>) {
        let mut data = self.target.member();
        <Impl<T, A> as SimdImpl<T>>::masked_assign(self.mask.member(), &mut data, value.member());
        *self.target = Simd::from_member(data);
    }

    #[inline(always)]
    pub fn add_assign(self, rhs: Simd<T, A>) {
        self.update(rhs, <Impl<T, A> as SimdImpl<T>>::add);
    }

    #[inline(always)]
    pub fn sub_assign(self, rhs: Simd<T, A>) {
        self.update(rhs, <Impl<T, A> as SimdImpl<T>>::sub);
    }

    #[inline(always)]
    pub fn mul_assign(self, rhs: Simd<T, A>) {
        self.update(rhs, <Impl<T, A> as SimdImpl<T>>::mul);
    }

    /// Unselected lanes never see the division, so a zero divisor there is
    /// harmless.
    #[inline(always)]
    pub fn div_assign(self, rhs: Simd<T, A>) {
        self.update(rhs, <Impl<T, A> as SimdImpl<T>>::div);
    }

    #[inline(always)]
    pub fn increment(self) {
        let k = self.mask.member();
        let data = <Impl<T, A> as SimdImpl<T>>::masked_unary(k, self.target.member(), |mut v| {
            <Impl<T, A> as SimdImpl<T>>::increment(&mut v);
            v
        });
        *self.target = Simd::from_member(data);
    }

    #[inline(always)]
    pub fn decrement(self) {
        let k = self.mask.member();
        let data = <Impl<T, A> as SimdImpl<T>>::masked_unary(k, self.target.member(), |mut v| {
            <Impl<T, A> as SimdImpl<T>>::decrement(&mut v);
            v
        });
        *self.target = Simd::from_member(data);
    }

    /// Loads the selected lanes from `slice`; memory behind unselected lanes
    /// is never read.
    ///
    /// # Panics
    ///
    /// When `slice` ends before the highest selected lane.
    #[track_caller]
    pub fn copy_from<F: LoadStoreFlag>(self, slice: &[T], _flag: F) {
        let bits = self.mask.to_bitset();
        if bits == 0 {
            return;
        }
        let extent = selected_extent(bits);
        assert!(
            slice.len() >= extent,
            "masked copy_from reads {extent} elements, the slice has {}",
            slice.len()
        );
        assert_aligned::<T, A, F>(slice.as_ptr());

        // SAFETY: every selected lane lies inside `slice`.
        let data = unsafe {
            <Impl<T, A> as SimdImpl<T>>::masked_load(self.target.member(), self.mask.member(), slice.as_ptr())
        };
        *self.target = Simd::from_member(data);
    }
}

impl<'a, T: SimdInteger, A: AbiTraits<T>> WhereExpression<'a, Simd<T, A>> {
    #[inline(always)]
    pub fn bitand_assign(self, rhs: Simd<T, A>) {
        self.update(rhs, <Impl<T, A> as SimdImpl<T>>::bit_and);
    }

    #[inline(always)]
    pub fn bitor_assign(self, rhs: Simd<T, A>) {
        self.update(rhs, <Impl<T, A> as SimdImpl<T>>::bit_or);
    }

    #[inline(always)]
    pub fn bitxor_assign(self, rhs: Simd<T, A>) {
        self.update(rhs, <Impl<T, A> as SimdImpl<T>>::bit_xor);
    }
}

impl<'a, T: SimdInteger, A: AbiTraits<T>> WhereExpression<'a, Simd<T, A>>
where
    Impl<T, A>: SimdIntImpl<T>,
{
    #[inline(always)]
    pub fn rem_assign(self, rhs: Simd<T, A>) {
        self.update(rhs, <Impl<T, A> as SimdIntImpl<T>>::rem);
    }

    #[inline(always)]
    pub fn shl_assign(self, rhs: Simd<T, A>) {
        self.update(rhs, <Impl<T, A> as SimdIntImpl<T>>::shl);
    }

    #[inline(always)]
    pub fn shr_assign(self, rhs: Simd<T, A>) {
        self.update(rhs, <Impl<T, A> as SimdIntImpl<T>>::shr);
    }
}

impl<'a, T: Vectorizable, A: AbiTraits<T>> ConstWhereExpression<'a, Simd<T, A>> {
    /// Stores the selected lanes to `slice`; memory behind unselected lanes
    /// is left untouched.
    ///
    /// # Panics
    ///
    /// When `slice` ends before the highest selected lane.
    #[track_caller]
    pub fn copy_to<F: LoadStoreFlag>(self, slice: &mut [T], _flag: F) {
        let bits = self.mask.to_bitset();
        if bits == 0 {
            return;
        }
        let extent = selected_extent(bits);
        assert!(
            slice.len() >= extent,
            "masked copy_to writes {extent} elements, the slice has {}",
            slice.len()
        );
        assert_aligned::<T, A, F>(slice.as_ptr());

        // SAFETY: every selected lane lies inside `slice`.
        unsafe {
            <Impl<T, A> as SimdImpl<T>>::masked_store(
                self.target.member(),
                self.mask.member(),
                slice.as_mut_ptr(),
            )
        };
    }

    /// The value with its selected lanes negated.
    #[inline(always)]
    pub fn negated(self) -> Simd<T, A> {
        Simd::from_member(<Impl<T, A> as SimdImpl<T>>::masked_unary(
            self.mask.member(),
            self.target.member(),
            <Impl<T, A> as SimdImpl<T>>::neg,
        ))
    }
}

impl<'a, T: Vectorizable, A: AbiTraits<T>> WhereExpression<'a, SimdMask<T, A>> {
    /// Selected lanes become the lanes of `value`.
    #[inline(always)]
    pub fn assign(self, value: SimdMask<T, A>) {
        let mut data = self.target.member();
        <Impl<T, A> as MaskImpl<T>>::mask_masked_assign(self.mask.member(), &mut data, value.member());
        *self.target = SimdMask::from_member(data);
    }
}
