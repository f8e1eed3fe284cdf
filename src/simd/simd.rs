//! The data-parallel vector type.
//!
//! `Simd<T, A>` holds [`A::LANES`](AbiTraits::LANES) elements of `T` in the
//! member representation chosen by the ABI tag `A`. Every operation forwards
//! to the tag's implementation type, so the generated code is exactly the one
//! of the lowering selected at compile time.
//!
//! Arithmetic follows the element's scalar semantics lane by lane: integers
//! wrap, integer division and remainder by zero yield zero on every ABI, floats
//! follow IEEE-754.

use std::fmt;
use std::ops::{
    Add, AddAssign, BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Div,
    DivAssign, Mul, MulAssign, Neg, Not, Rem, RemAssign, Shl, ShlAssign, Shr, ShrAssign, Sub,
    SubAssign,
};

use crate::error::{length_mismatch, Result};
use crate::simd::abi::{AbiTraits, CompatibleAbi, FixedSize, NativeAbi, Scalar, SimdMember, MAX_LANES};
use crate::simd::converter::convert;
use crate::simd::element::{SimdInteger, Vectorizable};
use crate::simd::flags::{assert_aligned, check_aligned, use_aligned, ElementAligned, LoadStoreFlag};
use crate::simd::mask::SimdMask;
use crate::simd::traits::{MaskImpl, SimdImpl, SimdIntImpl};

type Impl<T, A> = <A as AbiTraits<T>>::Impl;

/// A vector of `A::LANES` elements of type `T`.
///
/// ```rust
/// use simdabi::simd::{FixedSizeSimd, ElementAligned};
///
/// let a = FixedSizeSimd::<i32, 4>::from_slice(&[1, 2, 3, 4], ElementAligned);
/// let b = a * 10 + 1;
/// assert_eq!(b.to_vec(), vec![11, 21, 31, 41]);
/// ```
#[repr(transparent)]
pub struct Simd<T: Vectorizable, A: AbiTraits<T> = NativeAbi<T>> {
    data: SimdMember<T, A>,
}

/// The widest vector the target supports for `T`.
pub type NativeSimd<T> = Simd<T, NativeAbi<T>>;

/// A vector of exactly `N` lanes.
pub type FixedSizeSimd<T, const N: usize> = Simd<T, FixedSize<N>>;

/// A one-lane vector.
pub type ScalarSimd<T> = Simd<T, Scalar>;

/// The vector whose layout is stable across the target's instruction sets.
pub type CompatibleSimd<T> = Simd<T, CompatibleAbi<T>>;

impl<T: Vectorizable, A: AbiTraits<T>> Clone for Simd<T, A> {
    #[inline(always)]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Vectorizable, A: AbiTraits<T>> Copy for Simd<T, A> {}

impl<T: Vectorizable, A: AbiTraits<T>> Simd<T, A> {
    /// Number of lanes.
    pub const LANES: usize = A::LANES;

    #[inline(always)]
    pub(crate) fn from_member(data: SimdMember<T, A>) -> Self {
        Self { data }
    }

    #[inline(always)]
    pub(crate) fn member(self) -> SimdMember<T, A> {
        self.data
    }

    #[inline(always)]
    pub const fn lanes() -> usize {
        Self::LANES
    }

    /// Every lane set to `value`.
    #[inline(always)]
    pub fn splat(value: T) -> Self {
        Self::from_member(<Impl<T, A> as SimdImpl<T>>::broadcast(value))
    }

    /// Lane `i` set to `generator(i)`, called in lane order.
    #[inline]
    pub fn from_fn<F: FnMut(usize) -> T>(generator: F) -> Self {
        Self::from_member(<Impl<T, A> as SimdImpl<T>>::generate(generator))
    }

    /// Builds a vector from exactly `LANES` elements. A length mismatch fails
    /// to compile.
    #[inline]
    pub fn from_array<const M: usize>(lanes: [T; M]) -> Self {
        const { assert!(M == <A as AbiTraits<T>>::LANES, "array length differs from the lane count") };
        // SAFETY: the array holds LANES elements.
        Self::from_member(unsafe { <Impl<T, A> as SimdImpl<T>>::load(lanes.as_ptr(), false) })
    }

    /// Loads the first `LANES` elements of `slice`.
    ///
    /// # Panics
    ///
    /// When `slice` is shorter than `LANES`. A pointer that breaks the
    /// alignment promise of `flag` aborts the process when alignment checks
    /// are enabled.
    #[inline]
    #[track_caller]
    pub fn from_slice<F: LoadStoreFlag>(slice: &[T], flag: F) -> Self {
        let mut value = Self::splat(T::ZERO);
        value.copy_from(slice, flag);
        value
    }

    /// Loads the first `LANES` elements of `slice`, reporting a short slice or
    /// a broken alignment promise as an error.
    pub fn try_from_slice<F: LoadStoreFlag>(slice: &[T], _flag: F) -> Result<Self> {
        if slice.len() < Self::LANES {
            return Err(length_mismatch(Self::LANES, slice.len()));
        }
        check_aligned::<T, A, F>(slice.as_ptr())?;

        let aligned = use_aligned::<T, A, F>(slice.as_ptr());
        // SAFETY: length and alignment checked above.
        Ok(Self::from_member(unsafe { <Impl<T, A> as SimdImpl<T>>::load(slice.as_ptr(), aligned) }))
    }

    /// Replaces every lane with the first `LANES` elements of `slice`.
    #[inline]
    #[track_caller]
    pub fn copy_from<F: LoadStoreFlag>(&mut self, slice: &[T], _flag: F) {
        assert!(
            slice.len() >= Self::LANES,
            "copy_from needs {} elements, the slice has {}",
            Self::LANES,
            slice.len()
        );
        assert_aligned::<T, A, F>(slice.as_ptr());

        let aligned = use_aligned::<T, A, F>(slice.as_ptr());
        // SAFETY: the slice covers LANES elements; the aligned form is only
        // used for a pointer that is actually aligned.
        self.data = unsafe { <Impl<T, A> as SimdImpl<T>>::load(slice.as_ptr(), aligned) };
    }

    /// Writes every lane to the first `LANES` elements of `slice`.
    ///
    /// # Panics
    ///
    /// When `slice` is shorter than `LANES`.
    #[inline]
    #[track_caller]
    pub fn copy_to<F: LoadStoreFlag>(self, slice: &mut [T], _flag: F) {
        assert!(
            slice.len() >= Self::LANES,
            "copy_to needs {} elements, the slice has {}",
            Self::LANES,
            slice.len()
        );
        assert_aligned::<T, A, F>(slice.as_ptr());

        let aligned = use_aligned::<T, A, F>(slice.as_ptr());
        // SAFETY: as in `copy_from`.
        unsafe { <Impl<T, A> as SimdImpl<T>>::store(self.data, slice.as_mut_ptr(), aligned) };
    }

    pub fn try_copy_to<F: LoadStoreFlag>(self, slice: &mut [T], _flag: F) -> Result<()> {
        if slice.len() < Self::LANES {
            return Err(length_mismatch(Self::LANES, slice.len()));
        }
        check_aligned::<T, A, F>(slice.as_ptr())?;

        let aligned = use_aligned::<T, A, F>(slice.as_ptr());
        // SAFETY: length and alignment checked above.
        unsafe { <Impl<T, A> as SimdImpl<T>>::store(self.data, slice.as_mut_ptr(), aligned) };
        Ok(())
    }

    pub fn to_vec(self) -> Vec<T> {
        let mut out = vec![T::ZERO; Self::LANES];
        self.copy_to(&mut out, ElementAligned);
        out
    }

    /// Lane `i`.
    ///
    /// # Panics
    ///
    /// When `i >= LANES`.
    #[inline]
    #[track_caller]
    pub fn get(&self, i: usize) -> T {
        assert!(i < Self::LANES, "lane {i} out of range for {} lanes", Self::LANES);
        <Impl<T, A> as SimdImpl<T>>::get(self.data, i)
    }

    #[inline]
    #[track_caller]
    pub fn set(&mut self, i: usize, value: T) {
        assert!(i < Self::LANES, "lane {i} out of range for {} lanes", Self::LANES);
        <Impl<T, A> as SimdImpl<T>>::set(&mut self.data, i, value);
    }

    /// Adds one to every lane.
    #[inline(always)]
    pub fn increment(&mut self) {
        <Impl<T, A> as SimdImpl<T>>::increment(&mut self.data);
    }

    #[inline(always)]
    pub fn decrement(&mut self) {
        <Impl<T, A> as SimdImpl<T>>::decrement(&mut self.data);
    }

    /// Lanes equal to zero.
    #[inline(always)]
    pub fn is_zero(self) -> SimdMask<T, A> {
        SimdMask::from_member(<Impl<T, A> as SimdImpl<T>>::negate(self.data))
    }

    #[inline(always)]
    pub fn simd_eq(self, other: Self) -> SimdMask<T, A> {
        SimdMask::from_member(<Impl<T, A> as SimdImpl<T>>::eq(self.data, other.data))
    }

    #[inline(always)]
    pub fn simd_ne(self, other: Self) -> SimdMask<T, A> {
        SimdMask::from_member(<Impl<T, A> as SimdImpl<T>>::ne(self.data, other.data))
    }

    #[inline(always)]
    pub fn simd_lt(self, other: Self) -> SimdMask<T, A> {
        SimdMask::from_member(<Impl<T, A> as SimdImpl<T>>::lt(self.data, other.data))
    }

    #[inline(always)]
    pub fn simd_le(self, other: Self) -> SimdMask<T, A> {
        SimdMask::from_member(<Impl<T, A> as SimdImpl<T>>::le(self.data, other.data))
    }

    #[inline(always)]
    pub fn simd_gt(self, other: Self) -> SimdMask<T, A> {
        other.simd_lt(self)
    }

    #[inline(always)]
    pub fn simd_ge(self, other: Self) -> SimdMask<T, A> {
        other.simd_le(self)
    }

    /// `if_true` where `mask` is set, `if_false` elsewhere.
    #[inline(always)]
    pub fn select(mask: SimdMask<T, A>, if_true: Self, if_false: Self) -> Self {
        Self::from_member(<Impl<T, A> as SimdImpl<T>>::blend(
            mask.member(),
            if_false.data,
            if_true.data,
        ))
    }

    /// Lane-wise conversion to `U` with the same ABI tag, using `as`
    /// semantics.
    #[inline]
    pub fn cast<U: Vectorizable>(self) -> Simd<U, A>
    where
        A: AbiTraits<U>,
    {
        static_simd_cast(self)
    }

    /// The same lanes as a `FixedSize<N>` vector; `N` must equal `LANES`.
    #[inline]
    pub fn to_fixed_size<const N: usize>(self) -> Simd<T, FixedSize<N>> {
        const { assert!(N == <A as AbiTraits<T>>::LANES, "lane counts differ") };
        static_simd_cast(self)
    }

    /// The same lanes in the native ABI; the native lane count must equal
    /// `LANES`.
    #[inline]
    pub fn to_native(self) -> NativeSimd<T> {
        static_simd_cast(self)
    }

    #[inline]
    pub fn to_compatible(self) -> CompatibleSimd<T> {
        static_simd_cast(self)
    }

    /// Splits into `K` consecutive vectors of ABI `B`.
    ///
    /// ```rust
    /// use simdabi::simd::{FixedSizeSimd, FixedSize};
    ///
    /// let x = FixedSizeSimd::<u16, 6>::from_fn(|i| i as u16);
    /// let [lo, hi] = x.split::<FixedSize<3>, 2>();
    /// assert_eq!(hi.to_vec(), vec![3, 4, 5]);
    /// assert_eq!(FixedSizeSimd::<u16, 6>::concat([lo, hi]), x);
    /// ```
    pub fn split<B: AbiTraits<T>, const K: usize>(self) -> [Simd<T, B>; K] {
        const {
            assert!(
                K * <B as AbiTraits<T>>::LANES == <A as AbiTraits<T>>::LANES,
                "split parts do not cover the vector"
            )
        };
        let mut lanes = [T::ZERO; MAX_LANES];
        self.copy_to(&mut lanes, ElementAligned);
        std::array::from_fn(|j| Simd::<T, B>::from_slice(&lanes[j * Simd::<T, B>::LANES..], ElementAligned))
    }

    /// Concatenates `K` vectors of ABI `B` in order.
    pub fn concat<B: AbiTraits<T>, const K: usize>(parts: [Simd<T, B>; K]) -> Self {
        const {
            assert!(
                K * <B as AbiTraits<T>>::LANES == <A as AbiTraits<T>>::LANES,
                "concatenated parts do not fill the vector"
            )
        };
        let mut lanes = [T::ZERO; MAX_LANES];
        for (j, part) in parts.into_iter().enumerate() {
            part.copy_to(&mut lanes[j * Simd::<T, B>::LANES..], ElementAligned);
        }
        Self::from_slice(&lanes, ElementAligned)
    }
}

/// Converts between any two vectors with the same lane count, lane by lane
/// with `as` semantics. Narrowing is allowed.
#[inline]
pub fn static_simd_cast<U, B, T, A>(x: Simd<T, A>) -> Simd<U, B>
where
    T: Vectorizable,
    A: AbiTraits<T>,
    U: Vectorizable,
    B: AbiTraits<U>,
{
    Simd::from_member(convert::<T, A, U, B>(x.data))
}

/// Converts between vectors with the same lane count when every value of `T`
/// is representable in `U`.
#[inline]
pub fn simd_cast<U, B, T, A>(x: Simd<T, A>) -> Simd<U, B>
where
    T: LosslessInto<U>,
    A: AbiTraits<T>,
    U: Vectorizable,
    B: AbiTraits<U>,
{
    static_simd_cast(x)
}

/// Element conversions that preserve every value.
///
/// Fixed-size vectors convert implicitly (`From`/`Into`) along these pairs
/// only, so narrowing needs [`static_simd_cast`]:
///
/// ```compile_fail
/// use simdabi::simd::FixedSizeSimd;
///
/// let wide = FixedSizeSimd::<i32, 4>::splat(70_000);
/// let narrow: FixedSizeSimd<i16, 4> = wide.into();
/// ```
///
/// ```rust
/// use simdabi::simd::{static_simd_cast, FixedSize, FixedSizeSimd};
///
/// let small = FixedSizeSimd::<i16, 4>::splat(-3);
/// let wide: FixedSizeSimd<i32, 4> = small.into();
/// let back = static_simd_cast::<i16, FixedSize<4>, _, _>(wide);
/// assert_eq!(back, small);
/// ```
pub trait LosslessInto<U: Vectorizable>: Vectorizable {}

macro_rules! lossless {
    ($($from:ty => [$($to:ty),*];)*) => {$($(
        impl LosslessInto<$to> for $from {}
    )*)*};
}

lossless! {
    i8 => [i8, i16, i32, i64, f32, f64];
    u8 => [u8, u16, u32, u64, i16, i32, i64, f32, f64];
    i16 => [i16, i32, i64, f32, f64];
    u16 => [u16, u32, u64, i32, i64, f32, f64];
    i32 => [i32, i64, f64];
    u32 => [u32, u64, i64, f64];
    i64 => [i64];
    u64 => [u64];
    f32 => [f32, f64];
    f64 => [f64];
}

macro_rules! implicit_from {
    ($($from:ty => [$($to:ty),*];)*) => {$($(
        impl<const N: usize> From<Simd<$from, FixedSize<N>>> for Simd<$to, FixedSize<N>> {
            #[inline]
            fn from(x: Simd<$from, FixedSize<N>>) -> Self {
                static_simd_cast(x)
            }
        }
    )*)*};
}

implicit_from! {
    i8 => [i16, i32, i64, f32, f64];
    u8 => [u16, u32, u64, i16, i32, i64, f32, f64];
    i16 => [i32, i64, f32, f64];
    u16 => [u32, u64, i32, i64, f32, f64];
    i32 => [i64, f64];
    u32 => [u64, i64, f64];
    f32 => [f64];
}

impl<T: Vectorizable, A: AbiTraits<T>> Default for Simd<T, A> {
    #[inline]
    fn default() -> Self {
        Self::splat(T::ZERO)
    }
}

impl<T: Vectorizable, A: AbiTraits<T>> From<T> for Simd<T, A> {
    #[inline(always)]
    fn from(value: T) -> Self {
        Self::splat(value)
    }
}

/// Equal when every lane compares equal.
impl<T: Vectorizable, A: AbiTraits<T>> PartialEq for Simd<T, A> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        <Impl<T, A> as MaskImpl<T>>::mask_all(<Impl<T, A> as SimdImpl<T>>::eq(self.data, other.data))
    }
}

impl<T: Vectorizable, A: AbiTraits<T>> fmt::Debug for Simd<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Simd<{}>", A::NAME)?;
        f.debug_list()
            .entries((0..Self::LANES).map(|i| self.get(i)))
            .finish()
    }
}

impl<T: Vectorizable, A: AbiTraits<T>> Neg for Simd<T, A> {
    type Output = Self;

    #[inline(always)]
    fn neg(self) -> Self {
        Self::from_member(<Impl<T, A> as SimdImpl<T>>::neg(self.data))
    }
}

// Each invocation names one element bound and one bound on the
// implementation type, shared by every operator it lists.
macro_rules! binary_ops {
    (
        [$bound:ident] where [$wbound:path];
        $($op:ident::$method:ident, $assign:ident::$assign_method:ident => $imp:ident::$f:ident;)*
    ) => {$(
        impl<T: $bound, A: AbiTraits<T>> $op for Simd<T, A>
        where
            Impl<T, A>: $wbound,
        {
            type Output = Self;

            #[inline(always)]
            fn $method(self, rhs: Self) -> Self {
                Self::from_member(<Impl<T, A> as $imp<T>>::$f(self.data, rhs.data))
            }
        }

        impl<T: $bound, A: AbiTraits<T>> $op<T> for Simd<T, A>
        where
            Impl<T, A>: $wbound,
        {
            type Output = Self;

            #[inline(always)]
            fn $method(self, rhs: T) -> Self {
                <Self as $op>::$method(self, Self::splat(rhs))
            }
        }

        impl<T: $bound, A: AbiTraits<T>> $assign for Simd<T, A>
        where
            Impl<T, A>: $wbound,
        {
            #[inline(always)]
            fn $assign_method(&mut self, rhs: Self) {
                *self = <Self as $op>::$method(*self, rhs);
            }
        }

        impl<T: $bound, A: AbiTraits<T>> $assign<T> for Simd<T, A>
        where
            Impl<T, A>: $wbound,
        {
            #[inline(always)]
            fn $assign_method(&mut self, rhs: T) {
                *self = <Self as $op>::$method(*self, Self::splat(rhs));
            }
        }
    )*};
}

binary_ops! {
    [Vectorizable] where [SimdImpl<T>];
    Add::add, AddAssign::add_assign => SimdImpl::add;
    Sub::sub, SubAssign::sub_assign => SimdImpl::sub;
    Mul::mul, MulAssign::mul_assign => SimdImpl::mul;
    Div::div, DivAssign::div_assign => SimdImpl::div;
}

binary_ops! {
    [SimdInteger] where [SimdImpl<T>];
    BitAnd::bitand, BitAndAssign::bitand_assign => SimdImpl::bit_and;
    BitOr::bitor, BitOrAssign::bitor_assign => SimdImpl::bit_or;
    BitXor::bitxor, BitXorAssign::bitxor_assign => SimdImpl::bit_xor;
}

binary_ops! {
    [SimdInteger] where [SimdIntImpl<T>];
    Rem::rem, RemAssign::rem_assign => SimdIntImpl::rem;
}

impl<T: SimdInteger, A: AbiTraits<T>> Not for Simd<T, A> {
    type Output = Self;

    #[inline(always)]
    fn not(self) -> Self {
        Self::from_member(<Impl<T, A> as SimdImpl<T>>::bit_not(self.data))
    }
}

// Shifts take per-lane counts from a vector or one count for all lanes.
// Counts at or beyond the lane width shift everything out.
macro_rules! shift_ops {
    ($($op:ident::$method:ident, $assign:ident::$assign_method:ident => $f:ident, $scalar:ident;)*) => {$(
        impl<T: SimdInteger, A: AbiTraits<T>> $op for Simd<T, A>
        where
            Impl<T, A>: SimdIntImpl<T>,
        {
            type Output = Self;

            #[inline(always)]
            fn $method(self, rhs: Self) -> Self {
                Self::from_member(<Impl<T, A> as SimdIntImpl<T>>::$f(self.data, rhs.data))
            }
        }

        impl<T: SimdInteger, A: AbiTraits<T>> $op<u32> for Simd<T, A>
        where
            Impl<T, A>: SimdIntImpl<T>,
        {
            type Output = Self;

            #[inline(always)]
            fn $method(self, count: u32) -> Self {
                Self::from_member(<Impl<T, A> as SimdIntImpl<T>>::$scalar(self.data, count))
            }
        }

        impl<T: SimdInteger, A: AbiTraits<T>> $assign for Simd<T, A>
        where
            Impl<T, A>: SimdIntImpl<T>,
        {
            #[inline(always)]
            fn $assign_method(&mut self, rhs: Self) {
                *self = <Self as $op>::$method(*self, rhs);
            }
        }

        impl<T: SimdInteger, A: AbiTraits<T>> $assign<u32> for Simd<T, A>
        where
            Impl<T, A>: SimdIntImpl<T>,
        {
            #[inline(always)]
            fn $assign_method(&mut self, count: u32) {
                *self = <Self as $op<u32>>::$method(*self, count);
            }
        }
    )*};
}

shift_ops! {
    Shl::shl, ShlAssign::shl_assign => shl, shl_scalar;
    Shr::shr, ShrAssign::shr_assign => shr, shr_scalar;
}

// `2.0 * x` and friends.
macro_rules! scalar_lhs_ops {
    ($($t:ty),*) => {$(
        impl<A: AbiTraits<$t>> Add<Simd<$t, A>> for $t {
            type Output = Simd<$t, A>;

            #[inline(always)]
            fn add(self, rhs: Simd<$t, A>) -> Simd<$t, A> {
                Simd::splat(self) + rhs
            }
        }

        impl<A: AbiTraits<$t>> Sub<Simd<$t, A>> for $t {
            type Output = Simd<$t, A>;

            #[inline(always)]
            fn sub(self, rhs: Simd<$t, A>) -> Simd<$t, A> {
                Simd::splat(self) - rhs
            }
        }

        impl<A: AbiTraits<$t>> Mul<Simd<$t, A>> for $t {
            type Output = Simd<$t, A>;

            #[inline(always)]
            fn mul(self, rhs: Simd<$t, A>) -> Simd<$t, A> {
                Simd::splat(self) * rhs
            }
        }

        impl<A: AbiTraits<$t>> Div<Simd<$t, A>> for $t {
            type Output = Simd<$t, A>;

            #[inline(always)]
            fn div(self, rhs: Simd<$t, A>) -> Simd<$t, A> {
                Simd::splat(self) / rhs
            }
        }
    )*};
}

scalar_lhs_ops!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simd::abi::FixedSize;
    use crate::simd::flags::VectorAligned;
    use crate::utils::AlignedBuffer;

    mod construction_tests {
        use super::*;

        #[test]
        fn test_splat_and_from_fn() {
            let x = NativeSimd::<i16>::splat(-3);
            assert!((0..NativeSimd::<i16>::LANES).all(|i| x.get(i) == -3));

            let y = FixedSizeSimd::<u8, 7>::from_fn(|i| (i * 2) as u8);
            assert_eq!(y.to_vec(), vec![0, 2, 4, 6, 8, 10, 12]);
        }

        #[test]
        fn test_from_array_matches_lanes() {
            let x = FixedSizeSimd::<f64, 3>::from_array([1.5, -2.0, 4.0]);
            assert_eq!(x.get(1), -2.0);
            assert_eq!(ScalarSimd::<i64>::from_array([9]).get(0), 9);
        }

        #[test]
        fn test_try_from_slice_reports_short_input() {
            let data = [1.0f32; 2];
            let err = FixedSizeSimd::<f32, 4>::try_from_slice(&data, ElementAligned).unwrap_err();
            assert_eq!(err, length_mismatch(4, 2));
        }

        #[test]
        fn test_vector_aligned_round_trip() {
            let lanes = NativeSimd::<u32>::LANES;
            let align = crate::simd::abi::memory_alignment::<u32, NativeAbi<u32>>();
            let mut buffer = AlignedBuffer::<u32>::zeroed(lanes, align).unwrap();
            buffer.iter_mut().enumerate().for_each(|(i, x)| *x = i as u32 + 1);

            let x = NativeSimd::<u32>::from_slice(&buffer, VectorAligned);
            let mut out = AlignedBuffer::<u32>::zeroed(lanes, align).unwrap();
            (x * 2).copy_to(&mut out, VectorAligned);
            assert!(out.iter().enumerate().all(|(i, &v)| v == 2 * (i as u32 + 1)));
        }

        #[test]
        #[should_panic(expected = "lane 4 out of range")]
        fn test_get_out_of_range_panics() {
            FixedSizeSimd::<i32, 4>::splat(0).get(4);
        }
    }

    mod operator_tests {
        use super::*;

        #[test]
        fn test_arithmetic_matches_lanes() {
            let a = FixedSizeSimd::<i32, 5>::from_array([1, -2, 3, i32::MAX, 8]);
            let b = FixedSizeSimd::<i32, 5>::from_array([4, 5, -6, 1, 0]);

            assert_eq!((a + b).to_vec(), vec![5, 3, -3, i32::MIN, 8]);
            assert_eq!((a - b).to_vec(), vec![-3, -7, 9, i32::MAX - 1, 8]);
            assert_eq!((a * b).to_vec(), vec![4, -10, -18, i32::MAX, 0]);
            assert_eq!((a / b).to_vec(), vec![0, 0, 0, i32::MAX, 0]);
            assert_eq!((a % b).to_vec(), vec![1, -2, 3, 0, 0]);
            assert_eq!((-a).get(0), -1);
        }

        #[test]
        fn test_scalar_operands() {
            let x = NativeSimd::<f32>::from_fn(|i| i as f32);
            let y = 2.0 * x + 1.0;
            let z = 1.0 - x / 2.0;
            for i in 0..NativeSimd::<f32>::LANES {
                assert_eq!(y.get(i), 2.0 * i as f32 + 1.0);
                assert_eq!(z.get(i), 1.0 - i as f32 / 2.0);
            }
        }

        #[test]
        fn test_compound_assignment() {
            let mut x = FixedSizeSimd::<u16, 9>::splat(10);
            x += 5;
            x *= FixedSizeSimd::<u16, 9>::splat(2);
            x -= 1;
            x /= 3;
            x.increment();
            assert!(x == FixedSizeSimd::<u16, 9>::splat(10));
        }

        #[test]
        fn test_bitwise_and_shifts() {
            let x = NativeSimd::<u8>::splat(0b1010_1100);
            assert_eq!((x & 0x0f).get(0), 0b1100);
            assert_eq!((x | 0x01).get(0), 0b1010_1101);
            assert_eq!((x ^ 0xff).get(0), 0b0101_0011);
            assert_eq!((!x).get(0), 0b0101_0011);
            assert_eq!((x >> 4).get(0), 0b1010);
            assert_eq!((x << 8).get(0), 0);

            let counts = FixedSizeSimd::<i32, 4>::from_array([0, 1, 31, 40]);
            let y = FixedSizeSimd::<i32, 4>::splat(-8) >> counts;
            assert_eq!(y.to_vec(), vec![-8, -4, -1, -1]);
        }

        #[test]
        fn test_comparisons_and_select() {
            let a = FixedSizeSimd::<f32, 4>::from_array([1.0, f32::NAN, 3.0, -0.0]);
            let b = FixedSizeSimd::<f32, 4>::from_array([2.0, f32::NAN, 3.0, 0.0]);

            assert_eq!(a.simd_lt(b).to_bitset(), 0b0001);
            assert_eq!(a.simd_eq(b).to_bitset(), 0b1100);
            assert_eq!(a.simd_ne(b).to_bitset(), 0b0010 | 0b0001);
            assert_eq!(a.simd_ge(b).to_bitset(), 0b1100);

            let picked = Simd::select(a.simd_lt(b), a, b);
            assert_eq!(picked.get(0), 1.0);
            assert_eq!(picked.get(2), 3.0);
        }
    }

    mod conversion_tests {
        use super::*;

        #[test]
        fn test_lossless_from() {
            let x = FixedSizeSimd::<u8, 6>::from_fn(|i| 250 + i as u8);
            let y: FixedSizeSimd<i32, 6> = x.into();
            assert_eq!(y.to_vec(), vec![250, 251, 252, 253, 254, 255]);

            let f: FixedSizeSimd<f64, 6> = simd_cast(y);
            assert_eq!(f.get(5), 255.0);
        }

        #[test]
        fn test_narrowing_cast_wraps() {
            let x = FixedSizeSimd::<i32, 4>::from_array([70_000, -1, 32_767, -32_769]);
            let y: FixedSizeSimd<i16, 4> = static_simd_cast(x);
            assert_eq!(y.to_vec(), vec![4464, -1, 32_767, 32_767]);
        }

        #[test]
        fn test_native_round_trip_through_fixed_size() {
            let x = NativeSimd::<i16>::from_fn(|i| i as i16 - 4);
            let back: NativeSimd<i16> = static_simd_cast(static_simd_cast::<i16, FixedSize<{ NativeSimd::<i16>::LANES }>, _, _>(x));
            assert_eq!(back, x);
        }

        #[test]
        fn test_split_and_concat() {
            let x = FixedSizeSimd::<f32, 12>::from_fn(|i| i as f32);
            let parts = x.split::<FixedSize<4>, 3>();
            assert_eq!(parts[2].to_vec(), vec![8.0, 9.0, 10.0, 11.0]);
            assert_eq!(FixedSizeSimd::<f32, 12>::concat(parts), x);
        }
    }
}
