//! Operation sets every ABI implementation provides.
//!
//! An ABI tag resolves (see [`AbiTraits`](crate::simd::abi::AbiTraits)) to one
//! stateless impl type, which implements [`MaskImpl`] and [`SimdImpl`] for the
//! element types it supports, plus [`SimdIntImpl`] / [`SimdFloatImpl`] for the
//! integer and float specific operations. The front-end types only ever talk
//! to these traits.
//!
//! Members are passed by value: every member type is a register, a scalar or a
//! small array.

use crate::simd::element::{SimdFloat, SimdInteger, Vectorizable};
use crate::simd::storage::lane_bits;

/// Mask operations for masks associated with lanes of `T`.
pub trait MaskImpl<T: Vectorizable>: 'static {
    /// Number of lanes.
    const LANES: usize;

    type MaskMember: Copy;

    fn mask_broadcast(value: bool) -> Self::MaskMember;

    /// Lane `i` is set when bit `i` of `bits` is set; bits at or above
    /// `LANES` are ignored.
    fn mask_from_bitset(bits: u64) -> Self::MaskMember;

    /// Bit `i` reflects lane `i`; bits at or above `LANES` are zero.
    fn mask_to_bitset(mask: Self::MaskMember) -> u64;

    #[inline]
    fn mask_get(mask: Self::MaskMember, i: usize) -> bool {
        (Self::mask_to_bitset(mask) >> i) & 1 == 1
    }

    #[inline]
    fn mask_set(mask: &mut Self::MaskMember, i: usize, value: bool) {
        let bits = Self::mask_to_bitset(*mask);
        let bit = 1u64 << i;
        *mask = Self::mask_from_bitset(if value { bits | bit } else { bits & !bit });
    }

    #[inline]
    fn mask_and(a: Self::MaskMember, b: Self::MaskMember) -> Self::MaskMember {
        Self::mask_from_bitset(Self::mask_to_bitset(a) & Self::mask_to_bitset(b))
    }

    #[inline]
    fn mask_or(a: Self::MaskMember, b: Self::MaskMember) -> Self::MaskMember {
        Self::mask_from_bitset(Self::mask_to_bitset(a) | Self::mask_to_bitset(b))
    }

    #[inline]
    fn mask_xor(a: Self::MaskMember, b: Self::MaskMember) -> Self::MaskMember {
        Self::mask_from_bitset(Self::mask_to_bitset(a) ^ Self::mask_to_bitset(b))
    }

    #[inline]
    fn mask_not(a: Self::MaskMember) -> Self::MaskMember {
        Self::mask_from_bitset(!Self::mask_to_bitset(a))
    }

    /// `lhs[i] = rhs[i]` where `k[i]`.
    #[inline]
    fn mask_masked_assign(k: Self::MaskMember, lhs: &mut Self::MaskMember, rhs: Self::MaskMember) {
        let k = Self::mask_to_bitset(k);
        let bits = (Self::mask_to_bitset(*lhs) & !k) | (Self::mask_to_bitset(rhs) & k);
        *lhs = Self::mask_from_bitset(bits);
    }

    #[inline]
    fn mask_eq(a: Self::MaskMember, b: Self::MaskMember) -> bool {
        Self::mask_to_bitset(a) == Self::mask_to_bitset(b)
    }

    #[inline]
    fn mask_all(mask: Self::MaskMember) -> bool {
        Self::mask_to_bitset(mask) == lane_bits(Self::LANES)
    }

    #[inline]
    fn mask_any(mask: Self::MaskMember) -> bool {
        Self::mask_to_bitset(mask) != 0
    }

    #[inline]
    fn mask_none(mask: Self::MaskMember) -> bool {
        Self::mask_to_bitset(mask) == 0
    }

    /// At least one lane set and at least one lane clear.
    #[inline]
    fn mask_some(mask: Self::MaskMember) -> bool {
        let bits = Self::mask_to_bitset(mask);
        bits != 0 && bits != lane_bits(Self::LANES)
    }

    #[inline]
    fn mask_popcount(mask: Self::MaskMember) -> usize {
        Self::mask_to_bitset(mask).count_ones() as usize
    }

    /// Index of the lowest set lane. The mask must not be empty.
    #[inline]
    fn mask_find_first_set(mask: Self::MaskMember) -> usize {
        let bits = Self::mask_to_bitset(mask);
        debug_assert!(bits != 0, "find_first_set on an empty mask");
        bits.trailing_zeros() as usize
    }

    /// Index of the highest set lane. The mask must not be empty.
    #[inline]
    fn mask_find_last_set(mask: Self::MaskMember) -> usize {
        let bits = Self::mask_to_bitset(mask);
        debug_assert!(bits != 0, "find_last_set on an empty mask");
        63 - bits.leading_zeros() as usize
    }
}

/// Value operations common to every element type.
pub trait SimdImpl<T: Vectorizable>: MaskImpl<T> {
    type SimdMember: Copy;

    /// Reads `LANES` elements.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for reading `LANES` elements, and aligned to the
    /// ABI's memory alignment when `aligned` is true.
    unsafe fn load(ptr: *const T, aligned: bool) -> Self::SimdMember;

    /// Writes `LANES` elements.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for writing `LANES` elements, and aligned to the
    /// ABI's memory alignment when `aligned` is true.
    unsafe fn store(value: Self::SimdMember, ptr: *mut T, aligned: bool);

    /// Lanes where `k` is set come from memory, the rest from `merge`. Memory
    /// of unselected lanes is never read.
    ///
    /// # Safety
    ///
    /// `ptr.add(i)` must be valid for reads for every selected lane `i`.
    unsafe fn masked_load(
        merge: Self::SimdMember,
        k: Self::MaskMember,
        ptr: *const T,
    ) -> Self::SimdMember {
        let mut out = merge;
        let bits = Self::mask_to_bitset(k);
        for i in 0..Self::LANES {
            if (bits >> i) & 1 == 1 {
                Self::set(&mut out, i, ptr.add(i).read_unaligned());
            }
        }
        out
    }

    /// Writes the lanes where `k` is set. Memory of unselected lanes is never
    /// touched.
    ///
    /// # Safety
    ///
    /// `ptr.add(i)` must be valid for writes for every selected lane `i`.
    unsafe fn masked_store(value: Self::SimdMember, k: Self::MaskMember, ptr: *mut T) {
        let bits = Self::mask_to_bitset(k);
        for i in 0..Self::LANES {
            if (bits >> i) & 1 == 1 {
                ptr.add(i).write_unaligned(Self::get(value, i));
            }
        }
    }

    fn broadcast(value: T) -> Self::SimdMember;

    /// Lane `i` is `generator(i)`.
    fn generate<F: FnMut(usize) -> T>(generator: F) -> Self::SimdMember;

    fn get(value: Self::SimdMember, i: usize) -> T;
    fn set(value: &mut Self::SimdMember, i: usize, lane: T);

    fn add(a: Self::SimdMember, b: Self::SimdMember) -> Self::SimdMember;
    fn sub(a: Self::SimdMember, b: Self::SimdMember) -> Self::SimdMember;
    fn mul(a: Self::SimdMember, b: Self::SimdMember) -> Self::SimdMember;
    fn div(a: Self::SimdMember, b: Self::SimdMember) -> Self::SimdMember;
    fn neg(a: Self::SimdMember) -> Self::SimdMember;

    fn bit_and(a: Self::SimdMember, b: Self::SimdMember) -> Self::SimdMember;
    fn bit_or(a: Self::SimdMember, b: Self::SimdMember) -> Self::SimdMember;
    fn bit_xor(a: Self::SimdMember, b: Self::SimdMember) -> Self::SimdMember;
    fn bit_not(a: Self::SimdMember) -> Self::SimdMember;

    fn eq(a: Self::SimdMember, b: Self::SimdMember) -> Self::MaskMember;
    fn lt(a: Self::SimdMember, b: Self::SimdMember) -> Self::MaskMember;
    fn le(a: Self::SimdMember, b: Self::SimdMember) -> Self::MaskMember;

    #[inline]
    fn ne(a: Self::SimdMember, b: Self::SimdMember) -> Self::MaskMember {
        Self::mask_not(Self::eq(a, b))
    }

    fn min(a: Self::SimdMember, b: Self::SimdMember) -> Self::SimdMember;
    fn max(a: Self::SimdMember, b: Self::SimdMember) -> Self::SimdMember;

    #[inline]
    fn minmax(a: Self::SimdMember, b: Self::SimdMember) -> (Self::SimdMember, Self::SimdMember) {
        (Self::min(a, b), Self::max(a, b))
    }

    fn abs(a: Self::SimdMember) -> Self::SimdMember;

    /// `b` where `k` is set, `a` elsewhere.
    fn blend(k: Self::MaskMember, a: Self::SimdMember, b: Self::SimdMember) -> Self::SimdMember;

    /// Folds all lanes with `Op`.
    fn reduce<Op: ReduceOp<T>>(value: Self::SimdMember) -> T;

    #[inline]
    fn increment(value: &mut Self::SimdMember) {
        *value = Self::add(*value, Self::broadcast(T::ONE));
    }

    #[inline]
    fn decrement(value: &mut Self::SimdMember) {
        *value = Self::sub(*value, Self::broadcast(T::ONE));
    }

    /// Lanes equal to zero.
    #[inline]
    fn negate(value: Self::SimdMember) -> Self::MaskMember {
        Self::eq(value, Self::broadcast(T::ZERO))
    }

    /// `lhs[i] = rhs[i]` where `k[i]`.
    #[inline]
    fn masked_assign(k: Self::MaskMember, lhs: &mut Self::SimdMember, rhs: Self::SimdMember) {
        *lhs = Self::blend(k, *lhs, rhs);
    }

    /// `lhs[i] = op(lhs, rhs)[i]` where `k[i]`.
    #[inline]
    fn masked_cassign<F>(k: Self::MaskMember, lhs: &mut Self::SimdMember, rhs: Self::SimdMember, op: F)
    where
        F: FnOnce(Self::SimdMember, Self::SimdMember) -> Self::SimdMember,
    {
        *lhs = Self::blend(k, *lhs, op(*lhs, rhs));
    }

    /// `op(value)` where `k`, `value` elsewhere.
    #[inline]
    fn masked_unary<F>(k: Self::MaskMember, value: Self::SimdMember, op: F) -> Self::SimdMember
    where
        F: FnOnce(Self::SimdMember) -> Self::SimdMember,
    {
        Self::blend(k, value, op(value))
    }
}

/// Integer-only operations.
pub trait SimdIntImpl<T: SimdInteger>: SimdImpl<T> {
    fn rem(a: Self::SimdMember, b: Self::SimdMember) -> Self::SimdMember;

    /// Per-lane shift counts taken from `b`.
    fn shl(a: Self::SimdMember, b: Self::SimdMember) -> Self::SimdMember;
    fn shr(a: Self::SimdMember, b: Self::SimdMember) -> Self::SimdMember;

    fn shl_scalar(a: Self::SimdMember, count: u32) -> Self::SimdMember;
    fn shr_scalar(a: Self::SimdMember, count: u32) -> Self::SimdMember;
}

/// Float-only operations.
pub trait SimdFloatImpl<T: SimdFloat>: SimdImpl<T> {
    fn sqrt(a: Self::SimdMember) -> Self::SimdMember;
    fn floor(a: Self::SimdMember) -> Self::SimdMember;
    fn ceil(a: Self::SimdMember) -> Self::SimdMember;
    fn trunc(a: Self::SimdMember) -> Self::SimdMember;

    /// Rounds half away from zero.
    fn round(a: Self::SimdMember) -> Self::SimdMember;

    fn logb(a: Self::SimdMember) -> Self::SimdMember;

    /// Mantissa and exponent; the exponent lanes hold integral float values.
    fn frexp(a: Self::SimdMember) -> (Self::SimdMember, Self::SimdMember);

    /// `a * 2^exp`; `exp` lanes hold integral float values.
    fn ldexp(a: Self::SimdMember, exp: Self::SimdMember) -> Self::SimdMember;

    /// `a * b + c` with a single rounding.
    fn fma(a: Self::SimdMember, b: Self::SimdMember, c: Self::SimdMember) -> Self::SimdMember;

    fn signbit(a: Self::SimdMember) -> Self::MaskMember;

    #[inline]
    fn isnan(a: Self::SimdMember) -> Self::MaskMember {
        Self::mask_not(Self::eq(a, a))
    }

    #[inline]
    fn isinf(a: Self::SimdMember) -> Self::MaskMember {
        Self::eq(Self::abs(a), Self::broadcast(T::infinity()))
    }

    #[inline]
    fn isfinite(a: Self::SimdMember) -> Self::MaskMember {
        Self::lt(Self::abs(a), Self::broadcast(T::infinity()))
    }

    #[inline]
    fn isnormal(a: Self::SimdMember) -> Self::MaskMember {
        let abs = Self::abs(a);
        Self::mask_and(
            Self::le(Self::broadcast(T::min_positive_value()), abs),
            Self::lt(abs, Self::broadcast(T::infinity())),
        )
    }

    #[inline]
    fn isunordered(a: Self::SimdMember, b: Self::SimdMember) -> Self::MaskMember {
        Self::mask_or(Self::isnan(a), Self::isnan(b))
    }
}

/// An associative binary operation usable with `reduce`.
pub trait ReduceOp<T: Vectorizable>: Copy {
    fn apply<I: SimdImpl<T>>(a: I::SimdMember, b: I::SimdMember) -> I::SimdMember;
    fn apply_lane(a: T, b: T) -> T;
}

/// Sum.
#[derive(Clone, Copy, Debug, Default)]
pub struct Plus;

/// Product.
#[derive(Clone, Copy, Debug, Default)]
pub struct Multiplies;

#[derive(Clone, Copy, Debug, Default)]
pub struct Minimum;

#[derive(Clone, Copy, Debug, Default)]
pub struct Maximum;

/// Bitwise and, integers only.
#[derive(Clone, Copy, Debug, Default)]
pub struct BitAnd;

#[derive(Clone, Copy, Debug, Default)]
pub struct BitOr;

#[derive(Clone, Copy, Debug, Default)]
pub struct BitXor;

impl<T: Vectorizable> ReduceOp<T> for Plus {
    #[inline(always)]
    fn apply<I: SimdImpl<T>>(a: I::SimdMember, b: I::SimdMember) -> I::SimdMember {
        I::add(a, b)
    }

    #[inline(always)]
    fn apply_lane(a: T, b: T) -> T {
        a.lane_add(b)
    }
}

impl<T: Vectorizable> ReduceOp<T> for Multiplies {
    #[inline(always)]
    fn apply<I: SimdImpl<T>>(a: I::SimdMember, b: I::SimdMember) -> I::SimdMember {
        I::mul(a, b)
    }

    #[inline(always)]
    fn apply_lane(a: T, b: T) -> T {
        a.lane_mul(b)
    }
}

impl<T: Vectorizable> ReduceOp<T> for Minimum {
    #[inline(always)]
    fn apply<I: SimdImpl<T>>(a: I::SimdMember, b: I::SimdMember) -> I::SimdMember {
        I::min(a, b)
    }

    #[inline(always)]
    fn apply_lane(a: T, b: T) -> T {
        a.lane_min(b)
    }
}

impl<T: Vectorizable> ReduceOp<T> for Maximum {
    #[inline(always)]
    fn apply<I: SimdImpl<T>>(a: I::SimdMember, b: I::SimdMember) -> I::SimdMember {
        I::max(a, b)
    }

    #[inline(always)]
    fn apply_lane(a: T, b: T) -> T {
        a.lane_max(b)
    }
}

impl<T: SimdInteger> ReduceOp<T> for BitAnd {
    #[inline(always)]
    fn apply<I: SimdImpl<T>>(a: I::SimdMember, b: I::SimdMember) -> I::SimdMember {
        I::bit_and(a, b)
    }

    #[inline(always)]
    fn apply_lane(a: T, b: T) -> T {
        a.lane_and(b)
    }
}

impl<T: SimdInteger> ReduceOp<T> for BitOr {
    #[inline(always)]
    fn apply<I: SimdImpl<T>>(a: I::SimdMember, b: I::SimdMember) -> I::SimdMember {
        I::bit_or(a, b)
    }

    #[inline(always)]
    fn apply_lane(a: T, b: T) -> T {
        a.lane_or(b)
    }
}

impl<T: SimdInteger> ReduceOp<T> for BitXor {
    #[inline(always)]
    fn apply<I: SimdImpl<T>>(a: I::SimdMember, b: I::SimdMember) -> I::SimdMember {
        I::bit_xor(a, b)
    }

    #[inline(always)]
    fn apply_lane(a: T, b: T) -> T {
        a.lane_xor(b)
    }
}
