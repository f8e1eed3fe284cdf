//! Implementation of the `FixedSize<N>` ABI.
//!
//! Values are [`SimdTuple`]s and masks are [`Bitmask`]s holding exactly `N`
//! bits. Every operation walks the tuple's chunk layout and hands each chunk
//! to the implementation of its native ABI, so a 13-lane `f32` vector on an
//! AVX machine runs one `ymm`, one `xmm` and one scalar operation.

use crate::simd::element::{SimdFloat, SimdInteger, Vectorizable};
use crate::simd::storage::Bitmask;
use crate::simd::traits::{MaskImpl, ReduceOp, SimdFloatImpl, SimdImpl, SimdIntImpl};
use crate::simd::tuple::{
    BinaryOp, Blend, Compare, CompareOp, FloatClassify, FloatMap, FloatMulti, FloatTest,
    FloatUnaryOp, IntOp, IntZip, Map, SimdTuple, UnaryOp, Zip,
};

pub struct FixedSizeImpl<const N: usize>;

impl<const N: usize> FixedSizeImpl<N> {
    #[inline(always)]
    fn zip<T: Vectorizable>(a: SimdTuple<T, N>, b: SimdTuple<T, N>, op: BinaryOp) -> SimdTuple<T, N> {
        let mut out = [T::ZERO; N];
        SimdTuple::<T, N>::for_each(&mut Zip {
            a: a.as_array(),
            b: b.as_array(),
            out: &mut out,
            op,
        });
        SimdTuple::from_array(out)
    }

    #[inline(always)]
    fn map<T: Vectorizable>(a: SimdTuple<T, N>, op: UnaryOp) -> SimdTuple<T, N> {
        let mut out = [T::ZERO; N];
        SimdTuple::<T, N>::for_each(&mut Map {
            a: a.as_array(),
            out: &mut out,
            op,
        });
        SimdTuple::from_array(out)
    }

    #[inline(always)]
    fn compare<T: Vectorizable>(a: SimdTuple<T, N>, b: SimdTuple<T, N>, op: CompareOp) -> Bitmask {
        let mut visitor = Compare {
            a: a.as_array(),
            b: b.as_array(),
            op,
            bits: 0,
        };
        SimdTuple::<T, N>::for_each(&mut visitor);
        Bitmask::new(visitor.bits)
    }

    #[inline(always)]
    fn int_zip<T: SimdInteger>(a: SimdTuple<T, N>, b: SimdTuple<T, N>, op: IntOp) -> SimdTuple<T, N> {
        let mut out = [T::ZERO; N];
        SimdTuple::<T, N>::for_each_int(&mut IntZip {
            a: a.as_array(),
            b: b.as_array(),
            out: &mut out,
            op,
        });
        SimdTuple::from_array(out)
    }

    #[inline(always)]
    fn float_map<T: SimdFloat>(a: SimdTuple<T, N>, op: FloatUnaryOp) -> SimdTuple<T, N> {
        let mut out = [T::ZERO; N];
        SimdTuple::<T, N>::for_each_float(&mut FloatMap {
            a: a.as_array(),
            out: &mut out,
            op,
        });
        SimdTuple::from_array(out)
    }

    #[inline(always)]
    fn classify<T: SimdFloat>(a: SimdTuple<T, N>, test: FloatTest) -> Bitmask {
        let mut visitor = FloatClassify {
            a: a.as_array(),
            test,
            bits: 0,
        };
        SimdTuple::<T, N>::for_each_float(&mut visitor);
        Bitmask::new(visitor.bits)
    }
}

impl<T: Vectorizable, const N: usize> MaskImpl<T> for FixedSizeImpl<N> {
    const LANES: usize = N;

    type MaskMember = Bitmask;

    #[inline(always)]
    fn mask_broadcast(value: bool) -> Bitmask {
        Bitmask::truncated(if value { u64::MAX } else { 0 }, N)
    }

    #[inline(always)]
    fn mask_from_bitset(bits: u64) -> Bitmask {
        Bitmask::truncated(bits, N)
    }

    #[inline(always)]
    fn mask_to_bitset(mask: Bitmask) -> u64 {
        mask.bits()
    }

    #[inline(always)]
    fn mask_get(mask: Bitmask, i: usize) -> bool {
        mask.get(i)
    }

    #[inline(always)]
    fn mask_set(mask: &mut Bitmask, i: usize, value: bool) {
        debug_assert!(i < N, "lane {i} out of range");
        mask.set(i, value);
    }

    #[inline(always)]
    fn mask_and(a: Bitmask, b: Bitmask) -> Bitmask {
        Bitmask::new(a.bits() & b.bits())
    }

    #[inline(always)]
    fn mask_or(a: Bitmask, b: Bitmask) -> Bitmask {
        Bitmask::new(a.bits() | b.bits())
    }

    #[inline(always)]
    fn mask_xor(a: Bitmask, b: Bitmask) -> Bitmask {
        Bitmask::new(a.bits() ^ b.bits())
    }

    #[inline(always)]
    fn mask_not(a: Bitmask) -> Bitmask {
        Bitmask::truncated(!a.bits(), N)
    }
}

impl<T: Vectorizable, const N: usize> SimdImpl<T> for FixedSizeImpl<N> {
    type SimdMember = SimdTuple<T, N>;

    #[inline(always)]
    unsafe fn load(ptr: *const T, _aligned: bool) -> SimdTuple<T, N> {
        SimdTuple::from_array(ptr.cast::<[T; N]>().read_unaligned())
    }

    #[inline(always)]
    unsafe fn store(value: SimdTuple<T, N>, ptr: *mut T, _aligned: bool) {
        ptr.cast::<[T; N]>().write_unaligned(*value.as_array())
    }

    #[inline(always)]
    fn broadcast(value: T) -> SimdTuple<T, N> {
        SimdTuple::from_array([value; N])
    }

    #[inline(always)]
    fn generate<F: FnMut(usize) -> T>(generator: F) -> SimdTuple<T, N> {
        SimdTuple::from_array(std::array::from_fn(generator))
    }

    #[inline(always)]
    fn get(value: SimdTuple<T, N>, i: usize) -> T {
        value.as_array()[i]
    }

    #[inline(always)]
    fn set(value: &mut SimdTuple<T, N>, i: usize, lane: T) {
        value.as_mut_array()[i] = lane;
    }

    #[inline(always)]
    fn add(a: SimdTuple<T, N>, b: SimdTuple<T, N>) -> SimdTuple<T, N> {
        Self::zip(a, b, BinaryOp::Add)
    }

    #[inline(always)]
    fn sub(a: SimdTuple<T, N>, b: SimdTuple<T, N>) -> SimdTuple<T, N> {
        Self::zip(a, b, BinaryOp::Sub)
    }

    #[inline(always)]
    fn mul(a: SimdTuple<T, N>, b: SimdTuple<T, N>) -> SimdTuple<T, N> {
        Self::zip(a, b, BinaryOp::Mul)
    }

    #[inline(always)]
    fn div(a: SimdTuple<T, N>, b: SimdTuple<T, N>) -> SimdTuple<T, N> {
        Self::zip(a, b, BinaryOp::Div)
    }

    #[inline(always)]
    fn neg(a: SimdTuple<T, N>) -> SimdTuple<T, N> {
        Self::map(a, UnaryOp::Neg)
    }

    #[inline(always)]
    fn bit_and(a: SimdTuple<T, N>, b: SimdTuple<T, N>) -> SimdTuple<T, N> {
        Self::zip(a, b, BinaryOp::And)
    }

    #[inline(always)]
    fn bit_or(a: SimdTuple<T, N>, b: SimdTuple<T, N>) -> SimdTuple<T, N> {
        Self::zip(a, b, BinaryOp::Or)
    }

    #[inline(always)]
    fn bit_xor(a: SimdTuple<T, N>, b: SimdTuple<T, N>) -> SimdTuple<T, N> {
        Self::zip(a, b, BinaryOp::Xor)
    }

    #[inline(always)]
    fn bit_not(a: SimdTuple<T, N>) -> SimdTuple<T, N> {
        Self::map(a, UnaryOp::Not)
    }

    #[inline(always)]
    fn eq(a: SimdTuple<T, N>, b: SimdTuple<T, N>) -> Bitmask {
        Self::compare(a, b, CompareOp::Eq)
    }

    #[inline(always)]
    fn lt(a: SimdTuple<T, N>, b: SimdTuple<T, N>) -> Bitmask {
        Self::compare(a, b, CompareOp::Lt)
    }

    #[inline(always)]
    fn le(a: SimdTuple<T, N>, b: SimdTuple<T, N>) -> Bitmask {
        Self::compare(a, b, CompareOp::Le)
    }

    #[inline(always)]
    fn min(a: SimdTuple<T, N>, b: SimdTuple<T, N>) -> SimdTuple<T, N> {
        Self::zip(a, b, BinaryOp::Min)
    }

    #[inline(always)]
    fn max(a: SimdTuple<T, N>, b: SimdTuple<T, N>) -> SimdTuple<T, N> {
        Self::zip(a, b, BinaryOp::Max)
    }

    #[inline(always)]
    fn abs(a: SimdTuple<T, N>) -> SimdTuple<T, N> {
        Self::map(a, UnaryOp::Abs)
    }

    #[inline(always)]
    fn blend(k: Bitmask, a: SimdTuple<T, N>, b: SimdTuple<T, N>) -> SimdTuple<T, N> {
        let mut out = [T::ZERO; N];
        SimdTuple::<T, N>::for_each(&mut Blend {
            k,
            a: a.as_array(),
            b: b.as_array(),
            out: &mut out,
        });
        SimdTuple::from_array(out)
    }

    #[inline(always)]
    fn reduce<Op: ReduceOp<T>>(value: SimdTuple<T, N>) -> T {
        value.tree_reduction::<Op>()
    }
}

impl<T: SimdInteger, const N: usize> SimdIntImpl<T> for FixedSizeImpl<N> {
    #[inline(always)]
    fn rem(a: SimdTuple<T, N>, b: SimdTuple<T, N>) -> SimdTuple<T, N> {
        Self::int_zip(a, b, IntOp::Rem)
    }

    #[inline(always)]
    fn shl(a: SimdTuple<T, N>, b: SimdTuple<T, N>) -> SimdTuple<T, N> {
        Self::int_zip(a, b, IntOp::Shl)
    }

    #[inline(always)]
    fn shr(a: SimdTuple<T, N>, b: SimdTuple<T, N>) -> SimdTuple<T, N> {
        Self::int_zip(a, b, IntOp::Shr)
    }

    #[inline(always)]
    fn shl_scalar(a: SimdTuple<T, N>, count: u32) -> SimdTuple<T, N> {
        Self::int_zip(a, a, IntOp::ShlScalar(count))
    }

    #[inline(always)]
    fn shr_scalar(a: SimdTuple<T, N>, count: u32) -> SimdTuple<T, N> {
        Self::int_zip(a, a, IntOp::ShrScalar(count))
    }
}

impl<T: SimdFloat, const N: usize> SimdFloatImpl<T> for FixedSizeImpl<N> {
    #[inline(always)]
    fn sqrt(a: SimdTuple<T, N>) -> SimdTuple<T, N> {
        Self::float_map(a, FloatUnaryOp::Sqrt)
    }

    #[inline(always)]
    fn floor(a: SimdTuple<T, N>) -> SimdTuple<T, N> {
        Self::float_map(a, FloatUnaryOp::Floor)
    }

    #[inline(always)]
    fn ceil(a: SimdTuple<T, N>) -> SimdTuple<T, N> {
        Self::float_map(a, FloatUnaryOp::Ceil)
    }

    #[inline(always)]
    fn trunc(a: SimdTuple<T, N>) -> SimdTuple<T, N> {
        Self::float_map(a, FloatUnaryOp::Trunc)
    }

    #[inline(always)]
    fn round(a: SimdTuple<T, N>) -> SimdTuple<T, N> {
        Self::float_map(a, FloatUnaryOp::Round)
    }

    #[inline(always)]
    fn logb(a: SimdTuple<T, N>) -> SimdTuple<T, N> {
        Self::float_map(a, FloatUnaryOp::Logb)
    }

    #[inline(always)]
    fn frexp(a: SimdTuple<T, N>) -> (SimdTuple<T, N>, SimdTuple<T, N>) {
        let mut mantissa = [T::ZERO; N];
        let mut exponent = [T::ZERO; N];
        SimdTuple::<T, N>::for_each_float(&mut FloatMulti::Frexp {
            a: a.as_array(),
            mantissa: &mut mantissa,
            exponent: &mut exponent,
        });
        (SimdTuple::from_array(mantissa), SimdTuple::from_array(exponent))
    }

    #[inline(always)]
    fn ldexp(a: SimdTuple<T, N>, exp: SimdTuple<T, N>) -> SimdTuple<T, N> {
        let mut out = [T::ZERO; N];
        SimdTuple::<T, N>::for_each_float(&mut FloatMulti::Ldexp {
            a: a.as_array(),
            exp: exp.as_array(),
            out: &mut out,
        });
        SimdTuple::from_array(out)
    }

    #[inline(always)]
    fn fma(a: SimdTuple<T, N>, b: SimdTuple<T, N>, c: SimdTuple<T, N>) -> SimdTuple<T, N> {
        let mut out = [T::ZERO; N];
        SimdTuple::<T, N>::for_each_float(&mut FloatMulti::Fma {
            a: a.as_array(),
            b: b.as_array(),
            c: c.as_array(),
            out: &mut out,
        });
        SimdTuple::from_array(out)
    }

    #[inline(always)]
    fn signbit(a: SimdTuple<T, N>) -> Bitmask {
        Self::classify(a, FloatTest::Signbit)
    }

    #[inline(always)]
    fn isnan(a: SimdTuple<T, N>) -> Bitmask {
        Self::classify(a, FloatTest::IsNan)
    }

    #[inline(always)]
    fn isinf(a: SimdTuple<T, N>) -> Bitmask {
        Self::classify(a, FloatTest::IsInf)
    }

    #[inline(always)]
    fn isfinite(a: SimdTuple<T, N>) -> Bitmask {
        Self::classify(a, FloatTest::IsFinite)
    }

    #[inline(always)]
    fn isnormal(a: SimdTuple<T, N>) -> Bitmask {
        Self::classify(a, FloatTest::IsNormal)
    }
}
