//! Element types that can live in a SIMD lane.
//!
//! [`Vectorizable`] is implemented for the ten primitive integer and float
//! types. It carries the scalar reference semantics every vector lowering must
//! agree with (`lane_*` helpers), the element's default ABI and the chunk
//! dispatch used by fixed-size vectors. [`SimdInteger`] and [`SimdFloat`] add
//! the operations that only make sense for one family.

use std::fmt::Debug;

use crate::simd::abi::native::{CompatibleAbi, WideByte, WideFloat, WideWord};
use crate::simd::abi::{AbiKind, AbiTraits, Scalar};
use crate::simd::math::Kernels;
use crate::simd::tuple::{ChunkVisitor, FloatChunkVisitor, IntChunkVisitor};

#[cfg(have_avx)]
use crate::simd::abi::Avx;
#[cfg(have_avx512f)]
use crate::simd::abi::Avx512;
#[cfg(have_neon)]
use crate::simd::abi::Neon;
#[cfg(have_sse2)]
use crate::simd::abi::Sse;

/// Runtime description of an element type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementKind {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
}

impl ElementKind {
    /// Size of one lane in bytes.
    pub const fn bytes(self) -> usize {
        match self {
            ElementKind::I8 | ElementKind::U8 => 1,
            ElementKind::I16 | ElementKind::U16 => 2,
            ElementKind::I32 | ElementKind::U32 | ElementKind::F32 => 4,
            ElementKind::I64 | ElementKind::U64 | ElementKind::F64 => 8,
        }
    }

    pub const fn bits(self) -> u32 {
        self.bytes() as u32 * 8
    }

    pub const fn is_float(self) -> bool {
        matches!(self, ElementKind::F32 | ElementKind::F64)
    }

    /// Floats count as signed.
    pub const fn is_signed(self) -> bool {
        !matches!(
            self,
            ElementKind::U8 | ElementKind::U16 | ElementKind::U32 | ElementKind::U64
        )
    }
}

mod sealed {
    pub trait Sealed {}
}

/// A primitive type usable as a SIMD lane.
///
/// The `lane_*` methods define the semantics of every lane-wise operation.
/// Integer arithmetic wraps and an integer division or remainder by zero
/// yields `0` instead of panicking. Every vector lowering produces the same
/// lanes, so a value does not depend on the register it was computed in.
/// `lane_min(a, b)` is `if a < b { a } else { b }` (the second operand wins on
/// NaN, matching `minps`).
pub trait Vectorizable:
    Copy + Default + PartialEq + PartialOrd + Debug + Send + Sync + 'static + sealed::Sealed
{
    const KIND: ElementKind;
    const ZERO: Self;
    const ONE: Self;

    /// Widest ABI with native support for this element on the compiled target.
    type Native: AbiTraits<Self>;

    /// ABI that every target of the architecture supports.
    type Compatible: AbiTraits<Self>;

    fn lane_add(self, rhs: Self) -> Self;
    fn lane_sub(self, rhs: Self) -> Self;
    fn lane_mul(self, rhs: Self) -> Self;
    fn lane_div(self, rhs: Self) -> Self;
    fn lane_neg(self) -> Self;
    fn lane_abs(self) -> Self;

    #[inline(always)]
    fn lane_min(self, rhs: Self) -> Self {
        if self < rhs {
            self
        } else {
            rhs
        }
    }

    #[inline(always)]
    fn lane_max(self, rhs: Self) -> Self {
        if self > rhs {
            self
        } else {
            rhs
        }
    }

    #[inline(always)]
    fn lane_and(self, rhs: Self) -> Self {
        Self::from_bits(self.to_bits() & rhs.to_bits())
    }

    #[inline(always)]
    fn lane_or(self, rhs: Self) -> Self {
        Self::from_bits(self.to_bits() | rhs.to_bits())
    }

    #[inline(always)]
    fn lane_xor(self, rhs: Self) -> Self {
        Self::from_bits(self.to_bits() ^ rhs.to_bits())
    }

    #[inline(always)]
    fn lane_not(self) -> Self {
        Self::from_bits(!self.to_bits())
    }

    /// Raw bit pattern, zero extended.
    fn to_bits(self) -> u64;

    /// Builds a value from the low `size_of::<Self>() * 8` bits of `bits`.
    fn from_bits(bits: u64) -> Self;

    fn to_f64(self) -> f64;
    fn to_i128(self) -> i128;
    fn from_f64(value: f64) -> Self;
    fn from_i128(value: i128) -> Self;

    /// Numeric conversion with `as` semantics: integers wrap, floats to
    /// integers saturate and map NaN to zero.
    #[inline(always)]
    fn cast<U: Vectorizable>(self) -> U {
        if Self::KIND.is_float() {
            U::from_f64(self.to_f64())
        } else {
            U::from_i128(self.to_i128())
        }
    }

    /// Calls `visitor.visit::<A>(offset)` with the ABI tag described by `abi`.
    /// Returns `false` when the element has no tag for that description.
    fn visit_chunk<V: ChunkVisitor<Self>>(abi: AbiKind, offset: usize, visitor: &mut V) -> bool;
}

/// Integer lanes.
pub trait SimdInteger: Vectorizable + num::PrimInt {
    const BITS: u32;

    /// Remainder; zero for a zero divisor.
    fn lane_rem(self, rhs: Self) -> Self;

    /// Left shift; counts of `BITS` or more yield zero.
    fn lane_shl(self, count: u64) -> Self;

    /// Right shift, arithmetic for signed types; counts of `BITS` or more
    /// yield zero or the sign fill.
    fn lane_shr(self, count: u64) -> Self;

    /// The lane read as an unsigned shift count.
    #[inline(always)]
    fn shift_count(self) -> u64 {
        self.to_bits()
    }

    fn visit_int_chunk<V: IntChunkVisitor<Self>>(abi: AbiKind, offset: usize, visitor: &mut V)
        -> bool;
}

/// Floating point lanes.
pub trait SimdFloat: Vectorizable + num::Float + Kernels {
    /// Integer type with the same lane width.
    type SameSizeInt: SimdInteger;

    /// Splits `self` into a mantissa with magnitude in `[0.5, 1)` and a power
    /// of two. Zero, infinities and NaN are returned unchanged with exponent 0.
    fn lane_frexp(self) -> (Self, i32);

    /// `self * 2^exp`, without overflowing the intermediate scale factor.
    fn lane_ldexp(self, exp: i32) -> Self;

    /// Unbiased exponent: `-inf` for zero, `+inf` for infinities, NaN for NaN.
    #[inline]
    fn lane_logb(self) -> Self {
        if self.is_nan() {
            self
        } else if self == Self::ZERO {
            Self::neg_infinity()
        } else if self.is_infinite() {
            Self::infinity()
        } else {
            let (_, exp) = self.lane_frexp();
            Self::from_i128(exp as i128 - 1)
        }
    }

    fn visit_float_chunk<V: FloatChunkVisitor<Self>>(
        abi: AbiKind,
        offset: usize,
        visitor: &mut V,
    ) -> bool;
}

// One arm per native ABI tag the element can be split into. Partial register
// widths are listed per element so only valid (element, width) pairs are
// ever instantiated.
macro_rules! dispatch_chunk {
    ($abi:expr, $offset:expr, $visitor:expr, [$($w:literal),*]) => {
        match $abi {
            AbiKind::Scalar => {
                $visitor.visit::<Scalar>($offset);
                true
            }
            #[cfg(have_avx512f)]
            AbiKind::Avx512(64) => {
                $visitor.visit::<Avx512<64>>($offset);
                true
            }
            #[cfg(have_avx)]
            AbiKind::Avx(32) => {
                $visitor.visit::<Avx<32>>($offset);
                true
            }
            $(
                #[cfg(have_sse2)]
                AbiKind::Sse($w) => {
                    $visitor.visit::<Sse<$w>>($offset);
                    true
                }
                #[cfg(have_neon)]
                AbiKind::Neon($w) => {
                    $visitor.visit::<Neon<$w>>($offset);
                    true
                }
            )*
            _ => false,
        }
    };
}

macro_rules! impl_integer {
    ($t:ty, $kind:ident, $unsigned:ty, $native:ty, [$($w:literal),*], abs: $abs:expr, sign_fill: $fill:expr) => {
        impl sealed::Sealed for $t {}

        impl Vectorizable for $t {
            const KIND: ElementKind = ElementKind::$kind;
            const ZERO: Self = 0;
            const ONE: Self = 1;

            type Native = $native;
            type Compatible = CompatibleAbi;

            #[inline(always)]
            fn lane_add(self, rhs: Self) -> Self {
                self.wrapping_add(rhs)
            }

            #[inline(always)]
            fn lane_sub(self, rhs: Self) -> Self {
                self.wrapping_sub(rhs)
            }

            #[inline(always)]
            fn lane_mul(self, rhs: Self) -> Self {
                self.wrapping_mul(rhs)
            }

            #[inline(always)]
            fn lane_div(self, rhs: Self) -> Self {
                if rhs == 0 {
                    0
                } else {
                    self.wrapping_div(rhs)
                }
            }

            #[inline(always)]
            fn lane_neg(self) -> Self {
                self.wrapping_neg()
            }

            #[inline(always)]
            fn lane_abs(self) -> Self {
                let abs: fn(Self) -> Self = $abs;
                abs(self)
            }

            #[inline(always)]
            fn to_bits(self) -> u64 {
                self as $unsigned as u64
            }

            #[inline(always)]
            fn from_bits(bits: u64) -> Self {
                bits as $unsigned as Self
            }

            #[inline(always)]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline(always)]
            fn to_i128(self) -> i128 {
                self as i128
            }

            #[inline(always)]
            fn from_f64(value: f64) -> Self {
                value as Self
            }

            #[inline(always)]
            fn from_i128(value: i128) -> Self {
                value as Self
            }

            #[inline(always)]
            fn visit_chunk<V: ChunkVisitor<Self>>(
                abi: AbiKind,
                offset: usize,
                visitor: &mut V,
            ) -> bool {
                dispatch_chunk!(abi, offset, visitor, [$($w),*])
            }
        }

        impl SimdInteger for $t {
            const BITS: u32 = <$t>::BITS;

            #[inline(always)]
            fn lane_rem(self, rhs: Self) -> Self {
                if rhs == 0 {
                    0
                } else {
                    self.wrapping_rem(rhs)
                }
            }

            #[inline(always)]
            fn lane_shl(self, count: u64) -> Self {
                if count >= Self::BITS as u64 {
                    0
                } else {
                    self << count
                }
            }

            #[inline(always)]
            fn lane_shr(self, count: u64) -> Self {
                if count >= Self::BITS as u64 {
                    let fill: fn(Self) -> Self = $fill;
                    fill(self)
                } else {
                    self >> count
                }
            }

            #[inline(always)]
            fn visit_int_chunk<V: IntChunkVisitor<Self>>(
                abi: AbiKind,
                offset: usize,
                visitor: &mut V,
            ) -> bool {
                dispatch_chunk!(abi, offset, visitor, [$($w),*])
            }
        }
    };
}

macro_rules! impl_signed {
    ($t:ty, $kind:ident, $unsigned:ty, $native:ty, [$($w:literal),*]) => {
        impl_integer!(
            $t, $kind, $unsigned, $native, [$($w),*],
            abs: |x| x.wrapping_abs(),
            sign_fill: |x| x >> (<$t>::BITS - 1)
        );
    };
}

macro_rules! impl_unsigned {
    ($t:ty, $kind:ident, $native:ty, [$($w:literal),*]) => {
        impl_integer!(
            $t, $kind, $t, $native, [$($w),*],
            abs: |x| x,
            sign_fill: |_| 0
        );
    };
}

impl_signed!(i8, I8, u8, WideByte, [16, 8, 4, 2]);
impl_signed!(i16, I16, u16, WideByte, [16, 8, 4]);
impl_signed!(i32, I32, u32, WideWord, [16, 8]);
impl_signed!(i64, I64, u64, WideWord, [16]);
impl_unsigned!(u8, U8, WideByte, [16, 8, 4, 2]);
impl_unsigned!(u16, U16, WideByte, [16, 8, 4]);
impl_unsigned!(u32, U32, WideWord, [16, 8]);
impl_unsigned!(u64, U64, WideWord, [16]);

macro_rules! impl_float {
    (
        $t:ty, $kind:ident, $bits:ty, $int:ty, [$($w:literal),*],
        exp_mask: $exp_mask:expr, mantissa_bits: $mbits:expr, bias: $bias:expr,
        half_exponent: $half:expr, subnormal_scale: $scale:expr, subnormal_shift: $shift:expr,
        max_exp: $max_exp:expr, min_exp: $min_exp:expr
    ) => {
        impl sealed::Sealed for $t {}

        impl Vectorizable for $t {
            const KIND: ElementKind = ElementKind::$kind;
            const ZERO: Self = 0.0;
            const ONE: Self = 1.0;

            type Native = WideFloat;
            type Compatible = CompatibleAbi;

            #[inline(always)]
            fn lane_add(self, rhs: Self) -> Self {
                self + rhs
            }

            #[inline(always)]
            fn lane_sub(self, rhs: Self) -> Self {
                self - rhs
            }

            #[inline(always)]
            fn lane_mul(self, rhs: Self) -> Self {
                self * rhs
            }

            #[inline(always)]
            fn lane_div(self, rhs: Self) -> Self {
                self / rhs
            }

            #[inline(always)]
            fn lane_neg(self) -> Self {
                -self
            }

            #[inline(always)]
            fn lane_abs(self) -> Self {
                self.abs()
            }

            #[inline(always)]
            fn to_bits(self) -> u64 {
                <$t>::to_bits(self) as u64
            }

            #[inline(always)]
            fn from_bits(bits: u64) -> Self {
                <$t>::from_bits(bits as $bits)
            }

            #[inline(always)]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline(always)]
            fn to_i128(self) -> i128 {
                self as i128
            }

            #[inline(always)]
            fn from_f64(value: f64) -> Self {
                value as Self
            }

            #[inline(always)]
            fn from_i128(value: i128) -> Self {
                value as Self
            }

            #[inline(always)]
            fn visit_chunk<V: ChunkVisitor<Self>>(
                abi: AbiKind,
                offset: usize,
                visitor: &mut V,
            ) -> bool {
                dispatch_chunk!(abi, offset, visitor, [$($w),*])
            }
        }

        impl SimdFloat for $t {
            type SameSizeInt = $int;

            fn lane_frexp(self) -> (Self, i32) {
                if self == 0.0 || !self.is_finite() {
                    return (self, 0);
                }

                let (x, adjust) = if self.is_subnormal() {
                    (self * $scale, $shift)
                } else {
                    (self, 0)
                };

                let bits = x.to_bits();
                let exponent = ((bits & $exp_mask) >> $mbits) as i32;
                let mantissa = <$t>::from_bits((bits & !$exp_mask) | (($bias - 1) << $mbits));

                (mantissa, exponent - ($bias as i32 - 1) - adjust)
            }

            fn lane_ldexp(self, exp: i32) -> Self {
                let mut x = self;
                let mut n = exp.clamp(-3 * $half, 3 * $half);

                while n > $max_exp {
                    x *= <$t>::from_bits((($max_exp + $bias as i32) as $bits) << $mbits);
                    n -= $max_exp;
                }
                while n < $min_exp {
                    x *= <$t>::from_bits((($min_exp + $bias as i32) as $bits) << $mbits);
                    n -= $min_exp;
                }

                x * <$t>::from_bits(((n + $bias as i32) as $bits) << $mbits)
            }

            #[inline(always)]
            fn visit_float_chunk<V: FloatChunkVisitor<Self>>(
                abi: AbiKind,
                offset: usize,
                visitor: &mut V,
            ) -> bool {
                dispatch_chunk!(abi, offset, visitor, [$($w),*])
            }
        }
    };
}

impl_float!(
    f32, F32, u32, i32, [16, 8],
    exp_mask: 0x7f80_0000u32, mantissa_bits: 23, bias: 127u32,
    half_exponent: 127, subnormal_scale: 33_554_432.0f32, subnormal_shift: 25,
    max_exp: 127, min_exp: -126
);

impl_float!(
    f64, F64, u64, i64, [16],
    exp_mask: 0x7ff0_0000_0000_0000u64, mantissa_bits: 52, bias: 1023u64,
    half_exponent: 1023, subnormal_scale: 18_014_398_509_481_984.0f64, subnormal_shift: 54,
    max_exp: 1023, min_exp: -1022
);

#[cfg(test)]
mod tests {
    use super::*;

    mod kind_tests {
        use super::*;

        #[test]
        fn test_kind_metadata() {
            assert_eq!(<i8 as Vectorizable>::KIND.bytes(), 1);
            assert_eq!(<u16 as Vectorizable>::KIND.bits(), 16);
            assert_eq!(<f64 as Vectorizable>::KIND.bytes(), 8);
            assert!(<f32 as Vectorizable>::KIND.is_float());
            assert!(!<u32 as Vectorizable>::KIND.is_signed());
            assert!(<i64 as Vectorizable>::KIND.is_signed());
        }
    }

    mod integer_lane_tests {
        use super::*;

        #[test]
        fn test_wrapping_arithmetic() {
            assert_eq!(i8::MAX.lane_add(1), i8::MIN);
            assert_eq!(0u16.lane_sub(1), u16::MAX);
            assert_eq!(i32::MIN.lane_neg(), i32::MIN);
            assert_eq!(i16::MIN.lane_abs(), i16::MIN);
            assert_eq!(7u8.lane_abs(), 7);
            assert_eq!(i32::MIN.lane_div(-1), i32::MIN);
        }

        #[test]
        fn test_zero_divisor_does_not_panic() {
            assert_eq!(5i32.lane_div(0), 0);
            assert_eq!(5u64.lane_rem(0), 0);
            assert_eq!(i64::MIN.lane_rem(-1), 0);
        }

        #[test]
        fn test_shift_out_of_range() {
            assert_eq!(1u8.lane_shl(8), 0);
            assert_eq!(1u8.lane_shl(7), 128);
            assert_eq!((-8i16).lane_shr(2), -2);
            assert_eq!((-8i16).lane_shr(16), -1);
            assert_eq!(8i16.lane_shr(99), 0);
            assert_eq!(0x80u8.lane_shr(8), 0);
            // Negative counts read as huge unsigned counts.
            assert_eq!(3i32.lane_shl((-1i32).shift_count()), 0);
        }

        #[test]
        fn test_bit_patterns() {
            assert_eq!((-1i8).to_bits(), 0xff);
            assert_eq!(i16::from_bits(0xffff_8000), i16::MIN);
            assert_eq!(0b1100u8.lane_and(0b1010), 0b1000);
            assert_eq!(0u32.lane_not(), u32::MAX);
        }
    }

    mod float_lane_tests {
        use super::*;

        #[test]
        fn test_min_max_prefer_second_operand_on_nan() {
            assert!(1.0f32.lane_min(f32::NAN).is_nan());
            assert_eq!(f32::NAN.lane_min(1.0), 1.0);
            assert_eq!(f64::NAN.lane_max(2.0), 2.0);
            assert_eq!((-0.0f32).lane_min(0.0).to_bits(), 0.0f32.to_bits());
        }

        #[test]
        fn test_float_bit_ops() {
            assert_eq!((-2.5f32).lane_and(f32::from_bits(0x7fff_ffff)), 2.5);
            assert_eq!(1.0f64.lane_xor(-0.0), -1.0);
        }

        #[test]
        fn test_frexp_normal_and_subnormal() {
            assert_eq!(8.0f32.lane_frexp(), (0.5, 4));
            assert_eq!((-3.0f64).lane_frexp(), (-0.75, 2));

            let tiny = f32::from_bits(1); // 2^-149
            assert_eq!(tiny.lane_frexp(), (0.5, -148));

            let tiny = f64::from_bits(1); // 2^-1074
            assert_eq!(tiny.lane_frexp(), (0.5, -1073));
        }

        #[test]
        fn test_frexp_special_values() {
            assert_eq!(0.0f32.lane_frexp(), (0.0, 0));
            assert_eq!(f64::INFINITY.lane_frexp(), (f64::INFINITY, 0));
            assert!(f32::NAN.lane_frexp().0.is_nan());
            assert!((-0.0f64).lane_frexp().0.is_sign_negative());
        }

        #[test]
        fn test_ldexp_ranges() {
            assert_eq!(0.75f32.lane_ldexp(3), 6.0);
            assert_eq!(1.0f32.lane_ldexp(-149), f32::from_bits(1));
            assert_eq!(1.0f32.lane_ldexp(128), f32::INFINITY);
            assert_eq!(0.5f64.lane_ldexp(1024), 2f64.powi(1023));
            assert_eq!(f64::MIN_POSITIVE.lane_ldexp(-52), f64::from_bits(1));
        }

        #[test]
        fn test_logb() {
            assert_eq!(8.0f32.lane_logb(), 3.0);
            assert_eq!(0.1f64.lane_logb(), -4.0);
            assert_eq!(0.0f32.lane_logb(), f32::NEG_INFINITY);
            assert_eq!(f64::NEG_INFINITY.lane_logb(), f64::INFINITY);
            assert!(f32::NAN.lane_logb().is_nan());
            assert_eq!(f32::from_bits(1).lane_logb(), -149.0);
        }

        #[test]
        fn test_cast_follows_as_semantics() {
            assert_eq!(3.9f32.cast::<i32>(), 3);
            assert_eq!((-1.5f64).cast::<u8>(), 0);
            assert_eq!(1e10f32.cast::<i32>(), i32::MAX);
            assert_eq!(f32::NAN.cast::<i16>(), 0);
            assert_eq!(300i32.cast::<u8>(), 44);
            assert_eq!((-1i8).cast::<u32>(), u32::MAX);
            assert_eq!(u64::MAX.cast::<f32>(), u64::MAX as f32);
            assert_eq!(16_777_217i32.cast::<f32>(), 16_777_217i32 as f32);
        }
    }
}
