//! Element-wise math on vectors, named after their `f32`/`f64` counterparts.
//!
//! The basic operations (`sqrt`, `floor`, the classification predicates, ...)
//! forward to the ABI's float implementation. The transcendental functions
//! are written once against the generic vector operations: a range reduction
//! followed by a fixed-degree polynomial whose coefficients come from the
//! element's [`Kernels`] table.
//!
//! | Function | Method | Accuracy |
//! |----------|--------|----------|
//! | `sin`, `cos`, `sincos`, `tan` | octant folding on `[0, π/4]`, three-part π/4 | ~1 ulp on moderate arguments |
//! | `exp` | `n = round(x·log2 e)`, polynomial, `ldexp` | ~1 ulp |
//! | `log`, `log2`, `log10` | `frexp`, `atanh` series | ~1 ulp |
//! | `atan`, `atan2` | two half-angle steps, odd series | a few ulp |
//! | `asin`, `acos` | cephes polynomial (`f32`); per lane (`f64`) | ~1 ulp |
//! | `sinh`, `cosh`, `tanh`, `cbrt`, `exp2`, `pow` | per lane | as `std` |
//!
//! Edge cases follow IEEE-754 and the C math library: `log(0) = -inf`,
//! `log(x < 0) = NaN`, `exp` saturates to `inf`/`0`, `atan2` handles signed
//! zeros and infinities, NaN propagates everywhere.

use crate::simd::abi::AbiTraits;
use crate::simd::element::{SimdFloat, Vectorizable};
use crate::simd::mask::SimdMask;
use crate::simd::simd::{static_simd_cast, Simd};
use crate::simd::traits::{SimdFloatImpl, SimdImpl};

type Impl<T, A> = <A as AbiTraits<T>>::Impl;

/// ABIs with a float implementation for `T`.
pub trait FloatAbi<T: SimdFloat>: AbiTraits<T, Impl: SimdFloatImpl<T>> {}

impl<T: SimdFloat, A: AbiTraits<T, Impl: SimdFloatImpl<T>>> FloatAbi<T> for A {}

/// Constants of the polynomial kernels, per float type.
///
/// Coefficient slices are ordered from the highest power down, ready for
/// Horner evaluation.
pub trait Kernels: Sized + Copy + 'static {
    /// π/4 split in three parts; `DP1` and `DP2` have few enough mantissa
    /// bits that multiples of them are exact.
    const DP1: Self;
    const DP2: Self;
    const DP3: Self;
    /// 4/π.
    const FOPI: Self;
    const SIN: &'static [Self];
    const COS: &'static [Self];

    const EXP: &'static [Self];
    const LOG2E: Self;
    const MAX_LOG: Self;
    const MIN_LOG: Self;

    /// ln 2 split so that `e * LN2_HI` is exact.
    const LN2_HI: Self;
    const LN2_LO: Self;
    const SQRT_HALF: Self;
    const LOG10E: Self;
    const LOG10_2: Self;
    /// `1/(2k+1)` series of `atanh`, without the leading 1.
    const LOG: &'static [Self];

    /// `(-1)^k/(2k+1)` series of `atan`, without the leading 1.
    const ATAN: &'static [Self];
    /// Polynomial of the vectorised `asin`; `None` evaluates per lane.
    const ASIN: Option<&'static [Self]>;

    const PI: Self;
    const FRAC_PI_2: Self;
    const FRAC_PI_4: Self;
}

#[allow(clippy::excessive_precision)]
impl Kernels for f32 {
    const DP1: f32 = 0.78515625;
    const DP2: f32 = 2.4187564849853515625e-4;
    const DP3: f32 = 3.77489497744594108e-8;
    const FOPI: f32 = 1.27323954473516;
    const SIN: &'static [f32] = &[-1.9515295891e-4, 8.3321608736e-3, -1.6666654611e-1];
    const COS: &'static [f32] = &[2.443315711809948e-5, -1.388731625493765e-3, 4.166664568298827e-2];

    const EXP: &'static [f32] = &[
        1.9875691500e-4,
        1.3981999507e-3,
        8.3334519073e-3,
        4.1665795894e-2,
        1.6666665459e-1,
        5.0000001201e-1,
    ];
    const LOG2E: f32 = std::f32::consts::LOG2_E;
    const MAX_LOG: f32 = 88.72283905206835;
    const MIN_LOG: f32 = -103.27892990343185;

    const LN2_HI: f32 = 0.693359375;
    const LN2_LO: f32 = -2.12194440e-4;
    const SQRT_HALF: f32 = std::f32::consts::FRAC_1_SQRT_2;
    const LOG10E: f32 = std::f32::consts::LOG10_E;
    const LOG10_2: f32 = std::f32::consts::LOG10_2;
    const LOG: &'static [f32] = &[1.0 / 9.0, 1.0 / 7.0, 1.0 / 5.0, 1.0 / 3.0];

    const ATAN: &'static [f32] = &[-1.0 / 11.0, 1.0 / 9.0, -1.0 / 7.0, 1.0 / 5.0, -1.0 / 3.0];
    const ASIN: Option<&'static [f32]> = Some(&[
        4.2163199048e-2,
        2.4181311049e-2,
        4.5470025998e-2,
        7.4953002686e-2,
        1.6666752422e-1,
    ]);

    const PI: f32 = std::f32::consts::PI;
    const FRAC_PI_2: f32 = std::f32::consts::FRAC_PI_2;
    const FRAC_PI_4: f32 = std::f32::consts::FRAC_PI_4;
}

#[allow(clippy::excessive_precision)]
impl Kernels for f64 {
    const DP1: f64 = 7.85398125648498535156e-1;
    const DP2: f64 = 3.77489470793079817668e-8;
    const DP3: f64 = 2.69515142907905952645e-15;
    const FOPI: f64 = 1.2732395447351626862;
    const SIN: &'static [f64] = &[
        1.58962301576546568060e-10,
        -2.50507477628578072866e-8,
        2.75573136213857245213e-6,
        -1.98412698295895385996e-4,
        8.33333333332211858878e-3,
        -1.66666666666666307295e-1,
    ];
    const COS: &'static [f64] = &[
        -1.13585365213876817300e-11,
        2.08757008419747316778e-9,
        -2.75573141792967388112e-7,
        2.48015872888517045348e-5,
        -1.38888888888730564116e-3,
        4.16666666666665929218e-2,
    ];

    const EXP: &'static [f64] = &[
        1.0 / 6_227_020_800.0,
        1.0 / 479_001_600.0,
        1.0 / 39_916_800.0,
        1.0 / 3_628_800.0,
        1.0 / 362_880.0,
        1.0 / 40_320.0,
        1.0 / 5_040.0,
        1.0 / 720.0,
        1.0 / 120.0,
        1.0 / 24.0,
        1.0 / 6.0,
        1.0 / 2.0,
    ];
    const LOG2E: f64 = std::f64::consts::LOG2_E;
    const MAX_LOG: f64 = 709.782712893384;
    const MIN_LOG: f64 = -745.1332191019412;

    const LN2_HI: f64 = 6.93145751953125e-1;
    const LN2_LO: f64 = 1.42860682030941723212e-6;
    const SQRT_HALF: f64 = std::f64::consts::FRAC_1_SQRT_2;
    const LOG10E: f64 = std::f64::consts::LOG10_E;
    const LOG10_2: f64 = std::f64::consts::LOG10_2;
    const LOG: &'static [f64] = &[
        1.0 / 21.0,
        1.0 / 19.0,
        1.0 / 17.0,
        1.0 / 15.0,
        1.0 / 13.0,
        1.0 / 11.0,
        1.0 / 9.0,
        1.0 / 7.0,
        1.0 / 5.0,
        1.0 / 3.0,
    ];

    const ATAN: &'static [f64] = &[
        -1.0 / 23.0,
        1.0 / 21.0,
        -1.0 / 19.0,
        1.0 / 17.0,
        -1.0 / 15.0,
        1.0 / 13.0,
        -1.0 / 11.0,
        1.0 / 9.0,
        -1.0 / 7.0,
        1.0 / 5.0,
        -1.0 / 3.0,
    ];
    const ASIN: Option<&'static [f64]> = None;

    const PI: f64 = std::f64::consts::PI;
    const FRAC_PI_2: f64 = std::f64::consts::FRAC_PI_2;
    const FRAC_PI_4: f64 = std::f64::consts::FRAC_PI_4;
}

/// `fpclassify` results.
pub const FP_NAN: i32 = 0;
pub const FP_INFINITE: i32 = 1;
pub const FP_ZERO: i32 = 2;
pub const FP_SUBNORMAL: i32 = 3;
pub const FP_NORMAL: i32 = 4;

#[inline(always)]
fn splat<T: SimdFloat, A: FloatAbi<T>>(value: T) -> Simd<T, A> {
    Simd::splat(value)
}

#[inline(always)]
fn float_unary<T, A>(
    x: Simd<T, A>,
    op: fn(<Impl<T, A> as SimdImpl<T>>::SimdMember) -> <Impl<T, A> as SimdImpl<T>>::SimdMember,
) -> Simd<T, A>
where
    T: SimdFloat,
    A: FloatAbi<T>,
{
    Simd::from_member(op(x.member()))
}

#[inline(always)]
fn per_lane<T: SimdFloat, A: FloatAbi<T>>(x: Simd<T, A>, f: impl Fn(T) -> T) -> Simd<T, A> {
    Simd::from_fn(|i| f(x.get(i)))
}

/// Horner evaluation of `coefficients` (highest power first) at `x`.
#[inline(always)]
fn polynomial<T: SimdFloat, A: FloatAbi<T>>(x: Simd<T, A>, coefficients: &[T]) -> Simd<T, A> {
    match coefficients.split_first() {
        Some((&first, rest)) => rest.iter().fold(splat(first), |acc, &c| acc * x + c),
        None => splat(T::ZERO),
    }
}

// Operations valid for every element type.

#[inline(always)]
pub fn min<T: Vectorizable, A: AbiTraits<T>>(a: Simd<T, A>, b: Simd<T, A>) -> Simd<T, A> {
    Simd::from_member(<Impl<T, A> as SimdImpl<T>>::min(a.member(), b.member()))
}

#[inline(always)]
pub fn max<T: Vectorizable, A: AbiTraits<T>>(a: Simd<T, A>, b: Simd<T, A>) -> Simd<T, A> {
    Simd::from_member(<Impl<T, A> as SimdImpl<T>>::max(a.member(), b.member()))
}

/// `(min(a, b), max(a, b))`.
#[inline(always)]
pub fn minmax<T: Vectorizable, A: AbiTraits<T>>(
    a: Simd<T, A>,
    b: Simd<T, A>,
) -> (Simd<T, A>, Simd<T, A>) {
    let (lo, hi) = <Impl<T, A> as SimdImpl<T>>::minmax(a.member(), b.member());
    (Simd::from_member(lo), Simd::from_member(hi))
}

/// `min(max(x, lo), hi)`; `lo <= hi` is expected lane-wise.
#[inline(always)]
pub fn clamp<T: Vectorizable, A: AbiTraits<T>>(
    x: Simd<T, A>,
    lo: Simd<T, A>,
    hi: Simd<T, A>,
) -> Simd<T, A> {
    min(max(x, lo), hi)
}

/// Absolute value; the most negative integer maps to itself.
#[inline(always)]
pub fn abs<T: Vectorizable, A: AbiTraits<T>>(x: Simd<T, A>) -> Simd<T, A> {
    Simd::from_member(<Impl<T, A> as SimdImpl<T>>::abs(x.member()))
}

// Float basics.

#[inline(always)]
pub fn sqrt<T: SimdFloat, A: FloatAbi<T>>(x: Simd<T, A>) -> Simd<T, A> {
    float_unary(x, <Impl<T, A> as SimdFloatImpl<T>>::sqrt)
}

#[inline(always)]
pub fn floor<T: SimdFloat, A: FloatAbi<T>>(x: Simd<T, A>) -> Simd<T, A> {
    float_unary(x, <Impl<T, A> as SimdFloatImpl<T>>::floor)
}

#[inline(always)]
pub fn ceil<T: SimdFloat, A: FloatAbi<T>>(x: Simd<T, A>) -> Simd<T, A> {
    float_unary(x, <Impl<T, A> as SimdFloatImpl<T>>::ceil)
}

#[inline(always)]
pub fn trunc<T: SimdFloat, A: FloatAbi<T>>(x: Simd<T, A>) -> Simd<T, A> {
    float_unary(x, <Impl<T, A> as SimdFloatImpl<T>>::trunc)
}

/// Rounds half away from zero.
#[inline(always)]
pub fn round<T: SimdFloat, A: FloatAbi<T>>(x: Simd<T, A>) -> Simd<T, A> {
    float_unary(x, <Impl<T, A> as SimdFloatImpl<T>>::round)
}

/// Unbiased exponent as a float: `-inf` for zero, `inf` for infinities.
#[inline(always)]
pub fn logb<T: SimdFloat, A: FloatAbi<T>>(x: Simd<T, A>) -> Simd<T, A> {
    float_unary(x, <Impl<T, A> as SimdFloatImpl<T>>::logb)
}

/// `a * b + c` with one rounding.
#[inline(always)]
pub fn fma<T: SimdFloat, A: FloatAbi<T>>(a: Simd<T, A>, b: Simd<T, A>, c: Simd<T, A>) -> Simd<T, A> {
    Simd::from_member(<Impl<T, A> as SimdFloatImpl<T>>::fma(a.member(), b.member(), c.member()))
}

/// Mantissa in `[0.5, 1)` and integer exponent with `x = m * 2^e`. Zero,
/// infinities and NaN come back unchanged with exponent 0.
#[inline]
pub fn frexp<T, A>(x: Simd<T, A>) -> (Simd<T, A>, Simd<T::SameSizeInt, A>)
where
    T: SimdFloat,
    A: FloatAbi<T> + AbiTraits<T::SameSizeInt>,
{
    let (mantissa, exponent) = <Impl<T, A> as SimdFloatImpl<T>>::frexp(x.member());
    (
        Simd::from_member(mantissa),
        static_simd_cast(Simd::<T, A>::from_member(exponent)),
    )
}

/// `x * 2^exp` without intermediate overflow.
#[inline]
pub fn ldexp<T, A>(x: Simd<T, A>, exp: Simd<T::SameSizeInt, A>) -> Simd<T, A>
where
    T: SimdFloat,
    A: FloatAbi<T> + AbiTraits<T::SameSizeInt>,
{
    let exp: Simd<T, A> = static_simd_cast(exp);
    Simd::from_member(<Impl<T, A> as SimdFloatImpl<T>>::ldexp(x.member(), exp.member()))
}

#[inline(always)]
fn ldexp_float<T: SimdFloat, A: FloatAbi<T>>(x: Simd<T, A>, exp: Simd<T, A>) -> Simd<T, A> {
    Simd::from_member(<Impl<T, A> as SimdFloatImpl<T>>::ldexp(x.member(), exp.member()))
}

// Classification.

macro_rules! classify {
    ($($(#[$doc:meta])* $name:ident;)*) => {$(
        $(#[$doc])*
        #[inline(always)]
        pub fn $name<T: SimdFloat, A: FloatAbi<T>>(x: Simd<T, A>) -> SimdMask<T, A> {
            SimdMask::from_member(<Impl<T, A> as SimdFloatImpl<T>>::$name(x.member()))
        }
    )*};
}

classify! {
    isnan;
    isinf;
    isfinite;
    /// Neither zero, subnormal, infinite nor NaN.
    isnormal;
    /// Sign bit set, including `-0.0` and negative NaNs.
    signbit;
}

/// Either operand is NaN.
#[inline(always)]
pub fn isunordered<T: SimdFloat, A: FloatAbi<T>>(a: Simd<T, A>, b: Simd<T, A>) -> SimdMask<T, A> {
    SimdMask::from_member(<Impl<T, A> as SimdFloatImpl<T>>::isunordered(a.member(), b.member()))
}

/// One of the `FP_*` constants per lane.
pub fn fpclassify<T, A>(x: Simd<T, A>) -> Simd<T::SameSizeInt, A>
where
    T: SimdFloat,
    A: FloatAbi<T> + AbiTraits<T::SameSizeInt>,
{
    let class = |value: i32| Simd::<T::SameSizeInt, A>::splat(<T::SameSizeInt as Vectorizable>::from_i128(value as i128));

    let zero = x.simd_eq(splat(T::ZERO));
    let subnormal = isfinite(x) & !isnormal(x) & !zero;

    let mut result = class(FP_NORMAL);
    result = Simd::select(zero.cast(), class(FP_ZERO), result);
    result = Simd::select(subnormal.cast(), class(FP_SUBNORMAL), result);
    result = Simd::select(isinf(x).cast(), class(FP_INFINITE), result);
    Simd::select(isnan(x).cast(), class(FP_NAN), result)
}

/// Magnitude of `magnitude` with the sign of `sign`.
#[inline]
pub fn copysign<T: SimdFloat, A: FloatAbi<T>>(magnitude: Simd<T, A>, sign: Simd<T, A>) -> Simd<T, A> {
    let m = abs(magnitude);
    Simd::select(signbit(sign), -m, m)
}

/// `sqrt(x² + y²)` without undue overflow or underflow. An infinite operand
/// wins over NaN.
pub fn hypot<T: SimdFloat, A: FloatAbi<T>>(x: Simd<T, A>, y: Simd<T, A>) -> Simd<T, A> {
    let (ax, ay) = (abs(x), abs(y));
    let (lo, hi) = minmax(ax, ay);
    let zero = hi.simd_eq(splat(T::ZERO));

    let ratio = lo / Simd::select(zero, splat(T::ONE), hi);
    let mut r = hi * sqrt(ratio * ratio + T::ONE);

    r = Simd::select(zero, splat(T::ZERO), r);
    r = Simd::select(isunordered(x, y), x + y, r);
    Simd::select(isinf(ax) | isinf(ay), splat(T::infinity()), r)
}

// Trigonometry.

/// `x` folded into `[-π/4, π/4]` around the nearest even multiple of π/4,
/// with the masks selecting the series and the sign.
struct Octant<T: SimdFloat, A: FloatAbi<T>> {
    z: Simd<T, A>,
    /// Second half turn.
    upper: SimdMask<T, A>,
    /// Odd quarter turn: `sin` and `cos` swap series.
    swap: SimdMask<T, A>,
}

#[inline(always)]
fn fold_octant<T: SimdFloat, A: FloatAbi<T>>(x: Simd<T, A>) -> Octant<T, A> {
    let two = splat::<T, A>(T::ONE + T::ONE);
    let ax = abs(x);

    let mut y = floor(ax * T::FOPI);
    let odd = (y - floor(y / two) * two).simd_eq(splat(T::ONE));
    y = Simd::select(odd, y + T::ONE, y);

    let eight = two * two * two;
    let mut octant = y - floor(y / eight) * eight;
    let four = two * two;
    let upper = octant.simd_ge(four);
    octant = Simd::select(upper, octant - four, octant);

    Octant {
        z: ((ax - y * T::DP1) - y * T::DP2) - y * T::DP3,
        upper,
        swap: octant.simd_eq(two),
    }
}

#[inline(always)]
fn sin_series<T: SimdFloat, A: FloatAbi<T>>(z: Simd<T, A>, zz: Simd<T, A>) -> Simd<T, A> {
    z + z * zz * polynomial(zz, T::SIN)
}

#[inline(always)]
fn cos_series<T: SimdFloat, A: FloatAbi<T>>(zz: Simd<T, A>) -> Simd<T, A> {
    let half = splat::<T, A>(T::ONE) / (T::ONE + T::ONE);
    splat::<T, A>(T::ONE) - half * zz + zz * zz * polynomial(zz, T::COS)
}

/// `(sin x, cos x)` sharing one range reduction.
pub fn sincos<T: SimdFloat, A: FloatAbi<T>>(x: Simd<T, A>) -> (Simd<T, A>, Simd<T, A>) {
    let Octant { z, upper, swap } = fold_octant(x);
    let zz = z * z;
    let (s, c) = (sin_series(z, zz), cos_series(zz));

    let sin = Simd::select(swap, c, s);
    let cos = Simd::select(swap, s, c);
    (
        Simd::select(signbit(x) ^ upper, -sin, sin),
        Simd::select(upper ^ swap, -cos, cos),
    )
}

/// ```rust
/// use simdabi::simd::{sin, NativeSimd};
///
/// let x = sin(NativeSimd::<f64>::splat(0.0));
/// assert_eq!(x.get(0), 0.0);
/// ```
#[inline]
pub fn sin<T: SimdFloat, A: FloatAbi<T>>(x: Simd<T, A>) -> Simd<T, A> {
    sincos(x).0
}

#[inline]
pub fn cos<T: SimdFloat, A: FloatAbi<T>>(x: Simd<T, A>) -> Simd<T, A> {
    sincos(x).1
}

#[inline]
pub fn tan<T: SimdFloat, A: FloatAbi<T>>(x: Simd<T, A>) -> Simd<T, A> {
    let (s, c) = sincos(x);
    s / c
}

/// Arcsine on `[-1, 1]`, NaN outside.
pub fn asin<T: SimdFloat, A: FloatAbi<T>>(x: Simd<T, A>) -> Simd<T, A> {
    let Some(coefficients) = T::ASIN else {
        return per_lane(x, <T as num::Float>::asin);
    };

    let one = splat::<T, A>(T::ONE);
    let half = one / (T::ONE + T::ONE);
    let a = abs(x);
    let big = a.simd_gt(half);

    let z = Simd::select(big, half * (one - a), a * a);
    let s = Simd::select(big, sqrt(z), a);
    let p = polynomial(z, coefficients) * z * s + s;

    let r = Simd::select(big, splat::<T, A>(T::FRAC_PI_2) - (p + p), p);
    let r = copysign(r, x);
    Simd::select(a.simd_gt(one), splat(T::nan()), r)
}

/// Arccosine on `[-1, 1]`, NaN outside.
pub fn acos<T: SimdFloat, A: FloatAbi<T>>(x: Simd<T, A>) -> Simd<T, A> {
    if T::ASIN.is_none() {
        return per_lane(x, <T as num::Float>::acos);
    }

    let one = splat::<T, A>(T::ONE);
    let half = one / (T::ONE + T::ONE);
    let low = x.simd_lt(-half);
    let high = x.simd_gt(half);

    let folded = Simd::select(low, half * (one + x), half * (one - x));
    let tail = asin(sqrt(folded));
    let mut r = splat::<T, A>(T::FRAC_PI_2) - asin(x);
    r = Simd::select(high, tail + tail, r);
    Simd::select(low, splat::<T, A>(T::PI) - (tail + tail), r)
}

/// Arctangent in `(-π/2, π/2)`.
pub fn atan<T: SimdFloat, A: FloatAbi<T>>(x: Simd<T, A>) -> Simd<T, A> {
    let one = splat::<T, A>(T::ONE);
    let ax = abs(x);
    let invert = ax.simd_gt(one);
    let mut t = Simd::select(invert, one / ax, ax);

    // atan(t) = 2 atan(t / (1 + sqrt(1 + t²)))
    for _ in 0..2 {
        t = t / (one + sqrt(one + t * t));
    }
    let t2 = t * t;
    let r = (t + t * t2 * polynomial(t2, T::ATAN)) * (T::ONE + T::ONE + T::ONE + T::ONE);

    let r = Simd::select(invert, splat::<T, A>(T::FRAC_PI_2) - r, r);
    copysign(r, x)
}

/// Angle of the point `(x, y)` in `[-π, π]`, with the C library's handling
/// of signed zeros and infinities.
pub fn atan2<T: SimdFloat, A: FloatAbi<T>>(y: Simd<T, A>, x: Simd<T, A>) -> Simd<T, A> {
    let zero = splat::<T, A>(T::ZERO);
    let pi = splat::<T, A>(T::PI);
    let x_negative = signbit(x);

    let q = atan(y / x);
    let mut r = Simd::select(x_negative, q + copysign(pi, y), q);

    let x_zero = x.simd_eq(zero);
    let y_zero = y.simd_eq(zero);
    r = Simd::select(x_zero & !y_zero, copysign(splat(T::FRAC_PI_2), y), r);
    r = Simd::select(y_zero, Simd::select(x_negative, copysign(pi, y), y), r);

    let quarter = Simd::select(
        x_negative,
        splat::<T, A>(T::FRAC_PI_4) * (T::ONE + T::ONE + T::ONE),
        splat(T::FRAC_PI_4),
    );
    r = Simd::select(isinf(x) & isinf(y), copysign(quarter, y), r);
    Simd::select(isunordered(x, y), x + y, r)
}

// Exponentials and logarithms.

/// `e^x`, saturating to `inf` above the largest finite result and to `0`
/// below the smallest subnormal.
pub fn exp<T: SimdFloat, A: FloatAbi<T>>(x: Simd<T, A>) -> Simd<T, A> {
    let half = splat::<T, A>(T::ONE) / (T::ONE + T::ONE);
    let n = floor(x * T::LOG2E + half);
    let r = (x - n * T::LN2_HI) - n * T::LN2_LO;

    let y = polynomial(r, T::EXP) * r * r + r + T::ONE;
    let y = ldexp_float(y, n);

    let y = Simd::select(x.simd_gt(splat(T::MAX_LOG)), splat(T::infinity()), y);
    Simd::select(x.simd_lt(splat(T::MIN_LOG)), splat(T::ZERO), y)
}

/// `x = 2^e * m` with `m` in `[√½, √2)`: returns `e` and `log(m)`.
#[inline(always)]
fn log_parts<T: SimdFloat, A: FloatAbi<T>>(x: Simd<T, A>) -> (Simd<T, A>, Simd<T, A>) {
    let (m, e) = <Impl<T, A> as SimdFloatImpl<T>>::frexp(x.member());
    let (mut m, mut e) = (Simd::<T, A>::from_member(m), Simd::<T, A>::from_member(e));

    let small = m.simd_lt(splat(T::SQRT_HALF));
    m = Simd::select(small, m + m, m);
    e = Simd::select(small, e - T::ONE, e);

    let s = (m - T::ONE) / (m + T::ONE);
    let s2 = s * s;
    let two_s = s + s;
    (e, two_s + two_s * s2 * polynomial(s2, T::LOG))
}

#[inline(always)]
fn log_edges<T: SimdFloat, A: FloatAbi<T>>(x: Simd<T, A>, r: Simd<T, A>) -> Simd<T, A> {
    let zero = splat::<T, A>(T::ZERO);
    let r = Simd::select(x.simd_lt(zero), splat(T::nan()), r);
    let r = Simd::select(x.simd_eq(zero), splat(T::neg_infinity()), r);
    Simd::select(x.simd_eq(splat(T::infinity())), x, r)
}

/// Natural logarithm: `-inf` at zero, NaN for negative input.
pub fn log<T: SimdFloat, A: FloatAbi<T>>(x: Simd<T, A>) -> Simd<T, A> {
    let (e, log_m) = log_parts(x);
    log_edges(x, e * T::LN2_HI + (log_m + e * T::LN2_LO))
}

pub fn log2<T: SimdFloat, A: FloatAbi<T>>(x: Simd<T, A>) -> Simd<T, A> {
    let (e, log_m) = log_parts(x);
    log_edges(x, e + log_m * T::LOG2E)
}

pub fn log10<T: SimdFloat, A: FloatAbi<T>>(x: Simd<T, A>) -> Simd<T, A> {
    let (e, log_m) = log_parts(x);
    log_edges(x, e * T::LOG10_2 + log_m * T::LOG10E)
}

// Lane-wise fallbacks.

pub fn sinh<T: SimdFloat, A: FloatAbi<T>>(x: Simd<T, A>) -> Simd<T, A> {
    per_lane(x, <T as num::Float>::sinh)
}

pub fn cosh<T: SimdFloat, A: FloatAbi<T>>(x: Simd<T, A>) -> Simd<T, A> {
    per_lane(x, <T as num::Float>::cosh)
}

pub fn tanh<T: SimdFloat, A: FloatAbi<T>>(x: Simd<T, A>) -> Simd<T, A> {
    per_lane(x, <T as num::Float>::tanh)
}

pub fn cbrt<T: SimdFloat, A: FloatAbi<T>>(x: Simd<T, A>) -> Simd<T, A> {
    per_lane(x, <T as num::Float>::cbrt)
}

pub fn exp2<T: SimdFloat, A: FloatAbi<T>>(x: Simd<T, A>) -> Simd<T, A> {
    per_lane(x, <T as num::Float>::exp2)
}

pub fn pow<T: SimdFloat, A: FloatAbi<T>>(x: Simd<T, A>, y: Simd<T, A>) -> Simd<T, A> {
    Simd::from_fn(|i| <T as num::Float>::powf(x.get(i), y.get(i)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simd::simd::{FixedSizeSimd, NativeSimd, ScalarSimd};

    fn assert_close<T: SimdFloat, A: FloatAbi<T>>(actual: Simd<T, A>, expected: impl Fn(usize) -> f64, tol: f64) {
        for i in 0..Simd::<T, A>::LANES {
            let (got, want) = (Vectorizable::to_f64(actual.get(i)), expected(i));
            let scale = want.abs().max(1.0);
            assert!(
                (got - want).abs() <= tol * scale,
                "lane {i}: got {got}, expected {want}"
            );
        }
    }

    mod basic_tests {
        use super::*;

        #[test]
        fn test_min_max_clamp() {
            let a = FixedSizeSimd::<i32, 4>::from_array([1, -5, 7, 0]);
            let b = FixedSizeSimd::<i32, 4>::from_array([2, -6, 7, -1]);
            assert_eq!(min(a, b).to_vec(), vec![1, -6, 7, -1]);
            assert_eq!(max(a, b).to_vec(), vec![2, -5, 7, 0]);
            let (lo, hi) = minmax(a, b);
            assert_eq!((lo, hi), (min(a, b), max(a, b)));

            let c = clamp(a, FixedSizeSimd::splat(-1), FixedSizeSimd::splat(3));
            assert_eq!(c.to_vec(), vec![1, -1, 3, 0]);
            assert_eq!(abs(FixedSizeSimd::<i8, 3>::from_array([-3, i8::MIN, 4])).to_vec(), vec![3, i8::MIN, 4]);
        }

        #[test]
        fn test_rounding_family() {
            let x = FixedSizeSimd::<f64, 5>::from_array([-2.5, -0.4, 0.5, 1.5, 2.7]);
            assert_eq!(floor(x).to_vec(), vec![-3.0, -1.0, 0.0, 1.0, 2.0]);
            assert_eq!(ceil(x).to_vec(), vec![-2.0, -0.0, 1.0, 2.0, 3.0]);
            assert_eq!(trunc(x).to_vec(), vec![-2.0, -0.0, 0.0, 1.0, 2.0]);
            assert_eq!(round(x).to_vec(), vec![-3.0, -0.0, 1.0, 2.0, 3.0]);
        }

        #[test]
        fn test_frexp_ldexp_integer_exponents() {
            let x = NativeSimd::<f32>::from_fn(|i| (i as f32 + 1.0) * 3.0);
            let (m, e) = frexp(x);
            for i in 0..NativeSimd::<f32>::LANES {
                let (lm, le) = x.get(i).lane_frexp();
                assert_eq!((m.get(i), e.get(i)), (lm, le));
            }
            assert_eq!(ldexp(m, e), x);
        }

        #[test]
        fn test_classification() {
            let x = FixedSizeSimd::<f64, 6>::from_array([1.0, 0.0, f64::MIN_POSITIVE / 4.0, f64::INFINITY, f64::NAN, -0.0]);
            assert_eq!(isnan(x).to_bitset(), 0b010000);
            assert_eq!(isinf(x).to_bitset(), 0b001000);
            assert_eq!(isfinite(x).to_bitset(), 0b100111);
            assert_eq!(isnormal(x).to_bitset(), 0b000001);
            assert_eq!(signbit(x).to_bitset(), 0b100000);
            assert_eq!(
                fpclassify(x).to_vec(),
                vec![FP_NORMAL as i64, FP_ZERO as i64, FP_SUBNORMAL as i64, FP_INFINITE as i64, FP_NAN as i64, FP_ZERO as i64]
            );
        }

        #[test]
        fn test_copysign_and_hypot() {
            let m = FixedSizeSimd::<f32, 4>::from_array([1.0, -2.0, 3.0, 0.0]);
            let s = FixedSizeSimd::<f32, 4>::from_array([-1.0, 1.0, -0.0, -5.0]);
            assert_eq!(copysign(m, s).to_vec(), vec![-1.0, 2.0, -3.0, -0.0]);

            let x = FixedSizeSimd::<f64, 4>::from_array([3.0, 0.0, f64::NAN, 1e300]);
            let y = FixedSizeSimd::<f64, 4>::from_array([4.0, 0.0, f64::INFINITY, 1e300]);
            let h = hypot(x, y);
            assert_eq!(h.get(0), 5.0);
            assert_eq!(h.get(1), 0.0);
            assert_eq!(h.get(2), f64::INFINITY);
            assert!((h.get(3) / 1e300 - std::f64::consts::SQRT_2).abs() < 1e-15);
        }
    }

    mod trig_tests {
        use super::*;

        #[test]
        fn test_sin_cos_zero() {
            assert_eq!(sin(NativeSimd::<f64>::splat(0.0)).get(0), 0.0);
            assert_eq!(cos(NativeSimd::<f64>::splat(0.0)).get(0), 1.0);
            assert!(signbit(sin(ScalarSimd::<f32>::splat(-0.0))).get(0));
        }

        #[test]
        fn test_sincos_all_octants() {
            let x = FixedSizeSimd::<f64, 16>::from_fn(|i| (i as f64 - 8.0) * 0.83);
            let (s, c) = sincos(x);
            assert_close(s, |i| ((i as f64 - 8.0) * 0.83).sin(), 1e-15);
            assert_close(c, |i| ((i as f64 - 8.0) * 0.83).cos(), 1e-15);

            let y = FixedSizeSimd::<f32, 16>::from_fn(|i| (i as f32 - 8.0) * 0.83);
            assert_close(sin(y), |i| ((i as f32 - 8.0) * 0.83).sin() as f64, 4e-7);
            assert_close(cos(y), |i| ((i as f32 - 8.0) * 0.83).cos() as f64, 4e-7);
        }

        #[test]
        fn test_sin_of_non_finite_is_nan() {
            let x = FixedSizeSimd::<f32, 2>::from_array([f32::INFINITY, f32::NAN]);
            assert_eq!(isnan(sin(x)).to_bitset(), 0b11);
            assert_eq!(isnan(cos(x)).to_bitset(), 0b11);
        }

        #[test]
        fn test_inverse_functions() {
            let x = FixedSizeSimd::<f32, 9>::from_fn(|i| i as f32 / 4.0 - 1.0);
            assert_close(asin(x), |i| (i as f32 / 4.0 - 1.0).asin() as f64, 5e-7);
            assert_close(acos(x), |i| (i as f32 / 4.0 - 1.0).acos() as f64, 5e-7);
            assert!(isnan(asin(FixedSizeSimd::<f32, 1>::splat(1.5))).get(0));

            let t = FixedSizeSimd::<f64, 7>::from_array([-1e9, -3.0, -0.5, 0.0, 0.25, 1.0, 40.0]);
            assert_close(atan(t), |i| [-1e9f64, -3.0, -0.5, 0.0, 0.25, 1.0, 40.0][i].atan(), 4e-15);
        }

        #[test]
        fn test_atan2_quadrants_and_edges() {
            let cases: [(f64, f64); 12] = [
                (1.0, 1.0),
                (1.0, -1.0),
                (-1.0, -1.0),
                (-1.0, 1.0),
                (0.0, -0.0),
                (-0.0, -0.0),
                (0.0, 0.0),
                (2.0, 0.0),
                (f64::INFINITY, f64::NEG_INFINITY),
                (-3.0, f64::NEG_INFINITY),
                (f64::INFINITY, 5.0),
                (f64::NAN, 1.0),
            ];
            let y = FixedSizeSimd::<f64, 12>::from_fn(|i| cases[i].0);
            let x = FixedSizeSimd::<f64, 12>::from_fn(|i| cases[i].1);
            let r = atan2(y, x);
            for (i, &(yy, xx)) in cases.iter().enumerate() {
                let want = yy.atan2(xx);
                let got = r.get(i);
                if want.is_nan() {
                    assert!(got.is_nan(), "case {i}");
                } else {
                    assert!((got - want).abs() <= 4e-15 * want.abs().max(1.0), "case {i}: {got} vs {want}");
                    assert_eq!(got.is_sign_negative(), want.is_sign_negative(), "sign of case {i}");
                }
            }
        }
    }

    mod exp_log_tests {
        use super::*;

        #[test]
        fn test_exp_range_and_saturation() {
            let x = FixedSizeSimd::<f64, 8>::from_array([-700.0, -10.0, -1.0, 0.0, 0.5, 1.0, 10.0, 700.0]);
            assert_close(exp(x), |i| [-700.0f64, -10.0, -1.0, 0.0, 0.5, 1.0, 10.0, 700.0][i].exp(), 1e-14);

            let edges = FixedSizeSimd::<f32, 3>::from_array([100.0, -200.0, f32::NAN]);
            let e = exp(edges);
            assert_eq!(e.get(0), f32::INFINITY);
            assert_eq!(e.get(1), 0.0);
            assert!(e.get(2).is_nan());
        }

        #[test]
        fn test_log_family() {
            let x = FixedSizeSimd::<f64, 6>::from_array([1e-310, 0.1, 1.0, 2.0, 10.0, 1e300]);
            let data = [1e-310f64, 0.1, 1.0, 2.0, 10.0, 1e300];
            assert_close(log(x), |i| data[i].ln(), 1e-15);
            assert_close(log2(x), |i| data[i].log2(), 1e-15);
            assert_close(log10(x), |i| data[i].log10(), 1e-15);

            let edges = FixedSizeSimd::<f32, 4>::from_array([0.0, -1.0, f32::INFINITY, f32::NAN]);
            let l = log(edges);
            assert_eq!(l.get(0), f32::NEG_INFINITY);
            assert!(l.get(1).is_nan());
            assert_eq!(l.get(2), f32::INFINITY);
            assert!(l.get(3).is_nan());
        }

        #[test]
        fn test_lane_wise_fallbacks() {
            let x = FixedSizeSimd::<f64, 3>::from_array([-1.5, 0.25, 8.0]);
            assert_eq!(cbrt(x).get(2), 2.0);
            assert_eq!(exp2(x).get(2), 256.0);
            assert_eq!(pow(x, FixedSizeSimd::splat(2.0)).get(0), 2.25);
            assert_close(tanh(x), |i| [-1.5f64, 0.25, 8.0][i].tanh(), 1e-15);
            assert_close(sinh(x), |i| [-1.5f64, 0.25, 8.0][i].sinh(), 1e-15);
            assert_close(cosh(x), |i| [-1.5f64, 0.25, 8.0][i].cosh(), 1e-15);
        }
    }
}
