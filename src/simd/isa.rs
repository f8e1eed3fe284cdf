//! Instruction-set markers and the per-register primitive layer.
//!
//! Every register ISA (SSE, AVX, AVX512, NEON) is a zero-sized marker type
//! implementing [`Isa`]. For each element type the ISA module implements
//! [`IsaLane`] (and [`IsaIntLane`] / [`IsaFloatLane`]), naming the raw register
//! and mask register and overriding the primitives it has instructions for.
//!
//! Every primitive has a lane-wise default written against the `lane_*`
//! reference semantics of [`Vectorizable`]. Element/ISA pairs without native
//! support (AVX1 integers, AVX512 byte lanes without AVX512BW) simply keep the
//! defaults, so the generic register implementation works for all of them.
//!
//! Primitives operate on the full register. Partial-width ABIs carry padding
//! lanes whose content is unspecified; callers truncate masks to the lanes they
//! own.

use std::fmt;
use std::mem;

use crate::simd::element::{SimdFloat, SimdInteger, Vectorizable};
use crate::simd::storage::{Register, Storage};

/// Register families, used to pick chunk ABIs and conversion fast paths.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IsaFamily {
    Sse,
    Avx,
    Avx512,
    Neon,
}

impl IsaFamily {
    /// Width of one register in bytes.
    pub const fn register_bytes(self) -> usize {
        match self {
            IsaFamily::Sse | IsaFamily::Neon => 16,
            IsaFamily::Avx => 32,
            IsaFamily::Avx512 => 64,
        }
    }
}

/// A register instruction set.
pub trait Isa: Copy + Default + fmt::Debug + Send + Sync + 'static {
    const NAME: &'static str;
    const FAMILY: IsaFamily;
    const REGISTER_BYTES: usize = Self::FAMILY.register_bytes();
}

macro_rules! isa_marker {
    ($(#[$doc:meta])* $name:ident, $family:ident, $label:literal) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
        pub struct $name;

        impl Isa for $name {
            const NAME: &'static str = $label;
            const FAMILY: IsaFamily = IsaFamily::$family;
        }
    };
}

isa_marker!(
    /// SSE2 and later, 128-bit `xmm` registers.
    Sse, Sse, "sse"
);
isa_marker!(
    /// AVX / AVX2, 256-bit `ymm` registers.
    Avx, Avx, "avx"
);
isa_marker!(
    /// AVX512, 512-bit `zmm` registers with `k` mask registers.
    Avx512, Avx512, "avx512"
);
isa_marker!(
    /// AArch64 Advanced SIMD, 128-bit `v` registers.
    Neon, Neon, "neon"
);

#[inline(always)]
pub(crate) fn map_lanes<T: Vectorizable, R: Register>(a: R, f: impl Fn(T) -> T) -> R {
    let a = Storage::<T, R>::from_raw(a);
    let mut out = a;
    for i in 0..Storage::<T, R>::CAPACITY {
        out.set(i, f(a.get(i)));
    }
    out.raw()
}

#[inline(always)]
pub(crate) fn zip_lanes<T: Vectorizable, R: Register>(a: R, b: R, f: impl Fn(T, T) -> T) -> R {
    let a = Storage::<T, R>::from_raw(a);
    let b = Storage::<T, R>::from_raw(b);
    let mut out = a;
    for i in 0..Storage::<T, R>::CAPACITY {
        out.set(i, f(a.get(i), b.get(i)));
    }
    out.raw()
}

#[inline(always)]
pub(crate) fn zip3_lanes<T: Vectorizable, R: Register>(
    a: R,
    b: R,
    c: R,
    f: impl Fn(T, T, T) -> T,
) -> R {
    let a = Storage::<T, R>::from_raw(a);
    let b = Storage::<T, R>::from_raw(b);
    let c = Storage::<T, R>::from_raw(c);
    let mut out = a;
    for i in 0..Storage::<T, R>::CAPACITY {
        out.set(i, f(a.get(i), b.get(i), c.get(i)));
    }
    out.raw()
}

/// Bit `i` set where `f(a[i], b[i])` holds.
#[inline(always)]
pub(crate) fn test_lanes<T: Vectorizable, R: Register>(a: R, b: R, f: impl Fn(T, T) -> bool) -> u64 {
    let a = Storage::<T, R>::from_raw(a);
    let b = Storage::<T, R>::from_raw(b);
    let mut bits = 0;
    for i in 0..Storage::<T, R>::CAPACITY {
        if f(a.get(i), b.get(i)) {
            bits |= 1 << i;
        }
    }
    bits
}

/// `value` with every lane whose `divisor` lane is zero cleared.
#[inline(always)]
pub(crate) fn clear_zero_divisor_lanes<I: Isa, T: IsaLane<I>>(
    value: T::Reg,
    divisor: T::Reg,
) -> T::Reg {
    let zero = T::splat(T::ZERO);
    T::blend(T::cmp_eq(divisor, zero), value, zero)
}

/// Primitive operations on one register of `Self` lanes for ISA `I`.
///
/// Masks are held in `MaskReg`: a full-width register with all-ones /
/// all-zeros lanes for SSE, AVX and NEON, a `k` register for AVX512.
pub trait IsaLane<I: Isa>: Vectorizable {
    type Reg: Register;
    type MaskReg: Register;

    /// Lanes in one register.
    const CAPACITY: usize = mem::size_of::<Self::Reg>() / mem::size_of::<Self>();

    #[inline(always)]
    fn zeroed() -> Self::Reg {
        Storage::<Self, Self::Reg>::zeroed().raw()
    }

    #[inline(always)]
    fn splat(x: Self) -> Self::Reg {
        map_lanes(Self::zeroed(), |_: Self| x)
    }

    /// # Safety
    ///
    /// `ptr` must be valid for reading a full register and aligned to its size.
    #[inline(always)]
    unsafe fn load_aligned(ptr: *const Self) -> Self::Reg {
        ptr.cast::<Self::Reg>().read()
    }

    /// # Safety
    ///
    /// `ptr` must be valid for reading a full register.
    #[inline(always)]
    unsafe fn load_unaligned(ptr: *const Self) -> Self::Reg {
        ptr.cast::<Self::Reg>().read_unaligned()
    }

    /// # Safety
    ///
    /// `ptr` must be valid for writing a full register and aligned to its size.
    #[inline(always)]
    unsafe fn store_aligned(ptr: *mut Self, a: Self::Reg) {
        ptr.cast::<Self::Reg>().write(a)
    }

    /// # Safety
    ///
    /// `ptr` must be valid for writing a full register.
    #[inline(always)]
    unsafe fn store_unaligned(ptr: *mut Self, a: Self::Reg) {
        ptr.cast::<Self::Reg>().write_unaligned(a)
    }

    /// Lanes selected by `k` come from `ptr`, the rest from `src`.
    ///
    /// # Safety
    ///
    /// `ptr.add(i)` must be readable for every lane `i` selected by `k`.
    #[inline(always)]
    unsafe fn masked_load(src: Self::Reg, k: Self::MaskReg, ptr: *const Self) -> Self::Reg {
        let bits = Self::mask_to_bits(k);
        let mut out = Storage::<Self, Self::Reg>::from_raw(src);
        for i in 0..Self::CAPACITY {
            if (bits >> i) & 1 == 1 {
                out.set(i, ptr.add(i).read_unaligned());
            }
        }
        out.raw()
    }

    /// # Safety
    ///
    /// `ptr.add(i)` must be writable for every lane `i` selected by `k`.
    #[inline(always)]
    unsafe fn masked_store(a: Self::Reg, k: Self::MaskReg, ptr: *mut Self) {
        let bits = Self::mask_to_bits(k);
        let a = Storage::<Self, Self::Reg>::from_raw(a);
        for i in 0..Self::CAPACITY {
            if (bits >> i) & 1 == 1 {
                ptr.add(i).write_unaligned(a.get(i));
            }
        }
    }

    #[inline(always)]
    fn add(a: Self::Reg, b: Self::Reg) -> Self::Reg {
        zip_lanes(a, b, Self::lane_add)
    }

    #[inline(always)]
    fn sub(a: Self::Reg, b: Self::Reg) -> Self::Reg {
        zip_lanes(a, b, Self::lane_sub)
    }

    #[inline(always)]
    fn mul(a: Self::Reg, b: Self::Reg) -> Self::Reg {
        zip_lanes(a, b, Self::lane_mul)
    }

    #[inline(always)]
    fn div(a: Self::Reg, b: Self::Reg) -> Self::Reg {
        zip_lanes(a, b, Self::lane_div)
    }

    #[inline(always)]
    fn neg(a: Self::Reg) -> Self::Reg {
        map_lanes(a, Self::lane_neg)
    }

    #[inline(always)]
    fn abs(a: Self::Reg) -> Self::Reg {
        map_lanes(a, Self::lane_abs)
    }

    #[inline(always)]
    fn min(a: Self::Reg, b: Self::Reg) -> Self::Reg {
        zip_lanes(a, b, Self::lane_min)
    }

    #[inline(always)]
    fn max(a: Self::Reg, b: Self::Reg) -> Self::Reg {
        zip_lanes(a, b, Self::lane_max)
    }

    #[inline(always)]
    fn bit_and(a: Self::Reg, b: Self::Reg) -> Self::Reg {
        zip_lanes(a, b, Self::lane_and)
    }

    #[inline(always)]
    fn bit_or(a: Self::Reg, b: Self::Reg) -> Self::Reg {
        zip_lanes(a, b, Self::lane_or)
    }

    #[inline(always)]
    fn bit_xor(a: Self::Reg, b: Self::Reg) -> Self::Reg {
        zip_lanes(a, b, Self::lane_xor)
    }

    /// `!a & b`.
    #[inline(always)]
    fn andnot(a: Self::Reg, b: Self::Reg) -> Self::Reg {
        zip_lanes(a, b, |x: Self, y: Self| x.lane_not().lane_and(y))
    }

    #[inline(always)]
    fn bit_not(a: Self::Reg) -> Self::Reg {
        map_lanes(a, Self::lane_not)
    }

    #[inline(always)]
    fn cmp_eq(a: Self::Reg, b: Self::Reg) -> Self::MaskReg {
        Self::mask_from_bits(test_lanes(a, b, |x: Self, y: Self| x == y))
    }

    #[inline(always)]
    fn cmp_lt(a: Self::Reg, b: Self::Reg) -> Self::MaskReg {
        Self::mask_from_bits(test_lanes(a, b, |x: Self, y: Self| x < y))
    }

    #[inline(always)]
    fn cmp_le(a: Self::Reg, b: Self::Reg) -> Self::MaskReg {
        Self::mask_from_bits(test_lanes(a, b, |x: Self, y: Self| x <= y))
    }

    /// `b` where `k` is set, `a` elsewhere.
    #[inline(always)]
    fn blend(k: Self::MaskReg, a: Self::Reg, b: Self::Reg) -> Self::Reg {
        let bits = Self::mask_to_bits(k);
        let a = Storage::<Self, Self::Reg>::from_raw(a);
        let b = Storage::<Self, Self::Reg>::from_raw(b);
        let mut out = a;
        for i in 0..Self::CAPACITY {
            if (bits >> i) & 1 == 1 {
                out.set(i, b.get(i));
            }
        }
        out.raw()
    }

    /// One bit per lane (movemask).
    #[inline(always)]
    fn mask_to_bits(k: Self::MaskReg) -> u64 {
        let k = Storage::<Self, Self::MaskReg>::from_raw(k);
        let mut bits = 0;
        for i in 0..Storage::<Self, Self::MaskReg>::CAPACITY {
            if k.get(i).to_bits() != 0 {
                bits |= 1 << i;
            }
        }
        bits
    }

    #[inline(always)]
    fn mask_from_bits(bits: u64) -> Self::MaskReg {
        let mut k = Storage::<Self, Self::MaskReg>::zeroed();
        for i in 0..Storage::<Self, Self::MaskReg>::CAPACITY {
            if (bits >> i) & 1 == 1 {
                k.set(i, Self::from_bits(u64::MAX));
            }
        }
        k.raw()
    }

    #[inline(always)]
    fn mask_and(a: Self::MaskReg, b: Self::MaskReg) -> Self::MaskReg {
        Self::mask_from_bits(Self::mask_to_bits(a) & Self::mask_to_bits(b))
    }

    #[inline(always)]
    fn mask_or(a: Self::MaskReg, b: Self::MaskReg) -> Self::MaskReg {
        Self::mask_from_bits(Self::mask_to_bits(a) | Self::mask_to_bits(b))
    }

    #[inline(always)]
    fn mask_xor(a: Self::MaskReg, b: Self::MaskReg) -> Self::MaskReg {
        Self::mask_from_bits(Self::mask_to_bits(a) ^ Self::mask_to_bits(b))
    }

    #[inline(always)]
    fn mask_not(a: Self::MaskReg) -> Self::MaskReg {
        Self::mask_from_bits(!Self::mask_to_bits(a))
    }

    /// Lane `i` of the result is lane `i + lanes` of `a`; the top is zero.
    #[inline(always)]
    fn shift_down(a: Self::Reg, lanes: usize) -> Self::Reg {
        let a = Storage::<Self, Self::Reg>::from_raw(a);
        let mut out = Storage::<Self, Self::Reg>::zeroed();
        for i in 0..Self::CAPACITY.saturating_sub(lanes) {
            out.set(i, a.get(i + lanes));
        }
        out.raw()
    }
}

/// Integer-only primitives.
pub trait IsaIntLane<I: Isa>: IsaLane<I> + SimdInteger {
    /// `a - (a / b) * b`, zero where `b` is zero.
    #[inline(always)]
    fn rem(a: Self::Reg, b: Self::Reg) -> Self::Reg {
        let quotient = <Self as IsaLane<I>>::div(a, b);
        let rem = <Self as IsaLane<I>>::sub(a, <Self as IsaLane<I>>::mul(quotient, b));
        clear_zero_divisor_lanes::<I, Self>(rem, b)
    }

    #[inline(always)]
    fn shl(a: Self::Reg, b: Self::Reg) -> Self::Reg {
        zip_lanes(a, b, |x: Self, n: Self| x.lane_shl(n.shift_count()))
    }

    #[inline(always)]
    fn shr(a: Self::Reg, b: Self::Reg) -> Self::Reg {
        zip_lanes(a, b, |x: Self, n: Self| x.lane_shr(n.shift_count()))
    }

    #[inline(always)]
    fn shl_scalar(a: Self::Reg, count: u32) -> Self::Reg {
        map_lanes(a, |x: Self| x.lane_shl(count as u64))
    }

    #[inline(always)]
    fn shr_scalar(a: Self::Reg, count: u32) -> Self::Reg {
        map_lanes(a, |x: Self| x.lane_shr(count as u64))
    }
}

/// Float-only primitives.
pub trait IsaFloatLane<I: Isa>: IsaLane<I> + SimdFloat {
    #[inline(always)]
    fn sqrt(a: Self::Reg) -> Self::Reg {
        map_lanes(a, <Self as num::Float>::sqrt)
    }

    #[inline(always)]
    fn floor(a: Self::Reg) -> Self::Reg {
        map_lanes(a, <Self as num::Float>::floor)
    }

    #[inline(always)]
    fn ceil(a: Self::Reg) -> Self::Reg {
        map_lanes(a, <Self as num::Float>::ceil)
    }

    #[inline(always)]
    fn trunc(a: Self::Reg) -> Self::Reg {
        map_lanes(a, <Self as num::Float>::trunc)
    }

    /// Half away from zero.
    #[inline(always)]
    fn round(a: Self::Reg) -> Self::Reg {
        map_lanes(a, <Self as num::Float>::round)
    }

    /// Mantissa and exponent, the exponent held as an integral float.
    #[inline(always)]
    fn frexp(a: Self::Reg) -> (Self::Reg, Self::Reg) {
        let a = Storage::<Self, Self::Reg>::from_raw(a);
        let mut mantissa = a;
        let mut exponent = Storage::<Self, Self::Reg>::zeroed();
        for i in 0..Self::CAPACITY {
            let (m, e) = a.get(i).lane_frexp();
            mantissa.set(i, m);
            exponent.set(i, Self::from_i128(e as i128));
        }
        (mantissa.raw(), exponent.raw())
    }

    /// `a * 2^exp` with `exp` holding integral floats.
    #[inline(always)]
    fn ldexp(a: Self::Reg, exp: Self::Reg) -> Self::Reg {
        zip_lanes(a, exp, |x: Self, e: Self| {
            x.lane_ldexp(Vectorizable::to_f64(e) as i32)
        })
    }

    #[inline(always)]
    fn logb(a: Self::Reg) -> Self::Reg {
        map_lanes(a, Self::lane_logb)
    }

    #[inline(always)]
    fn sign_mask(a: Self::Reg) -> Self::MaskReg {
        Self::mask_from_bits(test_lanes(a, a, |x: Self, _: Self| {
            num::Float::is_sign_negative(x)
        }))
    }

    #[inline(always)]
    fn fma(a: Self::Reg, b: Self::Reg, c: Self::Reg) -> Self::Reg {
        zip3_lanes(a, b, c, <Self as num::Float>::mul_add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // A register type with no ISA behind it exercises every default.
    #[derive(Clone, Copy, Debug, Default)]
    struct Plain;

    impl Isa for Plain {
        const NAME: &'static str = "plain";
        const FAMILY: IsaFamily = IsaFamily::Sse;
    }

    impl IsaLane<Plain> for i32 {
        type Reg = [i32; 4];
        type MaskReg = [i32; 4];
    }
    impl IsaIntLane<Plain> for i32 {}

    impl IsaLane<Plain> for u16 {
        type Reg = [u16; 8];
        type MaskReg = [u16; 8];
    }
    impl IsaIntLane<Plain> for u16 {}

    impl IsaLane<Plain> for f32 {
        type Reg = [f32; 4];
        type MaskReg = [f32; 4];
    }
    impl IsaFloatLane<Plain> for f32 {}

    // SAFETY: arrays of primitives accept every bit pattern.
    unsafe impl Register for [i32; 4] {}
    unsafe impl Register for [u16; 8] {}
    unsafe impl Register for [f32; 4] {}

    mod default_lane_tests {
        use super::*;

        #[test]
        fn test_capacity_and_splat() {
            assert_eq!(<i32 as IsaLane<Plain>>::CAPACITY, 4);
            assert_eq!(<u16 as IsaLane<Plain>>::CAPACITY, 8);
            assert_eq!(<f32 as IsaLane<Plain>>::splat(2.5), [2.5; 4]);
        }

        #[test]
        fn test_arithmetic_defaults_follow_lane_semantics() {
            let a = [i32::MAX, 7, -8, 9];
            let b = [1, 0, 3, -2];
            assert_eq!(<i32 as IsaLane<Plain>>::add(a, b), [i32::MIN, 7, -5, 7]);
            assert_eq!(<i32 as IsaLane<Plain>>::div(a, b), [i32::MAX, 0, -2, -4]);
            assert_eq!(<i32 as IsaIntLane<Plain>>::rem([7, -7, 9, 1], [2, 2, 4, 1]), [1, -1, 1, 0]);
            assert_eq!(<i32 as IsaLane<Plain>>::andnot([0b1100; 4], [0b1010; 4]), [0b0010; 4]);
        }

        #[test]
        fn test_compare_and_mask_bits() {
            let k = <u16 as IsaLane<Plain>>::cmp_lt([1, 2, 3, 4, 5, 6, 7, u16::MAX], [2; 8]);
            assert_eq!(<u16 as IsaLane<Plain>>::mask_to_bits(k), 0b0000_0001);
            let k = <u16 as IsaLane<Plain>>::mask_from_bits(0b1010_0101);
            assert_eq!(k, [u16::MAX, 0, u16::MAX, 0, 0, u16::MAX, 0, u16::MAX]);
            assert_eq!(
                <u16 as IsaLane<Plain>>::mask_to_bits(<u16 as IsaLane<Plain>>::mask_not(k)),
                0b0101_1010
            );
        }

        #[test]
        fn test_blend_and_shift_down() {
            let k = <i32 as IsaLane<Plain>>::mask_from_bits(0b0110);
            assert_eq!(<i32 as IsaLane<Plain>>::blend(k, [1, 2, 3, 4], [5, 6, 7, 8]), [1, 6, 7, 4]);
            assert_eq!(<i32 as IsaLane<Plain>>::shift_down([1, 2, 3, 4], 1), [2, 3, 4, 0]);
            assert_eq!(<i32 as IsaLane<Plain>>::shift_down([1, 2, 3, 4], 4), [0; 4]);
        }

        #[test]
        fn test_masked_memory_defaults() {
            let src = [10, 20, 30, 40];
            let k = <i32 as IsaLane<Plain>>::mask_from_bits(0b1001);
            let loaded = unsafe { <i32 as IsaLane<Plain>>::masked_load([0; 4], k, src.as_ptr()) };
            assert_eq!(loaded, [10, 0, 0, 40]);

            let mut dst = [0; 4];
            unsafe { <i32 as IsaLane<Plain>>::masked_store([1, 2, 3, 4], k, dst.as_mut_ptr()) };
            assert_eq!(dst, [1, 0, 0, 4]);
        }

        #[test]
        fn test_shift_defaults() {
            assert_eq!(<u16 as IsaIntLane<Plain>>::shl_scalar([1; 8], 16), [0; 8]);
            assert_eq!(
                <i32 as IsaIntLane<Plain>>::shr([-16, 16, -1, 5], [2, 40, 31, 0]),
                [-4, 0, -1, 5]
            );
        }

        #[test]
        fn test_float_defaults() {
            let a = [-2.5f32, 2.5, 0.49, -0.0];
            assert_eq!(<f32 as IsaFloatLane<Plain>>::round(a), [-3.0, 3.0, 0.0, -0.0]);
            assert_eq!(<f32 as IsaFloatLane<Plain>>::floor(a), [-3.0, 2.0, 0.0, -0.0]);

            let (m, e) = <f32 as IsaFloatLane<Plain>>::frexp([8.0, 0.75, 0.0, -3.0]);
            assert_eq!(m, [0.5, 0.75, 0.0, -0.75]);
            assert_eq!(e, [4.0, 0.0, 0.0, 2.0]);
            assert_eq!(<f32 as IsaFloatLane<Plain>>::ldexp(m, e), [8.0, 0.75, 0.0, -3.0]);

            let k = <f32 as IsaFloatLane<Plain>>::sign_mask(a);
            assert_eq!(<f32 as IsaLane<Plain>>::mask_to_bits(k), 0b1001);
        }
    }
}
