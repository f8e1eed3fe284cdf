//! The register implementation shared by every register ISA.
//!
//! `VectorImpl<I, BYTES>` runs the operations of `Simd<T, RegisterAbi<I, BYTES>>`
//! on one `I` register per value, through the [`IsaLane`] primitives of `T`.
//! When `BYTES` is narrower than the register the upper lanes are padding:
//! loads fill them with zeros, stores never write them and masks are truncated
//! to the owned lanes before they are observed.

use std::marker::PhantomData;

use crate::simd::abi::register_lanes;
use crate::simd::isa::{Isa, IsaFloatLane, IsaIntLane, IsaLane};
use crate::simd::storage::{lane_bits, Storage};
use crate::simd::traits::{MaskImpl, ReduceOp, SimdFloatImpl, SimdImpl, SimdIntImpl};

/// Operations on the low `BYTES` bytes of an `I` register.
pub struct VectorImpl<I, const BYTES: usize>(PhantomData<I>);

/// SSE register implementation.
pub type SseImpl<const BYTES: usize> = VectorImpl<crate::simd::isa::Sse, BYTES>;
/// AVX register implementation.
pub type AvxImpl<const BYTES: usize> = VectorImpl<crate::simd::isa::Avx, BYTES>;
/// AVX512 register implementation.
pub type Avx512Impl<const BYTES: usize> = VectorImpl<crate::simd::isa::Avx512, BYTES>;
/// NEON register implementation.
pub type NeonImpl<const BYTES: usize> = VectorImpl<crate::simd::isa::Neon, BYTES>;

impl<I: Isa, const BYTES: usize> VectorImpl<I, BYTES> {
    #[inline(always)]
    fn is_full<T: IsaLane<I>>() -> bool {
        <Self as MaskImpl<T>>::LANES == <T as IsaLane<I>>::CAPACITY
    }
}

type Reg<T, I> = <T as IsaLane<I>>::Reg;
type MaskReg<T, I> = <T as IsaLane<I>>::MaskReg;

impl<I: Isa, T: IsaLane<I>, const BYTES: usize> MaskImpl<T> for VectorImpl<I, BYTES> {
    const LANES: usize = register_lanes(T::KIND, BYTES, I::REGISTER_BYTES);

    type MaskMember = MaskReg<T, I>;

    #[inline(always)]
    fn mask_broadcast(value: bool) -> MaskReg<T, I> {
        let bits = if value { lane_bits(<Self as MaskImpl<T>>::LANES) } else { 0 };
        <T as IsaLane<I>>::mask_from_bits(bits)
    }

    #[inline(always)]
    fn mask_from_bitset(bits: u64) -> MaskReg<T, I> {
        <T as IsaLane<I>>::mask_from_bits(bits & lane_bits(<Self as MaskImpl<T>>::LANES))
    }

    #[inline(always)]
    fn mask_to_bitset(mask: MaskReg<T, I>) -> u64 {
        <T as IsaLane<I>>::mask_to_bits(mask) & lane_bits(<Self as MaskImpl<T>>::LANES)
    }

    #[inline(always)]
    fn mask_and(a: MaskReg<T, I>, b: MaskReg<T, I>) -> MaskReg<T, I> {
        <T as IsaLane<I>>::mask_and(a, b)
    }

    #[inline(always)]
    fn mask_or(a: MaskReg<T, I>, b: MaskReg<T, I>) -> MaskReg<T, I> {
        <T as IsaLane<I>>::mask_or(a, b)
    }

    #[inline(always)]
    fn mask_xor(a: MaskReg<T, I>, b: MaskReg<T, I>) -> MaskReg<T, I> {
        <T as IsaLane<I>>::mask_xor(a, b)
    }

    #[inline(always)]
    fn mask_not(a: MaskReg<T, I>) -> MaskReg<T, I> {
        <T as IsaLane<I>>::mask_not(a)
    }
}

impl<I: Isa, T: IsaLane<I>, const BYTES: usize> SimdImpl<T> for VectorImpl<I, BYTES> {
    type SimdMember = Storage<T, Reg<T, I>>;

    #[inline(always)]
    unsafe fn load(ptr: *const T, aligned: bool) -> Self::SimdMember {
        if Self::is_full::<T>() {
            let raw = if aligned {
                <T as IsaLane<I>>::load_aligned(ptr)
            } else {
                <T as IsaLane<I>>::load_unaligned(ptr)
            };
            Storage::from_raw(raw)
        } else {
            let mut out = Storage::zeroed();
            for i in 0..<Self as MaskImpl<T>>::LANES {
                out.set(i, ptr.add(i).read_unaligned());
            }
            out
        }
    }

    #[inline(always)]
    unsafe fn store(value: Self::SimdMember, ptr: *mut T, aligned: bool) {
        if Self::is_full::<T>() {
            if aligned {
                <T as IsaLane<I>>::store_aligned(ptr, value.raw());
            } else {
                <T as IsaLane<I>>::store_unaligned(ptr, value.raw());
            }
        } else {
            for i in 0..<Self as MaskImpl<T>>::LANES {
                ptr.add(i).write_unaligned(value.get(i));
            }
        }
    }

    #[inline(always)]
    unsafe fn masked_load(
        merge: Self::SimdMember,
        k: Self::MaskMember,
        ptr: *const T,
    ) -> Self::SimdMember {
        let bits = <Self as MaskImpl<T>>::mask_to_bitset(k);
        let k = <Self as MaskImpl<T>>::mask_from_bitset(bits);
        Storage::from_raw(<T as IsaLane<I>>::masked_load(merge.raw(), k, ptr))
    }

    #[inline(always)]
    unsafe fn masked_store(value: Self::SimdMember, k: Self::MaskMember, ptr: *mut T) {
        let bits = <Self as MaskImpl<T>>::mask_to_bitset(k);
        let k = <Self as MaskImpl<T>>::mask_from_bitset(bits);
        <T as IsaLane<I>>::masked_store(value.raw(), k, ptr)
    }

    #[inline(always)]
    fn broadcast(value: T) -> Self::SimdMember {
        Storage::from_raw(<T as IsaLane<I>>::splat(value))
    }

    #[inline(always)]
    fn generate<F: FnMut(usize) -> T>(mut generator: F) -> Self::SimdMember {
        let mut out = Storage::zeroed();
        for i in 0..<Self as MaskImpl<T>>::LANES {
            out.set(i, generator(i));
        }
        out
    }

    #[inline(always)]
    fn get(value: Self::SimdMember, i: usize) -> T {
        debug_assert!(i < <Self as MaskImpl<T>>::LANES, "lane {i} out of range");
        value.get(i)
    }

    #[inline(always)]
    fn set(value: &mut Self::SimdMember, i: usize, lane: T) {
        debug_assert!(i < <Self as MaskImpl<T>>::LANES, "lane {i} out of range");
        value.set(i, lane);
    }

    #[inline(always)]
    fn add(a: Self::SimdMember, b: Self::SimdMember) -> Self::SimdMember {
        Storage::from_raw(<T as IsaLane<I>>::add(a.raw(), b.raw()))
    }

    #[inline(always)]
    fn sub(a: Self::SimdMember, b: Self::SimdMember) -> Self::SimdMember {
        Storage::from_raw(<T as IsaLane<I>>::sub(a.raw(), b.raw()))
    }

    #[inline(always)]
    fn mul(a: Self::SimdMember, b: Self::SimdMember) -> Self::SimdMember {
        Storage::from_raw(<T as IsaLane<I>>::mul(a.raw(), b.raw()))
    }

    #[inline(always)]
    fn div(a: Self::SimdMember, b: Self::SimdMember) -> Self::SimdMember {
        Storage::from_raw(<T as IsaLane<I>>::div(a.raw(), b.raw()))
    }

    #[inline(always)]
    fn neg(a: Self::SimdMember) -> Self::SimdMember {
        Storage::from_raw(<T as IsaLane<I>>::neg(a.raw()))
    }

    #[inline(always)]
    fn bit_and(a: Self::SimdMember, b: Self::SimdMember) -> Self::SimdMember {
        Storage::from_raw(<T as IsaLane<I>>::bit_and(a.raw(), b.raw()))
    }

    #[inline(always)]
    fn bit_or(a: Self::SimdMember, b: Self::SimdMember) -> Self::SimdMember {
        Storage::from_raw(<T as IsaLane<I>>::bit_or(a.raw(), b.raw()))
    }

    #[inline(always)]
    fn bit_xor(a: Self::SimdMember, b: Self::SimdMember) -> Self::SimdMember {
        Storage::from_raw(<T as IsaLane<I>>::bit_xor(a.raw(), b.raw()))
    }

    #[inline(always)]
    fn bit_not(a: Self::SimdMember) -> Self::SimdMember {
        Storage::from_raw(<T as IsaLane<I>>::bit_not(a.raw()))
    }

    #[inline(always)]
    fn eq(a: Self::SimdMember, b: Self::SimdMember) -> Self::MaskMember {
        <T as IsaLane<I>>::cmp_eq(a.raw(), b.raw())
    }

    #[inline(always)]
    fn lt(a: Self::SimdMember, b: Self::SimdMember) -> Self::MaskMember {
        <T as IsaLane<I>>::cmp_lt(a.raw(), b.raw())
    }

    #[inline(always)]
    fn le(a: Self::SimdMember, b: Self::SimdMember) -> Self::MaskMember {
        <T as IsaLane<I>>::cmp_le(a.raw(), b.raw())
    }

    #[inline(always)]
    fn min(a: Self::SimdMember, b: Self::SimdMember) -> Self::SimdMember {
        Storage::from_raw(<T as IsaLane<I>>::min(a.raw(), b.raw()))
    }

    #[inline(always)]
    fn max(a: Self::SimdMember, b: Self::SimdMember) -> Self::SimdMember {
        Storage::from_raw(<T as IsaLane<I>>::max(a.raw(), b.raw()))
    }

    #[inline(always)]
    fn abs(a: Self::SimdMember) -> Self::SimdMember {
        Storage::from_raw(<T as IsaLane<I>>::abs(a.raw()))
    }

    #[inline(always)]
    fn blend(k: Self::MaskMember, a: Self::SimdMember, b: Self::SimdMember) -> Self::SimdMember {
        Storage::from_raw(<T as IsaLane<I>>::blend(k, a.raw(), b.raw()))
    }

    /// Halves the active width each step, folding the upper half onto the
    /// lower one.
    #[inline(always)]
    fn reduce<Op: ReduceOp<T>>(value: Self::SimdMember) -> T {
        let mut acc = value;
        let mut width = <Self as MaskImpl<T>>::LANES;
        while width > 1 {
            let half = width / 2;
            let upper = Storage::from_raw(<T as IsaLane<I>>::shift_down(acc.raw(), half));
            acc = Op::apply::<Self>(acc, upper);
            width = half;
        }
        acc.get(0)
    }
}

impl<I: Isa, T: IsaIntLane<I>, const BYTES: usize> SimdIntImpl<T> for VectorImpl<I, BYTES> {
    #[inline(always)]
    fn rem(a: Self::SimdMember, b: Self::SimdMember) -> Self::SimdMember {
        Storage::from_raw(<T as IsaIntLane<I>>::rem(a.raw(), b.raw()))
    }

    #[inline(always)]
    fn shl(a: Self::SimdMember, b: Self::SimdMember) -> Self::SimdMember {
        Storage::from_raw(<T as IsaIntLane<I>>::shl(a.raw(), b.raw()))
    }

    #[inline(always)]
    fn shr(a: Self::SimdMember, b: Self::SimdMember) -> Self::SimdMember {
        Storage::from_raw(<T as IsaIntLane<I>>::shr(a.raw(), b.raw()))
    }

    #[inline(always)]
    fn shl_scalar(a: Self::SimdMember, count: u32) -> Self::SimdMember {
        Storage::from_raw(<T as IsaIntLane<I>>::shl_scalar(a.raw(), count))
    }

    #[inline(always)]
    fn shr_scalar(a: Self::SimdMember, count: u32) -> Self::SimdMember {
        Storage::from_raw(<T as IsaIntLane<I>>::shr_scalar(a.raw(), count))
    }
}

impl<I: Isa, T: IsaFloatLane<I>, const BYTES: usize> SimdFloatImpl<T> for VectorImpl<I, BYTES> {
    #[inline(always)]
    fn sqrt(a: Self::SimdMember) -> Self::SimdMember {
        Storage::from_raw(<T as IsaFloatLane<I>>::sqrt(a.raw()))
    }

    #[inline(always)]
    fn floor(a: Self::SimdMember) -> Self::SimdMember {
        Storage::from_raw(<T as IsaFloatLane<I>>::floor(a.raw()))
    }

    #[inline(always)]
    fn ceil(a: Self::SimdMember) -> Self::SimdMember {
        Storage::from_raw(<T as IsaFloatLane<I>>::ceil(a.raw()))
    }

    #[inline(always)]
    fn trunc(a: Self::SimdMember) -> Self::SimdMember {
        Storage::from_raw(<T as IsaFloatLane<I>>::trunc(a.raw()))
    }

    #[inline(always)]
    fn round(a: Self::SimdMember) -> Self::SimdMember {
        Storage::from_raw(<T as IsaFloatLane<I>>::round(a.raw()))
    }

    #[inline(always)]
    fn logb(a: Self::SimdMember) -> Self::SimdMember {
        Storage::from_raw(<T as IsaFloatLane<I>>::logb(a.raw()))
    }

    #[inline(always)]
    fn frexp(a: Self::SimdMember) -> (Self::SimdMember, Self::SimdMember) {
        let (mantissa, exponent) = <T as IsaFloatLane<I>>::frexp(a.raw());
        (Storage::from_raw(mantissa), Storage::from_raw(exponent))
    }

    #[inline(always)]
    fn ldexp(a: Self::SimdMember, exp: Self::SimdMember) -> Self::SimdMember {
        Storage::from_raw(<T as IsaFloatLane<I>>::ldexp(a.raw(), exp.raw()))
    }

    #[inline(always)]
    fn fma(a: Self::SimdMember, b: Self::SimdMember, c: Self::SimdMember) -> Self::SimdMember {
        Storage::from_raw(<T as IsaFloatLane<I>>::fma(a.raw(), b.raw(), c.raw()))
    }

    #[inline(always)]
    fn signbit(a: Self::SimdMember) -> Self::MaskMember {
        <T as IsaFloatLane<I>>::sign_mask(a.raw())
    }
}

#[cfg(all(test, have_sse2))]
mod tests {
    use super::*;
    use crate::simd::traits::{Maximum, Plus};

    mod partial_width_tests {
        use super::*;

        #[test]
        fn test_partial_load_store_touches_owned_lanes_only() {
            let src = [1.0f32, 2.0, 99.0, 99.0];
            let v = unsafe { <SseImpl<8> as SimdImpl<f32>>::load(src.as_ptr(), false) };
            assert_eq!(<SseImpl<8> as MaskImpl<f32>>::LANES, 2);
            assert_eq!(v.get(2), 0.0);

            let mut dst = [-1.0f32; 4];
            unsafe { <SseImpl<8> as SimdImpl<f32>>::store(v, dst.as_mut_ptr(), false) };
            assert_eq!(dst, [1.0, 2.0, -1.0, -1.0]);
        }

        #[test]
        fn test_partial_masks_are_truncated() {
            let all = <SseImpl<4> as MaskImpl<u8>>::mask_broadcast(true);
            assert_eq!(<SseImpl<4> as MaskImpl<u8>>::mask_to_bitset(all), 0b1111);
            let none = <SseImpl<4> as MaskImpl<u8>>::mask_not(all);
            assert!(<SseImpl<4> as MaskImpl<u8>>::mask_none(none));
            let back = <SseImpl<4> as MaskImpl<u8>>::mask_not(none);
            assert!(<SseImpl<4> as MaskImpl<u8>>::mask_all(back));
        }

        #[test]
        fn test_partial_reduce_ignores_padding() {
            let v = <SseImpl<8> as SimdImpl<i16>>::generate(|i| i as i16 + 1);
            assert_eq!(<SseImpl<8> as SimdImpl<i16>>::reduce::<Plus>(v), 1 + 2 + 3 + 4);
        }
    }

    mod full_width_tests {
        use super::*;

        #[test]
        fn test_reduce_tree() {
            let v = <SseImpl<16> as SimdImpl<u8>>::generate(|i| i as u8);
            assert_eq!(<SseImpl<16> as SimdImpl<u8>>::reduce::<Plus>(v), 120);
            assert_eq!(<SseImpl<16> as SimdImpl<u8>>::reduce::<Maximum>(v), 15);
        }

        #[test]
        fn test_masked_memory() {
            let src = [1i32, 2, 3, 4];
            let k = <SseImpl<16> as MaskImpl<i32>>::mask_from_bitset(0b0101);
            let merge = <SseImpl<16> as SimdImpl<i32>>::broadcast(-1);
            let v = unsafe { <SseImpl<16> as SimdImpl<i32>>::masked_load(merge, k, src.as_ptr()) };
            let lanes: Vec<i32> = (0..4).map(|i| v.get(i)).collect();
            assert_eq!(lanes, vec![1, -1, 3, -1]);
        }

        #[test]
        fn test_float_classification() {
            let v = <SseImpl<16> as SimdImpl<f32>>::generate(|i| {
                [f32::NAN, f32::INFINITY, -0.0, 1e-40][i]
            });
            let bits = |k| <SseImpl<16> as MaskImpl<f32>>::mask_to_bitset(k);
            assert_eq!(bits(<SseImpl<16> as SimdFloatImpl<f32>>::isnan(v)), 0b0001);
            assert_eq!(bits(<SseImpl<16> as SimdFloatImpl<f32>>::isinf(v)), 0b0010);
            assert_eq!(bits(<SseImpl<16> as SimdFloatImpl<f32>>::isfinite(v)), 0b1100);
            assert_eq!(bits(<SseImpl<16> as SimdFloatImpl<f32>>::isnormal(v)), 0b0000);
            assert_eq!(bits(<SseImpl<16> as SimdFloatImpl<f32>>::signbit(v)), 0b0100);
        }
    }
}
