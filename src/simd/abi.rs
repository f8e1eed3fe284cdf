//! ABI tags.
//!
//! An ABI tag is a zero-sized marker naming how a [`Simd<T, A>`](crate::simd::Simd)
//! is laid out and which implementation runs its operations:
//!
//! * [`Scalar`]: one lane held as a plain `T`.
//! * [`Sse<BYTES>`], [`Avx<BYTES>`], [`Avx512<BYTES>`], [`Neon<BYTES>`]: the
//!   low `BYTES` bytes of one hardware register. Narrower widths than the
//!   register are allowed, the padding lanes are never observed.
//! * [`FixedSize<N>`]: exactly `N` lanes composed out of native chunks.
//!
//! [`AbiTraits<T>`] resolves a tag to its implementation type. A tag that
//! does not support `T` has no `AbiTraits<T>` impl and is rejected where it is
//! used; a register width that is not a power of two, or is wider than the
//! register, fails constant evaluation when the vector type is instantiated.

use std::fmt;
use std::marker::PhantomData;

use crate::simd::element::{ElementKind, Vectorizable};
use crate::simd::fixed_size::FixedSizeImpl;
use crate::simd::isa::{self, Isa, IsaFamily, IsaLane};
use crate::simd::scalar::ScalarImpl;
use crate::simd::traits::{MaskImpl, SimdImpl};
use crate::simd::tuple::TupleLayout;
use crate::simd::vector::VectorImpl;

/// Largest lane count of a [`FixedSize`] vector.
pub const MAX_FIXED_SIZE: usize = 32;

/// Largest lane count of any vector (AVX512 with byte lanes).
pub const MAX_LANES: usize = 64;

/// Runtime description of an ABI tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AbiKind {
    Scalar,
    /// Register ABI with its width in bytes.
    Sse(usize),
    Avx(usize),
    Avx512(usize),
    Neon(usize),
    /// Composed ABI with its lane count.
    FixedSize(usize),
}

impl AbiKind {
    pub const fn register(family: IsaFamily, bytes: usize) -> Self {
        match family {
            IsaFamily::Sse => AbiKind::Sse(bytes),
            IsaFamily::Avx => AbiKind::Avx(bytes),
            IsaFamily::Avx512 => AbiKind::Avx512(bytes),
            IsaFamily::Neon => AbiKind::Neon(bytes),
        }
    }

    /// Register family, `None` for the scalar and fixed-size ABIs.
    pub const fn family(self) -> Option<IsaFamily> {
        match self {
            AbiKind::Sse(_) => Some(IsaFamily::Sse),
            AbiKind::Avx(_) => Some(IsaFamily::Avx),
            AbiKind::Avx512(_) => Some(IsaFamily::Avx512),
            AbiKind::Neon(_) => Some(IsaFamily::Neon),
            AbiKind::Scalar | AbiKind::FixedSize(_) => None,
        }
    }

    /// Bytes of data (not register size) one vector of `element` occupies.
    pub const fn bytes(self, element: ElementKind) -> usize {
        match self {
            AbiKind::Scalar => element.bytes(),
            AbiKind::Sse(bytes)
            | AbiKind::Avx(bytes)
            | AbiKind::Avx512(bytes)
            | AbiKind::Neon(bytes) => bytes,
            AbiKind::FixedSize(lanes) => lanes * element.bytes(),
        }
    }

    pub const fn lanes(self, element: ElementKind) -> usize {
        match self {
            AbiKind::Scalar => 1,
            AbiKind::FixedSize(lanes) => lanes,
            _ => self.bytes(element) / element.bytes(),
        }
    }
}

impl fmt::Display for AbiKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiKind::Scalar => write!(f, "scalar"),
            AbiKind::Sse(bytes) => write!(f, "sse<{bytes}>"),
            AbiKind::Avx(bytes) => write!(f, "avx<{bytes}>"),
            AbiKind::Avx512(bytes) => write!(f, "avx512<{bytes}>"),
            AbiKind::Neon(bytes) => write!(f, "neon<{bytes}>"),
            AbiKind::FixedSize(lanes) => write!(f, "fixed_size<{lanes}>"),
        }
    }
}

/// Whether the compiled target lowers `element` lanes on `family` registers
/// to real instructions.
pub const fn is_native(family: IsaFamily, element: ElementKind) -> bool {
    match family {
        IsaFamily::Sse => cfg!(have_sse2),
        IsaFamily::Neon => cfg!(have_neon),
        IsaFamily::Avx => {
            if element.is_float() {
                cfg!(have_avx)
            } else {
                cfg!(have_avx2)
            }
        }
        IsaFamily::Avx512 => {
            if element.bytes() < 4 {
                cfg!(have_avx512bw)
            } else {
                cfg!(have_avx512f)
            }
        }
    }
}

/// Lanes of a `bytes` wide register ABI. Fails constant evaluation for
/// widths the register cannot represent.
pub(crate) const fn register_lanes(element: ElementKind, bytes: usize, register: usize) -> usize {
    assert!(bytes.is_power_of_two(), "register ABI width must be a power of two");
    assert!(bytes <= register, "register ABI is wider than its register");
    assert!(bytes >= element.bytes(), "register ABI is narrower than one lane");
    bytes / element.bytes()
}

/// A stateless ABI marker.
pub trait AbiTag: Copy + Default + fmt::Debug + Send + Sync + 'static {
    const NAME: &'static str;
    const KIND: AbiKind;

    /// Whether `T` has a native lowering under this tag on the compiled
    /// target. Tags without one still compile where an impl exists and run
    /// lane by lane.
    fn is_valid<T: Vectorizable>() -> bool;
}

/// Resolves `(T, Self)` to its implementation.
pub trait AbiTraits<T: Vectorizable>: AbiTag {
    type Impl: SimdImpl<T>;

    /// Lanes of `Simd<T, Self>`.
    const LANES: usize = <Self::Impl as MaskImpl<T>>::LANES;
}

/// Member type embedded in `Simd<T, A>`.
pub type SimdMember<T, A> = <<A as AbiTraits<T>>::Impl as SimdImpl<T>>::SimdMember;

/// Member type embedded in `SimdMask<T, A>`.
pub type MaskMember<T, A> = <<A as AbiTraits<T>>::Impl as MaskImpl<T>>::MaskMember;

/// One lane as a plain value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Scalar;

impl AbiTag for Scalar {
    const NAME: &'static str = "scalar";
    const KIND: AbiKind = AbiKind::Scalar;

    fn is_valid<T: Vectorizable>() -> bool {
        true
    }
}

impl<T: Vectorizable> AbiTraits<T> for Scalar {
    type Impl = ScalarImpl;
}

/// The low `BYTES` bytes of one register of ISA `I`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct RegisterAbi<I, const BYTES: usize>(PhantomData<I>);

impl<I: Isa, const BYTES: usize> AbiTag for RegisterAbi<I, BYTES> {
    const NAME: &'static str = I::NAME;
    const KIND: AbiKind = AbiKind::register(I::FAMILY, BYTES);

    fn is_valid<T: Vectorizable>() -> bool {
        let lane = T::KIND.bytes();
        is_native(I::FAMILY, T::KIND)
            && BYTES.is_power_of_two()
            && BYTES >= lane
            && BYTES <= I::REGISTER_BYTES
    }
}

impl<I: Isa, T: IsaLane<I>, const BYTES: usize> AbiTraits<T> for RegisterAbi<I, BYTES> {
    type Impl = VectorImpl<I, BYTES>;
}

/// `BYTES` of an `xmm` register.
#[cfg(have_sse2)]
pub type Sse<const BYTES: usize> = RegisterAbi<isa::Sse, BYTES>;

/// `BYTES` of a `ymm` register.
#[cfg(have_avx)]
pub type Avx<const BYTES: usize> = RegisterAbi<isa::Avx, BYTES>;

/// `BYTES` of a `zmm` register.
#[cfg(have_avx512f)]
pub type Avx512<const BYTES: usize> = RegisterAbi<isa::Avx512, BYTES>;

/// `BYTES` of a NEON `q` register.
#[cfg(have_neon)]
pub type Neon<const BYTES: usize> = RegisterAbi<isa::Neon, BYTES>;

/// Exactly `N` lanes, stored as a sequence of native chunks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FixedSize<const N: usize>;

impl<const N: usize> AbiTag for FixedSize<N> {
    const NAME: &'static str = "fixed_size";
    const KIND: AbiKind = AbiKind::FixedSize(N);

    fn is_valid<T: Vectorizable>() -> bool {
        N >= 1 && N <= MAX_FIXED_SIZE
    }
}

impl<T: Vectorizable, const N: usize> AbiTraits<T> for FixedSize<N> {
    type Impl = FixedSizeImpl<N>;
}

/// Default ABIs per element family, chosen from the compiled-in ISAs.
pub mod native {
    use super::*;

    /// Widest float ABI.
    #[cfg(have_avx512f)]
    pub type WideFloat = Avx512<64>;
    #[cfg(all(not(have_avx512f), have_avx))]
    pub type WideFloat = Avx<32>;
    #[cfg(all(not(have_avx512f), not(have_avx), have_sse2))]
    pub type WideFloat = Sse<16>;
    #[cfg(all(not(have_avx512f), not(have_avx), not(have_sse2), have_neon))]
    pub type WideFloat = Neon<16>;
    #[cfg(not(any(have_avx512f, have_avx, have_sse2, have_neon)))]
    pub type WideFloat = Scalar;

    /// Widest ABI for 32 and 64-bit integers.
    #[cfg(have_avx512f)]
    pub type WideWord = Avx512<64>;
    #[cfg(all(not(have_avx512f), have_avx2))]
    pub type WideWord = Avx<32>;
    #[cfg(all(not(have_avx512f), not(have_avx2), have_sse2))]
    pub type WideWord = Sse<16>;
    #[cfg(all(not(have_avx512f), not(have_avx2), not(have_sse2), have_neon))]
    pub type WideWord = Neon<16>;
    #[cfg(not(any(have_avx512f, have_avx2, have_sse2, have_neon)))]
    pub type WideWord = Scalar;

    /// Widest ABI for 8 and 16-bit integers.
    #[cfg(have_avx512bw)]
    pub type WideByte = Avx512<64>;
    #[cfg(all(not(have_avx512bw), have_avx2))]
    pub type WideByte = Avx<32>;
    #[cfg(all(not(have_avx512bw), not(have_avx2), have_sse2))]
    pub type WideByte = Sse<16>;
    #[cfg(all(not(have_avx512bw), not(have_avx2), not(have_sse2), have_neon))]
    pub type WideByte = Neon<16>;
    #[cfg(not(any(have_avx512bw, have_avx2, have_sse2, have_neon)))]
    pub type WideByte = Scalar;

    /// ABI every CPU of the target architecture supports.
    #[cfg(have_sse2)]
    pub type CompatibleAbi = Sse<16>;
    #[cfg(all(not(have_sse2), have_neon))]
    pub type CompatibleAbi = Neon<16>;
    #[cfg(not(any(have_sse2, have_neon)))]
    pub type CompatibleAbi = Scalar;
}

/// The widest native ABI for `T`.
pub type NativeAbi<T> = <T as Vectorizable>::Native;

/// The baseline ABI for `T`.
pub type CompatibleAbi<T> = <T as Vectorizable>::Compatible;

/// Alignment in bytes that `VectorAligned` loads and stores of
/// `Simd<T, A>` require.
pub fn memory_alignment<T: Vectorizable, A: AbiTraits<T>>() -> usize {
    match A::KIND {
        AbiKind::Scalar => std::mem::align_of::<T>(),
        AbiKind::FixedSize(lanes) => TupleLayout::new(T::KIND, lanes).alignment(T::KIND),
        register => register.bytes(T::KIND),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod kind_tests {
        use super::*;

        #[test]
        fn test_lanes_and_bytes() {
            assert_eq!(AbiKind::Sse(16).lanes(ElementKind::F32), 4);
            assert_eq!(AbiKind::Avx512(64).lanes(ElementKind::U8), 64);
            assert_eq!(AbiKind::Neon(8).lanes(ElementKind::I16), 4);
            assert_eq!(AbiKind::FixedSize(5).lanes(ElementKind::F64), 5);
            assert_eq!(AbiKind::FixedSize(5).bytes(ElementKind::F64), 40);
            assert_eq!(AbiKind::Scalar.bytes(ElementKind::I16), 2);
        }

        #[test]
        fn test_display() {
            assert_eq!(AbiKind::Sse(8).to_string(), "sse<8>");
            assert_eq!(AbiKind::FixedSize(13).to_string(), "fixed_size<13>");
            assert_eq!(AbiKind::Scalar.to_string(), "scalar");
        }

        #[test]
        fn test_family() {
            assert_eq!(AbiKind::register(IsaFamily::Avx, 32), AbiKind::Avx(32));
            assert_eq!(AbiKind::Avx(32).family(), Some(IsaFamily::Avx));
            assert_eq!(AbiKind::FixedSize(3).family(), None);
        }
    }

    mod tag_tests {
        use super::*;

        #[test]
        fn test_scalar_and_fixed_size_validity() {
            assert!(Scalar::is_valid::<f64>());
            assert!(FixedSize::<1>::is_valid::<u8>());
            assert!(FixedSize::<32>::is_valid::<u8>());
            assert!(!FixedSize::<33>::is_valid::<u8>());
            assert_eq!(<FixedSize<7> as AbiTraits<i16>>::LANES, 7);
            assert_eq!(<Scalar as AbiTraits<f32>>::LANES, 1);
        }

        #[cfg(have_sse2)]
        #[test]
        fn test_sse_validity() {
            assert!(Sse::<16>::is_valid::<f32>());
            assert!(Sse::<8>::is_valid::<i16>());
            assert!(!Sse::<4>::is_valid::<f64>());
            assert_eq!(<Sse<16> as AbiTraits<u8>>::LANES, 16);
            assert_eq!(<Sse<8> as AbiTraits<f32>>::LANES, 2);
        }

        #[cfg(all(have_avx, not(have_avx2)))]
        #[test]
        fn test_avx_integers_need_avx2() {
            assert!(Avx::<32>::is_valid::<f32>());
            assert!(!Avx::<32>::is_valid::<i32>());
        }

        #[test]
        fn test_memory_alignment() {
            assert_eq!(memory_alignment::<f32, Scalar>(), 4);
            assert!(memory_alignment::<f32, NativeAbi<f32>>().is_power_of_two());
            #[cfg(have_sse2)]
            assert_eq!(memory_alignment::<f32, Sse<16>>(), 16);
        }

        #[test]
        fn test_native_is_valid() {
            assert!(<NativeAbi<f32> as AbiTag>::is_valid::<f32>());
            assert!(<NativeAbi<u8> as AbiTag>::is_valid::<u8>());
            assert!(<NativeAbi<i64> as AbiTag>::is_valid::<i64>());
            assert!(<CompatibleAbi<f64> as AbiTag>::is_valid::<f64>());
        }
    }
}
