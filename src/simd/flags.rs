//! Alignment flags for loads and stores.
//!
//! The flag passed to `from_slice`, `copy_from` and `copy_to` is a promise
//! about the pointer's alignment. [`VectorAligned`] lets register ABIs use the
//! aligned move instructions; [`ElementAligned`] only assumes the natural
//! alignment of `T`; [`Overaligned<N>`] promises `N` bytes and picks the
//! aligned instructions when `N` covers the vector's alignment.
//!
//! The promise is checked when `debug_assertions` or the `check-alignment`
//! feature is enabled. A broken promise is a programming error: the check logs
//! the call site and aborts the process.

use std::fmt;
use std::panic::Location;

use crate::error::{misaligned, Result};
use crate::simd::abi::{memory_alignment, AbiTraits};
use crate::simd::element::Vectorizable;

/// An alignment promise for a memory operand.
pub trait LoadStoreFlag: Copy + Default + fmt::Debug + Send + Sync + 'static {
    /// Bytes of alignment promised for an operand of `Simd<T, A>`.
    fn alignment<T: Vectorizable, A: AbiTraits<T>>() -> usize;

    /// Whether the promise is strong enough for aligned instructions.
    #[inline(always)]
    fn is_vector_aligned<T: Vectorizable, A: AbiTraits<T>>() -> bool {
        Self::alignment::<T, A>() >= memory_alignment::<T, A>()
    }
}

/// The pointer is aligned to `T` only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ElementAligned;

/// The pointer is aligned to [`memory_alignment::<T, A>()`](memory_alignment).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VectorAligned;

/// The pointer is aligned to `N` bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Overaligned<const N: usize>;

impl LoadStoreFlag for ElementAligned {
    #[inline(always)]
    fn alignment<T: Vectorizable, A: AbiTraits<T>>() -> usize {
        std::mem::align_of::<T>()
    }
}

impl LoadStoreFlag for VectorAligned {
    #[inline(always)]
    fn alignment<T: Vectorizable, A: AbiTraits<T>>() -> usize {
        memory_alignment::<T, A>()
    }
}

impl<const N: usize> LoadStoreFlag for Overaligned<N> {
    #[inline(always)]
    fn alignment<T: Vectorizable, A: AbiTraits<T>>() -> usize {
        const { assert!(N.is_power_of_two(), "overaligned<N> needs a power of two") };
        N
    }
}

const CHECK_ALIGNMENT: bool = cfg!(any(debug_assertions, feature = "check-alignment"));

/// Whether `ptr` keeps the promise of flag `F`.
#[inline(always)]
pub fn is_aligned<T: Vectorizable, A: AbiTraits<T>, F: LoadStoreFlag>(ptr: *const T) -> bool {
    (ptr as usize) % F::alignment::<T, A>() == 0
}

/// Whether a load or store at `ptr` under flag `F` may use the aligned
/// instructions. The promise alone is not trusted: an unchecked build falls
/// back to the unaligned form for a pointer that breaks it.
#[inline(always)]
pub(crate) fn use_aligned<T: Vectorizable, A: AbiTraits<T>, F: LoadStoreFlag>(ptr: *const T) -> bool {
    F::is_vector_aligned::<T, A>() && (ptr as usize) % memory_alignment::<T, A>() == 0
}

/// Fallible form of the alignment check, used by the `try_*` APIs.
pub(crate) fn check_aligned<T: Vectorizable, A: AbiTraits<T>, F: LoadStoreFlag>(
    ptr: *const T,
) -> Result<()> {
    if is_aligned::<T, A, F>(ptr) {
        Ok(())
    } else {
        Err(misaligned(ptr, F::alignment::<T, A>()))
    }
}

/// Aborts with a diagnostic when `ptr` breaks the promise of `F`. Compiled to
/// nothing unless alignment checking is enabled.
#[inline(always)]
#[track_caller]
pub(crate) fn assert_aligned<T: Vectorizable, A: AbiTraits<T>, F: LoadStoreFlag>(ptr: *const T) {
    if CHECK_ALIGNMENT && !is_aligned::<T, A, F>(ptr) {
        alignment_failure(ptr as usize, F::alignment::<T, A>(), A::NAME, Location::caller());
    }
}

#[cold]
#[inline(never)]
fn alignment_failure(address: usize, alignment: usize, abi: &str, location: &Location<'_>) -> ! {
    log::error!(
        "{}:{}: misaligned {abi} memory access: address {address:#x} is not aligned to {alignment} bytes",
        location.file(),
        location.line(),
    );
    std::process::abort()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimdError;
    use crate::simd::abi::{FixedSize, NativeAbi, Scalar};

    #[test]
    fn test_flag_alignments() {
        assert_eq!(ElementAligned::alignment::<f64, NativeAbi<f64>>(), 8);
        assert_eq!(
            VectorAligned::alignment::<f32, NativeAbi<f32>>(),
            memory_alignment::<f32, NativeAbi<f32>>()
        );
        assert_eq!(Overaligned::<128>::alignment::<u8, Scalar>(), 128);
    }

    #[test]
    fn test_vector_aligned_promises() {
        assert!(VectorAligned::is_vector_aligned::<f32, NativeAbi<f32>>());
        assert!(ElementAligned::is_vector_aligned::<i16, Scalar>());
        assert!(Overaligned::<64>::is_vector_aligned::<f64, NativeAbi<f64>>());
        assert!(Overaligned::<64>::is_vector_aligned::<f32, FixedSize<3>>());
    }

    #[test]
    fn test_checked_alignment() {
        let data = [0u64; 4];
        let base = data.as_ptr();
        assert!(check_aligned::<u64, Scalar, ElementAligned>(base).is_ok());

        let odd = (base as usize + 4) as *const u64;
        let err = check_aligned::<u64, Scalar, Overaligned<8>>(odd).unwrap_err();
        assert!(matches!(err, SimdError::Misaligned { alignment: 8, .. }));
    }
}
