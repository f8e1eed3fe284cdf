//! Typed views of raw registers and packed lane masks.
//!
//! [`Storage<T, R>`] wraps one raw register `R` and exposes it as
//! `size_of::<R>() / size_of::<T>()` lanes of `T`. It is the member type of
//! every register ABI. [`Bitmask`] is the bit-per-lane mask representation used
//! by fixed-size masks and by mask conversions. [`bit_cast`] is the single
//! sanctioned way to reinterpret one register type as another.

use std::fmt;
use std::marker::PhantomData;
use std::mem;

use crate::simd::element::Vectorizable;

/// Plain-old-data register types.
///
/// # Safety
///
/// Implementors must be `Copy`, have no padding and accept every bit pattern,
/// including all zeroes.
pub unsafe trait Register: Copy + Send + Sync + 'static {}

macro_rules! impl_register {
    ($($t:ty),* $(,)?) => {
        $(
            // SAFETY: primitive numeric types accept every bit pattern.
            unsafe impl Register for $t {}
        )*
    };
}

impl_register!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

/// A register of raw type `R` viewed as lanes of `T`.
#[repr(transparent)]
pub struct Storage<T, R> {
    raw: R,
    lanes: PhantomData<T>,
}

impl<T, R: Copy> Clone for Storage<T, R> {
    #[inline(always)]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, R: Copy> Copy for Storage<T, R> {}

struct AssertFits<T, R, const N: usize>(PhantomData<(T, R)>);

impl<T, R, const N: usize> AssertFits<T, R, N> {
    const OK: () = assert!(
        N * mem::size_of::<T>() <= mem::size_of::<R>(),
        "more lanes than the register can hold"
    );
}

struct AssertSameSize<A, B>(PhantomData<(A, B)>);

impl<A, B> AssertSameSize<A, B> {
    const OK: () = assert!(
        mem::size_of::<A>() == mem::size_of::<B>(),
        "bit_cast between types of different size"
    );
}

impl<T: Vectorizable, R: Register> Storage<T, R> {
    /// Number of `T` lanes the register holds.
    pub const CAPACITY: usize = mem::size_of::<R>() / mem::size_of::<T>();

    #[inline(always)]
    pub const fn from_raw(raw: R) -> Self {
        Self {
            raw,
            lanes: PhantomData,
        }
    }

    #[inline(always)]
    pub fn raw(self) -> R {
        self.raw
    }

    /// All lanes zero.
    #[inline(always)]
    pub fn zeroed() -> Self {
        // SAFETY: `Register` types accept the all-zero bit pattern.
        Self::from_raw(unsafe { mem::zeroed() })
    }

    /// Builds a register holding `lanes` in index order; remaining lanes are
    /// zero. Rejected at compile time when `N` lanes do not fit.
    #[inline]
    pub fn from_lanes<const N: usize>(lanes: [T; N]) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = AssertFits::<T, R, N>::OK;

        let mut storage = Self::zeroed();
        for (i, lane) in lanes.into_iter().enumerate() {
            storage.set(i, lane);
        }
        storage
    }

    /// Lane `i` by value. `i` must be below [`Self::CAPACITY`].
    #[inline(always)]
    pub fn get(&self, i: usize) -> T {
        debug_assert!(i < Self::CAPACITY, "lane {i} out of range");
        // SAFETY: `R` holds `CAPACITY` lanes of `T` and is at least as aligned
        // as `T`.
        unsafe { (&self.raw as *const R).cast::<T>().add(i).read_unaligned() }
    }

    /// Overwrites lane `i`. `i` must be below [`Self::CAPACITY`].
    #[inline(always)]
    pub fn set(&mut self, i: usize, value: T) {
        debug_assert!(i < Self::CAPACITY, "lane {i} out of range");
        // SAFETY: see `get`.
        unsafe { (&mut self.raw as *mut R).cast::<T>().add(i).write_unaligned(value) }
    }

    /// Reinterprets the register bits as another register/lane type. This is
    /// not a numeric conversion.
    #[inline(always)]
    pub fn reinterpret<U: Vectorizable, R2: Register>(self) -> Storage<U, R2> {
        Storage::from_raw(bit_cast::<R, R2>(self.raw))
    }
}

impl<T: Vectorizable, R: Register> fmt::Debug for Storage<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries((0..Self::CAPACITY).map(|i| self.get(i)))
            .finish()
    }
}

/// Reinterprets the bits of `value` as `B`. Both types must have the same size;
/// this is checked when the call is monomorphised.
#[inline(always)]
pub fn bit_cast<A: Copy, B: Copy>(value: A) -> B {
    #[allow(clippy::let_unit_value)]
    let () = AssertSameSize::<A, B>::OK;
    // SAFETY: same size, and both sides are plain data.
    unsafe { mem::transmute_copy(&value) }
}

/// [`bit_cast`] for generic code that cannot prove equal sizes statically.
/// Branches taking this path are selected by constants, so the size check
/// folds away.
#[inline(always)]
pub(crate) fn bit_cast_checked<A: Copy, B: Copy>(value: A) -> B {
    assert_eq!(
        mem::size_of::<A>(),
        mem::size_of::<B>(),
        "register reinterpretation between types of different size"
    );
    // SAFETY: sizes were just checked; both sides are plain data.
    unsafe { mem::transmute_copy(&value) }
}

/// Bits `0..lanes` set.
#[inline(always)]
pub const fn lane_bits(lanes: usize) -> u64 {
    if lanes >= 64 {
        u64::MAX
    } else {
        (1u64 << lanes) - 1
    }
}

/// One bit per lane, lane 0 in the least significant bit.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Bitmask(u64);

impl Bitmask {
    #[inline(always)]
    pub const fn new(bits: u64) -> Self {
        Self(bits)
    }

    /// `bits` with every lane at or above `lanes` cleared.
    #[inline(always)]
    pub const fn truncated(bits: u64, lanes: usize) -> Self {
        Self(bits & lane_bits(lanes))
    }

    #[inline(always)]
    pub const fn bits(self) -> u64 {
        self.0
    }

    #[inline(always)]
    pub const fn get(self, i: usize) -> bool {
        (self.0 >> i) & 1 == 1
    }

    #[inline(always)]
    pub fn set(&mut self, i: usize, value: bool) {
        if value {
            self.0 |= 1 << i;
        } else {
            self.0 &= !(1 << i);
        }
    }

    #[inline(always)]
    pub const fn count_ones(self) -> u32 {
        self.0.count_ones()
    }

    #[inline(always)]
    pub const fn first_set(self) -> Option<usize> {
        if self.0 == 0 {
            None
        } else {
            Some(self.0.trailing_zeros() as usize)
        }
    }

    #[inline(always)]
    pub const fn last_set(self) -> Option<usize> {
        if self.0 == 0 {
            None
        } else {
            Some(63 - self.0.leading_zeros() as usize)
        }
    }

    /// Bits `lanes` positions further up, for placing a chunk's mask.
    #[inline(always)]
    pub const fn shifted_up(self, lanes: usize) -> Self {
        Self(self.0 << lanes)
    }

    /// The `lanes` bits starting at `offset`, moved down to bit 0.
    #[inline(always)]
    pub const fn window(self, offset: usize, lanes: usize) -> Self {
        Self((self.0 >> offset) & lane_bits(lanes))
    }
}

impl fmt::Debug for Bitmask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bitmask({:#b})", self.0)
    }
}
