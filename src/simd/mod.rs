//! The vector types and everything that lowers them.
//!
//! Layers, from the bottom up:
//!
//! * [`storage`]: raw registers viewed as lanes of `T`.
//! * [`isa`] and the per-ISA modules: primitive operations on one register.
//! * [`scalar`], [`vector`], [`fixed_size`]: the implementation types that
//!   ABI tags ([`abi`]) resolve to, all implementing the [`traits`].
//! * [`simd`], [`mask`], [`where_expr`]: the generic front end.
//! * [`reduction`], [`math`], [`algorithms`]: functions over the front end.

#[cfg(have_sse2)]
mod sse;

#[cfg(have_avx)]
mod avx;

#[cfg(have_avx512f)]
mod avx512;

#[cfg(have_neon)]
mod neon;

pub mod abi;
pub mod algorithms;
pub mod capabilities;
pub mod converter;
pub mod element;
pub mod fixed_size;
pub mod flags;
pub mod isa;
pub mod mask;
pub mod math;
pub mod reduction;
pub mod scalar;
#[allow(clippy::module_inception)]
pub mod simd;
pub mod storage;
pub mod traits;
pub mod tuple;
pub mod vector;
pub mod where_expr;

pub use abi::{memory_alignment, CompatibleAbi, FixedSize, NativeAbi, Scalar};
pub use algorithms::{
    par_simd_for_each_mut, par_simd_transform, simd_for_each, simd_for_each_mut, simd_transform,
    simd_zip_transform,
};
pub use capabilities::Capabilities;
pub use element::{SimdFloat, SimdInteger, Vectorizable};
pub use flags::{ElementAligned, LoadStoreFlag, Overaligned, VectorAligned};
pub use mask::{FixedSizeSimdMask, NativeSimdMask, ScalarSimdMask, SimdMask};
pub use math::*;
pub use reduction::{
    all_of, any_of, find_first_set, find_last_set, hmax, hmin, none_of, popcount, reduce,
    reduce_masked, some_of,
};
pub use simd::{
    simd_cast, static_simd_cast, CompatibleSimd, FixedSizeSimd, LosslessInto, NativeSimd,
    ScalarSimd, Simd,
};
pub use traits::{BitAnd, BitOr, BitXor, Maximum, Minimum, Multiplies, Plus, ReduceOp};
pub use where_expr::{where_, where_ref, ConstWhereExpression, WhereExpression};
