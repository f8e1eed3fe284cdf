#![cfg_attr(
    all(
        any(target_arch = "x86", target_arch = "x86_64"),
        rustc_channel = "nightly"
    ),
    feature(avx512_target_feature, stdarch_x86_avx512)
)]
//! Compile-time dispatched SIMD vectors.
//!
//! `simdabi` lets numeric code be written once against the generic
//! [`Simd<T, A>`](simd::Simd) / [`SimdMask<T, A>`](simd::SimdMask) types while
//! the ABI tag `A` decides, at compile time, which instruction set every
//! operation is lowered to: scalar code, SSE, AVX/AVX2, AVX512 or NEON. The
//! `FixedSize<N>` ABI composes any lane count up to
//! [`MAX_FIXED_SIZE`](simd::abi::MAX_FIXED_SIZE) out of native registers.
//!
//! The instruction sets compiled in follow the target feature set
//! (`-C target-cpu=native`, `-C target-feature=+avx2`, ...), which `build.rs`
//! turns into `have_*` configuration flags.
//!
//! ```rust
//! use simdabi::simd::{where_, NativeSimd, Plus};
//!
//! let x = NativeSimd::<f32>::from_fn(|i| i as f32);
//! let y = x * 2.0 + 1.0;
//!
//! let mut z = y;
//! where_(&y.simd_gt(5.0.into()), &mut z).assign(0.0.into());
//!
//! assert_eq!(simdabi::simd::reduce(x, Plus), (0..NativeSimd::<f32>::LANES).sum::<usize>() as f32);
//! ```

pub mod error;
pub mod simd;
pub mod utils;

pub use error::{Result, SimdError};
