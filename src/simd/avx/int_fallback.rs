//! Integer lanes in `ymm` registers without AVX2: every primitive is the
//! lane-wise default.

#[cfg(target_arch = "x86")]
use std::arch::x86::__m256i;

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::__m256i;

use crate::simd::isa::{Avx, IsaIntLane, IsaLane};

macro_rules! avx_int_fallback {
    ($($t:ty),*) => {
        $(
            impl IsaLane<Avx> for $t {
                type Reg = __m256i;
                type MaskReg = __m256i;
            }

            impl IsaIntLane<Avx> for $t {}
        )*
    };
}

avx_int_fallback!(i8, u8, i16, u16, i32, u32, i64, u64);
