//! Instruction sets compiled into this build.
//!
//! The ABI selection happens at compile time from the `have_*` flags emitted
//! by the build script; [`Capabilities`] exposes the same flags at runtime.

use std::fmt;
use std::sync::Once;

use crate::simd::isa::IsaFamily;

/// One `bool` per capability flag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Capabilities {
    pub sse2: bool,
    pub sse3: bool,
    pub ssse3: bool,
    pub sse4_1: bool,
    pub sse4_2: bool,
    pub avx: bool,
    pub avx2: bool,
    pub fma: bool,
    pub avx512f: bool,
    pub avx512bw: bool,
    pub avx512dq: bool,
    pub avx512vl: bool,
    pub neon: bool,
}

impl Capabilities {
    /// The capabilities the crate was compiled with.
    pub const fn current() -> Self {
        Self {
            sse2: cfg!(have_sse2),
            sse3: cfg!(have_sse3),
            ssse3: cfg!(have_ssse3),
            sse4_1: cfg!(have_sse4_1),
            sse4_2: cfg!(have_sse4_2),
            avx: cfg!(have_avx),
            avx2: cfg!(have_avx2),
            fma: cfg!(have_fma),
            avx512f: cfg!(have_avx512f),
            avx512bw: cfg!(have_avx512bw),
            avx512dq: cfg!(have_avx512dq),
            avx512vl: cfg!(have_avx512vl),
            neon: cfg!(have_neon),
        }
    }

    /// Widest register family available for float lanes, `None` when only
    /// the scalar ABI is.
    pub const fn widest_tier(&self) -> Option<IsaFamily> {
        if self.avx512f {
            Some(IsaFamily::Avx512)
        } else if self.avx {
            Some(IsaFamily::Avx)
        } else if self.sse2 {
            Some(IsaFamily::Sse)
        } else if self.neon {
            Some(IsaFamily::Neon)
        } else {
            None
        }
    }

    /// Names of the enabled flags, in the order of the struct fields.
    pub fn enabled(&self) -> Vec<&'static str> {
        [
            (self.sse2, "sse2"),
            (self.sse3, "sse3"),
            (self.ssse3, "ssse3"),
            (self.sse4_1, "sse4.1"),
            (self.sse4_2, "sse4.2"),
            (self.avx, "avx"),
            (self.avx2, "avx2"),
            (self.fma, "fma"),
            (self.avx512f, "avx512f"),
            (self.avx512bw, "avx512bw"),
            (self.avx512dq, "avx512dq"),
            (self.avx512vl, "avx512vl"),
            (self.neon, "neon"),
        ]
        .into_iter()
        .filter_map(|(on, name)| on.then_some(name))
        .collect()
    }

    /// Logs the compiled-in tier at debug level, once per process.
    pub fn log_summary() {
        static SUMMARY: Once = Once::new();
        SUMMARY.call_once(|| log::debug!("simdabi capabilities: {}", Self::current()));
    }
}

impl fmt::Display for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.widest_tier() {
            Some(family) => write!(f, "{family:?}")?,
            None => f.write_str("scalar")?,
        }
        write!(f, " [{}]", self.enabled().join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simd::abi::AbiTraits;
    use crate::simd::simd::NativeSimd;

    #[test]
    fn test_current_matches_native_width() {
        let caps = Capabilities::current();
        let expected = caps.widest_tier().map_or(1, |family| family.register_bytes() / 4);
        assert_eq!(NativeSimd::<f32>::LANES, expected);
        assert_eq!(<crate::simd::abi::NativeAbi<f32> as AbiTraits<f32>>::LANES, expected);
    }

    #[test]
    fn test_implied_flags() {
        let caps = Capabilities::current();
        assert!(!caps.avx2 || caps.avx);
        assert!(!caps.avx512bw || caps.avx512f);
        assert!(!(caps.sse2 && caps.neon));
    }

    #[test]
    fn test_display_lists_enabled_flags() {
        let caps = Capabilities {
            sse2: true,
            avx: true,
            ..Capabilities::default()
        };
        assert_eq!(caps.to_string(), "Avx [sse2, avx]");
        assert_eq!(Capabilities::default().to_string(), "scalar []");
        Capabilities::log_summary();
    }
}
