//! Precision of the vector math functions against the standard library.
//!
//! Inputs are random with fixed seeds; each function is run over a slice with
//! `simd_transform` so remainders and full vectors are both covered.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use simdabi::simd::{simd_transform, simd_zip_transform, NativeAbi, NativeSimd};

const SAMPLES: usize = 1000;

/// Largest error of `actual` against `expected`, relative to
/// `max(|expected|, 1)`.
fn max_error(actual: &[f64], expected: &[f64]) -> (f64, usize) {
    actual
        .iter()
        .zip(expected)
        .enumerate()
        .map(|(i, (&got, &want))| {
            if (got.is_nan() && want.is_nan()) || got == want {
                (0.0, i)
            } else {
                ((got - want).abs() / want.abs().max(1.0), i)
            }
        })
        .fold((0.0, 0), |worst, e| if e.0 > worst.0 { e } else { worst })
}

fn check_f32(
    name: &str,
    range: std::ops::Range<f32>,
    simd: fn(NativeSimd<f32>) -> NativeSimd<f32>,
    scalar: fn(f32) -> f32,
    tolerance: f64,
) {
    let mut rng = StdRng::seed_from_u64(12345);
    let inputs: Vec<f32> = (0..SAMPLES).map(|_| rng.random_range(range.clone())).collect();
    let mut outputs = vec![0.0f32; SAMPLES];
    simd_transform(&inputs, &mut outputs, simd).unwrap();

    let actual: Vec<f64> = outputs.iter().map(|&v| v as f64).collect();
    let expected: Vec<f64> = inputs.iter().map(|&v| scalar(v) as f64).collect();
    let (error, at) = max_error(&actual, &expected);
    println!("{name}: max error {error:.2e} at input {}", inputs[at]);
    assert!(
        error <= tolerance,
        "{name}({}) = {} but std gives {} (error {error:.2e})",
        inputs[at],
        actual[at],
        expected[at]
    );
}

fn check_f64(
    name: &str,
    range: std::ops::Range<f64>,
    simd: fn(NativeSimd<f64>) -> NativeSimd<f64>,
    scalar: fn(f64) -> f64,
    tolerance: f64,
) {
    let mut rng = StdRng::seed_from_u64(67890);
    let inputs: Vec<f64> = (0..SAMPLES).map(|_| rng.random_range(range.clone())).collect();
    let mut outputs = vec![0.0f64; SAMPLES];
    simd_transform(&inputs, &mut outputs, simd).unwrap();

    let expected: Vec<f64> = inputs.iter().map(|&v| scalar(v)).collect();
    let (error, at) = max_error(&outputs, &expected);
    println!("{name}: max error {error:.2e} at input {}", inputs[at]);
    assert!(
        error <= tolerance,
        "{name}({}) = {} but std gives {} (error {error:.2e})",
        inputs[at],
        outputs[at],
        expected[at]
    );
}

mod trigonometry {
    use super::*;
    use simdabi::simd::{acos, asin, atan, cos, sin, tan};

    #[test]
    fn test_sin_cos_f32() {
        check_f32("sin", -100.0..100.0, sin, f32::sin, 1e-6);
        check_f32("cos", -100.0..100.0, cos, f32::cos, 1e-6);
    }

    #[test]
    fn test_sin_cos_f64() {
        check_f64("sin", -100.0..100.0, sin, f64::sin, 1e-14);
        check_f64("cos", -100.0..100.0, cos, f64::cos, 1e-14);
    }

    #[test]
    fn test_tan() {
        check_f32("tan", -1.4..1.4, tan, f32::tan, 2e-6);
        check_f64("tan", -1.4..1.4, tan, f64::tan, 1e-14);
    }

    #[test]
    fn test_inverse_functions() {
        check_f32("asin", -1.0..1.0, asin, f32::asin, 1e-6);
        check_f32("acos", -1.0..1.0, acos, f32::acos, 1e-6);
        check_f32("atan", -50.0..50.0, atan, f32::atan, 1e-6);
        check_f64("asin", -1.0..1.0, asin, f64::asin, 1e-15);
        check_f64("atan", -50.0..50.0, atan, f64::atan, 1e-14);
    }

    #[test]
    fn test_atan2_quadrants() {
        let mut rng = StdRng::seed_from_u64(24680);
        let y: Vec<f64> = (0..SAMPLES).map(|_| rng.random_range(-10.0..10.0)).collect();
        let x: Vec<f64> = (0..SAMPLES).map(|_| rng.random_range(-10.0..10.0)).collect();
        let mut out = vec![0.0; SAMPLES];
        simd_zip_transform(&y, &x, &mut out, simdabi::simd::atan2::<f64, NativeAbi<f64>>).unwrap();

        let expected: Vec<f64> = y.iter().zip(&x).map(|(&b, &a)| b.atan2(a)).collect();
        let (error, at) = max_error(&out, &expected);
        assert!(error <= 1e-14, "atan2({}, {}) error {error:.2e}", y[at], x[at]);
    }
}

mod exponentials {
    use super::*;
    use simdabi::simd::{exp, log, log10, log2};

    #[test]
    fn test_exp() {
        check_f32("exp", -80.0..80.0, exp, f32::exp, 1e-6);
        check_f64("exp", -700.0..700.0, exp, f64::exp, 1e-14);
    }

    #[test]
    fn test_logarithms() {
        check_f32("log", 1e-30..1e30, log, f32::ln, 1e-6);
        check_f32("log2", 1e-3..1e3, log2, f32::log2, 1e-6);
        check_f32("log10", 1e-3..1e3, log10, f32::log10, 1e-6);
        check_f64("log", 1e-300..1e300, log, f64::ln, 1e-14);
        check_f64("log2", 1e-3..1e3, log2, f64::log2, 1e-14);
        check_f64("log10", 1e-3..1e3, log10, f64::log10, 1e-14);
    }

    #[test]
    fn test_logarithm_of_small_inputs() {
        check_f64("log", 1e-8..2.0, log, f64::ln, 1e-14);
        check_f32("log", 1e-8..2.0, log, f32::ln, 1e-6);
    }
}

mod per_lane {
    use super::*;
    use simdabi::simd::{cbrt, cosh, exp2, sinh, tanh};

    #[test]
    fn test_match_std_exactly() {
        check_f64("sinh", -20.0..20.0, sinh, f64::sinh, 0.0);
        check_f64("cosh", -20.0..20.0, cosh, f64::cosh, 0.0);
        check_f64("tanh", -20.0..20.0, tanh, f64::tanh, 0.0);
        check_f32("cbrt", -1e6..1e6, cbrt, f32::cbrt, 0.0);
        check_f32("exp2", -100.0..100.0, exp2, f32::exp2, 0.0);
    }
}

mod helpers {
    use super::*;
    use simdabi::simd::{fma, frexp, hypot, ldexp};

    #[test]
    fn test_hypot_against_std() {
        let mut rng = StdRng::seed_from_u64(13579);
        let a: Vec<f32> = (0..SAMPLES).map(|_| rng.random_range(-1e3..1e3)).collect();
        let b: Vec<f32> = (0..SAMPLES).map(|_| rng.random_range(-1e3..1e3)).collect();
        let mut out = vec![0.0; SAMPLES];
        simd_zip_transform(&a, &b, &mut out, hypot::<f32, NativeAbi<f32>>).unwrap();
        for ((&x, &y), &h) in a.iter().zip(&b).zip(&out) {
            let want = x.hypot(y);
            assert!((h - want).abs() <= 5e-7 * want.max(1.0), "hypot({x}, {y}) = {h}, want {want}");
        }
    }

    #[test]
    fn test_fma_is_fused() {
        let a = NativeSimd::<f64>::splat(1.0 + f64::EPSILON);
        let b = NativeSimd::<f64>::splat(1.0 - f64::EPSILON);
        let c = NativeSimd::<f64>::splat(-1.0);
        let want = (1.0 + f64::EPSILON).mul_add(1.0 - f64::EPSILON, -1.0);
        assert_eq!(fma(a, b, c), NativeSimd::splat(want));
    }

    #[test]
    fn test_frexp_ldexp_round_trip() {
        let mut rng = StdRng::seed_from_u64(97531);
        for _ in 0..100 {
            let x = NativeSimd::<f64>::from_fn(|_| rng.random_range(-1e200..1e200));
            let (m, e) = frexp(x);
            assert!(m.to_vec().iter().all(|v| (0.5..1.0).contains(&v.abs())));
            assert_eq!(ldexp(m, e), x);
        }
    }
}
