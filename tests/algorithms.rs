//! Slice algorithms, sequential and parallel, on sizes around the thresholds.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use simdabi::simd::algorithms::{PARALLEL_CHUNK_SIZE, PARALLEL_SIMD_THRESHOLD};
use simdabi::simd::{
    abs, cos, par_simd_for_each_mut, par_simd_transform, simd_for_each, simd_for_each_mut,
    simd_transform, simd_zip_transform, sqrt, FixedSizeSimd, NativeAbi, NativeSimd,
};
use simdabi::SimdError;

fn random_vec(len: usize, seed: u64) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.random_range(-10.0..10.0)).collect()
}

#[test]
fn test_parallel_abs_large_array() {
    let data: Vec<f32> = (0..100_000)
        .map(|i| if i % 2 == 0 { i as f32 } else { -(i as f32) })
        .collect();
    let mut result = vec![0.0; data.len()];
    par_simd_transform(&data, &mut result, abs::<f32, NativeAbi<f32>>).unwrap();

    for (i, &val) in result.iter().enumerate() {
        assert_eq!(val, i as f32, "par abs failed at index {i}");
    }
}

#[test]
fn test_parallel_matches_sequential_around_threshold() {
    for len in [
        PARALLEL_SIMD_THRESHOLD - 1,
        PARALLEL_SIMD_THRESHOLD,
        PARALLEL_SIMD_THRESHOLD + PARALLEL_CHUNK_SIZE + 3,
    ] {
        let data = random_vec(len, len as u64);
        let mut sequential = vec![0.0; len];
        let mut parallel = vec![0.0; len];

        simd_transform(&data, &mut sequential, cos::<f32, NativeAbi<f32>>).unwrap();
        par_simd_transform(&data, &mut parallel, cos::<f32, NativeAbi<f32>>).unwrap();
        assert_eq!(sequential, parallel, "length {len}");

        let mut in_place = data.clone();
        par_simd_for_each_mut(&mut in_place, |v: &mut NativeSimd<f32>| *v = cos(*v));
        assert_eq!(in_place, sequential, "length {len}");
    }
}

#[test]
fn test_sqrt_of_squares() {
    let data: Vec<f64> = (0..1001).map(|i| i as f64).collect();
    let mut squares = vec![0.0; data.len()];
    simd_zip_transform(&data, &data, &mut squares, |a: NativeSimd<f64>, b| a * b).unwrap();

    let mut roots = vec![0.0; data.len()];
    simd_transform(&squares, &mut roots, sqrt::<f64, NativeAbi<f64>>).unwrap();
    assert_eq!(roots, data);
}

#[test]
fn test_odd_lane_counts() {
    let mut data: Vec<i32> = (0..50).collect();
    simd_for_each_mut(&mut data, |v: &mut FixedSizeSimd<i32, 7>| *v *= 2);
    assert!(data.iter().enumerate().all(|(i, &x)| x == 2 * i as i32));

    let mut vectors = 0;
    let mut total = 0;
    simd_for_each(&data, |v: FixedSizeSimd<i32, 7>, k| {
        vectors += 1;
        total += simdabi::simd::reduce_masked(simdabi::simd::where_ref(&k, &v), 0, simdabi::simd::Plus);
    });
    assert_eq!(vectors, 8);
    assert_eq!(total, 2 * (0..50).sum::<i32>());
}

#[test]
fn test_mismatched_lengths_are_rejected() {
    let data = random_vec(10, 1);
    let mut short = vec![0.0; 9];
    assert_eq!(
        par_simd_transform(&data, &mut short, cos::<f32, NativeAbi<f32>>),
        Err(SimdError::LengthMismatch { expected: 10, actual: 9 })
    );
    assert!(simd_zip_transform(&data, &data[..5], &mut short, |a: NativeSimd<f32>, _| a).is_err());
}
