//! `FixedSize<N>` vectors against the native vector of the same element
//! type, for widths that split into several chunks.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};

use simdabi::simd::{reduce, sin, static_simd_cast, FixedSize, FixedSizeSimd, NativeSimd, Plus};

fn benchmark_widths(c: &mut Criterion) {
    let mut group = c.benchmark_group("Fixed-size multiply-add");

    group.bench_function("native", |bench| {
        let x = NativeSimd::<f32>::from_fn(|i| i as f32);
        bench.iter(|| black_box(x) * black_box(x) + black_box(x))
    });

    group.bench_function("fixed 13", |bench| {
        let x = FixedSizeSimd::<f32, 13>::from_fn(|i| i as f32);
        bench.iter(|| black_box(x) * black_box(x) + black_box(x))
    });

    group.bench_function("fixed 32", |bench| {
        let x = FixedSizeSimd::<f32, 32>::from_fn(|i| i as f32);
        bench.iter(|| black_box(x) * black_box(x) + black_box(x))
    });

    group.finish();
}

fn benchmark_kernels(c: &mut Criterion) {
    let mut group = c.benchmark_group("Fixed-size kernels");

    group.bench_function("sin fixed 7", |bench| {
        let x = FixedSizeSimd::<f32, 7>::from_fn(|i| i as f32 * 0.3);
        bench.iter(|| sin(black_box(x)))
    });

    group.bench_function("reduce fixed 31", |bench| {
        let x = FixedSizeSimd::<u16, 31>::from_fn(|i| i as u16);
        bench.iter(|| reduce(black_box(x), Plus))
    });

    group.bench_function("convert fixed 12 f32 -> i32", |bench| {
        let x = FixedSizeSimd::<f32, 12>::from_fn(|i| i as f32 * 1.5);
        bench.iter(|| static_simd_cast::<i32, FixedSize<12>, _, _>(black_box(x)))
    });

    group.finish();
}

criterion_group!(benches, benchmark_widths, benchmark_kernels);
criterion_main!(benches);
