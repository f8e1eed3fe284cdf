//! Lane-wise arithmetic of native vectors compared against scalar code.
//!
//! Every element type runs the same battery on random inputs: the vector
//! result must match the scalar operation lane for lane, bit for bit.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use simdabi::simd::{hmax, hmin, reduce, ElementAligned, Multiplies, NativeSimd, Plus};

const ROUNDS: usize = 200;

fn pairwise<T: Copy, U>(a: &[T], b: &[T], f: impl Fn(T, T) -> U) -> Vec<U> {
    a.iter().zip(b).map(|(&p, &q)| f(p, q)).collect()
}

macro_rules! integer_suite {
    ($($name:ident: $t:ty;)*) => {$(
        #[test]
        fn $name() {
            let mut rng = StdRng::seed_from_u64(0x5eed_0000 + <$t>::BITS as u64);
            let lanes = NativeSimd::<$t>::LANES;

            for round in 0..ROUNDS {
                let a: Vec<$t> = (0..lanes).map(|_| rng.random()).collect();
                let mut b: Vec<$t> = (0..lanes).map(|_| rng.random()).collect();
                if round % 4 == 0 {
                    b[round % lanes] = 0;
                }

                let x = NativeSimd::<$t>::from_slice(&a, ElementAligned);
                let y = NativeSimd::<$t>::from_slice(&b, ElementAligned);

                assert_eq!((x + y).to_vec(), pairwise(&a, &b, <$t>::wrapping_add), "add {a:?} {b:?}");
                assert_eq!((x - y).to_vec(), pairwise(&a, &b, <$t>::wrapping_sub), "sub {a:?} {b:?}");
                assert_eq!((x * y).to_vec(), pairwise(&a, &b, <$t>::wrapping_mul), "mul {a:?} {b:?}");
                assert_eq!(
                    (x / y).to_vec(),
                    pairwise(&a, &b, |p, q| if q == 0 { 0 } else { p.wrapping_div(q) }),
                    "div {a:?} {b:?}"
                );
                assert_eq!(
                    (x % y).to_vec(),
                    pairwise(&a, &b, |p, q| if q == 0 { 0 } else { p.wrapping_rem(q) }),
                    "rem {a:?} {b:?}"
                );

                assert_eq!((x & y).to_vec(), pairwise(&a, &b, |p, q| p & q));
                assert_eq!((x | y).to_vec(), pairwise(&a, &b, |p, q| p | q));
                assert_eq!((x ^ y).to_vec(), pairwise(&a, &b, |p, q| p ^ q));
                assert_eq!((!x).to_vec(), a.iter().map(|&p| !p).collect::<Vec<_>>());
                assert_eq!((-x).to_vec(), a.iter().map(|&p| p.wrapping_neg()).collect::<Vec<_>>());

                assert_eq!(x.simd_lt(y).to_vec(), pairwise(&a, &b, |p, q| p < q), "lt {a:?} {b:?}");
                assert_eq!(x.simd_le(y).to_vec(), pairwise(&a, &b, |p, q| p <= q), "le {a:?} {b:?}");
                assert_eq!(x.simd_gt(y).to_vec(), pairwise(&a, &b, |p, q| p > q), "gt {a:?} {b:?}");
                assert_eq!(x.simd_eq(x).to_vec(), vec![true; lanes]);
                assert_eq!(x.simd_ne(y).to_vec(), pairwise(&a, &b, |p, q| p != q));

                let count = rng.random_range(0..<$t>::BITS);
                assert_eq!((x << count).to_vec(), a.iter().map(|&p| p << count).collect::<Vec<_>>());
                assert_eq!((x >> count).to_vec(), a.iter().map(|&p| p >> count).collect::<Vec<_>>());

                let counts: Vec<$t> = (0..lanes).map(|_| rng.random_range(0..<$t>::BITS) as $t).collect();
                let c = NativeSimd::<$t>::from_slice(&counts, ElementAligned);
                assert_eq!((x << c).to_vec(), pairwise(&a, &counts, |p, n| p << n as u32));
                assert_eq!((x >> c).to_vec(), pairwise(&a, &counts, |p, n| p >> n as u32));

                assert_eq!(hmin(x), *a.iter().min().unwrap());
                assert_eq!(hmax(x), *a.iter().max().unwrap());
                assert_eq!(reduce(x, Plus), a.iter().fold(0, |s: $t, &p| s.wrapping_add(p)));
                assert_eq!(reduce(x, Multiplies), a.iter().fold(1, |s: $t, &p| s.wrapping_mul(p)));
            }
        }
    )*};
}

integer_suite! {
    test_i8_lanes: i8;
    test_u8_lanes: u8;
    test_i16_lanes: i16;
    test_u16_lanes: u16;
    test_i32_lanes: i32;
    test_u32_lanes: u32;
    test_i64_lanes: i64;
    test_u64_lanes: u64;
}

#[test]
fn test_shift_counts_past_the_width() {
    let x = NativeSimd::<i16>::splat(-300);
    assert_eq!(x << 16u32, NativeSimd::splat(0));
    assert_eq!(x >> 40u32, NativeSimd::splat(-1));
    assert_eq!(NativeSimd::<u32>::splat(u32::MAX) >> 32u32, NativeSimd::splat(0));
}

#[test]
fn test_signed_division_edges() {
    let x = NativeSimd::<i32>::splat(i32::MIN);
    assert_eq!(x / NativeSimd::splat(-1), x);
    assert_eq!(x % NativeSimd::splat(-1), NativeSimd::splat(0));
    assert_eq!(NativeSimd::<i8>::splat(-7) / NativeSimd::splat(2), NativeSimd::splat(-3));
    assert_eq!(NativeSimd::<i8>::splat(-7) % NativeSimd::splat(2), NativeSimd::splat(-1));
}

macro_rules! float_suite {
    ($($name:ident: $t:ty;)*) => {$(
        #[test]
        fn $name() {
            let mut rng = StdRng::seed_from_u64(0xf10a7 + std::mem::size_of::<$t>() as u64);
            let lanes = NativeSimd::<$t>::LANES;

            for _ in 0..ROUNDS {
                let a: Vec<$t> = (0..lanes).map(|_| rng.random_range(-1000.0..1000.0)).collect();
                let b: Vec<$t> = (0..lanes).map(|_| rng.random_range(-1000.0..1000.0)).collect();
                let x = NativeSimd::<$t>::from_slice(&a, ElementAligned);
                let y = NativeSimd::<$t>::from_slice(&b, ElementAligned);

                assert_eq!((x + y).to_vec(), pairwise(&a, &b, |p, q| p + q));
                assert_eq!((x - y).to_vec(), pairwise(&a, &b, |p, q| p - q));
                assert_eq!((x * y).to_vec(), pairwise(&a, &b, |p, q| p * q));
                assert_eq!((x / y).to_vec(), pairwise(&a, &b, |p, q| p / q));
                assert_eq!((-x).to_vec(), a.iter().map(|&p| -p).collect::<Vec<_>>());

                assert_eq!(simdabi::simd::min(x, y).to_vec(), pairwise(&a, &b, <$t>::min));
                assert_eq!(simdabi::simd::max(x, y).to_vec(), pairwise(&a, &b, <$t>::max));
                assert_eq!(simdabi::simd::abs(x).to_vec(), a.iter().map(|p| p.abs()).collect::<Vec<_>>());
                assert_eq!(simdabi::simd::sqrt(simdabi::simd::abs(x)).to_vec(), a.iter().map(|p| p.abs().sqrt()).collect::<Vec<_>>());
                assert_eq!(simdabi::simd::floor(x).to_vec(), a.iter().map(|p| p.floor()).collect::<Vec<_>>());
                assert_eq!(simdabi::simd::ceil(x).to_vec(), a.iter().map(|p| p.ceil()).collect::<Vec<_>>());
                assert_eq!(simdabi::simd::trunc(x).to_vec(), a.iter().map(|p| p.trunc()).collect::<Vec<_>>());
                assert_eq!(simdabi::simd::round(x).to_vec(), a.iter().map(|p| p.round()).collect::<Vec<_>>());

                assert_eq!(x.simd_lt(y).to_vec(), pairwise(&a, &b, |p, q| p < q));
                assert_eq!(x.simd_ge(y).to_vec(), pairwise(&a, &b, |p, q| p >= q));

                assert_eq!(hmin(x), a.iter().copied().fold(<$t>::INFINITY, <$t>::min));
                assert_eq!(hmax(x), a.iter().copied().fold(<$t>::NEG_INFINITY, <$t>::max));
            }
        }
    )*};
}

float_suite! {
    test_f32_lanes: f32;
    test_f64_lanes: f64;
}

#[test]
fn test_float_specials() {
    let nan = NativeSimd::<f32>::splat(f32::NAN);
    let one = NativeSimd::<f32>::splat(1.0);

    assert!(!nan.simd_eq(nan).to_vec().into_iter().any(|lane| lane));
    assert!(nan.simd_ne(nan).to_vec().into_iter().all(|lane| lane));
    assert!(simdabi::simd::isnan(nan + one).to_vec().into_iter().all(|lane| lane));
    assert_eq!(one / NativeSimd::splat(0.0), NativeSimd::splat(f32::INFINITY));
    assert_eq!(-one / NativeSimd::splat(0.0), NativeSimd::splat(f32::NEG_INFINITY));
}

#[test]
fn test_scalar_on_the_left() {
    let x = NativeSimd::<f64>::from_fn(|i| i as f64 + 1.0);
    assert_eq!((2.0 * x).to_vec(), x.to_vec().iter().map(|v| 2.0 * v).collect::<Vec<_>>());
    assert_eq!((1.0 / x).to_vec(), x.to_vec().iter().map(|v| 1.0 / v).collect::<Vec<_>>());
    assert_eq!(10 - NativeSimd::<u8>::splat(3), NativeSimd::splat(7));
}
