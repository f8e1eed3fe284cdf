//! `FixedSize<N>` vectors at widths that do not match any register.
//!
//! A 13-lane vector is built out of several native chunks plus a remainder;
//! every operation must still behave exactly like `N` independent lanes.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use simdabi::simd::{
    all_of, find_first_set, find_last_set, popcount, reduce, simd_cast, static_simd_cast, where_,
    ElementAligned, FixedSize, FixedSizeSimd, FixedSizeSimdMask, NativeSimd, Plus,
};

fn random_array<const N: usize>(rng: &mut StdRng) -> [f32; N] {
    std::array::from_fn(|_| rng.random_range(-100.0..100.0))
}

fn check_width<const N: usize>(seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let a = random_array::<N>(&mut rng);
    let b = random_array::<N>(&mut rng);
    let x = FixedSizeSimd::<f32, N>::from_array(a);
    let y = FixedSizeSimd::<f32, N>::from_array(b);

    assert_eq!(FixedSizeSimd::<f32, N>::LANES, N);
    assert_eq!(x.to_vec(), a.to_vec());
    assert_eq!((x * y + x).to_vec(), (0..N).map(|i| a[i] * b[i] + a[i]).collect::<Vec<_>>());
    assert_eq!((x / y).to_vec(), (0..N).map(|i| a[i] / b[i]).collect::<Vec<_>>());

    let k = x.simd_lt(y);
    let expected: Vec<bool> = (0..N).map(|i| a[i] < b[i]).collect();
    assert_eq!(k.to_vec(), expected);
    assert_eq!(popcount(k), expected.iter().filter(|&&lane| lane).count());
    assert_eq!(find_first_set(k), expected.iter().position(|&lane| lane));
    assert_eq!(find_last_set(k), expected.iter().rposition(|&lane| lane));

    let mut z = x;
    where_(&k, &mut z).assign(y);
    assert_eq!(z.to_vec(), (0..N).map(|i| a[i].max(b[i])).collect::<Vec<_>>());

    let ints = static_simd_cast::<i32, FixedSize<N>, _, _>(x);
    assert_eq!(ints.to_vec(), a.iter().map(|&v| v as i32).collect::<Vec<_>>());
    let sum = reduce(ints, Plus);
    assert_eq!(sum, a.iter().map(|&v| v as i32).sum::<i32>());

    let wide = simd_cast::<f64, FixedSize<N>, _, _>(x);
    assert_eq!(wide.to_vec(), a.iter().map(|&v| v as f64).collect::<Vec<_>>());

    let mut out = [0.0f32; N];
    x.copy_to(&mut out, ElementAligned);
    assert_eq!(out, a);
}

#[test]
fn test_odd_widths() {
    check_width::<1>(1);
    check_width::<3>(3);
    check_width::<5>(5);
    check_width::<7>(7);
    check_width::<13>(13);
    check_width::<17>(17);
    check_width::<31>(31);
    check_width::<32>(32);
}

#[test]
fn test_byte_lanes_across_chunks() {
    let mut rng = StdRng::seed_from_u64(2024);
    let a: [u8; 29] = std::array::from_fn(|_| rng.random());
    let b: [u8; 29] = std::array::from_fn(|_| rng.random());
    let x = FixedSizeSimd::<u8, 29>::from_array(a);
    let y = FixedSizeSimd::<u8, 29>::from_array(b);

    assert_eq!((x + y).to_vec(), (0..29).map(|i| a[i].wrapping_add(b[i])).collect::<Vec<_>>());
    assert_eq!(x.simd_gt(y).to_vec(), (0..29).map(|i| a[i] > b[i]).collect::<Vec<_>>());
    assert_eq!((x >> 3u32).to_vec(), a.iter().map(|&v| v >> 3).collect::<Vec<_>>());

    let widened: FixedSizeSimd<u16, 29> = x.into();
    assert_eq!(reduce(widened, Plus), a.iter().map(|&v| v as u16).sum::<u16>());
}

#[test]
fn test_masks_keep_exactly_n_bits() {
    let all = FixedSizeSimdMask::<i64, 13>::splat(true);
    assert_eq!(all.to_bitset(), (1 << 13) - 1);
    assert!(all_of(all));
    assert_eq!((!all).to_bitset(), 0);

    let k = FixedSizeSimdMask::<i64, 13>::from_fn(|i| i % 3 == 0);
    assert_eq!(popcount(k), 5);
    assert_eq!(k.cast::<f32>().to_bitset(), k.to_bitset());
}

#[test]
fn test_native_round_trip() {
    let x = NativeSimd::<f32>::from_fn(|i| i as f32 * 0.25);
    let fixed = static_simd_cast::<f32, FixedSize<{ NativeSimd::<f32>::LANES }>, _, _>(x);
    assert_eq!(fixed.to_vec(), x.to_vec());
    assert_eq!(fixed.to_native(), x);
}

#[test]
fn test_split_and_concat() {
    let x = FixedSizeSimd::<i32, 12>::from_fn(|i| i as i32 * 3);
    let parts = x.split::<FixedSize<4>, 3>();
    assert_eq!(parts[2].to_vec(), vec![24, 27, 30, 33]);
    assert_eq!(FixedSizeSimd::<i32, 12>::concat(parts), x);

    let [lo, hi] = x.split::<FixedSize<6>, 2>();
    assert_eq!(FixedSizeSimd::<i32, 12>::concat([hi, lo]).get(0), 18);
}

macro_rules! zero_divisor_widths {
    ($($name:ident: $t:ty;)*) => {$(
        #[test]
        fn $name() {
            let mut rng = StdRng::seed_from_u64(0xd1f0 + <$t>::BITS as u64);
            let a: [$t; 13] = std::array::from_fn(|_| rng.random());
            let x = FixedSizeSimd::<$t, 13>::from_array(a);

            // One zero divisor per run, walked over every lane.
            for zero_at in 0..13 {
                let b: [$t; 13] = std::array::from_fn(|i| if i == zero_at { 0 } else { (i as $t) + 1 });
                let y = FixedSizeSimd::<$t, 13>::from_array(b);

                let quot = (x / y).to_vec();
                let rem = (x % y).to_vec();
                assert_eq!(quot[zero_at], 0, "div by zero in lane {zero_at}");
                assert_eq!(rem[zero_at], 0, "rem by zero in lane {zero_at}");
                for i in (0..13).filter(|&i| i != zero_at) {
                    assert_eq!(quot[i], a[i].wrapping_div(b[i]), "div lane {i}");
                    assert_eq!(rem[i], a[i].wrapping_rem(b[i]), "rem lane {i}");
                }
            }
        }
    )*};
}

zero_divisor_widths! {
    test_zero_divisor_i8: i8;
    test_zero_divisor_u8: u8;
    test_zero_divisor_i16: i16;
    test_zero_divisor_u16: u16;
    test_zero_divisor_i32: i32;
    test_zero_divisor_u32: u32;
    test_zero_divisor_i64: i64;
    test_zero_divisor_u64: u64;
}
