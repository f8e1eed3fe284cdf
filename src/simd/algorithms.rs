//! Slice algorithms on top of `Simd<T, A>`.
//!
//! A slice is walked in full vectors of `Simd::<T, A>::LANES` elements; the
//! trailing elements, if any, are loaded into one zero-padded vector through
//! a masked load and written back through a masked store, so the callback is
//! always handed a full vector.
//!
//! The `par_*` variants split the slice with rayon into chunks that are a
//! multiple of the lane count, so only the last chunk has a remainder. Inputs
//! shorter than [`PARALLEL_SIMD_THRESHOLD`] stay on the calling thread.

use rayon::prelude::*;

use crate::error::{length_mismatch, Result};
use crate::simd::abi::AbiTraits;
use crate::simd::capabilities::Capabilities;
use crate::simd::element::Vectorizable;
use crate::simd::flags::ElementAligned;
use crate::simd::mask::SimdMask;
use crate::simd::simd::Simd;
use crate::simd::storage::lane_bits;
use crate::simd::where_expr::{where_, where_ref};

/// Element count from which the `par_*` algorithms go multi-threaded.
pub const PARALLEL_SIMD_THRESHOLD: usize = 1 << 16;

/// Elements handed to one rayon task, rounded down to whole vectors.
pub const PARALLEL_CHUNK_SIZE: usize = 1 << 14;

#[inline(always)]
fn leading<T: Vectorizable, A: AbiTraits<T>>(len: usize) -> SimdMask<T, A> {
    SimdMask::from_bitset(lane_bits(len))
}

#[inline]
fn load_padded<T: Vectorizable, A: AbiTraits<T>>(tail: &[T]) -> (Simd<T, A>, SimdMask<T, A>) {
    let k = leading::<T, A>(tail.len());
    let mut v = Simd::splat(T::ZERO);
    where_(&k, &mut v).copy_from(tail, ElementAligned);
    (v, k)
}

#[inline]
fn parallel_chunk<T: Vectorizable, A: AbiTraits<T>>() -> usize {
    let lanes = Simd::<T, A>::LANES;
    ((PARALLEL_CHUNK_SIZE / lanes) * lanes).max(lanes)
}

/// Calls `f` for every vector of `data`. The mask marks the lanes backed by
/// `data`: all of them for full vectors, the leading ones for the zero-padded
/// remainder.
///
/// ```rust
/// use simdabi::simd::{reduce, simd_for_each, NativeSimd, Plus};
///
/// let data: Vec<f32> = (1..=100).map(|i| i as f32).collect();
/// let mut total = 0.0;
/// simd_for_each(&data, |v: NativeSimd<f32>, _| total += reduce(v, Plus));
/// assert_eq!(total, 5050.0);
/// ```
pub fn simd_for_each<T, A, F>(data: &[T], mut f: F)
where
    T: Vectorizable,
    A: AbiTraits<T>,
    F: FnMut(Simd<T, A>, SimdMask<T, A>),
{
    let lanes = Simd::<T, A>::LANES;
    let mut chunks = data.chunks_exact(lanes);
    let full = SimdMask::splat(true);
    for chunk in chunks.by_ref() {
        f(Simd::from_slice(chunk, ElementAligned), full);
    }

    let tail = chunks.remainder();
    log::trace!(
        "simd_for_each: {} full vectors, {} remainder lanes",
        data.len() / lanes,
        tail.len()
    );
    if !tail.is_empty() {
        let (v, k) = load_padded(tail);
        f(v, k);
    }
}

/// Calls `f` on every vector of `data` and writes the result back. Padding
/// lanes of the remainder vector are discarded.
pub fn simd_for_each_mut<T, A, F>(data: &mut [T], mut f: F)
where
    T: Vectorizable,
    A: AbiTraits<T>,
    F: FnMut(&mut Simd<T, A>),
{
    let lanes = Simd::<T, A>::LANES;
    let mut chunks = data.chunks_exact_mut(lanes);
    for chunk in chunks.by_ref() {
        let mut v = Simd::from_slice(chunk, ElementAligned);
        f(&mut v);
        v.copy_to(chunk, ElementAligned);
    }

    let tail = chunks.into_remainder();
    if !tail.is_empty() {
        let (mut v, k) = load_padded::<T, A>(tail);
        f(&mut v);
        where_ref(&k, &v).copy_to(tail, ElementAligned);
    }
}

/// `output[i..i + LANES] = f(input[i..i + LANES])` over the whole slice.
///
/// Fails with [`SimdError::LengthMismatch`](crate::SimdError::LengthMismatch)
/// when `output` is not exactly as long as `input`.
pub fn simd_transform<T, A, F>(input: &[T], output: &mut [T], f: F) -> Result<()>
where
    T: Vectorizable,
    A: AbiTraits<T>,
    F: Fn(Simd<T, A>) -> Simd<T, A>,
{
    if output.len() != input.len() {
        return Err(length_mismatch(input.len(), output.len()));
    }
    transform_chunk(input, output, &f);
    Ok(())
}

/// Lane-wise binary form of [`simd_transform`]; all three slices must have
/// the same length.
pub fn simd_zip_transform<T, A, F>(a: &[T], b: &[T], output: &mut [T], f: F) -> Result<()>
where
    T: Vectorizable,
    A: AbiTraits<T>,
    F: Fn(Simd<T, A>, Simd<T, A>) -> Simd<T, A>,
{
    if b.len() != a.len() {
        return Err(length_mismatch(a.len(), b.len()));
    }
    if output.len() != a.len() {
        return Err(length_mismatch(a.len(), output.len()));
    }

    let lanes = Simd::<T, A>::LANES;
    let split = a.len() - a.len() % lanes;
    for ((x, y), out) in a[..split]
        .chunks_exact(lanes)
        .zip(b[..split].chunks_exact(lanes))
        .zip(output[..split].chunks_exact_mut(lanes))
    {
        let result = f(Simd::from_slice(x, ElementAligned), Simd::from_slice(y, ElementAligned));
        result.copy_to(out, ElementAligned);
    }

    if split < a.len() {
        let (x, k) = load_padded::<T, A>(&a[split..]);
        let (y, _) = load_padded::<T, A>(&b[split..]);
        where_ref(&k, &f(x, y)).copy_to(&mut output[split..], ElementAligned);
    }
    Ok(())
}

fn transform_chunk<T, A, F>(input: &[T], output: &mut [T], f: &F)
where
    T: Vectorizable,
    A: AbiTraits<T>,
    F: Fn(Simd<T, A>) -> Simd<T, A>,
{
    let lanes = Simd::<T, A>::LANES;
    let mut inputs = input.chunks_exact(lanes);
    let mut outputs = output.chunks_exact_mut(lanes);
    for (x, out) in inputs.by_ref().zip(outputs.by_ref()) {
        f(Simd::from_slice(x, ElementAligned)).copy_to(out, ElementAligned);
    }

    let tail = inputs.remainder();
    if !tail.is_empty() {
        let (v, k) = load_padded::<T, A>(tail);
        where_ref(&k, &f(v)).copy_to(outputs.into_remainder(), ElementAligned);
    }
}

/// Multi-threaded [`simd_for_each_mut`].
pub fn par_simd_for_each_mut<T, A, F>(data: &mut [T], f: F)
where
    T: Vectorizable,
    A: AbiTraits<T>,
    F: Fn(&mut Simd<T, A>) + Sync + Send,
{
    if data.len() < PARALLEL_SIMD_THRESHOLD {
        return simd_for_each_mut::<T, A, _>(data, f);
    }

    Capabilities::log_summary();
    let chunk_size = parallel_chunk::<T, A>();
    log::trace!(
        "par_simd_for_each_mut: {} elements in chunks of {chunk_size}",
        data.len()
    );
    data.par_chunks_mut(chunk_size)
        .for_each(|chunk| simd_for_each_mut::<T, A, _>(chunk, &f));
}

/// Multi-threaded [`simd_transform`].
pub fn par_simd_transform<T, A, F>(input: &[T], output: &mut [T], f: F) -> Result<()>
where
    T: Vectorizable,
    A: AbiTraits<T>,
    F: Fn(Simd<T, A>) -> Simd<T, A> + Sync + Send,
{
    if output.len() != input.len() {
        return Err(length_mismatch(input.len(), output.len()));
    }
    if input.len() < PARALLEL_SIMD_THRESHOLD {
        transform_chunk(input, output, &f);
        return Ok(());
    }

    Capabilities::log_summary();
    let chunk_size = parallel_chunk::<T, A>();
    log::trace!(
        "par_simd_transform: {} elements in chunks of {chunk_size}",
        input.len()
    );
    output
        .par_chunks_mut(chunk_size)
        .zip(input.par_chunks(chunk_size))
        .for_each(|(out, x)| transform_chunk(x, out, &f));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimdError;
    use crate::simd::reduction::{popcount, reduce};
    use crate::simd::simd::{FixedSizeSimd, NativeSimd};
    use crate::simd::traits::Plus;

    mod sequential_tests {
        use super::*;

        #[test]
        fn test_for_each_sees_padding_mask() {
            let data: Vec<i32> = (0..11).collect();
            let mut seen = 0;
            let mut total = 0;
            simd_for_each(&data, |v: FixedSizeSimd<i32, 4>, k| {
                seen += popcount(k);
                total += reduce(v, Plus);
            });
            assert_eq!(seen, 11);
            assert_eq!(total, 55);
        }

        #[test]
        fn test_for_each_mut_keeps_tail_intact() {
            let mut data: Vec<u16> = (0..7).collect();
            simd_for_each_mut(&mut data[..6], |v: &mut FixedSizeSimd<u16, 4>| *v += 10);
            assert_eq!(data, vec![10, 11, 12, 13, 14, 15, 6]);
        }

        #[test]
        fn test_transform_and_zip() {
            let input: Vec<f64> = (0..19).map(|i| i as f64).collect();
            let mut output = vec![0.0; 19];
            simd_transform(&input, &mut output, |v: NativeSimd<f64>| v * 2.0).unwrap();
            assert!(output.iter().enumerate().all(|(i, &x)| x == 2.0 * i as f64));

            let mut sums = vec![0.0; 19];
            simd_zip_transform(&input, &output, &mut sums, |a: NativeSimd<f64>, b| a + b).unwrap();
            assert!(sums.iter().enumerate().all(|(i, &x)| x == 3.0 * i as f64));
        }

        #[test]
        fn test_length_mismatch() {
            let input = [1.0f32; 8];
            let mut output = [0.0f32; 7];
            let err = simd_transform(&input, &mut output, |v: NativeSimd<f32>| v).unwrap_err();
            assert_eq!(err, SimdError::LengthMismatch { expected: 8, actual: 7 });

            let err = simd_zip_transform(&input, &input[..4], &mut [0.0; 8], |a: NativeSimd<f32>, _| a)
                .unwrap_err();
            assert_eq!(err, length_mismatch(8, 4));
        }

        #[test]
        fn test_empty_input() {
            let mut calls = 0;
            simd_for_each(&[] as &[u8], |_: NativeSimd<u8>, _| calls += 1);
            assert_eq!(calls, 0);
            assert!(simd_transform(&[], &mut [], |v: NativeSimd<u8>| v).is_ok());
        }
    }

    mod parallel_tests {
        use super::*;

        #[test]
        fn test_par_matches_sequential() {
            let len = PARALLEL_SIMD_THRESHOLD * 2 + 13;
            let input: Vec<f32> = (0..len).map(|i| (i % 1000) as f32 * 0.5).collect();

            let mut sequential = vec![0.0; len];
            let mut parallel = vec![0.0; len];
            let f = |v: NativeSimd<f32>| v * v + 1.0;
            simd_transform(&input, &mut sequential, f).unwrap();
            par_simd_transform(&input, &mut parallel, f).unwrap();
            assert_eq!(sequential, parallel);

            let mut data = input.clone();
            par_simd_for_each_mut(&mut data, |v: &mut NativeSimd<f32>| *v = *v * *v + 1.0);
            assert_eq!(data, sequential);
        }

        #[test]
        fn test_small_par_input_stays_sequential() {
            let mut data = vec![3i64; 100];
            par_simd_for_each_mut(&mut data, |v: &mut NativeSimd<i64>| *v *= 2);
            assert!(data.iter().all(|&x| x == 6));
        }
    }
}
