//! Numeric conversion between vectors with equal lane counts.
//!
//! [`convert`] maps `Simd<T, A>` to `Simd<U, B>` lane by lane with `as`
//! semantics. Pairs with a direct instruction (`cvttps2dq`, `pmovsx*`,
//! `vcvtq_*`, ...) take it; every other pair is converted one lane at a time.
//! Between two fixed-size ABIs the conversion is split along the union of
//! both chunk layouts so whole chunks still reach the instruction paths.

use std::marker::PhantomData;

use crate::simd::abi::{AbiKind, AbiTraits, MaskMember, SimdMember, MAX_LANES};
use crate::simd::element::{ElementKind, Vectorizable};
use crate::simd::storage::bit_cast_checked;
use crate::simd::traits::{MaskImpl, SimdImpl};
use crate::simd::tuple::{load_chunk, store_chunk, ChunkVisitor, Segments, TupleLayout};

struct SameLanes<T, A, U, B>(PhantomData<(T, A, U, B)>);

impl<T: Vectorizable, A: AbiTraits<T>, U: Vectorizable, B: AbiTraits<U>> SameLanes<T, A, U, B> {
    const OK: () = assert!(
        <A as AbiTraits<T>>::LANES == <B as AbiTraits<U>>::LANES,
        "conversion between vectors of different lane counts"
    );
}

/// Lane `i` of the result is `x[i] as U`. Rejected at compile time when the
/// lane counts differ.
#[inline]
pub fn convert<T, A, U, B>(x: SimdMember<T, A>) -> SimdMember<U, B>
where
    T: Vectorizable,
    A: AbiTraits<T>,
    U: Vectorizable,
    B: AbiTraits<U>,
{
    #[allow(clippy::let_unit_value)]
    let () = SameLanes::<T, A, U, B>::OK;

    match (A::KIND, B::KIND) {
        (AbiKind::FixedSize(_), AbiKind::FixedSize(_)) => convert_chunked::<T, A, U, B>(x),
        _ => convert_lanes::<T, A, U, B>(x),
    }
}

/// Mask conversion; lane `i` keeps its value.
#[inline]
pub fn convert_mask<T, A, U, B>(k: MaskMember<T, A>) -> MaskMember<U, B>
where
    T: Vectorizable,
    A: AbiTraits<T>,
    U: Vectorizable,
    B: AbiTraits<U>,
{
    #[allow(clippy::let_unit_value)]
    let () = SameLanes::<T, A, U, B>::OK;

    <B::Impl as MaskImpl<U>>::mask_from_bitset(<A::Impl as MaskImpl<T>>::mask_to_bitset(k))
}

/// Register-to-register conversion for callers that already know both sides
/// hold the same number of lanes.
#[inline(always)]
pub(crate) fn convert_lanes<T, A, U, B>(x: SimdMember<T, A>) -> SimdMember<U, B>
where
    T: Vectorizable,
    A: AbiTraits<T>,
    U: Vectorizable,
    B: AbiTraits<U>,
{
    debug_assert_eq!(A::LANES, B::LANES);

    if T::KIND == U::KIND && A::KIND == B::KIND {
        return bit_cast_checked(x);
    }
    if let Some(y) = fast_path::<SimdMember<T, A>, SimdMember<U, B>>((T::KIND, A::KIND, U::KIND, B::KIND), x) {
        return y;
    }

    <B::Impl as SimdImpl<U>>::generate(|i| <A::Impl as SimdImpl<T>>::get(x, i).cast::<U>())
}

fn convert_chunked<T, A, U, B>(x: SimdMember<T, A>) -> SimdMember<U, B>
where
    T: Vectorizable,
    A: AbiTraits<T>,
    U: Vectorizable,
    B: AbiTraits<U>,
{
    let lanes = A::LANES;
    let mut src = [T::ZERO; MAX_LANES];
    let mut dst = [U::ZERO; MAX_LANES];

    // SAFETY: both buffers hold MAX_LANES >= lanes elements.
    unsafe { <A::Impl as SimdImpl<T>>::store(x, src.as_mut_ptr(), false) };

    let from = TupleLayout::new(T::KIND, lanes);
    let to = TupleLayout::new(U::KIND, lanes);

    for segment in Segments::new(&from, &to).as_slice() {
        if segment.is_whole() {
            let mut outer = ConvertOuter {
                src: &src[..lanes],
                dst: &mut dst[..lanes],
                to: segment.to.abi,
            };
            let handled = T::visit_chunk(segment.from.abi, segment.offset, &mut outer);
            debug_assert!(handled, "no ABI tag for chunk {}", segment.from.abi);
        } else {
            let range = segment.offset..segment.offset + segment.lanes;
            for (d, s) in dst[range.clone()].iter_mut().zip(&src[range]) {
                *d = s.cast();
            }
        }
    }

    // SAFETY: see above.
    unsafe { <B::Impl as SimdImpl<U>>::load(dst.as_ptr(), false) }
}

/// Loads a source chunk and hands it to the destination chunk's ABI.
struct ConvertOuter<'a, T, U> {
    src: &'a [T],
    dst: &'a mut [U],
    to: AbiKind,
}

impl<T: Vectorizable, U: Vectorizable> ChunkVisitor<T> for ConvertOuter<'_, T, U> {
    fn visit<A: AbiTraits<T>>(&mut self, offset: usize) {
        let mut inner = ConvertInner::<T, A, U> {
            x: load_chunk::<T, A>(self.src, offset),
            dst: &mut *self.dst,
        };
        let handled = U::visit_chunk(self.to, offset, &mut inner);
        debug_assert!(handled, "no ABI tag for chunk {}", self.to);
    }
}

struct ConvertInner<'a, T: Vectorizable, A: AbiTraits<T>, U> {
    x: SimdMember<T, A>,
    dst: &'a mut [U],
}

impl<T: Vectorizable, A: AbiTraits<T>, U: Vectorizable> ChunkVisitor<U> for ConvertInner<'_, T, A, U> {
    fn visit<B: AbiTraits<U>>(&mut self, offset: usize) {
        store_chunk::<U, B>(convert_lanes::<T, A, U, B>(self.x), self.dst, offset);
    }
}

/// `(source element, source ABI, destination element, destination ABI)`.
type Route = (ElementKind, AbiKind, ElementKind, AbiKind);

#[inline(always)]
#[allow(unused_variables)]
fn fast_path<X: Copy, Y: Copy>(route: Route, x: X) -> Option<Y> {
    #[cfg(have_sse2)]
    if let Some(y) = x86::convert(route, x) {
        return Some(y);
    }

    #[cfg(have_neon)]
    if let Some(y) = neon::convert(route, x) {
        return Some(y);
    }

    None
}

#[cfg(have_sse2)]
mod x86 {
    #[cfg(target_arch = "x86")]
    use std::arch::x86::*;

    #[cfg(target_arch = "x86_64")]
    use std::arch::x86_64::*;

    use super::Route;
    use crate::simd::storage::bit_cast_checked as cast;

    #[allow(unused_imports)]
    use crate::simd::abi::AbiKind::{Avx, Avx512, Sse};
    #[allow(unused_imports)]
    use crate::simd::element::ElementKind::*;

    const TWO_POW_31: f32 = 2_147_483_648.0;

    /// `cvttps2dq` returns `i32::MIN` for every out of range lane. Lanes at or
    /// above 2^31 are flipped to `i32::MAX` and NaN lanes are cleared.
    #[inline(always)]
    unsafe fn cvtt_ps_epi32(x: __m128) -> __m128i {
        let r = _mm_cvttps_epi32(x);
        let high = _mm_castps_si128(_mm_cmpge_ps(x, _mm_set1_ps(TWO_POW_31)));
        let ordered = _mm_castps_si128(_mm_cmpord_ps(x, x));
        _mm_and_si128(_mm_xor_si128(r, high), ordered)
    }

    /// `u32` lanes below 2^31 convert exactly like `i32` lanes.
    #[inline(always)]
    unsafe fn cvt_epu32_ps(x: __m128i) -> Option<__m128> {
        if _mm_movemask_ps(_mm_castsi128_ps(x)) == 0 {
            Some(_mm_cvtepi32_ps(x))
        } else {
            None
        }
    }

    #[cfg(have_avx)]
    #[inline(always)]
    unsafe fn cvtt_ps_epi32_256(x: __m256) -> __m256i {
        let r = _mm256_castsi256_ps(_mm256_cvttps_epi32(x));
        let high = _mm256_cmp_ps::<_CMP_GE_OQ>(x, _mm256_set1_ps(TWO_POW_31));
        let ordered = _mm256_cmp_ps::<_CMP_ORD_Q>(x, x);
        _mm256_castps_si256(_mm256_and_ps(_mm256_xor_ps(r, high), ordered))
    }

    #[cfg(have_avx512f)]
    #[inline(always)]
    unsafe fn cvtt_ps_epi32_512(x: __m512) -> __m512i {
        let r = _mm512_cvttps_epi32(x);
        let high = _mm512_cmp_ps_mask::<_CMP_GE_OQ>(x, _mm512_set1_ps(TWO_POW_31));
        let r = _mm512_mask_mov_epi32(r, high, _mm512_set1_epi32(i32::MAX));
        let unordered = _mm512_cmp_ps_mask::<_CMP_UNORD_Q>(x, x);
        _mm512_mask_mov_epi32(r, unordered, _mm512_setzero_si512())
    }

    pub(super) fn convert<X: Copy, Y: Copy>(route: Route, x: X) -> Option<Y> {
        // SAFETY: every arm is compiled only when its instructions are
        // enabled, and the route fixes both register types.
        unsafe {
            match route {
                (F32, Sse(16), I32, Sse(16)) => Some(cast(cvtt_ps_epi32(cast(x)))),
                (I32, Sse(16), F32, Sse(16)) => Some(cast(_mm_cvtepi32_ps(cast(x)))),
                (U32, Sse(16), F32, Sse(16)) => cvt_epu32_ps(cast(x)).map(cast),
                (F32, Sse(8), F64, Sse(16)) => Some(cast(_mm_cvtps_pd(cast(x)))),
                (F64, Sse(16), F32, Sse(8)) => Some(cast(_mm_cvtpd_ps(cast(x)))),
                (I32, Sse(8), F64, Sse(16)) => Some(cast(_mm_cvtepi32_pd(cast(x)))),

                #[cfg(have_sse4_1)]
                (I16, Sse(8), I32 | U32, Sse(16)) => Some(cast(_mm_cvtepi16_epi32(cast(x)))),
                #[cfg(have_sse4_1)]
                (U16, Sse(8), I32 | U32, Sse(16)) => Some(cast(_mm_cvtepu16_epi32(cast(x)))),
                #[cfg(have_sse4_1)]
                (I8, Sse(4), I32 | U32, Sse(16)) => Some(cast(_mm_cvtepi8_epi32(cast(x)))),
                #[cfg(have_sse4_1)]
                (U8, Sse(4), I32 | U32, Sse(16)) => Some(cast(_mm_cvtepu8_epi32(cast(x)))),
                #[cfg(have_sse4_1)]
                (I8, Sse(8), I16 | U16, Sse(16)) => Some(cast(_mm_cvtepi8_epi16(cast(x)))),
                #[cfg(have_sse4_1)]
                (U8, Sse(8), I16 | U16, Sse(16)) => Some(cast(_mm_cvtepu8_epi16(cast(x)))),
                #[cfg(have_sse4_1)]
                (I32, Sse(8), I64 | U64, Sse(16)) => Some(cast(_mm_cvtepi32_epi64(cast(x)))),
                #[cfg(have_sse4_1)]
                (U32, Sse(8), I64 | U64, Sse(16)) => Some(cast(_mm_cvtepu32_epi64(cast(x)))),

                #[cfg(have_avx)]
                (F32, Avx(32), I32, Avx(32)) => Some(cast(cvtt_ps_epi32_256(cast(x)))),
                #[cfg(have_avx)]
                (I32, Avx(32), F32, Avx(32)) => Some(cast(_mm256_cvtepi32_ps(cast(x)))),
                #[cfg(have_avx)]
                (F32, Sse(16), F64, Avx(32)) => Some(cast(_mm256_cvtps_pd(cast(x)))),
                #[cfg(have_avx)]
                (F64, Avx(32), F32, Sse(16)) => Some(cast(_mm256_cvtpd_ps(cast(x)))),
                #[cfg(have_avx)]
                (I32, Sse(16), F64, Avx(32)) => Some(cast(_mm256_cvtepi32_pd(cast(x)))),

                #[cfg(have_avx2)]
                (I16, Sse(16), I32 | U32, Avx(32)) => Some(cast(_mm256_cvtepi16_epi32(cast(x)))),
                #[cfg(have_avx2)]
                (U16, Sse(16), I32 | U32, Avx(32)) => Some(cast(_mm256_cvtepu16_epi32(cast(x)))),
                #[cfg(have_avx2)]
                (I8, Sse(16), I16 | U16, Avx(32)) => Some(cast(_mm256_cvtepi8_epi16(cast(x)))),
                #[cfg(have_avx2)]
                (U8, Sse(16), I16 | U16, Avx(32)) => Some(cast(_mm256_cvtepu8_epi16(cast(x)))),
                #[cfg(have_avx2)]
                (I32, Sse(16), I64 | U64, Avx(32)) => Some(cast(_mm256_cvtepi32_epi64(cast(x)))),
                #[cfg(have_avx2)]
                (U32, Sse(16), I64 | U64, Avx(32)) => Some(cast(_mm256_cvtepu32_epi64(cast(x)))),

                #[cfg(have_avx512f)]
                (F32, Avx512(64), I32, Avx512(64)) => Some(cast(cvtt_ps_epi32_512(cast(x)))),
                #[cfg(have_avx512f)]
                (I32, Avx512(64), F32, Avx512(64)) => Some(cast(_mm512_cvtepi32_ps(cast(x)))),
                #[cfg(have_avx512f)]
                (U32, Avx512(64), F32, Avx512(64)) => Some(cast(_mm512_cvtepu32_ps(cast(x)))),
                #[cfg(have_avx512f)]
                (F32, Avx(32), F64, Avx512(64)) => Some(cast(_mm512_cvtps_pd(cast(x)))),
                #[cfg(have_avx512f)]
                (F64, Avx512(64), F32, Avx(32)) => Some(cast(_mm512_cvtpd_ps(cast(x)))),
                #[cfg(have_avx512f)]
                (I32, Avx(32), F64, Avx512(64)) => Some(cast(_mm512_cvtepi32_pd(cast(x)))),
                #[cfg(have_avx512f)]
                (I32, Avx(32), I64 | U64, Avx512(64)) => Some(cast(_mm512_cvtepi32_epi64(cast(x)))),

                _ => None,
            }
        }
    }
}

#[cfg(have_neon)]
mod neon {
    use std::arch::aarch64::*;

    use super::Route;
    use crate::simd::abi::AbiKind::Neon;
    use crate::simd::element::ElementKind::*;
    use crate::simd::storage::bit_cast_checked as cast;

    pub(super) fn convert<X: Copy, Y: Copy>(route: Route, x: X) -> Option<Y> {
        // SAFETY: NEON is baseline on AArch64; the route fixes both register
        // types.
        unsafe {
            match route {
                // `vcvtq` to integers saturates and maps NaN to zero, which is
                // exactly `as`.
                (F32, Neon(16), I32, Neon(16)) => Some(cast(vcvtq_s32_f32(cast(x)))),
                (F32, Neon(16), U32, Neon(16)) => Some(cast(vcvtq_u32_f32(cast(x)))),
                (I32, Neon(16), F32, Neon(16)) => Some(cast(vcvtq_f32_s32(cast(x)))),
                (U32, Neon(16), F32, Neon(16)) => Some(cast(vcvtq_f32_u32(cast(x)))),
                (F64, Neon(16), I64, Neon(16)) => Some(cast(vcvtq_s64_f64(cast(x)))),
                (F64, Neon(16), U64, Neon(16)) => Some(cast(vcvtq_u64_f64(cast(x)))),
                (I64, Neon(16), F64, Neon(16)) => Some(cast(vcvtq_f64_s64(cast(x)))),
                (U64, Neon(16), F64, Neon(16)) => Some(cast(vcvtq_f64_u64(cast(x)))),

                (F32, Neon(8), F64, Neon(16)) => {
                    let x: float32x4_t = cast(x);
                    Some(cast(vcvt_f64_f32(vget_low_f32(x))))
                }
                (F64, Neon(16), F32, Neon(8)) => {
                    let narrow = vcvt_f32_f64(cast(x));
                    Some(cast(vcombine_f32(narrow, vdup_n_f32(0.0))))
                }

                (I16, Neon(8), I32 | U32, Neon(16)) => {
                    let x: int16x8_t = cast(x);
                    Some(cast(vmovl_s16(vget_low_s16(x))))
                }
                (U16, Neon(8), I32 | U32, Neon(16)) => {
                    let x: uint16x8_t = cast(x);
                    Some(cast(vmovl_u16(vget_low_u16(x))))
                }
                (I32, Neon(8), I64 | U64, Neon(16)) => {
                    let x: int32x4_t = cast(x);
                    Some(cast(vmovl_s32(vget_low_s32(x))))
                }
                (U32, Neon(8), I64 | U64, Neon(16)) => {
                    let x: uint32x4_t = cast(x);
                    Some(cast(vmovl_u32(vget_low_u32(x))))
                }

                _ => None,
            }
        }
    }
}
