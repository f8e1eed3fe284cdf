//! `f32` / `f64` lanes in `zmm` registers.

#[cfg(target_arch = "x86")]
use std::arch::x86::*;

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use super::shift_bytes_down;
use crate::simd::isa::{Avx512, IsaFloatLane, IsaLane};

// roundscale immediates: rounding mode in bits 0..2, bit 3 suppresses
// precision exceptions.
const ROUND_DOWN: i32 = 0x09;
const ROUND_UP: i32 = 0x0A;
const ROUND_ZERO: i32 = 0x0B;

macro_rules! avx512_float {
    (
        $t:ty, $reg:ty, $k:ty, $bytes:expr,
        set1: $set1:ident, setzero: $setzero:ident,
        load: $load:ident, loadu: $loadu:ident, store: $store:ident, storeu: $storeu:ident,
        mask_loadu: $mask_loadu:ident, mask_storeu: $mask_storeu:ident,
        add: $add:ident, sub: $sub:ident, mul: $mul:ident, div: $div:ident,
        min: $min:ident, max: $max:ident, sqrt: $sqrt:ident, abs: $abs:ident,
        cmp: $cmp:ident, blend: $blend:ident, sign_lt: $sign_lt:ident,
        cast_from_si: $from_si:ident, cast_to_si: $to_si:ident,
        roundscale: $roundscale:ident, fmadd: $fmadd:ident, below_half: $below_half:expr
    ) => {
        impl IsaLane<Avx512> for $t {
            type Reg = $reg;
            type MaskReg = $k;

            #[inline(always)]
            fn zeroed() -> $reg {
                unsafe { $setzero() }
            }

            #[inline(always)]
            fn splat(x: $t) -> $reg {
                unsafe { $set1(x) }
            }

            #[inline(always)]
            unsafe fn load_aligned(ptr: *const $t) -> $reg {
                $load(ptr)
            }

            #[inline(always)]
            unsafe fn load_unaligned(ptr: *const $t) -> $reg {
                $loadu(ptr)
            }

            #[inline(always)]
            unsafe fn store_aligned(ptr: *mut $t, a: $reg) {
                $store(ptr, a)
            }

            #[inline(always)]
            unsafe fn store_unaligned(ptr: *mut $t, a: $reg) {
                $storeu(ptr, a)
            }

            #[inline(always)]
            unsafe fn masked_load(src: $reg, k: $k, ptr: *const $t) -> $reg {
                $mask_loadu(src, k, ptr)
            }

            #[inline(always)]
            unsafe fn masked_store(a: $reg, k: $k, ptr: *mut $t) {
                $mask_storeu(ptr, k, a)
            }

            #[inline(always)]
            fn add(a: $reg, b: $reg) -> $reg {
                unsafe { $add(a, b) }
            }

            #[inline(always)]
            fn sub(a: $reg, b: $reg) -> $reg {
                unsafe { $sub(a, b) }
            }

            #[inline(always)]
            fn mul(a: $reg, b: $reg) -> $reg {
                unsafe { $mul(a, b) }
            }

            #[inline(always)]
            fn div(a: $reg, b: $reg) -> $reg {
                unsafe { $div(a, b) }
            }

            #[inline(always)]
            fn neg(a: $reg) -> $reg {
                <Self as IsaLane<Avx512>>::bit_xor(a, unsafe { $set1(-0.0) })
            }

            #[inline(always)]
            fn abs(a: $reg) -> $reg {
                unsafe { $abs(a) }
            }

            #[inline(always)]
            fn min(a: $reg, b: $reg) -> $reg {
                unsafe { $min(a, b) }
            }

            #[inline(always)]
            fn max(a: $reg, b: $reg) -> $reg {
                unsafe { $max(a, b) }
            }

            #[inline(always)]
            fn bit_and(a: $reg, b: $reg) -> $reg {
                unsafe { $from_si(_mm512_and_si512($to_si(a), $to_si(b))) }
            }

            #[inline(always)]
            fn bit_or(a: $reg, b: $reg) -> $reg {
                unsafe { $from_si(_mm512_or_si512($to_si(a), $to_si(b))) }
            }

            #[inline(always)]
            fn bit_xor(a: $reg, b: $reg) -> $reg {
                unsafe { $from_si(_mm512_xor_si512($to_si(a), $to_si(b))) }
            }

            #[inline(always)]
            fn andnot(a: $reg, b: $reg) -> $reg {
                unsafe { $from_si(_mm512_andnot_si512($to_si(a), $to_si(b))) }
            }

            #[inline(always)]
            fn bit_not(a: $reg) -> $reg {
                unsafe { $from_si(_mm512_xor_si512($to_si(a), _mm512_set1_epi32(-1))) }
            }

            #[inline(always)]
            fn cmp_eq(a: $reg, b: $reg) -> $k {
                unsafe { $cmp::<_CMP_EQ_OQ>(a, b) }
            }

            #[inline(always)]
            fn cmp_lt(a: $reg, b: $reg) -> $k {
                unsafe { $cmp::<_CMP_LT_OQ>(a, b) }
            }

            #[inline(always)]
            fn cmp_le(a: $reg, b: $reg) -> $k {
                unsafe { $cmp::<_CMP_LE_OQ>(a, b) }
            }

            #[inline(always)]
            fn blend(k: $k, a: $reg, b: $reg) -> $reg {
                unsafe { $blend(k, a, b) }
            }

            #[inline(always)]
            fn mask_to_bits(k: $k) -> u64 {
                k as u64
            }

            #[inline(always)]
            fn mask_from_bits(bits: u64) -> $k {
                bits as $k
            }

            #[inline(always)]
            fn mask_and(a: $k, b: $k) -> $k {
                a & b
            }

            #[inline(always)]
            fn mask_or(a: $k, b: $k) -> $k {
                a | b
            }

            #[inline(always)]
            fn mask_xor(a: $k, b: $k) -> $k {
                a ^ b
            }

            #[inline(always)]
            fn mask_not(a: $k) -> $k {
                !a
            }

            #[inline(always)]
            fn shift_down(a: $reg, lanes: usize) -> $reg {
                unsafe { $from_si(shift_bytes_down($to_si(a), lanes * $bytes)) }
            }
        }

        impl IsaFloatLane<Avx512> for $t {
            #[inline(always)]
            fn sqrt(a: $reg) -> $reg {
                unsafe { $sqrt(a) }
            }

            #[inline(always)]
            fn trunc(a: $reg) -> $reg {
                unsafe { $roundscale::<ROUND_ZERO>(a) }
            }

            #[inline(always)]
            fn floor(a: $reg) -> $reg {
                unsafe { $roundscale::<ROUND_DOWN>(a) }
            }

            #[inline(always)]
            fn ceil(a: $reg) -> $reg {
                unsafe { $roundscale::<ROUND_UP>(a) }
            }

            #[inline(always)]
            fn round(a: $reg) -> $reg {
                let sign = <Self as IsaLane<Avx512>>::bit_and(a, unsafe { $set1(-0.0) });
                let half = <Self as IsaLane<Avx512>>::bit_or(unsafe { $set1($below_half) }, sign);
                <Self as IsaFloatLane<Avx512>>::trunc(unsafe { $add(a, half) })
            }

            #[inline(always)]
            fn sign_mask(a: $reg) -> $k {
                unsafe { $sign_lt($to_si(a), _mm512_setzero_si512()) }
            }

            #[inline(always)]
            fn fma(a: $reg, b: $reg, c: $reg) -> $reg {
                unsafe { $fmadd(a, b, c) }
            }
        }
    };
}

avx512_float!(
    f32, __m512, __mmask16, 4,
    set1: _mm512_set1_ps, setzero: _mm512_setzero_ps,
    load: _mm512_load_ps, loadu: _mm512_loadu_ps, store: _mm512_store_ps, storeu: _mm512_storeu_ps,
    mask_loadu: _mm512_mask_loadu_ps, mask_storeu: _mm512_mask_storeu_ps,
    add: _mm512_add_ps, sub: _mm512_sub_ps, mul: _mm512_mul_ps, div: _mm512_div_ps,
    min: _mm512_min_ps, max: _mm512_max_ps, sqrt: _mm512_sqrt_ps, abs: _mm512_abs_ps,
    cmp: _mm512_cmp_ps_mask, blend: _mm512_mask_blend_ps, sign_lt: _mm512_cmplt_epi32_mask,
    cast_from_si: _mm512_castsi512_ps, cast_to_si: _mm512_castps_si512,
    roundscale: _mm512_roundscale_ps, fmadd: _mm512_fmadd_ps, below_half: 0.499_999_97
);

avx512_float!(
    f64, __m512d, __mmask8, 8,
    set1: _mm512_set1_pd, setzero: _mm512_setzero_pd,
    load: _mm512_load_pd, loadu: _mm512_loadu_pd, store: _mm512_store_pd, storeu: _mm512_storeu_pd,
    mask_loadu: _mm512_mask_loadu_pd, mask_storeu: _mm512_mask_storeu_pd,
    add: _mm512_add_pd, sub: _mm512_sub_pd, mul: _mm512_mul_pd, div: _mm512_div_pd,
    min: _mm512_min_pd, max: _mm512_max_pd, sqrt: _mm512_sqrt_pd, abs: _mm512_abs_pd,
    cmp: _mm512_cmp_pd_mask, blend: _mm512_mask_blend_pd, sign_lt: _mm512_cmplt_epi64_mask,
    cast_from_si: _mm512_castsi512_pd, cast_to_si: _mm512_castpd_si512,
    roundscale: _mm512_roundscale_pd, fmadd: _mm512_fmadd_pd, below_half: 0.499_999_999_999_999_94
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simd::storage::Storage;

    fn lanes(a: __m512) -> [f32; 16] {
        let s = Storage::<f32, __m512>::from_raw(a);
        std::array::from_fn(|i| s.get(i))
    }

    #[test]
    fn test_rounding_and_sign_mask() {
        let x: [f32; 16] = std::array::from_fn(|i| (i as f32 - 8.0) * 0.75);
        let r = Storage::<f32, __m512>::from_lanes(x).raw();
        assert_eq!(lanes(<f32 as IsaFloatLane<Avx512>>::round(r)), x.map(f32::round));
        assert_eq!(lanes(<f32 as IsaFloatLane<Avx512>>::floor(r)), x.map(f32::floor));
        assert_eq!(lanes(<f32 as IsaFloatLane<Avx512>>::ceil(r)), x.map(f32::ceil));
        let k = <f32 as IsaFloatLane<Avx512>>::sign_mask(r);
        assert_eq!(k, 0x00FF);
    }

    #[test]
    fn test_masked_memory() {
        let src: [f32; 16] = std::array::from_fn(|i| i as f32);
        let loaded = unsafe {
            <f32 as IsaLane<Avx512>>::masked_load(<f32 as IsaLane<Avx512>>::splat(-1.0), 0x0003, src.as_ptr())
        };
        let l = lanes(loaded);
        assert_eq!(&l[..3], &[0.0, 1.0, -1.0]);

        let mut dst = [0.0f32; 16];
        unsafe { <f32 as IsaLane<Avx512>>::masked_store(loaded, 0x8001, dst.as_mut_ptr()) };
        assert_eq!((dst[0], dst[1], dst[15]), (0.0, 0.0, -1.0));
    }
}
