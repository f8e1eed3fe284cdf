//! Chunked storage of fixed-size vectors.
//!
//! A `FixedSize<N>` vector of `T` keeps its `N` lanes contiguously in a
//! [`SimdTuple`] and describes them as a sequence of native chunks, the
//! [`TupleLayout`]. The layout is built once per `(T, N)` at compile time by a
//! greedy decomposition: repeatedly take the widest native ABI whose lane count
//! fits in what is left (AVX512, then AVX, then NEON / SSE at full and partial
//! power-of-two widths), falling back to a scalar chunk for a last single lane.
//!
//! Operations walk the chunks with a visitor. [`Vectorizable::visit_chunk`]
//! turns a chunk's [`AbiKind`] back into the ABI tag type, so each chunk is
//! processed by that tag's register implementation.

use std::marker::PhantomData;

use crate::simd::abi::{is_native, AbiKind, AbiTraits, SimdMember, MAX_FIXED_SIZE};
use crate::simd::element::{ElementKind, SimdFloat, SimdInteger, Vectorizable};
use crate::simd::isa::IsaFamily;
use crate::simd::storage::Bitmask;
use crate::simd::traits::{MaskImpl, ReduceOp, SimdFloatImpl, SimdImpl, SimdIntImpl};

/// One native chunk of a fixed-size vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Chunk {
    pub abi: AbiKind,
    /// Index of the chunk's first lane.
    pub offset: usize,
    pub lanes: usize,
}

impl Chunk {
    const EMPTY: Chunk = Chunk {
        abi: AbiKind::Scalar,
        offset: 0,
        lanes: 0,
    };

    /// One past the chunk's last lane.
    pub const fn end(&self) -> usize {
        self.offset + self.lanes
    }
}

/// Widest native chunk for `element` holding at most `remaining` lanes.
pub const fn widest_chunk(element: ElementKind, remaining: usize) -> AbiKind {
    let lane = element.bytes();

    if is_native(IsaFamily::Avx512, element) && 64 / lane <= remaining {
        return AbiKind::Avx512(64);
    }
    if is_native(IsaFamily::Avx, element) && 32 / lane <= remaining {
        return AbiKind::Avx(32);
    }

    let mut bytes = 16;
    while bytes >= 2 * lane {
        if bytes / lane <= remaining {
            if is_native(IsaFamily::Neon, element) {
                return AbiKind::Neon(bytes);
            }
            if is_native(IsaFamily::Sse, element) {
                return AbiKind::Sse(bytes);
            }
        }
        bytes /= 2;
    }

    AbiKind::Scalar
}

/// Ordered chunks covering lanes `0..lanes` without gaps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TupleLayout {
    chunks: [Chunk; MAX_FIXED_SIZE],
    len: usize,
    lanes: usize,
}

impl TupleLayout {
    /// Greedy widest-first decomposition of `lanes` lanes of `element`.
    pub const fn new(element: ElementKind, lanes: usize) -> Self {
        assert!(
            lanes >= 1 && lanes <= MAX_FIXED_SIZE,
            "fixed_size lane count must be in 1..=MAX_FIXED_SIZE"
        );

        let mut chunks = [Chunk::EMPTY; MAX_FIXED_SIZE];
        let mut len = 0;
        let mut offset = 0;

        while offset < lanes {
            let abi = widest_chunk(element, lanes - offset);
            let width = abi.lanes(element);
            chunks[len] = Chunk {
                abi,
                offset,
                lanes: width,
            };
            len += 1;
            offset += width;
        }

        Self { chunks, len, lanes }
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks[..self.len]
    }

    pub const fn chunk_count(&self) -> usize {
        self.len
    }

    pub const fn lanes(&self) -> usize {
        self.lanes
    }

    /// Alignment that lets every chunk use aligned register loads. Chunk
    /// widths never increase, so aligning the first chunk aligns them all.
    pub const fn alignment(&self, element: ElementKind) -> usize {
        self.chunks[0].abi.bytes(element)
    }
}

/// A piece of lanes that lies inside one chunk of each of two layouts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment {
    pub offset: usize,
    pub lanes: usize,
    pub from: Chunk,
    pub to: Chunk,
}

impl Segment {
    /// Covers a whole chunk on both sides.
    pub fn is_whole(&self) -> bool {
        let covers = |chunk: &Chunk| chunk.offset == self.offset && chunk.lanes == self.lanes;
        covers(&self.from) && covers(&self.to)
    }
}

/// Boundary union of two layouts over the same lane count.
#[derive(Clone, Copy, Debug)]
pub struct Segments {
    items: [Segment; MAX_FIXED_SIZE],
    len: usize,
}

impl Segments {
    pub fn new(from: &TupleLayout, to: &TupleLayout) -> Self {
        assert_eq!(from.lanes(), to.lanes(), "re-chunking between different lane counts");

        let empty = Segment {
            offset: 0,
            lanes: 0,
            from: Chunk::EMPTY,
            to: Chunk::EMPTY,
        };
        let mut items = [empty; MAX_FIXED_SIZE];
        let mut len = 0;

        let (from, to) = (from.chunks(), to.chunks());
        let (mut i, mut j, mut offset) = (0, 0, 0);

        while i < from.len() && j < to.len() {
            let (a, b) = (from[i], to[j]);
            let end = a.end().min(b.end());

            items[len] = Segment {
                offset,
                lanes: end - offset,
                from: a,
                to: b,
            };
            len += 1;
            offset = end;

            if a.end() == end {
                i += 1;
            }
            if b.end() == end {
                j += 1;
            }
        }

        Self { items, len }
    }

    pub fn as_slice(&self) -> &[Segment] {
        &self.items[..self.len]
    }
}

/// Receives each chunk of a fixed-size vector as its ABI tag type.
pub trait ChunkVisitor<T: Vectorizable> {
    fn visit<A: AbiTraits<T>>(&mut self, offset: usize);
}

/// [`ChunkVisitor`] for operations that need the integer implementation.
pub trait IntChunkVisitor<T: SimdInteger> {
    fn visit<A: AbiTraits<T>>(&mut self, offset: usize)
    where
        <A as AbiTraits<T>>::Impl: SimdIntImpl<T>;
}

/// [`ChunkVisitor`] for operations that need the float implementation.
pub trait FloatChunkVisitor<T: SimdFloat> {
    fn visit<A: AbiTraits<T>>(&mut self, offset: usize)
    where
        <A as AbiTraits<T>>::Impl: SimdFloatImpl<T>;
}

/// `N` lanes of `T` plus the compile-time chunk layout describing them.
#[derive(Clone, Copy, PartialEq)]
#[repr(transparent)]
pub struct SimdTuple<T, const N: usize> {
    lanes: [T; N],
}

impl<T: Vectorizable, const N: usize> SimdTuple<T, N> {
    pub const LAYOUT: TupleLayout = TupleLayout::new(T::KIND, N);

    #[inline(always)]
    pub const fn from_array(lanes: [T; N]) -> Self {
        Self { lanes }
    }

    #[inline(always)]
    pub fn as_array(&self) -> &[T; N] {
        &self.lanes
    }

    #[inline(always)]
    pub fn as_mut_array(&mut self) -> &mut [T; N] {
        &mut self.lanes
    }

    /// Visits every chunk in lane order.
    #[inline(always)]
    pub fn for_each<V: ChunkVisitor<T>>(visitor: &mut V) {
        for chunk in Self::LAYOUT.chunks() {
            let handled = T::visit_chunk(chunk.abi, chunk.offset, visitor);
            debug_assert!(handled, "no ABI tag for chunk {}", chunk.abi);
        }
    }

    /// Folds all lanes with `Op` as a balanced tree over the chunks.
    #[inline]
    pub fn tree_reduction<Op: ReduceOp<T>>(&self) -> T {
        reduce_range::<T, Op>(&self.lanes, Self::LAYOUT.chunks())
    }
}

impl<T: SimdInteger, const N: usize> SimdTuple<T, N> {
    #[inline(always)]
    pub fn for_each_int<V: IntChunkVisitor<T>>(visitor: &mut V) {
        for chunk in Self::LAYOUT.chunks() {
            let handled = T::visit_int_chunk(chunk.abi, chunk.offset, visitor);
            debug_assert!(handled, "no ABI tag for chunk {}", chunk.abi);
        }
    }
}

impl<T: SimdFloat, const N: usize> SimdTuple<T, N> {
    #[inline(always)]
    pub fn for_each_float<V: FloatChunkVisitor<T>>(visitor: &mut V) {
        for chunk in Self::LAYOUT.chunks() {
            let handled = T::visit_float_chunk(chunk.abi, chunk.offset, visitor);
            debug_assert!(handled, "no ABI tag for chunk {}", chunk.abi);
        }
    }
}

#[inline(always)]
pub(crate) fn load_chunk<T: Vectorizable, A: AbiTraits<T>>(lanes: &[T], offset: usize) -> SimdMember<T, A> {
    let chunk = &lanes[offset..offset + A::LANES];
    // SAFETY: `chunk` holds exactly the lanes the ABI reads.
    unsafe { <A::Impl as SimdImpl<T>>::load(chunk.as_ptr(), false) }
}

#[inline(always)]
pub(crate) fn store_chunk<T: Vectorizable, A: AbiTraits<T>>(
    value: SimdMember<T, A>,
    lanes: &mut [T],
    offset: usize,
) {
    let chunk = &mut lanes[offset..offset + A::LANES];
    // SAFETY: `chunk` holds exactly the lanes the ABI writes.
    unsafe { <A::Impl as SimdImpl<T>>::store(value, chunk.as_mut_ptr(), false) }
}

fn reduce_range<T: Vectorizable, Op: ReduceOp<T>>(lanes: &[T], chunks: &[Chunk]) -> T {
    match chunks {
        [single] => reduce_chunks::<T, Op>(lanes, *single, None),
        [first, second] if first.abi == second.abi => {
            reduce_chunks::<T, Op>(lanes, *first, Some(second.offset))
        }
        _ => {
            let (low, high) = chunks.split_at(chunks.len() / 2);
            Op::apply_lane(
                reduce_range::<T, Op>(lanes, low),
                reduce_range::<T, Op>(lanes, high),
            )
        }
    }
}

fn reduce_chunks<T: Vectorizable, Op: ReduceOp<T>>(lanes: &[T], chunk: Chunk, partner: Option<usize>) -> T {
    let mut visitor = ChunkReduce::<T, Op> {
        lanes,
        partner,
        result: T::ZERO,
        op: PhantomData,
    };
    let handled = T::visit_chunk(chunk.abi, chunk.offset, &mut visitor);
    debug_assert!(handled, "no ABI tag for chunk {}", chunk.abi);
    visitor.result
}

/// Reduces one chunk, first folding an equal-width partner chunk into it.
struct ChunkReduce<'a, T, Op> {
    lanes: &'a [T],
    partner: Option<usize>,
    result: T,
    op: PhantomData<Op>,
}

impl<T: Vectorizable, Op: ReduceOp<T>> ChunkVisitor<T> for ChunkReduce<'_, T, Op> {
    fn visit<A: AbiTraits<T>>(&mut self, offset: usize) {
        let mut x = load_chunk::<T, A>(self.lanes, offset);
        if let Some(partner) = self.partner {
            x = Op::apply::<A::Impl>(x, load_chunk::<T, A>(self.lanes, partner));
        }
        self.result = <A::Impl as SimdImpl<T>>::reduce::<Op>(x);
    }
}

/// Binary lane-wise operations of the common surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Min,
    Max,
    And,
    Or,
    Xor,
}

impl BinaryOp {
    #[inline(always)]
    fn apply<T: Vectorizable, I: SimdImpl<T>>(self, a: I::SimdMember, b: I::SimdMember) -> I::SimdMember {
        match self {
            BinaryOp::Add => I::add(a, b),
            BinaryOp::Sub => I::sub(a, b),
            BinaryOp::Mul => I::mul(a, b),
            BinaryOp::Div => I::div(a, b),
            BinaryOp::Min => I::min(a, b),
            BinaryOp::Max => I::max(a, b),
            BinaryOp::And => I::bit_and(a, b),
            BinaryOp::Or => I::bit_or(a, b),
            BinaryOp::Xor => I::bit_xor(a, b),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum UnaryOp {
    Neg,
    Not,
    Abs,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CompareOp {
    Eq,
    Lt,
    Le,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum IntOp {
    Rem,
    Shl,
    Shr,
    ShlScalar(u32),
    ShrScalar(u32),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FloatUnaryOp {
    Sqrt,
    Floor,
    Ceil,
    Trunc,
    Round,
    Logb,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FloatTest {
    Signbit,
    IsNan,
    IsInf,
    IsFinite,
    IsNormal,
}

/// `out = op(a, b)` chunk by chunk.
pub(crate) struct Zip<'a, T> {
    pub a: &'a [T],
    pub b: &'a [T],
    pub out: &'a mut [T],
    pub op: BinaryOp,
}

impl<T: Vectorizable> ChunkVisitor<T> for Zip<'_, T> {
    fn visit<A: AbiTraits<T>>(&mut self, offset: usize) {
        let x = load_chunk::<T, A>(self.a, offset);
        let y = load_chunk::<T, A>(self.b, offset);
        store_chunk::<T, A>(self.op.apply::<T, A::Impl>(x, y), self.out, offset);
    }
}

/// `out = op(a)` chunk by chunk.
pub(crate) struct Map<'a, T> {
    pub a: &'a [T],
    pub out: &'a mut [T],
    pub op: UnaryOp,
}

impl<T: Vectorizable> ChunkVisitor<T> for Map<'_, T> {
    fn visit<A: AbiTraits<T>>(&mut self, offset: usize) {
        let x = load_chunk::<T, A>(self.a, offset);
        let r = match self.op {
            UnaryOp::Neg => <A::Impl as SimdImpl<T>>::neg(x),
            UnaryOp::Not => <A::Impl as SimdImpl<T>>::bit_not(x),
            UnaryOp::Abs => <A::Impl as SimdImpl<T>>::abs(x),
        };
        store_chunk::<T, A>(r, self.out, offset);
    }
}

/// Collects a lane comparison into one bitset.
pub(crate) struct Compare<'a, T> {
    pub a: &'a [T],
    pub b: &'a [T],
    pub op: CompareOp,
    pub bits: u64,
}

impl<T: Vectorizable> ChunkVisitor<T> for Compare<'_, T> {
    fn visit<A: AbiTraits<T>>(&mut self, offset: usize) {
        let x = load_chunk::<T, A>(self.a, offset);
        let y = load_chunk::<T, A>(self.b, offset);
        let k = match self.op {
            CompareOp::Eq => <A::Impl as SimdImpl<T>>::eq(x, y),
            CompareOp::Lt => <A::Impl as SimdImpl<T>>::lt(x, y),
            CompareOp::Le => <A::Impl as SimdImpl<T>>::le(x, y),
        };
        self.bits |= <A::Impl as MaskImpl<T>>::mask_to_bitset(k) << offset;
    }
}

/// `out[i] = if k[i] { b[i] } else { a[i] }`.
pub(crate) struct Blend<'a, T> {
    pub k: Bitmask,
    pub a: &'a [T],
    pub b: &'a [T],
    pub out: &'a mut [T],
}

impl<T: Vectorizable> ChunkVisitor<T> for Blend<'_, T> {
    fn visit<A: AbiTraits<T>>(&mut self, offset: usize) {
        let k = <A::Impl as MaskImpl<T>>::mask_from_bitset(self.k.window(offset, A::LANES).bits());
        let x = load_chunk::<T, A>(self.a, offset);
        let y = load_chunk::<T, A>(self.b, offset);
        store_chunk::<T, A>(<A::Impl as SimdImpl<T>>::blend(k, x, y), self.out, offset);
    }
}

/// Integer operations; shift counts and divisors come from `b`.
pub(crate) struct IntZip<'a, T> {
    pub a: &'a [T],
    pub b: &'a [T],
    pub out: &'a mut [T],
    pub op: IntOp,
}

impl<T: SimdInteger> IntChunkVisitor<T> for IntZip<'_, T> {
    fn visit<A: AbiTraits<T>>(&mut self, offset: usize)
    where
        <A as AbiTraits<T>>::Impl: SimdIntImpl<T>,
    {
        let x = load_chunk::<T, A>(self.a, offset);
        let y = load_chunk::<T, A>(self.b, offset);
        let r = match self.op {
            IntOp::Rem => <A::Impl as SimdIntImpl<T>>::rem(x, y),
            IntOp::Shl => <A::Impl as SimdIntImpl<T>>::shl(x, y),
            IntOp::Shr => <A::Impl as SimdIntImpl<T>>::shr(x, y),
            IntOp::ShlScalar(count) => <A::Impl as SimdIntImpl<T>>::shl_scalar(x, count),
            IntOp::ShrScalar(count) => <A::Impl as SimdIntImpl<T>>::shr_scalar(x, count),
        };
        store_chunk::<T, A>(r, self.out, offset);
    }
}

pub(crate) struct FloatMap<'a, T> {
    pub a: &'a [T],
    pub out: &'a mut [T],
    pub op: FloatUnaryOp,
}

impl<T: SimdFloat> FloatChunkVisitor<T> for FloatMap<'_, T> {
    fn visit<A: AbiTraits<T>>(&mut self, offset: usize)
    where
        <A as AbiTraits<T>>::Impl: SimdFloatImpl<T>,
    {
        let x = load_chunk::<T, A>(self.a, offset);
        let r = match self.op {
            FloatUnaryOp::Sqrt => <A::Impl as SimdFloatImpl<T>>::sqrt(x),
            FloatUnaryOp::Floor => <A::Impl as SimdFloatImpl<T>>::floor(x),
            FloatUnaryOp::Ceil => <A::Impl as SimdFloatImpl<T>>::ceil(x),
            FloatUnaryOp::Trunc => <A::Impl as SimdFloatImpl<T>>::trunc(x),
            FloatUnaryOp::Round => <A::Impl as SimdFloatImpl<T>>::round(x),
            FloatUnaryOp::Logb => <A::Impl as SimdFloatImpl<T>>::logb(x),
        };
        store_chunk::<T, A>(r, self.out, offset);
    }
}

/// Float lane predicates collected into one bitset.
pub(crate) struct FloatClassify<'a, T> {
    pub a: &'a [T],
    pub test: FloatTest,
    pub bits: u64,
}

impl<T: SimdFloat> FloatChunkVisitor<T> for FloatClassify<'_, T> {
    fn visit<A: AbiTraits<T>>(&mut self, offset: usize)
    where
        <A as AbiTraits<T>>::Impl: SimdFloatImpl<T>,
    {
        let x = load_chunk::<T, A>(self.a, offset);
        let k = match self.test {
            FloatTest::Signbit => <A::Impl as SimdFloatImpl<T>>::signbit(x),
            FloatTest::IsNan => <A::Impl as SimdFloatImpl<T>>::isnan(x),
            FloatTest::IsInf => <A::Impl as SimdFloatImpl<T>>::isinf(x),
            FloatTest::IsFinite => <A::Impl as SimdFloatImpl<T>>::isfinite(x),
            FloatTest::IsNormal => <A::Impl as SimdFloatImpl<T>>::isnormal(x),
        };
        self.bits |= <A::Impl as MaskImpl<T>>::mask_to_bitset(k) << offset;
    }
}

/// `frexp`, `ldexp` and `fma`: the float operations with more than one
/// operand or result.
pub(crate) enum FloatMulti<'a, T> {
    Frexp {
        a: &'a [T],
        mantissa: &'a mut [T],
        exponent: &'a mut [T],
    },
    Ldexp {
        a: &'a [T],
        exp: &'a [T],
        out: &'a mut [T],
    },
    Fma {
        a: &'a [T],
        b: &'a [T],
        c: &'a [T],
        out: &'a mut [T],
    },
}

impl<T: SimdFloat> FloatChunkVisitor<T> for FloatMulti<'_, T> {
    fn visit<A: AbiTraits<T>>(&mut self, offset: usize)
    where
        <A as AbiTraits<T>>::Impl: SimdFloatImpl<T>,
    {
        match self {
            FloatMulti::Frexp {
                a,
                mantissa,
                exponent,
            } => {
                let (m, e) = <A::Impl as SimdFloatImpl<T>>::frexp(load_chunk::<T, A>(a, offset));
                store_chunk::<T, A>(m, mantissa, offset);
                store_chunk::<T, A>(e, exponent, offset);
            }
            FloatMulti::Ldexp { a, exp, out } => {
                let x = load_chunk::<T, A>(a, offset);
                let e = load_chunk::<T, A>(exp, offset);
                store_chunk::<T, A>(<A::Impl as SimdFloatImpl<T>>::ldexp(x, e), out, offset);
            }
            FloatMulti::Fma { a, b, c, out } => {
                let x = load_chunk::<T, A>(a, offset);
                let y = load_chunk::<T, A>(b, offset);
                let z = load_chunk::<T, A>(c, offset);
                store_chunk::<T, A>(<A::Impl as SimdFloatImpl<T>>::fma(x, y, z), out, offset);
            }
        }
    }
}
