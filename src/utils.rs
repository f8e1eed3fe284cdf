//! Over-aligned memory for `VectorAligned` loads and stores.

use std::alloc::{alloc_zeroed, dealloc, Layout};
use std::mem;
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;

use crate::error::{allocation_error, layout_error, Result};
use crate::simd::element::Vectorizable;

/// A zero-initialised buffer of `T` whose first element is aligned to a
/// caller chosen power of two.
///
/// The buffer owns its allocation and releases it with the layout it was
/// allocated with, so it never hands memory over to a `Vec<T>` (which would
/// deallocate with `T`'s natural alignment).
///
/// ```rust
/// use simdabi::simd::{memory_alignment, NativeSimd, VectorAligned};
/// use simdabi::utils::AlignedBuffer;
///
/// let align = memory_alignment::<f32, simdabi::simd::NativeAbi<f32>>();
/// let mut buffer = AlignedBuffer::<f32>::zeroed(64, align).unwrap();
/// buffer.iter_mut().enumerate().for_each(|(i, x)| *x = i as f32);
///
/// let v = NativeSimd::<f32>::from_slice(&buffer, VectorAligned);
/// assert_eq!(v.get(1), 1.0);
/// ```
pub struct AlignedBuffer<T: Vectorizable> {
    ptr: NonNull<T>,
    len: usize,
    layout: Layout,
}

impl<T: Vectorizable> AlignedBuffer<T> {
    /// Allocates `len` zeroed elements aligned to `align` bytes.
    ///
    /// # Errors
    ///
    /// - [`SimdError::Layout`](crate::SimdError::Layout) when `align` is not a
    ///   power of two, is smaller than `T`'s alignment or the size overflows.
    /// - [`SimdError::Allocation`](crate::SimdError::Allocation) when the
    ///   allocator returns null.
    pub fn zeroed(len: usize, align: usize) -> Result<Self> {
        if !align.is_power_of_two() {
            return Err(layout_error(len, align, "alignment must be a power of two"));
        }
        if align < mem::align_of::<T>() {
            return Err(layout_error(
                len,
                align,
                "alignment is smaller than the element alignment",
            ));
        }

        let size = len
            .checked_mul(mem::size_of::<T>())
            .ok_or_else(|| layout_error(len, align, "buffer size overflows usize"))?;

        let layout = Layout::from_size_align(size, align)
            .map_err(|err| layout_error(size, align, err.to_string()))?;

        if layout.size() == 0 {
            // Zero sized allocations are not allowed; an aligned dangling
            // pointer is a valid empty slice.
            let ptr = NonNull::new(align as *mut T).ok_or_else(|| allocation_error(0, align))?;
            return Ok(Self { ptr, len, layout });
        }

        // SAFETY: layout has a non-zero size.
        let raw = unsafe { alloc_zeroed(layout) };
        let ptr = NonNull::new(raw as *mut T).ok_or_else(|| allocation_error(size, align))?;

        Ok(Self { ptr, len, layout })
    }

    /// Allocates a zeroed buffer and copies `data` into it.
    pub fn from_slice(data: &[T], align: usize) -> Result<Self> {
        let mut buffer = Self::zeroed(data.len(), align)?;
        buffer.copy_from_slice(data);
        Ok(buffer)
    }

    /// Alignment of the first element in bytes.
    pub fn alignment(&self) -> usize {
        self.layout.align()
    }

    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }
}

impl<T: Vectorizable> Drop for AlignedBuffer<T> {
    fn drop(&mut self) {
        if self.layout.size() > 0 {
            // SAFETY: allocated in `zeroed` with exactly this layout.
            unsafe { dealloc(self.ptr.as_ptr() as *mut u8, self.layout) };
        }
    }
}

impl<T: Vectorizable> Deref for AlignedBuffer<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        // SAFETY: `len` zero-initialised elements live at `ptr`, and zero is a
        // valid bit pattern for every vectorizable element type.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl<T: Vectorizable> DerefMut for AlignedBuffer<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        // SAFETY: see `deref`; `&mut self` guarantees exclusive access.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl<T: Vectorizable> std::fmt::Debug for AlignedBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlignedBuffer")
            .field("len", &self.len)
            .field("alignment", &self.alignment())
            .field("data", &self.deref())
            .finish()
    }
}

// SAFETY: the buffer uniquely owns plain numeric data.
unsafe impl<T: Vectorizable> Send for AlignedBuffer<T> {}
unsafe impl<T: Vectorizable> Sync for AlignedBuffer<T> {}
