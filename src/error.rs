//! Error types for simdabi operations.
//!
//! Arithmetic on SIMD values never fails at runtime. Errors only come out of the
//! checked surface: slice based construction and store helpers, the slice
//! algorithms and the aligned buffer allocator.

use thiserror::Error;

/// Errors that can occur in the checked simdabi APIs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimdError {
    /// A slice did not hold the number of elements an operation needs.
    #[error("Length mismatch: expected at least {expected} elements, got {actual}")]
    LengthMismatch {
        /// Number of elements required.
        expected: usize,
        /// Number of elements provided.
        actual: usize,
    },

    /// A pointer did not satisfy the alignment promised by a load/store flag.
    #[error("Misaligned pointer: address {address:#x} is not aligned to {alignment} bytes")]
    Misaligned {
        /// Address that was checked.
        address: usize,
        /// Required alignment in bytes.
        alignment: usize,
    },

    /// Invalid layout parameters were provided.
    #[error("Invalid memory layout: {message} (size: {size}, alignment: {alignment})")]
    Layout {
        /// The size parameter that caused the error.
        size: usize,
        /// The alignment parameter that caused the error.
        alignment: usize,
        /// Human-readable error message.
        message: String,
    },

    /// Memory allocation failed.
    #[error("Memory allocation failed: requested {size} bytes with {alignment} byte alignment")]
    Allocation {
        /// The size that was requested to be allocated.
        size: usize,
        /// The alignment that was requested.
        alignment: usize,
    },
}

/// Result type alias for simdabi operations.
pub type Result<T> = std::result::Result<T, SimdError>;

/// Creates a length mismatch error.
pub fn length_mismatch(expected: usize, actual: usize) -> SimdError {
    SimdError::LengthMismatch { expected, actual }
}

/// Creates a misalignment error for `ptr`.
pub fn misaligned<T>(ptr: *const T, alignment: usize) -> SimdError {
    SimdError::Misaligned {
        address: ptr as usize,
        alignment,
    }
}

/// Creates a layout error.
pub fn layout_error(size: usize, alignment: usize, message: impl Into<String>) -> SimdError {
    SimdError::Layout {
        size,
        alignment,
        message: message.into(),
    }
}

/// Creates an allocation error.
pub fn allocation_error(size: usize, alignment: usize) -> SimdError {
    SimdError::Allocation { size, alignment }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_mismatch_display() {
        let error = length_mismatch(8, 3);
        let display = format!("{error}");
        assert!(display.contains("Length mismatch"));
        assert!(display.contains("expected at least 8"));
        assert!(display.contains("got 3"));
    }

    #[test]
    fn test_misaligned_display() {
        let error = misaligned(0x1004 as *const f32, 16);
        let display = format!("{error}");
        assert!(display.contains("0x1004"));
        assert!(display.contains("16 bytes"));
    }

    #[test]
    fn test_layout_error_display() {
        let error = layout_error(1000, 31, "alignment must be power of two");
        let display = format!("{error}");
        assert!(display.contains("Invalid memory layout"));
        assert!(display.contains("size: 1000"));
        assert!(display.contains("alignment: 31"));
        assert!(display.contains("alignment must be power of two"));
    }

    #[test]
    fn test_allocation_error_display() {
        let error = allocation_error(1024, 64);
        let display = format!("{error}");
        assert!(display.contains("Memory allocation failed"));
        assert!(display.contains("1024 bytes"));
        assert!(display.contains("64 byte alignment"));
    }

    #[test]
    fn test_error_equality() {
        assert_eq!(length_mismatch(4, 2), length_mismatch(4, 2));
        assert_ne!(length_mismatch(4, 2), length_mismatch(4, 1));
    }

    #[test]
    fn test_error_trait_implementation() {
        let error = allocation_error(1024, 32);
        let _: &dyn std::error::Error = &error;
        assert!(std::error::Error::source(&error).is_none());
    }
}
