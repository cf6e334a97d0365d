//! Error types for vfb-core operations.
//!
//! Every constructor and layout helper in this crate validates its inputs
//! and reports problems through [`Error`] instead of panicking.
//!
//! # Overview
//!
//! The [`Error`] enum covers failure modes that occur while:
//! - Describing a frame buffer (plane count, strides, dimensions)
//! - Computing plane layouts over a contiguous allocation
//! - Checking coordinates and boxes against a frame
//!
//! # Usage
//!
//! ```rust
//! use vfb_core::{Error, Result};
//!
//! fn check_point(x: u32, y: u32, width: u32, height: u32) -> Result<()> {
//!     if x >= width || y >= height {
//!         return Err(Error::out_of_bounds(x, y, width, height));
//!     }
//!     Ok(())
//! }
//! # assert!(check_point(3, 0, 2, 2).is_err());
//! ```

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while describing or addressing frame buffers.
///
/// # Categories
///
/// - **Bounds errors**: [`OutOfBounds`](Error::OutOfBounds), [`InvalidRegion`](Error::InvalidRegion)
/// - **Format errors**: [`UnsupportedFormat`](Error::UnsupportedFormat), [`PlaneCount`](Error::PlaneCount)
/// - **Geometry errors**: [`InvalidDimensions`](Error::InvalidDimensions), [`InvalidStride`](Error::InvalidStride)
/// - **Memory errors**: [`BufferTooSmall`](Error::BufferTooSmall)
#[derive(Debug, Error)]
pub enum Error {
    /// Point coordinates are outside frame bounds.
    ///
    /// # Example
    ///
    /// ```rust
    /// use vfb_core::Error;
    ///
    /// let err = Error::out_of_bounds(100, 50, 80, 60);
    /// assert!(err.to_string().contains("100"));
    /// ```
    #[error("point ({x}, {y}) out of bounds for frame {width}x{height}")]
    OutOfBounds {
        /// X coordinate that was out of bounds
        x: u32,
        /// Y coordinate that was out of bounds
        y: u32,
        /// Frame width
        width: u32,
        /// Frame height
        height: u32,
    },

    /// Box or crop region extends beyond frame bounds.
    #[error("region ({rx}, {ry}, {rw}x{rh}) exceeds frame bounds {width}x{height}")]
    InvalidRegion {
        /// Region X origin
        rx: u32,
        /// Region Y origin
        ry: u32,
        /// Region width
        rw: u32,
        /// Region height
        rh: u32,
        /// Frame width
        width: u32,
        /// Frame height
        height: u32,
    },

    /// Pixel format is not supported for this operation.
    #[error("unsupported format: {format}")]
    UnsupportedFormat {
        /// Format name or description
        format: String,
    },

    /// Number of planes does not fit the format.
    #[error("{format} frame buffer cannot have {count} plane(s)")]
    PlaneCount {
        /// Format name
        format: String,
        /// Plane count that was supplied
        count: usize,
    },

    /// Invalid frame dimensions.
    #[error("invalid dimensions: {width}x{height} ({reason})")]
    InvalidDimensions {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
        /// Reason why dimensions are invalid
        reason: String,
    },

    /// Stride is zero or too small for the plane width.
    #[error("stride {stride} is less than minimum {min_stride} for width {width}")]
    InvalidStride {
        /// Provided stride
        stride: usize,
        /// Minimum required stride
        min_stride: usize,
        /// Plane width in pixels
        width: u32,
    },

    /// Backing slice cannot hold the described plane(s).
    #[error("buffer of {actual} bytes is too small, {required} bytes required")]
    BufferTooSmall {
        /// Bytes required by the layout
        required: usize,
        /// Bytes actually available
        actual: usize,
    },

    /// Malformed argument that fits no other category.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    /// Creates an [`Error::OutOfBounds`] error.
    #[inline]
    pub fn out_of_bounds(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self::OutOfBounds {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates an [`Error::InvalidRegion`] error.
    #[inline]
    pub fn invalid_region(rx: u32, ry: u32, rw: u32, rh: u32, width: u32, height: u32) -> Self {
        Self::InvalidRegion {
            rx,
            ry,
            rw,
            rh,
            width,
            height,
        }
    }

    /// Creates an [`Error::UnsupportedFormat`] error.
    #[inline]
    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    /// Creates an [`Error::PlaneCount`] error.
    #[inline]
    pub fn plane_count(format: impl Into<String>, count: usize) -> Self {
        Self::PlaneCount {
            format: format.into(),
            count,
        }
    }

    /// Creates an [`Error::InvalidDimensions`] error.
    #[inline]
    pub fn invalid_dimensions(width: u32, height: u32, reason: impl Into<String>) -> Self {
        Self::InvalidDimensions {
            width,
            height,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::InvalidStride`] error.
    #[inline]
    pub fn invalid_stride(stride: usize, min_stride: usize, width: u32) -> Self {
        Self::InvalidStride {
            stride,
            min_stride,
            width,
        }
    }

    /// Creates an [`Error::BufferTooSmall`] error.
    #[inline]
    pub fn buffer_too_small(required: usize, actual: usize) -> Self {
        Self::BufferTooSmall { required, actual }
    }

    /// Creates an [`Error::InvalidArgument`] error.
    #[inline]
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Returns `true` if this is a bounds-related error.
    #[inline]
    pub fn is_bounds_error(&self) -> bool {
        matches!(self, Self::OutOfBounds { .. } | Self::InvalidRegion { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds() {
        let err = Error::out_of_bounds(100, 50, 80, 60);
        let msg = err.to_string();
        assert!(msg.contains("100"));
        assert!(msg.contains("50"));
        assert!(msg.contains("80x60"));
        assert!(err.is_bounds_error());
    }

    #[test]
    fn test_invalid_region() {
        let err = Error::invalid_region(1, 2, 10, 10, 8, 8);
        assert!(err.to_string().contains("10x10"));
        assert!(err.is_bounds_error());
    }

    #[test]
    fn test_buffer_too_small() {
        let err = Error::buffer_too_small(96, 12);
        let msg = err.to_string();
        assert!(msg.contains("96"));
        assert!(msg.contains("12"));
        assert!(!err.is_bounds_error());
    }

    #[test]
    fn test_plane_count() {
        let err = Error::plane_count("RGB", 2);
        assert_eq!(err.to_string(), "RGB frame buffer cannot have 2 plane(s)");
    }
}
