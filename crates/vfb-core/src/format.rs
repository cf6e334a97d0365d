//! Pixel formats and EXIF orientations.
//!
//! # Formats
//!
//! | Format | Planes | Layout |
//! |--------|--------|--------|
//! | `Rgba` | 1 | packed, 4 bytes per pixel |
//! | `Rgb` | 1 | packed, 3 bytes per pixel |
//! | `Gray` | 1 | 1 byte per pixel |
//! | `Nv12` | 2 | Y plane + interleaved UV (U first) |
//! | `Nv21` | 2 | Y plane + interleaved VU (V first) |
//! | `Yv12` | 3 | Y plane + V plane + U plane |
//! | `Yv21` | 3 | Y plane + U plane + V plane |
//!
//! Semi-planar and planar formats also accept a single contiguous plane,
//! with chroma following the luma rows (see [`crate::layout`]).
//!
//! # Orientations
//!
//! [`Orientation`] mirrors the eight EXIF orientation tags. Each tag names
//! the physical corner stored at the buffer's logical `(0, 0)`.

use std::fmt;

/// Pixel format of a frame buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Format {
    /// Packed 8-bit red, green, blue, alpha.
    Rgba,
    /// Packed 8-bit red, green, blue.
    Rgb,
    /// 4:2:0 semi-planar, chroma interleaved as U,V.
    Nv12,
    /// 4:2:0 semi-planar, chroma interleaved as V,U.
    Nv21,
    /// 4:2:0 planar, V plane before U plane.
    Yv12,
    /// 4:2:0 planar, U plane before V plane.
    Yv21,
    /// Single 8-bit luminance channel.
    Gray,
    /// Unrecognized format. Rejected by every operation.
    #[default]
    Unknown,
}

impl Format {
    /// Returns `true` for the four 4:2:0 YUV formats.
    #[inline]
    pub fn is_yuv(&self) -> bool {
        matches!(self, Self::Nv12 | Self::Nv21 | Self::Yv12 | Self::Yv21)
    }

    /// Returns `true` for semi-planar formats (interleaved chroma).
    #[inline]
    pub fn is_semi_planar(&self) -> bool {
        matches!(self, Self::Nv12 | Self::Nv21)
    }

    /// Returns `true` for single-plane interleaved formats (RGB, RGBA, GRAY).
    #[inline]
    pub fn is_packed(&self) -> bool {
        matches!(self, Self::Rgba | Self::Rgb | Self::Gray)
    }

    /// Bytes per pixel of packed formats, `None` for YUV and unknown.
    #[inline]
    pub fn channels(&self) -> Option<usize> {
        match self {
            Self::Rgba => Some(4),
            Self::Rgb => Some(3),
            Self::Gray => Some(1),
            _ => None,
        }
    }

    /// Plane count of the canonical multi-plane layout.
    #[inline]
    pub fn canonical_plane_count(&self) -> usize {
        match self {
            Self::Rgba | Self::Rgb | Self::Gray => 1,
            Self::Nv12 | Self::Nv21 => 2,
            Self::Yv12 | Self::Yv21 => 3,
            Self::Unknown => 0,
        }
    }

    /// Returns `true` if a buffer of this format may hold `count` planes.
    pub fn accepts_plane_count(&self, count: usize) -> bool {
        match self {
            Self::Rgba | Self::Rgb | Self::Gray => count == 1,
            Self::Nv12 | Self::Nv21 => (1..=3).contains(&count),
            Self::Yv12 | Self::Yv21 => count == 1 || count == 3,
            Self::Unknown => false,
        }
    }

    /// Short uppercase name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Rgba => "RGBA",
            Self::Rgb => "RGB",
            Self::Nv12 => "NV12",
            Self::Nv21 => "NV21",
            Self::Yv12 => "YV12",
            Self::Yv21 => "YV21",
            Self::Gray => "GRAY",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// EXIF orientation of the stored pixel grid.
///
/// The discriminant is the EXIF tag value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Orientation {
    /// Row 0 is the top, column 0 the left side (identity).
    #[default]
    TopLeft = 1,
    /// Row 0 is the top, column 0 the right side.
    TopRight = 2,
    /// Row 0 is the bottom, column 0 the right side.
    BottomRight = 3,
    /// Row 0 is the bottom, column 0 the left side.
    BottomLeft = 4,
    /// Row 0 is the left side, column 0 the top.
    LeftTop = 5,
    /// Row 0 is the right side, column 0 the top.
    RightTop = 6,
    /// Row 0 is the right side, column 0 the bottom.
    RightBottom = 7,
    /// Row 0 is the left side, column 0 the bottom.
    LeftBottom = 8,
}

impl Orientation {
    /// All eight orientations in tag order.
    pub const ALL: [Orientation; 8] = [
        Self::TopLeft,
        Self::TopRight,
        Self::BottomRight,
        Self::BottomLeft,
        Self::LeftTop,
        Self::RightTop,
        Self::RightBottom,
        Self::LeftBottom,
    ];

    /// Maps a raw EXIF tag to an orientation.
    ///
    /// Values outside `1..=8` fall back to [`Orientation::TopLeft`].
    ///
    /// ```rust
    /// use vfb_core::Orientation;
    ///
    /// assert_eq!(Orientation::from_exif(6), Orientation::RightTop);
    /// assert_eq!(Orientation::from_exif(0), Orientation::TopLeft);
    /// assert_eq!(Orientation::from_exif(42), Orientation::TopLeft);
    /// ```
    pub fn from_exif(tag: u32) -> Self {
        match tag {
            2 => Self::TopRight,
            3 => Self::BottomRight,
            4 => Self::BottomLeft,
            5 => Self::LeftTop,
            6 => Self::RightTop,
            7 => Self::RightBottom,
            8 => Self::LeftBottom,
            _ => Self::TopLeft,
        }
    }

    /// EXIF tag value.
    #[inline]
    pub fn exif(&self) -> u32 {
        *self as u32
    }

    /// Returns `true` when rows and columns are transposed (tags 5 to 8).
    #[inline]
    pub fn is_transposed(&self) -> bool {
        self.exif() >= 5
    }
}

impl From<u32> for Orientation {
    fn from(tag: u32) -> Self {
        Self::from_exif(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_counts() {
        assert_eq!(Format::Rgb.canonical_plane_count(), 1);
        assert_eq!(Format::Nv21.canonical_plane_count(), 2);
        assert_eq!(Format::Yv12.canonical_plane_count(), 3);
        assert!(Format::Nv12.accepts_plane_count(1));
        assert!(Format::Nv12.accepts_plane_count(3));
        assert!(!Format::Yv21.accepts_plane_count(2));
        assert!(!Format::Gray.accepts_plane_count(2));
        assert!(!Format::Unknown.accepts_plane_count(1));
    }

    #[test]
    fn test_format_classes() {
        assert!(Format::Yv21.is_yuv());
        assert!(!Format::Rgba.is_yuv());
        assert!(Format::Nv21.is_semi_planar());
        assert!(Format::Gray.is_packed());
        assert_eq!(Format::Rgba.channels(), Some(4));
        assert_eq!(Format::Nv12.channels(), None);
        assert_eq!(Format::Yv12.to_string(), "YV12");
    }

    #[test]
    fn test_orientation_roundtrip() {
        for o in Orientation::ALL {
            assert_eq!(Orientation::from_exif(o.exif()), o);
        }
        assert_eq!(Orientation::from(9), Orientation::TopLeft);
        assert!(Orientation::LeftBottom.is_transposed());
        assert!(!Orientation::BottomLeft.is_transposed());
    }
}
