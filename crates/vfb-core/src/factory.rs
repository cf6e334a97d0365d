//! Frame buffer factories over caller-owned memory.
//!
//! Every factory borrows the slices it is given; nothing is copied. The
//! slice lengths are checked against the described geometry so later
//! transforms never address memory outside the caller's buffers.
//!
//! # Example
//!
//! ```rust
//! use vfb_core::{create_from_raw_buffer, Dimension, Format, Orientation};
//!
//! let nv21 = vec![0u8; 4 * 2 + 4];
//! let frame = create_from_raw_buffer(
//!     &nv21,
//!     Dimension::new(4, 2),
//!     Format::Nv21,
//!     Orientation::TopLeft,
//! )
//! .unwrap();
//! assert_eq!(frame.plane_count(), 2);
//! ```

use crate::{
    get_planes, get_planes_mut, Dimension, Error, Format, FrameBuffer, FrameBufferMut,
    Orientation, Plane, Result, Stride,
};

/// Bytes spanned by `rows` rows of `width` samples, each `channels` wide.
fn span(width: u32, rows: u32, stride: Stride, channels: usize) -> usize {
    if width == 0 || rows == 0 {
        return 0;
    }
    (rows as usize - 1) * stride.row_stride_bytes
        + (width as usize - 1) * stride.pixel_stride_bytes
        + channels
}

fn check_packed(buffer: &[u8], dimension: Dimension, stride: Stride, channels: usize) -> Result<()> {
    if stride.pixel_stride_bytes < channels {
        return Err(Error::invalid_stride(stride.pixel_stride_bytes, channels, dimension.width));
    }
    let min_row = dimension.width as usize * stride.pixel_stride_bytes;
    if stride.row_stride_bytes < min_row {
        return Err(Error::invalid_stride(stride.row_stride_bytes, min_row, dimension.width));
    }
    let required = span(dimension.width, dimension.height, stride, channels);
    if buffer.len() < required {
        return Err(Error::buffer_too_small(required, buffer.len()));
    }
    Ok(())
}

fn create_packed<'a>(
    buffer: &'a [u8],
    dimension: Dimension,
    format: Format,
    stride: Stride,
    orientation: Orientation,
) -> Result<FrameBuffer<'a>> {
    let channels = format
        .channels()
        .ok_or_else(|| Error::unsupported_format(format.name()))?;
    check_packed(buffer, dimension, stride, channels)?;
    FrameBuffer::new(vec![Plane::new(buffer, stride)], dimension, format, orientation)
}

/// Creates an RGBA frame over a tightly packed buffer.
pub fn create_from_rgba_raw_buffer(
    input: &[u8],
    dimension: Dimension,
    orientation: Orientation,
) -> Result<FrameBuffer<'_>> {
    create_packed(input, dimension, Format::Rgba, Stride::packed(dimension.width, 4), orientation)
}

/// Creates an RGBA frame with an explicit stride.
pub fn create_from_rgba_raw_buffer_with_stride(
    input: &[u8],
    dimension: Dimension,
    stride: Stride,
    orientation: Orientation,
) -> Result<FrameBuffer<'_>> {
    create_packed(input, dimension, Format::Rgba, stride, orientation)
}

/// Creates an RGB frame over a tightly packed buffer.
///
/// ```rust
/// use vfb_core::{create_from_rgb_raw_buffer, Dimension, Orientation};
///
/// let pixels = vec![0u8; 2 * 2 * 3];
/// assert!(create_from_rgb_raw_buffer(&pixels, Dimension::new(2, 2), Orientation::TopLeft).is_ok());
/// assert!(create_from_rgb_raw_buffer(&pixels, Dimension::new(3, 2), Orientation::TopLeft).is_err());
/// ```
pub fn create_from_rgb_raw_buffer(
    input: &[u8],
    dimension: Dimension,
    orientation: Orientation,
) -> Result<FrameBuffer<'_>> {
    create_packed(input, dimension, Format::Rgb, Stride::packed(dimension.width, 3), orientation)
}

/// Creates an RGB frame with an explicit stride.
pub fn create_from_rgb_raw_buffer_with_stride(
    input: &[u8],
    dimension: Dimension,
    stride: Stride,
    orientation: Orientation,
) -> Result<FrameBuffer<'_>> {
    create_packed(input, dimension, Format::Rgb, stride, orientation)
}

/// Creates a GRAY frame over a tightly packed buffer.
pub fn create_from_gray_raw_buffer(
    input: &[u8],
    dimension: Dimension,
    orientation: Orientation,
) -> Result<FrameBuffer<'_>> {
    create_packed(input, dimension, Format::Gray, Stride::packed(dimension.width, 1), orientation)
}

/// Creates a GRAY frame with an explicit stride.
pub fn create_from_gray_raw_buffer_with_stride(
    input: &[u8],
    dimension: Dimension,
    stride: Stride,
    orientation: Orientation,
) -> Result<FrameBuffer<'_>> {
    create_packed(input, dimension, Format::Gray, stride, orientation)
}

/// Creates a YUV frame from separate luma and chroma slices.
///
/// Planes are stored in memory order of the format: Y, V, U for NV21 and
/// YV12; Y, U, V for NV12 and YV21. For semi-planar formats `u` and `v`
/// may point into the same interleaved plane with `pixel_stride_uv == 2`.
#[allow(clippy::too_many_arguments)]
pub fn create_from_yuv_raw_buffer<'a>(
    y: &'a [u8],
    u: &'a [u8],
    v: &'a [u8],
    format: Format,
    dimension: Dimension,
    row_stride_y: usize,
    row_stride_uv: usize,
    pixel_stride_uv: usize,
    orientation: Orientation,
) -> Result<FrameBuffer<'a>> {
    let uv_dim = crate::uv_plane_dimension(dimension, format)?;
    let luma = Stride::new(row_stride_y, 1);
    let chroma = Stride::new(row_stride_uv, pixel_stride_uv);
    if row_stride_y < dimension.width as usize {
        return Err(Error::invalid_stride(row_stride_y, dimension.width as usize, dimension.width));
    }
    for (plane, stride, d) in [(y, luma, dimension), (u, chroma, uv_dim), (v, chroma, uv_dim)] {
        let required = span(d.width, d.height, stride, 1);
        if plane.len() < required {
            return Err(Error::buffer_too_small(required, plane.len()));
        }
    }
    let planes = match format {
        Format::Nv21 | Format::Yv12 => vec![
            Plane::new(y, luma),
            Plane::new(v, chroma),
            Plane::new(u, chroma),
        ],
        _ => vec![
            Plane::new(y, luma),
            Plane::new(u, chroma),
            Plane::new(v, chroma),
        ],
    };
    FrameBuffer::new(planes, dimension, format, orientation)
}

/// Creates a frame over one contiguous buffer in the canonical layout.
///
/// Packed formats yield one plane, NV12/NV21 two, YV12/YV21 three.
pub fn create_from_raw_buffer(
    buffer: &[u8],
    dimension: Dimension,
    format: Format,
    orientation: Orientation,
) -> Result<FrameBuffer<'_>> {
    if dimension.is_empty() {
        return Err(Error::invalid_dimensions(dimension.width, dimension.height, "frame must not be empty"));
    }
    FrameBuffer::new(get_planes(buffer, dimension, format)?, dimension, format, orientation)
}

/// Writable twin of [`create_from_raw_buffer`], used to wrap output and
/// scratch allocations.
pub fn create_from_raw_buffer_mut(
    buffer: &mut [u8],
    dimension: Dimension,
    format: Format,
    orientation: Orientation,
) -> Result<FrameBufferMut<'_>> {
    if dimension.is_empty() {
        return Err(Error::invalid_dimensions(dimension.width, dimension.height, "frame must not be empty"));
    }
    FrameBufferMut::new(get_planes_mut(buffer, dimension, format)?, dimension, format, orientation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packed_factories() {
        let data = vec![0u8; 6 * 4];
        let f = create_from_rgba_raw_buffer(&data, Dimension::new(3, 2), Orientation::LeftTop).unwrap();
        assert_eq!(f.format(), Format::Rgba);
        assert_eq!(f.orientation(), Orientation::LeftTop);
        assert_eq!(f.planes()[0].stride(), Stride::new(12, 4));

        let g = create_from_gray_raw_buffer(&data, Dimension::new(6, 4), Orientation::TopLeft).unwrap();
        assert_eq!(g.planes()[0].stride(), Stride::new(6, 1));
    }

    #[test]
    fn test_padded_stride() {
        // 2x2 RGB rows padded to 8 bytes; last row needs only 6
        let data = vec![0u8; 8 + 6];
        let f = create_from_rgb_raw_buffer_with_stride(
            &data,
            Dimension::new(2, 2),
            Stride::new(8, 3),
            Orientation::TopLeft,
        );
        assert!(f.is_ok());

        let bad = create_from_rgb_raw_buffer_with_stride(
            &data,
            Dimension::new(2, 2),
            Stride::new(4, 3),
            Orientation::TopLeft,
        );
        assert!(matches!(bad, Err(Error::InvalidStride { .. })));
    }

    #[test]
    fn test_yuv_plane_order() {
        let y = vec![1u8; 16];
        let u = vec![2u8; 4];
        let v = vec![3u8; 4];
        let yv12 = create_from_yuv_raw_buffer(
            &y, &u, &v, Format::Yv12, Dimension::new(4, 4), 4, 2, 1, Orientation::TopLeft,
        )
        .unwrap();
        assert_eq!(yv12.planes()[1].buffer()[0], 3);
        assert_eq!(yv12.planes()[2].buffer()[0], 2);

        let yv21 = create_from_yuv_raw_buffer(
            &y, &u, &v, Format::Yv21, Dimension::new(4, 4), 4, 2, 1, Orientation::TopLeft,
        )
        .unwrap();
        assert_eq!(yv21.planes()[1].buffer()[0], 2);
    }

    #[test]
    fn test_yuv_rejects_packed_format() {
        let y = vec![0u8; 16];
        let r = create_from_yuv_raw_buffer(
            &y, &y, &y, Format::Rgb, Dimension::new(4, 4), 4, 2, 1, Orientation::TopLeft,
        );
        assert!(r.is_err());
    }

    #[test]
    fn test_raw_buffer_plane_counts() {
        let data = vec![0u8; 64];
        let dim = Dimension::new(4, 4);
        let count = |format| create_from_raw_buffer(&data, dim, format, Orientation::TopLeft).map(|f| f.plane_count());
        assert_eq!(count(Format::Rgb).unwrap(), 1);
        assert_eq!(count(Format::Nv12).unwrap(), 2);
        assert_eq!(count(Format::Yv21).unwrap(), 3);
        assert!(count(Format::Unknown).is_err());
    }

    #[test]
    fn test_raw_buffer_too_small() {
        let data = vec![0u8; 10];
        let r = create_from_raw_buffer(&data, Dimension::new(4, 4), Format::Gray, Orientation::TopLeft);
        assert!(matches!(r, Err(Error::BufferTooSmall { required: 16, actual: 10 })));
    }
}
