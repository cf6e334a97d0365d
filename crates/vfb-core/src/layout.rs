//! Byte sizes and plane layouts of contiguous frame allocations.
//!
//! A frame held in one allocation stores its planes back to back:
//!
//! ```text
//! GRAY/RGB/RGBA  [ pixels ................................ ]
//! NV12/NV21      [ Y (w*h) ............ ][ UV interleaved  ]
//! YV12           [ Y (w*h) ............ ][ V ][ U ]
//! YV21           [ Y (w*h) ............ ][ U ][ V ]
//! ```
//!
//! Chroma planes are subsampled 2x2, rounding odd sides up.

use crate::{Dimension, Error, Format, Plane, PlaneMut, Result, Stride};

/// Position and stride of one plane inside a contiguous allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaneLayout {
    /// Byte offset of the first sample
    pub offset: usize,
    /// Strides of the plane
    pub stride: Stride,
}

/// Number of bytes needed to store a frame of `dimension` in `format`.
///
/// # Example
///
/// ```rust
/// use vfb_core::{frame_buffer_byte_size, Dimension, Format};
///
/// let dim = Dimension::new(3, 3);
/// assert_eq!(frame_buffer_byte_size(dim, Format::Rgb), 27);
/// // 9 luma bytes + 2 * (2 * 2) chroma bytes
/// assert_eq!(frame_buffer_byte_size(dim, Format::Nv21), 17);
/// ```
pub fn frame_buffer_byte_size(dimension: Dimension, format: Format) -> usize {
    let area = dimension.area();
    match format {
        Format::Nv12 | Format::Nv21 | Format::Yv12 | Format::Yv21 => {
            let (uv_w, uv_h) = half_up(dimension);
            area + 2 * uv_w * uv_h
        }
        Format::Rgba => area * 4,
        Format::Rgb => area * 3,
        Format::Gray => area,
        Format::Unknown => 0,
    }
}

/// Alias of [`frame_buffer_byte_size`].
#[inline]
pub fn buffer_byte_size(dimension: Dimension, format: Format) -> usize {
    frame_buffer_byte_size(dimension, format)
}

/// Pixel stride in bytes of a packed format.
pub fn pixel_stride(format: Format) -> Result<usize> {
    format
        .channels()
        .ok_or_else(|| Error::unsupported_format(format!("{format} has no single pixel stride")))
}

/// Dimension of each chroma plane of a YUV frame.
///
/// ```rust
/// use vfb_core::{uv_plane_dimension, Dimension, Format};
///
/// let uv = uv_plane_dimension(Dimension::new(5, 3), Format::Yv12).unwrap();
/// assert_eq!(uv, Dimension::new(3, 2));
/// assert!(uv_plane_dimension(Dimension::new(5, 3), Format::Rgb).is_err());
/// ```
pub fn uv_plane_dimension(dimension: Dimension, format: Format) -> Result<Dimension> {
    if dimension.is_empty() {
        return Err(Error::invalid_dimensions(
            dimension.width,
            dimension.height,
            "frame must not be empty",
        ));
    }
    if !format.is_yuv() {
        return Err(Error::unsupported_format(format!(
            "{format} has no chroma planes"
        )));
    }
    Ok(Dimension::new(
        dimension.width.div_ceil(2),
        dimension.height.div_ceil(2),
    ))
}

/// Dimension of the inclusive crop `(x0, y0)`-`(x1, y1)`.
///
/// Fails when a corner lies before its origin.
pub fn crop_dimension(x0: u32, x1: u32, y0: u32, y1: u32) -> Result<Dimension> {
    match (x1.checked_sub(x0), y1.checked_sub(y0)) {
        (Some(w), Some(h)) => Ok(Dimension::new(w + 1, h + 1)),
        _ => Err(Error::invalid_argument(format!(
            "crop corners ({x0}, {y0})-({x1}, {y1}) are reversed"
        ))),
    }
}

/// Canonical plane layout of a tightly packed frame.
///
/// ```rust
/// use vfb_core::{plane_layout, Dimension, Format};
///
/// let planes = plane_layout(Dimension::new(4, 2), Format::Yv12).unwrap();
/// assert_eq!(planes.len(), 3);
/// assert_eq!(planes[1].offset, 8);
/// assert_eq!(planes[2].offset, 10);
/// ```
pub fn plane_layout(dimension: Dimension, format: Format) -> Result<Vec<PlaneLayout>> {
    match format {
        Format::Gray | Format::Rgb | Format::Rgba => {
            let bpp = pixel_stride(format)?;
            Ok(vec![PlaneLayout {
                offset: 0,
                stride: Stride::packed(dimension.width, bpp),
            }])
        }
        Format::Nv12 | Format::Nv21 | Format::Yv12 | Format::Yv21 => {
            yuv_layout(dimension, format, dimension.width as usize)
        }
        Format::Unknown => Err(Error::unsupported_format("UNKNOWN")),
    }
}

/// Layout of the luma and chroma planes of a YUV frame stored in a single
/// plane whose luma rows are `luma_row_stride` bytes apart.
///
/// Semi-planar chroma rows reuse the luma row stride rounded up to an even
/// byte count. Planar chroma rows use half the luma row stride, rounded up.
pub fn yuv_layout(
    dimension: Dimension,
    format: Format,
    luma_row_stride: usize,
) -> Result<Vec<PlaneLayout>> {
    let uv_h = uv_plane_dimension(dimension, format)?.height as usize;
    let luma_size = luma_row_stride * dimension.height as usize;
    let luma = PlaneLayout {
        offset: 0,
        stride: Stride::new(luma_row_stride, 1),
    };
    if format.is_semi_planar() {
        let uv_row_stride = luma_row_stride.next_multiple_of(2);
        return Ok(vec![
            luma,
            PlaneLayout {
                offset: luma_size,
                stride: Stride::new(uv_row_stride, 2),
            },
        ]);
    }
    let uv_row_stride = luma_row_stride.div_ceil(2);
    Ok(vec![
        luma,
        PlaneLayout {
            offset: luma_size,
            stride: Stride::new(uv_row_stride, 1),
        },
        PlaneLayout {
            offset: luma_size + uv_row_stride * uv_h,
            stride: Stride::new(uv_row_stride, 1),
        },
    ])
}

/// Splits a contiguous allocation into the planes of a frame.
///
/// Fails when `buffer` is shorter than [`frame_buffer_byte_size`].
pub fn get_planes(buffer: &[u8], dimension: Dimension, format: Format) -> Result<Vec<Plane<'_>>> {
    let required = frame_buffer_byte_size(dimension, format);
    if buffer.len() < required {
        return Err(Error::buffer_too_small(required, buffer.len()));
    }
    let layout = plane_layout(dimension, format)?;
    Ok(split(buffer, &layout)?
        .into_iter()
        .zip(&layout)
        .map(|(slice, l)| Plane::new(slice, l.stride))
        .collect())
}

/// Mutable twin of [`get_planes`].
pub fn get_planes_mut(
    buffer: &mut [u8],
    dimension: Dimension,
    format: Format,
) -> Result<Vec<PlaneMut<'_>>> {
    let required = frame_buffer_byte_size(dimension, format);
    if buffer.len() < required {
        return Err(Error::buffer_too_small(required, buffer.len()));
    }
    let layout = plane_layout(dimension, format)?;
    Ok(split_mut(buffer, &layout)?
        .into_iter()
        .zip(&layout)
        .map(|(slice, l)| PlaneMut::new(slice, l.stride))
        .collect())
}

/// Cuts `buffer` at each layout offset. The last plane keeps the tail.
pub(crate) fn split<'a>(buffer: &'a [u8], layout: &[PlaneLayout]) -> Result<Vec<&'a [u8]>> {
    let mut out = Vec::with_capacity(layout.len());
    let mut rest = buffer;
    let mut consumed = 0;
    for next in layout.iter().skip(1) {
        let len = next
            .offset
            .checked_sub(consumed)
            .ok_or_else(|| Error::invalid_argument("plane offsets must increase"))?;
        if len > rest.len() {
            return Err(Error::buffer_too_small(next.offset, buffer.len()));
        }
        let (head, tail) = rest.split_at(len);
        out.push(head);
        rest = tail;
        consumed = next.offset;
    }
    out.push(rest);
    Ok(out)
}

/// Mutable twin of [`split`].
pub(crate) fn split_mut<'a>(
    buffer: &'a mut [u8],
    layout: &[PlaneLayout],
) -> Result<Vec<&'a mut [u8]>> {
    let total = buffer.len();
    let mut out = Vec::with_capacity(layout.len());
    let mut rest = buffer;
    let mut consumed = 0;
    for next in layout.iter().skip(1) {
        let len = next
            .offset
            .checked_sub(consumed)
            .ok_or_else(|| Error::invalid_argument("plane offsets must increase"))?;
        if len > rest.len() {
            return Err(Error::buffer_too_small(next.offset, total));
        }
        let (head, tail) = std::mem::take(&mut rest).split_at_mut(len);
        out.push(head);
        rest = tail;
        consumed = next.offset;
    }
    out.push(rest);
    Ok(out)
}

#[inline]
fn half_up(dimension: Dimension) -> (usize, usize) {
    (
        dimension.width.div_ceil(2) as usize,
        dimension.height.div_ceil(2) as usize,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_sizes() {
        let d = Dimension::new(4, 2);
        assert_eq!(frame_buffer_byte_size(d, Format::Gray), 8);
        assert_eq!(frame_buffer_byte_size(d, Format::Rgb), 24);
        assert_eq!(frame_buffer_byte_size(d, Format::Rgba), 32);
        assert_eq!(frame_buffer_byte_size(d, Format::Nv12), 12);
        assert_eq!(frame_buffer_byte_size(d, Format::Yv21), 12);
        assert_eq!(frame_buffer_byte_size(d, Format::Unknown), 0);
        // odd sides round chroma up
        assert_eq!(frame_buffer_byte_size(Dimension::new(5, 5), Format::Yv12), 25 + 18);
    }

    #[test]
    fn test_nv_layout() {
        let layout = plane_layout(Dimension::new(4, 2), Format::Nv21).unwrap();
        assert_eq!(layout.len(), 2);
        assert_eq!(layout[0].stride, Stride::new(4, 1));
        assert_eq!(layout[1].offset, 8);
        assert_eq!(layout[1].stride, Stride::new(4, 2));
    }

    #[test]
    fn test_nv_layout_odd_width() {
        let dim = Dimension::new(3, 3);
        let layout = plane_layout(dim, Format::Nv12).unwrap();
        assert_eq!(layout[1].offset, 9);
        assert_eq!(layout[1].stride, Stride::new(4, 2));
        // chroma rows fit exactly in the computed byte size
        assert_eq!(9 + 4 * 2, frame_buffer_byte_size(dim, Format::Nv12));
    }

    #[test]
    fn test_yv_layout() {
        let layout = plane_layout(Dimension::new(5, 3), Format::Yv21).unwrap();
        assert_eq!(layout[1].offset, 15);
        assert_eq!(layout[1].stride, Stride::new(3, 1));
        assert_eq!(layout[2].offset, 15 + 3 * 2);
    }

    #[test]
    fn test_packed_layout() {
        let layout = plane_layout(Dimension::new(7, 1), Format::Rgba).unwrap();
        assert_eq!(layout, vec![PlaneLayout { offset: 0, stride: Stride::new(28, 4) }]);
        assert!(plane_layout(Dimension::new(7, 1), Format::Unknown).is_err());
    }

    #[test]
    fn test_get_planes() {
        let data = vec![0u8; 12];
        let planes = get_planes(&data, Dimension::new(4, 2), Format::Yv12).unwrap();
        assert_eq!(planes.len(), 3);
        assert_eq!(planes[0].buffer().len(), 8);
        assert_eq!(planes[1].buffer().len(), 2);
        assert_eq!(planes[2].buffer().len(), 2);

        let short = vec![0u8; 11];
        assert!(get_planes(&short, Dimension::new(4, 2), Format::Yv12).is_err());
    }

    #[test]
    fn test_get_planes_mut() {
        let mut data = vec![0u8; 12];
        let mut planes = get_planes_mut(&mut data, Dimension::new(4, 2), Format::Nv12).unwrap();
        planes[1].buffer_mut()[0] = 7;
        drop(planes);
        assert_eq!(data[8], 7);
    }

    #[test]
    fn test_crop_dimension() {
        assert_eq!(crop_dimension(1, 2, 0, 1).unwrap(), Dimension::new(2, 2));
        assert_eq!(crop_dimension(3, 3, 5, 5).unwrap(), Dimension::new(1, 1));
        assert!(crop_dimension(2, 1, 0, 0).is_err());
        assert!(crop_dimension(0, 0, 4, 3).is_err());
    }

    #[test]
    fn test_uv_plane_dimension_errors() {
        assert!(uv_plane_dimension(Dimension::new(0, 2), Format::Nv12).is_err());
        assert!(uv_plane_dimension(Dimension::new(2, 2), Format::Gray).is_err());
    }
}
