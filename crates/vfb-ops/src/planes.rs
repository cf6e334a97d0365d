//! Resolution of frame buffers into per-component sample views.
//!
//! Packed frames become one multi-channel view. YUV frames become a luma
//! view plus one view per chroma component, whatever the storage: one
//! contiguous plane, semi-planar (U and V interleaved in one plane) or
//! planar (separate U and V planes).
//!
//! Output views are fully resolved and bounds-checked before a kernel
//! writes anything.

use vfb_core::{
    uv_plane_dimension, Dimension, Error, Format, FrameBuffer, FrameBufferMut, Plane, Stride,
};

use crate::samples::{check_view, Samples, SamplesMut};
use crate::{OpsError, OpsResult};

/// Chroma component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Chroma {
    U,
    V,
}

/// Read views of a frame.
pub(crate) enum FrameSamples<'a> {
    Packed(Samples<'a>),
    Yuv {
        y: Samples<'a>,
        u: Samples<'a>,
        v: Samples<'a>,
    },
}

/// Write views of a frame.
pub(crate) enum FrameSamplesMut<'a> {
    Packed(SamplesMut<'a>),
    Yuv { y: SamplesMut<'a>, chroma: ChromaMut<'a> },
}

/// Writable chroma storage. Interleaved chroma hands out one component at
/// a time since both live in the same bytes.
pub(crate) enum ChromaMut<'a> {
    Interleaved {
        data: &'a mut [u8],
        u_offset: usize,
        v_offset: usize,
        dimension: Dimension,
        stride: Stride,
    },
    Planar {
        u: SamplesMut<'a>,
        v: SamplesMut<'a>,
    },
}

impl ChromaMut<'_> {
    /// Writable view of one component.
    pub(crate) fn component(&mut self, chroma: Chroma) -> OpsResult<SamplesMut<'_>> {
        match self {
            Self::Interleaved {
                data,
                u_offset,
                v_offset,
                dimension,
                stride,
            } => {
                let offset = match chroma {
                    Chroma::U => *u_offset,
                    Chroma::V => *v_offset,
                };
                let len = data.len();
                let bytes = data
                    .get_mut(offset..)
                    .ok_or_else(|| Error::buffer_too_small(offset, len))?;
                SamplesMut::new(
                    bytes,
                    dimension.width as usize,
                    dimension.height as usize,
                    stride.row_stride_bytes,
                    stride.pixel_stride_bytes,
                    1,
                )
            }
            Self::Planar { u, v } => Ok(match chroma {
                Chroma::U => u.reborrow(),
                Chroma::V => v.reborrow(),
            }),
        }
    }
}

fn plane_samples<'a>(plane: &Plane<'a>, offset: usize, dimension: Dimension, channels: usize) -> OpsResult<Samples<'a>> {
    let buffer = plane.buffer();
    let data = buffer
        .get(offset..)
        .ok_or_else(|| Error::buffer_too_small(offset, buffer.len()))?;
    let stride = plane.stride();
    Samples::new(
        data,
        dimension.width as usize,
        dimension.height as usize,
        stride.row_stride_bytes,
        stride.pixel_stride_bytes,
        channels,
    )
}

fn plane_samples_mut(
    data: &mut [u8],
    stride: Stride,
    dimension: Dimension,
    channels: usize,
) -> OpsResult<SamplesMut<'_>> {
    SamplesMut::new(
        data,
        dimension.width as usize,
        dimension.height as usize,
        stride.row_stride_bytes,
        stride.pixel_stride_bytes,
        channels,
    )
}

/// Byte offsets of U and V inside an interleaved chroma plane.
fn interleaved_offsets(format: Format) -> (usize, usize) {
    match format {
        Format::Nv21 => (1, 0),
        _ => (0, 1),
    }
}

/// Returns `true` when the first chroma plane of a three-plane frame is U.
fn u_plane_first(format: Format) -> bool {
    matches!(format, Format::Nv12 | Format::Yv21)
}

/// Resolves the read views of a frame.
pub(crate) fn frame_samples<'a>(frame: &FrameBuffer<'a>) -> OpsResult<FrameSamples<'a>> {
    let dimension = frame.dimension();
    let format = frame.format();
    if let Some(channels) = format.channels() {
        let plane = frame
            .plane(0)
            .ok_or_else(|| OpsError::invalid("frame has no planes"))?;
        return Ok(FrameSamples::Packed(plane_samples(plane, 0, dimension, channels)?));
    }
    if !format.is_yuv() {
        return Err(OpsError::Unsupported(format!("{format} frame")));
    }
    let planes = frame.expanded_planes()?;
    let uv = uv_plane_dimension(dimension, format)?;
    let y = plane_samples(&planes[0], 0, dimension, 1)?;
    let (u, v) = match planes.len() {
        2 => {
            let (u_off, v_off) = interleaved_offsets(format);
            (
                plane_samples(&planes[1], u_off, uv, 1)?,
                plane_samples(&planes[1], v_off, uv, 1)?,
            )
        }
        3 => {
            let (first, second) = (
                plane_samples(&planes[1], 0, uv, 1)?,
                plane_samples(&planes[2], 0, uv, 1)?,
            );
            if u_plane_first(format) {
                (first, second)
            } else {
                (second, first)
            }
        }
        n => return Err(Error::plane_count(format.name(), n).into()),
    };
    Ok(FrameSamples::Yuv { y, u, v })
}

/// Resolves and bounds-checks the write views of a frame.
pub(crate) fn frame_samples_mut<'b>(frame: &'b mut FrameBufferMut<'_>) -> OpsResult<FrameSamplesMut<'b>> {
    let dimension = frame.dimension();
    let format = frame.format();
    if let Some(channels) = format.channels() {
        let plane = frame
            .planes_mut()
            .first_mut()
            .ok_or_else(|| OpsError::invalid("frame has no planes"))?;
        let stride = plane.stride();
        return Ok(FrameSamplesMut::Packed(plane_samples_mut(
            plane.buffer_mut(),
            stride,
            dimension,
            channels,
        )?));
    }
    if !format.is_yuv() {
        return Err(OpsError::Unsupported(format!("{format} frame")));
    }
    let uv = uv_plane_dimension(dimension, format)?;
    let planes = frame.expanded_planes_mut()?;
    let count = planes.len();
    let mut planes = planes.into_iter();
    let (Some(luma), Some(first)) = (planes.next(), planes.next()) else {
        return Err(Error::plane_count(format.name(), count).into());
    };
    let y_stride = luma.stride();
    let y = plane_samples_mut(luma.into_buffer(), y_stride, dimension, 1)?;
    let chroma = match planes.next() {
        None => {
            let (u_offset, v_offset) = interleaved_offsets(format);
            let stride = first.stride();
            let data = first.into_buffer();
            for offset in [u_offset, v_offset] {
                check_view(
                    data.len().saturating_sub(offset),
                    uv.width as usize,
                    uv.height as usize,
                    stride.row_stride_bytes,
                    stride.pixel_stride_bytes,
                    1,
                )?;
            }
            ChromaMut::Interleaved {
                data,
                u_offset,
                v_offset,
                dimension: uv,
                stride,
            }
        }
        Some(second) => {
            let (u_plane, v_plane) = if u_plane_first(format) {
                (first, second)
            } else {
                (second, first)
            };
            let (u_stride, v_stride) = (u_plane.stride(), v_plane.stride());
            ChromaMut::Planar {
                u: plane_samples_mut(u_plane.into_buffer(), u_stride, uv, 1)?,
                v: plane_samples_mut(v_plane.into_buffer(), v_stride, uv, 1)?,
            }
        }
    };
    Ok(FrameSamplesMut::Yuv { y, chroma })
}

#[cfg(test)]
mod tests {
    use super::*;
    use vfb_core::{create_from_raw_buffer, create_from_raw_buffer_mut, create_from_yuv_raw_buffer, Orientation};

    #[test]
    fn test_nv21_chroma_order() {
        // 2x2 NV21: Y0..Y3, then V, U
        let data = [0u8, 0, 0, 0, 9, 7];
        let frame = create_from_raw_buffer(&data, Dimension::new(2, 2), Format::Nv21, Orientation::TopLeft).unwrap();
        match frame_samples(&frame).unwrap() {
            FrameSamples::Yuv { u, v, .. } => {
                assert_eq!(u.get(0, 0, 0), 7);
                assert_eq!(v.get(0, 0, 0), 9);
            }
            FrameSamples::Packed(_) => panic!("expected yuv"),
        }
    }

    #[test]
    fn test_yv12_chroma_order() {
        // 2x2 YV12: Y0..Y3, then V, then U
        let data = [0u8, 0, 0, 0, 9, 7];
        let frame = create_from_raw_buffer(&data, Dimension::new(2, 2), Format::Yv12, Orientation::TopLeft).unwrap();
        match frame_samples(&frame).unwrap() {
            FrameSamples::Yuv { u, v, .. } => {
                assert_eq!(u.get(0, 0, 0), 7);
                assert_eq!(v.get(0, 0, 0), 9);
            }
            FrameSamples::Packed(_) => panic!("expected yuv"),
        }
    }

    #[test]
    fn test_three_plane_nv12() {
        let y = [0u8; 4];
        let uv = [5u8, 6];
        let frame = create_from_yuv_raw_buffer(
            &y,
            &uv,
            &uv[1..],
            Format::Nv12,
            Dimension::new(2, 2),
            2,
            2,
            2,
            Orientation::TopLeft,
        )
        .unwrap();
        match frame_samples(&frame).unwrap() {
            FrameSamples::Yuv { u, v, .. } => {
                assert_eq!(u.get(0, 0, 0), 5);
                assert_eq!(v.get(0, 0, 0), 6);
            }
            FrameSamples::Packed(_) => panic!("expected yuv"),
        }
    }

    #[test]
    fn test_write_interleaved_components() {
        let mut data = [0u8; 6];
        let mut frame =
            create_from_raw_buffer_mut(&mut data, Dimension::new(2, 2), Format::Nv12, Orientation::TopLeft).unwrap();
        match frame_samples_mut(&mut frame).unwrap() {
            FrameSamplesMut::Yuv { mut chroma, .. } => {
                chroma.component(Chroma::U).unwrap().for_each_row(|_, row| row[0] = 1);
                chroma.component(Chroma::V).unwrap().for_each_row(|_, row| row[0] = 2);
            }
            FrameSamplesMut::Packed(_) => panic!("expected yuv"),
        }
        drop(frame);
        assert_eq!(&data[4..], &[1, 2]);
    }
}
