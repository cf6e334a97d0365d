//! CPU implementation of [`FrameProcessor`].
//!
//! Frames are resolved into strided sample views (see [`crate::planes`]).
//! Packed frames run each kernel once over all channels. YUV frames run it
//! on the luma plane, then on U, then on V, which covers semi-planar and
//! planar storage alike and lets input and output use different YUV
//! layouts.

use tracing::trace;
use vfb_core::{FrameBuffer, FrameBufferMut};

use crate::convert::convert_samples;
use crate::engine::FrameProcessor;
use crate::planes::{frame_samples, frame_samples_mut, Chroma, FrameSamples, FrameSamplesMut};
use crate::samples::{mirror_horizontal, mirror_vertical, resize_bilinear, resize_nearest, rotate_ccw, Region, Samples, SamplesMut};
use crate::validate::{
    validate_buffer_formats, validate_convert_formats, validate_crop_buffer_inputs, validate_flip_buffer_inputs,
    validate_resize_buffer_inputs, validate_rotate_buffer_inputs,
};
use crate::{OpsError, OpsResult};

/// Which sampling grid a view belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Grid {
    /// Full resolution: packed pixels or luma.
    Full,
    /// Half resolution chroma.
    Chroma,
}

/// Runs `kernel` for every matching pair of source and destination views.
fn for_each_view<F>(buffer: &FrameBuffer<'_>, output: &mut FrameBufferMut<'_>, mut kernel: F) -> OpsResult<()>
where
    F: FnMut(Grid, &Samples<'_>, &mut SamplesMut<'_>) -> OpsResult<()>,
{
    let (from, to) = (buffer.format(), output.format());
    let src = frame_samples(buffer)?;
    let mut dst = frame_samples_mut(output)?;
    match (&src, &mut dst) {
        (FrameSamples::Packed(s), FrameSamplesMut::Packed(d)) => {
            let s = s.with_channels(d.channels().min(s.channels()))?;
            kernel(Grid::Full, &s, d)
        }
        (FrameSamples::Yuv { y, u, v }, FrameSamplesMut::Yuv { y: dy, chroma }) => {
            kernel(Grid::Full, y, dy)?;
            kernel(Grid::Chroma, u, &mut chroma.component(Chroma::U)?)?;
            kernel(Grid::Chroma, v, &mut chroma.component(Chroma::V)?)
        }
        _ => Err(OpsError::Unsupported(format!("transform from {from} into {to}"))),
    }
}

fn full_region(src: &Samples<'_>) -> Region {
    Region::new(0, 0, src.width(), src.height())
}

/// Portable CPU transform engine.
#[derive(Debug, Default, Clone, Copy)]
pub struct SoftwareProcessor;

impl SoftwareProcessor {
    /// Creates the engine.
    pub fn new() -> Self {
        Self
    }
}

impl FrameProcessor for SoftwareProcessor {
    fn name(&self) -> &'static str {
        "software"
    }

    fn crop(
        &self,
        buffer: &FrameBuffer<'_>,
        x0: u32,
        y0: u32,
        x1: u32,
        y1: u32,
        output: &mut FrameBufferMut<'_>,
    ) -> OpsResult<()> {
        validate_crop_buffer_inputs(buffer, output, x0, y0, x1, y1)?;
        trace!(format = %buffer.format(), x0, y0, x1, y1, out_w = output.dimension().width, out_h = output.dimension().height, "software::crop");
        let (x0, y0) = (x0 as usize, y0 as usize);
        let (crop_w, crop_h) = (x1 as usize - x0 + 1, y1 as usize - y0 + 1);
        for_each_view(buffer, output, |grid, src, dst| {
            // Chroma spans half the crop from the sample holding (x0, y0).
            let region = match grid {
                Grid::Full => Region::new(x0, y0, crop_w, crop_h),
                Grid::Chroma => {
                    let (cx, cy) = (x0 / 2, y0 / 2);
                    Region::new(
                        cx,
                        cy,
                        crop_w.div_ceil(2).min(src.width().saturating_sub(cx)),
                        crop_h.div_ceil(2).min(src.height().saturating_sub(cy)),
                    )
                }
            };
            resize_bilinear(src, region, dst)
        })
    }

    fn resize(&self, buffer: &FrameBuffer<'_>, output: &mut FrameBufferMut<'_>) -> OpsResult<()> {
        validate_resize_buffer_inputs(buffer, output)?;
        let (from, to) = (buffer.dimension(), output.dimension());
        trace!(format = %buffer.format(), from_w = from.width, from_h = from.height, to_w = to.width, to_h = to.height, "software::resize");
        for_each_view(buffer, output, |_, src, dst| resize_bilinear(src, full_region(src), dst))
    }

    fn resize_nearest_neighbor(&self, buffer: &FrameBuffer<'_>, output: &mut FrameBufferMut<'_>) -> OpsResult<()> {
        validate_resize_buffer_inputs(buffer, output)?;
        let (from, to) = (buffer.dimension(), output.dimension());
        trace!(format = %buffer.format(), from_w = from.width, from_h = from.height, to_w = to.width, to_h = to.height, "software::resize_nearest_neighbor");
        for_each_view(buffer, output, |_, src, dst| resize_nearest(src, full_region(src), dst))
    }

    fn rotate(&self, buffer: &FrameBuffer<'_>, angle_deg: u32, output: &mut FrameBufferMut<'_>) -> OpsResult<()> {
        validate_rotate_buffer_inputs(buffer, output, angle_deg)?;
        trace!(format = %buffer.format(), angle_deg, "software::rotate");
        let turns = angle_deg / 90;
        for_each_view(buffer, output, |_, src, dst| rotate_ccw(src, turns, dst))
    }

    fn flip_horizontally(&self, buffer: &FrameBuffer<'_>, output: &mut FrameBufferMut<'_>) -> OpsResult<()> {
        validate_flip_buffer_inputs(buffer, output)?;
        trace!(format = %buffer.format(), "software::flip_horizontally");
        for_each_view(buffer, output, |_, src, dst| mirror_horizontal(src, dst))
    }

    fn flip_vertically(&self, buffer: &FrameBuffer<'_>, output: &mut FrameBufferMut<'_>) -> OpsResult<()> {
        validate_flip_buffer_inputs(buffer, output)?;
        trace!(format = %buffer.format(), "software::flip_vertically");
        for_each_view(buffer, output, |_, src, dst| mirror_vertical(src, dst))
    }

    fn convert(&self, buffer: &FrameBuffer<'_>, output: &mut FrameBufferMut<'_>) -> OpsResult<()> {
        validate_buffer_formats(buffer, output)?;
        validate_convert_formats(buffer.format(), output.format())?;
        if buffer.dimension() != output.dimension() {
            return Err(OpsError::invalid("conversion requires equal input and output dimensions"));
        }
        trace!(from = %buffer.format(), to = %output.format(), "software::convert");
        let src = frame_samples(buffer)?;
        let mut dst = frame_samples_mut(output)?;
        convert_samples(&src, &mut dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vfb_core::{create_from_raw_buffer, create_from_raw_buffer_mut, frame_buffer_byte_size, Dimension, Format, Orientation};

    fn run<F>(src: &[u8], in_dim: Dimension, in_fmt: Format, out_dim: Dimension, out_fmt: Format, f: F) -> OpsResult<Vec<u8>>
    where
        F: FnOnce(&SoftwareProcessor, &FrameBuffer<'_>, &mut FrameBufferMut<'_>) -> OpsResult<()>,
    {
        let input = create_from_raw_buffer(src, in_dim, in_fmt, Orientation::TopLeft).unwrap();
        let mut out = vec![0u8; frame_buffer_byte_size(out_dim, out_fmt)];
        let mut output = create_from_raw_buffer_mut(&mut out, out_dim, out_fmt, Orientation::TopLeft).unwrap();
        f(&SoftwareProcessor::new(), &input, &mut output)?;
        Ok(out)
    }

    #[test]
    fn test_crop_rgb() {
        // 4x2 RGB, pixel value = index
        let src: Vec<u8> = (0..8u8).flat_map(|p| [p, p, p]).collect();
        let out = run(&src, Dimension::new(4, 2), Format::Rgb, Dimension::new(2, 2), Format::Rgb, |p, i, o| {
            p.crop(i, 1, 0, 2, 1, o)
        })
        .unwrap();
        let firsts: Vec<u8> = out.chunks(3).map(|c| c[0]).collect();
        assert_eq!(firsts, [1, 2, 5, 6]);
    }

    #[test]
    fn test_crop_rgba_into_rgb() {
        let src = [1u8, 2, 3, 255, 4, 5, 6, 255];
        let out = run(&src, Dimension::new(2, 1), Format::Rgba, Dimension::new(1, 1), Format::Rgb, |p, i, o| {
            p.crop(i, 1, 0, 1, 0, o)
        })
        .unwrap();
        assert_eq!(out, [4, 5, 6]);
    }

    #[test]
    fn test_crop_rgb_into_rgba() {
        let src = [1u8, 2, 3, 4, 5, 6];
        let out = run(&src, Dimension::new(2, 1), Format::Rgb, Dimension::new(1, 1), Format::Rgba, |p, i, o| {
            p.crop(i, 1, 0, 1, 0, o)
        })
        .unwrap();
        assert_eq!(out, [4, 5, 6, 255]);
    }

    #[test]
    fn test_flip_rgb_into_rgba() {
        let src = [1u8, 2, 3, 4, 5, 6];
        let d = Dimension::new(2, 1);
        let out = run(&src, d, Format::Rgb, d, Format::Rgba, |p, i, o| p.flip_horizontally(i, o)).unwrap();
        assert_eq!(out, [4, 5, 6, 255, 1, 2, 3, 255]);
    }

    #[test]
    fn test_crop_nv12_odd_origin_copies_chroma() {
        // 4x2 NV12: Y = 0..8, UV pairs (10, 20) and (50, 60)
        let src = [0u8, 1, 2, 3, 4, 5, 6, 7, 10, 20, 50, 60];
        let d = Dimension::new(2, 2);
        let out = run(&src, Dimension::new(4, 2), Format::Nv12, d, Format::Nv12, |p, i, o| {
            p.crop(i, 1, 0, 2, 1, o)
        })
        .unwrap();
        assert_eq!(out, [1, 2, 5, 6, 10, 20]);
    }

    #[test]
    fn test_crop_yv12_odd_origin_copies_chroma() {
        // 4x2 YV12: Y = 0..8, V plane [50, 60], U plane [10, 20]
        let src = [0u8, 1, 2, 3, 4, 5, 6, 7, 50, 60, 10, 20];
        let d = Dimension::new(2, 2);
        let out = run(&src, Dimension::new(4, 2), Format::Yv12, d, Format::Yv12, |p, i, o| {
            p.crop(i, 1, 0, 2, 1, o)
        })
        .unwrap();
        assert_eq!(out, [1, 2, 5, 6, 50, 10]);

        // last column of an odd-width frame
        let mut src: Vec<u8> = (0..15).collect();
        src.extend([71, 72, 73, 74, 75, 76, 81, 82, 83, 84, 85, 86]);
        let out = run(&src, Dimension::new(5, 3), Format::Yv12, Dimension::new(2, 3), Format::Yv12, |p, i, o| {
            p.crop(i, 3, 0, 4, 2, o)
        })
        .unwrap();
        assert_eq!(out, [3, 4, 8, 9, 13, 14, 72, 75, 82, 85]);
    }

    #[test]
    fn test_rotate_nv21_into_yv12() {
        // 2x2 NV21: Y = 1 2 / 3 4, V = 9, U = 7
        let src = [1u8, 2, 3, 4, 9, 7];
        let d = Dimension::new(2, 2);
        let out = run(&src, d, Format::Nv21, d, Format::Yv12, |p, i, o| p.rotate(i, 90, o)).unwrap();
        // YV12: Y plane, V plane, U plane
        assert_eq!(out, [2, 4, 1, 3, 9, 7]);
    }

    #[test]
    fn test_flips_gray() {
        let src = [1u8, 2, 3, 4, 5, 6];
        let d = Dimension::new(3, 2);
        let h = run(&src, d, Format::Gray, d, Format::Gray, |p, i, o| p.flip_horizontally(i, o)).unwrap();
        assert_eq!(h, [3, 2, 1, 6, 5, 4]);
        let v = run(&src, d, Format::Gray, d, Format::Gray, |p, i, o| p.flip_vertically(i, o)).unwrap();
        assert_eq!(v, [4, 5, 6, 1, 2, 3]);
    }

    #[test]
    fn test_resize_nearest_gray() {
        let src = [1u8, 2, 3, 4];
        let out = run(&src, Dimension::new(2, 2), Format::Gray, Dimension::new(4, 2), Format::Gray, |p, i, o| {
            p.resize_nearest_neighbor(i, o)
        })
        .unwrap();
        assert_eq!(out, [1, 1, 2, 2, 3, 3, 4, 4]);
    }

    #[test]
    fn test_convert_yuv_to_gray_copies_luma() {
        let src = [10u8, 20, 30, 40, 128, 128];
        let d = Dimension::new(2, 2);
        let out = run(&src, d, Format::Nv12, d, Format::Gray, |p, i, o| p.convert(i, o)).unwrap();
        assert_eq!(out, [10, 20, 30, 40]);
    }

    #[test]
    fn test_convert_gray_to_yuv_unimplemented() {
        let src = [0u8; 4];
        let d = Dimension::new(2, 2);
        let err = run(&src, d, Format::Gray, d, Format::Nv21, |p, i, o| p.convert(i, o)).unwrap_err();
        assert!(err.is_unimplemented());
    }

    #[test]
    fn test_convert_rgb_to_nv12_gray_patch() {
        let src = [100u8; 12];
        let d = Dimension::new(2, 2);
        let out = run(&src, d, Format::Rgb, d, Format::Nv12, |p, i, o| p.convert(i, o)).unwrap();
        let y = crate::convert::rgb_to_y(100, 100, 100);
        assert_eq!(out, [y, y, y, y, 128, 128]);
    }

    #[test]
    fn test_invalid_request_leaves_output_untouched() {
        let src = [0u8; 6];
        let input = create_from_raw_buffer(&src, Dimension::new(3, 2), Format::Gray, Orientation::TopLeft).unwrap();
        let mut out = [7u8; 6];
        let mut output =
            create_from_raw_buffer_mut(&mut out, Dimension::new(3, 2), Format::Gray, Orientation::TopLeft).unwrap();
        let err = SoftwareProcessor::new().rotate(&input, 90, &mut output).unwrap_err();
        assert!(err.is_invalid_argument());
        drop(output);
        assert_eq!(out, [7; 6]);
    }

    #[test]
    fn test_convert_requires_distinct_formats() {
        let src = [0u8; 4];
        let d = Dimension::new(2, 2);
        assert!(run(&src, d, Format::Gray, d, Format::Gray, |p, i, o| p.convert(i, o)).is_err());
    }
}
