//! Strided sample views and the geometric kernels that run on them.
//!
//! A [`Samples`] view addresses `channels` interleaved bytes per pixel in a
//! plane with arbitrary row and pixel strides. The same kernels therefore
//! serve packed RGB/RGBA/GRAY planes, luma planes, planar chroma and each
//! component of interleaved chroma (pixel stride 2, offset 0 or 1).
//!
//! Kernels write `dst.channels()` channels per pixel. A 4-channel source can
//! feed a 3-channel destination (alpha dropped) and a 3-channel source a
//! 4-channel one (opaque alpha added) without a bridge.
//!
//! With the `parallel` feature, destination rows are processed on the
//! rayon pool. Each call still returns only when every row is written.

use vfb_core::Error;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::{OpsError, OpsResult};

/// Sub-rectangle of a view, in samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// Left column
    pub x: usize,
    /// Top row
    pub y: usize,
    /// Width in samples
    pub width: usize,
    /// Height in samples
    pub height: usize,
}

impl Region {
    /// Creates a region.
    #[inline]
    pub const fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Checks that a strided view of the given shape fits in `len` bytes.
pub(crate) fn check_view(
    len: usize,
    width: usize,
    height: usize,
    row_stride: usize,
    pixel_stride: usize,
    channels: usize,
) -> OpsResult<()> {
    if width == 0 || height == 0 || channels == 0 {
        return Err(OpsError::invalid(format!(
            "empty sample view {width}x{height}x{channels}"
        )));
    }
    if pixel_stride < channels {
        return Err(Error::invalid_stride(pixel_stride, channels, width as u32).into());
    }
    let row_span = (width - 1) * pixel_stride + channels;
    if row_stride < row_span && height > 1 {
        return Err(Error::invalid_stride(row_stride, row_span, width as u32).into());
    }
    let required = (height - 1) * row_stride + row_span;
    if len < required {
        return Err(Error::buffer_too_small(required, len).into());
    }
    Ok(())
}

/// Read-only strided view.
#[derive(Debug, Clone, Copy)]
pub struct Samples<'a> {
    data: &'a [u8],
    width: usize,
    height: usize,
    row_stride: usize,
    pixel_stride: usize,
    channels: usize,
}

impl<'a> Samples<'a> {
    /// Creates a view, checking that every addressed byte is inside `data`.
    pub fn new(
        data: &'a [u8],
        width: usize,
        height: usize,
        row_stride: usize,
        pixel_stride: usize,
        channels: usize,
    ) -> OpsResult<Self> {
        check_view(data.len(), width, height, row_stride, pixel_stride, channels)?;
        Ok(Self {
            data,
            width,
            height,
            row_stride,
            pixel_stride,
            channels,
        })
    }

    /// Same view restricted to the first `channels` channels.
    pub fn with_channels(mut self, channels: usize) -> OpsResult<Self> {
        if channels == 0 || channels > self.channels {
            return Err(OpsError::invalid(format!(
                "cannot view {channels} of {} channels",
                self.channels
            )));
        }
        self.channels = channels;
        Ok(self)
    }

    /// Width in samples.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in rows.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Channels per sample.
    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Channel `c` of the sample at `(x, y)`.
    #[inline]
    pub fn get(&self, x: usize, y: usize, c: usize) -> u8 {
        self.data[y * self.row_stride + x * self.pixel_stride + c]
    }

    /// All channels of the sample at `(x, y)`.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> &'a [u8] {
        let at = y * self.row_stride + x * self.pixel_stride;
        &self.data[at..at + self.channels]
    }
}

/// Writable strided view.
#[derive(Debug)]
pub struct SamplesMut<'a> {
    data: &'a mut [u8],
    width: usize,
    height: usize,
    row_stride: usize,
    pixel_stride: usize,
    channels: usize,
}

impl<'a> SamplesMut<'a> {
    /// Creates a view, checking that every addressed byte is inside `data`.
    pub fn new(
        data: &'a mut [u8],
        width: usize,
        height: usize,
        row_stride: usize,
        pixel_stride: usize,
        channels: usize,
    ) -> OpsResult<Self> {
        check_view(data.len(), width, height, row_stride, pixel_stride, channels)?;
        Ok(Self {
            data,
            width,
            height,
            row_stride,
            pixel_stride,
            channels,
        })
    }

    /// Width in samples.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in rows.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Channels per sample.
    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Byte distance between horizontally adjacent samples.
    #[inline]
    pub fn pixel_stride(&self) -> usize {
        self.pixel_stride
    }

    /// Reborrows as a shorter-lived writable view.
    pub fn reborrow(&mut self) -> SamplesMut<'_> {
        SamplesMut {
            data: &mut *self.data,
            width: self.width,
            height: self.height,
            row_stride: self.row_stride,
            pixel_stride: self.pixel_stride,
            channels: self.channels,
        }
    }

    /// Reborrows as a read-only view.
    pub fn as_samples(&self) -> Samples<'_> {
        Samples {
            data: &*self.data,
            width: self.width,
            height: self.height,
            row_stride: self.row_stride,
            pixel_stride: self.pixel_stride,
            channels: self.channels,
        }
    }

    /// Runs `f(y, row)` for every row, where `row` starts at the first
    /// sample of row `y`. Sample `x` of the row begins at
    /// `x * pixel_stride()`.
    pub fn for_each_row<F>(&mut self, f: F)
    where
        F: Fn(usize, &mut [u8]) + Send + Sync,
    {
        let height = self.height;
        // A single row may be described with a stride shorter than its span.
        let chunk = self
            .row_stride
            .max((self.width - 1) * self.pixel_stride + self.channels);
        #[cfg(feature = "parallel")]
        self.data
            .par_chunks_mut(chunk)
            .take(height)
            .enumerate()
            .for_each(|(y, row)| f(y, row));
        #[cfg(not(feature = "parallel"))]
        self.data
            .chunks_mut(chunk)
            .take(height)
            .enumerate()
            .for_each(|(y, row)| f(y, row));
    }
}

fn check_channels(primitive: &'static str, src: &Samples<'_>, dst: &SamplesMut<'_>) -> OpsResult<()> {
    let adds_alpha = src.channels == 3 && dst.channels == 4;
    if dst.channels > src.channels && !adds_alpha {
        return Err(OpsError::backend(
            primitive,
            format!("{} destination channels from {} source channels", dst.channels, src.channels),
        ));
    }
    Ok(())
}

/// Writes one source sample into `out`, filling channels it lacks with
/// opaque alpha.
#[inline]
fn put_pixel(out: &mut [u8], sample: &[u8]) {
    let n = sample.len().min(out.len());
    out[..n].copy_from_slice(&sample[..n]);
    out[n..].fill(u8::MAX);
}

/// Copies the `dst`-sized block of `src` starting at `(x0, y0)`.
pub fn copy_region(src: &Samples<'_>, x0: usize, y0: usize, dst: &mut SamplesMut<'_>) -> OpsResult<()> {
    check_channels("copy", src, dst)?;
    if x0 + dst.width > src.width || y0 + dst.height > src.height {
        return Err(OpsError::backend(
            "copy",
            format!(
                "{}x{} at ({x0}, {y0}) exceeds {}x{} source",
                dst.width, dst.height, src.width, src.height
            ),
        ));
    }
    let (ps, ch, w) = (dst.pixel_stride, dst.channels, dst.width);
    dst.for_each_row(|y, row| {
        for x in 0..w {
            let s = src.pixel(x0 + x, y0 + y);
            put_pixel(&mut row[x * ps..x * ps + ch], s);
        }
    });
    Ok(())
}

/// Mirrors left and right.
pub fn mirror_horizontal(src: &Samples<'_>, dst: &mut SamplesMut<'_>) -> OpsResult<()> {
    check_same_size("flip_horizontal", src, dst)?;
    let (ps, ch, w) = (dst.pixel_stride, dst.channels, dst.width);
    dst.for_each_row(|y, row| {
        for x in 0..w {
            let s = src.pixel(w - 1 - x, y);
            put_pixel(&mut row[x * ps..x * ps + ch], s);
        }
    });
    Ok(())
}

/// Mirrors top and bottom.
pub fn mirror_vertical(src: &Samples<'_>, dst: &mut SamplesMut<'_>) -> OpsResult<()> {
    check_same_size("flip_vertical", src, dst)?;
    let (ps, ch, w, h) = (dst.pixel_stride, dst.channels, dst.width, dst.height);
    dst.for_each_row(|y, row| {
        for x in 0..w {
            let s = src.pixel(x, h - 1 - y);
            put_pixel(&mut row[x * ps..x * ps + ch], s);
        }
    });
    Ok(())
}

fn check_same_size(primitive: &'static str, src: &Samples<'_>, dst: &SamplesMut<'_>) -> OpsResult<()> {
    check_channels(primitive, src, dst)?;
    if src.width != dst.width || src.height != dst.height {
        return Err(OpsError::backend(
            primitive,
            format!("{}x{} source vs {}x{} destination", src.width, src.height, dst.width, dst.height),
        ));
    }
    Ok(())
}

/// Rotates counter-clockwise by `quarter_turns` x 90 degrees.
///
/// ```rust
/// use vfb_ops::samples::{rotate_ccw, Samples, SamplesMut};
///
/// // 2x1 gray [a b] turns into the 1x2 column [b; a]
/// let src = [1u8, 2];
/// let mut out = [0u8; 2];
/// let s = Samples::new(&src, 2, 1, 2, 1, 1).unwrap();
/// let mut d = SamplesMut::new(&mut out, 1, 2, 1, 1, 1).unwrap();
/// rotate_ccw(&s, 1, &mut d).unwrap();
/// assert_eq!(out, [2, 1]);
/// ```
pub fn rotate_ccw(src: &Samples<'_>, quarter_turns: u32, dst: &mut SamplesMut<'_>) -> OpsResult<()> {
    check_channels("rotate", src, dst)?;
    let turns = quarter_turns % 4;
    let (sw, sh) = (src.width, src.height);
    let expected = if turns % 2 == 1 { (sh, sw) } else { (sw, sh) };
    if (dst.width, dst.height) != expected {
        return Err(OpsError::backend(
            "rotate",
            format!(
                "{}x{} destination for {}x{} source rotated {} degrees",
                dst.width,
                dst.height,
                sw,
                sh,
                turns * 90
            ),
        ));
    }
    let (ps, ch, w) = (dst.pixel_stride, dst.channels, dst.width);
    dst.for_each_row(|y, row| {
        for x in 0..w {
            let (sx, sy) = match turns {
                0 => (x, y),
                1 => (sw - 1 - y, x),
                2 => (sw - 1 - x, sh - 1 - y),
                _ => (y, sh - 1 - x),
            };
            let s = src.pixel(sx, sy);
            put_pixel(&mut row[x * ps..x * ps + ch], s);
        }
    });
    Ok(())
}

fn check_region(primitive: &'static str, src: &Samples<'_>, region: Region) -> OpsResult<()> {
    if region.width == 0
        || region.height == 0
        || region.x + region.width > src.width
        || region.y + region.height > src.height
    {
        return Err(OpsError::backend(
            primitive,
            format!(
                "region {}x{} at ({}, {}) outside {}x{} source",
                region.width, region.height, region.x, region.y, src.width, src.height
            ),
        ));
    }
    Ok(())
}

/// Bilinear tap: lower index, upper index, weight of the upper one in 1/256.
#[derive(Clone, Copy)]
struct Tap {
    lo: usize,
    hi: usize,
    frac: u32,
}

fn bilinear_taps(src_len: usize, dst_len: usize) -> Vec<Tap> {
    let scale = src_len as f32 / dst_len as f32;
    let max = (src_len - 1) as f32;
    (0..dst_len)
        .map(|i| {
            let s = ((i as f32 + 0.5) * scale - 0.5).clamp(0.0, max);
            let lo = s.floor() as usize;
            let hi = (lo + 1).min(src_len - 1);
            let frac = ((s - lo as f32) * 256.0).round() as u32;
            Tap { lo, hi, frac }
        })
        .collect()
}

/// Resizes `region` of `src` into the whole of `dst` with bilinear filtering.
///
/// Sampling is pixel-center aligned and never reads outside the region.
/// Equal sizes reduce to an exact copy.
pub fn resize_bilinear(src: &Samples<'_>, region: Region, dst: &mut SamplesMut<'_>) -> OpsResult<()> {
    check_channels("resize", src, dst)?;
    check_region("resize", src, region)?;
    if region.width == dst.width && region.height == dst.height {
        return copy_region(src, region.x, region.y, dst);
    }
    let xs = bilinear_taps(region.width, dst.width);
    let ys = bilinear_taps(region.height, dst.height);
    let (ps, ch) = (dst.pixel_stride, dst.channels);
    let sc = src.channels.min(ch);
    dst.for_each_row(|y, row| {
        let ty = ys[y];
        let (y0, y1) = (region.y + ty.lo, region.y + ty.hi);
        let (wy1, wy0) = (ty.frac, 256 - ty.frac);
        for (x, tx) in xs.iter().enumerate() {
            let (x0, x1) = (region.x + tx.lo, region.x + tx.hi);
            let (wx1, wx0) = (tx.frac, 256 - tx.frac);
            let (p00, p01) = (src.pixel(x0, y0), src.pixel(x1, y0));
            let (p10, p11) = (src.pixel(x0, y1), src.pixel(x1, y1));
            for c in 0..sc {
                let top = p00[c] as u32 * wx0 + p01[c] as u32 * wx1;
                let bottom = p10[c] as u32 * wx0 + p11[c] as u32 * wx1;
                row[x * ps + c] = ((top * wy0 + bottom * wy1 + 32768) >> 16) as u8;
            }
            row[x * ps + sc..x * ps + ch].fill(u8::MAX);
        }
    });
    Ok(())
}

/// Resizes `region` of `src` into the whole of `dst`, picking the nearest
/// source sample for each destination sample.
pub fn resize_nearest(src: &Samples<'_>, region: Region, dst: &mut SamplesMut<'_>) -> OpsResult<()> {
    check_channels("resize_nearest_neighbor", src, dst)?;
    check_region("resize_nearest_neighbor", src, region)?;
    let nearest = |i: usize, src_len: usize, dst_len: usize| ((2 * i + 1) * src_len / (2 * dst_len)).min(src_len - 1);
    let xs: Vec<usize> = (0..dst.width)
        .map(|x| region.x + nearest(x, region.width, dst.width))
        .collect();
    let (ps, ch, dh) = (dst.pixel_stride, dst.channels, dst.height);
    dst.for_each_row(|y, row| {
        let sy = region.y + nearest(y, region.height, dh);
        for (x, &sx) in xs.iter().enumerate() {
            let s = src.pixel(sx, sy);
            put_pixel(&mut row[x * ps..x * ps + ch], s);
        }
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray(data: &[u8], w: usize, h: usize) -> Samples<'_> {
        Samples::new(data, w, h, w, 1, 1).unwrap()
    }

    #[test]
    fn test_view_bounds() {
        let data = [0u8; 10];
        assert!(Samples::new(&data, 3, 3, 3, 1, 1).is_ok());
        assert!(Samples::new(&data, 4, 3, 4, 1, 1).is_err());
        assert!(Samples::new(&data, 3, 3, 4, 1, 1).is_err());
        // padded rows, last row unpadded
        assert!(Samples::new(&data, 2, 3, 4, 1, 1).is_ok());
        // interleaved chroma component at offset 1
        assert!(Samples::new(&data[1..], 2, 2, 4, 2, 1).is_ok());
        assert!(Samples::new(&data, 2, 1, 2, 1, 2).is_err());
    }

    #[test]
    fn test_copy_region() {
        let src: Vec<u8> = (0..12).collect();
        let s = gray(&src, 4, 3);
        let mut out = [0u8; 4];
        let mut d = SamplesMut::new(&mut out, 2, 2, 2, 1, 1).unwrap();
        copy_region(&s, 1, 1, &mut d).unwrap();
        assert_eq!(out, [5, 6, 9, 10]);
    }

    #[test]
    fn test_copy_region_out_of_bounds() {
        let src = [0u8; 4];
        let s = gray(&src, 2, 2);
        let mut out = [0u8; 4];
        let mut d = SamplesMut::new(&mut out, 2, 2, 2, 1, 1).unwrap();
        let err = copy_region(&s, 1, 0, &mut d).unwrap_err();
        assert!(err.is_backend_error());
    }

    #[test]
    fn test_mirrors() {
        let src = [1u8, 2, 3, 4, 5, 6];
        let s = gray(&src, 3, 2);
        let mut out = [0u8; 6];
        mirror_horizontal(&s, &mut SamplesMut::new(&mut out, 3, 2, 3, 1, 1).unwrap()).unwrap();
        assert_eq!(out, [3, 2, 1, 6, 5, 4]);
        mirror_vertical(&s, &mut SamplesMut::new(&mut out, 3, 2, 3, 1, 1).unwrap()).unwrap();
        assert_eq!(out, [4, 5, 6, 1, 2, 3]);
    }

    #[test]
    fn test_rotations() {
        // 1 2 3
        // 4 5 6
        let src = [1u8, 2, 3, 4, 5, 6];
        let s = gray(&src, 3, 2);
        let mut out = [0u8; 6];
        rotate_ccw(&s, 1, &mut SamplesMut::new(&mut out, 2, 3, 2, 1, 1).unwrap()).unwrap();
        assert_eq!(out, [3, 6, 2, 5, 1, 4]);
        rotate_ccw(&s, 2, &mut SamplesMut::new(&mut out, 3, 2, 3, 1, 1).unwrap()).unwrap();
        assert_eq!(out, [6, 5, 4, 3, 2, 1]);
        rotate_ccw(&s, 3, &mut SamplesMut::new(&mut out, 2, 3, 2, 1, 1).unwrap()).unwrap();
        assert_eq!(out, [4, 1, 5, 2, 6, 3]);
    }

    #[test]
    fn test_rotate_rejects_wrong_shape() {
        let src = [0u8; 6];
        let s = gray(&src, 3, 2);
        let mut out = [0u8; 6];
        let mut d = SamplesMut::new(&mut out, 3, 2, 3, 1, 1).unwrap();
        assert!(rotate_ccw(&s, 1, &mut d).is_err());
    }

    #[test]
    fn test_alpha_dropped() {
        let src = [1u8, 2, 3, 255, 4, 5, 6, 255];
        let s = Samples::new(&src, 2, 1, 8, 4, 4).unwrap();
        let mut out = [0u8; 6];
        let mut d = SamplesMut::new(&mut out, 2, 1, 6, 3, 3).unwrap();
        mirror_horizontal(&s, &mut d).unwrap();
        assert_eq!(out, [4, 5, 6, 1, 2, 3]);
    }

    #[test]
    fn test_alpha_added() {
        let src = [1u8, 2, 3, 4, 5, 6];
        let s = Samples::new(&src, 2, 1, 6, 3, 3).unwrap();
        let mut out = [0u8; 8];
        rotate_ccw(&s, 2, &mut SamplesMut::new(&mut out, 2, 1, 8, 4, 4).unwrap()).unwrap();
        assert_eq!(out, [4, 5, 6, 255, 1, 2, 3, 255]);

        let mut big = [0u8; 16];
        resize_bilinear(&s, Region::new(0, 0, 2, 1), &mut SamplesMut::new(&mut big, 4, 1, 16, 4, 4).unwrap()).unwrap();
        assert!(big.chunks(4).all(|p| p[3] == 255));
        assert_eq!(&big[..3], &[1, 2, 3]);
    }

    #[test]
    fn test_gray_cannot_widen() {
        let src = [1u8, 2];
        let s = gray(&src, 2, 1);
        let mut out = [0u8; 6];
        let err = mirror_horizontal(&s, &mut SamplesMut::new(&mut out, 2, 1, 6, 3, 3).unwrap()).unwrap_err();
        assert!(err.is_backend_error());
    }

    #[test]
    fn test_bilinear_identity_and_constant() {
        let src: Vec<u8> = (0..16).map(|v| v * 10).collect();
        let s = gray(&src, 4, 4);
        let mut out = [0u8; 16];
        resize_bilinear(&s, Region::new(0, 0, 4, 4), &mut SamplesMut::new(&mut out, 4, 4, 4, 1, 1).unwrap()).unwrap();
        assert_eq!(&out[..], &src[..]);

        let flat = [77u8; 9];
        let s = gray(&flat, 3, 3);
        let mut big = [0u8; 49];
        resize_bilinear(&s, Region::new(0, 0, 3, 3), &mut SamplesMut::new(&mut big, 7, 7, 7, 1, 1).unwrap()).unwrap();
        assert!(big.iter().all(|&v| v == 77));
    }

    #[test]
    fn test_bilinear_downscale_averages() {
        // 2x1 -> 1x1 samples halfway between the two pixels
        let src = [0u8, 200];
        let s = gray(&src, 2, 1);
        let mut out = [0u8; 1];
        resize_bilinear(&s, Region::new(0, 0, 2, 1), &mut SamplesMut::new(&mut out, 1, 1, 1, 1, 1).unwrap()).unwrap();
        assert_eq!(out[0], 100);
    }

    #[test]
    fn test_bilinear_stays_in_region() {
        // the 255 column must not bleed into a resize of the left region
        let src = [10u8, 10, 255, 10, 10, 255];
        let s = gray(&src, 3, 2);
        let mut out = [0u8; 16];
        resize_bilinear(&s, Region::new(0, 0, 2, 2), &mut SamplesMut::new(&mut out, 4, 4, 4, 1, 1).unwrap()).unwrap();
        assert!(out.iter().all(|&v| v == 10));
    }

    #[test]
    fn test_nearest() {
        let src = [1u8, 2, 3, 4];
        let s = gray(&src, 2, 2);
        let mut out = [0u8; 16];
        resize_nearest(&s, Region::new(0, 0, 2, 2), &mut SamplesMut::new(&mut out, 4, 4, 4, 1, 1).unwrap()).unwrap();
        assert_eq!(out, [1, 1, 2, 2, 1, 1, 2, 2, 3, 3, 4, 4, 3, 3, 4, 4]);

        let mut small = [0u8; 1];
        resize_nearest(&s, Region::new(0, 0, 2, 2), &mut SamplesMut::new(&mut small, 1, 1, 1, 1, 1).unwrap()).unwrap();
        assert_eq!(small[0], 4);
    }
}
