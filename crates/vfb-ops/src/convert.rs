//! Colorspace conversion kernels.
//!
//! YUV is treated as BT.601 limited range (studio swing), the layout camera
//! stacks deliver NV21/YV12 in. GRAY is full-range luma.
//!
//! | From \ To | RGB/RGBA | GRAY | YUV |
//! |-----------|----------|------|-----|
//! | RGB/RGBA  | channel copy, alpha 255 | weighted luma | BT.601, 2x2 chroma average |
//! | GRAY      | replicate, alpha 255 | - | unimplemented |
//! | YUV       | BT.601 | copy Y | copy planes, U/V reordered |

use crate::planes::{Chroma, ChromaMut, FrameSamples, FrameSamplesMut};
use crate::samples::{copy_region, Samples, SamplesMut};
use crate::{OpsError, OpsResult};

#[inline]
fn clamp_u8(v: i32) -> u8 {
    v.clamp(0, 255) as u8
}

/// Full-range luma of an RGB triple.
///
/// ```rust
/// use vfb_ops::convert::rgb_to_gray;
///
/// assert_eq!(rgb_to_gray(255, 255, 255), 255);
/// assert_eq!(rgb_to_gray(0, 0, 0), 0);
/// ```
#[inline]
pub fn rgb_to_gray(r: u8, g: u8, b: u8) -> u8 {
    ((77 * r as u32 + 150 * g as u32 + 29 * b as u32 + 128) >> 8) as u8
}

/// BT.601 limited-range luma.
#[inline]
pub fn rgb_to_y(r: u8, g: u8, b: u8) -> u8 {
    let (r, g, b) = (r as i32, g as i32, b as i32);
    clamp_u8(((66 * r + 129 * g + 25 * b + 128) >> 8) + 16)
}

/// BT.601 limited-range blue-difference chroma.
#[inline]
pub fn rgb_to_u(r: u8, g: u8, b: u8) -> u8 {
    let (r, g, b) = (r as i32, g as i32, b as i32);
    clamp_u8(((-38 * r - 74 * g + 112 * b + 128) >> 8) + 128)
}

/// BT.601 limited-range red-difference chroma.
#[inline]
pub fn rgb_to_v(r: u8, g: u8, b: u8) -> u8 {
    let (r, g, b) = (r as i32, g as i32, b as i32);
    clamp_u8(((112 * r - 94 * g - 18 * b + 128) >> 8) + 128)
}

/// BT.601 limited-range YUV to RGB.
///
/// ```rust
/// use vfb_ops::convert::yuv_to_rgb;
///
/// assert_eq!(yuv_to_rgb(16, 128, 128), [0, 0, 0]);
/// assert_eq!(yuv_to_rgb(235, 128, 128), [255, 255, 255]);
/// ```
#[inline]
pub fn yuv_to_rgb(y: u8, u: u8, v: u8) -> [u8; 3] {
    let c = 298 * (y as i32 - 16);
    let d = u as i32 - 128;
    let e = v as i32 - 128;
    [
        clamp_u8((c + 409 * e + 128) >> 8),
        clamp_u8((c - 100 * d - 208 * e + 128) >> 8),
        clamp_u8((c + 516 * d + 128) >> 8),
    ]
}

/// Converts between resolved views. Formats and dimensions have been
/// validated by the caller.
pub(crate) fn convert_samples(input: &FrameSamples<'_>, output: &mut FrameSamplesMut<'_>) -> OpsResult<()> {
    match (input, output) {
        (FrameSamples::Packed(src), FrameSamplesMut::Packed(dst)) => packed_to_packed(src, dst),
        (FrameSamples::Yuv { y, u, v }, FrameSamplesMut::Packed(dst)) => {
            if dst.channels() == 1 {
                copy_region(y, 0, 0, dst)
            } else {
                yuv_to_packed(y, u, v, dst)
            }
        }
        (FrameSamples::Packed(src), FrameSamplesMut::Yuv { y, chroma }) => {
            if src.channels() < 3 {
                return Err(OpsError::Unimplemented(
                    "conversion from GRAY to YUV".into(),
                ));
            }
            packed_to_yuv(src, y, chroma)
        }
        (FrameSamples::Yuv { y, u, v }, FrameSamplesMut::Yuv { y: dy, chroma }) => {
            copy_region(y, 0, 0, dy)?;
            copy_region(u, 0, 0, &mut chroma.component(Chroma::U)?)?;
            copy_region(v, 0, 0, &mut chroma.component(Chroma::V)?)
        }
    }
}

fn packed_to_packed(src: &Samples<'_>, dst: &mut SamplesMut<'_>) -> OpsResult<()> {
    let (sc, dc, ps, w) = (src.channels(), dst.channels(), dst.pixel_stride(), dst.width());
    match (sc, dc) {
        (3 | 4, 3 | 4) => dst.for_each_row(|y, row| {
            for x in 0..w {
                let p = src.pixel(x, y);
                let out = &mut row[x * ps..x * ps + dc];
                out[..3].copy_from_slice(&p[..3]);
                if dc == 4 {
                    out[3] = if sc == 4 { p[3] } else { 255 };
                }
            }
        }),
        (3 | 4, 1) => dst.for_each_row(|y, row| {
            for x in 0..w {
                let p = src.pixel(x, y);
                row[x * ps] = rgb_to_gray(p[0], p[1], p[2]);
            }
        }),
        (1, 3 | 4) => dst.for_each_row(|y, row| {
            for x in 0..w {
                let g = src.get(x, y, 0);
                let out = &mut row[x * ps..x * ps + dc];
                out[..3].fill(g);
                if dc == 4 {
                    out[3] = 255;
                }
            }
        }),
        _ => {
            return Err(OpsError::Unsupported(format!(
                "packed conversion from {sc} to {dc} channels"
            )))
        }
    }
    Ok(())
}

fn yuv_to_packed(y: &Samples<'_>, u: &Samples<'_>, v: &Samples<'_>, dst: &mut SamplesMut<'_>) -> OpsResult<()> {
    let (dc, ps, w) = (dst.channels(), dst.pixel_stride(), dst.width());
    dst.for_each_row(|row_y, row| {
        let cy = row_y / 2;
        for x in 0..w {
            let rgb = yuv_to_rgb(y.get(x, row_y, 0), u.get(x / 2, cy, 0), v.get(x / 2, cy, 0));
            let out = &mut row[x * ps..x * ps + dc];
            out[..3].copy_from_slice(&rgb);
            if dc == 4 {
                out[3] = 255;
            }
        }
    });
    Ok(())
}

/// Rounded mean RGB of the up-to-2x2 block whose top-left is `(2cx, 2cy)`.
fn block_mean(src: &Samples<'_>, cx: usize, cy: usize) -> [u8; 3] {
    let x0 = 2 * cx;
    let y0 = 2 * cy;
    let x1 = (x0 + 1).min(src.width() - 1);
    let y1 = (y0 + 1).min(src.height() - 1);
    let mut sum = [0u32; 3];
    for (x, y) in [(x0, y0), (x1, y0), (x0, y1), (x1, y1)] {
        let p = src.pixel(x, y);
        for c in 0..3 {
            sum[c] += p[c] as u32;
        }
    }
    sum.map(|s| ((s + 2) / 4) as u8)
}

fn packed_to_yuv(src: &Samples<'_>, y: &mut SamplesMut<'_>, chroma: &mut ChromaMut<'_>) -> OpsResult<()> {
    let (ps, w) = (y.pixel_stride(), y.width());
    y.for_each_row(|row_y, row| {
        for x in 0..w {
            let p = src.pixel(x, row_y);
            row[x * ps] = rgb_to_y(p[0], p[1], p[2]);
        }
    });
    for (component, f) in [
        (Chroma::U, rgb_to_u as fn(u8, u8, u8) -> u8),
        (Chroma::V, rgb_to_v as fn(u8, u8, u8) -> u8),
    ] {
        let mut plane = chroma.component(component)?;
        let (ps, cw) = (plane.pixel_stride(), plane.width());
        plane.for_each_row(|cy, row| {
            for cx in 0..cw {
                let [r, g, b] = block_mean(src, cx, cy);
                row[cx * ps] = f(r, g, b);
            }
        });
    }
    Ok(())
}
