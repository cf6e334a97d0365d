//! Precondition checks run before any transform writes output memory.
//!
//! Each `validate_*` function inspects metadata only. A transform calls
//! the matching check first, so a failing request leaves the output buffer
//! untouched.

use vfb_core::{Dimension, Format, FrameBuffer, FrameBufferMut};

use crate::{OpsError, OpsResult};

/// Returns `true` if a transform may read `input` and write `output`
/// without a colorspace conversion.
///
/// Identical formats qualify, as do RGBA into RGB (alpha dropped), RGB into
/// RGBA (opaque alpha) and any pair of YUV formats (chroma copied component
/// by component).
pub fn formats_compatible(input: Format, output: Format) -> bool {
    input == output
        || matches!((input, output), (Format::Rgba, Format::Rgb) | (Format::Rgb, Format::Rgba))
        || (input.is_yuv() && output.is_yuv())
}

/// Checks that a buffer has at least one plane and no zero stride.
pub fn validate_buffer_plane_metadata(buffer: &FrameBuffer<'_>) -> OpsResult<()> {
    if buffer.plane_count() < 1 {
        return Err(OpsError::invalid("there must be at least 1 plane"));
    }
    for plane in buffer.planes() {
        if plane.stride().has_zero() {
            return Err(OpsError::invalid("invalid stride information"));
        }
    }
    Ok(())
}

/// Checks that a format is known and accepts `plane_count` planes.
pub fn validate_buffer_format(format: Format, plane_count: usize) -> OpsResult<()> {
    match format {
        Format::Unknown => Err(OpsError::Unsupported("UNKNOWN format".into())),
        f if !f.accepts_plane_count(plane_count) => Err(OpsError::invalid(format!(
            "{f} buffer cannot have {plane_count} plane(s)"
        ))),
        _ => Ok(()),
    }
}

/// Checks both buffers of a transform.
pub fn validate_buffer_formats(input: &FrameBuffer<'_>, output: &FrameBufferMut<'_>) -> OpsResult<()> {
    validate_buffer_plane_metadata(input)?;
    validate_buffer_format(input.format(), input.plane_count())?;
    validate_buffer_format(output.format(), output.plane_count())?;
    check_not_empty(input.dimension())?;
    check_not_empty(output.dimension())
}

fn check_not_empty(dimension: Dimension) -> OpsResult<()> {
    if dimension.is_empty() {
        return Err(OpsError::invalid(format!(
            "frame dimension {}x{} must not be empty",
            dimension.width, dimension.height
        )));
    }
    Ok(())
}

fn check_compatible(input: Format, output: Format) -> OpsResult<()> {
    if !formats_compatible(input, output) {
        return Err(OpsError::invalid(format!(
            "input format {input} is not compatible with output format {output}"
        )));
    }
    Ok(())
}

/// Checks a resize request.
pub fn validate_resize_buffer_inputs(input: &FrameBuffer<'_>, output: &FrameBufferMut<'_>) -> OpsResult<()> {
    validate_buffer_formats(input, output)?;
    check_compatible(input.format(), output.format())
}

/// Checks a counter-clockwise rotation by `angle_deg`.
///
/// The angle must be 0, 90, 180 or 270; the output must be the input
/// dimension, swapped for 90 and 270.
pub fn validate_rotate_buffer_inputs(
    input: &FrameBuffer<'_>,
    output: &FrameBufferMut<'_>,
    angle_deg: u32,
) -> OpsResult<()> {
    validate_buffer_formats(input, output)?;
    check_compatible(input.format(), output.format())?;
    if angle_deg >= 360 || angle_deg % 90 != 0 {
        return Err(OpsError::invalid(format!(
            "rotation angle must be a multiple of 90 in [0, 360), got {angle_deg}"
        )));
    }
    let expected = if angle_deg % 180 == 90 {
        input.dimension().swapped()
    } else {
        input.dimension()
    };
    if output.dimension() != expected {
        return Err(OpsError::invalid(format!(
            "output dimension {}x{} does not match rotated input {}x{}",
            output.dimension().width,
            output.dimension().height,
            expected.width,
            expected.height
        )));
    }
    Ok(())
}

/// Checks a crop of the inclusive corners `(x0, y0)`-`(x1, y1)`.
///
/// When the output dimension differs from the crop dimension the crop is
/// resized to fit, so only the corners are constrained here.
pub fn validate_crop_buffer_inputs(
    input: &FrameBuffer<'_>,
    output: &FrameBufferMut<'_>,
    x0: u32,
    y0: u32,
    x1: u32,
    y1: u32,
) -> OpsResult<()> {
    validate_buffer_formats(input, output)?;
    check_compatible(input.format(), output.format())?;
    let dim = input.dimension();
    if x1 >= dim.width || y1 >= dim.height || x1 < x0 || y1 < y0 {
        return Err(OpsError::invalid(format!(
            "invalid crop coordinates ({x0}, {y0})-({x1}, {y1}) for {}x{} frame",
            dim.width, dim.height
        )));
    }
    Ok(())
}

/// Checks a horizontal or vertical flip.
pub fn validate_flip_buffer_inputs(input: &FrameBuffer<'_>, output: &FrameBufferMut<'_>) -> OpsResult<()> {
    validate_buffer_formats(input, output)?;
    check_compatible(input.format(), output.format())?;
    if input.dimension() != output.dimension() {
        return Err(OpsError::invalid("input and output dimensions must match"));
    }
    Ok(())
}

/// Checks a colorspace conversion between two distinct known formats.
pub fn validate_convert_formats(from: Format, to: Format) -> OpsResult<()> {
    if from == to {
        return Err(OpsError::invalid(format!(
            "formats must be different, both are {from}"
        )));
    }
    if from == Format::Unknown || to == Format::Unknown {
        return Err(OpsError::Unsupported(format!("conversion {from} -> {to}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vfb_core::{create_from_raw_buffer, create_from_raw_buffer_mut, Orientation};

    fn check<F>(in_dim: Dimension, in_fmt: Format, out_dim: Dimension, out_fmt: Format, f: F) -> OpsResult<()>
    where
        F: FnOnce(&FrameBuffer<'_>, &FrameBufferMut<'_>) -> OpsResult<()>,
    {
        let src = vec![0u8; 256];
        let mut dst = vec![0u8; 256];
        let input = create_from_raw_buffer(&src, in_dim, in_fmt, Orientation::TopLeft).unwrap();
        let output = create_from_raw_buffer_mut(&mut dst, out_dim, out_fmt, Orientation::TopLeft).unwrap();
        f(&input, &output)
    }

    #[test]
    fn test_compatibility() {
        assert!(formats_compatible(Format::Rgb, Format::Rgb));
        assert!(formats_compatible(Format::Rgba, Format::Rgb));
        assert!(formats_compatible(Format::Rgb, Format::Rgba));
        assert!(!formats_compatible(Format::Gray, Format::Rgba));
        assert!(formats_compatible(Format::Nv12, Format::Yv12));
        assert!(!formats_compatible(Format::Gray, Format::Nv21));
    }

    #[test]
    fn test_rotate_dimensions() {
        let d = Dimension::new(4, 2);
        assert!(check(d, Format::Rgb, d.swapped(), Format::Rgb, |i, o| validate_rotate_buffer_inputs(i, o, 90)).is_ok());
        assert!(check(d, Format::Rgb, d, Format::Rgb, |i, o| validate_rotate_buffer_inputs(i, o, 90)).is_err());
        assert!(check(d, Format::Rgb, d, Format::Rgb, |i, o| validate_rotate_buffer_inputs(i, o, 180)).is_ok());
        assert!(check(d, Format::Rgb, d, Format::Rgb, |i, o| validate_rotate_buffer_inputs(i, o, 45)).is_err());
        assert!(check(d, Format::Rgb, d, Format::Rgb, |i, o| validate_rotate_buffer_inputs(i, o, 360)).is_err());
    }

    #[test]
    fn test_crop_bounds() {
        let d = Dimension::new(4, 2);
        let out = Dimension::new(2, 2);
        assert!(check(d, Format::Gray, out, Format::Gray, |i, o| validate_crop_buffer_inputs(i, o, 1, 0, 2, 1)).is_ok());
        assert!(check(d, Format::Gray, out, Format::Gray, |i, o| validate_crop_buffer_inputs(i, o, 1, 0, 4, 1)).is_err());
        assert!(check(d, Format::Gray, out, Format::Gray, |i, o| validate_crop_buffer_inputs(i, o, 2, 0, 1, 1)).is_err());
        assert!(check(d, Format::Gray, out, Format::Rgb, |i, o| validate_crop_buffer_inputs(i, o, 0, 0, 1, 1)).is_err());
    }

    #[test]
    fn test_flip_requires_equal_dimensions() {
        let d = Dimension::new(4, 2);
        assert!(check(d, Format::Nv21, d, Format::Nv12, validate_flip_buffer_inputs).is_ok());
        assert!(check(d, Format::Nv21, d.swapped(), Format::Nv21, validate_flip_buffer_inputs).is_err());
    }

    #[test]
    fn test_convert_formats() {
        assert!(validate_convert_formats(Format::Rgb, Format::Rgb).is_err());
        assert!(validate_convert_formats(Format::Rgb, Format::Unknown).is_err());
        assert!(validate_convert_formats(Format::Nv12, Format::Rgb).is_ok());
    }

    #[test]
    fn test_buffer_format() {
        assert!(validate_buffer_format(Format::Rgb, 1).is_ok());
        assert!(validate_buffer_format(Format::Rgb, 3).is_err());
        assert!(validate_buffer_format(Format::Yv12, 3).is_ok());
        assert!(validate_buffer_format(Format::Unknown, 1).is_err());
    }
}
