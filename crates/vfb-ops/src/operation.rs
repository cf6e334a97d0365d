//! Operations chained by [`FrameBufferUtils::execute`](crate::FrameBufferUtils::execute).

use vfb_core::{BoundingBox, Dimension, Format, FrameBuffer, FrameBufferMut, Orientation};

use crate::orient::oriented_dimension;

/// Dimension, orientation and format of a frame, without its pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameMetadata {
    /// Frame size
    pub dimension: Dimension,
    /// Frame orientation
    pub orientation: Orientation,
    /// Pixel format
    pub format: Format,
}

impl FrameMetadata {
    /// Metadata of a read-only frame.
    pub fn of(buffer: &FrameBuffer<'_>) -> Self {
        Self {
            dimension: buffer.dimension(),
            orientation: buffer.orientation(),
            format: buffer.format(),
        }
    }

    /// Metadata of a writable frame.
    pub fn of_mut(buffer: &FrameBufferMut<'_>) -> Self {
        Self {
            dimension: buffer.dimension(),
            orientation: buffer.orientation(),
            format: buffer.format(),
        }
    }
}

/// One step of a processing chain.
///
/// The coordinate system has its origin at the top-left corner with values
/// growing right and down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameBufferOperation {
    /// Crops `crop`, then resizes it to `resize`. A crop without resize has
    /// `resize == crop.dimension()`.
    CropResize {
        /// Region of the input to keep
        crop: BoundingBox,
        /// Size of the result
        resize: Dimension,
    },
    /// Converts to another pixel format.
    Convert {
        /// Target format
        to: Format,
    },
    /// Rotates and flips to another orientation.
    Orient {
        /// Target orientation
        to: Orientation,
    },
    /// Crops `crop` and resizes it preserving its aspect ratio to the largest
    /// size fitting `output`. The result is aligned to the top-left corner of
    /// the output; the remaining area is left untouched.
    UniformCropResize {
        /// Region of the input to keep
        crop: BoundingBox,
        /// Size of the output frame
        output: Dimension,
    },
}

impl FrameBufferOperation {
    /// Crop-resize of `crop` into `resize`.
    pub fn crop_resize(crop: BoundingBox, resize: Dimension) -> Self {
        Self::CropResize { crop, resize }
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CropResize { .. } => "crop_resize",
            Self::Convert { .. } => "convert",
            Self::Orient { .. } => "orient",
            Self::UniformCropResize { .. } => "uniform_crop_resize",
        }
    }

    /// Output dimension for an input of `input` metadata.
    pub fn output_dimension(&self, input: &FrameMetadata) -> Dimension {
        match *self {
            Self::CropResize { resize, .. } => resize,
            Self::UniformCropResize { output, .. } => output,
            Self::Orient { to } => oriented_dimension(input.dimension, input.orientation, to),
            Self::Convert { .. } => input.dimension,
        }
    }

    /// Output orientation for an input of `input` metadata.
    pub fn output_orientation(&self, input: &FrameMetadata) -> Orientation {
        match *self {
            Self::Orient { to } => to,
            _ => input.orientation,
        }
    }

    /// Output format for an input of `input` metadata.
    pub fn output_format(&self, input: &FrameMetadata) -> Format {
        match *self {
            Self::Convert { to } => to,
            _ => input.format,
        }
    }

    /// Complete output metadata for an input of `input` metadata.
    pub fn output_metadata(&self, input: &FrameMetadata) -> FrameMetadata {
        FrameMetadata {
            dimension: self.output_dimension(input),
            orientation: self.output_orientation(input),
            format: self.output_format(input),
        }
    }
}

/// Largest size with the aspect ratio of `crop` that fits in `output`.
///
/// Both sides are at least one pixel.
///
/// ```rust
/// use vfb_core::Dimension;
/// use vfb_ops::operation::uniform_fit;
///
/// assert_eq!(uniform_fit(Dimension::new(200, 100), Dimension::new(50, 50)), Dimension::new(50, 25));
/// ```
pub fn uniform_fit(crop: Dimension, output: Dimension) -> Dimension {
    let scale = (output.width as f64 / crop.width.max(1) as f64).min(output.height as f64 / crop.height.max(1) as f64);
    let fit = |side: u32, limit: u32| ((side as f64 * scale).round() as u32).clamp(1, limit.max(1));
    Dimension::new(fit(crop.width, output.width), fit(crop.height, output.height))
}
