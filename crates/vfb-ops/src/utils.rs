//! High level frame buffer processing.
//!
//! [`FrameBufferUtils`] wraps a [`FrameProcessor`] and adds orientation
//! handling, operation chains and the one-call [`preprocess`] used ahead of
//! model inference.
//!
//! # Example
//!
//! ```rust
//! use vfb_core::{create_from_raw_buffer, create_from_raw_buffer_mut, frame_buffer_byte_size};
//! use vfb_core::{Dimension, Format, Orientation};
//! use vfb_ops::{FrameBufferUtils, ProcessEngine};
//!
//! let pixels = vec![128u8; frame_buffer_byte_size(Dimension::new(8, 6), Format::Nv21)];
//! let input = create_from_raw_buffer(&pixels, Dimension::new(8, 6), Format::Nv21, Orientation::RightTop).unwrap();
//!
//! let out_dim = Dimension::new(4, 4);
//! let mut out = vec![0u8; frame_buffer_byte_size(out_dim, Format::Rgb)];
//! let mut output = create_from_raw_buffer_mut(&mut out, out_dim, Format::Rgb, Orientation::TopLeft).unwrap();
//!
//! let utils = FrameBufferUtils::new(ProcessEngine::Software).unwrap();
//! utils.preprocess(&input, None, &mut output).unwrap();
//! ```
//!
//! [`preprocess`]: FrameBufferUtils::preprocess

use tracing::{debug, trace};
use vfb_core::{
    create_from_raw_buffer, create_from_raw_buffer_mut, frame_buffer_byte_size, BoundingBox, FrameBuffer,
    FrameBufferMut,
};

use crate::engine::{create_processor, FrameProcessor, ProcessEngine};
use crate::operation::{uniform_fit, FrameBufferOperation, FrameMetadata};
use crate::orient::{get_orient_params, oriented_dimension, FlipAxis, Rotation};
use crate::{OpsError, OpsResult};

/// Frame buffer transforms, chains and preprocessing on top of an engine.
pub struct FrameBufferUtils {
    processor: Box<dyn FrameProcessor>,
}

impl std::fmt::Debug for FrameBufferUtils {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameBufferUtils")
            .field("processor", &self.processor.name())
            .finish()
    }
}

impl FrameBufferUtils {
    /// Creates utils backed by `engine`.
    pub fn new(engine: ProcessEngine) -> OpsResult<Self> {
        Ok(Self::with_processor(create_processor(engine)?))
    }

    /// Creates utils backed by a custom processor.
    pub fn with_processor(processor: Box<dyn FrameProcessor>) -> Self {
        Self { processor }
    }

    /// Name of the underlying engine.
    pub fn engine_name(&self) -> &'static str {
        self.processor.name()
    }

    /// Crops the inclusive corners `(x0, y0)`-`(x1, y1)`, resizing to the
    /// output dimension when needed.
    pub fn crop(
        &self,
        buffer: &FrameBuffer<'_>,
        x0: u32,
        y0: u32,
        x1: u32,
        y1: u32,
        output: &mut FrameBufferMut<'_>,
    ) -> OpsResult<()> {
        self.processor.crop(buffer, x0, y0, x1, y1, output)
    }

    /// Bilinear resize into the output dimension.
    pub fn resize(&self, buffer: &FrameBuffer<'_>, output: &mut FrameBufferMut<'_>) -> OpsResult<()> {
        self.processor.resize(buffer, output)
    }

    /// Nearest-neighbor resize into the output dimension.
    pub fn resize_nearest_neighbor(&self, buffer: &FrameBuffer<'_>, output: &mut FrameBufferMut<'_>) -> OpsResult<()> {
        self.processor.resize_nearest_neighbor(buffer, output)
    }

    /// Counter-clockwise rotation.
    pub fn rotate(&self, buffer: &FrameBuffer<'_>, rotation: Rotation, output: &mut FrameBufferMut<'_>) -> OpsResult<()> {
        self.processor.rotate(buffer, rotation.degrees(), output)
    }

    /// Mirrors left and right.
    pub fn flip_horizontally(&self, buffer: &FrameBuffer<'_>, output: &mut FrameBufferMut<'_>) -> OpsResult<()> {
        self.processor.flip_horizontally(buffer, output)
    }

    /// Mirrors top and bottom.
    pub fn flip_vertically(&self, buffer: &FrameBuffer<'_>, output: &mut FrameBufferMut<'_>) -> OpsResult<()> {
        self.processor.flip_vertically(buffer, output)
    }

    /// Converts into the output format.
    pub fn convert(&self, buffer: &FrameBuffer<'_>, output: &mut FrameBufferMut<'_>) -> OpsResult<()> {
        self.processor.convert(buffer, output)
    }

    /// Rotates and flips `buffer` from its orientation into the output's.
    ///
    /// Equal orientations produce a copy. A rotation combined with a flip
    /// goes through one temporary buffer holding the rotated frame.
    pub fn orient(&self, buffer: &FrameBuffer<'_>, output: &mut FrameBufferMut<'_>) -> OpsResult<()> {
        let (from, to) = (buffer.orientation(), output.orientation());
        let params = get_orient_params(from, to);
        debug!(from = from.exif(), to = to.exif(), angle = params.rotation_angle_deg(), flip = ?params.flip, "orient");
        match (params.rotation, params.flip) {
            (Rotation::Deg0, None) => self.processor.resize(buffer, output),
            (Rotation::Deg0, Some(FlipAxis::Horizontal)) => self.processor.flip_horizontally(buffer, output),
            (Rotation::Deg0, Some(FlipAxis::Vertical)) => self.processor.flip_vertically(buffer, output),
            (rotation, None) => self.processor.rotate(buffer, rotation.degrees(), output),
            (rotation, Some(axis)) => {
                let dimension = oriented_dimension(buffer.dimension(), from, to);
                let mut scratch = vec![0u8; frame_buffer_byte_size(dimension, buffer.format())];
                let mut rotated = create_from_raw_buffer_mut(&mut scratch, dimension, buffer.format(), from)?
                    .with_timestamp(buffer.timestamp());
                self.processor.rotate(buffer, rotation.degrees(), &mut rotated)?;
                let rotated = rotated.as_view();
                match axis {
                    FlipAxis::Horizontal => self.processor.flip_horizontally(&rotated, output),
                    FlipAxis::Vertical => self.processor.flip_vertically(&rotated, output),
                }
            }
        }
    }

    /// Crops `crop` into the whole output.
    fn crop_box(&self, buffer: &FrameBuffer<'_>, crop: &BoundingBox, output: &mut FrameBufferMut<'_>) -> OpsResult<()> {
        if crop.is_empty() {
            return Err(OpsError::invalid("crop region must not be empty"));
        }
        let corner = |end: u64| u32::try_from(end - 1).map_err(|_| OpsError::invalid("crop region overflows"));
        let (x1, y1) = (corner(crop.right())?, corner(crop.bottom())?);
        self.processor.crop(buffer, crop.origin_x, crop.origin_y, x1, y1, output)
    }

    /// Runs a single operation.
    pub fn execute_operation(
        &self,
        buffer: &FrameBuffer<'_>,
        operation: &FrameBufferOperation,
        output: &mut FrameBufferMut<'_>,
    ) -> OpsResult<()> {
        match operation {
            FrameBufferOperation::CropResize { crop, .. } => self.crop_box(buffer, crop, output),
            FrameBufferOperation::UniformCropResize { crop, .. } => {
                let fit = uniform_fit(crop.dimension(), output.dimension());
                trace!(fit_w = fit.width, fit_h = fit.height, "uniform_crop_resize");
                let mut region = output.top_left_region_mut(fit)?;
                self.crop_box(buffer, crop, &mut region)
            }
            FrameBufferOperation::Convert { .. } => self.processor.convert(buffer, output),
            FrameBufferOperation::Orient { .. } => self.orient(buffer, output),
        }
    }

    /// Runs `operations` in order, feeding each result into the next one.
    ///
    /// The last operation writes into `output`, whose metadata must equal
    /// the metadata the chain produces; this is checked before anything
    /// runs. Intermediate results live in two scratch buffers used in turn.
    pub fn execute(
        &self,
        buffer: &FrameBuffer<'_>,
        operations: &[FrameBufferOperation],
        output: &mut FrameBufferMut<'_>,
    ) -> OpsResult<()> {
        let Some(last) = operations.len().checked_sub(1) else {
            return Err(OpsError::invalid("operation list must not be empty"));
        };
        let mut plan = Vec::with_capacity(operations.len());
        let mut metadata = FrameMetadata::of(buffer);
        for operation in operations {
            metadata = operation.output_metadata(&metadata);
            plan.push(metadata);
        }
        let expected = FrameMetadata::of_mut(output);
        if plan[last] != expected {
            return Err(OpsError::MetadataMismatch(format!(
                "chain yields {:?}, output is {:?}",
                plan[last], expected
            )));
        }
        debug!(steps = operations.len(), "execute");

        let mut scratch: [Vec<u8>; 2] = Default::default();
        for (i, operation) in operations.iter().enumerate() {
            let (front, back) = scratch.split_at_mut(1);
            let (write, read) = if i % 2 == 0 {
                (&mut front[0], &back[0])
            } else {
                (&mut back[0], &front[0])
            };
            let intermediate;
            let source = if i == 0 {
                buffer
            } else {
                let m = plan[i - 1];
                intermediate = create_from_raw_buffer(read, m.dimension, m.format, m.orientation)?
                    .with_timestamp(buffer.timestamp());
                &intermediate
            };
            trace!(step = i, operation = operation.name(), "execute step");
            if i == last {
                self.execute_operation(source, operation, output)?;
            } else {
                let m = plan[i];
                let size = frame_buffer_byte_size(m.dimension, m.format);
                if write.len() < size {
                    debug!(step = i, size, "growing scratch buffer");
                    write.resize(size, 0);
                }
                let mut target = create_from_raw_buffer_mut(&mut write[..size], m.dimension, m.format, m.orientation)?
                    .with_timestamp(buffer.timestamp());
                self.execute_operation(source, operation, &mut target)?;
            }
        }
        Ok(())
    }

    /// Plans the chain turning an `input` frame into an `output` one.
    ///
    /// Crop and resize come first, at the pre-orientation size, then the
    /// format conversion, then the orientation change.
    pub fn preprocessing_operations(
        input: &FrameMetadata,
        roi: Option<&BoundingBox>,
        output: &FrameMetadata,
        uniform_resizing: bool,
    ) -> Vec<FrameBufferOperation> {
        let mut operations = Vec::new();
        let pre_orient = oriented_dimension(output.dimension, input.orientation, output.orientation);
        let crop = match roi {
            Some(roi) => Some(*roi),
            None if pre_orient != input.dimension => Some(BoundingBox::from_dimension(input.dimension)),
            None => None,
        };
        if let Some(crop) = crop {
            operations.push(if uniform_resizing {
                FrameBufferOperation::UniformCropResize {
                    crop,
                    output: pre_orient,
                }
            } else {
                FrameBufferOperation::CropResize {
                    crop,
                    resize: pre_orient,
                }
            });
        }
        if output.format != input.format {
            operations.push(FrameBufferOperation::Convert { to: output.format });
        }
        if output.orientation != input.orientation {
            operations.push(FrameBufferOperation::Orient {
                to: output.orientation,
            });
        }
        operations
    }

    /// Crops `roi` (or takes the whole frame), resizes, converts and orients
    /// `buffer` so it matches the metadata of `output`.
    ///
    /// `roi` is expressed in `buffer` coordinates. Matching metadata and no
    /// ROI result in a plain copy.
    pub fn preprocess(
        &self,
        buffer: &FrameBuffer<'_>,
        roi: Option<&BoundingBox>,
        output: &mut FrameBufferMut<'_>,
    ) -> OpsResult<()> {
        self.preprocess_with(buffer, roi, output, false)
    }

    /// [`preprocess`](Self::preprocess) with optional aspect-preserving
    /// resizing: the region is scaled to fit the output and aligned to its
    /// top-left corner, the rest of the output is left untouched.
    pub fn preprocess_with(
        &self,
        buffer: &FrameBuffer<'_>,
        roi: Option<&BoundingBox>,
        output: &mut FrameBufferMut<'_>,
        uniform_resizing: bool,
    ) -> OpsResult<()> {
        let operations = Self::preprocessing_operations(
            &FrameMetadata::of(buffer),
            roi,
            &FrameMetadata::of_mut(output),
            uniform_resizing,
        );
        debug!(
            steps = operations.len(),
            roi = roi.is_some(),
            uniform_resizing,
            "preprocess"
        );
        if operations.is_empty() {
            self.processor.resize(buffer, output)
        } else {
            self.execute(buffer, &operations, output)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vfb_core::{Dimension, Format, Orientation};

    fn utils() -> FrameBufferUtils {
        FrameBufferUtils::new(ProcessEngine::Software).unwrap()
    }

    fn gray<'a>(data: &'a [u8], w: u32, h: u32, orientation: Orientation) -> FrameBuffer<'a> {
        create_from_raw_buffer(data, Dimension::new(w, h), Format::Gray, orientation).unwrap()
    }

    #[test]
    fn test_orient_rotate_and_flip() {
        // TopLeft -> LeftTop is a transpose: 90 CCW then vertical flip
        let src = [1u8, 2, 3, 4, 5, 6];
        let input = gray(&src, 3, 2, Orientation::TopLeft);
        let mut out = [0u8; 6];
        let mut output =
            create_from_raw_buffer_mut(&mut out, Dimension::new(2, 3), Format::Gray, Orientation::LeftTop).unwrap();
        utils().orient(&input, &mut output).unwrap();
        drop(output);
        assert_eq!(out, [1, 4, 2, 5, 3, 6]);
    }

    #[test]
    fn test_orient_identity_copies() {
        let src = [1u8, 2, 3, 4];
        let input = gray(&src, 2, 2, Orientation::BottomLeft);
        let mut out = [0u8; 4];
        let mut output =
            create_from_raw_buffer_mut(&mut out, Dimension::new(2, 2), Format::Gray, Orientation::BottomLeft).unwrap();
        utils().orient(&input, &mut output).unwrap();
        drop(output);
        assert_eq!(out, src);
    }

    #[test]
    fn test_execute_empty_chain() {
        let src = [0u8; 4];
        let input = gray(&src, 2, 2, Orientation::TopLeft);
        let mut out = [0u8; 4];
        let mut output =
            create_from_raw_buffer_mut(&mut out, Dimension::new(2, 2), Format::Gray, Orientation::TopLeft).unwrap();
        assert!(utils().execute(&input, &[], &mut output).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_execute_metadata_mismatch_before_any_write() {
        let src = [0u8; 4];
        let input = gray(&src, 2, 2, Orientation::TopLeft);
        let mut out = [5u8; 4];
        let mut output =
            create_from_raw_buffer_mut(&mut out, Dimension::new(2, 2), Format::Gray, Orientation::TopLeft).unwrap();
        let ops = [
            FrameBufferOperation::Orient {
                to: Orientation::BottomRight,
            },
            FrameBufferOperation::Convert { to: Format::Rgb },
        ];
        let err = utils().execute(&input, &ops, &mut output).unwrap_err();
        assert!(matches!(err, OpsError::MetadataMismatch(_)));
        drop(output);
        assert_eq!(out, [5; 4]);
    }

    #[test]
    fn test_execute_chain_uses_both_scratch_buffers() {
        let src: Vec<u8> = (1..=8).collect();
        let input = gray(&src, 4, 2, Orientation::TopLeft);
        let ops = [
            FrameBufferOperation::crop_resize(BoundingBox::new(0, 0, 4, 2), Dimension::new(4, 2)),
            FrameBufferOperation::Orient {
                to: Orientation::RightTop,
            },
            FrameBufferOperation::Orient {
                to: Orientation::BottomRight,
            },
        ];
        let mut chained = [0u8; 8];
        let mut output =
            create_from_raw_buffer_mut(&mut chained, Dimension::new(4, 2), Format::Gray, Orientation::BottomRight)
                .unwrap();
        utils().execute(&input, &ops, &mut output).unwrap();
        drop(output);
        assert_eq!(chained, [8, 7, 6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_preprocessing_plan() {
        let input = FrameMetadata {
            dimension: Dimension::new(640, 480),
            orientation: Orientation::RightTop,
            format: Format::Nv21,
        };
        let output = FrameMetadata {
            dimension: Dimension::new(224, 224),
            orientation: Orientation::TopLeft,
            format: Format::Rgb,
        };
        let ops = FrameBufferUtils::preprocessing_operations(&input, None, &output, false);
        assert_eq!(
            ops,
            vec![
                FrameBufferOperation::crop_resize(BoundingBox::new(0, 0, 640, 480), Dimension::new(224, 224)),
                FrameBufferOperation::Convert { to: Format::Rgb },
                FrameBufferOperation::Orient {
                    to: Orientation::TopLeft
                },
            ]
        );
        assert!(FrameBufferUtils::preprocessing_operations(&input, None, &input, false).is_empty());
    }

    #[test]
    fn test_preprocess_copy() {
        let src = [9u8, 8, 7, 6, 5, 4];
        let input = gray(&src, 3, 2, Orientation::TopLeft);
        let mut out = [0u8; 6];
        let mut output =
            create_from_raw_buffer_mut(&mut out, Dimension::new(3, 2), Format::Gray, Orientation::TopLeft).unwrap();
        utils().preprocess(&input, None, &mut output).unwrap();
        drop(output);
        assert_eq!(out, src);
    }

    #[test]
    fn test_uniform_preprocess_leaves_padding() {
        let src = [9u8; 8];
        let input = gray(&src, 4, 2, Orientation::TopLeft);
        let mut out = [0u8; 16];
        let mut output =
            create_from_raw_buffer_mut(&mut out, Dimension::new(4, 4), Format::Gray, Orientation::TopLeft).unwrap();
        utils().preprocess_with(&input, None, &mut output, true).unwrap();
        drop(output);
        assert!(out[..8].iter().all(|&v| v == 9));
        assert!(out[8..].iter().all(|&v| v == 0));
    }

    #[test]
    fn test_crop_region_must_not_be_empty() {
        let src = [0u8; 4];
        let input = gray(&src, 2, 2, Orientation::TopLeft);
        let mut out = [0u8; 4];
        let mut output =
            create_from_raw_buffer_mut(&mut out, Dimension::new(2, 2), Format::Gray, Orientation::TopLeft).unwrap();
        let op = FrameBufferOperation::crop_resize(BoundingBox::new(0, 0, 0, 2), Dimension::new(2, 2));
        assert!(utils().execute(&input, &[op], &mut output).is_err());
    }
}
