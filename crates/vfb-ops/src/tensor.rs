//! Input tensor preparation for image models.
//!
//! A model describes its image input with [`ImageTensorSpecs`]. Frames are
//! preprocessed into a top-left RGB buffer of the model size when needed,
//! then copied (`UInt8`) or normalized (`Float32`) into an [`InputTensor`].
//!
//! # Example
//!
//! ```rust
//! use vfb_core::{create_from_rgb_raw_buffer, Dimension, Orientation};
//! use vfb_ops::tensor::{ImageTensorSpecs, InputTensor, NormalizationOptions, TensorType};
//! use vfb_ops::{FrameBufferUtils, ProcessEngine};
//!
//! let pixels = vec![255u8; 4 * 4 * 3];
//! let frame = create_from_rgb_raw_buffer(&pixels, Dimension::new(4, 4), Orientation::TopLeft).unwrap();
//! let specs = ImageTensorSpecs::new(2, 2, TensorType::Float32)
//!     .with_normalization(NormalizationOptions::uniform(127.5, 127.5));
//!
//! let utils = FrameBufferUtils::new(ProcessEngine::Software).unwrap();
//! let tensor = utils.prepare_input_tensor(&frame, None, &specs).unwrap();
//! assert_eq!(tensor.len(), 2 * 2 * 3);
//! assert!(matches!(tensor, InputTensor::Float32(ref v) if v.iter().all(|&x| x == 1.0)));
//! ```

use std::borrow::Cow;

use tracing::debug;
use vfb_core::{
    create_from_raw_buffer_mut, frame_buffer_byte_size, BoundingBox, Dimension, Format, FrameBuffer, Orientation,
};

use crate::utils::FrameBufferUtils;
use crate::{OpsError, OpsResult};

/// Element type of the input tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TensorType {
    /// Raw 8-bit pixels
    UInt8,
    /// Normalized floats
    Float32,
    /// Quantized signed bytes
    Int8,
}

/// Per-channel normalization `(value - mean) / std`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizationOptions {
    /// Channel means
    pub mean_values: [f32; 3],
    /// Channel standard deviations
    pub std_values: [f32; 3],
    /// Number of meaningful entries, 1 (shared by all channels) or 3
    pub num_values: usize,
}

impl NormalizationOptions {
    /// One mean and std for every channel.
    pub fn uniform(mean: f32, std: f32) -> Self {
        Self {
            mean_values: [mean; 3],
            std_values: [std; 3],
            num_values: 1,
        }
    }

    /// Separate mean and std per RGB channel.
    pub fn per_channel(mean_values: [f32; 3], std_values: [f32; 3]) -> Self {
        Self {
            mean_values,
            std_values,
            num_values: 3,
        }
    }

    /// Rejects bad entry counts and non-positive or non-finite values.
    pub fn validate(&self) -> OpsResult<()> {
        if self.num_values != 1 && self.num_values != 3 {
            return Err(OpsError::invalid(format!(
                "normalization needs 1 or 3 values, got {}",
                self.num_values
            )));
        }
        let n = self.num_values;
        if self.mean_values[..n].iter().any(|m| !m.is_finite()) {
            return Err(OpsError::invalid("normalization mean values must be finite"));
        }
        if self.std_values[..n].iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(OpsError::invalid("normalization std values must be positive"));
        }
        Ok(())
    }

    #[inline]
    fn channel(&self, c: usize) -> (f32, f32) {
        let i = if self.num_values == 1 { 0 } else { c % 3 };
        (self.mean_values[i], self.std_values[i])
    }
}

/// Image input requirements of a model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageTensorSpecs {
    /// Input width
    pub width: u32,
    /// Input height
    pub height: u32,
    /// Expected color space, only RGB is supported
    pub color_space: Format,
    /// Tensor element type
    pub tensor_type: TensorType,
    /// Required for `Float32` tensors
    pub normalization: Option<NormalizationOptions>,
}

impl ImageTensorSpecs {
    /// RGB specs without normalization.
    pub fn new(width: u32, height: u32, tensor_type: TensorType) -> Self {
        Self {
            width,
            height,
            color_space: Format::Rgb,
            tensor_type,
            normalization: None,
        }
    }

    /// Sets normalization options.
    #[must_use]
    pub fn with_normalization(mut self, normalization: NormalizationOptions) -> Self {
        self.normalization = Some(normalization);
        self
    }

    /// Input size.
    pub fn dimension(&self) -> Dimension {
        Dimension::new(self.width, self.height)
    }

    /// Checks that a tensor can be built from these specs.
    pub fn validate(&self) -> OpsResult<()> {
        if self.color_space != Format::Rgb {
            return Err(OpsError::Unsupported(format!(
                "{} input tensors, only RGB is supported",
                self.color_space
            )));
        }
        if self.dimension().is_empty() {
            return Err(OpsError::invalid("tensor dimension must not be empty"));
        }
        match (self.tensor_type, &self.normalization) {
            (TensorType::Float32, None) => Err(OpsError::invalid("Float32 input tensors require normalization options")),
            (_, Some(n)) => n.validate(),
            _ => Ok(()),
        }
    }
}

/// Tensor data ready to be copied into the model input.
#[derive(Debug, Clone, PartialEq)]
pub enum InputTensor {
    /// Raw RGB bytes
    UInt8(Vec<u8>),
    /// Normalized RGB values
    Float32(Vec<f32>),
}

impl InputTensor {
    /// Element count.
    pub fn len(&self) -> usize {
        match self {
            Self::UInt8(v) => v.len(),
            Self::Float32(v) => v.len(),
        }
    }

    /// Returns `true` if the tensor holds no element.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Returns `true` unless `buffer` already is an upright RGB frame of the
/// model size and `roi` covers all of it.
pub fn is_preprocessing_needed(buffer: &FrameBuffer<'_>, roi: &BoundingBox, specs: &ImageTensorSpecs) -> bool {
    *roi != BoundingBox::from_dimension(buffer.dimension())
        || buffer.orientation() != Orientation::TopLeft
        || buffer.format() != Format::Rgb
        || buffer.dimension() != specs.dimension()
}

/// Tightly packed RGB bytes of an RGB frame, borrowed when rows carry no
/// padding.
fn rgb_bytes<'a>(buffer: &FrameBuffer<'a>) -> OpsResult<Cow<'a, [u8]>> {
    let plane = buffer
        .plane(0)
        .ok_or_else(|| OpsError::invalid("frame has no planes"))?;
    let dim = buffer.dimension();
    let row = dim.width as usize * 3;
    let stride = plane.stride();
    let data = plane.buffer();
    let needed = |rows: usize| (rows.saturating_sub(1)) * stride.row_stride_bytes + row;
    if data.len() < needed(dim.height as usize) || stride.pixel_stride_bytes != 3 {
        return Err(vfb_core::Error::buffer_too_small(needed(dim.height as usize), data.len()).into());
    }
    if stride.row_stride_bytes == row {
        return Ok(Cow::Borrowed(&data[..row * dim.height as usize]));
    }
    Ok(Cow::Owned(
        (0..dim.height as usize)
            .flat_map(|y| &data[y * stride.row_stride_bytes..y * stride.row_stride_bytes + row])
            .copied()
            .collect(),
    ))
}

impl FrameBufferUtils {
    /// Builds the input tensor for `specs` from `roi` of `buffer` (the whole
    /// frame when `None`).
    pub fn prepare_input_tensor(
        &self,
        buffer: &FrameBuffer<'_>,
        roi: Option<&BoundingBox>,
        specs: &ImageTensorSpecs,
    ) -> OpsResult<InputTensor> {
        specs.validate()?;
        if specs.tensor_type == TensorType::Int8 {
            return Err(OpsError::Unimplemented("Int8 input tensors".into()));
        }
        let roi = roi.copied().unwrap_or_else(|| BoundingBox::from_dimension(buffer.dimension()));
        let pixels: Cow<'_, [u8]> = if is_preprocessing_needed(buffer, &roi, specs) {
            let dimension = specs.dimension();
            debug!(width = dimension.width, height = dimension.height, "prepare_input_tensor: preprocessing");
            let mut data = vec![0u8; frame_buffer_byte_size(dimension, Format::Rgb)];
            let mut output = create_from_raw_buffer_mut(&mut data, dimension, Format::Rgb, Orientation::TopLeft)?;
            self.preprocess(buffer, Some(&roi), &mut output)?;
            Cow::Owned(data)
        } else {
            rgb_bytes(buffer)?
        };
        match (specs.tensor_type, specs.normalization) {
            (TensorType::Float32, Some(n)) => Ok(InputTensor::Float32(
                pixels
                    .iter()
                    .enumerate()
                    .map(|(i, &v)| {
                        let (mean, std) = n.channel(i);
                        (v as f32 - mean) / std
                    })
                    .collect(),
            )),
            (TensorType::Float32, None) => Err(OpsError::invalid("Float32 input tensors require normalization options")),
            _ => Ok(InputTensor::UInt8(pixels.into_owned())),
        }
    }
}
