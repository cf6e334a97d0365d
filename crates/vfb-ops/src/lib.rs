//! # vfb-ops
//!
//! Frame buffer transforms and preprocessing for image model inputs.
//!
//! This crate turns camera frames (packed RGB/RGBA/GRAY or NV12/NV21/YV12/YV21)
//! into the upright, resized, converted buffers models consume, and maps
//! model results back onto the frame.
//!
//! # Modules
//!
//! - [`orient`] - EXIF orientation math for frames, boxes and points
//! - [`validate`] - Precondition checks run before any write
//! - [`samples`] - Strided views and the crop/resize/rotate/flip kernels
//! - [`convert`] - Colorspace conversion
//! - [`engine`] - The [`FrameProcessor`] trait and engine selection
//! - [`utils`] - [`FrameBufferUtils`]: orientation, operation chains, preprocessing
//! - [`tensor`] - Input tensor preparation
//! - [`remap`] - Detection and segmentation result remapping
//!
//! # Example
//!
//! ```rust
//! use vfb_core::{create_from_raw_buffer, create_from_raw_buffer_mut, BoundingBox, Dimension, Format, Orientation};
//! use vfb_ops::{FrameBufferUtils, ProcessEngine};
//!
//! let pixels = vec![0u8; 8 * 8 * 4];
//! let frame = create_from_raw_buffer(&pixels, Dimension::new(8, 8), Format::Rgba, Orientation::TopLeft)?;
//!
//! let mut out = vec![0u8; 4 * 4 * 3];
//! let mut output = create_from_raw_buffer_mut(&mut out, Dimension::new(4, 4), Format::Rgb, Orientation::TopLeft)?;
//!
//! let utils = FrameBufferUtils::new(ProcessEngine::Software)?;
//! utils.preprocess(&frame, Some(&BoundingBox::new(2, 2, 4, 4)), &mut output)?;
//! # Ok::<(), vfb_ops::OpsError>(())
//! ```
//!
//! # Feature Flags
//!
//! - `parallel` (default) - Process rows on the rayon thread pool

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
mod planes;
pub mod convert;
pub mod engine;
pub mod operation;
pub mod orient;
pub mod remap;
pub mod samples;
pub mod software;
pub mod tensor;
pub mod utils;
pub mod validate;

pub use engine::{create_processor, FrameProcessor, ProcessEngine};
pub use error::{OpsError, OpsResult};
pub use operation::{FrameBufferOperation, FrameMetadata};
pub use orient::{
    get_orient_params, orient_and_denormalize_bounding_box, orient_bounding_box, orient_coordinates,
    require_dimension_swap, FlipAxis, OrientParams, Rotation,
};
pub use software::SoftwareProcessor;
pub use tensor::{ImageTensorSpecs, InputTensor, NormalizationOptions, TensorType};
pub use utils::FrameBufferUtils;
