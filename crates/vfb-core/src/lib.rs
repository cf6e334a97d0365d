//! # vfb-core
//!
//! Core types for describing camera and image frame buffers.
//!
//! This crate provides the foundational types shared by the vfb crates:
//!
//! - [`Format`], [`Orientation`] - Pixel formats and EXIF orientations
//! - [`Dimension`], [`Stride`], [`BoundingBox`] - Frame geometry
//! - [`Plane`], [`FrameBuffer`], [`FrameBufferMut`] - Non-owning views over pixel memory
//! - [`frame_buffer_byte_size`], [`plane_layout`], [`get_planes`] - Contiguous buffer layout
//! - `create_from_*` factories and [`ImageData`] - Ways to wrap caller memory
//!
//! ## Design Philosophy
//!
//! A frame buffer never owns pixels. It borrows slices, so the borrow
//! checker enforces that the memory outlives every view of it, and that a
//! destination frame is written by one transform at a time:
//!
//! ```rust
//! use vfb_core::{create_from_raw_buffer, Dimension, Format, Orientation};
//!
//! let pixels = vec![128u8; 640 * 480 * 3];
//! let frame = create_from_raw_buffer(
//!     &pixels,
//!     Dimension::new(640, 480),
//!     Format::Rgb,
//!     Orientation::TopLeft,
//! )?;
//! assert_eq!(frame.dimension().width, 640);
//! # Ok::<(), vfb_core::Error>(())
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//! vfb-core (this crate)
//!    ^
//!    |
//!    +-- vfb-ops (orientation math, transforms, preprocessing)
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` - Enable serialization for metadata types

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod factory;
pub mod format;
pub mod frame;
pub mod geometry;
pub mod image_data;
pub mod layout;

// Re-exports for convenience
pub use error::*;
pub use factory::*;
pub use format::*;
pub use frame::*;
pub use geometry::*;
pub use image_data::ImageData;
pub use layout::{
    buffer_byte_size, crop_dimension, frame_buffer_byte_size, get_planes, get_planes_mut,
    pixel_stride, plane_layout, uv_plane_dimension, yuv_layout, PlaneLayout,
};

/// Prelude module for convenient imports.
///
/// ```
/// use vfb_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::format::{Format, Orientation};
    pub use crate::frame::{FrameBuffer, FrameBufferMut, Plane, PlaneMut};
    pub use crate::geometry::{BoundingBox, Dimension, Stride};
}
