//! Transform engines.
//!
//! A [`FrameProcessor`] implements the primitive transforms on borrowed frame
//! buffers. Engines are selected with [`ProcessEngine`] and created through
//! [`create_processor`]; higher layers only see the trait object.
//!
//! ```text
//! FrameBufferUtils
//!     +-- Box<dyn FrameProcessor>
//!             +-- SoftwareProcessor (CPU kernels, optional rayon rows)
//! ```

use vfb_core::{FrameBuffer, FrameBufferMut};

use crate::software::SoftwareProcessor;
use crate::OpsResult;

/// Available transform engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessEngine {
    /// Portable CPU implementation.
    #[default]
    Software,
}

impl ProcessEngine {
    /// Get human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Software => "software",
        }
    }
}

/// Primitive frame buffer transforms.
///
/// Every method validates its arguments before writing to `output`. On
/// error the output content is unspecified only for backend failures;
/// precondition errors leave it untouched.
pub trait FrameProcessor: Send + Sync {
    /// Engine name.
    fn name(&self) -> &'static str;

    /// Crops the inclusive corners `(x0, y0)`-`(x1, y1)` of `buffer`,
    /// resizing to the output dimension when it differs from the crop.
    fn crop(
        &self,
        buffer: &FrameBuffer<'_>,
        x0: u32,
        y0: u32,
        x1: u32,
        y1: u32,
        output: &mut FrameBufferMut<'_>,
    ) -> OpsResult<()>;

    /// Bilinear resize of `buffer` into the output dimension.
    fn resize(&self, buffer: &FrameBuffer<'_>, output: &mut FrameBufferMut<'_>) -> OpsResult<()>;

    /// Nearest-neighbor resize of `buffer` into the output dimension.
    fn resize_nearest_neighbor(&self, buffer: &FrameBuffer<'_>, output: &mut FrameBufferMut<'_>) -> OpsResult<()>;

    /// Counter-clockwise rotation by `angle_deg` (0, 90, 180 or 270).
    fn rotate(&self, buffer: &FrameBuffer<'_>, angle_deg: u32, output: &mut FrameBufferMut<'_>) -> OpsResult<()>;

    /// Mirrors left and right.
    fn flip_horizontally(&self, buffer: &FrameBuffer<'_>, output: &mut FrameBufferMut<'_>) -> OpsResult<()>;

    /// Mirrors top and bottom.
    fn flip_vertically(&self, buffer: &FrameBuffer<'_>, output: &mut FrameBufferMut<'_>) -> OpsResult<()>;

    /// Converts `buffer` into the output format. Dimensions must match.
    fn convert(&self, buffer: &FrameBuffer<'_>, output: &mut FrameBufferMut<'_>) -> OpsResult<()>;
}

/// Create a [`FrameProcessor`] for `engine`.
pub fn create_processor(engine: ProcessEngine) -> OpsResult<Box<dyn FrameProcessor>> {
    match engine {
        ProcessEngine::Software => Ok(Box::new(SoftwareProcessor::new())),
    }
}
