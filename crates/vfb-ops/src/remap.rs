//! Mapping model outputs back onto the input frame.
//!
//! Models see the frame after preprocessing into an upright (`TopLeft`)
//! buffer. Their results are therefore expressed in upright coordinates and
//! have to be carried back to the stored frame.

use vfb_core::{BoundingBox, Dimension, Orientation};

use crate::orient::{orient_and_denormalize_bounding_box, orient_bounding_box, orient_coordinates, oriented_dimension};
use crate::{OpsError, OpsResult};

/// Dimension of a frame once displayed upright.
#[inline]
pub fn upright_dimension(dimension: Dimension, orientation: Orientation) -> Dimension {
    oriented_dimension(dimension, orientation, Orientation::TopLeft)
}

/// Converts a normalized `[left, top, right, bottom]` detection into a pixel
/// box of the stored (unrotated) frame.
///
/// The box is denormalized against the upright dimension, then oriented from
/// the frame orientation to `TopLeft`.
///
/// ```rust
/// use vfb_core::{BoundingBox, Dimension, Orientation};
/// use vfb_ops::remap::detection_box_to_frame;
///
/// let b = detection_box_to_frame([0.25, 0.5, 0.75, 1.0], Orientation::TopLeft, Dimension::new(4, 2)).unwrap();
/// assert_eq!(b, BoundingBox::new(1, 1, 2, 1));
/// ```
pub fn detection_box_to_frame(
    ltrb: [f32; 4],
    orientation: Orientation,
    frame_dimension: Dimension,
) -> OpsResult<BoundingBox> {
    let [left, top, right, bottom] = ltrb;
    orient_and_denormalize_bounding_box(
        left,
        top,
        right,
        bottom,
        orientation,
        Orientation::TopLeft,
        upright_dimension(frame_dimension, orientation),
    )
}

/// Maps a box of the stored frame into upright display coordinates.
pub fn box_for_display(
    bounding_box: &BoundingBox,
    orientation: Orientation,
    frame_dimension: Dimension,
) -> OpsResult<BoundingBox> {
    orient_bounding_box(bounding_box, Orientation::TopLeft, orientation, frame_dimension)
}

/// Maps upright segmentation mask pixels to the output tensor pixels they
/// read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskRemap {
    tensor_dimension: Dimension,
    tensor_orientation: Orientation,
    mask_dimension: Dimension,
}

impl MaskRemap {
    /// Remap for a tensor of `tensor_dimension` produced from a frame with
    /// `frame_orientation`.
    pub fn new(tensor_dimension: Dimension, frame_orientation: Orientation) -> Self {
        Self {
            tensor_dimension,
            tensor_orientation: frame_orientation,
            mask_dimension: upright_dimension(tensor_dimension, frame_orientation),
        }
    }

    /// Size of the mask, swapped against the tensor for quarter turns.
    #[inline]
    pub fn mask_dimension(&self) -> Dimension {
        self.mask_dimension
    }

    /// Size of the model output.
    #[inline]
    pub fn tensor_dimension(&self) -> Dimension {
        self.tensor_dimension
    }

    /// Tensor pixel sampled by mask pixel `(mask_x, mask_y)`.
    pub fn tensor_coordinates(&self, mask_x: u32, mask_y: u32) -> OpsResult<(u32, u32)> {
        orient_coordinates(
            mask_x,
            mask_y,
            Orientation::TopLeft,
            self.tensor_orientation,
            self.mask_dimension,
        )
    }

    /// Builds the mask from one value per tensor pixel, stored row-major.
    pub fn remap<T: Copy>(&self, values: &[T]) -> OpsResult<Vec<T>> {
        let expected = self.tensor_dimension.area();
        if values.len() != expected {
            return Err(OpsError::invalid(format!(
                "tensor holds {} values, expected {expected}",
                values.len()
            )));
        }
        let Dimension { width, height } = self.mask_dimension;
        let mut mask = Vec::with_capacity(expected);
        for y in 0..height {
            for x in 0..width {
                let (tx, ty) = self.tensor_coordinates(x, y)?;
                mask.push(values[ty as usize * self.tensor_dimension.width as usize + tx as usize]);
            }
        }
        Ok(mask)
    }
}
