//! Orientation math: rotation and flip between EXIF orientations.
//!
//! The eight EXIF tags split into two groups of four. Within a group every
//! tag is reachable from the others by rotation alone; the second group
//! holds the mirror images at parallel positions:
//!
//! ```text
//! group 0:  1 (TopLeft)   6 (RightTop)   3 (BottomRight)  8 (LeftBottom)
//! group 1:  2 (TopRight)  5 (LeftTop)    4 (BottomLeft)   7 (RightBottom)
//! ```
//!
//! Going from one tag to another is a counter-clockwise rotation by
//! `(4 - (from_index - to_index)) mod 4` quarter turns, followed by a flip
//! when the groups differ. The same rotation-then-flip is applied to boxes
//! and points by [`orient_bounding_box`] and [`orient_coordinates`].
//!
//! # Example
//!
//! ```rust
//! use vfb_core::Orientation;
//! use vfb_ops::orient::{get_orient_params, FlipAxis, Rotation};
//!
//! let p = get_orient_params(Orientation::TopLeft, Orientation::TopRight);
//! assert_eq!(p.rotation, Rotation::Deg0);
//! assert_eq!(p.flip, Some(FlipAxis::Horizontal));
//! ```

use vfb_core::{BoundingBox, Dimension, Error, Orientation};

use crate::{OpsError, OpsResult};

const EXIF_GROUP: [Orientation; 8] = [
    Orientation::TopLeft,
    Orientation::RightTop,
    Orientation::BottomRight,
    Orientation::LeftBottom,
    Orientation::TopRight,
    Orientation::LeftTop,
    Orientation::BottomLeft,
    Orientation::RightBottom,
];
const GROUP_SIZE: usize = 4;

/// Counter-clockwise rotation in quarter turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
    /// No rotation.
    #[default]
    Deg0,
    /// 90 degrees counter-clockwise.
    Deg90,
    /// 180 degrees.
    Deg180,
    /// 270 degrees counter-clockwise.
    Deg270,
}

impl Rotation {
    /// Rotation from a quarter-turn count, taken modulo 4.
    #[inline]
    pub fn from_quarter_turns(turns: u32) -> Self {
        match turns % 4 {
            0 => Self::Deg0,
            1 => Self::Deg90,
            2 => Self::Deg180,
            _ => Self::Deg270,
        }
    }

    /// Rotation from an angle in degrees. Only multiples of 90 below 360 map.
    pub fn from_degrees(degrees: u32) -> Option<Self> {
        match degrees {
            0 => Some(Self::Deg0),
            90 => Some(Self::Deg90),
            180 => Some(Self::Deg180),
            270 => Some(Self::Deg270),
            _ => None,
        }
    }

    /// Angle in degrees.
    #[inline]
    pub fn degrees(&self) -> u32 {
        self.quarter_turns() * 90
    }

    /// Number of counter-clockwise quarter turns.
    #[inline]
    pub fn quarter_turns(&self) -> u32 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 1,
            Self::Deg180 => 2,
            Self::Deg270 => 3,
        }
    }

    /// Returns `true` if width and height trade places.
    #[inline]
    pub fn swaps_dimensions(&self) -> bool {
        matches!(self, Self::Deg90 | Self::Deg270)
    }
}

/// Mirror axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlipAxis {
    /// Mirror left and right.
    Horizontal,
    /// Mirror top and bottom.
    Vertical,
}

/// Rotation then optional flip taking one orientation to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OrientParams {
    /// Counter-clockwise rotation, applied first
    pub rotation: Rotation,
    /// Flip applied after the rotation
    pub flip: Option<FlipAxis>,
}

impl OrientParams {
    /// Rotation angle in degrees.
    #[inline]
    pub fn rotation_angle_deg(&self) -> u32 {
        self.rotation.degrees()
    }

    /// Returns `true` for the identity transform.
    #[inline]
    pub fn is_identity(&self) -> bool {
        self.rotation == Rotation::Deg0 && self.flip.is_none()
    }
}

#[inline]
fn group_index(orientation: Orientation) -> usize {
    // Every variant appears in the table.
    EXIF_GROUP
        .iter()
        .position(|&o| o == orientation)
        .unwrap_or(0)
}

/// Computes the rotation and flip that turn a `from` buffer into a `to` one.
pub fn get_orient_params(from: Orientation, to: Orientation) -> OrientParams {
    let from_index = group_index(from);
    let to_index = group_index(to);
    let from_sub = from_index % GROUP_SIZE;
    let to_sub = to_index % GROUP_SIZE;
    let rotation = Rotation::from_quarter_turns((GROUP_SIZE + to_sub - from_sub) as u32);
    let flip = if from_index / GROUP_SIZE == to_index / GROUP_SIZE {
        None
    } else if to_sub % 2 == 1 {
        Some(FlipAxis::Vertical)
    } else {
        Some(FlipAxis::Horizontal)
    };
    OrientParams { rotation, flip }
}

/// Returns `true` if orienting `from` to `to` swaps width and height.
#[inline]
pub fn require_dimension_swap(from: Orientation, to: Orientation) -> bool {
    get_orient_params(from, to).rotation.swaps_dimensions()
}

/// Dimension of a `from` frame once oriented to `to`.
#[inline]
pub fn oriented_dimension(dimension: Dimension, from: Orientation, to: Orientation) -> Dimension {
    if require_dimension_swap(from, to) {
        dimension.swapped()
    } else {
        dimension
    }
}

/// Maps a box in a `from` frame of `from_dimension` to the `to` frame.
///
/// The box must lie inside the frame; it is never clamped.
///
/// ```rust
/// use vfb_core::{BoundingBox, Dimension, Orientation};
/// use vfb_ops::orient::orient_bounding_box;
///
/// let b = BoundingBox::new(0, 0, 2, 1);
/// let r = orient_bounding_box(
///     &b, Orientation::TopLeft, Orientation::BottomRight, Dimension::new(4, 3),
/// ).unwrap();
/// assert_eq!(r, BoundingBox::new(2, 2, 2, 1));
/// ```
pub fn orient_bounding_box(
    bounding_box: &BoundingBox,
    from: Orientation,
    to: Orientation,
    from_dimension: Dimension,
) -> OpsResult<BoundingBox> {
    if !from_dimension.contains_box(bounding_box) {
        return Err(Error::invalid_region(
            bounding_box.origin_x,
            bounding_box.origin_y,
            bounding_box.width,
            bounding_box.height,
            from_dimension.width,
            from_dimension.height,
        )
        .into());
    }
    let params = get_orient_params(from, to);
    let (w, h) = (from_dimension.width, from_dimension.height);
    let BoundingBox {
        origin_x: x,
        origin_y: y,
        width: bw,
        height: bh,
    } = *bounding_box;
    let mut out = match params.rotation {
        Rotation::Deg0 => *bounding_box,
        Rotation::Deg90 => BoundingBox::new(y, w - (x + bw), bh, bw),
        Rotation::Deg180 => BoundingBox::new(w - (x + bw), h - (y + bh), bw, bh),
        Rotation::Deg270 => BoundingBox::new(h - (y + bh), x, bh, bw),
    };
    let rotated = oriented_dimension(from_dimension, from, to);
    match params.flip {
        Some(FlipAxis::Vertical) => out.origin_y = rotated.height - (out.origin_y + out.height),
        Some(FlipAxis::Horizontal) => out.origin_x = rotated.width - (out.origin_x + out.width),
        None => {}
    }
    Ok(out)
}

/// Builds a pixel box from normalized `[0, 1]` corners in a `from` frame,
/// then orients it to `to`.
///
/// The origin is truncated and the size rounded, matching how detection
/// models report boxes.
#[allow(clippy::too_many_arguments)]
pub fn orient_and_denormalize_bounding_box(
    left: f32,
    top: f32,
    right: f32,
    bottom: f32,
    from: Orientation,
    to: Orientation,
    from_dimension: Dimension,
) -> OpsResult<BoundingBox> {
    if ![left, top, right, bottom]
        .iter()
        .all(|v| v.is_finite() && *v >= 0.0)
    {
        return Err(OpsError::invalid(format!(
            "normalized box ({left}, {top}, {right}, {bottom}) must be finite and non-negative"
        )));
    }
    let w = from_dimension.width as f32;
    let h = from_dimension.height as f32;
    let bounding_box = BoundingBox::new(
        (left * w) as u32,
        (top * h) as u32,
        ((right - left).abs() * w).round() as u32,
        ((bottom - top).abs() * h).round() as u32,
    );
    orient_bounding_box(&bounding_box, from, to, from_dimension)
}

/// Maps a pixel coordinate in a `from` frame of `from_dimension` to the
/// `to` frame.
///
/// ```rust
/// use vfb_core::{Dimension, Orientation};
/// use vfb_ops::orient::orient_coordinates;
///
/// // 90 degrees counter-clockwise: top-right corner becomes top-left.
/// let p = orient_coordinates(
///     3, 0, Orientation::TopLeft, Orientation::RightTop, Dimension::new(4, 2),
/// ).unwrap();
/// assert_eq!(p, (0, 0));
/// ```
pub fn orient_coordinates(
    x: u32,
    y: u32,
    from: Orientation,
    to: Orientation,
    from_dimension: Dimension,
) -> OpsResult<(u32, u32)> {
    let (w, h) = (from_dimension.width, from_dimension.height);
    if x >= w || y >= h {
        return Err(Error::out_of_bounds(x, y, w, h).into());
    }
    let params = get_orient_params(from, to);
    let (mut ox, mut oy) = match params.rotation {
        Rotation::Deg0 => (x, y),
        Rotation::Deg90 => (y, w - x - 1),
        Rotation::Deg180 => (w - x - 1, h - y - 1),
        Rotation::Deg270 => (h - y - 1, x),
    };
    let rotated = oriented_dimension(from_dimension, from, to);
    match params.flip {
        Some(FlipAxis::Vertical) => oy = rotated.height - oy - 1,
        Some(FlipAxis::Horizontal) => ox = rotated.width - ox - 1,
        None => {}
    }
    Ok((ox, oy))
}
