//! Dimensions, strides and bounding boxes.
//!
//! # Coordinate System
//!
//! All coordinates follow the stored pixel grid of a frame buffer:
//! - Origin (0, 0) is the first byte of row 0
//! - X increases along a row
//! - Y increases with the row index
//!
//! ```text
//! (0,0) ────────► X
//!   │
//!   │   ┌──────────┐
//!   │   │   box    │
//!   │   └──────────┘
//!   ▼
//!   Y
//! ```

/// Width and height of a frame in pixels.
///
/// # Example
///
/// ```rust
/// use vfb_core::Dimension;
///
/// let mut dim = Dimension::new(640, 480);
/// dim.swap();
/// assert_eq!(dim, Dimension::new(480, 640));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dimension {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Dimension {
    /// Creates a new dimension.
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Exchanges width and height in place.
    #[inline]
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.width, &mut self.height);
    }

    /// Returns a copy with width and height exchanged.
    #[inline]
    pub const fn swapped(&self) -> Self {
        Self::new(self.height, self.width)
    }

    /// Number of pixels.
    #[inline]
    pub const fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Returns `true` if either side is zero.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns `true` if a box lies fully inside `0..width x 0..height`.
    #[inline]
    pub fn contains_box(&self, b: &BoundingBox) -> bool {
        b.right() <= self.width as u64 && b.bottom() <= self.height as u64
    }
}

impl From<(u32, u32)> for Dimension {
    fn from((width, height): (u32, u32)) -> Self {
        Self::new(width, height)
    }
}

/// Row and pixel stride of a plane, in bytes.
///
/// `row_stride_bytes` is the distance between the first bytes of two
/// consecutive rows; `pixel_stride_bytes` between two horizontally adjacent
/// samples of the same channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stride {
    /// Bytes from one row to the next
    pub row_stride_bytes: usize,
    /// Bytes from one pixel to the next
    pub pixel_stride_bytes: usize,
}

impl Stride {
    /// Creates a new stride.
    #[inline]
    pub const fn new(row_stride_bytes: usize, pixel_stride_bytes: usize) -> Self {
        Self {
            row_stride_bytes,
            pixel_stride_bytes,
        }
    }

    /// Tightly packed stride for `width` pixels of `pixel_stride` bytes.
    #[inline]
    pub const fn packed(width: u32, pixel_stride: usize) -> Self {
        Self::new(width as usize * pixel_stride, pixel_stride)
    }

    /// Returns `true` if either stride is zero.
    #[inline]
    pub const fn has_zero(&self) -> bool {
        self.row_stride_bytes == 0 || self.pixel_stride_bytes == 0
    }
}

/// Axis-aligned integer box in a frame's coordinate system.
///
/// Boxes are never clamped to the frame. Functions that receive a box
/// outside their frame report an error instead.
///
/// # Example
///
/// ```rust
/// use vfb_core::BoundingBox;
///
/// let b = BoundingBox::new(10, 20, 100, 50);
/// assert_eq!(b.right(), 110);
/// assert_eq!(b.bottom(), 70);
/// assert!(b.contains(15, 25));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox {
    /// X coordinate of the left edge (inclusive)
    pub origin_x: u32,
    /// Y coordinate of the top edge (inclusive)
    pub origin_y: u32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl BoundingBox {
    /// Creates a new box.
    #[inline]
    pub const fn new(origin_x: u32, origin_y: u32, width: u32, height: u32) -> Self {
        Self {
            origin_x,
            origin_y,
            width,
            height,
        }
    }

    /// Box covering a whole frame.
    #[inline]
    pub const fn from_dimension(dimension: Dimension) -> Self {
        Self::new(0, 0, dimension.width, dimension.height)
    }

    /// Box spanning the inclusive corners `(x0, y0)` and `(x1, y1)`.
    ///
    /// Returns `None` when `x1 < x0` or `y1 < y0`.
    ///
    /// ```rust
    /// use vfb_core::BoundingBox;
    ///
    /// let b = BoundingBox::from_corners(1, 0, 2, 1).unwrap();
    /// assert_eq!((b.width, b.height), (2, 2));
    /// assert!(BoundingBox::from_corners(3, 0, 2, 1).is_none());
    /// ```
    pub fn from_corners(x0: u32, y0: u32, x1: u32, y1: u32) -> Option<Self> {
        if x1 < x0 || y1 < y0 {
            return None;
        }
        Some(Self::new(x0, y0, x1 - x0 + 1, y1 - y0 + 1))
    }

    /// Right edge (exclusive). Widened so huge boxes cannot overflow.
    #[inline]
    pub const fn right(&self) -> u64 {
        self.origin_x as u64 + self.width as u64
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> u64 {
        self.origin_y as u64 + self.height as u64
    }

    /// Size of the box.
    #[inline]
    pub const fn dimension(&self) -> Dimension {
        Dimension::new(self.width, self.height)
    }

    /// Returns `true` if the box has zero area.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns `true` if the point is inside the box.
    #[inline]
    pub const fn contains(&self, px: u32, py: u32) -> bool {
        px >= self.origin_x
            && (px as u64) < self.right()
            && py >= self.origin_y
            && (py as u64) < self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_swap() {
        let d = Dimension::new(3, 7);
        assert_eq!(d.swapped(), Dimension::new(7, 3));
        assert_eq!(d.area(), 21);
        assert!(!d.is_empty());
        assert!(Dimension::new(0, 4).is_empty());
    }

    #[test]
    fn test_stride_packed() {
        let s = Stride::packed(10, 3);
        assert_eq!(s.row_stride_bytes, 30);
        assert_eq!(s.pixel_stride_bytes, 3);
        assert!(!s.has_zero());
        assert!(Stride::new(0, 1).has_zero());
    }

    #[test]
    fn test_box_containment() {
        let frame = Dimension::new(10, 10);
        assert!(frame.contains_box(&BoundingBox::new(0, 0, 10, 10)));
        assert!(!frame.contains_box(&BoundingBox::new(1, 0, 10, 10)));
        assert!(!frame.contains_box(&BoundingBox::new(u32::MAX, 0, 2, 1)));
    }

    #[test]
    fn test_box_contains_point() {
        let b = BoundingBox::new(10, 10, 5, 5);
        assert!(b.contains(10, 10));
        assert!(b.contains(14, 14));
        assert!(!b.contains(15, 14));
    }
}
