//! Non-owning frame buffer views.
//!
//! A [`FrameBuffer`] describes pixels that live somewhere else: a camera
//! buffer, a decoded image, or a scratch `Vec<u8>`. It borrows one to
//! three byte slices ([`Plane`]s) and carries format, orientation,
//! dimension and timestamp metadata. [`FrameBufferMut`] is the writable
//! counterpart used as the destination of every transform.
//!
//! # Example
//!
//! ```rust
//! use vfb_core::{Dimension, Format, FrameBuffer, Orientation, Plane, Stride};
//!
//! let pixels = vec![0u8; 4 * 2 * 3];
//! let plane = Plane::new(&pixels, Stride::packed(4, 3));
//! let frame = FrameBuffer::new(
//!     vec![plane],
//!     Dimension::new(4, 2),
//!     Format::Rgb,
//!     Orientation::TopLeft,
//! )
//! .unwrap();
//! assert_eq!(frame.plane_count(), 1);
//! ```

use std::time::SystemTime;

use crate::layout::{split, split_mut, yuv_layout};
use crate::{Dimension, Error, Format, Orientation, Result, Stride};

/// Read-only view over one plane of pixel memory.
#[derive(Debug, Clone, Copy)]
pub struct Plane<'a> {
    buffer: &'a [u8],
    stride: Stride,
}

impl<'a> Plane<'a> {
    /// Creates a plane over `buffer`.
    #[inline]
    pub fn new(buffer: &'a [u8], stride: Stride) -> Self {
        Self { buffer, stride }
    }

    /// Underlying bytes.
    #[inline]
    pub fn buffer(&self) -> &'a [u8] {
        self.buffer
    }

    /// Plane strides.
    #[inline]
    pub fn stride(&self) -> Stride {
        self.stride
    }
}

/// Writable view over one plane of pixel memory.
#[derive(Debug)]
pub struct PlaneMut<'a> {
    buffer: &'a mut [u8],
    stride: Stride,
}

impl<'a> PlaneMut<'a> {
    /// Creates a plane over `buffer`.
    #[inline]
    pub fn new(buffer: &'a mut [u8], stride: Stride) -> Self {
        Self { buffer, stride }
    }

    /// Underlying bytes.
    #[inline]
    pub fn buffer(&self) -> &[u8] {
        &*self.buffer
    }

    /// Underlying bytes, mutably.
    #[inline]
    pub fn buffer_mut(&mut self) -> &mut [u8] {
        &mut *self.buffer
    }

    /// Consumes the plane and returns the bytes with their full lifetime.
    #[inline]
    pub fn into_buffer(self) -> &'a mut [u8] {
        self.buffer
    }

    /// Plane strides.
    #[inline]
    pub fn stride(&self) -> Stride {
        self.stride
    }

    /// Reborrows as a read-only plane.
    #[inline]
    pub fn as_plane(&self) -> Plane<'_> {
        Plane::new(&*self.buffer, self.stride)
    }

    /// Reborrows as a shorter-lived writable plane.
    #[inline]
    pub fn reborrow(&mut self) -> PlaneMut<'_> {
        PlaneMut::new(&mut *self.buffer, self.stride)
    }
}

fn check_planes(format: Format, count: usize, strides: impl Iterator<Item = Stride>) -> Result<()> {
    if format == Format::Unknown {
        return Err(Error::unsupported_format("UNKNOWN"));
    }
    if count == 0 || !format.accepts_plane_count(count) {
        return Err(Error::plane_count(format.name(), count));
    }
    for stride in strides {
        if stride.has_zero() {
            return Err(Error::invalid_argument(format!(
                "{format} plane has a zero stride ({}, {})",
                stride.row_stride_bytes, stride.pixel_stride_bytes
            )));
        }
    }
    Ok(())
}

/// Read-only frame buffer.
///
/// Cloning copies the plane references, never the pixels.
#[derive(Debug, Clone)]
pub struct FrameBuffer<'a> {
    planes: Vec<Plane<'a>>,
    dimension: Dimension,
    format: Format,
    orientation: Orientation,
    timestamp: SystemTime,
}

impl<'a> FrameBuffer<'a> {
    /// Creates a frame from planes and metadata, stamped with the current time.
    ///
    /// Fails if the plane count does not fit `format` or a stride is zero.
    pub fn new(
        planes: Vec<Plane<'a>>,
        dimension: Dimension,
        format: Format,
        orientation: Orientation,
    ) -> Result<Self> {
        check_planes(format, planes.len(), planes.iter().map(|p| p.stride))?;
        Ok(Self {
            planes,
            dimension,
            format,
            orientation,
            timestamp: SystemTime::now(),
        })
    }

    /// Replaces the timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: SystemTime) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Planes in storage order.
    #[inline]
    pub fn planes(&self) -> &[Plane<'a>] {
        &self.planes
    }

    /// Plane at `index`, if present.
    #[inline]
    pub fn plane(&self, index: usize) -> Option<&Plane<'a>> {
        self.planes.get(index)
    }

    /// Number of planes.
    #[inline]
    pub fn plane_count(&self) -> usize {
        self.planes.len()
    }

    /// Frame size in pixels.
    #[inline]
    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    /// Pixel format.
    #[inline]
    pub fn format(&self) -> Format {
        self.format
    }

    /// EXIF orientation.
    #[inline]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Capture time.
    #[inline]
    pub fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    /// Planes with single-plane YUV storage split into luma and chroma.
    ///
    /// Frames that already hold several planes, and packed frames, return
    /// their planes unchanged.
    pub fn expanded_planes(&self) -> Result<Vec<Plane<'a>>> {
        if !self.format.is_yuv() || self.planes.len() != 1 {
            return Ok(self.planes.clone());
        }
        let plane = self.planes[0];
        let layout = yuv_layout(self.dimension, self.format, plane.stride.row_stride_bytes)?;
        Ok(split(plane.buffer, &layout)?
            .into_iter()
            .zip(&layout)
            .map(|(slice, l)| Plane::new(slice, l.stride))
            .collect())
    }
}

/// Writable frame buffer, the destination of every transform.
#[derive(Debug)]
pub struct FrameBufferMut<'a> {
    planes: Vec<PlaneMut<'a>>,
    dimension: Dimension,
    format: Format,
    orientation: Orientation,
    timestamp: SystemTime,
}

impl<'a> FrameBufferMut<'a> {
    /// Creates a writable frame, stamped with the current time.
    pub fn new(
        planes: Vec<PlaneMut<'a>>,
        dimension: Dimension,
        format: Format,
        orientation: Orientation,
    ) -> Result<Self> {
        check_planes(format, planes.len(), planes.iter().map(|p| p.stride))?;
        Ok(Self {
            planes,
            dimension,
            format,
            orientation,
            timestamp: SystemTime::now(),
        })
    }

    /// Replaces the timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: SystemTime) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Planes in storage order.
    #[inline]
    pub fn planes(&self) -> &[PlaneMut<'a>] {
        &self.planes
    }

    /// Planes in storage order, mutably.
    #[inline]
    pub fn planes_mut(&mut self) -> &mut [PlaneMut<'a>] {
        &mut self.planes
    }

    /// Number of planes.
    #[inline]
    pub fn plane_count(&self) -> usize {
        self.planes.len()
    }

    /// Frame size in pixels.
    #[inline]
    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    /// Pixel format.
    #[inline]
    pub fn format(&self) -> Format {
        self.format
    }

    /// EXIF orientation.
    #[inline]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Capture time.
    #[inline]
    pub fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    /// Reborrows the frame as a read-only view.
    pub fn as_view(&self) -> FrameBuffer<'_> {
        FrameBuffer {
            planes: self.planes.iter().map(PlaneMut::as_plane).collect(),
            dimension: self.dimension,
            format: self.format,
            orientation: self.orientation,
            timestamp: self.timestamp,
        }
    }

    /// Writable planes with single-plane YUV storage split into luma and
    /// chroma, borrowed from `self`.
    pub fn expanded_planes_mut(&mut self) -> Result<Vec<PlaneMut<'_>>> {
        if !self.format.is_yuv() || self.planes.len() != 1 {
            return Ok(self.planes.iter_mut().map(PlaneMut::reborrow).collect());
        }
        let dimension = self.dimension;
        let format = self.format;
        let plane = &mut self.planes[0];
        let layout = yuv_layout(dimension, format, plane.stride.row_stride_bytes)?;
        Ok(split_mut(&mut *plane.buffer, &layout)?
            .into_iter()
            .zip(&layout)
            .map(|(slice, l)| PlaneMut::new(slice, l.stride))
            .collect())
    }

    /// Writable view of the top-left `dimension` pixels of this frame.
    ///
    /// The region shares the strides of the full frame. Single-plane YUV
    /// storage is split first so the chroma planes stay where the full
    /// frame keeps them.
    ///
    /// ```rust
    /// use vfb_core::{create_from_raw_buffer_mut, Dimension, Format, Orientation};
    ///
    /// let mut pixels = vec![0u8; 4 * 4];
    /// let mut frame = create_from_raw_buffer_mut(
    ///     &mut pixels, Dimension::new(4, 4), Format::Gray, Orientation::TopLeft,
    /// ).unwrap();
    /// let region = frame.top_left_region_mut(Dimension::new(2, 3)).unwrap();
    /// assert_eq!(region.dimension(), Dimension::new(2, 3));
    /// assert!(frame.top_left_region_mut(Dimension::new(5, 1)).is_err());
    /// ```
    pub fn top_left_region_mut(&mut self, dimension: Dimension) -> Result<FrameBufferMut<'_>> {
        let full = self.dimension;
        if dimension.is_empty() || dimension.width > full.width || dimension.height > full.height {
            return Err(Error::invalid_region(
                0,
                0,
                dimension.width,
                dimension.height,
                full.width,
                full.height,
            ));
        }
        let format = self.format;
        let orientation = self.orientation;
        let timestamp = self.timestamp;
        let planes = self.expanded_planes_mut()?;
        Ok(FrameBufferMut {
            planes,
            dimension,
            format,
            orientation,
            timestamp,
        })
    }
}
