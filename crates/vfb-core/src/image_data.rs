//! Decoded image pixels handed over by an external decoder.
//!
//! Decoding and encoding files is left to the caller. [`ImageData`] is the
//! hand-off point: row-major, tightly packed 8-bit pixels with 1, 3 or 4
//! channels, turned into a [`FrameBuffer`] view without copying.

use crate::{
    create_from_gray_raw_buffer, create_from_rgb_raw_buffer, create_from_rgba_raw_buffer,
    Dimension, Error, Format, FrameBuffer, Orientation, Result,
};

/// Owned, decoded 8-bit image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    /// Row-major pixels, `width * height * channels` bytes
    pub pixels: Vec<u8>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Channels per pixel (1, 3 or 4)
    pub channels: u32,
}

impl ImageData {
    /// Wraps decoded pixels, checking the length against the geometry.
    ///
    /// ```rust
    /// use vfb_core::ImageData;
    ///
    /// let img = ImageData::new(vec![0; 12], 2, 2, 3).unwrap();
    /// assert_eq!(img.dimension().area(), 4);
    /// assert!(ImageData::new(vec![0; 11], 2, 2, 3).is_err());
    /// ```
    pub fn new(pixels: Vec<u8>, width: u32, height: u32, channels: u32) -> Result<Self> {
        let required = width as usize * height as usize * channels as usize;
        if pixels.len() != required {
            return Err(Error::invalid_argument(format!(
                "expected {required} bytes for {width}x{height}x{channels}, got {}",
                pixels.len()
            )));
        }
        Ok(Self {
            pixels,
            width,
            height,
            channels,
        })
    }

    /// Image size.
    #[inline]
    pub fn dimension(&self) -> Dimension {
        Dimension::new(self.width, self.height)
    }

    /// Pixel format matching the channel count.
    pub fn format(&self) -> Result<Format> {
        match self.channels {
            1 => Ok(Format::Gray),
            3 => Ok(Format::Rgb),
            4 => Ok(Format::Rgba),
            n => Err(Error::unsupported_format(format!("{n}-channel image data"))),
        }
    }

    /// Borrows the pixels as an upright frame buffer.
    pub fn as_frame_buffer(&self) -> Result<FrameBuffer<'_>> {
        self.as_frame_buffer_oriented(Orientation::TopLeft)
    }

    /// Borrows the pixels as a frame buffer with the given EXIF orientation.
    pub fn as_frame_buffer_oriented(&self, orientation: Orientation) -> Result<FrameBuffer<'_>> {
        let dimension = self.dimension();
        match self.format()? {
            Format::Gray => create_from_gray_raw_buffer(&self.pixels, dimension, orientation),
            Format::Rgb => create_from_rgb_raw_buffer(&self.pixels, dimension, orientation),
            _ => create_from_rgba_raw_buffer(&self.pixels, dimension, orientation),
        }
    }
}
