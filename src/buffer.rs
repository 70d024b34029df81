//! Owned raster buffer with bounds-checked pixel access
//!
//! The buffer is the unit every transform reads and writes: a row-major
//! width x height grid of colors plus the pixel format that governs its
//! alpha policy. Pixel transforms mutate it in place; geometric transforms
//! build a complete replacement and the caller swaps it in atomically.

use image::{Rgba, RgbaImage};

use crate::color::PixelFormat;
use crate::error::{Error, Result};

/// A mutable grid of colors representing the current image state.
#[derive(Debug, Clone, PartialEq)]
pub struct Buffer {
    pixels: RgbaImage,
    format: PixelFormat,
}

impl Buffer {
    /// Wrap a decoded image, normalizing stored alpha to 0 for non-alpha
    /// formats so the format policy holds from decode onward.
    pub fn from_image(mut pixels: RgbaImage, format: PixelFormat) -> Self {
        if !format.supports_alpha() {
            for px in pixels.pixels_mut() {
                px[3] = 0;
            }
        }
        Buffer { pixels, format }
    }

    /// Allocate a `width x height` buffer pre-filled with the format's
    /// blank background (transparent or opaque black).
    pub fn blank(width: u32, height: u32, format: PixelFormat) -> Self {
        Buffer {
            pixels: RgbaImage::from_pixel(width, height, format.blank_fill()),
            format,
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    fn check_bounds(&self, x: u32, y: u32) -> Result<()> {
        if x >= self.width() || y >= self.height() {
            return Err(Error::OutOfBounds {
                x,
                y,
                width: self.width(),
                height: self.height(),
            });
        }
        Ok(())
    }

    /// Read the color at `(x, y)`.
    ///
    /// Out-of-range coordinates are an error, never clamped.
    pub fn get(&self, x: u32, y: u32) -> Result<Rgba<u8>> {
        self.check_bounds(x, y)?;
        Ok(*self.pixels.get_pixel(x, y))
    }

    /// Write the color at `(x, y)`.
    ///
    /// Out-of-range coordinates are an error, never clamped.
    pub fn set(&mut self, x: u32, y: u32, color: Rgba<u8>) -> Result<()> {
        self.check_bounds(x, y)?;
        self.pixels.put_pixel(x, y, color);
        Ok(())
    }

    /// Fill every pixel with one color.
    pub fn fill(&mut self, color: Rgba<u8>) {
        for px in self.pixels.pixels_mut() {
            *px = color;
        }
    }

    /// Whole-image view for the codec boundary and transform scans.
    pub(crate) fn image(&self) -> &RgbaImage {
        &self.pixels
    }

    pub(crate) fn image_mut(&mut self) -> &mut RgbaImage {
        &mut self.pixels
    }
}
