//! Manipulator facade: load, transform, encode
//!
//! One `Manipulator` owns the working buffer for one image and tracks its
//! lifecycle explicitly: every operation checks for a loaded buffer first,
//! and `destroy` is a terminal state rather than a dangling handle. Pixel
//! transforms run in place; geometric transforms build a replacement buffer
//! and swap it in only on success, so a failed call never leaves a
//! half-transformed image behind.

use std::fs;
use std::path::Path;

use image::{Rgb, Rgba};

use crate::buffer::Buffer;
use crate::codec::{self, ImageKind};
use crate::error::{Error, Result};
use crate::transforms::{geometry, pixel, FlipMode};

#[derive(Debug)]
enum State {
    Loaded { buffer: Buffer, kind: ImageKind },
    Destroyed,
}

/// Handle for loading an image, applying transforms, and writing it back
/// out.
#[derive(Debug)]
pub struct Manipulator {
    state: State,
}

impl Manipulator {
    /// Load an image from a file on disk.
    ///
    /// The media type is sniffed from the bytes, not the extension.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Manipulator> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let bytes = fs::read(path)?;
        Manipulator::from_bytes(&bytes)
    }

    /// Load an image from raw encoded bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Manipulator> {
        let (buffer, kind) = codec::decode(bytes)?;
        Ok(Manipulator {
            state: State::Loaded { buffer, kind },
        })
    }

    fn buffer(&self) -> Result<&Buffer> {
        match &self.state {
            State::Loaded { buffer, .. } => Ok(buffer),
            State::Destroyed => Err(Error::NoImageLoaded),
        }
    }

    fn buffer_mut(&mut self) -> Result<&mut Buffer> {
        match &mut self.state {
            State::Loaded { buffer, .. } => Ok(buffer),
            State::Destroyed => Err(Error::NoImageLoaded),
        }
    }

    fn parts(&self) -> Result<(&Buffer, ImageKind)> {
        match &self.state {
            State::Loaded { buffer, kind } => Ok((buffer, *kind)),
            State::Destroyed => Err(Error::NoImageLoaded),
        }
    }

    fn replace_buffer(&mut self, replacement: Buffer) {
        if let State::Loaded { buffer, .. } = &mut self.state {
            *buffer = replacement;
        }
    }

    /// The detected container kind of the loaded image.
    pub fn kind(&self) -> Result<ImageKind> {
        self.parts().map(|(_, kind)| kind)
    }

    pub fn width(&self) -> Result<u32> {
        self.buffer().map(Buffer::width)
    }

    pub fn height(&self) -> Result<u32> {
        self.buffer().map(Buffer::height)
    }

    /// Read the color at `(x, y)`.
    pub fn get_pixel(&self, x: u32, y: u32) -> Result<Rgba<u8>> {
        self.buffer()?.get(x, y)
    }

    /// Write one pixel through the format alpha policy: non-alpha formats
    /// store alpha 0 regardless of `a`.
    pub fn set_pixel_color(&mut self, x: u32, y: u32, r: u8, g: u8, b: u8, a: u8) -> Result<()> {
        let buffer = self.buffer_mut()?;
        let color = buffer.format().allocate(r, g, b, a);
        buffer.set(x, y, color)
    }

    // Pixel transforms, in place.

    pub fn replace_color(&mut self, target: Rgb<u8>, new: Rgb<u8>, tolerance: u8) -> Result<()> {
        pixel::replace_color(self.buffer_mut()?, target, new, tolerance)
    }

    pub fn invert(&mut self) -> Result<()> {
        pixel::invert(self.buffer_mut()?)
    }

    pub fn grayscale(&mut self) -> Result<()> {
        pixel::grayscale(self.buffer_mut()?)
    }

    pub fn adjust_brightness(&mut self, level: i32) -> Result<()> {
        pixel::adjust_brightness(self.buffer_mut()?, level)
    }

    pub fn adjust_contrast(&mut self, level: i32) -> Result<()> {
        pixel::adjust_contrast(self.buffer_mut()?, level)
    }

    pub fn colorize(&mut self, r: i32, g: i32, b: i32) -> Result<()> {
        pixel::colorize(self.buffer_mut()?, r, g, b)
    }

    pub fn edge_detect(&mut self) -> Result<()> {
        pixel::edge_detect(self.buffer_mut()?)
    }

    /// [`DEFAULT_POSTERIZE_LEVELS`](crate::transforms::DEFAULT_POSTERIZE_LEVELS)
    /// is the conventional level count.
    pub fn posterize(&mut self, levels: u32) -> Result<()> {
        pixel::posterize(self.buffer_mut()?, levels)
    }

    pub fn duotone(&mut self, dark: Rgb<u8>, light: Rgb<u8>) -> Result<()> {
        pixel::duotone(self.buffer_mut()?, dark, light)
    }

    /// [`DEFAULT_DESATURATE_TOLERANCE`](crate::transforms::DEFAULT_DESATURATE_TOLERANCE)
    /// is the conventional tolerance.
    pub fn selective_desaturate(&mut self, target: Rgb<u8>, tolerance: u8) -> Result<()> {
        pixel::selective_desaturate(self.buffer_mut()?, target, tolerance)
    }

    /// [`DEFAULT_VIGNETTE_STRENGTH`](crate::transforms::DEFAULT_VIGNETTE_STRENGTH)
    /// is the conventional strength.
    pub fn vignette(&mut self, strength: f32) -> Result<()> {
        pixel::vignette(self.buffer_mut()?, strength)
    }

    /// [`DEFAULT_BLUR_PASSES`](crate::transforms::DEFAULT_BLUR_PASSES)
    /// is the conventional pass count.
    pub fn blur(&mut self, passes: u32) -> Result<()> {
        pixel::blur(self.buffer_mut()?, passes)
    }

    // Geometric transforms: compute, then swap in.

    /// Crop to the clamped region; a region with no area is a no-op.
    pub fn crop(&mut self, x: i64, y: i64, width: i64, height: i64) -> Result<()> {
        if let Some(cropped) = geometry::crop(self.buffer()?, x, y, width, height) {
            self.replace_buffer(cropped);
        }
        Ok(())
    }

    pub fn downscale(&mut self, factor: f32) -> Result<()> {
        let scaled = geometry::downscale(self.buffer()?, factor)?;
        self.replace_buffer(scaled);
        Ok(())
    }

    /// Rotate by `angle_degrees`, clockwise-positive, expanding the canvas
    /// to the rotated bounding box.
    pub fn rotate(&mut self, angle_degrees: f32) -> Result<()> {
        let rotated = geometry::rotate(self.buffer()?, angle_degrees)?;
        self.replace_buffer(rotated);
        Ok(())
    }

    pub fn flip(&mut self, mode: FlipMode) -> Result<()> {
        let flipped = geometry::flip(self.buffer()?, mode);
        self.replace_buffer(flipped);
        Ok(())
    }

    /// [`DEFAULT_WAVE_AMPLITUDE`](crate::transforms::DEFAULT_WAVE_AMPLITUDE) and
    /// [`DEFAULT_WAVE_FREQUENCY`](crate::transforms::DEFAULT_WAVE_FREQUENCY)
    /// are the conventional parameters.
    pub fn wave(&mut self, amplitude: f32, frequency: f32) -> Result<()> {
        let waved = geometry::wave(self.buffer()?, amplitude, frequency);
        self.replace_buffer(waved);
        Ok(())
    }

    pub fn pixelate(&mut self, block_size: u32) -> Result<()> {
        let blocked = geometry::pixelate(self.buffer()?, block_size)?;
        self.replace_buffer(blocked);
        Ok(())
    }

    /// [`DEFAULT_HALFTONE_DOT_SIZE`](crate::transforms::DEFAULT_HALFTONE_DOT_SIZE)
    /// is the conventional cell size.
    pub fn halftone(&mut self, dot_size: u32) -> Result<()> {
        let dotted = geometry::halftone(self.buffer()?, dot_size)?;
        self.replace_buffer(dotted);
        Ok(())
    }

    // Output boundary.

    /// Encode the current buffer in the format it was loaded as.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let (buffer, kind) = self.parts()?;
        codec::encode(buffer, kind)
    }

    /// Encode and write to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = self.encode()?;
        fs::write(path, bytes)?;
        Ok(())
    }

    /// Encode and render as a base64 data URI.
    pub fn to_data_uri(&self) -> Result<String> {
        let (buffer, kind) = self.parts()?;
        let bytes = codec::encode(buffer, kind)?;
        Ok(codec::data_uri(&bytes, kind))
    }

    /// Drop the buffer. Every later operation fails with `NoImageLoaded`.
    /// Calling it again is fine.
    pub fn destroy(&mut self) {
        self.state = State::Destroyed;
    }
}
