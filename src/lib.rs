//! Rastermod - in-memory raster image transform engine
//!
//! This library provides functionality to:
//! - Decode JPEG/PNG/GIF bytes into an owned raster buffer
//! - Apply pixel-level transforms (recoloring, tone, stylization) in place
//! - Apply geometric transforms (crop, downscale, rotate, flip, ...) that
//!   atomically replace the buffer
//! - Re-encode the result to bytes, a file, or a base64 data URI

pub mod buffer;
pub mod codec;
pub mod color;
pub mod error;
pub mod manipulator;
pub mod transforms;

pub use buffer::Buffer;
pub use codec::ImageKind;
pub use color::PixelFormat;
pub use error::{Error, Result};
pub use manipulator::Manipulator;
pub use transforms::FlipMode;
