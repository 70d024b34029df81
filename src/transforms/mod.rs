//! Pixel-level and geometric transform engines
//!
//! Pixel transforms scan every pixel once and mutate the buffer in place.
//! Geometric transforms build and return a replacement buffer; the caller
//! swaps it in atomically so a failed operation never commits a
//! half-transformed image.

pub mod geometry;
pub mod pixel;

pub use geometry::{
    crop, downscale, flip, halftone, pixelate, rotate, wave, FlipMode,
    DEFAULT_HALFTONE_DOT_SIZE, DEFAULT_WAVE_AMPLITUDE, DEFAULT_WAVE_FREQUENCY,
};
pub use pixel::{
    adjust_brightness, adjust_contrast, blur, colorize, duotone, edge_detect, grayscale, invert,
    posterize, replace_color, selective_desaturate, vignette, DEFAULT_BLUR_PASSES,
    DEFAULT_DESATURATE_TOLERANCE, DEFAULT_POSTERIZE_LEVELS, DEFAULT_VIGNETTE_STRENGTH,
};
