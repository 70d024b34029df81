//! Color model and per-format alpha policy
//!
//! Colors are four 8-bit channels. Alpha is meaningful only for
//! alpha-capable formats; alpha-incapable formats store and report it as 0
//! and never round-trip it as transparency. The format policy lives here so
//! no transform has to branch on "alpha format vs not" itself.

use image::Rgba;

/// Pixel storage format, derived from the source media type
/// (PNG carries alpha; JPEG and GIF do not).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// Three color channels; stored alpha is always 0 and meaningless.
    Rgb,
    /// Three color channels plus a per-pixel alpha channel.
    Rgba,
}

impl PixelFormat {
    /// Whether this format stores a per-pixel transparency channel.
    pub fn supports_alpha(self) -> bool {
        matches!(self, PixelFormat::Rgba)
    }

    /// Allocate a color honoring this format's alpha capability:
    /// alpha-capable formats keep `a` as given, the rest force `a = 0`.
    pub fn allocate(self, r: u8, g: u8, b: u8, a: u8) -> Rgba<u8> {
        if self.supports_alpha() {
            Rgba([r, g, b, a])
        } else {
            Rgba([r, g, b, 0])
        }
    }

    /// Background for newly allocated buffers: fully transparent for alpha
    /// formats, opaque black otherwise. Both store `[0, 0, 0, 0]` because a
    /// non-alpha format's stored alpha never reads as transparency.
    pub fn blank_fill(self) -> Rgba<u8> {
        Rgba([0, 0, 0, 0])
    }

    /// Background for halftone paper: transparent for alpha formats,
    /// white otherwise.
    pub fn paper_fill(self) -> Rgba<u8> {
        if self.supports_alpha() {
            Rgba([0, 0, 0, 0])
        } else {
            Rgba([255, 255, 255, 0])
        }
    }
}

/// Perceptual grayscale value of a pixel: `0.3R + 0.59G + 0.11B`
/// (ITU-R 601 approximation), truncated to an integer.
pub fn luma(px: Rgba<u8>) -> u8 {
    // Integer form of 0.3R + 0.59G + 0.11B; division truncates.
    ((30 * px[0] as u32 + 59 * px[1] as u32 + 11 * px[2] as u32) / 100) as u8
}

/// Unquantized luma, for operations that average or scale it before use.
pub(crate) fn luma_f32(px: Rgba<u8>) -> f32 {
    0.3 * px[0] as f32 + 0.59 * px[1] as f32 + 0.11 * px[2] as f32
}

/// Clamp an intermediate channel value into `[0, 255]` before storage.
pub(crate) fn clamp_channel(value: i32) -> u8 {
    value.clamp(0, 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_keeps_alpha_for_rgba() {
        assert_eq!(
            PixelFormat::Rgba.allocate(10, 20, 30, 40),
            Rgba([10, 20, 30, 40])
        );
    }

    #[test]
    fn test_allocate_forces_zero_alpha_for_rgb() {
        assert_eq!(
            PixelFormat::Rgb.allocate(10, 20, 30, 200),
            Rgba([10, 20, 30, 0])
        );
    }

    #[test]
    fn test_luma_truncates() {
        // 0.3*100 + 0.59*50 + 0.11*25 = 30 + 29.5 + 2.75 = 62.25 -> 62
        assert_eq!(luma(Rgba([100, 50, 25, 255])), 62);
    }

    #[test]
    fn test_luma_extremes() {
        assert_eq!(luma(Rgba([0, 0, 0, 255])), 0);
        // weights sum to 1, so white stays 255
        assert_eq!(luma(Rgba([255, 255, 255, 0])), 255);
    }

    #[test]
    fn test_paper_fill_is_white_for_rgb() {
        assert_eq!(PixelFormat::Rgb.paper_fill(), Rgba([255, 255, 255, 0]));
        assert_eq!(PixelFormat::Rgba.paper_fill(), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_clamp_channel() {
        assert_eq!(clamp_channel(-5), 0);
        assert_eq!(clamp_channel(128), 128);
        assert_eq!(clamp_channel(300), 255);
    }
}
