//! Pixel transform engine: color-domain operations
//!
//! Every operation here scans each pixel exactly once (the convolutions
//! read a 3x3 neighborhood per pass), writes a new color at the same
//! coordinate, and never reallocates the buffer. Alpha is carried through
//! untouched by all of them.

use image::{Rgb, Rgba};

use crate::buffer::Buffer;
use crate::color::{clamp_channel, luma};
use crate::error::{Error, Result};

/// Default pass count for [`blur`].
pub const DEFAULT_BLUR_PASSES: u32 = 1;
/// Default level count for [`posterize`].
pub const DEFAULT_POSTERIZE_LEVELS: u32 = 4;
/// Default tolerance for [`selective_desaturate`].
pub const DEFAULT_DESATURATE_TOLERANCE: u8 = 50;
/// Default strength for [`vignette`].
pub const DEFAULT_VIGNETTE_STRENGTH: f32 = 0.5;

/// Fixed 3x3 Gaussian kernel used by [`blur`], divisor 16.
const GAUSSIAN_KERNEL: [f32; 9] = [1.0, 2.0, 1.0, 2.0, 4.0, 2.0, 1.0, 2.0, 1.0];

/// Edge-detection kernel, divisor 1, offset 127.
const EDGE_KERNEL: [f32; 9] = [-1.0, 0.0, -1.0, 0.0, 4.0, 0.0, -1.0, 0.0, -1.0];

fn map_pixels(buffer: &mut Buffer, mut f: impl FnMut(Rgba<u8>) -> Rgba<u8>) {
    for px in buffer.image_mut().pixels_mut() {
        *px = f(*px);
    }
}

/// Remap pixels near a target color onto a new color, preserving local
/// shading.
///
/// A pixel matches when every color channel is within `tolerance` of the
/// target; its new channels are `new + (original - target)`, clamped.
/// Tolerance 0 matches exact target pixels only. Non-matching pixels are
/// left untouched.
pub fn replace_color(
    buffer: &mut Buffer,
    target: Rgb<u8>,
    new: Rgb<u8>,
    tolerance: u8,
) -> Result<()> {
    let tolerance = tolerance as i32;
    map_pixels(buffer, |px| {
        let dr = px[0] as i32 - target[0] as i32;
        let dg = px[1] as i32 - target[1] as i32;
        let db = px[2] as i32 - target[2] as i32;
        if dr.abs() <= tolerance && dg.abs() <= tolerance && db.abs() <= tolerance {
            Rgba([
                clamp_channel(new[0] as i32 + dr),
                clamp_channel(new[1] as i32 + dg),
                clamp_channel(new[2] as i32 + db),
                px[3],
            ])
        } else {
            px
        }
    });
    Ok(())
}

/// Invert every color channel (`255 - c`), preserving alpha.
///
/// Applying it twice returns the original buffer exactly.
pub fn invert(buffer: &mut Buffer) -> Result<()> {
    map_pixels(buffer, |px| {
        Rgba([255 - px[0], 255 - px[1], 255 - px[2], px[3]])
    });
    Ok(())
}

/// Replace every pixel's color channels with its luma.
pub fn grayscale(buffer: &mut Buffer) -> Result<()> {
    map_pixels(buffer, |px| {
        let gray = luma(px);
        Rgba([gray, gray, gray, px[3]])
    });
    Ok(())
}

/// Add `level` to every color channel, clamped.
///
/// `level` must be in `[-255, 255]`.
pub fn adjust_brightness(buffer: &mut Buffer, level: i32) -> Result<()> {
    if level < -255 || level > 255 {
        return Err(Error::InvalidParameter {
            op: "adjust_brightness",
            message: format!("level {} must be between -255 and 255", level),
        });
    }
    map_pixels(buffer, |px| {
        Rgba([
            clamp_channel(px[0] as i32 + level),
            clamp_channel(px[1] as i32 + level),
            clamp_channel(px[2] as i32 + level),
            px[3],
        ])
    });
    Ok(())
}

/// Scale contrast around the midpoint.
///
/// `level` must be in `[-100, 100]`. The scaling factor is
/// `((100 - level) / 100)^2` applied as
/// `c' = clamp(((c/255 - 0.5) * factor + 0.5) * 255)`, so negative levels
/// spread channels away from mid-gray and positive levels flatten them
/// toward it; level 0 is the identity.
pub fn adjust_contrast(buffer: &mut Buffer, level: i32) -> Result<()> {
    if level < -100 || level > 100 {
        return Err(Error::InvalidParameter {
            op: "adjust_contrast",
            message: format!("level {} must be between -100 and 100", level),
        });
    }
    let base = (100.0 - level as f32) / 100.0;
    let factor = base * base;
    map_pixels(buffer, |px| {
        let scale = |c: u8| {
            clamp_channel((((c as f32 / 255.0 - 0.5) * factor + 0.5) * 255.0).round() as i32)
        };
        Rgba([scale(px[0]), scale(px[1]), scale(px[2]), px[3]])
    });
    Ok(())
}

/// Additive tint: add `r`, `g`, `b` (each clamped into `[0, 255]` before
/// use) to the matching channel of every pixel.
pub fn colorize(buffer: &mut Buffer, r: i32, g: i32, b: i32) -> Result<()> {
    let r = r.clamp(0, 255);
    let g = g.clamp(0, 255);
    let b = b.clamp(0, 255);
    map_pixels(buffer, |px| {
        Rgba([
            clamp_channel(px[0] as i32 + r),
            clamp_channel(px[1] as i32 + g),
            clamp_channel(px[2] as i32 + b),
            px[3],
        ])
    });
    Ok(())
}

/// Highlight edges with a 3x3 convolution kernel
/// (`[-1 0 -1; 0 4 0; -1 0 -1]` with a +127 offset).
pub fn edge_detect(buffer: &mut Buffer) -> Result<()> {
    convolve_3x3(buffer, &EDGE_KERNEL, 1.0, 127.0);
    Ok(())
}

/// Quantize each channel to `levels` evenly spaced steps.
///
/// `levels` outside `[2, 256]` is clamped into range silently;
/// `levels = 256` (step 1) leaves channel values unchanged.
pub fn posterize(buffer: &mut Buffer, levels: u32) -> Result<()> {
    let levels = levels.clamp(2, 256);
    let step = (256 / levels) as i32;
    map_pixels(buffer, |px| {
        let quantize = |c: u8| {
            clamp_channel((c as f32 / step as f32).round() as i32 * step)
        };
        Rgba([quantize(px[0]), quantize(px[1]), quantize(px[2]), px[3]])
    });
    Ok(())
}

/// Map luma onto a two-color gradient: `c' = dark + (light - dark) * luma/255`.
pub fn duotone(buffer: &mut Buffer, dark: Rgb<u8>, light: Rgb<u8>) -> Result<()> {
    map_pixels(buffer, |px| {
        let gray = luma(px) as f32 / 255.0;
        let mix = |d: u8, l: u8| clamp_channel((d as f32 + (l as f32 - d as f32) * gray) as i32);
        Rgba([
            mix(dark[0], light[0]),
            mix(dark[1], light[1]),
            mix(dark[2], light[2]),
            px[3],
        ])
    });
    Ok(())
}

/// Desaturate every pixel except those close to the target color.
///
/// A pixel is desaturated (replaced with its luma gray) when any channel
/// differs from the target by more than `tolerance`; only near-target
/// pixels keep their saturation. Tolerance 0 spares exact matches only.
pub fn selective_desaturate(
    buffer: &mut Buffer,
    target: Rgb<u8>,
    tolerance: u8,
) -> Result<()> {
    let tolerance = tolerance as i32;
    map_pixels(buffer, |px| {
        let dr = (px[0] as i32 - target[0] as i32).abs();
        let dg = (px[1] as i32 - target[1] as i32).abs();
        let db = (px[2] as i32 - target[2] as i32).abs();
        if dr > tolerance || dg > tolerance || db > tolerance {
            let gray = luma(px);
            Rgba([gray, gray, gray, px[3]])
        } else {
            px
        }
    });
    Ok(())
}

/// Darken pixels by their distance from the image center.
///
/// `fade = clamp(1 - strength * distance / max_distance, 0, 1)` where
/// `max_distance` reaches a corner; each channel is multiplied by the fade.
/// Strength outside `[0, 1]` is not rejected; only the fade is clamped.
/// Strength 0 is the identity transform.
pub fn vignette(buffer: &mut Buffer, strength: f32) -> Result<()> {
    let cx = buffer.width() as f32 / 2.0;
    let cy = buffer.height() as f32 / 2.0;
    let max_distance = (cx * cx + cy * cy).sqrt();
    let (width, height) = (buffer.width(), buffer.height());
    let image = buffer.image_mut();
    for y in 0..height {
        for x in 0..width {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            let distance = (dx * dx + dy * dy).sqrt();
            let fade = (1.0 - strength * (distance / max_distance)).clamp(0.0, 1.0);
            let px = image.get_pixel_mut(x, y);
            px[0] = (px[0] as f32 * fade) as u8;
            px[1] = (px[1] as f32 * fade) as u8;
            px[2] = (px[2] as f32 * fade) as u8;
        }
    }
    Ok(())
}

/// Apply the fixed 3x3 Gaussian blur kernel `passes` times, compounding.
///
/// Pass counts below 1 are clamped to 1.
pub fn blur(buffer: &mut Buffer, passes: u32) -> Result<()> {
    let passes = passes.max(1);
    for _ in 0..passes {
        convolve_3x3(buffer, &GAUSSIAN_KERNEL, 16.0, 0.0);
    }
    Ok(())
}

/// 3x3 convolution over the color channels.
///
/// Reads from a snapshot of the buffer so the pass is order-independent
/// and can never half-apply. Border sampling clamps coordinates to the
/// image edge. Alpha is taken from the center pixel unchanged.
fn convolve_3x3(buffer: &mut Buffer, kernel: &[f32; 9], divisor: f32, offset: f32) {
    let source = buffer.image().clone();
    let (width, height) = (source.width(), source.height());
    let image = buffer.image_mut();
    for y in 0..height {
        for x in 0..width {
            let mut sums = [0.0f32; 3];
            for ky in 0..3i64 {
                for kx in 0..3i64 {
                    let sx = (x as i64 + kx - 1).clamp(0, width as i64 - 1) as u32;
                    let sy = (y as i64 + ky - 1).clamp(0, height as i64 - 1) as u32;
                    let weight = kernel[(ky * 3 + kx) as usize];
                    let sample = source.get_pixel(sx, sy);
                    for c in 0..3 {
                        sums[c] += sample[c] as f32 * weight;
                    }
                }
            }
            let px = image.get_pixel_mut(x, y);
            for c in 0..3 {
                px[c] = clamp_channel((sums[c] / divisor + offset).round() as i32);
            }
        }
    }
}
