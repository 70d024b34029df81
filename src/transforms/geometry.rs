//! Geometric transform engine: shape-domain operations
//!
//! Every operation here allocates a new buffer (pre-filled per the format
//! policy where corners or edges can stay uncovered), populates it from the
//! source, and returns it for the caller to swap in atomically. The source
//! buffer is never mutated.

use std::str::FromStr;

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use crate::buffer::Buffer;
use crate::color::luma_f32;
use crate::error::{Error, Result};

/// Default amplitude for [`wave`].
pub const DEFAULT_WAVE_AMPLITUDE: f32 = 5.0;
/// Default frequency for [`wave`].
pub const DEFAULT_WAVE_FREQUENCY: f32 = 0.05;
/// Default cell size for [`halftone`].
pub const DEFAULT_HALFTONE_DOT_SIZE: u32 = 6;

/// Mirror axis for [`flip`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipMode {
    /// Mirror columns: `x' = width - 1 - x`.
    Horizontal,
    /// Mirror rows: `y' = height - 1 - y`.
    Vertical,
    /// Mirror both axes (a 180-degree point reflection).
    Both,
}

impl FromStr for FlipMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "horizontal" => Ok(FlipMode::Horizontal),
            "vertical" => Ok(FlipMode::Vertical),
            "both" => Ok(FlipMode::Both),
            _ => Err(Error::InvalidParameter {
                op: "flip",
                message: format!(
                    "unrecognized mode '{}', use 'horizontal', 'vertical', or 'both'",
                    s
                ),
            }),
        }
    }
}

/// Cut a rectangular region out of the buffer.
///
/// `x` and `y` are clamped to 0 and `width`/`height` are clamped to the
/// remaining extent rather than erroring. A region that ends up with no
/// area yields `None`, which callers treat as a no-op.
pub fn crop(buffer: &Buffer, x: i64, y: i64, width: i64, height: i64) -> Option<Buffer> {
    let x = x.max(0);
    let y = y.max(0);
    let width = width.min(buffer.width() as i64 - x);
    let height = height.min(buffer.height() as i64 - y);
    if width <= 0 || height <= 0 {
        return None;
    }

    let (x, y) = (x as u32, y as u32);
    let (width, height) = (width as u32, height as u32);
    let mut out = Buffer::blank(width, height, buffer.format());
    let src = buffer.image();
    let dst = out.image_mut();
    for dy in 0..height {
        for dx in 0..width {
            dst.put_pixel(dx, dy, *src.get_pixel(x + dx, y + dy));
        }
    }
    Some(out)
}

/// Shrink the buffer by `factor` with area-weighted quality resampling
/// (never nearest-neighbor, to avoid aliasing).
///
/// `factor` must be strictly between 0 and 1; the new size is
/// `round(dimension * factor)` per axis.
pub fn downscale(buffer: &Buffer, factor: f32) -> Result<Buffer> {
    if !(factor > 0.0 && factor < 1.0) {
        return Err(Error::InvalidParameter {
            op: "downscale",
            message: format!("scale factor {} must be between 0 and 1", factor),
        });
    }
    let new_width = (buffer.width() as f32 * factor).round() as u32;
    let new_height = (buffer.height() as f32 * factor).round() as u32;
    if new_width == 0 || new_height == 0 {
        return Err(Error::OperationFailed {
            op: "downscale",
            message: format!("scaled dimensions {}x{} are empty", new_width, new_height),
        });
    }
    let resized = imageops::resize(buffer.image(), new_width, new_height, FilterType::Triangle);
    Ok(Buffer::from_image(resized, buffer.format()))
}

/// Rotate the image by `angle_degrees`, clockwise-positive.
///
/// The canvas expands to the rotated bounding box; corners the source does
/// not cover stay at the blank pre-fill (transparent for alpha formats,
/// opaque black otherwise). Multiples of 90 degrees map pixels exactly;
/// other angles resample bilinearly.
pub fn rotate(buffer: &Buffer, angle_degrees: f32) -> Result<Buffer> {
    // The primitive below rotates counter-clockwise for positive angles,
    // so the clockwise-positive public angle is negated first.
    rotate_ccw(buffer, -angle_degrees)
}

fn rotate_ccw(buffer: &Buffer, angle_degrees: f32) -> Result<Buffer> {
    let normalized = angle_degrees.rem_euclid(360.0);

    if let Some(turns) = quarter_turns(normalized) {
        // imageops rotations are clockwise, so k counter-clockwise quarter
        // turns are 4 - k clockwise ones.
        let rotated = match turns {
            1 => imageops::rotate270(buffer.image()),
            2 => imageops::rotate180(buffer.image()),
            3 => imageops::rotate90(buffer.image()),
            _ => buffer.image().clone(),
        };
        return Ok(Buffer::from_image(rotated, buffer.format()));
    }

    let radians = normalized.to_radians();
    let (sin, cos) = radians.sin_cos();
    let src_w = buffer.width() as f32;
    let src_h = buffer.height() as f32;
    let new_width = (src_w * cos.abs() + src_h * sin.abs()).ceil() as u32;
    let new_height = (src_w * sin.abs() + src_h * cos.abs()).ceil() as u32;
    if new_width == 0 || new_height == 0 {
        return Err(Error::OperationFailed {
            op: "rotate",
            message: "rotation produced an empty image".to_string(),
        });
    }

    let mut out = Buffer::blank(new_width, new_height, buffer.format());
    let src = buffer.image();
    let dst = out.image_mut();
    let (cx, cy) = (src_w / 2.0, src_h / 2.0);
    let (ncx, ncy) = (new_width as f32 / 2.0, new_height as f32 / 2.0);

    for y in 0..new_height {
        for x in 0..new_width {
            // Inverse-map the destination pixel center back into the source.
            let rx = x as f32 + 0.5 - ncx;
            let ry = y as f32 + 0.5 - ncy;
            let sx = cos * rx - sin * ry + cx - 0.5;
            let sy = sin * rx + cos * ry + cy - 0.5;
            if sx >= 0.0 && sx <= src_w - 1.0 && sy >= 0.0 && sy <= src_h - 1.0 {
                dst.put_pixel(x, y, bilinear(src, sx, sy));
            }
        }
    }
    Ok(out)
}

/// Counter-clockwise quarter turns for angles that are exact multiples
/// of 90 degrees (within a small epsilon), after normalization to
/// `[0, 360)`.
fn quarter_turns(normalized: f32) -> Option<u32> {
    const EPSILON: f32 = 1e-3;
    for (angle, turns) in [(0.0, 0), (90.0, 1), (180.0, 2), (270.0, 3), (360.0, 0)] {
        if (normalized - angle).abs() < EPSILON {
            return Some(turns);
        }
    }
    None
}

fn bilinear(image: &RgbaImage, sx: f32, sy: f32) -> Rgba<u8> {
    let x0 = sx.floor() as u32;
    let y0 = sy.floor() as u32;
    let x1 = (x0 + 1).min(image.width() - 1);
    let y1 = (y0 + 1).min(image.height() - 1);
    let fx = sx - x0 as f32;
    let fy = sy - y0 as f32;

    let p00 = image.get_pixel(x0, y0);
    let p10 = image.get_pixel(x1, y0);
    let p01 = image.get_pixel(x0, y1);
    let p11 = image.get_pixel(x1, y1);

    let mut out = [0u8; 4];
    for c in 0..4 {
        let top = p00[c] as f32 * (1.0 - fx) + p10[c] as f32 * fx;
        let bottom = p01[c] as f32 * (1.0 - fx) + p11[c] as f32 * fx;
        out[c] = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
    }
    Rgba(out)
}

/// Mirror the buffer along the given axis or axes.
pub fn flip(buffer: &Buffer, mode: FlipMode) -> Buffer {
    let (width, height) = (buffer.width(), buffer.height());
    let mut out = Buffer::blank(width, height, buffer.format());
    let src = buffer.image();
    let dst = out.image_mut();
    for y in 0..height {
        for x in 0..width {
            let px = *src.get_pixel(x, y);
            match mode {
                FlipMode::Horizontal => dst.put_pixel(width - 1 - x, y, px),
                FlipMode::Vertical => dst.put_pixel(x, height - 1 - y, px),
                FlipMode::Both => dst.put_pixel(width - 1 - x, height - 1 - y, px),
            }
        }
    }
    out
}

/// Displace each row horizontally along a sine wave.
///
/// Row `y` shifts by `round(sin(y * frequency) * amplitude)` pixels;
/// positions whose source falls outside the image stay at the blank
/// pre-fill, so displaced rows expose blank edges (no clamping, no
/// wrapping).
pub fn wave(buffer: &Buffer, amplitude: f32, frequency: f32) -> Buffer {
    let (width, height) = (buffer.width(), buffer.height());
    let mut out = Buffer::blank(width, height, buffer.format());
    let src = buffer.image();
    let dst = out.image_mut();
    for y in 0..height {
        let offset = ((y as f32 * frequency).sin() * amplitude).round() as i64;
        for x in 0..width {
            let sx = x as i64 - offset;
            if sx >= 0 && sx < width as i64 {
                dst.put_pixel(x, y, *src.get_pixel(sx as u32, y));
            }
        }
    }
    out
}

/// Replace each `block_size x block_size` cell with its average color.
///
/// Dimensions are unchanged; cells clipped by the right/bottom edge
/// average over their visible pixels only.
pub fn pixelate(buffer: &Buffer, block_size: u32) -> Result<Buffer> {
    if block_size < 1 {
        return Err(Error::InvalidParameter {
            op: "pixelate",
            message: format!("block size {} must be 1 or greater", block_size),
        });
    }
    let (width, height) = (buffer.width(), buffer.height());
    let mut out = Buffer::blank(width, height, buffer.format());
    let src = buffer.image();
    let dst = out.image_mut();
    for by in (0..height).step_by(block_size as usize) {
        for bx in (0..width).step_by(block_size as usize) {
            let end_x = (bx + block_size).min(width);
            let end_y = (by + block_size).min(height);

            let mut sums = [0u64; 4];
            let mut samples = 0u64;
            for y in by..end_y {
                for x in bx..end_x {
                    let px = src.get_pixel(x, y);
                    for c in 0..4 {
                        sums[c] += px[c] as u64;
                    }
                    samples += 1;
                }
            }
            let average = Rgba([
                ((sums[0] as f64 / samples as f64).round()) as u8,
                ((sums[1] as f64 / samples as f64).round()) as u8,
                ((sums[2] as f64 / samples as f64).round()) as u8,
                ((sums[3] as f64 / samples as f64).round()) as u8,
            ]);
            for y in by..end_y {
                for x in bx..end_x {
                    dst.put_pixel(x, y, average);
                }
            }
        }
    }
    Ok(out)
}

/// Render the image as a grid of black halftone dots.
///
/// Each `dot_size x dot_size` cell becomes a filled black circle of radius
/// `dot_size * (1 - avg_luma / 255) / 2` centered in the cell, drawn on
/// paper pre-fill (transparent for alpha formats, white otherwise). Darker
/// cells get larger dots; pure white cells get none. Dots are always black
/// regardless of the original hue.
pub fn halftone(buffer: &Buffer, dot_size: u32) -> Result<Buffer> {
    if dot_size < 1 {
        return Err(Error::InvalidParameter {
            op: "halftone",
            message: format!("dot size {} must be 1 or greater", dot_size),
        });
    }
    let (width, height) = (buffer.width(), buffer.height());
    let format = buffer.format();
    let mut out = Buffer::blank(width, height, format);
    out.fill(format.paper_fill());
    let ink = format.allocate(0, 0, 0, 255);

    let src = buffer.image();
    let dst = out.image_mut();
    for by in (0..height).step_by(dot_size as usize) {
        for bx in (0..width).step_by(dot_size as usize) {
            let end_x = (bx + dot_size).min(width);
            let end_y = (by + dot_size).min(height);

            let mut gray = 0.0f32;
            let mut samples = 0u32;
            for y in by..end_y {
                for x in bx..end_x {
                    gray += luma_f32(*src.get_pixel(x, y));
                    samples += 1;
                }
            }
            gray /= samples as f32;
            let radius = dot_size as f32 * (1.0 - gray / 255.0) / 2.0;
            if radius <= 0.0 {
                continue;
            }

            let center_x = bx as f32 + dot_size as f32 / 2.0;
            let center_y = by as f32 + dot_size as f32 / 2.0;
            for y in by..end_y {
                for x in bx..end_x {
                    let dx = x as f32 + 0.5 - center_x;
                    let dy = y as f32 + 0.5 - center_y;
                    if dx * dx + dy * dy <= radius * radius {
                        dst.put_pixel(x, y, ink);
                    }
                }
            }
        }
    }
    Ok(out)
}
