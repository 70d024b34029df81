//! Codec boundary: decoding bytes into buffers and encoding buffers back
//!
//! Container parsing lives entirely in the `image` crate; this module only
//! sniffs the media type, enforces the jpeg/png/gif allowlist, and applies
//! the per-format encode rules (JPEG at maximum quality, PNG with exact
//! stored alpha, GIF as a single opaque frame).

use base64::Engine;
use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ColorType, DynamicImage, Frame, ImageEncoder, ImageFormat};

use crate::buffer::Buffer;
use crate::color::PixelFormat;
use crate::error::{Error, Result};

/// Supported container formats, mapped to media types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Gif,
}

impl ImageKind {
    /// The media type this kind was detected from and encodes to.
    pub fn media_type(self) -> &'static str {
        match self {
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Png => "image/png",
            ImageKind::Gif => "image/gif",
        }
    }

    /// Map a media type back to a kind; anything outside the supported set
    /// is `None`.
    pub fn from_media_type(media_type: &str) -> Option<ImageKind> {
        match media_type {
            "image/jpeg" => Some(ImageKind::Jpeg),
            "image/png" => Some(ImageKind::Png),
            "image/gif" => Some(ImageKind::Gif),
            _ => None,
        }
    }

    /// Pixel format buffers of this kind use: only PNG carries alpha.
    pub fn pixel_format(self) -> PixelFormat {
        match self {
            ImageKind::Png => PixelFormat::Rgba,
            ImageKind::Jpeg | ImageKind::Gif => PixelFormat::Rgb,
        }
    }

    fn from_container(format: ImageFormat) -> Option<ImageKind> {
        match format {
            ImageFormat::Jpeg => Some(ImageKind::Jpeg),
            ImageFormat::Png => Some(ImageKind::Png),
            ImageFormat::Gif => Some(ImageKind::Gif),
            _ => None,
        }
    }
}

impl std::fmt::Display for ImageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.media_type())
    }
}

/// Decode raw bytes into a buffer plus the detected kind.
///
/// Media types outside jpeg/png/gif are rejected here, before any transform
/// can run on the data.
pub fn decode(bytes: &[u8]) -> Result<(Buffer, ImageKind)> {
    let format = image::guess_format(bytes).map_err(Error::Decode)?;
    let kind = ImageKind::from_container(format)
        .ok_or_else(|| Error::UnsupportedFormat(format!("{:?}", format)))?;
    let decoded = image::load_from_memory_with_format(bytes, format).map_err(Error::Decode)?;
    let buffer = Buffer::from_image(decoded.to_rgba8(), kind.pixel_format());
    Ok((buffer, kind))
}

/// Encode a buffer per the detected kind.
pub fn encode(buffer: &Buffer, kind: ImageKind) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    match kind {
        ImageKind::Jpeg => {
            // JPEG carries no alpha; encode the RGB view at maximum quality.
            let rgb = DynamicImage::ImageRgba8(buffer.image().clone()).to_rgb8();
            let encoder = JpegEncoder::new_with_quality(&mut bytes, 100);
            encoder
                .write_image(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)
                .map_err(Error::Encode)?;
        }
        ImageKind::Png => {
            // Stored alpha is written exactly, without blending onto a
            // background.
            let encoder =
                PngEncoder::new_with_quality(&mut bytes, CompressionType::Fast, FilterType::NoFilter);
            encoder
                .write_image(
                    buffer.image().as_raw(),
                    buffer.width(),
                    buffer.height(),
                    ColorType::Rgba8,
                )
                .map_err(Error::Encode)?;
        }
        ImageKind::Gif => {
            // Single frame, no quality or alpha parameters. Stored zero
            // alpha must not leak out as transparency, so encode opaque.
            let mut opaque = buffer.image().clone();
            for px in opaque.pixels_mut() {
                px[3] = 255;
            }
            let mut encoder = GifEncoder::new(&mut bytes);
            encoder.encode_frame(Frame::new(opaque)).map_err(Error::Encode)?;
        }
    }
    Ok(bytes)
}

/// Render encoded bytes as a base64 data URI tagged with the kind's
/// media type, e.g. `data:image/png;base64,...`.
pub fn data_uri(bytes: &[u8], kind: ImageKind) -> String {
    format!(
        "data:{};base64,{}",
        kind.media_type(),
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}
