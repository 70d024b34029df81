//! Integration tests for the manipulator facade
//!
//! These drive real encoded bytes end to end: decode, transform through the
//! public API, re-encode, and decode again to check what actually landed in
//! the output container.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgb, Rgba, RgbaImage};
use rastermod::{Error, FlipMode, ImageKind, Manipulator};

// ============================================================================
// Test Utilities
// ============================================================================

/// Encode an RGBA image to bytes in the given container format.
fn encoded_bytes(image: RgbaImage, format: ImageFormat) -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(image)
        .write_to(&mut Cursor::new(&mut bytes), format)
        .unwrap();
    bytes
}

/// A 4x4 checkerboard of two colors, PNG-encoded.
fn checkerboard_png(a: Rgba<u8>, b: Rgba<u8>) -> Vec<u8> {
    let mut image = RgbaImage::new(4, 4);
    for y in 0..4 {
        for x in 0..4 {
            image.put_pixel(x, y, if (x + y) % 2 == 0 { a } else { b });
        }
    }
    encoded_bytes(image, ImageFormat::Png)
}

// ============================================================================
// Loading and format detection
// ============================================================================

#[test]
fn test_detects_kind_from_bytes_not_extension() {
    let png = encoded_bytes(
        RgbaImage::from_pixel(2, 2, Rgba([10, 20, 30, 255])),
        ImageFormat::Png,
    );
    let gif = encoded_bytes(
        RgbaImage::from_pixel(2, 2, Rgba([10, 20, 30, 255])),
        ImageFormat::Gif,
    );
    assert_eq!(
        Manipulator::from_bytes(&png).unwrap().kind().unwrap(),
        ImageKind::Png
    );
    assert_eq!(
        Manipulator::from_bytes(&gif).unwrap().kind().unwrap(),
        ImageKind::Gif
    );
}

#[test]
fn test_rejects_unsupported_container() {
    let bmp = encoded_bytes(
        RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 255])),
        ImageFormat::Bmp,
    );
    assert!(matches!(
        Manipulator::from_bytes(&bmp),
        Err(Error::UnsupportedFormat(_))
    ));
}

#[test]
fn test_open_missing_path_is_file_not_found() {
    assert!(matches!(
        Manipulator::open("/definitely/not/here.gif"),
        Err(Error::FileNotFound(_))
    ));
}

// ============================================================================
// Transform pipelines
// ============================================================================

#[test]
fn test_grayscale_then_invert_is_inverted_luma() {
    // luma(200, 100, 50) = (30*200 + 59*100 + 11*50) / 100 = 124
    let bytes = checkerboard_png(Rgba([200, 100, 50, 255]), Rgba([0, 0, 0, 255]));
    let mut m = Manipulator::from_bytes(&bytes).unwrap();
    m.grayscale().unwrap();
    m.invert().unwrap();
    assert_eq!(m.get_pixel(0, 0).unwrap(), Rgba([131, 131, 131, 255]));
    assert_eq!(m.get_pixel(1, 0).unwrap(), Rgba([255, 255, 255, 255]));
}

#[test]
fn test_rotate_there_and_back_restores_pixels() {
    let mut image = RgbaImage::new(2, 3);
    for y in 0..3 {
        for x in 0..2 {
            image.put_pixel(x, y, Rgba([(x * 90) as u8, (y * 70) as u8, 5, 255]));
        }
    }
    let bytes = encoded_bytes(image.clone(), ImageFormat::Png);
    let mut m = Manipulator::from_bytes(&bytes).unwrap();

    m.rotate(90.0).unwrap();
    assert_eq!(m.width().unwrap(), 3);
    assert_eq!(m.height().unwrap(), 2);
    m.rotate(-90.0).unwrap();
    assert_eq!(m.width().unwrap(), 2);
    assert_eq!(m.height().unwrap(), 3);
    for y in 0..3 {
        for x in 0..2 {
            assert_eq!(m.get_pixel(x, y).unwrap(), *image.get_pixel(x, y));
        }
    }
}

#[test]
fn test_crop_then_downscale_dimensions() {
    let bytes = encoded_bytes(
        RgbaImage::from_pixel(20, 20, Rgba([50, 60, 70, 255])),
        ImageFormat::Png,
    );
    let mut m = Manipulator::from_bytes(&bytes).unwrap();
    m.crop(2, 2, 10, 10).unwrap();
    assert_eq!(m.width().unwrap(), 10);
    m.downscale(0.5).unwrap();
    assert_eq!(m.width().unwrap(), 5);
    assert_eq!(m.height().unwrap(), 5);
}

#[test]
fn test_flip_mode_parses_and_applies() {
    let mut image = RgbaImage::from_pixel(2, 1, Rgba([0, 0, 0, 255]));
    image.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
    let bytes = encoded_bytes(image, ImageFormat::Png);
    let mut m = Manipulator::from_bytes(&bytes).unwrap();

    let mode: FlipMode = "horizontal".parse().unwrap();
    m.flip(mode).unwrap();
    assert_eq!(m.get_pixel(1, 0).unwrap(), Rgba([255, 0, 0, 255]));
    assert_eq!(m.get_pixel(0, 0).unwrap(), Rgba([0, 0, 0, 255]));

    assert!("sideways".parse::<FlipMode>().is_err());
}

#[test]
fn test_replace_color_through_facade() {
    let bytes = checkerboard_png(Rgba([100, 100, 100, 255]), Rgba([0, 0, 0, 255]));
    let mut m = Manipulator::from_bytes(&bytes).unwrap();
    m.replace_color(Rgb([100, 100, 100]), Rgb([0, 0, 200]), 10)
        .unwrap();
    assert_eq!(m.get_pixel(0, 0).unwrap(), Rgba([0, 0, 200, 255]));
    // Black is far outside tolerance and stays black.
    assert_eq!(m.get_pixel(1, 0).unwrap(), Rgba([0, 0, 0, 255]));
}

#[test]
fn test_conventional_parameters_run_a_full_pipeline() {
    use rastermod::transforms::{
        DEFAULT_BLUR_PASSES, DEFAULT_DESATURATE_TOLERANCE, DEFAULT_HALFTONE_DOT_SIZE,
        DEFAULT_POSTERIZE_LEVELS, DEFAULT_VIGNETTE_STRENGTH, DEFAULT_WAVE_AMPLITUDE,
        DEFAULT_WAVE_FREQUENCY,
    };

    let bytes = encoded_bytes(
        RgbaImage::from_pixel(12, 12, Rgba([180, 90, 45, 255])),
        ImageFormat::Png,
    );
    let mut m = Manipulator::from_bytes(&bytes).unwrap();
    m.blur(DEFAULT_BLUR_PASSES).unwrap();
    m.posterize(DEFAULT_POSTERIZE_LEVELS).unwrap();
    m.selective_desaturate(Rgb([180, 90, 45]), DEFAULT_DESATURATE_TOLERANCE)
        .unwrap();
    m.vignette(DEFAULT_VIGNETTE_STRENGTH).unwrap();
    m.wave(DEFAULT_WAVE_AMPLITUDE, DEFAULT_WAVE_FREQUENCY).unwrap();
    m.halftone(DEFAULT_HALFTONE_DOT_SIZE).unwrap();
    assert_eq!(m.width().unwrap(), 12);
    assert_eq!(m.height().unwrap(), 12);
}

// ============================================================================
// Pixel access bounds
// ============================================================================

#[test]
fn test_set_pixel_color_bounds() {
    let bytes = checkerboard_png(Rgba([1, 1, 1, 255]), Rgba([2, 2, 2, 255]));
    let mut m = Manipulator::from_bytes(&bytes).unwrap();
    let width = m.width().unwrap();
    let height = m.height().unwrap();

    let err = m.set_pixel_color(width, 0, 9, 9, 9, 255).unwrap_err();
    assert!(matches!(err, Error::OutOfBounds { .. }));

    m.set_pixel_color(width - 1, height - 1, 9, 9, 9, 255)
        .unwrap();
    assert_eq!(
        m.get_pixel(width - 1, height - 1).unwrap(),
        Rgba([9, 9, 9, 255])
    );
}

#[test]
fn test_jpeg_pixels_report_zero_alpha() {
    let bytes = encoded_bytes(
        RgbaImage::from_pixel(2, 2, Rgba([128, 128, 128, 255])),
        ImageFormat::Jpeg,
    );
    let mut m = Manipulator::from_bytes(&bytes).unwrap();
    assert_eq!(m.get_pixel(0, 0).unwrap()[3], 0);
    // Requested alpha is ignored for non-alpha formats.
    m.set_pixel_color(0, 0, 1, 2, 3, 200).unwrap();
    assert_eq!(m.get_pixel(0, 0).unwrap(), Rgba([1, 2, 3, 0]));
}

// ============================================================================
// Output boundary
// ============================================================================

#[test]
fn test_data_uri_prefix_matches_loaded_format() {
    for (format, prefix) in [
        (ImageFormat::Png, "data:image/png;base64,"),
        (ImageFormat::Jpeg, "data:image/jpeg;base64,"),
        (ImageFormat::Gif, "data:image/gif;base64,"),
    ] {
        let bytes = encoded_bytes(
            RgbaImage::from_pixel(2, 2, Rgba([128, 64, 32, 255])),
            format,
        );
        let m = Manipulator::from_bytes(&bytes).unwrap();
        let uri = m.to_data_uri().unwrap();
        assert!(uri.starts_with(prefix), "unexpected uri: {}", uri);
        assert!(uri.len() > prefix.len());
    }
}

#[test]
fn test_save_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.png");

    let bytes = checkerboard_png(Rgba([210, 20, 20, 255]), Rgba([20, 20, 210, 128]));
    let mut m = Manipulator::from_bytes(&bytes).unwrap();
    m.flip(FlipMode::Vertical).unwrap();
    m.save(&path).unwrap();

    let reloaded = Manipulator::open(&path).unwrap();
    assert_eq!(reloaded.kind().unwrap(), ImageKind::Png);
    assert_eq!(reloaded.width().unwrap(), 4);
    for y in 0..4 {
        for x in 0..4 {
            assert_eq!(
                reloaded.get_pixel(x, y).unwrap(),
                m.get_pixel(x, y).unwrap()
            );
        }
    }
}

#[test]
fn test_gif_output_is_opaque_and_reloadable() {
    let bytes = encoded_bytes(
        RgbaImage::from_pixel(3, 3, Rgba([200, 0, 0, 255])),
        ImageFormat::Gif,
    );
    let mut m = Manipulator::from_bytes(&bytes).unwrap();
    m.invert().unwrap();
    let out = m.encode().unwrap();

    let reloaded = Manipulator::from_bytes(&out).unwrap();
    assert_eq!(reloaded.kind().unwrap(), ImageKind::Gif);
    assert_eq!(reloaded.width().unwrap(), 3);
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn test_everything_fails_after_destroy() {
    let bytes = checkerboard_png(Rgba([1, 1, 1, 255]), Rgba([2, 2, 2, 255]));
    let mut m = Manipulator::from_bytes(&bytes).unwrap();
    m.destroy();

    assert!(matches!(m.grayscale(), Err(Error::NoImageLoaded)));
    assert!(matches!(m.rotate(90.0), Err(Error::NoImageLoaded)));
    assert!(matches!(m.crop(0, 0, 1, 1), Err(Error::NoImageLoaded)));
    assert!(matches!(m.get_pixel(0, 0), Err(Error::NoImageLoaded)));
    assert!(matches!(m.kind(), Err(Error::NoImageLoaded)));
    assert!(matches!(
        m.save("/tmp/never-written.png"),
        Err(Error::NoImageLoaded)
    ));
    assert!(matches!(m.to_data_uri(), Err(Error::NoImageLoaded)));

    // destroy is idempotent
    m.destroy();
}
