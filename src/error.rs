//! Error taxonomy for load, transform, and encode failures
//!
//! Every failure is synchronous and non-recoverable at the point of call:
//! there is no internal retry, and a failed operation leaves the buffer
//! exactly as it was before the call.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the manipulator, the transform engines, and the
/// codec boundary.
#[derive(Debug, Error)]
pub enum Error {
    /// Source path unavailable at load time.
    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    /// Media type outside jpeg/png/gif, rejected before any transform runs.
    #[error("unsupported image type: {0}")]
    UnsupportedFormat(String),

    /// Operation invoked before load or after destroy.
    #[error("no image loaded")]
    NoImageLoaded,

    /// Pixel coordinate outside `[0, width) x [0, height)`.
    #[error("coordinates ({x}, {y}) out of bounds for {width}x{height} image")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    /// Parameter outside its documented domain.
    #[error("invalid parameter for {op}: {message}")]
    InvalidParameter { op: &'static str, message: String },

    /// An underlying filter/resample/rotation primitive could not complete.
    #[error("{op} failed: {message}")]
    OperationFailed { op: &'static str, message: String },

    /// Codec failure while decoding bytes into a buffer.
    #[error("decode error: {0}")]
    Decode(#[source] image::ImageError),

    /// Codec failure while encoding a buffer back to bytes.
    #[error("encode error: {0}")]
    Encode(#[source] image::ImageError),

    /// IO error at the load/save boundary.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds_message_names_coordinates() {
        let err = Error::OutOfBounds {
            x: 4,
            y: 0,
            width: 4,
            height: 4,
        };
        assert_eq!(
            err.to_string(),
            "coordinates (4, 0) out of bounds for 4x4 image"
        );
    }

    #[test]
    fn test_invalid_parameter_message_names_operation() {
        let err = Error::InvalidParameter {
            op: "downscale",
            message: "factor must be between 0 and 1".to_string(),
        };
        assert!(err.to_string().contains("downscale"));
        assert!(err.to_string().contains("between 0 and 1"));
    }
}
