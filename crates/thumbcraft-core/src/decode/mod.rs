//! Image decoding for the transform stage.
//!
//! This module provides:
//! - Decoding any compiled-in format into a [`RasterImage`](crate::raster::RasterImage)
//! - Capturing the embedded ICC profile and raw EXIF orientation as metadata
//! - A validity probe that never errors
//!
//! Orientation is *recorded*, not applied. The pipeline normalizes it so
//! crop math happens in display space.

mod exif;
mod reader;

use thiserror::Error;

pub use exif::read_orientation;
pub use reader::{decode, is_valid_image};

/// Error types for image decoding operations.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The file format is not recognized or supported.
    #[error("Invalid or unsupported image format")]
    InvalidFormat,

    /// The image file is corrupted or incomplete.
    #[error("Corrupted or incomplete image file: {0}")]
    CorruptedFile(String),

    /// I/O error while reading the source bytes.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl DecodeError {
    fn from_image(err: image::ImageError) -> Self {
        match err {
            image::ImageError::Unsupported(_) => DecodeError::InvalidFormat,
            image::ImageError::IoError(e) => DecodeError::IoError(e),
            other => DecodeError::CorruptedFile(other.to_string()),
        }
    }
}
