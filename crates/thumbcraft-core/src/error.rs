//! Error taxonomy for the transform stage.
//!
//! Decode and encode failures keep their own error types
//! ([`DecodeError`](crate::decode::DecodeError),
//! [`EncodeError`](crate::encode::EncodeError)); everything the pipeline
//! itself can reject is a [`TransformError`].

use thiserror::Error;

use crate::decode::DecodeError;
use crate::encode::EncodeError;
use crate::raster::PixelMode;

/// Errors raised by pipeline stages and the raster adapter.
#[derive(Debug, Error)]
pub enum TransformError {
    /// A target geometry had a zero dimension.
    #[error("Invalid geometry: width ({width}) and height ({height}) must be non-zero")]
    InvalidGeometry { width: u32, height: u32 },

    /// The source image has no pixels.
    #[error("Empty image: {width}x{height}")]
    EmptyImage { width: u32, height: u32 },

    /// A pixel buffer did not match its declared dimensions.
    #[error("Invalid pixel data: expected {expected} bytes, got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// An alpha mask did not match the image it was applied to.
    #[error("Mask size {mask_width}x{mask_height} does not match image size {width}x{height}")]
    MaskSizeMismatch {
        mask_width: u32,
        mask_height: u32,
        width: u32,
        height: u32,
    },

    /// The requested mode conversion or operation is not supported.
    #[error("Unsupported pixel mode: cannot convert {from:?} to {to:?}")]
    UnsupportedMode { from: PixelMode, to: PixelMode },

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),
}
