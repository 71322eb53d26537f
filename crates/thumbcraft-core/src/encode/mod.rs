//! Image encoding for finished thumbnails.
//!
//! This module provides:
//! - JPEG and PNG output with configurable quality
//! - ICC profile pass-through
//! - A single fallback retry without optimization and profile when the
//!   first attempt fails with an I/O-class error
//!
//! # Examples
//!
//! ```ignore
//! use thumbcraft_core::encode::{encode, EncodeOptions, OutputFormat};
//!
//! let bytes = encode(&image, &EncodeOptions::new(OutputFormat::Jpeg, 85))?;
//! ```

mod writer;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use writer::encode;

/// Errors that can occur during encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// Writing the encoded stream failed
    #[error("I/O error while encoding: {0}")]
    Io(#[from] std::io::Error),

    /// The encoder refused the ICC profile
    #[error("ICC profile rejected: {0}")]
    ProfileRejected(String),

    /// Encoding failed
    #[error("{format:?} encoding failed: {message}")]
    EncodingFailed {
        format: OutputFormat,
        message: String,
    },
}

impl EncodeError {
    /// True for failures worth one retry with conservative options.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, EncodeError::Io(_) | EncodeError::ProfileRejected(_))
    }
}

/// Target encoding format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OutputFormat {
    /// Lossy, no alpha channel.
    #[default]
    Jpeg,
    /// Lossless, alpha-capable.
    Png,
}

impl OutputFormat {
    pub fn supports_alpha(self) -> bool {
        match self {
            OutputFormat::Jpeg => false,
            OutputFormat::Png => true,
        }
    }

    pub fn is_lossy(self) -> bool {
        matches!(self, OutputFormat::Jpeg)
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
        }
    }
}

/// Parameters for one encode call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeOptions {
    pub format: OutputFormat,
    /// Lossy quality, 1-100. Ignored by PNG.
    pub quality: u8,
    /// Spend extra effort on compression (PNG: best compression).
    pub optimize: bool,
    /// Profile to embed in the output.
    pub icc_profile: Option<Vec<u8>>,
}

impl EncodeOptions {
    pub fn new(format: OutputFormat, quality: u8) -> Self {
        Self {
            format,
            quality: quality.clamp(1, 100),
            optimize: true,
            icc_profile: None,
        }
    }

    pub fn with_icc_profile(mut self, profile: Option<Vec<u8>>) -> Self {
        self.icc_profile = profile;
        self
    }

    /// The conservative variant used for the fallback attempt.
    pub fn without_extras(&self) -> Self {
        Self {
            optimize: false,
            icc_profile: None,
            ..self.clone()
        }
    }

    fn has_extras(&self) -> bool {
        self.optimize || self.icc_profile.is_some()
    }
}
