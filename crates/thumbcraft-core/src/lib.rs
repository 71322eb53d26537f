//! Thumbcraft Core - Thumbnail transform library
//!
//! This crate turns decoded images into thumbnails: EXIF orientation,
//! entropy-based border trimming and smart cropping, colorspace
//! normalization, rounded-corner masks, padding, and JPEG/PNG encoding.
//!
//! The crate never installs a logger; stage decisions are reported through
//! the `log` facade.

pub mod colorspace;
pub mod decode;
pub mod encode;
pub mod entropy;
pub mod error;
pub mod histogram;
pub mod luminance;
pub mod mask;
pub mod options;
pub mod pipeline;
pub mod raster;
pub mod transform;

pub use colorspace::{normalize_colorspace, ColorSpace};
pub use decode::{decode, is_valid_image, read_orientation, DecodeError};
pub use encode::{encode, EncodeError, EncodeOptions, OutputFormat};
pub use entropy::entropy;
pub use error::TransformError;
pub use options::{Color, CropMode, TransformOptions};
pub use pipeline::{thumbnail, transform};
pub use raster::{Geometry, ImageMetadata, MetadataValue, Palette, PixelMode, RasterImage, Region};
pub use transform::Orientation;
