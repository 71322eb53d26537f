//! Raster image model and pixel primitives.
//!
//! This module wraps the `image` crate behind the small surface the
//! transform stages need:
//! - [`RasterImage`]: pixels + optional palette + metadata
//! - [`Region`] and [`Geometry`]: rectangles and target sizes
//! - crop, paste, resize, rotate, flip, blur and mode conversion
//!
//! # Coordinate System
//!
//! - Origin is the top-left corner
//! - Regions are `(x, y, width, height)` in whole pixels
//! - Every operation returns a new image; inputs are never modified

mod ops;
mod types;

pub(crate) use ops::eight_bit;
pub use ops::Rotation;
pub use types::{
    FilterType, Geometry, ImageMetadata, MetadataValue, Palette, PixelMode, RasterImage, Region,
    ICC_PROFILE_KEY, ORIENTATION_KEY,
};
