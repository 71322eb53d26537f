//! Geometry stages of the thumbnail pipeline.
//!
//! # Stage Order
//!
//! The pipeline applies these before any resampling:
//! 1. Orientation normalization (EXIF tag)
//! 2. Border trim
//! 3. Smart crop to the target aspect ratio
//!
//! # Coordinate System
//!
//! - Regions are in pixels of the image they are computed on
//! - Origin is the top-left corner
//! - Rotations are named by their clockwise/counter-clockwise direction

mod orientation;
mod smart_crop;
mod trim;

pub use orientation::{
    apply_orientation, effective_dimensions, needs_dimension_swap, normalize,
    read_orientation_metadata, Orientation,
};
pub use smart_crop::{crop_region_to_ratio, crop_to_ratio};
pub use trim::{trim_borders, trim_region, ENTROPY_THRESHOLD};
