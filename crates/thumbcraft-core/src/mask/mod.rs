//! Shape masks for thumbnail alpha.
//!
//! ## Mask Types
//!
//! - **Rounded corners**: an opaque rectangle with a quarter-disc cut out of
//!   each corner, built from a single corner tile rotated into place
//!
//! ## Algorithm
//!
//! Masks are 8-bit grayscale: 255 keeps a pixel, 0 makes it transparent.
//! A pixel belongs to the disc when its centre lies within the radius.

mod rounded;

pub use rounded::{apply_rounded_corners, clamp_radius, corner, rounded_corner_mask};
