//! Low-detail border removal.
//!
//! Scanned photos and screenshots often carry flat frames around the subject.
//! Each edge is eaten in thin strips for as long as the strip looks flat,
//! up to a fixed fraction of the image.

use crate::entropy::entropy;
use crate::raster::{RasterImage, Region};

/// Strips scoring below this many bits count as border.
pub const ENTROPY_THRESHOLD: f64 = 2.0;

/// No edge loses more than `dimension / MAX_TRIM_DIVISOR` pixels.
const MAX_TRIM_DIVISOR: f64 = 3.5;

const MAX_SLICE: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

impl Edge {
    /// (dimension being trimmed, orthogonal dimension)
    fn extents(self, width: u32, height: u32) -> (u32, u32) {
        match self {
            Edge::Left | Edge::Right => (width, height),
            Edge::Top | Edge::Bottom => (height, width),
        }
    }

    /// Strip of `slice` pixels just inside the edge once `offset` pixels are gone.
    fn strip(self, width: u32, height: u32, offset: u32, slice: u32) -> Region {
        let region = match self {
            Edge::Left => Region::new(offset, 0, slice, height),
            Edge::Right => {
                let x = width.saturating_sub(offset + slice);
                Region::new(x, 0, width - offset - x, height)
            }
            Edge::Top => Region::new(0, offset, width, slice),
            Edge::Bottom => {
                let y = height.saturating_sub(offset + slice);
                Region::new(0, y, width, height - offset - y)
            }
        };
        region.clamp_to(width, height)
    }
}

/// Pixels to remove from one edge.
fn edge_offset(image: &RasterImage, edge: Edge) -> u32 {
    let (width, height) = image.dimensions();
    let (dimension, orthogonal) = edge.extents(width, height);
    let limit = (dimension as f64 / MAX_TRIM_DIVISOR).floor() as u32;
    let slice = (orthogonal / 20).clamp(1, MAX_SLICE);

    let mut offset = 0;
    while offset < limit {
        let strip = edge.strip(width, height, offset, slice);
        let score = entropy(image, strip);
        if score >= ENTROPY_THRESHOLD {
            break;
        }
        log::trace!("Trimming {edge:?} strip at {offset} (entropy {score:.3})");
        offset = (offset + slice).min(limit);
    }
    offset
}

/// Region left after trimming flat borders from all four edges.
///
/// Edges are measured independently against the untrimmed image.
pub fn trim_region(image: &RasterImage) -> Region {
    let (width, height) = image.dimensions();
    let left = edge_offset(image, Edge::Left);
    let right = edge_offset(image, Edge::Right);
    let top = edge_offset(image, Edge::Top);
    let bottom = edge_offset(image, Edge::Bottom);

    let region = Region::new(
        left,
        top,
        width.saturating_sub(left + right),
        height.saturating_sub(top + bottom),
    );
    log::debug!(
        "Border trim on {width}x{height}: left {left}, right {right}, top {top}, bottom {bottom}"
    );
    region
}

/// Crop `image` to [`trim_region`].
pub fn trim_borders(image: &RasterImage) -> RasterImage {
    image.crop(trim_region(image))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use image::{GrayImage, Luma};
    use proptest::prelude::*;

    proptest! {
        /// Property: No edge loses more than floor(dimension / 3.5) pixels.
        #[test]
        fn prop_trim_never_exceeds_limit(
            (width, height) in (1u32..=80, 1u32..=80),
            (a, b, levels) in (0u32..64, 0u32..64, 1u32..=256),
        ) {
            let img = RasterImage::from_gray(GrayImage::from_fn(width, height, |x, y| {
                Luma([((x * a + y * b) % levels) as u8])
            }));
            let region = trim_region(&img);

            let x_limit = (width as f64 / 3.5).floor() as u32;
            let y_limit = (height as f64 / 3.5).floor() as u32;
            prop_assert!(region.x <= x_limit);
            prop_assert!(width - region.right() <= x_limit);
            prop_assert!(region.y <= y_limit);
            prop_assert!(height - region.bottom() <= y_limit);
            prop_assert!(!region.is_empty());
        }
    }
}
