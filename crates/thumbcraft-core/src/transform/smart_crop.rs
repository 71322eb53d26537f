//! Entropy-guided cropping to an aspect ratio.
//!
//! The image is narrowed a strip at a time until its width fits the ratio,
//! then shortened the same way. At each step the two opposite edge strips
//! are scored and the one with less detail is discarded, so the crop drifts
//! toward the busiest part of the picture.

use crate::entropy::entropy;
use crate::raster::{RasterImage, Region};

/// Largest strip removed per step.
const MAX_STEP: u32 = 10;

/// Which pair of strips a step compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
}

/// Region of `image` with the aspect ratio `target_width : target_height`,
/// chosen by discarding low-entropy strips.
///
/// Columns are removed first, for as long as at least one whole column is in
/// excess of the ratio; then rows, the same way. Each step removes
/// `min(excess, 10)` pixels and never empties the region. The lower scoring
/// strip goes; on a tie the right (or bottom) strip goes. The result is less
/// than one pixel away from the ratio on the reduced axis, and the other axis
/// is untouched. Returns the full image when either target side is zero.
pub fn crop_region_to_ratio(
    image: &RasterImage,
    target_width: u32,
    target_height: u32,
) -> Region {
    let (width, height) = image.dimensions();
    let mut region = Region::full(width, height);
    if target_width == 0 || target_height == 0 || region.is_empty() {
        return region;
    }

    let (tw, th) = (target_width, target_height);
    let mut steps = 0u32;
    while let Some(step) = excess_step(region.width, region.height, tw, th) {
        shave(image, &mut region, Axis::Horizontal, step);
        steps += 1;
    }
    while let Some(step) = excess_step(region.height, region.width, th, tw) {
        shave(image, &mut region, Axis::Vertical, step);
        steps += 1;
    }

    log::debug!(
        "Smart crop {width}x{height} to {target_width}:{target_height} in {steps} steps: \
         {}x{} at ({}, {})",
        region.width,
        region.height,
        region.x,
        region.y
    );
    region
}

/// Next strip thickness along one axis, or `None` once less than one whole
/// pixel is in excess.
///
/// `current : other` is compared against `current_target : other_target`.
fn excess_step(
    current: u32,
    other: u32,
    current_target: u32,
    other_target: u32,
) -> Option<u32> {
    let have = u64::from(current) * u64::from(other_target);
    let want = u64::from(other) * u64::from(current_target);
    let excess = have.checked_sub(want)? / u64::from(other_target);
    let step = excess
        .min(u64::from(MAX_STEP))
        .min(u64::from(current.saturating_sub(1)));
    (step > 0).then_some(step as u32)
}

/// Remove the lower-entropy strip of `step` pixels along `axis`.
fn shave(image: &RasterImage, region: &mut Region, axis: Axis, step: u32) {
    let (near, far) = match axis {
        Axis::Horizontal => (
            Region::new(region.x, region.y, step, region.height),
            Region::new(region.right() - step, region.y, step, region.height),
        ),
        Axis::Vertical => (
            Region::new(region.x, region.y, region.width, step),
            Region::new(region.x, region.bottom() - step, region.width, step),
        ),
    };
    let near_score = entropy(image, near);
    let far_score = entropy(image, far);
    let drop_near = near_score < far_score;
    log::trace!(
        "{axis:?} step of {step}px: near {near_score:.3} vs far {far_score:.3}, dropping {}",
        if drop_near { "near" } else { "far" }
    );

    match axis {
        Axis::Horizontal => {
            if drop_near {
                region.x += step;
            }
            region.width -= step;
        }
        Axis::Vertical => {
            if drop_near {
                region.y += step;
            }
            region.height -= step;
        }
    }
}

/// Crop `image` to [`crop_region_to_ratio`]. Pixels are copied once.
pub fn crop_to_ratio(image: &RasterImage, target_width: u32, target_height: u32) -> RasterImage {
    image.crop(crop_region_to_ratio(image, target_width, target_height))
}
