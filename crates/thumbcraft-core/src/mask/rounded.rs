//! Rounded-corner mask.

use image::imageops;
use image::{GrayImage, Luma};

use crate::error::TransformError;
use crate::raster::{PixelMode, RasterImage};

const OPAQUE: u8 = 255;
const CLEAR: u8 = 0;

/// Top-left corner tile of side `radius`.
///
/// Pixels whose centre lies within `radius` of the tile's bottom-right
/// corner are opaque; the rest are clear.
pub fn corner(radius: u32) -> GrayImage {
    let r = radius as f64;
    GrayImage::from_fn(radius, radius, |x, y| {
        let dx = x as f64 + 0.5 - r;
        let dy = y as f64 + 0.5 - r;
        Luma([if dx * dx + dy * dy <= r * r { OPAQUE } else { CLEAR }])
    })
}

/// Largest radius that keeps the four corners from overlapping.
#[inline]
pub fn clamp_radius(width: u32, height: u32, radius: u32) -> u32 {
    radius.min(width.min(height) / 2)
}

/// Opaque `width x height` mask with all four corners rounded.
///
/// `radius` is clamped with [`clamp_radius`]; radius 0 gives a fully
/// opaque mask.
pub fn rounded_corner_mask(width: u32, height: u32, radius: u32) -> GrayImage {
    let mut mask = GrayImage::from_pixel(width, height, Luma([OPAQUE]));
    let radius = clamp_radius(width, height, radius);
    if radius == 0 {
        return mask;
    }

    let tile = corner(radius);
    let (right, bottom) = (i64::from(width - radius), i64::from(height - radius));
    let placements = [
        (tile.clone(), 0, 0),
        (imageops::rotate270(&tile), 0, bottom),
        (imageops::rotate180(&tile), right, bottom),
        (imageops::rotate90(&tile), right, 0),
    ];
    for (quarter, x, y) in &placements {
        imageops::replace(&mut mask, quarter, *x, *y);
    }
    mask
}

/// Cut rounded corners into `image` through its alpha channel.
///
/// Grayscale images become GrayAlpha; everything else becomes RGBA.
/// Existing transparency is kept: the result alpha is the smaller of the
/// image alpha and the mask.
pub fn apply_rounded_corners(
    image: &RasterImage,
    radius: u32,
) -> Result<RasterImage, TransformError> {
    let (width, height) = image.dimensions();
    let source = if image.mode() == PixelMode::Indexed {
        image.convert_mode(PixelMode::Rgba)?
    } else {
        image.clone()
    };

    let mut mask = rounded_corner_mask(width, height, radius);
    if let Some(alpha) = source.split_alpha() {
        for (m, a) in mask.pixels_mut().zip(alpha.pixels()) {
            m[0] = m[0].min(a[0]);
        }
    }

    log::debug!(
        "Rounding corners of {width}x{height} image with radius {}",
        clamp_radius(width, height, radius)
    );
    source.put_alpha(&mask)
}
