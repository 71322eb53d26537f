//! Colorspace normalization before encoding.

use serde::{Deserialize, Serialize};

use crate::encode::OutputFormat;
use crate::error::TransformError;
use crate::raster::{PixelMode, RasterImage};

/// Target colorspace for the thumbnail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColorSpace {
    Rgb,
    Gray,
}

/// Convert `image` into the channel layout the target colorspace and
/// output format can hold.
///
/// For [`ColorSpace::Rgb`], transparency survives only when `format` can
/// store it: RGBA stays RGBA, GrayAlpha and palettes with a transparency
/// table become RGBA, everything else becomes RGB. [`ColorSpace::Gray`]
/// produces luminance. `None` leaves the image alone.
pub fn normalize_colorspace(
    image: RasterImage,
    colorspace: Option<ColorSpace>,
    format: OutputFormat,
) -> Result<RasterImage, TransformError> {
    let Some(colorspace) = colorspace else {
        return Ok(image);
    };

    let target = match colorspace {
        ColorSpace::Gray => PixelMode::Gray,
        ColorSpace::Rgb => rgb_target(&image, format),
    };
    if target == image.mode() {
        return Ok(image);
    }

    log::debug!(
        "Converting {:?} image to {:?} for {:?}",
        image.mode(),
        target,
        format
    );
    image.convert_mode(target)
}

fn rgb_target(image: &RasterImage, format: OutputFormat) -> PixelMode {
    if !format.supports_alpha() {
        return PixelMode::Rgb;
    }
    match image.mode() {
        PixelMode::Rgba | PixelMode::GrayAlpha => PixelMode::Rgba,
        PixelMode::Indexed if image.has_palette_transparency() => PixelMode::Rgba,
        _ => PixelMode::Rgb,
    }
}
