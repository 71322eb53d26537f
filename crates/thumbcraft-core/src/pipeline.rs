//! The thumbnail pipeline.
//!
//! # Stage Order
//!
//! 1. Orientation normalization
//! 2. Cropbox
//! 3. Border trim
//! 4. Crop (smart, anchored or none)
//! 5. Resize (Lanczos3 unless another filter is requested)
//! 6. Colorspace
//! 7. Blur
//! 8. Rounded corners
//! 9. Padding
//!
//! Every stage is optional except colorspace normalization and resizing,
//! which are no-ops when there is nothing to do.

use crate::colorspace::normalize_colorspace;
use crate::decode::decode;
use crate::encode::encode;
use crate::error::TransformError;
use crate::mask::apply_rounded_corners;
use crate::options::{Color, CropMode, TransformOptions};
use crate::raster::{FilterType, Geometry, PixelMode, RasterImage, Region};
use crate::transform::{crop_to_ratio, normalize, trim_borders};

/// Run every enabled stage on `image`.
///
/// # Errors
///
/// Returns `TransformError::EmptyImage` for images without pixels, or the
/// error of the first failing stage.
pub fn transform(
    image: RasterImage,
    geometry: Geometry,
    options: &TransformOptions,
) -> Result<RasterImage, TransformError> {
    let (source_width, source_height) = image.dimensions();
    if image.is_empty() {
        return Err(TransformError::EmptyImage {
            width: source_width,
            height: source_height,
        });
    }

    let mut image = image;
    if options.orientation {
        image = normalize(image);
    }

    if let Some(cropbox) = options.cropbox {
        let region = cropbox.clamp_to(image.width(), image.height());
        if region.is_empty() {
            log::warn!(
                "Ignoring cropbox {cropbox:?} outside {}x{} image",
                image.width(),
                image.height()
            );
        } else {
            log::debug!("Cropbox {region:?}");
            image = image.crop(region);
        }
    }

    if options.trim_borders {
        image = trim_borders(&image);
    }

    image = crop_and_resize(image, geometry, options)?;
    image = normalize_colorspace(image, options.colorspace, options.format)?;

    if let Some(sigma) = options.blur {
        log::debug!("Blur with sigma {sigma}");
        image = image.gaussian_blur(sigma);
    }

    if let Some(radius) = options.rounded {
        image = apply_rounded_corners(&image, radius)?;
    }

    if options.padding {
        image = pad(&image, geometry, options.padding_color)?;
    }

    log::debug!(
        "Transformed {source_width}x{source_height} into {}x{} {:?} for {}x{} ({:?})",
        image.width(),
        image.height(),
        image.mode(),
        geometry.width(),
        geometry.height(),
        options.crop
    );
    Ok(image)
}

/// Decode `bytes`, run [`transform`] and encode the result.
///
/// # Errors
///
/// Decode and encode failures are returned wrapped in [`TransformError`].
pub fn thumbnail(
    bytes: &[u8],
    geometry: Geometry,
    options: &TransformOptions,
) -> Result<Vec<u8>, TransformError> {
    let image = transform(decode(bytes)?, geometry, options)?;
    let encode_options = options.encode_options(&image);
    Ok(encode(&image, &encode_options)?)
}

fn crop_and_resize(
    image: RasterImage,
    geometry: Geometry,
    options: &TransformOptions,
) -> Result<RasterImage, TransformError> {
    let (width, height) = image.dimensions();
    match options.crop {
        CropMode::Fit => {
            let (w, h) = fit_dimensions(width, height, geometry, options.upscale);
            resize(&image, w, h, options.filter)
        }
        CropMode::Smart => {
            let cropped = crop_to_ratio(&image, geometry.width(), geometry.height());
            let (w, h) = cropped.dimensions();
            let enlarges = w < geometry.width() || h < geometry.height();
            if options.upscale || !enlarges {
                resize(
                    &cropped,
                    geometry.width(),
                    geometry.height(),
                    options.filter,
                )
            } else {
                let (w, h) = fit_dimensions(w, h, geometry, false);
                resize(&cropped, w, h, options.filter)
            }
        }
        mode @ (CropMode::Center | CropMode::Anchor { .. }) => {
            let (x_percent, y_percent) = mode.anchor().unwrap_or((50.0, 50.0));
            let (w, h) = cover_dimensions(width, height, geometry, options.upscale);
            let scaled = resize(&image, w, h, options.filter)?;

            let crop_width = geometry.width().min(w);
            let crop_height = geometry.height().min(h);
            let region = Region::new(
                anchor_offset(w - crop_width, x_percent),
                anchor_offset(h - crop_height, y_percent),
                crop_width,
                crop_height,
            );
            log::debug!("Anchored crop {region:?} at ({x_percent}%, {y_percent}%)");
            Ok(scaled.crop(region))
        }
    }
}

fn resize(
    image: &RasterImage,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<RasterImage, TransformError> {
    if image.dimensions() == (width, height) {
        return Ok(image.clone());
    }
    log::debug!(
        "Resizing {}x{} to {width}x{height} with {filter:?}",
        image.width(),
        image.height()
    );
    Ok(image.resize(Geometry::new(width, height)?, filter))
}

/// Largest size with the source aspect ratio that fits inside `geometry`.
///
/// Without `upscale` the result never exceeds the source size.
fn fit_dimensions(width: u32, height: u32, geometry: Geometry, upscale: bool) -> (u32, u32) {
    let scale =
        (geometry.width() as f64 / width as f64).min(geometry.height() as f64 / height as f64);
    scaled(width, height, scale, upscale)
}

/// Smallest size with the source aspect ratio that covers `geometry`.
fn cover_dimensions(width: u32, height: u32, geometry: Geometry, upscale: bool) -> (u32, u32) {
    let scale =
        (geometry.width() as f64 / width as f64).max(geometry.height() as f64 / height as f64);
    scaled(width, height, scale, upscale)
}

fn scaled(width: u32, height: u32, scale: f64, upscale: bool) -> (u32, u32) {
    let scale = if upscale { scale } else { scale.min(1.0) };
    let w = ((width as f64 * scale).round() as u32).max(1);
    let h = ((height as f64 * scale).round() as u32).max(1);
    (w, h)
}

/// Offset into `excess` spare pixels for an anchor at `percent`.
fn anchor_offset(excess: u32, percent: f64) -> u32 {
    ((excess as f64 * percent / 100.0).round() as u32).min(excess)
}

/// Center `image` on a `geometry`-sized canvas of `color`.
fn pad(
    image: &RasterImage,
    geometry: Geometry,
    color: Color,
) -> Result<RasterImage, TransformError> {
    if image.dimensions() == (geometry.width(), geometry.height()) {
        return Ok(image.clone());
    }

    let source = match image.mode() {
        PixelMode::Indexed if image.has_palette_transparency() => {
            image.convert_mode(PixelMode::Rgba)?
        }
        PixelMode::Indexed => image.convert_mode(PixelMode::Rgb)?,
        _ => image.clone(),
    };

    let mut canvas = RasterImage::filled(geometry, source.mode(), color.to_array())?
        .with_metadata(source.metadata().clone());
    let left = (i64::from(geometry.width()) - i64::from(source.width())) / 2;
    let top = (i64::from(geometry.height()) - i64::from(source.height())) / 2;
    log::debug!(
        "Padding onto {}x{} canvas at ({left}, {top})",
        geometry.width(),
        geometry.height()
    );
    canvas.paste(&source, left, top)?;
    Ok(canvas)
}
