//! Decoding encoded bytes into a [`RasterImage`].

use std::io::Cursor;

use image::{DynamicImage, ImageDecoder, ImageReader};

use super::exif::raw_orientation;
use super::DecodeError;
use crate::raster::{ImageMetadata, MetadataValue, RasterImage, ORIENTATION_KEY};

/// Decode image bytes, keeping ICC profile and EXIF orientation as metadata.
///
/// The pixels are left exactly as stored; orientation is not applied here.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` if the format cannot be recognized.
/// Returns `DecodeError::CorruptedFile` if the data fails to decode.
pub fn decode(bytes: &[u8]) -> Result<RasterImage, DecodeError> {
    let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    if reader.format().is_none() {
        return Err(DecodeError::InvalidFormat);
    }

    let mut decoder = reader.into_decoder().map_err(DecodeError::from_image)?;
    let icc_profile = decoder.icc_profile().unwrap_or_else(|e| {
        log::debug!("Ignoring unreadable ICC profile: {e}");
        None
    });
    let buffer = DynamicImage::from_decoder(decoder).map_err(DecodeError::from_image)?;

    let mut metadata = ImageMetadata::new();
    if let Some(profile) = icc_profile {
        metadata.set_icc_profile(profile);
    }
    if let Some(orientation) = raw_orientation(bytes) {
        metadata.insert(ORIENTATION_KEY, MetadataValue::Int(i64::from(orientation)));
    }

    log::debug!(
        "Decoded {}x{} {:?} image ({} metadata entries)",
        buffer.width(),
        buffer.height(),
        buffer.color(),
        metadata.len()
    );

    Ok(RasterImage::from_dynamic(buffer).with_metadata(metadata))
}

/// Check whether `bytes` decode to a valid image.
///
/// Reports the outcome instead of raising: any failure yields `false`.
pub fn is_valid_image(bytes: &[u8]) -> bool {
    match decode(bytes) {
        Ok(image) => !image.is_empty(),
        Err(e) => {
            log::debug!("Image validity probe failed: {e}");
            false
        }
    }
}
