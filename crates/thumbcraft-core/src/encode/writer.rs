//! Format writers and the fallback retry.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::{DynamicImage, ExtendedColorType, ImageEncoder};

use super::{EncodeError, EncodeOptions, OutputFormat};
use crate::raster::RasterImage;

/// Encode an image.
///
/// Indexed images are expanded through their palette. JPEG output drops any
/// alpha channel; PNG keeps it. Samples wider than 8 bits are reduced.
///
/// If the first attempt fails with an I/O-class error (or the encoder
/// rejects the ICC profile) and optimization or a profile was requested,
/// encoding is retried once without both. A second failure is returned.
///
/// # Errors
///
/// Returns `EncodeError::InvalidDimensions` for empty images, otherwise the
/// error of the last attempt.
pub fn encode(image: &RasterImage, options: &EncodeOptions) -> Result<Vec<u8>, EncodeError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let buffer = prepare_buffer(image, options.format);
    let bytes = encode_with_fallback(options, |attempt| write_buffer(&buffer, attempt))?;

    log::debug!(
        "Encoded {}x{} {:?} thumbnail ({} bytes)",
        width,
        height,
        options.format,
        bytes.len()
    );
    Ok(bytes)
}

/// Run `write` with `options`, retrying once with [`EncodeOptions::without_extras`].
pub(crate) fn encode_with_fallback<F>(
    options: &EncodeOptions,
    mut write: F,
) -> Result<Vec<u8>, EncodeError>
where
    F: FnMut(&EncodeOptions) -> Result<Vec<u8>, EncodeError>,
{
    match write(options) {
        Err(err) if err.is_recoverable() && options.has_extras() => {
            log::warn!("Encoding failed ({err}); retrying without optimization and ICC profile");
            write(&options.without_extras())
        }
        result => result,
    }
}

/// Reduce the buffer to a layout the target format can store.
fn prepare_buffer(image: &RasterImage, format: OutputFormat) -> DynamicImage {
    let source = image.to_dynamic();
    let gray = source.color().channel_count() <= 2;
    match (format, source) {
        (OutputFormat::Jpeg, DynamicImage::ImageLuma8(buffer)) => DynamicImage::ImageLuma8(buffer),
        (OutputFormat::Jpeg, DynamicImage::ImageRgb8(buffer)) => DynamicImage::ImageRgb8(buffer),
        (OutputFormat::Jpeg, other) if gray => DynamicImage::ImageLuma8(other.to_luma8()),
        (OutputFormat::Jpeg, other) => DynamicImage::ImageRgb8(other.to_rgb8()),
        (
            OutputFormat::Png,
            buffer @ (DynamicImage::ImageLuma8(_)
            | DynamicImage::ImageLumaA8(_)
            | DynamicImage::ImageRgb8(_)
            | DynamicImage::ImageRgba8(_)),
        ) => buffer,
        (OutputFormat::Png, other) => match (gray, other.color().has_alpha()) {
            (true, false) => DynamicImage::ImageLuma8(other.to_luma8()),
            (true, true) => DynamicImage::ImageLumaA8(other.to_luma_alpha8()),
            (false, false) => DynamicImage::ImageRgb8(other.to_rgb8()),
            (false, true) => DynamicImage::ImageRgba8(other.to_rgba8()),
        },
    }
}

fn write_buffer(buffer: &DynamicImage, options: &EncodeOptions) -> Result<Vec<u8>, EncodeError> {
    let mut out = Cursor::new(Vec::new());
    let (width, height) = (buffer.width(), buffer.height());
    let color: ExtendedColorType = buffer.color().into();

    let result = match options.format {
        OutputFormat::Jpeg => {
            let quality = options.quality.clamp(1, 100);
            let mut encoder = JpegEncoder::new_with_quality(&mut out, quality);
            attach_profile(&mut encoder, options)?;
            encoder.write_image(buffer.as_bytes(), width, height, color)
        }
        OutputFormat::Png => {
            let compression = if options.optimize {
                CompressionType::Best
            } else {
                CompressionType::Default
            };
            let mut encoder =
                PngEncoder::new_with_quality(&mut out, compression, PngFilter::Adaptive);
            attach_profile(&mut encoder, options)?;
            encoder.write_image(buffer.as_bytes(), width, height, color)
        }
    };

    result.map_err(|err| match err {
        image::ImageError::IoError(e) => EncodeError::Io(e),
        other => EncodeError::EncodingFailed {
            format: options.format,
            message: other.to_string(),
        },
    })?;
    Ok(out.into_inner())
}

fn attach_profile<E: ImageEncoder>(
    encoder: &mut E,
    options: &EncodeOptions,
) -> Result<(), EncodeError> {
    if let Some(profile) = &options.icc_profile {
        encoder
            .set_icc_profile(profile.clone())
            .map_err(|e| EncodeError::ProfileRejected(e.to_string()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode;
    use crate::raster::{Palette, PixelMode};
    use image::{GrayAlphaImage, LumaA, Rgb, RgbImage, Rgba, RgbaImage};
    use std::cell::RefCell;

    fn io_error() -> EncodeError {
        EncodeError::Io(std::io::Error::new(std::io::ErrorKind::Other, "write failed"))
    }

    #[test]
    fn test_encode_jpeg_basic() {
        let img = RasterImage::from_rgb(RgbImage::from_pixel(100, 100, Rgb([128, 128, 128])));
        let bytes = encode(&img, &EncodeOptions::new(OutputFormat::Jpeg, 90)).unwrap();

        // SOI and EOI markers
        assert_eq!(&bytes[0..2], &[0xFF, 0xD8]);
        assert_eq!(&bytes[bytes.len() - 2..], &[0xFF, 0xD9]);
    }

    #[test]
    fn test_encode_jpeg_drops_alpha() {
        let img = RasterImage::from_rgba(RgbaImage::from_pixel(8, 8, Rgba([200, 10, 10, 50])));
        let bytes = encode(&img, &EncodeOptions::new(OutputFormat::Jpeg, 90)).unwrap();
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.mode(), PixelMode::Rgb);
    }

    #[test]
    fn test_encode_png_keeps_alpha() {
        let img = RasterImage::from_rgba(RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 40])));
        let bytes = encode(&img, &EncodeOptions::new(OutputFormat::Png, 90)).unwrap();

        assert_eq!(&bytes[1..4], b"PNG");
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.buffer().to_rgba8().get_pixel(0, 0).0, [1, 2, 3, 40]);
    }

    #[test]
    fn test_encode_png_gray_alpha() {
        let img = RasterImage::from_dynamic(DynamicImage::ImageLumaA8(GrayAlphaImage::from_pixel(
            3,
            3,
            LumaA([77, 128]),
        )));
        let bytes = encode(&img, &EncodeOptions::new(OutputFormat::Png, 90)).unwrap();
        assert_eq!(decode(&bytes).unwrap().mode(), PixelMode::GrayAlpha);
    }

    #[test]
    fn test_encode_indexed_expands_palette() {
        let palette = Palette::new(vec![[0, 255, 0]]);
        let img = RasterImage::indexed(2, 2, vec![0; 4], palette).unwrap();
        let bytes = encode(&img, &EncodeOptions::new(OutputFormat::Png, 90)).unwrap();

        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.buffer().to_rgb8().get_pixel(1, 1).0, [0, 255, 0]);
    }

    #[test]
    fn test_encode_jpeg_embeds_icc_profile() {
        let img = RasterImage::from_rgb(RgbImage::from_pixel(8, 8, Rgb([10, 20, 30])));
        let options =
            EncodeOptions::new(OutputFormat::Jpeg, 90).with_icc_profile(Some(vec![0u8; 128]));
        let bytes = encode(&img, &options).unwrap();

        let marker = b"ICC_PROFILE";
        assert!(bytes.windows(marker.len()).any(|window| window == marker));
    }

    #[test]
    fn test_encode_zero_dimensions() {
        let img = RasterImage::from_rgb(RgbImage::new(0, 10));
        let result = encode(&img, &EncodeOptions::new(OutputFormat::Jpeg, 90));
        assert!(matches!(result, Err(EncodeError::InvalidDimensions { .. })));
    }

    #[test]
    fn test_fallback_retries_once_without_extras() {
        let options = EncodeOptions::new(OutputFormat::Jpeg, 90).with_icc_profile(Some(vec![1]));
        let attempts = RefCell::new(Vec::new());

        let result = encode_with_fallback(&options, |attempt| {
            attempts.borrow_mut().push(attempt.clone());
            if attempts.borrow().len() == 1 {
                Err(io_error())
            } else {
                Ok(vec![42])
            }
        });

        assert_eq!(result.unwrap(), vec![42]);
        let attempts = attempts.into_inner();
        assert_eq!(attempts.len(), 2);
        assert!(attempts[0].optimize);
        assert!(!attempts[1].optimize);
        assert!(attempts[1].icc_profile.is_none());
    }

    #[test]
    fn test_fallback_second_failure_propagates() {
        let options = EncodeOptions::new(OutputFormat::Png, 90);
        let mut calls = 0;
        let result = encode_with_fallback(&options, |_| {
            calls += 1;
            Err(io_error())
        });

        assert!(matches!(result, Err(EncodeError::Io(_))));
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_fallback_skips_unrecoverable_errors() {
        let options = EncodeOptions::new(OutputFormat::Png, 90);
        let mut calls = 0;
        let result = encode_with_fallback(&options, |_| {
            calls += 1;
            Err(EncodeError::EncodingFailed {
                format: OutputFormat::Png,
                message: "bad layout".into(),
            })
        });

        assert!(result.is_err());
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_fallback_not_used_without_extras() {
        let options = EncodeOptions::new(OutputFormat::Png, 90).without_extras();
        let mut calls = 0;
        let result = encode_with_fallback(&options, |_| {
            calls += 1;
            Err(io_error())
        });

        assert!(result.is_err());
        assert_eq!(calls, 1);
    }
}
