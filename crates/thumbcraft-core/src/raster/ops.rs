//! Pixel-buffer primitives over the `image` crate.
//!
//! These are the narrow collaborator operations the pipeline stages build on:
//! crop, paste, resize, right-angle rotation, flips, blur, mode conversion and
//! alpha channel access. All of them return new images.

use std::borrow::Cow;

use image::{DynamicImage, GrayAlphaImage, GrayImage, Luma, LumaA, Rgb, RgbImage, Rgba, RgbaImage};

use super::{Geometry, PixelMode, RasterImage, Region};
use crate::error::TransformError;
use crate::luminance::calculate_luminance_u8;

/// Right-angle rotation. The canvas always expands to fit the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    /// 90 degrees clockwise (-90 in counter-clockwise convention).
    Clockwise90,
    /// 180 degrees.
    Half,
    /// 90 degrees counter-clockwise.
    CounterClockwise90,
}

impl RasterImage {
    /// Copy out a region. The region is clamped to the image bounds first.
    pub fn crop(&self, region: Region) -> RasterImage {
        let region = region.clamp_to(self.width(), self.height());
        if region == Region::full(self.width(), self.height()) {
            return self.clone();
        }
        self.with_buffer(
            self.buffer()
                .crop_imm(region.x, region.y, region.width, region.height),
        )
    }

    /// Paste `source` with its top-left corner at `(x, y)`, replacing pixels.
    ///
    /// The source is converted to this image's mode first. Parts falling
    /// outside the canvas are dropped.
    pub fn paste(&mut self, source: &RasterImage, x: i64, y: i64) -> Result<(), TransformError> {
        let source = source.convert_mode(self.mode())?;
        let mut canvas = self.buffer().clone();
        image::imageops::replace(&mut canvas, source.buffer(), x, y);
        *self = self.with_buffer(canvas);
        Ok(())
    }

    /// Resample to exactly `geometry`.
    ///
    /// Indexed images are expanded through their palette first.
    pub fn resize(&self, geometry: Geometry, filter: super::FilterType) -> RasterImage {
        if self.dimensions() == (geometry.width(), geometry.height())
            && self.mode() != PixelMode::Indexed
        {
            return self.clone();
        }
        self.with_direct_buffer(self.to_dynamic().resize_exact(
            geometry.width(),
            geometry.height(),
            filter.to_image_filter(),
        ))
    }

    pub fn rotate(&self, rotation: Rotation) -> RasterImage {
        let buffer = match rotation {
            Rotation::Clockwise90 => self.buffer().rotate90(),
            Rotation::Half => self.buffer().rotate180(),
            Rotation::CounterClockwise90 => self.buffer().rotate270(),
        };
        self.with_buffer(buffer)
    }

    pub fn flip_horizontal(&self) -> RasterImage {
        self.with_buffer(self.buffer().fliph())
    }

    pub fn flip_vertical(&self) -> RasterImage {
        self.with_buffer(self.buffer().flipv())
    }

    /// Gaussian blur with standard deviation `sigma`.
    pub fn gaussian_blur(&self, sigma: f32) -> RasterImage {
        if sigma <= 0.0 {
            return self.clone();
        }
        self.with_direct_buffer(self.to_dynamic().blur(sigma))
    }

    /// Convert to another channel layout.
    ///
    /// Indexed sources are expanded through the palette, so palette
    /// transparency becomes real alpha when the target has an alpha channel.
    /// Converting to [`PixelMode::Indexed`] (quantization) is not supported.
    pub fn convert_mode(&self, mode: PixelMode) -> Result<RasterImage, TransformError> {
        if mode == self.mode() {
            return Ok(self.clone());
        }
        let source = self.to_dynamic();
        let buffer = match mode {
            PixelMode::Gray => DynamicImage::ImageLuma8(to_gray(&source)),
            PixelMode::GrayAlpha => DynamicImage::ImageLumaA8(to_gray_alpha(&source)),
            PixelMode::Rgb => DynamicImage::ImageRgb8(source.to_rgb8()),
            PixelMode::Rgba => DynamicImage::ImageRgba8(source.to_rgba8()),
            PixelMode::Indexed => {
                return Err(TransformError::UnsupportedMode {
                    from: self.mode(),
                    to: mode,
                })
            }
        };
        Ok(self.with_direct_buffer(buffer))
    }

    /// Extract the alpha channel, if the image has one.
    pub fn split_alpha(&self) -> Option<GrayImage> {
        if !self.mode().has_alpha() {
            return None;
        }
        let rgba = self.buffer().to_rgba8();
        Some(GrayImage::from_fn(self.width(), self.height(), |x, y| {
            Luma([rgba.get_pixel(x, y)[3]])
        }))
    }

    /// Replace the alpha channel with `mask`.
    ///
    /// Gray images become GrayAlpha; everything else becomes RGBA.
    pub fn put_alpha(&self, mask: &GrayImage) -> Result<RasterImage, TransformError> {
        let (width, height) = self.dimensions();
        if mask.dimensions() != (width, height) {
            return Err(TransformError::MaskSizeMismatch {
                mask_width: mask.width(),
                mask_height: mask.height(),
                width,
                height,
            });
        }

        let buffer = match self.mode() {
            PixelMode::Gray | PixelMode::GrayAlpha => {
                let mut gray = to_gray_alpha(self.buffer());
                for (pixel, alpha) in gray.pixels_mut().zip(mask.pixels()) {
                    pixel[1] = alpha[0];
                }
                DynamicImage::ImageLumaA8(gray)
            }
            _ => {
                let mut rgba = self.to_dynamic().to_rgba8();
                for (pixel, alpha) in rgba.pixels_mut().zip(mask.pixels()) {
                    pixel[3] = alpha[0];
                }
                DynamicImage::ImageRgba8(rgba)
            }
        };
        Ok(self.with_direct_buffer(buffer))
    }

    /// A canvas of `geometry` filled with `color` in the given direct mode.
    pub fn filled(
        geometry: Geometry,
        mode: PixelMode,
        color: [u8; 4],
    ) -> Result<RasterImage, TransformError> {
        let (width, height) = (geometry.width(), geometry.height());
        let [r, g, b, a] = color;
        let luma = calculate_luminance_u8(r, g, b);
        let buffer = match mode {
            PixelMode::Gray => {
                DynamicImage::ImageLuma8(GrayImage::from_pixel(width, height, Luma([luma])))
            }
            PixelMode::GrayAlpha => DynamicImage::ImageLumaA8(GrayAlphaImage::from_pixel(
                width,
                height,
                LumaA([luma, a]),
            )),
            PixelMode::Rgb => {
                DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([r, g, b])))
            }
            PixelMode::Rgba => {
                DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(color)))
            }
            PixelMode::Indexed => {
                return Err(TransformError::UnsupportedMode {
                    from: PixelMode::Rgba,
                    to: PixelMode::Indexed,
                })
            }
        };
        Ok(RasterImage::from_dynamic(buffer))
    }
}

/// Luminance conversion using BT.709 weights.
fn to_gray(source: &DynamicImage) -> GrayImage {
    match source {
        DynamicImage::ImageLuma8(gray) => gray.clone(),
        DynamicImage::ImageLumaA8(_)
        | DynamicImage::ImageLuma16(_)
        | DynamicImage::ImageLumaA16(_) => source.to_luma8(),
        _ => {
            let rgb = source.to_rgb8();
            GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
                let [r, g, b] = rgb.get_pixel(x, y).0;
                Luma([calculate_luminance_u8(r, g, b)])
            })
        }
    }
}

fn to_gray_alpha(source: &DynamicImage) -> GrayAlphaImage {
    if let DynamicImage::ImageLumaA8(gray) = source {
        return gray.clone();
    }
    let gray = to_gray(source);
    let rgba = source.to_rgba8();
    GrayAlphaImage::from_fn(gray.width(), gray.height(), |x, y| {
        LumaA([gray.get_pixel(x, y)[0], rgba.get_pixel(x, y)[3]])
    })
}

/// View of `buffer` with 8-bit samples and unchanged channel count.
pub(crate) fn eight_bit(buffer: &DynamicImage) -> Cow<'_, DynamicImage> {
    match buffer {
        DynamicImage::ImageLuma8(_)
        | DynamicImage::ImageLumaA8(_)
        | DynamicImage::ImageRgb8(_)
        | DynamicImage::ImageRgba8(_) => Cow::Borrowed(buffer),
        DynamicImage::ImageLuma16(_) => Cow::Owned(DynamicImage::ImageLuma8(buffer.to_luma8())),
        DynamicImage::ImageLumaA16(_) => {
            Cow::Owned(DynamicImage::ImageLumaA8(buffer.to_luma_alpha8()))
        }
        other if other.color().has_alpha() => {
            Cow::Owned(DynamicImage::ImageRgba8(other.to_rgba8()))
        }
        other => Cow::Owned(DynamicImage::ImageRgb8(other.to_rgb8())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{FilterType, Palette};

    /// Create a test image where each pixel has a unique value based on position.
    fn test_image(width: u32, height: u32) -> RasterImage {
        RasterImage::from_rgb(RgbImage::from_fn(width, height, |x, y| {
            let v = ((y * width + x) % 256) as u8;
            Rgb([v, v, v])
        }))
    }

    #[test]
    fn test_crop_region() {
        let img = test_image(10, 10);
        let result = img.crop(Region::new(3, 3, 4, 4));

        assert_eq!(result.dimensions(), (4, 4));
        // Value at (3, 3) = 3 * 10 + 3 = 33
        assert_eq!(result.buffer().to_rgb8().get_pixel(0, 0).0, [33, 33, 33]);
    }

    #[test]
    fn test_crop_clamps_to_bounds() {
        let img = test_image(10, 10);
        let result = img.crop(Region::new(8, 8, 5, 5));
        assert_eq!(result.dimensions(), (2, 2));
    }

    #[test]
    fn test_crop_keeps_metadata_and_palette() {
        let palette = Palette::new(vec![[0, 0, 0], [255, 255, 255]]);
        let mut img = RasterImage::indexed(4, 4, vec![1; 16], palette).unwrap();
        img.metadata_mut().set_icc_profile(vec![9]);

        let result = img.crop(Region::new(1, 1, 2, 2));
        assert_eq!(result.mode(), PixelMode::Indexed);
        assert_eq!(result.metadata().icc_profile(), Some(&[9u8][..]));
    }

    #[test]
    fn test_rotate_expands() {
        let img = test_image(4, 2);
        assert_eq!(img.rotate(Rotation::Clockwise90).dimensions(), (2, 4));
        assert_eq!(img.rotate(Rotation::CounterClockwise90).dimensions(), (2, 4));
        assert_eq!(img.rotate(Rotation::Half).dimensions(), (4, 2));
    }

    #[test]
    fn test_flips() {
        let img = test_image(3, 2);
        let flipped = img.flip_horizontal().buffer().to_rgb8();
        assert_eq!(flipped.get_pixel(0, 0).0, [2, 2, 2]);

        let flipped = img.flip_vertical().buffer().to_rgb8();
        assert_eq!(flipped.get_pixel(0, 0).0, [3, 3, 3]);
    }

    #[test]
    fn test_resize_exact() {
        let img = test_image(100, 50);
        let geometry = Geometry::new(40, 40).unwrap();
        let resized = img.resize(geometry, FilterType::Lanczos3);
        assert_eq!(resized.dimensions(), (40, 40));
    }

    #[test]
    fn test_resize_expands_indexed() {
        let palette = Palette::new(vec![[10, 20, 30]]);
        let img = RasterImage::indexed(4, 4, vec![0; 16], palette).unwrap();
        let resized = img.resize(Geometry::new(2, 2).unwrap(), FilterType::Nearest);

        assert_eq!(resized.mode(), PixelMode::Rgb);
        assert_eq!(resized.buffer().to_rgb8().get_pixel(1, 1).0, [10, 20, 30]);
    }

    #[test]
    fn test_convert_to_gray_uses_luminance() {
        let img = RasterImage::from_rgb(RgbImage::from_pixel(1, 1, Rgb([255, 0, 0])));
        let gray = img.convert_mode(PixelMode::Gray).unwrap();

        assert_eq!(gray.mode(), PixelMode::Gray);
        assert_eq!(gray.buffer().as_bytes(), &[calculate_luminance_u8(255, 0, 0)]);
    }

    #[test]
    fn test_convert_to_indexed_unsupported() {
        let img = test_image(2, 2);
        assert!(matches!(
            img.convert_mode(PixelMode::Indexed),
            Err(TransformError::UnsupportedMode { .. })
        ));
    }

    #[test]
    fn test_put_and_split_alpha() {
        let img = test_image(2, 1);
        let mask = GrayImage::from_raw(2, 1, vec![0, 200]).unwrap();
        let result = img.put_alpha(&mask).unwrap();

        assert_eq!(result.mode(), PixelMode::Rgba);
        assert_eq!(result.split_alpha().unwrap().into_raw(), vec![0, 200]);
    }

    #[test]
    fn test_put_alpha_on_gray() {
        let img = RasterImage::from_gray(GrayImage::from_pixel(2, 2, Luma([7])));
        let mask = GrayImage::from_pixel(2, 2, Luma([100]));
        let result = img.put_alpha(&mask).unwrap();

        assert_eq!(result.mode(), PixelMode::GrayAlpha);
        assert_eq!(result.buffer().as_bytes()[..2], [7, 100]);
    }

    #[test]
    fn test_put_alpha_size_mismatch() {
        let img = test_image(2, 2);
        let mask = GrayImage::new(3, 3);
        assert!(matches!(
            img.put_alpha(&mask),
            Err(TransformError::MaskSizeMismatch { .. })
        ));
    }

    #[test]
    fn test_paste_replaces_pixels() {
        let geometry = Geometry::new(4, 4).unwrap();
        let mut canvas =
            RasterImage::filled(geometry, PixelMode::Rgb, [255, 255, 255, 255]).unwrap();
        let patch = RasterImage::from_rgb(RgbImage::from_pixel(2, 2, Rgb([0, 0, 0])));

        canvas.paste(&patch, 1, 1).unwrap();
        let rgb = canvas.buffer().to_rgb8();
        assert_eq!(rgb.get_pixel(0, 0).0, [255, 255, 255]);
        assert_eq!(rgb.get_pixel(1, 1).0, [0, 0, 0]);
        assert_eq!(rgb.get_pixel(2, 2).0, [0, 0, 0]);
        assert_eq!(rgb.get_pixel(3, 3).0, [255, 255, 255]);
    }

    #[test]
    fn test_blur_keeps_dimensions() {
        let img = test_image(20, 10);
        assert_eq!(img.gaussian_blur(2.0).dimensions(), (20, 10));
        assert_eq!(img.gaussian_blur(0.0).dimensions(), (20, 10));
    }

    #[test]
    fn test_eight_bit_keeps_channels() {
        let wide = DynamicImage::new_luma_a16(2, 2);
        assert_eq!(eight_bit(&wide).color().channel_count(), 2);

        let narrow = DynamicImage::new_rgb8(2, 2);
        assert!(matches!(eight_bit(&narrow), Cow::Borrowed(_)));
    }
}
