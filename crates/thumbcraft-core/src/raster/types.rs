//! Core raster types: images, regions, geometries and metadata.

use std::collections::BTreeMap;

use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::error::TransformError;

/// Metadata key holding the raw EXIF orientation value.
pub const ORIENTATION_KEY: &str = "orientation";

/// Metadata key holding an embedded ICC color profile.
pub const ICC_PROFILE_KEY: &str = "icc_profile";

/// Channel layout of a [`RasterImage`].
///
/// Buffers with 16-bit or float samples report the matching 8-bit mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelMode {
    /// Single luminance channel.
    Gray,
    /// Luminance plus alpha.
    GrayAlpha,
    /// Red, green, blue.
    Rgb,
    /// Red, green, blue, alpha.
    Rgba,
    /// Palette indices with an optional per-entry transparency table.
    Indexed,
}

impl PixelMode {
    /// Returns true if the buffer carries a real alpha channel.
    ///
    /// Indexed images never do: their transparency lives in the palette.
    #[inline]
    pub fn has_alpha(self) -> bool {
        matches!(self, PixelMode::GrayAlpha | PixelMode::Rgba)
    }

    /// Number of samples stored per pixel.
    #[inline]
    pub fn channel_count(self) -> u8 {
        match self {
            PixelMode::Gray | PixelMode::Indexed => 1,
            PixelMode::GrayAlpha => 2,
            PixelMode::Rgb => 3,
            PixelMode::Rgba => 4,
        }
    }

    fn of_buffer(buffer: &DynamicImage) -> Self {
        let color = buffer.color();
        match (color.channel_count(), color.has_alpha()) {
            (1, _) => PixelMode::Gray,
            (2, _) => PixelMode::GrayAlpha,
            (_, true) => PixelMode::Rgba,
            _ => PixelMode::Rgb,
        }
    }
}

/// Color table of an indexed image.
///
/// Transparency is a side-channel: one alpha value per palette entry.
/// Entries past the end of the table are fully opaque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<[u8; 3]>,
    alpha: Option<Vec<u8>>,
}

impl Palette {
    pub fn new(colors: Vec<[u8; 3]>) -> Self {
        Self {
            colors,
            alpha: None,
        }
    }

    /// Attach a per-entry alpha table.
    pub fn with_transparency(mut self, alpha: Vec<u8>) -> Self {
        self.alpha = Some(alpha);
        self
    }

    /// Mark a single palette entry as fully transparent.
    pub fn with_transparent_index(self, index: u8) -> Self {
        let mut alpha = vec![255u8; index as usize + 1];
        alpha[index as usize] = 0;
        self.with_transparency(alpha)
    }

    pub fn colors(&self) -> &[[u8; 3]] {
        &self.colors
    }

    pub fn has_transparency(&self) -> bool {
        self.alpha.is_some()
    }

    /// RGB value of a palette entry. Unknown entries are black.
    #[inline]
    pub fn color(&self, index: u8) -> [u8; 3] {
        self.colors
            .get(index as usize)
            .copied()
            .unwrap_or([0, 0, 0])
    }

    /// Alpha value of a palette entry.
    #[inline]
    pub fn alpha(&self, index: u8) -> u8 {
        self.alpha
            .as_ref()
            .and_then(|alpha| alpha.get(index as usize).copied())
            .unwrap_or(255)
    }
}

/// A single metadata entry. Values are opaque to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataValue {
    Int(i64),
    Text(String),
    Bytes(Vec<u8>),
}

/// String-keyed metadata carried alongside the pixels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageMetadata {
    entries: BTreeMap<String, MetadataValue>,
}

impl ImageMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: MetadataValue) {
        self.entries.insert(key.into(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<MetadataValue> {
        self.entries.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetadataValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// The embedded ICC profile, if any.
    pub fn icc_profile(&self) -> Option<&[u8]> {
        match self.entries.get(ICC_PROFILE_KEY) {
            Some(MetadataValue::Bytes(profile)) => Some(profile),
            _ => None,
        }
    }

    pub fn set_icc_profile(&mut self, profile: Vec<u8>) {
        self.insert(ICC_PROFILE_KEY, MetadataValue::Bytes(profile));
    }
}

/// Axis-aligned rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Region covering a whole `width x height` image.
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Exclusive right edge.
    #[inline]
    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge.
    #[inline]
    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.right() <= width && self.bottom() <= height
    }

    /// Shrink the region so it lies inside a `width x height` image.
    ///
    /// The origin is clamped first, then the size; the result may be empty
    /// but never extends past the image.
    pub fn clamp_to(&self, width: u32, height: u32) -> Self {
        let x = self.x.min(width);
        let y = self.y.min(height);
        Self {
            x,
            y,
            width: self.width.min(width - x),
            height: self.height.min(height - y),
        }
    }
}

/// Target thumbnail dimensions. Both sides are non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Geometry {
    width: u32,
    height: u32,
}

impl Geometry {
    pub fn new(width: u32, height: u32) -> Result<Self, TransformError> {
        if width == 0 || height == 0 {
            return Err(TransformError::InvalidGeometry { width, height });
        }
        Ok(Self { width, height })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Width divided by height.
    pub fn ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

/// Interpolation filter for resampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterType {
    /// Nearest neighbor interpolation (fastest, lowest quality).
    Nearest,
    /// Bilinear interpolation (fast, acceptable quality).
    Bilinear,
    /// Lanczos3 interpolation (slower, highest quality).
    #[default]
    Lanczos3,
}

impl FilterType {
    /// Convert to the image crate's FilterType.
    pub fn to_image_filter(self) -> image::imageops::FilterType {
        match self {
            FilterType::Nearest => image::imageops::FilterType::Nearest,
            FilterType::Bilinear => image::imageops::FilterType::Triangle,
            FilterType::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }
}

/// A decoded image moving through the pipeline.
///
/// Indexed images keep their palette indices in a single-channel buffer and
/// the colors in [`Palette`]. Every operation returns a new value; the
/// metadata travels with the pixels.
#[derive(Debug, Clone)]
pub struct RasterImage {
    buffer: DynamicImage,
    palette: Option<Palette>,
    metadata: ImageMetadata,
}

impl RasterImage {
    /// Wrap a decoded buffer with empty metadata.
    pub fn from_dynamic(buffer: DynamicImage) -> Self {
        Self {
            buffer,
            palette: None,
            metadata: ImageMetadata::new(),
        }
    }

    pub fn from_gray(buffer: GrayImage) -> Self {
        Self::from_dynamic(DynamicImage::ImageLuma8(buffer))
    }

    pub fn from_rgb(buffer: RgbImage) -> Self {
        Self::from_dynamic(DynamicImage::ImageRgb8(buffer))
    }

    pub fn from_rgba(buffer: RgbaImage) -> Self {
        Self::from_dynamic(DynamicImage::ImageRgba8(buffer))
    }

    /// Build an indexed image from palette indices in row-major order.
    pub fn indexed(
        width: u32,
        height: u32,
        indices: Vec<u8>,
        palette: Palette,
    ) -> Result<Self, TransformError> {
        let expected = width as usize * height as usize;
        let actual = indices.len();
        let buffer = GrayImage::from_raw(width, height, indices)
            .ok_or(TransformError::InvalidPixelData { expected, actual })?;
        Ok(Self {
            buffer: DynamicImage::ImageLuma8(buffer),
            palette: Some(palette),
            metadata: ImageMetadata::new(),
        })
    }

    pub fn with_metadata(mut self, metadata: ImageMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Replace the pixels, keeping palette and metadata.
    pub(crate) fn with_buffer(&self, buffer: DynamicImage) -> Self {
        Self {
            buffer,
            palette: self.palette.clone(),
            metadata: self.metadata.clone(),
        }
    }

    /// Replace the pixels with a direct-color buffer, dropping any palette.
    pub(crate) fn with_direct_buffer(&self, buffer: DynamicImage) -> Self {
        Self {
            buffer,
            palette: None,
            metadata: self.metadata.clone(),
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    pub fn mode(&self) -> PixelMode {
        if self.palette.is_some() {
            PixelMode::Indexed
        } else {
            PixelMode::of_buffer(&self.buffer)
        }
    }

    pub fn palette(&self) -> Option<&Palette> {
        self.palette.as_ref()
    }

    /// True for indexed images whose palette carries transparency.
    pub fn has_palette_transparency(&self) -> bool {
        self.palette.as_ref().is_some_and(Palette::has_transparency)
    }

    pub fn metadata(&self) -> &ImageMetadata {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut ImageMetadata {
        &mut self.metadata
    }

    /// The stored buffer. For indexed images this holds palette indices.
    pub fn buffer(&self) -> &DynamicImage {
        &self.buffer
    }

    /// Direct-color pixels: indexed images are expanded through the palette
    /// (to RGBA when the palette has transparency, RGB otherwise).
    pub fn to_dynamic(&self) -> DynamicImage {
        let Some(palette) = &self.palette else {
            return self.buffer.clone();
        };
        let indices = self.buffer.to_luma8();
        if palette.has_transparency() {
            DynamicImage::ImageRgba8(RgbaImage::from_fn(self.width(), self.height(), |x, y| {
                let index = indices.get_pixel(x, y)[0];
                let [r, g, b] = palette.color(index);
                image::Rgba([r, g, b, palette.alpha(index)])
            }))
        } else {
            DynamicImage::ImageRgb8(RgbImage::from_fn(self.width(), self.height(), |x, y| {
                image::Rgb(palette.color(indices.get_pixel(x, y)[0]))
            }))
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}
