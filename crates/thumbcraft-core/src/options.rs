//! Thumbnail request options.
//!
//! Options deserialize from any serde format with every field optional:
//!
//! ```json
//! { "format": "PNG", "crop": "smart", "rounded": 12, "padding_color": "#00000000" }
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::colorspace::ColorSpace;
use crate::encode::{EncodeOptions, OutputFormat};
use crate::raster::{FilterType, RasterImage, Region};

/// Default lossy quality.
pub const DEFAULT_QUALITY: u8 = 95;

/// How the image is fitted to the target geometry.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CropMode {
    /// Scale to fit inside the geometry, keeping the whole image.
    #[default]
    Fit,
    /// Drop low-detail strips until the aspect ratio matches.
    Smart,
    /// Scale to cover, then crop around the centre.
    Center,
    /// Scale to cover, then crop around a point given in percent of the
    /// overflow (0 = left/top, 100 = right/bottom).
    Anchor { x: f64, y: f64 },
}

impl CropMode {
    /// Anchor percentages for the cover-and-crop modes.
    pub fn anchor(self) -> Option<(f64, f64)> {
        match self {
            CropMode::Center => Some((50.0, 50.0)),
            CropMode::Anchor { x, y } => Some((x.clamp(0.0, 100.0), y.clamp(0.0, 100.0))),
            CropMode::Fit | CropMode::Smart => None,
        }
    }
}

/// Error parsing a `#rrggbb` or `#rrggbbaa` color.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid color {0:?}: expected #rrggbb or #rrggbbaa")]
pub struct ParseColorError(String);

/// An RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseColorError(s.to_string());
        let hex = s.strip_prefix('#').ok_or_else(err)?;
        if !(hex.len() == 6 || hex.len() == 8) || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(err());
        }

        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());
        let a = if hex.len() == 8 { channel(6)? } else { 255 };
        Ok(Color::rgba(channel(0)?, channel(2)?, channel(4)?, a))
    }
}

impl TryFrom<String> for Color {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if self.a != 255 {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

/// Everything a thumbnail request can ask for besides the geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformOptions {
    /// Target colorspace; `None` keeps the source layout.
    pub colorspace: Option<ColorSpace>,
    pub format: OutputFormat,
    /// Lossy quality, 1-100.
    pub quality: u8,
    pub crop: CropMode,
    /// Resampling filter for every resize.
    pub filter: FilterType,
    /// Allow enlarging images smaller than the geometry.
    pub upscale: bool,
    /// Apply the EXIF orientation tag.
    pub orientation: bool,
    /// Remove flat borders before cropping.
    pub trim_borders: bool,
    /// Region to cut out before any other geometry stage.
    pub cropbox: Option<Region>,
    /// Center the result on a canvas of exactly the geometry.
    pub padding: bool,
    pub padding_color: Color,
    /// Corner radius in pixels.
    pub rounded: Option<u32>,
    /// Gaussian blur sigma.
    pub blur: Option<f32>,
    /// Carry the source ICC profile into the output.
    pub preserve_icc: bool,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            colorspace: Some(ColorSpace::Rgb),
            format: OutputFormat::Jpeg,
            quality: DEFAULT_QUALITY,
            crop: CropMode::Fit,
            filter: FilterType::Lanczos3,
            upscale: true,
            orientation: true,
            trim_borders: false,
            cropbox: None,
            padding: false,
            padding_color: Color::WHITE,
            rounded: None,
            blur: None,
            preserve_icc: true,
        }
    }
}

impl TransformOptions {
    /// Encoder settings for the finished `image`.
    pub fn encode_options(&self, image: &RasterImage) -> EncodeOptions {
        let profile = if self.preserve_icc {
            image.metadata().icc_profile().map(<[u8]>::to_vec)
        } else {
            None
        };
        EncodeOptions::new(self.format, self.quality).with_icc_profile(profile)
    }
}
