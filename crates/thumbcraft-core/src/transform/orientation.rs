//! EXIF orientation normalization.
//!
//! Cameras store pixels in sensor order and record how to display them in
//! the EXIF orientation tag. Crop and resize coordinates only make sense in
//! display order, so orientation is normalized before any geometry math.
//!
//! | tag | stored as | applied transform |
//! |---|---|---|
//! | 1 | upright | none |
//! | 2 | mirrored | flip horizontal |
//! | 3 | upside down | rotate 180° |
//! | 4 | upside down, mirrored | flip vertical |
//! | 5 | transposed | rotate 90° CW, flip horizontal |
//! | 6 | rotated 90° CCW | rotate 90° CW |
//! | 7 | transversed | rotate 90° CCW, flip horizontal |
//! | 8 | rotated 90° CW | rotate 90° CCW |

use serde::{Deserialize, Serialize};

use crate::raster::{ImageMetadata, MetadataValue, RasterImage, Rotation, ORIENTATION_KEY};

/// EXIF orientation values (1-8).
/// See: https://exiftool.org/TagNames/EXIF.html
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Orientation {
    /// Normal (no transformation needed).
    #[default]
    Normal = 1,
    /// Horizontal flip.
    FlipHorizontal = 2,
    /// Rotate 180 degrees.
    Rotate180 = 3,
    /// Vertical flip.
    FlipVertical = 4,
    /// Transpose (rotate 90 CW, then flip horizontal).
    Transpose = 5,
    /// Rotate 90 degrees clockwise.
    Rotate90CW = 6,
    /// Transverse (rotate 90 CCW, then flip horizontal).
    Transverse = 7,
    /// Rotate 270 degrees clockwise (90 CCW).
    Rotate270CW = 8,
}

impl Orientation {
    pub const ALL: [Orientation; 8] = [
        Orientation::Normal,
        Orientation::FlipHorizontal,
        Orientation::Rotate180,
        Orientation::FlipVertical,
        Orientation::Transpose,
        Orientation::Rotate90CW,
        Orientation::Transverse,
        Orientation::Rotate270CW,
    ];

    /// Parse an EXIF tag value. Anything outside 1..=8 is `None`.
    pub fn from_tag(value: i64) -> Option<Self> {
        match value {
            1 => Some(Orientation::Normal),
            2 => Some(Orientation::FlipHorizontal),
            3 => Some(Orientation::Rotate180),
            4 => Some(Orientation::FlipVertical),
            5 => Some(Orientation::Transpose),
            6 => Some(Orientation::Rotate90CW),
            7 => Some(Orientation::Transverse),
            8 => Some(Orientation::Rotate270CW),
            _ => None,
        }
    }

    /// Orientation recorded in metadata. Non-integer or out-of-range values
    /// read as absent.
    pub fn from_metadata(metadata: &ImageMetadata) -> Option<Self> {
        match metadata.get(ORIENTATION_KEY) {
            Some(MetadataValue::Int(value)) => Self::from_tag(*value),
            _ => None,
        }
    }

    #[inline]
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Returns true if this orientation swaps width and height dimensions.
    #[inline]
    pub fn swaps_dimensions(self) -> bool {
        matches!(
            self,
            Orientation::Transpose
                | Orientation::Rotate90CW
                | Orientation::Transverse
                | Orientation::Rotate270CW
        )
    }

    /// The orientation whose transform undoes this one.
    pub fn inverse(self) -> Self {
        match self {
            Orientation::Rotate90CW => Orientation::Rotate270CW,
            Orientation::Rotate270CW => Orientation::Rotate90CW,
            other => other,
        }
    }
}

/// Orientation recorded on the image, if any.
pub fn read_orientation_metadata(image: &RasterImage) -> Option<Orientation> {
    Orientation::from_metadata(image.metadata())
}

/// True when normalizing `image` will swap its width and height.
pub fn needs_dimension_swap(image: &RasterImage) -> bool {
    read_orientation_metadata(image).is_some_and(Orientation::swaps_dimensions)
}

/// Display dimensions of `image`, without applying the transform.
pub fn effective_dimensions(image: &RasterImage) -> (u32, u32) {
    let (width, height) = image.dimensions();
    if needs_dimension_swap(image) {
        (height, width)
    } else {
        (width, height)
    }
}

/// Apply the transform for `orientation`, regardless of metadata.
pub fn apply_orientation(image: &RasterImage, orientation: Orientation) -> RasterImage {
    match orientation {
        Orientation::Normal => image.clone(),
        Orientation::FlipHorizontal => image.flip_horizontal(),
        Orientation::Rotate180 => image.rotate(Rotation::Half),
        Orientation::FlipVertical => image.flip_vertical(),
        Orientation::Transpose => image.rotate(Rotation::Clockwise90).flip_horizontal(),
        Orientation::Rotate90CW => image.rotate(Rotation::Clockwise90),
        Orientation::Transverse => image.rotate(Rotation::CounterClockwise90).flip_horizontal(),
        Orientation::Rotate270CW => image.rotate(Rotation::CounterClockwise90),
    }
}

/// Bring `image` upright according to its recorded orientation.
///
/// The orientation entry is removed afterwards, so normalizing twice is the
/// same as normalizing once. Images without a valid tag pass through.
pub fn normalize(image: RasterImage) -> RasterImage {
    let Some(orientation) = read_orientation_metadata(&image) else {
        return image;
    };

    log::debug!(
        "Normalizing orientation {} on {}x{} image",
        orientation.tag(),
        image.width(),
        image.height()
    );
    let mut upright = apply_orientation(&image, orientation);
    upright.metadata_mut().remove(ORIENTATION_KEY);
    upright
}
