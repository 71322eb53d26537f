//! EXIF orientation extraction.

use std::io::Cursor;

use exif::{In, Reader, Tag};

use crate::transform::Orientation;

/// Raw orientation value from the primary IFD, unvalidated.
///
/// Returns `None` when there is no EXIF block, no orientation field, or the
/// field is not an unsigned integer.
pub(crate) fn raw_orientation(bytes: &[u8]) -> Option<u32> {
    let mut cursor = Cursor::new(bytes);
    let exif = Reader::new().read_from_container(&mut cursor).ok()?;
    exif.get_field(Tag::Orientation, In::PRIMARY)?
        .value
        .get_uint(0)
}

/// EXIF orientation of encoded image bytes.
///
/// Missing or malformed metadata reads as `None`; this never fails.
pub fn read_orientation(bytes: &[u8]) -> Option<Orientation> {
    raw_orientation(bytes).and_then(|value| Orientation::from_tag(i64::from(value)))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::codecs::jpeg::JpegEncoder;
    use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage};

    /// JPEG bytes for `pixels` with an APP1 EXIF block carrying `orientation`.
    pub(crate) fn jpeg_with_orientation(pixels: &RgbImage, orientation: u16) -> Vec<u8> {
        let mut plain = Vec::new();
        JpegEncoder::new_with_quality(&mut plain, 100)
            .write_image(
                pixels.as_raw(),
                pixels.width(),
                pixels.height(),
                ExtendedColorType::Rgb8,
            )
            .unwrap();

        // Little-endian TIFF header with a single-entry IFD0
        let mut tiff = vec![b'I', b'I', 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00];
        tiff.extend_from_slice(&1u16.to_le_bytes());
        tiff.extend_from_slice(&0x0112u16.to_le_bytes());
        tiff.extend_from_slice(&3u16.to_le_bytes()); // SHORT
        tiff.extend_from_slice(&1u32.to_le_bytes());
        tiff.extend_from_slice(&orientation.to_le_bytes());
        tiff.extend_from_slice(&[0, 0]);
        tiff.extend_from_slice(&0u32.to_le_bytes());

        let mut app1 = b"Exif\0\0".to_vec();
        app1.extend_from_slice(&tiff);

        let mut out = vec![0xFF, 0xD8, 0xFF, 0xE1];
        out.extend_from_slice(&((app1.len() + 2) as u16).to_be_bytes());
        out.extend_from_slice(&app1);
        out.extend_from_slice(&plain[2..]);
        out
    }

    #[test]
    fn test_reads_orientation() {
        let pixels = RgbImage::from_pixel(4, 2, Rgb([10, 20, 30]));
        let bytes = jpeg_with_orientation(&pixels, 6);
        assert_eq!(read_orientation(&bytes), Some(Orientation::Rotate90CW));
    }

    #[test]
    fn test_out_of_range_orientation_is_absent() {
        let pixels = RgbImage::from_pixel(4, 2, Rgb([10, 20, 30]));
        let bytes = jpeg_with_orientation(&pixels, 9);
        assert_eq!(raw_orientation(&bytes), Some(9));
        assert_eq!(read_orientation(&bytes), None);
    }

    #[test]
    fn test_garbage_is_absent() {
        assert_eq!(read_orientation(&[0x00, 0x01, 0x02]), None);
        assert_eq!(read_orientation(&[]), None);
    }
}
