//! Histogram entropy as a measure of visual detail.
//!
//! Flat regions score 0; busy, textured regions score high. The crop stages
//! use this to decide which pixels carry the subject.

use crate::histogram::{region_histogram, ChannelHistogram};
use crate::raster::{RasterImage, Region};

/// Shannon entropy (bits) of the pixel values inside `region`.
///
/// All channels share one normalization: `N = width * height * channels`.
/// An empty region scores 0.
pub fn entropy(image: &RasterImage, region: Region) -> f64 {
    histogram_entropy(&region_histogram(image, region))
}

/// Shannon entropy of a histogram, skipping empty bins.
pub fn histogram_entropy(hist: &ChannelHistogram) -> f64 {
    if hist.is_empty() {
        return 0.0;
    }

    let total = hist.samples() as f64;
    let mut entropy = 0.0;
    for count in hist.counts().filter(|&count| count > 0) {
        let p = count as f64 / total;
        entropy -= p * p.log2();
    }
    entropy
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    fn gray(width: u32, height: u32, f: impl Fn(u32, u32) -> u8) -> RasterImage {
        RasterImage::from_gray(GrayImage::from_fn(width, height, |x, y| Luma([f(x, y)])))
    }

    #[test]
    fn test_uniform_region_is_zero() {
        let img = RasterImage::from_rgb(RgbImage::from_pixel(16, 16, Rgb([12, 200, 77])));
        assert_eq!(entropy(&img, Region::full(16, 16)), 0.0);
    }

    #[test]
    fn test_empty_region_is_zero() {
        let img = gray(4, 4, |x, y| (x + y) as u8);
        assert_eq!(entropy(&img, Region::new(0, 0, 0, 0)), 0.0);
    }

    #[test]
    fn test_two_values_is_one_bit() {
        let img = gray(8, 8, |x, _| if x % 2 == 0 { 0 } else { 255 });
        let score = entropy(&img, Region::full(8, 8));
        assert!((score - 1.0).abs() < 1e-12, "got {score}");
    }

    #[test]
    fn test_k_equal_values_is_log2_k() {
        for k in [2u32, 4, 16, 256] {
            let img = gray(k, 4, |x, _| x as u8);
            let score = entropy(&img, Region::full(k, 4));
            assert!(
                (score - (k as f64).log2()).abs() < 1e-9,
                "k={k}: got {score}"
            );
        }
    }

    #[test]
    fn test_channels_share_normalization() {
        // Black and white pixels in equal numbers: 6 bins of 1/6 each
        let img = RasterImage::from_rgb(RgbImage::from_fn(4, 4, |x, _| {
            if x < 2 {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        }));
        let score = entropy(&img, Region::full(4, 4));
        assert!((score - 6f64.log2()).abs() < 1e-9);
    }

    #[test]
    fn test_detail_scores_higher_than_flat() {
        let img = gray(20, 10, |x, y| if x < 10 { 128 } else { (x * 31 + y * 17) as u8 });
        let flat = entropy(&img, Region::new(0, 0, 10, 10));
        let busy = entropy(&img, Region::new(10, 0, 10, 10));
        assert!(busy > flat);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use image::{GrayImage, Luma};
    use proptest::prelude::*;

    proptest! {
        /// Property: Uniform images score zero for any region.
        #[test]
        fn prop_uniform_is_zero(
            (width, height) in (1u32..=40, 1u32..=40),
            value in any::<u8>(),
            (x, y, w, h) in (0u32..40, 0u32..40, 0u32..40, 0u32..40),
        ) {
            let img = RasterImage::from_gray(GrayImage::from_pixel(width, height, Luma([value])));
            prop_assert_eq!(entropy(&img, Region::new(x, y, w, h)), 0.0);
        }

        /// Property: Entropy is non-negative and bounded by log2 of the sample count.
        #[test]
        fn prop_entropy_bounds(
            pixels in proptest::collection::vec(any::<u8>(), 1..400),
        ) {
            let width = pixels.len() as u32;
            let img = RasterImage::from_gray(GrayImage::from_raw(width, 1, pixels).unwrap());
            let score = entropy(&img, Region::full(width, 1));

            prop_assert!(score >= 0.0);
            prop_assert!(score <= (width as f64).log2().min(8.0) + 1e-9);
        }
    }
}
