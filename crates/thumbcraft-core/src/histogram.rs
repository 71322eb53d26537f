//! Per-channel histograms over image regions.
//!
//! Histograms are the input to entropy scoring: each channel gets 256 bins,
//! and indexed images are counted over their palette indices.

use crate::raster::{eight_bit, RasterImage, Region};

/// 256-bin counts for every channel of a region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelHistogram {
    bins: Vec<[u64; 256]>,
    samples: u64,
}

impl ChannelHistogram {
    fn empty(channels: usize) -> Self {
        Self {
            bins: vec![[0; 256]; channels],
            samples: 0,
        }
    }

    pub fn channel_count(&self) -> usize {
        self.bins.len()
    }

    /// Bins for one channel. Panics if `channel` is out of range.
    pub fn channel(&self, channel: usize) -> &[u64; 256] {
        &self.bins[channel]
    }

    /// Iterate over every bin of every channel.
    pub fn counts(&self) -> impl Iterator<Item = u64> + '_ {
        self.bins.iter().flat_map(|bins| bins.iter().copied())
    }

    /// Total pixel-channel samples: `width * height * channel_count`.
    pub fn samples(&self) -> u64 {
        self.samples
    }

    pub fn is_empty(&self) -> bool {
        self.samples == 0
    }
}

/// Count sample values inside `region`.
///
/// The region is clamped to the image. Buffers with wider samples are reduced
/// to 8 bits first; the channel count is unchanged.
///
/// # Performance
/// Single pass over the region rows, no pixel copies for 8-bit buffers.
pub fn region_histogram(image: &RasterImage, region: Region) -> ChannelHistogram {
    let region = region.clamp_to(image.width(), image.height());
    let buffer = eight_bit(image.buffer());
    let channels = buffer.color().channel_count() as usize;
    let mut hist = ChannelHistogram::empty(channels);

    if region.is_empty() {
        return hist;
    }

    let bytes = buffer.as_bytes();
    let stride = image.width() as usize * channels;
    let row_len = region.width as usize * channels;

    for row in region.y..region.bottom() {
        let start = row as usize * stride + region.x as usize * channels;
        for pixel in bytes[start..start + row_len].chunks_exact(channels) {
            for (bins, &value) in hist.bins.iter_mut().zip(pixel) {
                bins[value as usize] += 1;
            }
        }
    }

    hist.samples = region.width as u64 * region.height as u64 * channels as u64;
    hist
}
