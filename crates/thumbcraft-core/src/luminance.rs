//! Luminance weighting for grayscale conversion and gray padding fills.

/// ITU-R BT.709 weights for red, green and blue.
pub const BT709_WEIGHTS: [f32; 3] = [0.2126, 0.7152, 0.0722];

/// Luminance of an 8-bit RGB triple, rounded to the nearest level.
#[inline]
pub fn calculate_luminance_u8(r: u8, g: u8, b: u8) -> u8 {
    let [wr, wg, wb] = BT709_WEIGHTS;
    let lum = wr * r as f32 + wg * g as f32 + wb * b as f32;
    lum.clamp(0.0, 255.0).round() as u8
}
