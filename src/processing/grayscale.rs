//! Luminance conversion.
//!
//! Not on the default backdrop path, which resamples in color and leaves tone
//! mapping to the encoder. Kept callable for encoders and tools that want a
//! single-channel backdrop.

use image::{GenericImageView, GrayImage, Luma, Pixel, Rgba};

/// BT.601 luma of an 8-bit RGBA pixel, with color premultiplied by alpha.
///
/// Samples are widened to 16 bits and weighted 19595 / 38470 / 7471 out of
/// 65536, so pure red is 76, pure green 150 and pure blue 29. A fully
/// transparent pixel is 0 whatever its color.
pub fn luma(px: Rgba<u8>) -> u8 {
    let [r, g, b, a] = px.0;
    let alpha = u64::from(a) * 0x101;
    let widen = |c: u8| u64::from(c) * 0x101 * alpha / 0xffff;
    let y = (19595 * widen(r) + 38470 * widen(g) + 7471 * widen(b) + (1 << 15)) >> 24;
    y.min(255) as u8
}

/// Convert any 8-bit raster to a same-size single-channel luminance raster.
///
/// Each output pixel is the [`luma`] of the source pixel at the same
/// coordinate. Iteration is bounded by the source's own dimensions, so this
/// cannot fail.
pub fn grayscale<I>(src: &I) -> GrayImage
where
    I: GenericImageView,
    I::Pixel: Pixel<Subpixel = u8>,
{
    let (w, h) = src.dimensions();
    GrayImage::from_fn(w, h, |x, y| Luma([luma(src.get_pixel(x, y).to_rgba())]))
}
