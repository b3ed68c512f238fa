//! # Backdrop Normalization
//!
//! Turns arbitrary user-supplied image bytes into the small RGBA PNG a QR art
//! encoder consumes.
//!
//! ## Pipeline
//!
//! 1. Sniff the format from content and decode (extension never consulted)
//! 2. Convert to RGBA8 whatever the source color model
//! 3. Plan and run the two-stage resample (see [`qart_scale::presets`])
//! 4. Re-encode as PNG in memory
//!
//! The output's long side is always exactly 128px; the short side is
//! proportional, truncated toward zero, and never less than 1px.

use std::io::Cursor;

use fast_image_resize::Resizer;
use image::{DynamicImage, GenericImageView, ImageFormat, RgbaImage};
use qart_scale::cpu::resample_two_stage;
use qart_scale::presets::{BackdropTarget, ResampleOptions, Size, build_plan};

use crate::error::{QartError, QartResult};

/// Decode image bytes of any format the `image` crate recognizes.
///
/// # Errors
///
/// Returns [`QartError::EmptyInput`] for an empty slice and
/// [`QartError::Decode`] if the format is unrecognized or the data is corrupt.
pub fn decode(bytes: &[u8]) -> QartResult<DynamicImage> {
    if bytes.is_empty() {
        return Err(QartError::EmptyInput);
    }
    let img = image::load_from_memory(bytes)?;
    let (w, h) = img.dimensions();
    log::debug!("decoded {}x{} {:?} image", w, h, img.color());
    Ok(img)
}

/// Resample a decoded image into an RGBA raster bounded by 128px on its long side.
pub fn resample(img: &DynamicImage, options: ResampleOptions) -> QartResult<RgbaImage> {
    // Geometrically a no-op for small inputs; only normalizes the pixel format.
    let rgba = img.to_rgba8();
    let (w, h) = rgba.dimensions();

    let plan = build_plan(Size::new(w, h), BackdropTarget::QR_ART);
    let mut resizer = Resizer::new();
    let out = resample_two_stage(&mut resizer, rgba.as_raw(), &plan, options)?;

    log::debug!(
        "backdrop {}x{} -> {}x{} (coarse pass: {})",
        w,
        h,
        plan.out.w,
        plan.out.h,
        plan.pre_downsample
    );

    RgbaImage::from_raw(plan.out.w, plan.out.h, out).ok_or_else(|| {
        QartError::Serialization(format!(
            "resampled buffer does not match {}x{}",
            plan.out.w, plan.out.h
        ))
    })
}

/// Serialize an RGBA raster as PNG bytes.
///
/// # Errors
///
/// Returns [`QartError::Serialization`]; no partial output is ever returned.
pub fn encode_png(img: &RgbaImage) -> QartResult<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| QartError::Serialization(e.to_string()))?;
    Ok(buf.into_inner())
}

/// Resample a decoded image and serialize the result as PNG.
pub fn convert_to_png(img: &DynamicImage, options: ResampleOptions) -> QartResult<Vec<u8>> {
    encode_png(&resample(img, options)?)
}

/// Decode, resample and re-encode in one call.
///
/// # Examples
///
/// ```rust
/// use qart_backdrop::processing::backdrop_png;
/// use qart_scale::presets::ResampleOptions;
///
/// let src = image::RgbaImage::from_pixel(300, 150, image::Rgba([90, 120, 200, 255]));
/// let mut bytes = std::io::Cursor::new(Vec::new());
/// src.write_to(&mut bytes, image::ImageFormat::Png)?;
///
/// let png = backdrop_png(bytes.get_ref(), ResampleOptions::default())?;
/// let out = image::load_from_memory(&png)?;
/// assert_eq!((out.width(), out.height()), (128, 64));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn backdrop_png(bytes: &[u8], options: ResampleOptions) -> QartResult<Vec<u8>> {
    convert_to_png(&decode(bytes)?, options)
}
