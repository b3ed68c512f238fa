//! # Target Bitmaps
//!
//! A target is a per-module map of the tone the backdrop wants at each QR
//! module. Encoders read it to decide which freely choosable modules to paint
//! dark or light. It is built once per encode from the normalized backdrop PNG
//! and never mutated afterwards.
//!
//! Building a target is pluggable through [`TargetBuilder`]; [`LumaTargetBuilder`]
//! is the stock implementation.

use fast_image_resize::Resizer;
use image::{GenericImageView, Rgba};
use qart_scale::cpu::resize_rgba;
use qart_scale::presets::{ResampleFilter, Size, fit_long_side};

use crate::config::config::MAX_MODULE_COUNT;
use crate::error::{QartError, QartResult};
use crate::processing::luma;

/// Read-only per-module tone map.
///
/// `None` marks a module the backdrop has no opinion about (transparent
/// source pixels). The map is at most `module_count` wide and tall and keeps
/// the backdrop's aspect ratio, so one side may be shorter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    width: u32,
    height: u32,
    cells: Vec<Option<u8>>,
}

impl Target {
    /// Build a target from row-major cells.
    ///
    /// # Errors
    ///
    /// Returns [`QartError::TargetBuild`] when `cells` does not hold exactly
    /// `width * height` entries.
    pub fn from_cells(width: u32, height: u32, cells: Vec<Option<u8>>) -> QartResult<Self> {
        let expected = (width as usize) * (height as usize);
        if cells.len() != expected {
            return Err(QartError::TargetBuild(format!(
                "{} cells given for a {}x{} target",
                cells.len(),
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Tone at module `(x, y)`, or `None` if out of range or transparent.
    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells[(y * self.width + x) as usize]
    }

    /// Iterate rows top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Option<u8>]> {
        self.cells.chunks_exact(self.width.max(1) as usize)
    }
}

/// Derives a [`Target`] from normalized backdrop PNG bytes.
pub trait TargetBuilder {
    /// Build a target no larger than `module_count × module_count`.
    fn build_target(&self, png: &[u8], module_count: i32) -> QartResult<Target>;
}

/// Stock builder: fit, resize, then take per-pixel luma.
///
/// Tones come from [`luma`], the same conversion as
/// [`crate::processing::grayscale()`]. Pixels whose alpha is at or below
/// `transparent_below` become `None`.
#[derive(Debug, Clone, Copy)]
pub struct LumaTargetBuilder {
    pub filter: ResampleFilter,
    pub transparent_below: u8,
}

impl Default for LumaTargetBuilder {
    fn default() -> Self {
        Self {
            filter: ResampleFilter::Bilinear,
            transparent_below: 0,
        }
    }
}

impl TargetBuilder for LumaTargetBuilder {
    fn build_target(&self, png: &[u8], module_count: i32) -> QartResult<Target> {
        let side = u32::try_from(module_count)
            .ok()
            .filter(|&side| side > 0 && side <= MAX_MODULE_COUNT as u32)
            .ok_or_else(|| {
                QartError::InvalidConfig(format!(
                    "module count must be within 1..={}, got {}",
                    MAX_MODULE_COUNT, module_count
                ))
            })?;

        let img = image::load_from_memory(png)
            .map_err(|e| QartError::TargetBuild(format!("backdrop is not decodable: {}", e)))?;
        let rgba = img.to_rgba8();
        let (w, h) = img.dimensions();
        let src = Size::new(w, h);
        let out = fit_long_side(src, side);

        let mut resizer = Resizer::new();
        let resized = resize_rgba(&mut resizer, rgba.as_raw(), src, out, self.filter)?;

        let cells = resized
            .chunks_exact(4)
            .map(|px| {
                if px[3] <= self.transparent_below {
                    None
                } else {
                    Some(luma(Rgba([px[0], px[1], px[2], px[3]])))
                }
            })
            .collect();

        log::debug!("target {}x{} for {} modules", out.w, out.h, side);
        Target::from_cells(out.w, out.h, cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png_of(img: &RgbaImage) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_tones_match_grayscale() {
        let backdrop = RgbaImage::from_pixel(21, 21, Rgba([255, 0, 0, 255]));
        let target = LumaTargetBuilder::default().build_target(&png_of(&backdrop), 21).unwrap();
        assert_eq!(target.get(10, 10), Some(76));
        assert_eq!(crate::processing::grayscale(&backdrop).get_pixel(10, 10).0, [76]);
    }

    #[test]
    fn test_square_backdrop_fills_module_grid() {
        let png = png_of(&RgbaImage::from_pixel(128, 128, Rgba([255, 255, 255, 255])));
        let target = LumaTargetBuilder::default().build_target(&png, 41).unwrap();
        assert_eq!((target.width(), target.height()), (41, 41));
        assert!(target.get(20, 20).is_some_and(|v| v >= 250));
        assert_eq!(target.get(41, 0), None);
    }

    #[test]
    fn test_landscape_backdrop_keeps_aspect() {
        let png = png_of(&RgbaImage::from_pixel(128, 64, Rgba([0, 0, 0, 255])));
        let target = LumaTargetBuilder::default().build_target(&png, 25).unwrap();
        assert_eq!((target.width(), target.height()), (25, 12));
        assert_eq!(target.rows().count(), 12);
    }

    #[test]
    fn test_transparent_pixels_have_no_preference() {
        let png = png_of(&RgbaImage::from_pixel(32, 32, Rgba([255, 0, 0, 0])));
        let target = LumaTargetBuilder::default().build_target(&png, 21).unwrap();
        assert!(target.rows().flatten().all(Option::is_none));
    }

    #[test]
    fn test_non_positive_module_count_is_config_error() {
        let png = png_of(&RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 255])));
        let err = LumaTargetBuilder::default().build_target(&png, 0).unwrap_err();
        assert!(matches!(err, QartError::InvalidConfig(_)));
        let err = LumaTargetBuilder::default().build_target(&png, -3).unwrap_err();
        assert!(matches!(err, QartError::InvalidConfig(_)));
    }

    #[test]
    fn test_oversized_module_count_is_config_error() {
        let png = png_of(&RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 255])));
        let builder = LumaTargetBuilder::default();
        assert!(builder.build_target(&png, MAX_MODULE_COUNT).is_ok());
        for count in [MAX_MODULE_COUNT + 1, 100_049, i32::MAX] {
            let err = builder.build_target(&png, count).unwrap_err();
            assert!(matches!(err, QartError::InvalidConfig(_)), "{}", count);
        }
    }

    #[test]
    fn test_from_cells_checks_length() {
        assert!(Target::from_cells(2, 2, vec![None; 3]).is_err());
        let target = Target::from_cells(2, 1, vec![Some(1), None]).unwrap();
        assert_eq!(target.get(0, 0), Some(1));
        assert_eq!(target.get(1, 0), None);
    }
}
