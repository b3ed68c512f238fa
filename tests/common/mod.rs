//! Common test utilities for the qart-backdrop integration tests
//!
//! Fixtures are generated in memory with the `image` crate so the tests need
//! no files on disk.

#![allow(dead_code)]

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

/// Diagonal gradient with a fully opaque alpha channel.
pub fn gradient(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        let r = (x * 255 / width.max(1)) as u8;
        let g = (y * 255 / height.max(1)) as u8;
        Rgba([r, g, 128, 255])
    })
}

/// Encode an RGBA raster in the given container format.
pub fn encode_as(img: &RgbaImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    match format {
        // JPEG has no alpha channel
        ImageFormat::Jpeg => DynamicImage::ImageRgba8(img.clone())
            .to_rgb8()
            .write_to(&mut buf, format)
            .expect("encode fixture"),
        _ => img.write_to(&mut buf, format).expect("encode fixture"),
    }
    buf.into_inner()
}

/// PNG bytes of a gradient fixture.
pub fn png(width: u32, height: u32) -> Vec<u8> {
    encode_as(&gradient(width, height), ImageFormat::Png)
}

/// Decode PNG output bytes and return its dimensions.
pub fn png_dimensions(bytes: &[u8]) -> (u32, u32) {
    let img = image::load_from_memory_with_format(bytes, ImageFormat::Png).expect("valid PNG output");
    (img.width(), img.height())
}
