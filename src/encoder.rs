//! # QR Art Encoding Boundary
//!
//! The QR art encoder itself (symbol construction, error correction, mask
//! handling and the backdrop merge) sits behind [`QrArtEncoder`]. This module
//! defines what crosses that boundary:
//!
//! - [`EncodeConfig`]: the fully normalized request, built once per call
//! - [`EncodedArt`]: the finished module matrix plus its control bitmap
//! - [`Code`]: a square module matrix that renders itself to PNG
//!
//! [`PlainQrEncoder`] is the stock implementation. It emits a standard symbol
//! at the requested version and mask and leaves every module forced, which
//! keeps the pipeline runnable end to end without an artistic merge.

use std::io::Cursor;

use fast_qr::{ECL, Mask, QRBuilder, Version};
use image::{GrayImage, ImageFormat, Luma, Rgba, RgbaImage};

use crate::error::{QartError, QartResult};
use crate::target::Target;

/// Light modules kept around the symbol, in modules.
pub const QUIET_ZONE: usize = 4;

/// Largest rendered side, in pixels, a [`Code`] accepts.
pub const MAX_PIXEL_SIDE: u32 = 8192;

/// Fully normalized encode request.
///
/// Built by [`crate::session::init_image`]; only `url` is filled in later, by
/// [`crate::session::encode_url`], right before the encoder runs.
#[derive(Debug, Clone)]
pub struct EncodeConfig {
    /// Horizontal backdrop offset, in modules
    pub dx: i32,
    /// Vertical backdrop offset, in modules
    pub dy: i32,
    /// Payload to encode
    pub url: String,
    /// QR version, already clamped
    pub version: i32,
    /// Mask pattern id
    pub mask: i32,
    pub rand_control: bool,
    pub dither: bool,
    pub only_data_bits: bool,
    /// Output selector: control bitmap instead of the finished code
    pub save_control: bool,
    /// Pixels per module, already defaulted
    pub scale: i32,
    /// Per-module tone map derived from the backdrop
    pub target: Target,
    pub seed: i64,
    /// Quarter turns applied to the finished symbol. Always 0 from the normalizer.
    pub rotation: i32,
    /// Reserved module-count adjustment
    pub size: i32,
}

/// Square module matrix with its render scale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Code {
    size: usize,
    dark: Vec<bool>,
    scale: u32,
}

impl Code {
    /// Build a code from row-major dark flags.
    ///
    /// # Errors
    ///
    /// Returns [`QartError::Encode`] if `dark` is not `size × size`, if
    /// `scale` is 0, or if the rendered side would exceed [`MAX_PIXEL_SIDE`].
    pub fn new(size: usize, dark: Vec<bool>, scale: u32) -> QartResult<Self> {
        if size == 0 || size.checked_mul(size) != Some(dark.len()) {
            return Err(QartError::Encode(format!(
                "{} modules do not form a {}x{} symbol",
                dark.len(),
                size,
                size
            )));
        }
        if scale == 0 {
            return Err(QartError::Encode("module scale must be at least 1".to_string()));
        }
        let side = u32::try_from(size + 2 * QUIET_ZONE)
            .ok()
            .and_then(|modules| modules.checked_mul(scale));
        if !side.is_some_and(|side| side <= MAX_PIXEL_SIDE) {
            return Err(QartError::Encode(format!(
                "{} modules at scale {} exceed {} pixels per side",
                size, scale, MAX_PIXEL_SIDE
            )));
        }
        Ok(Self { size, dark, scale })
    }

    /// Modules per side.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Whether module `(x, y)` is dark. Out-of-range modules read as light.
    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        x < self.size && y < self.size && self.dark[y * self.size + x]
    }

    /// Rotate clockwise by `quarters` quarter turns (negative turns counterclockwise).
    pub fn rotated(&self, quarters: i32) -> Self {
        let n = self.size;
        let mut dark = vec![false; n * n];
        for y in 0..n {
            for x in 0..n {
                let (sx, sy) = match quarters.rem_euclid(4) {
                    0 => (x, y),
                    1 => (y, n - 1 - x),
                    2 => (n - 1 - x, n - 1 - y),
                    _ => (n - 1 - y, x),
                };
                dark[y * n + x] = self.dark[sy * n + sx];
            }
        }
        Self {
            size: n,
            dark,
            scale: self.scale,
        }
    }

    /// Side length in pixels of the rendered code, quiet zone included.
    ///
    /// Never above [`MAX_PIXEL_SIDE`].
    pub fn pixel_side(&self) -> u32 {
        ((self.size + 2 * QUIET_ZONE) as u32) * self.scale
    }

    /// Render black and white modules with the quiet zone.
    pub fn to_image(&self) -> GrayImage {
        let scale = self.scale as usize;
        let side = self.pixel_side();
        GrayImage::from_fn(side, side, |px, py| {
            let mx = (px as usize / scale).checked_sub(QUIET_ZONE);
            let my = (py as usize / scale).checked_sub(QUIET_ZONE);
            match (mx, my) {
                (Some(x), Some(y)) if self.is_dark(x, y) => Luma([0]),
                _ => Luma([255]),
            }
        })
    }

    /// Render the code as grayscale PNG bytes.
    pub fn to_png(&self) -> QartResult<Vec<u8>> {
        let mut buf = Cursor::new(Vec::new());
        self.to_image()
            .write_to(&mut buf, ImageFormat::Png)
            .map_err(|e| QartError::Serialization(e.to_string()))?;
        Ok(buf.into_inner())
    }
}

/// Result of a successful encode.
#[derive(Debug, Clone)]
pub struct EncodedArt {
    /// Finished module matrix
    pub code: Code,
    /// PNG showing which modules were freely chosen and which were forced
    pub control: Vec<u8>,
}

/// Anything that can turn an [`EncodeConfig`] into finished QR art.
pub trait QrArtEncoder {
    fn encode(&self, config: &EncodeConfig) -> QartResult<EncodedArt>;
}

/// Render a control bitmap for `code`.
///
/// Free modules are painted in the target's tone at that module (offset by
/// `dx`, `dy`), mid gray where the target has no opinion. Forced modules are
/// painted dark red or pale red by their value.
pub fn render_control(code: &Code, free: &[bool], target: &Target, dx: i32, dy: i32) -> QartResult<Vec<u8>> {
    let n = code.size();
    if free.len() != n * n {
        return Err(QartError::Encode(format!(
            "control mask has {} entries for a {}x{} symbol",
            free.len(),
            n,
            n
        )));
    }

    let scale = code.scale() as usize;
    let side = code.pixel_side();
    let img = RgbaImage::from_fn(side, side, |px, py| {
        let mx = (px as usize / scale).checked_sub(QUIET_ZONE).filter(|&x| x < n);
        let my = (py as usize / scale).checked_sub(QUIET_ZONE).filter(|&y| y < n);
        let (Some(x), Some(y)) = (mx, my) else {
            return Rgba([255, 255, 255, 255]);
        };
        if free[y * n + x] {
            let tx = u32::try_from(x as i64 - i64::from(dx)).ok();
            let ty = u32::try_from(y as i64 - i64::from(dy)).ok();
            let tone = tx.zip(ty).and_then(|(tx, ty)| target.get(tx, ty)).unwrap_or(128);
            Rgba([tone, tone, tone, 255])
        } else if code.is_dark(x, y) {
            Rgba([96, 0, 0, 255])
        } else {
            Rgba([255, 192, 192, 255])
        }
    });

    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| QartError::Serialization(e.to_string()))?;
    Ok(buf.into_inner())
}

/// Standard QR symbol with no backdrop merge, built with `fast_qr`.
///
/// Uses error correction level L. Honors version, mask, scale and rotation;
/// the target, seed and behavior flags are accepted and ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainQrEncoder;

impl QrArtEncoder for PlainQrEncoder {
    fn encode(&self, config: &EncodeConfig) -> QartResult<EncodedArt> {
        let version = qr_version(config.version)?;
        let mask = qr_mask(config.mask)?;
        let scale = u32::try_from(config.scale)
            .ok()
            .filter(|&s| s > 0)
            .ok_or_else(|| QartError::Encode(format!("module scale must be positive, got {}", config.scale)))?;

        let qr = QRBuilder::new(config.url.as_str())
            .ecl(ECL::L)
            .version(version)
            .mask(mask)
            .build()
            .map_err(|e| QartError::Encode(format!("version {}: {}", config.version, e)))?;

        let n = qr.size;
        let mut dark = Vec::with_capacity(n * n);
        for row in 0..n {
            for col in 0..n {
                dark.push(qr[row][col].value());
            }
        }
        let code = Code::new(n, dark, scale)?.rotated(config.rotation);

        let control = render_control(&code, &vec![false; n * n], &config.target, config.dx, config.dy)?;

        log::debug!(
            "plain encode: {} modules, version {}, mask {}",
            n,
            config.version,
            config.mask
        );
        Ok(EncodedArt { code, control })
    }
}

const VERSIONS: [Version; 40] = [
    Version::V01,
    Version::V02,
    Version::V03,
    Version::V04,
    Version::V05,
    Version::V06,
    Version::V07,
    Version::V08,
    Version::V09,
    Version::V10,
    Version::V11,
    Version::V12,
    Version::V13,
    Version::V14,
    Version::V15,
    Version::V16,
    Version::V17,
    Version::V18,
    Version::V19,
    Version::V20,
    Version::V21,
    Version::V22,
    Version::V23,
    Version::V24,
    Version::V25,
    Version::V26,
    Version::V27,
    Version::V28,
    Version::V29,
    Version::V30,
    Version::V31,
    Version::V32,
    Version::V33,
    Version::V34,
    Version::V35,
    Version::V36,
    Version::V37,
    Version::V38,
    Version::V39,
    Version::V40,
];

fn qr_version(version: i32) -> QartResult<Version> {
    usize::try_from(version)
        .ok()
        .and_then(|v| v.checked_sub(1))
        .and_then(|i| VERSIONS.get(i).cloned())
        .ok_or_else(|| QartError::Encode(format!("QR version must be within 1..=40, got {}", version)))
}

fn qr_mask(mask: i32) -> QartResult<Mask> {
    Ok(match mask {
        0 => Mask::Checkerboard,
        1 => Mask::HorizontalLines,
        2 => Mask::VerticalLines,
        3 => Mask::DiagonalLines,
        4 => Mask::LargeCheckerboard,
        5 => Mask::Fields,
        6 => Mask::Diamonds,
        7 => Mask::Meadow,
        other => {
            return Err(QartError::Encode(format!(
                "mask must be within 0..=7, got {}",
                other
            )));
        }
    })
}
