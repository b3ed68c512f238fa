//! # Encode Parameters and File Defaults
//!
//! Raw caller inputs for an encode, plus the fixed settings the file entry
//! point used to hard-code.
//!
//! ## Parameters
//!
//! | Parameter | Type | Normalized | Description |
//! |-----------|------|------------|-------------|
//! | `seed` | `i64` | unchanged | Seed for randomized control-pixel selection |
//! | `version` | `i32` | clamped to at most 8 | QR symbol size class |
//! | `scale` | `i32` | 0 → 8 | Pixels per module in the rendered code |
//! | `mask` | `i32` | unchanged | Mask pattern id, 0..=7 |
//! | `dx`, `dy` | `i32` | unchanged | Backdrop offset in modules |
//! | `rand_control` | `bool` | unchanged | Randomize control pixels |
//! | `dither` | `bool` | unchanged | Dither the backdrop |
//! | `only_data_bits` | `bool` | unchanged | Only steer data bits, never check bits |
//! | `save_control` | `bool` | unchanged | Output the control bitmap instead of the code |
//! | `size` | `i32` | unchanged, module count capped at 177 | Reserved module-count adjustment |
//!
//! ## Examples
//!
//! ```rust
//! use qart_backdrop::config::config::FileEncodeConfig;
//!
//! let config = FileEncodeConfig::default();
//! assert!(config.validate().is_ok());
//!
//! let params = config.to_params(6);
//! assert_eq!(params.mask, 2);
//! assert_eq!(params.scale, 4);
//! ```

use crate::error::{QartError, QartResult};

/// Largest QR version the normalizer lets through.
pub const MAX_VERSION: i32 = 8;

/// Module scale used when the caller passes 0.
pub const DEFAULT_SCALE: i32 = 8;

/// Versions at or above this halve large scales. Unreachable while `MAX_VERSION` is 8.
pub const HALVE_SCALE_VERSION: i32 = 12;

/// Scales at or above this are halved for large versions.
pub const HALVE_SCALE_MIN: i32 = 4;

/// Largest module count a target is built for: a version 40 symbol is 177
/// modules wide. Bounds `17 + 4 * version + size` for any `size`.
pub const MAX_MODULE_COUNT: i32 = 177;

/// Number of QR mask patterns.
pub const MASK_COUNT: i32 = 8;

/// Permission bits for files written by the file entry point (rw-r--r--).
pub const OUTPUT_FILE_MODE: u32 = 0o644;

/// Raw, un-normalized inputs for a single encode.
///
/// Nothing here is validated; [`crate::session::init_image`] applies the
/// clamping rules when it builds an [`crate::encoder::EncodeConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeParams {
    /// Seed for any randomized control-pixel selection downstream
    pub seed: i64,
    /// Requested QR version
    pub version: i32,
    /// Requested module scale. 0 selects [`DEFAULT_SCALE`].
    pub scale: i32,
    /// Mask pattern id
    pub mask: i32,
    /// Horizontal backdrop offset, in modules
    pub dx: i32,
    /// Vertical backdrop offset, in modules
    pub dy: i32,
    /// Randomize which pixels become control pixels
    pub rand_control: bool,
    /// Dither the backdrop when matching it
    pub dither: bool,
    /// Restrict backdrop matching to data bits
    pub only_data_bits: bool,
    /// Return the control bitmap instead of the finished code
    pub save_control: bool,
    /// Reserved module-count adjustment, always 0 at current call sites
    pub size: i32,
}

impl Default for EncodeParams {
    fn default() -> Self {
        Self {
            seed: 0,
            version: 6,
            scale: 0,
            mask: 0,
            dx: 0,
            dy: 0,
            rand_control: false,
            dither: false,
            only_data_bits: false,
            save_control: false,
            size: 0,
        }
    }
}

/// Settings the file entry point applies on top of a caller-chosen version.
///
/// `Default` reproduces the long-standing constants: seed 879633355, scale 4,
/// mask 2, offset (4, 4) and every flag off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileEncodeConfig {
    pub seed: i64,
    pub scale: i32,
    pub mask: i32,
    pub dx: i32,
    pub dy: i32,
    pub rand_control: bool,
    pub dither: bool,
    pub only_data_bits: bool,
    pub save_control: bool,
}

impl Default for FileEncodeConfig {
    fn default() -> Self {
        Self {
            seed: 879_633_355,
            scale: 4,
            mask: 2,
            dx: 4,
            dy: 4,
            rand_control: false,
            dither: false,
            only_data_bits: false,
            save_control: false,
        }
    }
}

impl FileEncodeConfig {
    /// Check the settings the encoder cannot work around.
    ///
    /// # Errors
    ///
    /// Returns [`QartError::InvalidConfig`] for a negative scale or a mask
    /// outside `0..MASK_COUNT`.
    pub fn validate(&self) -> QartResult<()> {
        if self.scale < 0 {
            return Err(QartError::InvalidConfig(format!(
                "scale must not be negative, got {}",
                self.scale
            )));
        }
        if !(0..MASK_COUNT).contains(&self.mask) {
            return Err(QartError::InvalidConfig(format!(
                "mask must be within 0..={}, got {}",
                MASK_COUNT - 1,
                self.mask
            )));
        }
        Ok(())
    }

    /// Combine these settings with a version into raw encode parameters.
    pub fn to_params(&self, version: i32) -> EncodeParams {
        EncodeParams {
            seed: self.seed,
            version,
            scale: self.scale,
            mask: self.mask,
            dx: self.dx,
            dy: self.dy,
            rand_control: self.rand_control,
            dither: self.dither,
            only_data_bits: self.only_data_bits,
            save_control: self.save_control,
            size: 0,
        }
    }
}
