//! # QR Art Backdrop Library
//!
//! Prepares an arbitrary raster image to sit behind a scannable QR code, and
//! normalizes the numeric knobs that control how the art is applied.
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//! - `processing`: Decoding, two-stage backdrop resampling, PNG re-encoding, grayscale
//! - `config`: Raw encode parameters and the file entry point's settings
//! - `target`: Per-module tone maps built from the normalized backdrop
//! - `encoder`: The QR art encoder boundary and a plain `fast_qr` implementation
//! - `session`: Parameter normalization and encode orchestration
//! - `error`: Typed errors with a decode / encode / serialization / IO taxonomy
//!
//! Geometry and pixel resizing live in the `qart-scale` workspace crate.
//!
//! ## Example
//!
//! ```rust
//! use qart_backdrop::config::EncodeParams;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let photo = image::RgbaImage::from_pixel(640, 480, image::Rgba([30, 60, 90, 255]));
//! let mut src = std::io::Cursor::new(Vec::new());
//! photo.write_to(&mut src, image::ImageFormat::Png)?;
//!
//! let params = EncodeParams {
//!     version: 4,
//!     ..Default::default()
//! };
//! let png = qart_backdrop::encode("https://example.com", src.get_ref(), &params)?;
//! assert!(!png.is_empty());
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod config;
pub mod encoder;
pub mod error;
pub mod processing;
pub mod session;
pub mod target;

/// Re-export error types for convenience
pub use error::{ErrorKind, QartError, QartResult};

pub use config::{EncodeParams, FileEncodeConfig};
pub use encoder::{Code, EncodeConfig, EncodedArt, PlainQrEncoder, QrArtEncoder};
pub use processing::{backdrop_png, grayscale};
pub use session::{QartSession, encode, encode_by_file, encode_url, init_image};
pub use target::{LumaTargetBuilder, Target, TargetBuilder};
