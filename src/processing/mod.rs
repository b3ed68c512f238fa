//! # Processing Module
//!
//! Raster normalization for QR art backdrops: decoding, the two-stage resample
//! and PNG re-encoding, plus the standalone grayscale primitive.

pub mod backdrop;
pub mod grayscale;

pub use backdrop::{backdrop_png, convert_to_png, decode, encode_png, resample};
pub use grayscale::{grayscale, luma};
