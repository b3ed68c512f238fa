//! # Configuration Module
//!
//! Raw encode parameters, the file entry point's settings, and the limits the
//! parameter normalizer enforces.

pub mod config;

pub use config::{EncodeParams, FileEncodeConfig};
