//! # Error Handling
//!
//! Every fallible operation in this crate returns [`QartResult`]. The variants of
//! [`QartError`] fold into a small [`ErrorKind`] taxonomy so callers can tell a bad
//! input image apart from an encoder rejection or a filesystem problem without
//! matching on message text.
//!
//! ## Usage
//!
//! ```rust
//! use qart_backdrop::error::{ErrorKind, QartError};
//!
//! let error = QartError::Encode("data too long for version 1".to_string());
//! assert_eq!(error.kind(), ErrorKind::Encode);
//! ```

use std::path::PathBuf;

/// Coarse classification of a [`QartError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Input bytes are not a recognizable image
    Decode,
    /// The QR art encoder or target builder rejected the request
    Encode,
    /// Re-encoding a raster to PNG failed
    Serialization,
    /// Reading or writing a file failed
    Io,
    /// A caller-supplied setting is out of range
    Config,
}

/// Errors produced while preparing and encoding a QR art backdrop.
#[derive(Debug, thiserror::Error)]
pub enum QartError {
    #[error("Image decode error: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Image decode error: input is empty")]
    EmptyInput,

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("Target build error: {0}")]
    TargetBuild(String),

    #[error("PNG serialization error: {0}")]
    Serialization(String),

    #[error("Resample error: {0}")]
    Scale(#[from] qart_scale::cpu::ScaleError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl QartError {
    /// Wrap an IO error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Which taxonomy bucket this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            QartError::Decode(_) | QartError::EmptyInput => ErrorKind::Decode,
            QartError::Encode(_) | QartError::TargetBuild(_) => ErrorKind::Encode,
            QartError::Serialization(_) | QartError::Scale(_) => ErrorKind::Serialization,
            QartError::InvalidConfig(_) => ErrorKind::Config,
            QartError::Io { .. } => ErrorKind::Io,
        }
    }
}

/// Result alias used throughout the crate.
pub type QartResult<T> = Result<T, QartError>;
