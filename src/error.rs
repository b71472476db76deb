//! Crate-level error type and `Result` alias for structured error handling.
//! Contract violations (bad target sizes, empty sources) get their own variants so
//! callers can reject them at the boundary; I/O, codec and JSON errors are converted.
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Target dimensions must be positive, got: {width}x{height}")]
    InvalidDimensions { width: i64, height: i64 },

    #[error("Source image must be at least 1x1 pixels, got: {width}x{height}")]
    DegenerateSource { width: u32, height: u32 },

    #[error("Pixel buffer has {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },

    #[error("Pan needs at least one frame, got: {frames}")]
    InvalidFrameCount { frames: usize },

    #[error("Invalid argument: {arg}={value}")]
    InvalidArgument { arg: &'static str, value: String },

    #[error("No usable font file for {family:?}")]
    MissingFont { family: String },

    #[error("Not a readable TrueType/OpenType font: {path:?}")]
    InvalidFont { path: PathBuf },

    #[error("Unknown color: {0:?}")]
    InvalidColor(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image codec error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("External error: {0}")]
    External(String),
}

impl Error {
    pub fn external<E: std::fmt::Display>(e: E) -> Self {
        Error::External(e.to_string())
    }

    pub(crate) fn invalid_argument<V: std::fmt::Display>(arg: &'static str, value: V) -> Self {
        Error::InvalidArgument {
            arg,
            value: value.to_string(),
        }
    }
}
