use std::path::PathBuf;

use thiserror::Error;

/// Application-specific errors for the CLI
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Input not found: {path:?}")]
    MissingInput { path: PathBuf },

    #[error("No saved overlay for {image:?} in {json_dir:?}")]
    NoSavedOverlay { image: PathBuf, json_dir: PathBuf },

    #[error("Pass --json or --image")]
    OverlaySourceMissing,

    #[error("Crop batch finished with {errors} failed image(s)")]
    BatchFailures { errors: usize },

    #[error(transparent)]
    Library(#[from] adtiler::Error),
}
