use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::OutputFormat;

/// Ad-set generation parameters suitable for config files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParams {
    /// Frames per pan animation
    pub num_frames: usize,
    /// Display time of each pan frame in milliseconds
    pub frame_duration_ms: u64,
    /// Encoding of the static images
    pub format: OutputFormat,
    pub jpeg_quality: u8,
    /// If false, only static images are written
    pub animate: bool,
    /// Seed of the master image, recorded in output names
    pub seed: Option<u64>,
    /// Restrict generation to these catalog names; empty means all
    pub only: Vec<String>,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            num_frames: 40,
            frame_duration_ms: 300,
            format: OutputFormat::Png,
            jpeg_quality: 95,
            animate: true,
            seed: None,
            only: Vec::new(),
        }
    }
}

impl GenerationParams {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let params: Self = serde_json::from_str(&text)?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_frames == 0 {
            return Err(Error::InvalidFrameCount {
                frames: self.num_frames,
            });
        }
        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return Err(Error::invalid_argument("jpeg_quality", self.jpeg_quality));
        }
        Ok(())
    }

    pub fn frame_duration(&self) -> Duration {
        Duration::from_millis(self.frame_duration_ms)
    }
}

/// Captions written onto each sliding-window crop.
pub const DEFAULT_CAPTIONS: &[&str] = &["Buy Now!", "Limited Time Offer!", "Best Prices Guaranteed!"];
/// Caption font sizes in pixels.
pub const DEFAULT_CAPTION_SIZES: &[u32] = &[16, 20, 24];

/// Sliding-window crop parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropParams {
    /// Long side after the initial resize
    pub max_dimension: u32,
    /// Pixels the window moves per step
    pub step_size: u32,
    pub jpeg_quality: u8,
    /// Caption texts; empty disables the text variants
    pub captions: Vec<String>,
    pub caption_sizes: Vec<u32>,
    /// Caption font; the platform defaults are searched when unset
    pub font_path: Option<PathBuf>,
}

impl Default for CropParams {
    fn default() -> Self {
        Self {
            max_dimension: 970,
            step_size: 50,
            jpeg_quality: 95,
            captions: DEFAULT_CAPTIONS.iter().map(|s| s.to_string()).collect(),
            caption_sizes: DEFAULT_CAPTION_SIZES.to_vec(),
            font_path: None,
        }
    }
}

impl CropParams {
    pub fn validate(&self) -> Result<()> {
        if self.max_dimension == 0 {
            return Err(Error::invalid_argument("max_dimension", self.max_dimension));
        }
        if self.step_size == 0 {
            return Err(Error::invalid_argument("step_size", self.step_size));
        }
        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return Err(Error::invalid_argument("jpeg_quality", self.jpeg_quality));
        }
        if let Some(size) = self.caption_sizes.iter().find(|s| **s == 0) {
            return Err(Error::invalid_argument("caption_sizes", size));
        }
        Ok(())
    }

    /// Whether any text variant will be written per crop.
    pub fn wants_captions(&self) -> bool {
        !self.captions.is_empty() && !self.caption_sizes.is_empty()
    }
}
