//! Shared types and enums used across adtiler.
//! Includes the pixel containers (`SourceImage`, `Frame`), the validated `TargetRect`,
//! `PanAxis`, and the output encoding choice `OutputFormat`.
use clap::ValueEnum;
use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Bytes per interleaved RGBA8 pixel.
pub const CHANNELS: usize = 4;

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Png,
    Jpeg, // Lossy, drops alpha
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
        }
    }

    /// Format implied by the file extension of `path`.
    pub fn from_path(path: &std::path::Path) -> Result<Self> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("png") => Ok(OutputFormat::Png),
            Some("jpg") | Some("jpeg") => Ok(OutputFormat::Jpeg),
            _ => Err(Error::invalid_argument("output", path.display())),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Png => write!(f, "PNG"),
            OutputFormat::Jpeg => write!(f, "JPEG"),
        }
    }
}

/// Direction along which the crop window slides.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanAxis {
    /// Top to bottom.
    Vertical,
    /// Left to right.
    Horizontal,
}

impl PanAxis {
    /// Landscape targets pan vertically; portrait and square targets pan horizontally.
    pub fn for_size(width: u32, height: u32) -> Self {
        if width > height {
            PanAxis::Vertical
        } else {
            PanAxis::Horizontal
        }
    }

    pub fn for_target(target: TargetRect) -> Self {
        Self::for_size(target.width(), target.height())
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            PanAxis::Vertical => "↓",
            PanAxis::Horizontal => "→",
        }
    }
}

impl std::fmt::Display for PanAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PanAxis::Vertical => write!(f, "Vertical"),
            PanAxis::Horizontal => write!(f, "Horizontal"),
        }
    }
}

/// Output size of a frame. Both sides are positive once constructed.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct TargetRect {
    width: u32,
    height: u32,
}

impl TargetRect {
    pub fn new(width: i64, height: i64) -> Result<Self> {
        if width <= 0 || height <= 0 || width > u32::MAX as i64 || height > u32::MAX as i64 {
            return Err(Error::InvalidDimensions { width, height });
        }
        Ok(Self {
            width: width as u32,
            height: height as u32,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn aspect(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

impl std::fmt::Display for TargetRect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl std::str::FromStr for TargetRect {
    type Err = Error;

    /// Parses `WIDTHxHEIGHT`, e.g. `300x250`.
    fn from_str(s: &str) -> Result<Self> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| Error::invalid_argument("size", s))?;
        let w = w
            .trim()
            .parse::<i64>()
            .map_err(|_| Error::invalid_argument("size", s))?;
        let h = h
            .trim()
            .parse::<i64>()
            .map_err(|_| Error::invalid_argument("size", s))?;
        TargetRect::new(w, h)
    }
}

/// Read-only master raster, interleaved RGBA8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl SourceImage {
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::DegenerateSource { width, height });
        }
        let expected = width as usize * height as usize * CHANNELS;
        if pixels.len() != expected {
            return Err(Error::BufferSize {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn from_rgba_image(img: RgbaImage) -> Result<Self> {
        let (width, height) = img.dimensions();
        Self::from_rgba(width, height, img.into_raw())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

/// A derived raster whose size always equals the `TargetRect` it was made for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Frame {
    pub(crate) fn new(target: TargetRect, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            target.width() as usize * target.height() as usize * CHANNELS
        );
        Self {
            width: target.width(),
            height: target.height(),
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// RGBA value at `(x, y)`; `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * CHANNELS;
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    pub fn from_rgba_image(img: RgbaImage) -> Result<Self> {
        let (width, height) = img.dimensions();
        let target = TargetRect::new(width as i64, height as i64)?;
        Ok(Self::new(target, img.into_raw()))
    }

    pub fn into_rgba_image(self) -> Result<RgbaImage> {
        RgbaImage::from_raw(self.width, self.height, self.pixels)
            .ok_or_else(|| Error::Processing("frame buffer does not match its size".to_string()))
    }
}
