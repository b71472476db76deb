pub mod gif;
pub mod jpeg;
pub mod manifest;
pub mod png;

use std::path::Path;

use crate::error::Result;
use crate::types::{Frame, OutputFormat};

/// Writes a static frame in the requested format.
pub fn write_frame(output: &Path, frame: &Frame, format: OutputFormat, quality: u8) -> Result<()> {
    match format {
        OutputFormat::Png => png::write_rgba_png(output, frame),
        OutputFormat::Jpeg => jpeg::write_rgba_jpeg(output, frame, quality),
    }
}
