use std::path::Path;

use image::{ColorType, ImageFormat};

use crate::error::Result;
use crate::types::Frame;

pub fn write_rgba_png(output: &Path, frame: &Frame) -> Result<()> {
    image::save_buffer_with_format(
        output,
        frame.pixels(),
        frame.width(),
        frame.height(),
        ColorType::Rgba8,
        ImageFormat::Png,
    )?;
    Ok(())
}
