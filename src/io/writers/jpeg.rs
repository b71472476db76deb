use jpeg_encoder::{ColorType, Encoder};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::Frame;

fn jpeg_side(value: u32, arg: &'static str) -> Result<u16> {
    u16::try_from(value).map_err(|_| Error::invalid_argument(arg, value))
}

/// Alpha is dropped by the encoder.
pub fn write_rgba_jpeg(output: &Path, frame: &Frame, quality: u8) -> Result<()> {
    let cols = jpeg_side(frame.width(), "jpeg_width")?;
    let rows = jpeg_side(frame.height(), "jpeg_height")?;
    let file = File::create(output)?;
    let mut writer = BufWriter::new(file);
    let encoder = Encoder::new(&mut writer, quality);
    encoder
        .encode(frame.pixels(), cols, rows, ColorType::Rgba)
        .map_err(Error::external)?;
    Ok(())
}
