use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame as GifFrame};
use tracing::debug;

use crate::core::processing::tiler::PanSequence;
use crate::error::Result;

/// NeuQuant sampling factor (1 is slowest, 30 fastest).
const QUANTIZER_SPEED: i32 = 10;

/// Encodes the pan as an animated GIF, looping forever when the sequence asks for it.
pub fn write_pan_gif(output: &Path, sequence: &PanSequence) -> Result<()> {
    let mut frames = Vec::with_capacity(sequence.len());
    for frame in &sequence.frames {
        let buffer = frame.image.clone().into_rgba_image()?;
        let delay = Delay::from_saturating_duration(frame.duration);
        frames.push(GifFrame::from_parts(buffer, 0, 0, delay));
    }
    write_gif_frames(output, frames, sequence.loop_forever)?;
    Ok(())
}

/// Writes full-canvas RGBA frames as a GIF. Returns the number of frames written.
pub fn write_gif_frames<I>(output: &Path, frames: I, loop_forever: bool) -> Result<usize>
where
    I: IntoIterator<Item = GifFrame>,
{
    let file = File::create(output)?;
    let mut encoder = GifEncoder::new_with_speed(BufWriter::new(file), QUANTIZER_SPEED);
    encoder.set_repeat(if loop_forever {
        Repeat::Infinite
    } else {
        Repeat::Finite(0)
    })?;

    let mut count = 0;
    for frame in frames {
        encoder.encode_frame(frame)?;
        count += 1;
    }
    debug!("Wrote {} GIF frames to {:?}", count, output);
    Ok(count)
}
