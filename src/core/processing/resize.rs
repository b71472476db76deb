use fast_image_resize::{
    FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer, images::Image, images::ImageRef,
};
use tracing::{debug, info};

use crate::core::geometry::CropBox;
use crate::error::{Error, Result};
use crate::types::{Frame, SourceImage, TargetRect};

/// Dimensions after scaling so the long side equals `max_dimension`.
/// Square images keep their size.
pub fn calculate_resize_dimensions(
    original_cols: u32,
    original_rows: u32,
    max_dimension: u32,
) -> (u32, u32) {
    if original_rows > original_cols {
        let aspect_ratio = original_cols as f64 / original_rows as f64;
        let new_cols = ((max_dimension as f64 * aspect_ratio) as u32).max(1);
        (new_cols, max_dimension)
    } else if original_cols > original_rows {
        let aspect_ratio = original_rows as f64 / original_cols as f64;
        let new_rows = ((max_dimension as f64 * aspect_ratio) as u32).max(1);
        (max_dimension, new_rows)
    } else {
        (original_cols, original_rows)
    }
}

/// Lanczos3 resampler that reads a crop window straight out of the source buffer.
pub struct FrameResampler {
    resizer: Resizer,
}

impl FrameResampler {
    pub fn new() -> Self {
        Self {
            resizer: Resizer::new(),
        }
    }

    pub fn crop_and_resize(
        &mut self,
        source: &SourceImage,
        crop: CropBox,
        target: TargetRect,
    ) -> Result<Frame> {
        if !crop.fits_within(source.width(), source.height()) {
            return Err(Error::Processing(format!(
                "crop {:?} outside source {}x{}",
                crop,
                source.width(),
                source.height()
            )));
        }
        debug!(
            "Crop window {}x{}+{}+{} -> {}",
            crop.width, crop.height, crop.left, crop.top, target
        );

        let src_image = ImageRef::new(
            source.width(),
            source.height(),
            source.pixels(),
            PixelType::U8x4,
        )
        .map_err(Error::external)?;
        let mut dst_image = Image::new(target.width(), target.height(), PixelType::U8x4);

        let resize_options = ResizeOptions::new()
            .resize_alg(ResizeAlg::Convolution(FilterType::Lanczos3))
            .crop(
                crop.left as f64,
                crop.top as f64,
                crop.width as f64,
                crop.height as f64,
            );
        self.resizer
            .resize(&src_image, &mut dst_image, &resize_options)
            .map_err(Error::external)?;

        Ok(Frame::new(target, dst_image.into_vec()))
    }
}

impl Default for FrameResampler {
    fn default() -> Self {
        Self::new()
    }
}

/// Scales the whole image so its long side is `max_dimension`.
pub fn resize_long_side(source: &SourceImage, max_dimension: u32) -> Result<SourceImage> {
    if max_dimension == 0 {
        return Err(Error::invalid_argument("max_dimension", max_dimension));
    }
    let (new_cols, new_rows) =
        calculate_resize_dimensions(source.width(), source.height(), max_dimension);
    if (new_cols, new_rows) == (source.width(), source.height()) {
        info!(
            "Keeping original size {}x{}",
            source.width(),
            source.height()
        );
        return Ok(source.clone());
    }

    info!(
        "Original size: {}x{}, New size: {}x{}",
        source.width(),
        source.height(),
        new_cols,
        new_rows
    );
    let target = TargetRect::new(new_cols as i64, new_rows as i64)?;
    let frame = FrameResampler::new().crop_and_resize(
        source,
        CropBox::full(source.width(), source.height()),
        target,
    )?;
    let (width, height) = frame.dimensions();
    SourceImage::from_rgba(width, height, frame.pixels().to_vec())
}

/// Copies `crop` out of `source` without resampling.
pub fn extract_region(source: &SourceImage, crop: CropBox) -> Result<Frame> {
    if !crop.fits_within(source.width(), source.height()) {
        return Err(Error::Processing(format!(
            "crop {:?} outside source {}x{}",
            crop,
            source.width(),
            source.height()
        )));
    }
    let target = TargetRect::new(crop.width as i64, crop.height as i64)?;
    let row_bytes = crop.width as usize * crate::types::CHANNELS;
    let stride = source.width() as usize * crate::types::CHANNELS;
    let mut out = Vec::with_capacity(row_bytes * crop.height as usize);
    // Copy per row using slice copies
    for row in crop.top as usize..crop.top as usize + crop.height as usize {
        let start = row * stride + crop.left as usize * crate::types::CHANNELS;
        out.extend_from_slice(&source.pixels()[start..start + row_bytes]);
    }
    Ok(Frame::new(target, out))
}
