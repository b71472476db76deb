//! Static and panning frames derived from one master image.
//!
//! `resize_to_fit` center-crops to the target aspect ratio and resamples to the exact
//! target size. `pan` slides an aspect-matched window along one axis and resamples each
//! step, producing an ordered sequence ready for an animation encoder.
use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::core::geometry::{CropBox, PanPlan, center_crop_box, plan_pan};
use crate::core::processing::resize::FrameResampler;
use crate::error::{Error, Result};
use crate::types::{Frame, PanAxis, SourceImage, TargetRect};

/// One animation step: the resampled frame plus the window it came from.
#[derive(Debug, Clone)]
pub struct PanFrame {
    pub image: Frame,
    pub window: CropBox,
    pub duration: Duration,
}

/// Ordered pan frames; windows never move backwards along `axis`.
#[derive(Debug, Clone)]
pub struct PanSequence {
    pub axis: PanAxis,
    pub frames: Vec<PanFrame>,
    /// The animation should restart after the last frame.
    pub loop_forever: bool,
}

impl PanSequence {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// True when the window could not move and a single center crop was emitted.
    pub fn is_static(&self) -> bool {
        self.frames.len() == 1
    }

    pub fn durations(&self) -> Vec<Duration> {
        self.frames.iter().map(|f| f.duration).collect()
    }

    pub fn windows(&self) -> Vec<CropBox> {
        self.frames.iter().map(|f| f.window).collect()
    }

    pub fn summary(&self) -> PanSummary {
        PanSummary {
            axis: self.axis,
            frames: self.frames.len(),
            frame_duration_ms: self
                .frames
                .first()
                .map(|f| f.duration.as_millis() as u64)
                .unwrap_or(0),
            first_window: self.frames.first().map(|f| f.window),
            last_window: self.frames.last().map(|f| f.window),
        }
    }
}

/// Serializable description of a `PanSequence`, without pixels.
#[derive(Debug, Clone, Serialize)]
pub struct PanSummary {
    pub axis: PanAxis,
    pub frames: usize,
    pub frame_duration_ms: u64,
    pub first_window: Option<CropBox>,
    pub last_window: Option<CropBox>,
}

/// Center-crop to the target aspect ratio, then resample to exactly `target`.
pub fn resize_to_fit(source: &SourceImage, target: TargetRect) -> Result<Frame> {
    resize_to_fit_with(&mut FrameResampler::new(), source, target)
}

fn resize_to_fit_with(
    resampler: &mut FrameResampler,
    source: &SourceImage,
    target: TargetRect,
) -> Result<Frame> {
    let crop = center_crop_box(source.width(), source.height(), target);
    resampler.crop_and_resize(source, crop, target)
}

/// Builds a pan across `source` for `target`.
///
/// Emits `num_frames` frames, or a single `resize_to_fit` frame when the window
/// already spans the source along the pan axis.
pub fn pan(
    source: &SourceImage,
    target: TargetRect,
    num_frames: usize,
    duration: Duration,
) -> Result<PanSequence> {
    if num_frames == 0 {
        return Err(Error::InvalidFrameCount { frames: num_frames });
    }

    let plan = plan_pan(source.width(), source.height(), target);
    let mut resampler = FrameResampler::new();

    if plan.is_static() {
        debug!(
            "No pan range for {} on {}x{}, using center crop",
            target,
            source.width(),
            source.height()
        );
        let window = center_crop_box(source.width(), source.height(), target);
        let image = resize_to_fit_with(&mut resampler, source, target)?;
        return Ok(PanSequence {
            axis: plan.axis,
            frames: vec![PanFrame {
                image,
                window,
                duration,
            }],
            loop_forever: true,
        });
    }

    debug!(
        "Panning {} window {}x{} over {} px",
        plan.axis, plan.window.width, plan.window.height, plan.max_offset
    );
    let frames = plan_frames(&mut resampler, source, target, &plan, num_frames, duration)?;
    Ok(PanSequence {
        axis: plan.axis,
        frames,
        loop_forever: true,
    })
}

fn plan_frames(
    resampler: &mut FrameResampler,
    source: &SourceImage,
    target: TargetRect,
    plan: &PanPlan,
    num_frames: usize,
    duration: Duration,
) -> Result<Vec<PanFrame>> {
    plan.windows(num_frames)
        .map(|window| {
            let image = resampler.crop_and_resize(source, window, target)?;
            Ok(PanFrame {
                image,
                window,
                duration,
            })
        })
        .collect()
}
