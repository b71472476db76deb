//! Pixel-free crop geometry: the centered aspect crop used for static frames and
//! the sliding window used for pan animations. Everything here is integer math on
//! the source size and the target rectangle, so it can be checked without pixels.
use serde::{Deserialize, Serialize};

use crate::types::{PanAxis, TargetRect};

/// Rectangle in source pixel coordinates.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct CropBox {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl CropBox {
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            left: 0,
            top: 0,
            width,
            height,
        }
    }

    pub fn right(&self) -> u64 {
        self.left as u64 + self.width as u64
    }

    pub fn bottom(&self) -> u64 {
        self.top as u64 + self.height as u64
    }

    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.width > 0
            && self.height > 0
            && self.right() <= width as u64
            && self.bottom() <= height as u64
    }
}

/// Truncates a computed extent, keeping it within `1..=limit`.
fn truncated(value: f64, limit: u32) -> u32 {
    (value as u32).clamp(1, limit.max(1))
}

/// Largest centered box of the target's aspect ratio inside a `width`x`height` source.
pub fn center_crop_box(width: u32, height: u32, target: TargetRect) -> CropBox {
    // Exact comparison via cross-multiplication; the float ratio only sizes the crop.
    let source_cross = width as u64 * target.height() as u64;
    let target_cross = height as u64 * target.width() as u64;
    let aspect = target.aspect();

    if source_cross > target_cross {
        let new_width = truncated(height as f64 * aspect, width);
        CropBox {
            left: (width - new_width) / 2,
            top: 0,
            width: new_width,
            height,
        }
    } else if source_cross < target_cross {
        let new_height = truncated(width as f64 / aspect, height);
        CropBox {
            left: 0,
            top: (height - new_height) / 2,
            width,
            height: new_height,
        }
    } else {
        CropBox::full(width, height)
    }
}

/// Where a pan window sits and how far it can travel.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct PanPlan {
    pub axis: PanAxis,
    /// Window at offset zero; the perpendicular coordinate never changes.
    pub window: CropBox,
    pub max_offset: u32,
}

impl PanPlan {
    /// No room to move: the window already spans the source along the pan axis.
    pub fn is_static(&self) -> bool {
        self.max_offset == 0
    }

    /// Offset of frame `index` out of `num_frames`, evenly spaced from 0 to `max_offset`.
    pub fn offset(&self, index: usize, num_frames: usize) -> u32 {
        if num_frames < 2 {
            return 0;
        }
        let index = index.min(num_frames - 1) as u64;
        (self.max_offset as u64 * index / (num_frames as u64 - 1)) as u32
    }

    pub fn window_at(&self, index: usize, num_frames: usize) -> CropBox {
        let offset = self.offset(index, num_frames);
        match self.axis {
            PanAxis::Vertical => CropBox {
                top: offset,
                ..self.window
            },
            PanAxis::Horizontal => CropBox {
                left: offset,
                ..self.window
            },
        }
    }

    pub fn windows(&self, num_frames: usize) -> impl Iterator<Item = CropBox> + '_ {
        (0..num_frames).map(move |i| self.window_at(i, num_frames))
    }
}

/// Sizes the pan window for `target` inside a `width`x`height` source.
///
/// The window spans the full source along the non-pan axis unless that would
/// overflow the pan axis, in which case it is shrunk to the source along the pan
/// axis and the other side recomputed from the aspect ratio.
pub fn plan_pan(width: u32, height: u32, target: TargetRect) -> PanPlan {
    let axis = PanAxis::for_target(target);
    let aspect = target.aspect();

    match axis {
        PanAxis::Vertical => {
            let mut crop_width = width;
            let mut crop_height = truncated(crop_width as f64 / aspect, u32::MAX);
            if crop_height > height {
                crop_height = height;
                crop_width = truncated(crop_height as f64 * aspect, width);
            }
            PanPlan {
                axis,
                window: CropBox {
                    left: (width - crop_width) / 2,
                    top: 0,
                    width: crop_width,
                    height: crop_height,
                },
                max_offset: height - crop_height,
            }
        }
        PanAxis::Horizontal => {
            let mut crop_height = height;
            let mut crop_width = truncated(crop_height as f64 * aspect, u32::MAX);
            if crop_width > width {
                crop_width = width;
                crop_height = truncated(crop_width as f64 / aspect, height);
            }
            PanPlan {
                axis,
                window: CropBox {
                    left: 0,
                    top: (height - crop_height) / 2,
                    width: crop_width,
                    height: crop_height,
                },
                max_offset: width - crop_width,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(w: i64, h: i64) -> TargetRect {
        TargetRect::new(w, h).unwrap()
    }

    #[test]
    fn center_crop_wider_source() {
        // 1000x500 to 4:3 keeps full height, 500 * 4/3 = 666.67 truncates to 666
        let b = center_crop_box(1000, 500, rect(400, 300));
        assert_eq!(
            b,
            CropBox {
                left: 167,
                top: 0,
                width: 666,
                height: 500
            }
        );
    }

    #[test]
    fn center_crop_taller_source() {
        let b = center_crop_box(500, 1000, rect(400, 300));
        assert_eq!(
            b,
            CropBox {
                left: 0,
                top: 312,
                width: 500,
                height: 375
            }
        );
    }

    #[test]
    fn center_crop_same_aspect_is_full() {
        assert_eq!(
            center_crop_box(800, 600, rect(400, 300)),
            CropBox::full(800, 600)
        );
    }

    #[test]
    fn center_crop_extreme_aspect_never_empty() {
        let b = center_crop_box(1, 1, rect(1, 1000));
        assert_eq!(b.height, 1);
        assert!(b.fits_within(1, 1));

        let b = center_crop_box(3, 1, rect(1, 1000));
        assert_eq!(b.width, 1);
        assert!(b.fits_within(3, 1));
    }

    #[test]
    fn center_crop_stays_in_bounds_across_catalog() {
        let sources = [(1024, 1024), (1920, 1080), (600, 2000), (7, 3), (1, 1)];
        let targets = [
            (304, 248),
            (728, 88),
            (160, 600),
            (968, 248),
            (248, 248),
            (320, 480),
            (1, 1),
        ];
        for &(w, h) in &sources {
            for &(tw, th) in &targets {
                let b = center_crop_box(w, h, rect(tw, th));
                assert!(b.fits_within(w, h), "{b:?} outside {w}x{h} for {tw}x{th}");
            }
        }
    }

    #[test]
    fn billboard_pans_vertically_over_full_height() {
        let plan = plan_pan(1024, 1024, rect(968, 248));
        assert_eq!(plan.axis, PanAxis::Vertical);
        assert_eq!(plan.window.width, 1024);
        assert_eq!(plan.window.height, 262);
        assert_eq!(plan.max_offset, 762);
        assert_eq!(plan.offset(0, 40), 0);
        assert_eq!(plan.offset(1, 40), 19);
        assert_eq!(plan.offset(39, 40), 762);
    }

    #[test]
    fn medium_rectangle_pans_vertically() {
        // 304x248 is wider than tall, so the window spans the full width.
        let plan = plan_pan(1024, 1024, rect(304, 248));
        assert_eq!(plan.axis, PanAxis::Vertical);
        assert_eq!((plan.window.width, plan.window.height), (1024, 835));
        assert_eq!(plan.max_offset, 189);
    }

    #[test]
    fn skyscraper_pans_horizontally() {
        let plan = plan_pan(1024, 1024, rect(160, 600));
        assert_eq!(plan.axis, PanAxis::Horizontal);
        assert_eq!((plan.window.width, plan.window.height), (273, 1024));
        assert_eq!(plan.max_offset, 751);
        assert_eq!(plan.window.top, 0);
    }

    #[test]
    fn square_target_on_square_source_is_static() {
        let plan = plan_pan(1024, 1024, rect(248, 248));
        assert_eq!(plan.axis, PanAxis::Horizontal);
        assert!(plan.is_static());
    }

    #[test]
    fn window_shrinks_when_pan_axis_overflows() {
        // Portrait target on a very wide, short source: height fits, width capped.
        let plan = plan_pan(100, 1000, rect(320, 480));
        assert_eq!(plan.axis, PanAxis::Horizontal);
        assert_eq!(plan.window.width, 100);
        assert_eq!(plan.window.height, 150);
        assert_eq!(plan.window.top, 425);
        assert!(plan.is_static());

        // Landscape target on a short wide source: height capped, width recomputed.
        let plan = plan_pan(1000, 100, rect(400, 300));
        assert_eq!(plan.axis, PanAxis::Vertical);
        assert_eq!(plan.window.height, 100);
        assert_eq!(plan.window.width, 133);
        assert_eq!(plan.window.left, 433);
        assert!(plan.is_static());
    }

    #[test]
    fn offsets_are_monotonic_and_cover_full_range() {
        let plan = plan_pan(1024, 1024, rect(728, 88));
        for n in [2usize, 3, 7, 40, 2000] {
            let offsets: Vec<u32> = (0..n).map(|i| plan.offset(i, n)).collect();
            assert_eq!(offsets[0], 0);
            assert_eq!(*offsets.last().unwrap(), plan.max_offset);
            assert!(offsets.windows(2).all(|w| w[0] <= w[1]));
        }
    }

    #[test]
    fn more_frames_than_pixels_repeat_offsets() {
        let plan = PanPlan {
            axis: PanAxis::Vertical,
            window: CropBox {
                left: 0,
                top: 0,
                width: 10,
                height: 8,
            },
            max_offset: 2,
        };
        let offsets: Vec<u32> = (0..5).map(|i| plan.offset(i, 5)).collect();
        assert_eq!(offsets, vec![0, 0, 1, 1, 2]);
    }

    #[test]
    fn single_frame_uses_offset_zero() {
        let plan = plan_pan(1024, 1024, rect(968, 248));
        assert_eq!(plan.offset(0, 1), 0);
        assert_eq!(plan.window_at(0, 1).top, 0);
    }

    #[test]
    fn pan_windows_stay_in_bounds() {
        let sources = [(1024, 1024), (1920, 1080), (600, 2000), (5, 9)];
        let targets = [(304, 248), (728, 88), (160, 600), (320, 480), (200, 200)];
        for &(w, h) in &sources {
            for &(tw, th) in &targets {
                let plan = plan_pan(w, h, rect(tw, th));
                for b in plan.windows(17) {
                    assert!(b.fits_within(w, h), "{b:?} outside {w}x{h} for {tw}x{th}");
                }
            }
        }
    }
}
