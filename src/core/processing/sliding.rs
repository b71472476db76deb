use tracing::debug;

use crate::core::geometry::CropBox;

/// Start positions `0, step, 2*step, ...` that keep an `extent`-long window inside `limit`.
pub fn window_positions(limit: u32, extent: u32, step: u32) -> Vec<u32> {
    if extent == 0 || extent > limit || step == 0 {
        return Vec::new();
    }
    (0..=limit - extent).step_by(step as usize).collect()
}

/// Exact-size crop boxes covering the image row by row, left to right within a row.
/// Empty when the window does not fit.
pub fn sliding_windows(
    image_cols: u32,
    image_rows: u32,
    window_cols: u32,
    window_rows: u32,
    step: u32,
) -> Vec<CropBox> {
    if window_cols > image_cols || window_rows > image_rows {
        debug!(
            "Skipping {}x{}: larger than {}x{}",
            window_cols, window_rows, image_cols, image_rows
        );
        return Vec::new();
    }
    let xs = window_positions(image_cols, window_cols, step);
    let ys = window_positions(image_rows, window_rows, step);

    let mut boxes = Vec::with_capacity(xs.len() * ys.len());
    for &top in &ys {
        for &left in &xs {
            boxes.push(CropBox {
                left,
                top,
                width: window_cols,
                height: window_rows,
            });
        }
    }
    boxes
}
