//! Detection geometry: padded crop rectangles and 3×3 page regions.
//!
//! ## Crop rectangle
//!
//! ```text
//! padding = floor(min(w, h) × ratio)
//! x' = max(0, x − padding)          y' = max(0, y − padding)
//! w' = min(W − x', w + 2·padding)   h' = min(H − y', h + 2·padding)
//! ```
//!
//! The result never leaves `[0, W] × [0, H]`. A detection whose rectangle
//! starts beyond the image edge collapses to an empty crop, which the encode
//! stage rejects as a page error.
//!
//! ## Region classification
//!
//! The page is split into thirds along each axis. A symbol's region is the
//! cell containing its center; comparisons are strict `<`, so a center lying
//! exactly on `W/3` is classified `center`, not `left`.

use crate::output::{Location, Rect};

/// Padded crop region around `rect`, clipped to a `width × height` image.
pub fn padded_crop_rect(rect: &Rect, width: u32, height: u32, padding_ratio: f64) -> Rect {
    let padding = (f64::from(rect.width.min(rect.height)) * padding_ratio).floor() as u32;

    let x = rect.x.saturating_sub(padding).min(width);
    let y = rect.y.saturating_sub(padding).min(height);
    let w = (width - x).min(rect.width.saturating_add(padding.saturating_mul(2)));
    let h = (height - y).min(rect.height.saturating_add(padding.saturating_mul(2)));

    Rect::new(x, y, w, h)
}

/// Region of the page containing the center of `rect`.
pub fn classify_location(rect: &Rect, width: u32, height: u32) -> Location {
    let cx = f64::from(rect.x) + f64::from(rect.width) / 2.0;
    let cy = f64::from(rect.y) + f64::from(rect.height) / 2.0;
    classify_point(cx, cy, width, height)
}

/// Region containing the point `(cx, cy)`.
pub fn classify_point(cx: f64, cy: f64, width: u32, height: u32) -> Location {
    let col = band(cx, f64::from(width));
    let row = band(cy, f64::from(height));
    Location::from_grid(row, col)
}

fn band(v: f64, extent: f64) -> usize {
    let third = extent / 3.0;
    if v < third {
        0
    } else if v < 2.0 * third {
        1
    } else {
        2
    }
}
