//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

use super::params::CropRect;

/// Output aspect ratio (width / height). Every response is normalized to 3:2.
pub const TARGET_RATIO: f64 = 3.0 / 2.0;

/// Sources whose ratio is within this distance of [`TARGET_RATIO`] are not cropped.
pub const RATIO_TOLERANCE: f64 = 0.01;

/// Absolute distance between the source ratio and [`TARGET_RATIO`].
pub fn ratio_difference(source: (u32, u32)) -> f64 {
    let (w, h) = source;
    (w as f64 / h as f64 - TARGET_RATIO).abs()
}

/// Calculate the centered crop that brings a source to the target ratio.
///
/// Returns `None` when the source ratio is already within [`RATIO_TOLERANCE`].
/// Too-wide sources keep their full height and lose equal margins left and
/// right; too-tall sources keep their full width and lose equal margins top and
/// bottom. Offsets are floored, so an odd leftover pixel goes to the far edge.
///
/// # Examples
/// ```
/// # use image_scaler::imaging::{calculate_crop, CropRect};
/// // 2000x1000 is too wide: keep 1500x1000, 250px off each side
/// assert_eq!(
///     calculate_crop((2000, 1000)),
///     Some(CropRect { left: 250, top: 0, width: 1500, height: 1000 })
/// );
///
/// // 3:2 already
/// assert_eq!(calculate_crop((1200, 800)), None);
/// ```
pub fn calculate_crop(source: (u32, u32)) -> Option<CropRect> {
    let (w, h) = source;
    if ratio_difference(source) <= RATIO_TOLERANCE {
        return None;
    }

    let current_ratio = w as f64 / h as f64;
    if current_ratio > TARGET_RATIO {
        // Too wide: full height, trim the sides
        let new_width = (h as f64 * TARGET_RATIO).round() as u32;
        Some(CropRect {
            left: w.saturating_sub(new_width) / 2,
            top: 0,
            width: new_width,
            height: h,
        })
    } else {
        // Too tall: full width, trim top and bottom
        let new_height = (w as f64 / TARGET_RATIO).round() as u32;
        Some(CropRect {
            left: 0,
            top: h.saturating_sub(new_height) / 2,
            width: w,
            height: new_height,
        })
    }
}

/// Height of an image resized to `target_width`, preserving the source ratio.
///
/// Never returns zero.
pub fn calculate_resize_height(source: (u32, u32), target_width: u32) -> u32 {
    let (w, h) = source;
    if w == 0 {
        return 1;
    }
    let height = (target_width as f64 * h as f64 / w as f64).round() as u32;
    height.max(1)
}

/// Height of a `width`-wide box at the target ratio.
pub fn target_height(width: u32) -> u32 {
    (width as f64 / TARGET_RATIO).round() as u32
}
