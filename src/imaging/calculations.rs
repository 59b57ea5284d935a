//! Pure calculation functions for crop geometry.
//!
//! All functions here are pure and testable without any I/O or images.

use super::backend::Dimensions;

/// Pixel-exact crop region, computed from percentage coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRegion {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

/// Convert a percentage crop into a pixel region against the given dimensions.
///
/// The dimensions must be the image's dimensions *at the point the crop runs*
/// — after any earlier modifiers in the chain have already resized it — not
/// the original dimensions. Each value is `round(dimension * percent / 100)`
/// with ties rounding away from zero (`f64::round`).
///
/// # Examples
/// ```
/// # use retouch::imaging::{Dimensions, calculations::crop_region};
/// let dims = Dimensions { width: 200, height: 100 };
/// let region = crop_region(dims, 10.0, 0.0, 50.0, 100.0);
/// assert_eq!((region.left, region.top, region.width, region.height), (20, 0, 100, 100));
/// ```
pub fn crop_region(dims: Dimensions, left: f64, top: f64, width: f64, height: f64) -> PixelRegion {
    PixelRegion {
        left: percent_of(dims.width, left),
        top: percent_of(dims.height, top),
        width: percent_of(dims.width, width),
        height: percent_of(dims.height, height),
    }
}

/// `round(dimension * percent / 100)`, half away from zero.
fn percent_of(dimension: u32, percent: f64) -> u32 {
    ((dimension as f64 * percent) / 100.0).round() as u32
}
