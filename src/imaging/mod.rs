//! Image processing — pure Rust, zero external dependencies.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode / encode** | `image` crate (JPEG, PNG, TIFF, WebP) |
//! | **Crop geometry** | [`calculations::crop_region`] (percent → pixel) |
//! | **Crop / rotate / flip** | `image::DynamicImage` methods |
//!
//! The module is split into:
//! - **Calculations**: pure percent-to-pixel math (unit testable)
//! - **Backend**: the [`ImageBackend`] capability trait + [`RustBackend`]

pub mod backend;
pub mod calculations;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{PixelRegion, crop_region};
pub use rust_backend::RustBackend;
