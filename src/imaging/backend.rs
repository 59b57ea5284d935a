//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait is the injected raster capability: decode a
//! file into an opaque handle, mutate it (crop, rotate, flip), report its
//! current size, and encode the result. The pipeline never touches pixels
//! directly, so it can be tested against the recording mock in
//! [`tests`](self::tests) without any codec work.
//!
//! A handle lives for one pipeline invocation: acquire via [`load`],
//! mutate, [`encode`], drop. It is never persisted — only the encoded
//! output and the metadata record are.
//!
//! [`load`]: ImageBackend::load
//! [`encode`]: ImageBackend::encode

use super::calculations::PixelRegion;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Current pixel dimensions of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image processing backends.
///
/// `Handle` is the backend's decoded pixel state. Transform operations take
/// it by `&mut` and fail atomically: on `Err` the handle must be left as it
/// was, so an aborted chain observes no partial mutation.
pub trait ImageBackend: Sync {
    type Handle;

    /// Decode an image from disk.
    fn load(&self, path: &Path) -> Result<Self::Handle, BackendError>;

    /// Current dimensions, reflecting all transforms applied so far.
    fn get_size(&self, handle: &Self::Handle) -> Dimensions;

    /// Crop to the given pixel region.
    fn crop(&self, handle: &mut Self::Handle, region: PixelRegion) -> Result<(), BackendError>;

    /// Rotate clockwise by the given signed angle in degrees.
    fn rotate(&self, handle: &mut Self::Handle, angle: i32) -> Result<(), BackendError>;

    /// Mirror along the requested axes.
    fn flip(
        &self,
        handle: &mut Self::Handle,
        vertical: bool,
        horizontal: bool,
    ) -> Result<(), BackendError>;

    /// Encode to disk; the format follows the output path's extension.
    fn encode(&self, handle: &Self::Handle, output: &Path) -> Result<(), BackendError>;
}
