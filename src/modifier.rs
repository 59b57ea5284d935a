//! Edit modifiers: crop, rotate, flip.
//!
//! A [`Modifier`] is one atomic transformation, applied to both an image's
//! pixels (through the [`ImageBackend`]) and its [`EditMeta`] record. The
//! three kinds compose differently:
//!
//! - **Crop replaces**: a new crop discards any stored crop, and also
//!   replaces the record's `original_name` with the crop fragment, so
//!   cropping an already-cropped image cannot collide with the first crop's
//!   filename.
//! - **Flip toggles**: each requested axis XORs its stored flag; flipping
//!   the same axis twice restores the original parity.
//! - **Rotate accumulates**: angles sum into the stored rotation, wrapped
//!   to `[0,360)`.
//!
//! Pixel-side, crop percentages are resolved against the image's dimensions
//! *at the moment the crop runs* — after earlier modifiers in the chain —
//! never the original dimensions.
//!
//! Modifiers are a closed enum rather than a trait hierarchy: every
//! operation is an exhaustive `match`, so adding a kind is a compile-checked
//! change across all call sites.

use crate::imaging::{BackendError, ImageBackend, crop_region};
use crate::meta::{CropRect, EditMeta, normalize_rotation};
use std::fmt;

/// One atomic image transformation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Modifier {
    Crop {
        left: f64,
        top: f64,
        width: f64,
        height: f64,
    },
    Rotate {
        angle: i32,
    },
    Flip {
        horizontal: bool,
        vertical: bool,
    },
}

/// Modifier kind, in the canonical filename order: crop, flip, rotate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifierKind {
    Crop,
    Flip,
    Rotate,
}

impl ModifierKind {
    /// Canonical kind order used for filename derivation.
    pub const FILENAME_ORDER: [ModifierKind; 3] =
        [ModifierKind::Crop, ModifierKind::Flip, ModifierKind::Rotate];

    /// Filename fragment this kind contributes for the given metadata, or
    /// `None` when the metadata is at this kind's identity state.
    pub fn filename_fragment(&self, meta: &EditMeta) -> Option<String> {
        match self {
            ModifierKind::Crop => meta
                .crop
                .filter(|crop| crop.width > 0.0)
                .map(|crop| crop_fragment(&crop)),
            ModifierKind::Flip => {
                let mut parts = Vec::new();
                if meta.flip_horizontal {
                    parts.push("flip_horizontal");
                }
                if meta.flip_vertical {
                    parts.push("flip_vertical");
                }
                if parts.is_empty() {
                    None
                } else {
                    Some(parts.join("-"))
                }
            }
            ModifierKind::Rotate => {
                if meta.rotation != 0 {
                    Some(format!("rotate-{}", meta.rotation))
                } else {
                    None
                }
            }
        }
    }

    /// True when the metadata holds this kind's identity state — the state
    /// an unedited image has. [`EditMeta::default`] is the union of all
    /// three identities.
    pub fn is_identity(&self, meta: &EditMeta) -> bool {
        self.filename_fragment(meta).is_none()
    }
}

impl fmt::Display for ModifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModifierKind::Crop => "crop",
            ModifierKind::Flip => "flip",
            ModifierKind::Rotate => "rotate",
        };
        f.write_str(name)
    }
}

fn crop_fragment(crop: &CropRect) -> String {
    format!(
        "crop-{}-{}-{}-{}",
        fmt_percent(crop.left),
        fmt_percent(crop.top),
        fmt_percent(crop.width),
        fmt_percent(crop.height)
    )
}

/// Format a percentage for a filename fragment: rounded to 2 decimals,
/// trailing zeros (and a bare decimal point) trimmed, so `10.0` → `"10"`
/// and `33.333` → `"33.33"`. Keeps fragments stable across float noise.
fn fmt_percent(value: f64) -> String {
    let text = format!("{:.2}", value);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

impl Modifier {
    pub fn kind(&self) -> ModifierKind {
        match self {
            Modifier::Crop { .. } => ModifierKind::Crop,
            Modifier::Rotate { .. } => ModifierKind::Rotate,
            Modifier::Flip { .. } => ModifierKind::Flip,
        }
    }

    /// Fold this modifier into the metadata record, returning the updated
    /// value. Pure: the input is consumed, no aliasing.
    pub fn apply_to_meta(&self, meta: EditMeta) -> EditMeta {
        let mut meta = meta;
        match *self {
            Modifier::Crop {
                left,
                top,
                width,
                height,
            } => {
                let crop = CropRect {
                    left,
                    top,
                    width,
                    height,
                };
                meta.crop = Some(crop);
                if crop.width > 0.0 {
                    meta.original_name = crop_fragment(&crop);
                }
            }
            Modifier::Rotate { angle } => {
                meta.rotation = normalize_rotation(meta.rotation as i64 + angle as i64);
            }
            Modifier::Flip {
                horizontal,
                vertical,
            } => {
                if horizontal {
                    meta.flip_horizontal = !meta.flip_horizontal;
                }
                if vertical {
                    meta.flip_vertical = !meta.flip_vertical;
                }
            }
        }
        meta
    }

    /// Apply this modifier to the decoded image.
    ///
    /// Crop resolves its percentages against the handle's current size, so
    /// it must run in chain order.
    pub fn apply_to_image<B: ImageBackend>(
        &self,
        backend: &B,
        handle: &mut B::Handle,
    ) -> Result<(), BackendError> {
        match *self {
            Modifier::Crop {
                left,
                top,
                width,
                height,
            } => {
                let dims = backend.get_size(handle);
                let region = crop_region(dims, left, top, width, height);
                backend.crop(handle, region)
            }
            Modifier::Rotate { angle } => backend.rotate(handle, angle),
            Modifier::Flip {
                horizontal,
                vertical,
            } => backend.flip(handle, vertical, horizontal),
        }
    }
}
