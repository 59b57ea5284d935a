//! Durable edit metadata.
//!
//! Every managed image carries an [`EditMeta`] record summarizing the net
//! effect of all edits ever applied to it, independent of pixel data:
//!
//! - **Crop**: the most recent crop rectangle, in percent of the dimensions
//!   the image had when that crop ran. A later crop replaces the stored one.
//! - **Flip**: one parity flag per axis. Each flip toggles its flag, so two
//!   flips on the same axis cancel out.
//! - **Rotation**: accumulated degrees, always stored normalized to `[0,360)`.
//! - **Original name**: the filename stem edits derive from. Replaced by the
//!   crop fragment when a crop is applied, so re-cropping an already-cropped
//!   image cannot collide with the first crop in the filename space.
//!
//! ## Persisted layout
//!
//! Records are stored flat — `crop_left`/`crop_top`/`crop_width`/`crop_height`
//! as optional floats next to the flip flags, rotation, and original name —
//! via the [`MetaRecord`] shadow struct. The in-memory type keeps the crop as
//! `Option<CropRect>` so the all-fields-or-none invariant holds by
//! construction; a stored record with a partial crop loads as no crop.

use serde::{Deserialize, Serialize};

/// Crop rectangle in percent of the image dimensions current at apply time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Net edit state of one image. See the [module docs](self).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "MetaRecord", into = "MetaRecord")]
pub struct EditMeta {
    pub crop: Option<CropRect>,
    pub flip_horizontal: bool,
    pub flip_vertical: bool,
    /// Degrees, normalized to `[0,360)`.
    pub rotation: u32,
    pub original_name: String,
}

impl EditMeta {
    /// Identity metadata for a freshly imported, unedited image.
    pub fn for_source(original_name: impl Into<String>) -> Self {
        Self {
            original_name: original_name.into(),
            ..Self::default()
        }
    }
}

/// Normalize an accumulated rotation into `[0,360)`.
///
/// Works for any signed sum of angles: `normalize_rotation(-90)` is `270`.
pub fn normalize_rotation(degrees: i64) -> u32 {
    degrees.rem_euclid(360) as u32
}

/// Flat on-disk layout of [`EditMeta`].
///
/// Kept separate from the in-memory type so the crop invariant (all four
/// fields present or none) can't be violated by hand-edited records: any
/// partial crop collapses to `None` on load. Rotation is re-normalized on
/// load for the same reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct MetaRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    crop_left: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    crop_top: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    crop_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    crop_height: Option<f64>,
    #[serde(default)]
    flip_horizontal: bool,
    #[serde(default)]
    flip_vertical: bool,
    #[serde(default)]
    rotation: i64,
    #[serde(default)]
    original_name: String,
}

impl From<MetaRecord> for EditMeta {
    fn from(record: MetaRecord) -> Self {
        let crop = match (
            record.crop_left,
            record.crop_top,
            record.crop_width,
            record.crop_height,
        ) {
            (Some(left), Some(top), Some(width), Some(height)) => Some(CropRect {
                left,
                top,
                width,
                height,
            }),
            _ => None,
        };
        Self {
            crop,
            flip_horizontal: record.flip_horizontal,
            flip_vertical: record.flip_vertical,
            rotation: normalize_rotation(record.rotation),
            original_name: record.original_name,
        }
    }
}

impl From<EditMeta> for MetaRecord {
    fn from(meta: EditMeta) -> Self {
        Self {
            crop_left: meta.crop.map(|c| c.left),
            crop_top: meta.crop.map(|c| c.top),
            crop_width: meta.crop.map(|c| c.width),
            crop_height: meta.crop.map(|c| c.height),
            flip_horizontal: meta.flip_horizontal,
            flip_vertical: meta.flip_vertical,
            rotation: meta.rotation as i64,
            original_name: meta.original_name,
        }
    }
}
