//! Derived filename computation.
//!
//! Every edited variant is addressed by a name computed purely from its
//! [`EditMeta`] — no randomness, no timestamps. The name is the caching and
//! identity guarantee of the whole pipeline: metadata records that are
//! semantically equal (same crop rect or none, same flip parity per axis,
//! same normalized rotation) always produce byte-identical names, and
//! records that differ in any of those dimensions produce different names
//! (up to the acknowledged 2-decimal rounding of crop percentages).
//!
//! Fragments are joined in the fixed kind order **crop, flip, rotate**,
//! independent of the order the modifiers were applied in — only the net
//! metadata matters. Kinds at their identity state contribute nothing; a
//! fully-identity record falls back to `original_name`, so a no-op edit
//! chain derives the name the image already has.

use crate::meta::EditMeta;
use crate::modifier::ModifierKind;

/// Derive the canonical variant name for the given metadata.
pub fn derive_filename(meta: &EditMeta) -> String {
    let fragments: Vec<String> = ModifierKind::FILENAME_ORDER
        .iter()
        .filter_map(|kind| kind.filename_fragment(meta))
        .collect();

    if fragments.is_empty() {
        meta.original_name.clone()
    } else {
        fragments.join("-")
    }
}

/// True when the metadata derives no fragments at all, i.e. the record is
/// at the identity state and [`derive_filename`] falls back to the
/// original name.
pub fn is_identity(meta: &EditMeta) -> bool {
    ModifierKind::FILENAME_ORDER
        .iter()
        .all(|kind| kind.is_identity(meta))
}
