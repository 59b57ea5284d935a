//! CLI output formatting.
//!
//! Display is **state-centric, not file-centric**: the primary line for a
//! resource is its id and net edit state (the same values the derived name
//! is built from), with file paths as indented `Source:` context lines.
//!
//! ```text
//! 001 dawn
//!     Source: files/1/dawn.jpg
//!     Edits: crop 10,0,50,100 · flip horizontal · rotate 90
//!     Variant: crop-10-0-50-100-flip_horizontal-rotate-90
//! ```
//!
//! All functions return lines rather than printing, so the CLI tests can
//! assert on output without capturing stdout.

use crate::editor::EditResponse;
use crate::meta::EditMeta;
use crate::naming;
use crate::store::ResourceRecord;

/// Human-readable one-line summary of a record's net edit state.
pub fn edit_summary(meta: &EditMeta) -> String {
    let mut parts = Vec::new();
    if let Some(crop) = meta.crop {
        parts.push(format!(
            "crop {},{},{},{}",
            crop.left, crop.top, crop.width, crop.height
        ));
    }
    match (meta.flip_horizontal, meta.flip_vertical) {
        (true, true) => parts.push("flip both".to_string()),
        (true, false) => parts.push("flip horizontal".to_string()),
        (false, true) => parts.push("flip vertical".to_string()),
        (false, false) => {}
    }
    if meta.rotation != 0 {
        parts.push(format!("rotate {}", meta.rotation));
    }
    if parts.is_empty() {
        "none".to_string()
    } else {
        parts.join(" · ")
    }
}

/// Lines describing one resource, for `show` and `list`.
pub fn format_resource(id: u64, record: &ResourceRecord) -> Vec<String> {
    vec![
        format!("{:03} {}", id, record.meta.original_name),
        format!("    Source: files/{}/{}", id, record.source_file),
        format!("    Edits: {}", edit_summary(&record.meta)),
        format!("    Variant: {}", naming::derive_filename(&record.meta)),
    ]
}

/// Lines reporting one successful edit.
pub fn format_edit_result(response: &EditResponse) -> Vec<String> {
    vec![
        format!("{:03} → {}", response.resource_id, response.path),
        format!("    Edits: {}", edit_summary(&response.meta)),
    ]
}

/// Line reporting one import.
pub fn format_import(id: u64, record: &ResourceRecord) -> String {
    format!(
        "{:03} {} ← files/{}/{}",
        id, record.meta.original_name, id, record.source_file
    )
}
