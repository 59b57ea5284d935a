//! The edit pipeline dispatcher.
//!
//! [`apply_edits`] is a single-shot, fail-fast fold: load the resource's
//! record and decode its current content, apply each modifier in order
//! (pixels first, then metadata), derive the variant name from the final
//! metadata, and commit. There are no intermediate checkpoints and no
//! resumability — a failure at any modifier aborts the whole invocation
//! with nothing persisted.
//!
//! ## Commit discipline
//!
//! The original file is never overwritten. On success the pipeline encodes
//! the result to a staging path inside the resource's content directory,
//! renames it to the derived name, and only then rewrites the metadata
//! record (itself staged the same way). Until the full chain has succeeded,
//! no observable state changes. A chain whose net effect is identity derives
//! the original name and skips the file write entirely.
//!
//! ## Ordering and concurrency
//!
//! Modifiers are not commutative — crop's pixel math depends on the
//! dimensions earlier modifiers produced, and flip/rotate compose with
//! stored state — so the fold is strictly sequential within one invocation.
//! Across invocations, concurrent edits of the same resource would lose
//! toggle and accumulation updates, so callers acquire the resource's mutex
//! from a [`LockRegistry`] for the full load-fold-persist span (done
//! internally by [`apply_edits`]).

use crate::imaging::{BackendError, ImageBackend};
use crate::meta::EditMeta;
use crate::modifier::{Modifier, ModifierKind};
use crate::naming;
use crate::store::{Library, ResourceRecord, StoreError};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("resource {0} not found")]
    NotFound(u64),
    #[error("modifier #{index} ({kind}) failed: {source}")]
    Modifier {
        /// 1-based position in the submitted sequence.
        index: usize,
        kind: ModifierKind,
        source: BackendError,
    },
    #[error("image processing failed: {0}")]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Store(StoreError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StoreError> for PipelineError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => PipelineError::NotFound(id),
            other => PipelineError::Store(other),
        }
    }
}

/// Descriptor of a successfully created variant.
#[derive(Debug, Clone, PartialEq)]
pub struct EditedVariant {
    pub id: u64,
    /// Derived name (no extension); equals the prior `original_name` for a
    /// no-op chain.
    pub derived_name: String,
    /// Path of the variant's content file.
    pub path: PathBuf,
    /// The persisted post-edit metadata.
    pub meta: EditMeta,
}

/// Per-resource mutual exclusion for load-fold-persist spans.
///
/// One mutex per resource id, created on first use. Locks are held across
/// blocking backend calls, which is intentional: serializing edits per
/// resource is a correctness requirement, not a throughput optimization.
/// Distinct resources never contend.
#[derive(Debug, Default)]
pub struct LockRegistry {
    locks: Mutex<HashMap<u64, Arc<Mutex<()>>>>,
}

impl LockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The mutex guarding the given resource id.
    pub fn acquire(&self, id: u64) -> Arc<Mutex<()>> {
        let mut locks = self
            .locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(id).or_default())
    }
}

/// Apply an ordered modifier sequence to a resource.
///
/// Holds the resource's lock for the whole invocation. On success the
/// library contains the new variant file (addressed by the derived name)
/// and the updated record; on any failure neither is touched.
pub fn apply_edits<B: ImageBackend>(
    library: &Library,
    backend: &B,
    locks: &LockRegistry,
    id: u64,
    modifiers: &[Modifier],
) -> Result<EditedVariant, PipelineError> {
    let resource_lock = locks.acquire(id);
    let _guard = resource_lock
        .lock()
        .unwrap_or_else(PoisonError::into_inner);

    let record = library.load_record(id)?;
    let mut handle = backend.load(&library.source_path(id, &record))?;

    // The fold: pixels first so a backend failure aborts before the
    // metadata for that modifier is folded in.
    let mut meta = record.meta.clone();
    for (position, modifier) in modifiers.iter().enumerate() {
        modifier
            .apply_to_image(backend, &mut handle)
            .map_err(|source| PipelineError::Modifier {
                index: position + 1,
                kind: modifier.kind(),
                source,
            })?;
        meta = modifier.apply_to_meta(meta);
    }

    let derived_name = naming::derive_filename(&meta);

    let variant_file = library.variant_file_name(&record, &derived_name);
    let dir = library.resource_dir(id);
    let path = dir.join(&variant_file);

    // A net-identity state derives the original name, whose file already
    // exists (imports and variants are never deleted): no file operation,
    // though the record still advances. Anything else is encoded to a
    // staging path and renamed into place before the record is rewritten.
    // The staging prefix keeps the image extension last, since encoders
    // pick the output format from it.
    if !naming::is_identity(&meta) {
        let staging = dir.join(format!(".tmp-{variant_file}"));
        if let Err(e) = backend.encode(&handle, &staging) {
            let _ = std::fs::remove_file(&staging);
            return Err(e.into());
        }
        if let Err(e) = std::fs::rename(&staging, &path) {
            let _ = std::fs::remove_file(&staging);
            return Err(e.into());
        }
    }

    let updated = ResourceRecord {
        source_file: variant_file,
        meta: meta.clone(),
    };
    library.save_record(id, &updated)?;

    Ok(EditedVariant {
        id,
        derived_name,
        path,
        meta,
    })
}
