//! Boundary controller for edit requests.
//!
//! This is the single entry point callers go through: it validates the
//! request's modifier descriptors, authorizes the caller, converts the
//! descriptors into [`Modifier`]s preserving input order, invokes the
//! pipeline, and maps the outcome to a response envelope or a structured
//! [`EditError`] whose kind maps to a status class.
//!
//! Validation and authorization failures never reach the pipeline.
//!
//! ## Unrecognized modifiers
//!
//! A descriptor whose `modifier` discriminant is not `crop`, `rotate`, or
//! `flip` is rejected as a validation error at parse time. Silently
//! skipping unknown kinds would let a typo'd descriptor drop an edit
//! without notice, so the whole request is refused instead.

use crate::imaging::ImageBackend;
use crate::meta::EditMeta;
use crate::modifier::Modifier;
use crate::pipeline::{self, LockRegistry, PipelineError};
use crate::store::Library;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One modifier as submitted by a caller, tagged by the `modifier` field.
///
/// Wire layout (JSON):
/// ```json
/// {"modifier": "crop", "left": 10, "top": 0, "width": 50, "height": 100}
/// {"modifier": "rotate", "angle": 90}
/// {"modifier": "flip", "horizontal": true, "vertical": false}
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "modifier", rename_all = "lowercase")]
pub enum ModifierDescriptor {
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

/// An edit request: target resource plus an ordered modifier list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditRequest {
    pub resource_id: u64,
    pub modifiers: Vec<ModifierDescriptor>,
}

impl EditRequest {
    /// Parse a request from JSON. Malformed shapes — including unrecognized
    /// `modifier` discriminants — are validation errors.
    pub fn from_json(json: &str) -> Result<Self, EditError> {
        serde_json::from_str(json).map_err(|e| EditError::Validation(e.to_string()))
    }
}

/// Response envelope for a successful edit: the new variant's identity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditResponse {
    pub resource_id: u64,
    /// Derived variant name (no extension).
    pub filename: String,
    /// Library-relative path of the variant's content file.
    pub path: String,
    /// The persisted post-edit metadata.
    pub meta: EditMeta,
}

/// Caller capabilities. The authenticated caller is baked into the
/// implementation; the controller only asks yes/no questions.
pub trait Authorizer {
    /// May the caller edit this specific resource?
    fn can_edit(&self, resource_id: u64) -> bool;
    /// Does the caller hold the general upload capability? Editing creates
    /// a new file, so both rights are required.
    fn can_upload(&self) -> bool;
}

/// Grants everything. For local, single-user surfaces like the CLI.
pub struct AllowAll;

impl Authorizer for AllowAll {
    fn can_edit(&self, _resource_id: u64) -> bool {
        true
    }
    fn can_upload(&self) -> bool {
        true
    }
}

#[derive(Error, Debug)]
pub enum EditError {
    #[error("invalid request: {0}")]
    Validation(String),
    #[error("{0}")]
    Authorization(String),
    #[error("resource {0} not found")]
    NotFound(u64),
    #[error("{message}")]
    Backend {
        /// 1-based position of the failing modifier, when one is at fault.
        index: Option<usize>,
        message: String,
    },
}

/// Status class an [`EditError`] kind maps to at a transport boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    ClientError,
    Forbidden,
    NotFound,
    ServerError,
}

impl EditError {
    pub fn status_class(&self) -> StatusClass {
        match self {
            EditError::Validation(_) => StatusClass::ClientError,
            EditError::Authorization(_) => StatusClass::Forbidden,
            EditError::NotFound(_) => StatusClass::NotFound,
            EditError::Backend { .. } => StatusClass::ServerError,
        }
    }

    /// Machine-readable kind.
    pub fn kind(&self) -> &'static str {
        match self {
            EditError::Validation(_) => "validation",
            EditError::Authorization(_) => "authorization",
            EditError::NotFound(_) => "not_found",
            EditError::Backend { .. } => "backend",
        }
    }
}

impl From<PipelineError> for EditError {
    fn from(e: PipelineError) -> Self {
        let message = e.to_string();
        match e {
            PipelineError::NotFound(id) => EditError::NotFound(id),
            PipelineError::Modifier { index, .. } => EditError::Backend {
                index: Some(index),
                message,
            },
            _ => EditError::Backend {
                index: None,
                message,
            },
        }
    }
}

impl ModifierDescriptor {
    /// Check field ranges: `left`/`top` in `[0,100]`, `width`/`height` in
    /// `[1,100]`, all finite. Rotation accepts any integer angle.
    fn validate(&self) -> Result<(), String> {
        match *self {
            ModifierDescriptor::Crop {
                left,
                top,
                width,
                height,
            } => {
                for (name, value) in [("left", left), ("top", top)] {
                    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                        return Err(format!("crop {name} must be between 0 and 100"));
                    }
                }
                for (name, value) in [("width", width), ("height", height)] {
                    if !value.is_finite() || !(1.0..=100.0).contains(&value) {
                        return Err(format!("crop {name} must be between 1 and 100"));
                    }
                }
                Ok(())
            }
            ModifierDescriptor::Rotate { .. } => Ok(()),
            ModifierDescriptor::Flip { .. } => Ok(()),
        }
    }

    fn to_modifier(self) -> Modifier {
        match self {
            ModifierDescriptor::Crop {
                left,
                top,
                width,
                height,
            } => Modifier::Crop {
                left,
                top,
                width,
                height,
            },
            ModifierDescriptor::Rotate { angle } => Modifier::Rotate { angle },
            ModifierDescriptor::Flip {
                horizontal,
                vertical,
            } => Modifier::Flip {
                horizontal,
                vertical,
            },
        }
    }
}

/// Apply all edits in one go.
///
/// Validates, authorizes, folds the modifier sequence through the pipeline,
/// and returns the new variant's descriptor.
pub fn apply_edits<B: ImageBackend>(
    authorizer: &dyn Authorizer,
    library: &Library,
    backend: &B,
    locks: &LockRegistry,
    request: &EditRequest,
) -> Result<EditResponse, EditError> {
    for (position, descriptor) in request.modifiers.iter().enumerate() {
        descriptor
            .validate()
            .map_err(|reason| EditError::Validation(format!("modifier #{}: {reason}", position + 1)))?;
    }

    if !authorizer.can_edit(request.resource_id) {
        return Err(EditError::Authorization(
            "you are not allowed to edit this image".to_string(),
        ));
    }
    if !authorizer.can_upload() {
        return Err(EditError::Authorization(
            "you are not allowed to upload media".to_string(),
        ));
    }

    let modifiers: Vec<Modifier> = request
        .modifiers
        .iter()
        .map(|descriptor| descriptor.to_modifier())
        .collect();

    let variant = pipeline::apply_edits(library, backend, locks, request.resource_id, &modifiers)?;

    let path = variant
        .path
        .strip_prefix(library.root())
        .unwrap_or(&variant.path)
        .to_string_lossy()
        .to_string();

    Ok(EditResponse {
        resource_id: variant.id,
        filename: variant.derived_name,
        path,
        meta: variant.meta,
    })
}
