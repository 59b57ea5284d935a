//! # Retouch
//!
//! A non-destructive image edit pipeline: an ordered sequence of geometric
//! modifiers (crop, rotate, flip) applied to a stored raster image, paired
//! with durable metadata and a deterministic, collision-resistant filename
//! identifying the resulting variant.
//!
//! # Architecture: Fold, Name, Commit
//!
//! One edit invocation is a single-shot fold with atomic commit:
//!
//! ```text
//! 1. Load     record + decoded image for the target resource
//! 2. Fold     each modifier: pixels first, then metadata (fail-fast)
//! 3. Name     derive the variant name from the final metadata
//! 4. Commit   stage the encoded file, rename, rewrite the record
//! ```
//!
//! Two properties make the derived name the system's caching/identity
//! guarantee:
//!
//! - **Deterministic**: identical modifier histories yield byte-identical
//!   names — only net metadata matters, canonicalized in the fixed kind
//!   order crop, flip, rotate.
//! - **Collision-resistant**: differing net states yield differing names
//!   (up to 2-decimal crop rounding), and a crop folds its fragment into
//!   the stored original name so re-crops can't collide with earlier crops.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`meta`] | Durable `EditMeta` record: crop rect, flip parity, normalized rotation; flat persisted layout |
//! | [`modifier`] | Closed `Modifier` enum — crop replaces, flip toggles, rotate accumulates |
//! | [`naming`] | Pure derived-filename function from metadata |
//! | [`imaging`] | Injected backend capability: `ImageBackend` trait, pixel math, `RustBackend` |
//! | [`store`] | Directory-backed library: records + files, staged atomic writes |
//! | [`pipeline`] | The dispatcher fold + per-resource lock registry |
//! | [`editor`] | Boundary controller: descriptor validation, authorization, response/error envelope |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Closed Enum Over Polymorphism
//!
//! Modifiers are a closed tagged enum with an exhaustive `match` per
//! operation, not a trait hierarchy. Adding a modifier kind is a
//! compile-time-checked change across every call site — metadata fold,
//! pixel dispatch, fragment derivation, validation.
//!
//! ## Metadata as a Value
//!
//! `EditMeta` is an immutable value passed into and returned out of each
//! fold step. Composition order and intermediate states are independently
//! testable with no aliasing; the record only becomes shared state at the
//! commit point.
//!
//! ## Injected Backend
//!
//! All pixel work goes through the [`imaging::ImageBackend`] trait (`load`,
//! `get_size`, `crop`, `rotate`, `flip`, `encode`). The pipeline is tested
//! against a recording mock without any codec; the shipped
//! [`imaging::RustBackend`] is the `image` crate — pure Rust, statically
//! linked, no system dependencies.
//!
//! ## Sequential By Requirement
//!
//! Modifiers do not commute: crop's pixel math depends on the dimensions
//! earlier modifiers produced, flip and rotate compose with stored state.
//! The fold is strictly in-order, and concurrent edits of one resource are
//! serialized through [`pipeline::LockRegistry`]. Parallelism exists only
//! across distinct resources (the CLI's batch edit).

pub mod editor;
pub mod imaging;
pub mod meta;
pub mod modifier;
pub mod naming;
pub mod output;
pub mod pipeline;
pub mod store;
