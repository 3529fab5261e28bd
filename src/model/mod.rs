//! Data models for tagsync.
//!
//! This module contains the per-run domain models:
//! - NoteRecord (snapshot handed over by a note source)
//! - TaggedNote (a note with resolved tags and a primary tag)
//! - Tag normalization helpers

pub mod note;
pub mod tag;

pub use note::{NoteRecord, TaggedNote};
pub use tag::{has_tag, normalize_tag, normalize_tags};
