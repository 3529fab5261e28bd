//! Note sources.
//!
//! A note source hands the orchestrator a snapshot of every note and can
//! delete a note after it has been published. The only adapter shipped is
//! a JSON dump file, written by whatever exports the notes.

mod json;

pub use json::JsonFileSource;

use crate::error::Result;
use crate::model::NoteRecord;

/// Access to the note collection.
pub trait NoteSource {
    /// Human-readable name for logs and status output.
    fn name(&self) -> String;

    /// Every note, in the source's own order.
    ///
    /// # Errors
    ///
    /// Returns a source error if the collection cannot be read.
    fn list_notes(&self) -> Result<Vec<NoteRecord>>;

    /// Remove a note from the source.
    ///
    /// # Errors
    ///
    /// Returns a source error if the note is unknown or cannot be removed.
    fn delete_note(&mut self, id: &str) -> Result<()>;
}
