//! JSON dump note source.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use super::NoteSource;
use crate::error::{Error, Result};
use crate::model::NoteRecord;
use crate::sync::atomic_write;

/// Accepted dump layouts.
#[derive(Deserialize)]
#[serde(untagged)]
enum Dump {
    List(Vec<NoteRecord>),
    Wrapped { notes: Vec<NoteRecord> },
}

/// Notes read from a JSON file: either an array of notes or an object with
/// a `notes` array.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_raw(&self) -> Result<String> {
        fs::read_to_string(&self.path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                Error::SourceNotFound {
                    path: self.path.clone(),
                }
            } else {
                Error::Source(format!("Failed to read {}: {e}", self.path.display()))
            }
        })
    }

    fn parse_error(&self, e: &serde_json::Error) -> Error {
        Error::Source(format!("Failed to parse {}: {e}", self.path.display()))
    }
}

impl NoteSource for JsonFileSource {
    fn name(&self) -> String {
        format!("json:{}", self.path.display())
    }

    fn list_notes(&self) -> Result<Vec<NoteRecord>> {
        let content = self.read_raw()?;
        let notes = match serde_json::from_str::<Dump>(&content).map_err(|e| self.parse_error(&e))? {
            Dump::List(notes) | Dump::Wrapped { notes } => notes,
        };
        info!(path = %self.path.display(), count = notes.len(), "Notes loaded");
        Ok(notes)
    }

    /// Rewrites the dump without the note. Unknown fields of the remaining
    /// notes and the outer layout are preserved.
    fn delete_note(&mut self, id: &str) -> Result<()> {
        let content = self.read_raw()?;
        let mut root: Value = serde_json::from_str(&content).map_err(|e| self.parse_error(&e))?;

        let list = match &mut root {
            Value::Array(list) => list,
            Value::Object(map) => match map.get_mut("notes") {
                Some(Value::Array(list)) => list,
                _ => return Err(Error::Source(format!("{}: no notes array", self.path.display()))),
            },
            _ => return Err(Error::Source(format!("{}: unexpected layout", self.path.display()))),
        };

        let before = list.len();
        list.retain(|n| n.get("id").and_then(Value::as_str) != Some(id));
        if list.len() == before {
            return Err(Error::Source(format!("note {id} not found in {}", self.path.display())));
        }

        let mut out = serde_json::to_string_pretty(&root)?;
        out.push('\n');
        atomic_write(&self.path, &out)?;
        debug!(note = %id, path = %self.path.display(), "Note removed from dump");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const DUMP: &str = r#"[
        {"id": "1", "title": "First", "body": "one", "extra": 7},
        {"id": "2", "name": "Second", "plaintext": "two"},
        {"id": "3"}
    ]"#;

    fn source_with(content: &str) -> (TempDir, JsonFileSource) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.json");
        fs::write(&path, content).unwrap();
        (dir, JsonFileSource::new(path))
    }

    #[test]
    fn test_list_array_dump() {
        let (_dir, source) = source_with(DUMP);
        let notes = source.list_notes().unwrap();
        assert_eq!(notes.len(), 3);
        assert_eq!(notes[1].title, "Second");
        assert_eq!(notes[1].body, "two");
        assert_eq!(notes[2].title, "无标题");
    }

    #[test]
    fn test_list_wrapped_dump() {
        let (_dir, source) = source_with(r#"{"exported": "x", "notes": [{"id": "a"}]}"#);
        let notes = source.list_notes().unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].id, "a");
    }

    #[test]
    fn test_missing_dump_is_source_not_found() {
        let dir = TempDir::new().unwrap();
        let source = JsonFileSource::new(dir.path().join("none.json"));
        assert!(matches!(source.list_notes(), Err(Error::SourceNotFound { .. })));
    }

    #[test]
    fn test_malformed_dump_is_source_error() {
        let (_dir, source) = source_with("{\"notes\": 3}");
        assert!(matches!(source.list_notes(), Err(Error::Source(_))));
    }

    #[test]
    fn test_delete_preserves_other_notes() {
        let (_dir, mut source) = source_with(DUMP);
        source.delete_note("1").unwrap();

        let notes = source.list_notes().unwrap();
        let ids: Vec<&str> = notes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3"]);
    }

    #[test]
    fn test_delete_wrapped_keeps_layout() {
        let (_dir, mut source) = source_with(r#"{"exported": "x", "notes": [{"id": "a"}, {"id": "b"}]}"#);
        source.delete_note("b").unwrap();

        let raw: Value = serde_json::from_str(&fs::read_to_string(source.path()).unwrap()).unwrap();
        assert_eq!(raw["exported"], "x");
        assert_eq!(raw["notes"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_delete_unknown_note_fails() {
        let (_dir, mut source) = source_with(DUMP);
        assert!(source.delete_note("missing").is_err());
    }
}
