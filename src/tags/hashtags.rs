//! Hashtag resolution.
//!
//! Tags come from structured data only. With a usable hashtag export (the
//! `all_notes_*.json` written by an external notes extractor) the export is
//! the single source of truth. Without one, the note's own metadata tag
//! fields are read. The note body is never scanned for `#words`: a note
//! without structured tags is not a candidate.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::model::{normalize_tag, NoteRecord};

/// Numeric primary key at the end of an internal note reference,
/// e.g. `x-coredata://.../ICNote/p1234`.
static NOTE_REF_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/ICNote/p(\d+)$").expect("valid regex"));

/// Identifier variants indexed for each export entry.
const EXPORT_ID_FIELDS: [&str; 4] = ["note_id", "uuid", "identifier", "ZIDENTIFIER"];

#[derive(Debug, Deserialize)]
struct HashtagExport {
    #[serde(default)]
    notes: IndexMap<String, ExportEntry>,
}

#[derive(Debug, Deserialize)]
struct ExportEntry {
    #[serde(default)]
    hashtags: Option<Vec<Value>>,
    #[serde(default)]
    trashed: Option<Value>,
    #[serde(default)]
    deleted: Option<Value>,
    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

/// Loose truthiness for export flags (`true`, `1`, `"yes"`).
fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    }
}

/// Render a scalar identifier or tag as a string.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[derive(Debug, Clone)]
enum Mode {
    Export(HashMap<String, Vec<String>>),
    Metadata,
}

/// Resolves the ordered, normalized tag list of a note.
#[derive(Debug, Clone)]
pub struct HashtagResolver {
    mode: Mode,
}

impl HashtagResolver {
    /// Resolver that reads note metadata fields only.
    #[must_use]
    pub fn metadata_only() -> Self {
        Self {
            mode: Mode::Metadata,
        }
    }

    /// Load a hashtag export file.
    ///
    /// Falls back to note metadata when the file is missing, unreadable,
    /// malformed or has no tagged entries.
    #[must_use]
    pub fn from_export(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(path = %path.display(), "Hashtag export not found, using note metadata");
                return Self::metadata_only();
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read hashtag export, using note metadata");
                return Self::metadata_only();
            }
        };

        match Self::from_export_str(&content) {
            Ok(resolver) => resolver,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to parse hashtag export, using note metadata");
                Self::metadata_only()
            }
        }
    }

    /// Build the index from export JSON.
    ///
    /// An export with no tagged entries yields a metadata-only resolver.
    ///
    /// # Errors
    ///
    /// Returns the JSON error on malformed input.
    pub fn from_export_str(content: &str) -> serde_json::Result<Self> {
        let export: HashtagExport = serde_json::from_str(content)?;

        let mut index: HashMap<String, Vec<String>> = HashMap::new();
        let mut loaded = 0usize;
        let mut skipped_deleted = 0usize;

        for (key, entry) in export.notes {
            if is_truthy(entry.trashed.as_ref()) || is_truthy(entry.deleted.as_ref()) {
                skipped_deleted += 1;
                continue;
            }

            let tags: Vec<String> = entry
                .hashtags
                .unwrap_or_default()
                .iter()
                .filter_map(scalar_to_string)
                .filter_map(|t| normalize_tag(&t))
                .collect();
            if tags.is_empty() {
                continue;
            }

            let mut keys = vec![key];
            for field in EXPORT_ID_FIELDS {
                if let Some(id) = entry.extra.get(field).and_then(scalar_to_string) {
                    if !keys.contains(&id) {
                        keys.push(id);
                    }
                }
            }
            for k in keys {
                index.insert(k, tags.clone());
            }
            loaded += 1;
        }

        if index.is_empty() {
            warn!(skipped_deleted, "Hashtag export has no tagged notes, using note metadata");
            return Ok(Self::metadata_only());
        }

        info!(loaded, skipped_deleted, "Hashtag export indexed");
        Ok(Self {
            mode: Mode::Export(index),
        })
    }

    /// Whether tags come from an export.
    #[must_use]
    pub fn uses_export(&self) -> bool {
        matches!(self.mode, Mode::Export(_))
    }

    /// Number of indexed identifier keys (zero in metadata mode).
    #[must_use]
    pub fn indexed_len(&self) -> usize {
        match &self.mode {
            Mode::Export(index) => index.len(),
            Mode::Metadata => 0,
        }
    }

    /// Tags for `note`, or an empty list when it has none.
    #[must_use]
    pub fn tags_for(&self, note: &NoteRecord) -> Vec<String> {
        match &self.mode {
            Mode::Export(index) => {
                let hit = candidate_keys(note)
                    .into_iter()
                    .find_map(|k| index.get(&k).filter(|tags| !tags.is_empty()));
                if hit.is_some() {
                    debug!(note = %note.id, "Tags resolved from hashtag export");
                }
                hit.cloned().unwrap_or_default()
            }
            Mode::Metadata => note
                .metadata_tag_fields()
                .into_iter()
                .flatten()
                .map(|field| {
                    field
                        .iter()
                        .filter_map(|t| normalize_tag(t))
                        .collect::<Vec<_>>()
                })
                .find(|tags| !tags.is_empty())
                .unwrap_or_default(),
        }
    }
}

/// Identifier-like values of a note, in lookup order.
fn candidate_keys(note: &NoteRecord) -> Vec<String> {
    let mut keys = Vec::new();
    for value in [Some(&note.id), note.uuid.as_ref(), note.identifier.as_ref()]
        .into_iter()
        .flatten()
    {
        if value.is_empty() {
            continue;
        }
        keys.push(value.clone());
        if let Some(caps) = NOTE_REF_SUFFIX.captures(value) {
            keys.push(caps[1].to_string());
        }
    }
    keys
}
