//! Note records and tagged notes.
//!
//! A `NoteRecord` is the explicit shape every note source adapter must
//! produce. The core never probes note objects for optional attributes:
//! identifier variants and metadata tag fields are plain optional fields.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

fn default_title() -> String {
    "无标题".to_string()
}

/// A note as supplied by a note source.
///
/// Immutable snapshot for the duration of one run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NoteRecord {
    /// Opaque stable identifier
    pub id: String,

    /// Note title (the first line in most note apps)
    #[serde(default = "default_title", alias = "name")]
    pub title: String,

    /// Plain-text body
    #[serde(default, alias = "plaintext")]
    pub body: String,

    #[serde(default)]
    pub account: String,

    #[serde(default)]
    pub folder: String,

    #[serde(default)]
    pub creation_date: Option<DateTime<FixedOffset>>,

    #[serde(default)]
    pub modification_date: Option<DateTime<FixedOffset>>,

    /// Alternate identifier used by some exports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,

    /// Alternate identifier used by some exports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,

    /// Structured tag metadata, consulted only without a hashtag export.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hashtags: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note_tags: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

impl NoteRecord {
    /// Create a bare note with only an id, title and body.
    pub fn new(id: impl Into<String>, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            body: body.into(),
            account: String::new(),
            folder: String::new(),
            creation_date: None,
            modification_date: None,
            uuid: None,
            identifier: None,
            tags: None,
            hashtags: None,
            note_tags: None,
            labels: None,
        }
    }

    /// Most recent known timestamp: modification date, else creation date.
    #[must_use]
    pub fn effective_date(&self) -> Option<DateTime<FixedOffset>> {
        self.modification_date.or(self.creation_date)
    }

    /// Metadata tag fields in lookup order.
    pub(crate) fn metadata_tag_fields(&self) -> [Option<&Vec<String>>; 4] {
        [
            self.tags.as_ref(),
            self.hashtags.as_ref(),
            self.note_tags.as_ref(),
            self.labels.as_ref(),
        ]
    }
}

/// A note that carries at least one recognized tag.
///
/// Created per run; never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct TaggedNote {
    #[serde(flatten)]
    pub note: NoteRecord,

    /// Normalized tags in the note's own order
    #[serde(rename = "resolved_tags")]
    pub tags: Vec<String>,

    /// Tag that selects the handler
    pub primary_tag: String,
}

impl TaggedNote {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.note.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.note.title
    }

    /// Whether the note carries `tag` (normalized comparison).
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        super::tag::has_tag(&self.tags, tag)
    }
}
