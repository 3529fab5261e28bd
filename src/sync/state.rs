//! Persisted sync state.
//!
//! The state file records which note ids have already been routed to a
//! handler, so repeated runs only act on new notes:
//!
//! ```json
//! {"processed_notes": ["id-1", "id-2"], "last_sync": "2025-01-20T10:00:00+08:00"}
//! ```
//!
//! Loading is fail-open: an unreadable or corrupt file yields an empty
//! state. The in-memory set is only made durable by [`StateStore::save`],
//! which the orchestrator calls once per run.

use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, Local};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::sync::file::atomic_write;

/// On-disk representation of the state file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SyncStateFile {
    #[serde(default)]
    processed_notes: Vec<String>,
    #[serde(default)]
    last_sync: Option<DateTime<FixedOffset>>,
}

/// Owned, file-backed set of processed note ids.
#[derive(Debug)]
pub struct StateStore {
    path: PathBuf,
    processed: HashSet<String>,
    last_sync: Option<DateTime<FixedOffset>>,
}

impl StateStore {
    /// Create an empty store backed by `path` without reading it.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            processed: HashSet::new(),
            last_sync: None,
        }
    }

    /// Load the store from `path`.
    ///
    /// Never fails: a missing file is a first run, and a read or parse
    /// failure is logged and treated as an empty state.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let mut store = Self::new(path);

        let content = match fs::read_to_string(&store.path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %store.path.display(), "No state file yet");
                return store;
            }
            Err(e) => {
                warn!(path = %store.path.display(), error = %e, "Failed to read state file, starting empty");
                return store;
            }
        };

        match serde_json::from_str::<SyncStateFile>(&content) {
            Ok(file) => {
                store.processed = file.processed_notes.into_iter().collect();
                store.last_sync = file.last_sync;
                info!(processed = store.processed.len(), "Loaded sync state");
            }
            Err(e) => {
                warn!(path = %store.path.display(), error = %e, "Corrupt state file, starting empty");
            }
        }

        store
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether `id` was processed by an earlier (or the current) run.
    #[must_use]
    pub fn is_processed(&self, id: &str) -> bool {
        self.processed.contains(id)
    }

    /// Record a successful dispatch. Not durable until [`save`](Self::save).
    pub fn mark_processed(&mut self, id: &str) {
        self.processed.insert(id.to_string());
    }

    /// Drop processed ids that are no longer present in the note source.
    ///
    /// Returns the number of ids removed.
    pub fn clean(&mut self, current_ids: &HashSet<String>) -> usize {
        let before = self.processed.len();
        self.processed.retain(|id| current_ids.contains(id));
        let removed = before - self.processed.len();
        if removed > 0 {
            info!(removed, "Pruned state for notes no longer in the source");
        }
        removed
    }

    /// Persist the full set with a fresh timestamp, replacing the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&mut self) -> Result<()> {
        let now = Local::now().fixed_offset();
        let mut processed_notes: Vec<String> = self.processed.iter().cloned().collect();
        processed_notes.sort();

        let file = SyncStateFile {
            processed_notes,
            last_sync: Some(now),
        };
        let content = serde_json::to_string_pretty(&file)?;
        atomic_write(&self.path, &content)
            .map_err(|e| Error::State(format!("{}: {e}", self.path.display())))?;

        self.last_sync = Some(now);
        debug!(path = %self.path.display(), processed = file.processed_notes.len(), "State saved");
        Ok(())
    }

    /// Forget everything and remove the backing file.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be removed.
    pub fn reset(&mut self) -> Result<()> {
        self.processed.clear();
        self.last_sync = None;
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::State(format!("{}: {e}", self.path.display()))),
        }
    }

    /// Number of processed ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.processed.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.processed.is_empty()
    }

    /// Timestamp of the last successful save.
    #[must_use]
    pub fn last_sync(&self) -> Option<DateTime<FixedOffset>> {
        self.last_sync
    }

    /// Processed ids, sorted.
    #[must_use]
    pub fn processed_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.processed.iter().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}
