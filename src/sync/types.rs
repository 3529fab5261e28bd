//! Types for sync runs.
//!
//! This module defines the options a run takes and the statistics and
//! per-note reports it returns.

use std::path::PathBuf;

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

/// Switches for one sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Reprocess notes already recorded in the state file.
    pub force: bool,
    /// Post gated notes through the publisher.
    pub publish: bool,
    /// Remove notes from the source after a successful dispatch.
    pub delete_original: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            force: false,
            publish: true,
            delete_original: false,
        }
    }
}

/// Terminal state of one note in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteOutcome {
    /// Dispatched and recorded.
    Succeeded,
    /// Recorded by an earlier run.
    AlreadyProcessed,
    /// Nothing left after cleaning.
    Empty,
    /// Handler failed; retried next run.
    Failed,
}

impl NoteOutcome {
    /// Whether this outcome counts as skipped.
    #[must_use]
    pub const fn is_skipped(self) -> bool {
        matches!(self, Self::AlreadyProcessed | Self::Empty)
    }
}

impl std::fmt::Display for NoteOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Succeeded => write!(f, "succeeded"),
            Self::AlreadyProcessed => write!(f, "already processed"),
            Self::Empty => write!(f, "empty"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// What happened to one note.
#[derive(Debug, Clone, Serialize)]
pub struct NoteReport {
    pub id: String,
    pub title: String,
    pub primary_tag: String,
    /// Handler type, or `None` for the default handler.
    pub handler: Option<String>,
    pub outcome: NoteOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_path: Option<PathBuf>,
    /// Artifact was marked as a draft.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub draft: bool,
    /// `Some(ok)` when publishing was attempted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,
    /// `Some(ok)` when source deletion was attempted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,
}

/// Counters for a run.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct SyncStats {
    /// Notes dispatched successfully.
    pub success: usize,
    /// Notes already processed or empty after cleaning.
    pub skipped: usize,
    /// Notes whose handler failed.
    pub failed: usize,
    /// Successes that went through the default handler.
    pub unknown_tags: usize,
    /// The run stopped early on an interrupt.
    pub interrupted: bool,
}

impl SyncStats {
    /// Notes that reached a terminal outcome.
    #[must_use]
    pub fn total(&self) -> usize {
        self.success + self.skipped + self.failed
    }

    /// Returns true if no note was considered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub(crate) fn record(&mut self, report: &NoteReport) {
        match report.outcome {
            NoteOutcome::Succeeded => {
                self.success += 1;
                if report.handler.is_none() {
                    self.unknown_tags += 1;
                }
            }
            NoteOutcome::AlreadyProcessed | NoteOutcome::Empty => self.skipped += 1,
            NoteOutcome::Failed => self.failed += 1,
        }
    }
}

/// Result of a sync run.
#[derive(Debug, Default, Clone, Serialize)]
pub struct SyncReport {
    pub stats: SyncStats,
    /// Notes returned by the source.
    pub scanned: usize,
    /// Notes carrying at least one tag.
    pub tagged: usize,
    /// Stale ids dropped from the state.
    pub pruned: usize,
    /// The state file was written.
    pub state_saved: bool,
    pub notes: Vec<NoteReport>,
}

/// A tagged note as seen by `list`.
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveredNote {
    pub id: String,
    pub title: String,
    pub tags: Vec<String>,
    pub primary_tag: String,
    /// Handler type, or `None` for the default handler.
    pub handler: Option<String>,
    pub processed: bool,
    pub modified: Option<DateTime<FixedOffset>>,
}
