//! Sync status display.
//!
//! Summarizes the state file, the registry and, when the note source is
//! readable, how many tagged notes are still waiting for a run.

use std::fs;
use std::path::{Path, PathBuf};

use colored::Colorize;
use serde::Serialize;

use super::state::StateStore;
use super::types::DiscoveredNote;
use crate::tags::TagRegistry;

/// Snapshot shown by `tagsync status`.
#[derive(Debug, Clone, Serialize)]
pub struct SyncStatus {
    pub state_file: PathBuf,
    pub state_exists: bool,
    pub state_size: u64,
    pub processed: usize,
    pub last_sync: Option<String>,
    pub config_file: PathBuf,
    pub handlers: usize,
    /// Hashtag export in use, if any
    pub hashtag_export: Option<PathBuf>,
    /// `None` when the note source could not be read
    pub tagged_notes: Option<usize>,
    pub pending: Option<usize>,
}

/// Build the status snapshot.
#[must_use]
pub fn get_sync_status(
    state: &StateStore,
    config_file: &Path,
    registry: &TagRegistry,
    hashtag_export: Option<&Path>,
    discovered: Option<&[DiscoveredNote]>,
) -> SyncStatus {
    let metadata = fs::metadata(state.path()).ok();

    SyncStatus {
        state_file: state.path().to_path_buf(),
        state_exists: metadata.is_some(),
        state_size: metadata.map_or(0, |m| m.len()),
        processed: state.len(),
        last_sync: state.last_sync().map(|t| t.to_rfc3339()),
        config_file: config_file.to_path_buf(),
        handlers: registry.len(),
        hashtag_export: hashtag_export.map(Path::to_path_buf),
        tagged_notes: discovered.map(<[DiscoveredNote]>::len),
        pending: discovered.map(|d| d.iter().filter(|n| !n.processed).count()),
    }
}

/// Print sync status to stdout in a human-readable format.
pub fn print_status(status: &SyncStatus) {
    println!("{}", "Sync Status".bold().underline());
    println!();

    println!("{}", "State:".blue().bold());
    if status.state_exists {
        println!(
            "  File:          {} ({})",
            status.state_file.display(),
            format_size(status.state_size)
        );
    } else {
        println!("  File:          {} {}", status.state_file.display(), "(not created yet)".dimmed());
    }
    println!("  Processed:     {}", status.processed);
    println!(
        "  Last sync:     {}",
        status.last_sync.as_deref().unwrap_or("never")
    );
    println!();

    println!("{}", "Routing:".blue().bold());
    println!("  Config:        {}", status.config_file.display());
    println!("  Handlers:      {}", status.handlers);
    match &status.hashtag_export {
        Some(path) => println!("  Hashtags:      {}", path.display()),
        None => println!("  Hashtags:      {}", "note metadata".dimmed()),
    }
    println!();

    match (status.tagged_notes, status.pending) {
        (Some(tagged), Some(pending)) if pending > 0 => {
            println!("{}", "Pending:".yellow().bold());
            println!("  {pending} of {tagged} tagged notes not yet processed.");
            println!();
            println!("{}", "Run 'tagsync sync' to process them.".dimmed());
        }
        (Some(tagged), _) => {
            println!("{}", format!("All {tagged} tagged notes processed.").green());
        }
        (None, _) => println!("{}", "Note source unavailable.".dimmed()),
    }
}

/// Format a byte size as a human-readable string.
#[allow(clippy::cast_precision_loss)]
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn discovered(id: &str, processed: bool) -> DiscoveredNote {
        DiscoveredNote {
            id: id.into(),
            title: "t".into(),
            tags: vec!["#thought".into()],
            primary_tag: "#thought".into(),
            handler: Some("thought".into()),
            processed,
            modified: None,
        }
    }

    #[test]
    fn test_status_counts_pending() {
        let dir = TempDir::new().unwrap();
        let mut state = StateStore::new(dir.path().join("state.json"));
        state.mark_processed("a");
        state.save().unwrap();

        let notes = vec![discovered("a", true), discovered("b", false)];
        let status = get_sync_status(
            &state,
            Path::new("cfg.json"),
            &TagRegistry::default(),
            None,
            Some(&notes),
        );

        assert!(status.state_exists);
        assert!(status.state_size > 0);
        assert_eq!(status.processed, 1);
        assert!(status.last_sync.is_some());
        assert_eq!(status.tagged_notes, Some(2));
        assert_eq!(status.pending, Some(1));
    }

    #[test]
    fn test_status_without_source() {
        let dir = TempDir::new().unwrap();
        let state = StateStore::new(dir.path().join("state.json"));
        let status = get_sync_status(&state, Path::new("c"), &TagRegistry::default(), None, None);
        assert!(!status.state_exists);
        assert_eq!(status.pending, None);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }
}
