//! Hashtag export extraction.
//!
//! Hashtags live in the notes app's database, which only an external
//! extractor can read. When an extractor is configured, a sync can run it
//! first and then use the newest `all_notes_*.json` it produced.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, SystemTime};

use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::ExtractorConfig;
use crate::error::{Error, Result};

/// File name prefix of hashtag exports.
pub const EXPORT_PREFIX: &str = "all_notes_";

fn resolve(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

/// Newest `all_notes_*.json` in `dir` by modification time.
#[must_use]
pub fn newest_export(dir: &Path) -> Option<PathBuf> {
    let entries = fs::read_dir(dir).ok()?;
    entries
        .filter_map(std::result::Result::ok)
        .filter(|e| {
            let name = e.file_name();
            let name = name.to_string_lossy();
            name.starts_with(EXPORT_PREFIX)
                && Path::new(name.as_ref())
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
        })
        .map(|e| {
            let modified = e.metadata().and_then(|m| m.modified()).unwrap_or(SystemTime::UNIX_EPOCH);
            (modified, e.path())
        })
        .max_by_key(|(modified, _)| *modified)
        .map(|(_, path)| path)
}

/// Directory the extractor writes exports to.
#[must_use]
pub fn output_dir(config: &ExtractorConfig, base_dir: &Path) -> PathBuf {
    resolve(base_dir, &config.output_dir)
}

/// Run the configured extractor and return the newest export it left.
///
/// Returns `Ok(None)` when the extractor succeeded but no export exists.
///
/// # Errors
///
/// Returns a source error if the extractor cannot be started, exits with a
/// failure status, or exceeds its timeout.
pub async fn run_extractor(config: &ExtractorConfig, base_dir: &Path) -> Result<Option<PathBuf>> {
    let Some((program, args)) = config.command.split_first() else {
        return Err(Error::Config("extractor command is empty".to_string()));
    };

    let working_dir = config
        .working_dir
        .as_deref()
        .map_or_else(|| base_dir.to_path_buf(), |d| resolve(base_dir, d));
    if !working_dir.is_dir() {
        return Err(Error::Source(format!(
            "extractor directory not found: {}",
            working_dir.display()
        )));
    }

    info!(program = %program, dir = %working_dir.display(), "Running hashtag extractor");
    let child = Command::new(program)
        .args(args)
        .current_dir(&working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| Error::Source(format!("failed to start extractor {program}: {e}")))?;

    let timeout = Duration::from_secs(config.timeout_secs);
    let output = tokio::time::timeout(timeout, child.wait_with_output())
        .await
        .map_err(|_| Error::Source(format!("extractor timed out after {}s", config.timeout_secs)))??;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Source(format!(
            "extractor exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }
    debug!(stdout_bytes = output.stdout.len(), "Extractor finished");

    let dir = output_dir(config, base_dir);
    let newest = newest_export(&dir);
    match &newest {
        Some(path) => info!(path = %path.display(), "Hashtag export ready"),
        None => warn!(dir = %dir.display(), "Extractor produced no export"),
    }
    Ok(newest)
}
