//! Configuration management.
//!
//! This module resolves the files a run works with and loads the registry
//! configuration.
//!
//! # Layout
//!
//! tagsync runs from the root of a static site:
//! - **Registry config**: `multi_tag_config.json` in the working directory,
//!   falling back to `~/.tagsync/multi_tag_config.json`
//! - **Sync state**: `multi_tag_sync_state.json` in the working directory
//! - **Note dump**: `notes.json` in the working directory
//! - **Artifacts**: `content/...` under the site root

mod publish;
mod registry;

pub use publish::{PublisherConfig, DEFAULT_PUBLISH_TIMEOUT};
pub use registry::{
    CallingConventionConfig, ContentProcessing, DefaultHandlerInfo, ExtractorConfig,
    HandlerConfig, ProcessingOptions, RegistryConfig,
};

use std::path::{Path, PathBuf};

/// Default registry config file name.
pub const CONFIG_FILE_NAME: &str = "multi_tag_config.json";

/// Default sync state file name.
pub const STATE_FILE_NAME: &str = "multi_tag_sync_state.json";

/// Default note dump file name.
pub const NOTES_FILE_NAME: &str = "notes.json";

/// Get the global tagsync directory (`~/.tagsync/`).
#[must_use]
pub fn global_tagsync_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".tagsync"))
}

/// Read a non-blank environment variable.
fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
}

/// Resolve the registry config path.
///
/// Priority:
/// 1. If `explicit_path` is provided, use it directly
/// 2. `TAGSYNC_CONFIG` environment variable
/// 3. `multi_tag_config.json` in `base_dir`, if it exists
/// 4. `~/.tagsync/multi_tag_config.json`, if it exists
/// 5. `multi_tag_config.json` in `base_dir` (so the error names a local path)
#[must_use]
pub fn resolve_config_path(explicit_path: Option<&Path>, base_dir: &Path) -> PathBuf {
    if let Some(path) = explicit_path {
        return path.to_path_buf();
    }

    if let Some(path) = env_path("TAGSYNC_CONFIG") {
        return path;
    }

    let local = base_dir.join(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }

    if let Some(global) = global_tagsync_dir().map(|d| d.join(CONFIG_FILE_NAME)) {
        if global.exists() {
            return global;
        }
    }

    local
}

/// Resolve the sync state path.
///
/// Priority: explicit path, `TAGSYNC_STATE`, then `base_dir/multi_tag_sync_state.json`.
#[must_use]
pub fn resolve_state_path(explicit_path: Option<&Path>, base_dir: &Path) -> PathBuf {
    explicit_path
        .map(Path::to_path_buf)
        .or_else(|| env_path("TAGSYNC_STATE"))
        .unwrap_or_else(|| base_dir.join(STATE_FILE_NAME))
}

/// Resolve the note dump path.
///
/// Priority: explicit path, `TAGSYNC_NOTES`, then `base_dir/notes.json`.
#[must_use]
pub fn resolve_notes_path(explicit_path: Option<&Path>, base_dir: &Path) -> PathBuf {
    explicit_path
        .map(Path::to_path_buf)
        .or_else(|| env_path("TAGSYNC_NOTES"))
        .unwrap_or_else(|| base_dir.join(NOTES_FILE_NAME))
}
