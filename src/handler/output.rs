//! Artifact path convention for handler output.
//!
//! Handlers announce the file they generated by printing a path shaped like
//! `content/<...>.md` anywhere on stdout. This is the only place that knows
//! the convention.

use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

static GENERATED_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(content/\S+?\.md)").expect("valid regex"));

/// Find the first generated-file path in handler stdout.
#[must_use]
pub fn extract_artifact_path(stdout: &str) -> Option<PathBuf> {
    GENERATED_PATH
        .captures(stdout)
        .map(|caps| normalize_path(Path::new(&caps[1])))
}

/// Lexically normalize a relative path (`a/./b/../c` → `a/c`).
fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
