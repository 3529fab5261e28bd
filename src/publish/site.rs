//! Public URLs of generated artifacts.

use std::fs;
use std::path::{Component, Path};

use tracing::{debug, warn};

/// Site config file read for `base_url`.
const SITE_CONFIG: &str = "config.toml";

/// Read `base_url` from the site's `config.toml`, without a trailing `/`.
///
/// Returns `None` when the file or key is missing or unreadable.
#[must_use]
pub fn read_site_base_url(site_root: &Path) -> Option<String> {
    let path = site_root.join(SITE_CONFIG);
    let content = fs::read_to_string(&path).ok()?;
    let value: toml::Value = match toml::from_str(&content) {
        Ok(v) => v,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not parse site config");
            return None;
        }
    };
    let base = value
        .get("base_url")
        .and_then(toml::Value::as_str)
        .map(|s| s.trim_end_matches('/').to_string())
        .filter(|s| !s.is_empty());
    debug!(base_url = ?base, "Site base URL");
    base
}

/// Public URL of an artifact under `content/`.
///
/// `content/blog/2024-03-02-launch-plan.md` becomes
/// `<base>/blog/2024-03-02-launch-plan/`; a trailing `index` page maps to its
/// directory. Without a base URL the site-relative path is returned. Paths
/// outside `content/` have no URL.
#[must_use]
pub fn artifact_url(path: &Path, base_url: Option<&str>) -> Option<String> {
    let parts: Vec<String> = path
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    let start = parts.iter().position(|p| p == "content")? + 1;

    let mut rel = parts[start..].join("/");
    if rel.to_ascii_lowercase().ends_with(".md") {
        rel.truncate(rel.len() - 3);
    }
    if rel == "index" {
        rel.clear();
    } else if let Some(stripped) = rel.strip_suffix("/index") {
        rel = stripped.to_string();
    }

    let url_path = if rel.is_empty() {
        "/".to_string()
    } else {
        format!("/{rel}/")
    };
    Some(match base_url {
        Some(base) if !base.is_empty() => format!("{base}{url_path}"),
        _ => url_path,
    })
}
