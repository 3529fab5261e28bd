//! Content cleaning before generation.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use tracing::warn;

use crate::config::ContentProcessing;

/// Three or more line breaks, possibly separated by whitespace-only lines.
static BLANK_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n\s*\n").expect("valid regex"));

/// Strips tags and normalizes whitespace in note bodies.
#[derive(Debug, Clone, Copy)]
pub struct ContentCleaner {
    remove_tags: bool,
    clean_whitespace: bool,
}

impl Default for ContentCleaner {
    fn default() -> Self {
        Self::new(true, true)
    }
}

impl From<ContentProcessing> for ContentCleaner {
    fn from(options: ContentProcessing) -> Self {
        Self::new(options.remove_tags, options.clean_whitespace)
    }
}

impl ContentCleaner {
    #[must_use]
    pub const fn new(remove_tags: bool, clean_whitespace: bool) -> Self {
        Self {
            remove_tags,
            clean_whitespace,
        }
    }

    /// Clean `body` for a handler.
    ///
    /// Removes every occurrence of each tag (case-insensitive), collapses
    /// runs of blank lines to a single blank line, and trims. An empty
    /// result means there is nothing to sync.
    #[must_use]
    pub fn clean(&self, body: &str, tags: &[String]) -> String {
        let mut text = body.to_string();

        if self.remove_tags {
            for tag in tags.iter().filter(|t| !t.is_empty()) {
                match RegexBuilder::new(&regex::escape(tag))
                    .case_insensitive(true)
                    .build()
                {
                    Ok(re) => text = re.replace_all(&text, "").into_owned(),
                    Err(e) => warn!(%tag, error = %e, "Could not build tag pattern"),
                }
            }
        }

        if self.clean_whitespace {
            text = BLANK_RUN.replace_all(&text, "\n\n").trim().to_string();
        }

        text
    }
}
