//! Draft flag rewriting for generated Markdown.
//!
//! Handlers emit either YAML (`---`) or TOML (`+++`) frontmatter. Marking a
//! note as a draft sets `draft` to true in whichever dialect the file uses,
//! or prepends a minimal YAML block when there is none.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use tracing::debug;

/// One frontmatter dialect.
struct Dialect {
    fence: &'static str,
    existing: LazyLock<Regex>,
    line: &'static str,
}

fn multiline_ci(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .multi_line(true)
        .build()
        .expect("valid regex")
}

static YAML: Dialect = Dialect {
    fence: "---",
    existing: LazyLock::new(|| multiline_ci(r"^([ \t]*draft[ \t]*:[ \t]*)[^\r\n]*")),
    line: "draft: true",
};

static TOML: Dialect = Dialect {
    fence: "+++",
    existing: LazyLock::new(|| multiline_ci(r"^([ \t]*draft[ \t]*=[ \t]*)[^\r\n]*")),
    line: "draft = true",
};

/// Rewrite frontmatter in `dialect`, or `None` if the text does not use it.
fn rewrite(text: &str, dialect: &Dialect) -> Option<String> {
    if !text.starts_with(dialect.fence) {
        return None;
    }
    let closing = format!("\n{}", dialect.fence);
    let end = text[dialect.fence.len()..].find(&closing)? + dialect.fence.len();
    let head_end = end + closing.len();
    let (head, body) = text.split_at(head_end);

    let head = if dialect.existing.is_match(head) {
        dialect.existing.replace_all(head, "${1}true").into_owned()
    } else {
        // Keep CRLF files CRLF.
        match head[..end].strip_suffix('\r') {
            Some(prefix) => format!("{prefix}\r\n{}\r{closing}", dialect.line),
            None => format!("{}\n{}{closing}", &head[..end], dialect.line),
        }
    };
    Some(format!("{head}{body}"))
}

/// Return `text` with its frontmatter marked as a draft.
#[must_use]
pub fn mark_draft(text: &str) -> String {
    rewrite(text, &YAML)
        .or_else(|| rewrite(text, &TOML))
        .unwrap_or_else(|| format!("---\ndraft: true\n---\n\n{text}"))
}

/// Mark the Markdown file at `path` as a draft.
///
/// Missing files and non-Markdown files are left alone.
///
/// # Errors
///
/// Returns an error if the file cannot be read or written.
pub fn ensure_draft(path: &Path) -> std::io::Result<()> {
    let is_markdown = path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("md"));
    if !is_markdown || !path.exists() {
        debug!(path = %path.display(), "Not a generated Markdown file, draft flag skipped");
        return Ok(());
    }

    let bytes = fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes);
    fs::write(path, mark_draft(&text))?;
    debug!(path = %path.display(), "Marked as draft");
    Ok(())
}
