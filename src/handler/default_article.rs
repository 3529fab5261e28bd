//! Built-in handler for tags with no registered handler.
//!
//! Unknown tags become a dated blog article under `content/blog/`, with YAML
//! frontmatter carrying the generic article category and the note's own
//! tags.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, Local};
use tracing::info;

use crate::model::TaggedNote;

/// Category (and always-present tag) of generated articles.
pub const ARTICLE_CATEGORY: &str = "文章";

/// Output directory for generated articles, relative to the site root.
pub const ARTICLE_DIR: &str = "content/blog";

const MAX_SLUG_CHARS: usize = 60;

/// Derive a filename slug from a title.
///
/// Lowercases, turns whitespace runs into `-`, keeps ASCII letters, digits,
/// `-`, `_` and CJK ideographs, and truncates. Falls back to `post`.
#[must_use]
pub fn slugify(title: &str) -> String {
    let lowered = title.trim().to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut in_space = false;

    for c in lowered.chars() {
        if c.is_whitespace() {
            if !in_space {
                slug.push('-');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        if c.is_ascii_lowercase()
            || c.is_ascii_digit()
            || c == '-'
            || c == '_'
            || ('\u{4e00}'..='\u{9fff}').contains(&c)
        {
            slug.push(c);
        }
    }

    let slug: String = slug.chars().take(MAX_SLUG_CHARS).collect();
    if slug.is_empty() {
        "post".to_string()
    } else {
        slug
    }
}

/// Frontmatter tag list: note tags without `#`, de-duplicated, category first.
fn article_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let bare = tag.trim().trim_start_matches('#').to_string();
        if !bare.is_empty() && !out.contains(&bare) {
            out.push(bare);
        }
    }
    if !out.iter().any(|t| t == ARTICLE_CATEGORY) {
        out.insert(0, ARTICLE_CATEGORY.to_string());
    }
    out
}

fn quote_yaml(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Render frontmatter plus body for an article.
#[must_use]
pub fn render_article(
    title: &str,
    date: &DateTime<FixedOffset>,
    draft: bool,
    tags: &[String],
    body: &str,
) -> String {
    let mut out = String::from("---\n");
    out.push_str(&format!("title: {}\n", quote_yaml(title)));
    out.push_str(&format!("date: {}\n", date.format("%Y-%m-%dT%H:%M:%S%:z")));
    out.push_str(&format!("updated: {}\n", date.format("%Y-%m-%d")));
    if draft {
        out.push_str("draft: true\n");
    }
    out.push_str("taxonomies:\n  categories:\n");
    out.push_str(&format!("    - {ARTICLE_CATEGORY}\n"));
    out.push_str("  tags:\n");
    for tag in article_tags(tags) {
        out.push_str(&format!("    - {tag}\n"));
    }
    out.push_str("---\n\n");
    out.push_str(body.trim());
    out.push('\n');
    out
}

/// Write the article for `note` under `site_root`.
///
/// Returns the artifact path relative to the site root.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be written.
pub fn write_article(
    site_root: &Path,
    content: &str,
    note: &TaggedNote,
    draft_tag: &str,
) -> std::io::Result<PathBuf> {
    let title = if note.title().trim().is_empty() {
        "无标题"
    } else {
        note.title()
    };
    let date = note
        .note
        .effective_date()
        .unwrap_or_else(|| Local::now().fixed_offset());

    let relative = PathBuf::from(ARTICLE_DIR).join(format!(
        "{}-{}.md",
        date.format("%Y-%m-%d"),
        slugify(title)
    ));
    let path = site_root.join(&relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let text = render_article(title, &date, note.has_tag(draft_tag), &note.tags, content);
    fs::write(&path, text)?;
    info!(path = %relative.display(), "Default handler wrote article");
    Ok(relative)
}
