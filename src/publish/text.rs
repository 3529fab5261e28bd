//! Status text builders.

/// Upper bound on posted text, in characters.
pub const MAX_STATUS_CHARS: usize = 480;

/// Length of the article excerpt, in characters.
pub const EXCERPT_CHARS: usize = 100;

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn take_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Text for conversational notes: the whole content on one line, capped.
#[must_use]
pub fn conversational_status_text(content: &str) -> String {
    take_chars(&collapse_whitespace(content), MAX_STATUS_CHARS)
}

/// Text for articles: title, a short excerpt and the public link.
///
/// ```text
/// <title>
///
/// <excerpt>…
/// <url>
/// ```
#[must_use]
pub fn article_status_text(title: &str, content: &str, url: Option<&str>) -> String {
    let flat = collapse_whitespace(content);
    let mut text = format!("{title}\n\n{}", take_chars(&flat, EXCERPT_CHARS));
    if flat.chars().count() > EXCERPT_CHARS {
        text.push('…');
    }
    if let Some(url) = url.filter(|u| !u.is_empty()) {
        text.push('\n');
        text.push_str(url);
    }
    take_chars(&text, MAX_STATUS_CHARS)
}
