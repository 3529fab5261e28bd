//! Tag normalization.
//!
//! Every tag is compared and stored in one canonical form: trimmed,
//! lowercase, with exactly one leading `#`.

/// Normalize a raw tag string.
///
/// Returns `None` when nothing is left after trimming and stripping `#`.
///
/// # Example
///
/// ```
/// use tagsync::model::normalize_tag;
///
/// assert_eq!(normalize_tag("  Thought "), Some("#thought".to_string()));
/// assert_eq!(normalize_tag("##Draft"), Some("#draft".to_string()));
/// assert_eq!(normalize_tag(" # "), None);
/// ```
#[must_use]
pub fn normalize_tag(raw: &str) -> Option<String> {
    let bare = raw.trim().trim_start_matches('#').trim();
    if bare.is_empty() {
        None
    } else {
        Some(format!("#{}", bare.to_lowercase()))
    }
}

/// Normalize a list of raw tags, dropping empties and keeping order.
#[must_use]
pub fn normalize_tags<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    raw.iter().filter_map(|t| normalize_tag(t.as_ref())).collect()
}

/// Check whether `tags` contains `name`, after normalizing both sides.
#[must_use]
pub fn has_tag<S: AsRef<str>>(tags: &[S], name: &str) -> bool {
    let Some(target) = normalize_tag(name) else {
        return false;
    };
    tags.iter()
        .any(|t| normalize_tag(t.as_ref()).is_some_and(|t| t == target))
}
