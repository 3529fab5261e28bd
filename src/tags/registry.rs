//! Tag registry.
//!
//! Maps tag names and their aliases to handler descriptors, and picks the
//! primary tag of a note from the configured priority order.

use tracing::warn;

use crate::config::RegistryConfig;
use crate::handler::HandlerDescriptor;
use crate::model::normalize_tag;

/// Registered tag with its descriptor.
#[derive(Debug, Clone)]
pub struct RegistryEntry {
    /// Normalized canonical tag
    pub tag: String,
    pub descriptor: HandlerDescriptor,
}

/// Configuration-driven tag → handler lookup.
#[derive(Debug, Clone, Default)]
pub struct TagRegistry {
    entries: Vec<RegistryEntry>,
    priority_order: Vec<String>,
    default_description: Option<String>,
}

impl TagRegistry {
    /// Build the registry from the loaded config.
    #[must_use]
    pub fn from_config(config: &RegistryConfig) -> Self {
        let conversational = &config.processing_options.conversational_types;
        let mut entries: Vec<RegistryEntry> = Vec::with_capacity(config.tag_handlers.len());

        for (raw_tag, handler) in &config.tag_handlers {
            let Some(tag) = normalize_tag(raw_tag) else {
                warn!(tag = %raw_tag, "Ignoring handler registered under an empty tag");
                continue;
            };
            if entries.iter().any(|e| e.tag == tag) {
                warn!(%tag, "Duplicate handler tag after normalization, keeping the first");
                continue;
            }
            entries.push(RegistryEntry {
                tag,
                descriptor: HandlerDescriptor::from_config(handler, conversational),
            });
        }

        let priority_order = config
            .processing_options
            .priority_order
            .iter()
            .filter_map(|t| normalize_tag(t))
            .collect();

        Self {
            entries,
            priority_order,
            default_description: config
                .default_handler
                .as_ref()
                .map(|d| d.description.clone())
                .filter(|d| !d.is_empty()),
        }
    }

    /// Find the entry for `tag`: exact name first, then aliases.
    fn entry_for(&self, tag: &str) -> Option<&RegistryEntry> {
        let tag = normalize_tag(tag)?;
        self.entries
            .iter()
            .find(|e| e.tag == tag)
            .or_else(|| self.entries.iter().find(|e| e.descriptor.aliases.contains(&tag)))
    }

    /// Resolve a tag to its handler.
    ///
    /// Returns `None` for an unknown tag, which routes to the default handler.
    #[must_use]
    pub fn resolve(&self, tag: &str) -> Option<&HandlerDescriptor> {
        self.entry_for(tag).map(|e| &e.descriptor)
    }

    /// Canonical registered tag for `tag`, following aliases.
    #[must_use]
    pub fn canonical_tag(&self, tag: &str) -> Option<&str> {
        self.entry_for(tag).map(|e| e.tag.as_str())
    }

    /// Pick the tag that selects the handler.
    ///
    /// Walks the priority order and returns the first note tag equal to the
    /// priority entry, or registered as an alias of it. When no priority
    /// entry matches, the note's own first tag wins. `None` only for an
    /// empty tag list.
    #[must_use]
    pub fn primary_tag(&self, tags: &[String]) -> Option<String> {
        for priority in &self.priority_order {
            for tag in tags {
                let Some(normalized) = normalize_tag(tag) else {
                    continue;
                };
                if &normalized == priority {
                    return Some(tag.clone());
                }
                if self.canonical_tag(&normalized) == Some(priority.as_str()) {
                    return Some(tag.clone());
                }
            }
        }
        tags.first().cloned()
    }

    /// Registered entries in configuration order.
    #[must_use]
    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    /// Normalized priority order.
    #[must_use]
    pub fn priority_order(&self) -> &[String] {
        &self.priority_order
    }

    /// Description of the built-in default handler, if configured.
    #[must_use]
    pub fn default_description(&self) -> Option<&str> {
        self.default_description.as_deref()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(priority: &[&str]) -> TagRegistry {
        let priority_json = serde_json::to_string(priority).unwrap();
        let config = RegistryConfig::parse(&format!(
            r##"{{
                "tag_handlers": {{
                    "#Thought": {{"type": "thought", "script": "t.sh", "aliases": ["#想法", "idea"]}},
                    "#article": {{"type": "article", "script": "a.sh", "aliases": ["#blog"]}}
                }},
                "processing_options": {{"priority_order": {priority_json}}}
            }}"##
        ))
        .unwrap();
        TagRegistry::from_config(&config)
    }

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_resolve_exact_case_insensitive() {
        let reg = registry(&[]);
        assert_eq!(reg.resolve("#THOUGHT").unwrap().kind, "thought");
        assert_eq!(reg.resolve("article").unwrap().kind, "article");
    }

    #[test]
    fn test_alias_resolves_like_canonical() {
        let reg = registry(&[]);
        let via_alias = reg.resolve("#idea").unwrap();
        let via_name = reg.resolve("#thought").unwrap();
        assert_eq!(via_alias.kind, via_name.kind);
        assert_eq!(via_alias.invocation_target, via_name.invocation_target);
        assert_eq!(reg.resolve("#想法").unwrap().kind, "thought");
    }

    #[test]
    fn test_unknown_tag_is_none() {
        let reg = registry(&[]);
        assert!(reg.resolve("#recipe").is_none());
        assert!(reg.resolve("").is_none());
    }

    #[test]
    fn test_primary_tag_follows_priority_not_note_order() {
        let reg = registry(&["#thought", "#article"]);
        assert_eq!(
            reg.primary_tag(&tags(&["#article", "#thought"])).as_deref(),
            Some("#thought")
        );
        assert_eq!(
            reg.primary_tag(&tags(&["#thought", "#article"])).as_deref(),
            Some("#thought")
        );
    }

    #[test]
    fn test_primary_tag_matches_alias_of_priority_entry() {
        let reg = registry(&["#thought", "#article"]);
        assert_eq!(
            reg.primary_tag(&tags(&["#blog", "#idea"])).as_deref(),
            Some("#idea")
        );
    }

    #[test]
    fn test_primary_tag_falls_back_to_first_tag() {
        let reg = registry(&["#thought"]);
        assert_eq!(
            reg.primary_tag(&tags(&["#article", "#draft"])).as_deref(),
            Some("#article")
        );
        assert_eq!(reg.primary_tag(&[]), None);
    }

    #[test]
    fn test_entries_keep_config_order() {
        let reg = registry(&[]);
        let names: Vec<&str> = reg.entries().iter().map(|e| e.tag.as_str()).collect();
        assert_eq!(names, vec!["#thought", "#article"]);
        assert_eq!(reg.len(), 2);
    }
}
