//! Publisher configuration.
//!
//! Publishing settings are collected once (CLI flags or environment, see
//! `cli::SyncArgs`) into an explicit struct handed to the orchestrator.
//! Nothing below the CLI layer reads the environment.

use std::time::Duration;

/// Default request timeout for status posts.
pub const DEFAULT_PUBLISH_TIMEOUT: Duration = Duration::from_secs(10);

/// Mastodon-compatible publisher settings.
#[derive(Debug, Clone)]
pub struct PublisherConfig {
    /// Instance URL; only scheme and host are used
    pub base_url: Option<String>,
    pub access_token: Option<String>,
    /// public, unlisted, private or direct
    pub visibility: String,
    pub language: Option<String>,
    pub timeout: Duration,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            access_token: None,
            visibility: "direct".to_string(),
            language: Some("zh".to_string()),
            timeout: DEFAULT_PUBLISH_TIMEOUT,
        }
    }
}

impl PublisherConfig {
    /// Whether both an instance URL and a token are present.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        present(&self.base_url) && present(&self.access_token)
    }
}
