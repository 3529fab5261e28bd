//! Mastodon-compatible status publisher.

use std::time::Duration;

use reqwest::Url;
use tracing::{debug, info};

use super::Publisher;
use crate::config::PublisherConfig;
use crate::error::{Error, Result};

/// Scheme and host of an instance URL, with `https://` assumed when the
/// scheme is missing. Paths, queries and trailing slashes are dropped.
#[must_use]
pub fn instance_origin(raw: &str) -> Option<String> {
    let raw = raw.trim().trim_end_matches('/');
    if raw.is_empty() {
        return None;
    }
    let with_scheme = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };
    let url = Url::parse(&with_scheme).ok()?;
    url.host_str()?;
    Some(url.origin().ascii_serialization())
}

/// Posts statuses to `/api/v1/statuses`.
pub struct MastodonPublisher {
    client: reqwest::Client,
    endpoint: String,
    access_token: String,
    visibility: String,
    language: Option<String>,
    timeout: Duration,
}

impl MastodonPublisher {
    /// Build a publisher from resolved settings.
    ///
    /// # Errors
    ///
    /// Returns a config error when the instance URL or token is missing, and
    /// an invalid-argument error when the instance URL cannot be parsed.
    pub fn from_config(config: &PublisherConfig) -> Result<Self> {
        if !config.is_configured() {
            return Err(Error::Config(
                "publishing needs an instance URL and an access token".to_string(),
            ));
        }
        let base = config.base_url.as_deref().unwrap_or_default();
        let origin = instance_origin(base)
            .ok_or_else(|| Error::InvalidArgument(format!("invalid instance URL: {base}")))?;

        Ok(Self {
            client: reqwest::Client::new(),
            endpoint: format!("{origin}/api/v1/statuses"),
            access_token: config.access_token.clone().unwrap_or_default(),
            visibility: config.visibility.clone(),
            language: config.language.clone().filter(|l| !l.is_empty()),
            timeout: config.timeout,
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Publisher for MastodonPublisher {
    fn name(&self) -> String {
        format!("mastodon:{}", self.endpoint)
    }

    async fn publish(&self, text: &str) -> Result<()> {
        let mut form: Vec<(&str, &str)> = vec![("status", text), ("visibility", &self.visibility)];
        if let Some(language) = &self.language {
            form.push(("language", language));
        }

        debug!(endpoint = %self.endpoint, chars = text.chars().count(), "Posting status");
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.access_token)
            .form(&form)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| Error::Publish(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Publish(format!("{status}: {}", body.trim())));
        }

        info!(visibility = %self.visibility, "Status posted");
        Ok(())
    }
}
