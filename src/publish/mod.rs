//! Publishing finished content.
//!
//! After a note has been turned into a site artifact it may also be
//! announced as a status post. The [`Publisher`] trait is the seam; the
//! shipped implementation talks to a Mastodon-compatible instance.

mod mastodon;
mod site;
mod text;

pub use mastodon::{instance_origin, MastodonPublisher};
pub use site::{artifact_url, read_site_base_url};
pub use text::{article_status_text, conversational_status_text, EXCERPT_CHARS, MAX_STATUS_CHARS};

use crate::error::Result;

/// Sink for finished status text.
pub trait Publisher: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> String;

    /// Post `text`.
    fn publish(&self, text: &str) -> impl std::future::Future<Output = Result<()>> + Send;
}
