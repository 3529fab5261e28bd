//! CLI definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::{PublisherConfig, DEFAULT_PUBLISH_TIMEOUT};

pub mod commands;
pub mod workspace;

/// tagsync - Route tagged notes to content handlers, exactly once
///
/// Without a subcommand, runs `sync`.
#[derive(Parser, Debug)]
#[command(name = "tagsync", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Options for the implicit `sync`
    #[command(flatten)]
    pub sync: SyncArgs,

    /// Registry config (default: ./multi_tag_config.json, then ~/.tagsync/)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Sync state file (default: ./multi_tag_sync_state.json)
    #[arg(long, global = true, value_name = "PATH")]
    pub state: Option<PathBuf>,

    /// Note dump to read (default: ./notes.json)
    #[arg(long, global = true, value_name = "PATH")]
    pub notes: Option<PathBuf>,

    /// Site root handlers run in (default: current directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub site_root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Route new tagged notes to their handlers (default)
    Sync(SyncArgs),

    /// List tagged notes with their handler and state
    List {
        #[command(flatten)]
        hashtags: HashtagArgs,
    },

    /// List registered tags and aliases
    Tags,

    /// Show sync state and pending notes
    Status {
        #[command(flatten)]
        hashtags: HashtagArgs,
    },

    /// Forget all processed notes
    Reset,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Print version information
    Version,
}

/// Supported shells for completions.
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

/// Where note hashtags come from.
#[derive(Args, Debug, Clone, Default)]
pub struct HashtagArgs {
    /// Hashtag export (all_notes_*.json) to read tags from
    #[arg(long, value_name = "PATH", conflicts_with = "no_hashtags_json")]
    pub hashtags_json: Option<PathBuf>,

    /// Ignore hashtag exports and read tags from note metadata
    #[arg(long)]
    pub no_hashtags_json: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct SyncArgs {
    /// Reprocess notes that were already synced
    #[arg(long)]
    pub force: bool,

    /// Do not publish, even for notes carrying the publish tag
    #[arg(long, alias = "no-mastodon")]
    pub no_publish: bool,

    #[command(flatten)]
    pub hashtags: HashtagArgs,

    /// Do not run the configured hashtag extractor first
    #[arg(long)]
    pub no_auto_extract: bool,

    /// Delete notes from the source after they are synced
    #[arg(long)]
    pub delete_original: bool,

    #[command(flatten)]
    pub publisher: PublisherArgs,
}

/// Mastodon-compatible publisher settings.
#[derive(Args, Debug, Clone, Default)]
pub struct PublisherArgs {
    /// Instance URL
    #[arg(long, env = "MASTODON_BASE_URL", value_name = "URL")]
    pub mastodon_base_url: Option<String>,

    /// Access token
    #[arg(long, env = "MASTODON_ACCESS_TOKEN", hide_env_values = true, value_name = "TOKEN")]
    pub mastodon_access_token: Option<String>,

    /// Status visibility (public, unlisted, private, direct)
    #[arg(long, env = "MASTODON_VISIBILITY", value_name = "VISIBILITY")]
    pub mastodon_visibility: Option<String>,

    /// Status language
    #[arg(long, value_name = "LANG")]
    pub mastodon_language: Option<String>,
}

impl PublisherArgs {
    /// Collect the settings into an explicit config.
    #[must_use]
    pub fn to_config(&self) -> PublisherConfig {
        let defaults = PublisherConfig::default();
        PublisherConfig {
            base_url: self.mastodon_base_url.clone(),
            access_token: self.mastodon_access_token.clone(),
            visibility: self
                .mastodon_visibility
                .clone()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.visibility),
            language: self.mastodon_language.clone().or(defaults.language),
            timeout: DEFAULT_PUBLISH_TIMEOUT,
        }
    }
}
