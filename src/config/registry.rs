//! Registry configuration file.
//!
//! The registry config maps tag names to handler descriptors and carries the
//! processing options. It is read once at startup; any read or parse failure
//! is fatal because no routing decision can be made without it.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};

/// Top-level registry configuration (`multi_tag_config.json`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Tag name → handler, in registration order
    #[serde(default)]
    pub tag_handlers: IndexMap<String, HandlerConfig>,

    #[serde(default)]
    pub processing_options: ProcessingOptions,

    /// Informational only; routing to the default handler is built in.
    #[serde(default)]
    pub default_handler: Option<DefaultHandlerInfo>,

    /// Optional hashtag export extractor
    #[serde(default)]
    pub extractor: Option<ExtractorConfig>,
}

/// One handler entry under `tag_handlers`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandlerConfig {
    /// Category label, e.g. "thought" or "article"
    #[serde(rename = "type")]
    pub kind: String,

    /// Program to run, relative to the site root unless absolute
    #[serde(alias = "script")]
    pub invocation_target: PathBuf,

    #[serde(default)]
    pub target_path: Option<String>,

    #[serde(default)]
    pub target_file: Option<String>,

    #[serde(default)]
    pub template: Option<String>,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub aliases: Vec<String>,

    /// Overrides the calling convention derived from `type`.
    #[serde(default)]
    pub calling_convention: Option<CallingConventionConfig>,
}

/// Explicit calling convention override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallingConventionConfig {
    ContentArgs,
    TitleStdin,
}

/// `processing_options` block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingOptions {
    #[serde(default)]
    pub priority_order: Vec<String>,

    #[serde(default)]
    pub content_processing: ContentProcessing,

    /// Handler types that take `(content, timestamp)` arguments and are
    /// published as full text.
    #[serde(default = "default_conversational_types")]
    pub conversational_types: Vec<String>,

    #[serde(default = "default_draft_tag")]
    pub draft_tag: String,

    #[serde(default = "default_publish_tag")]
    pub publish_tag: String,

    #[serde(default = "default_handler_timeout")]
    pub handler_timeout_secs: u64,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            priority_order: Vec::new(),
            content_processing: ContentProcessing::default(),
            conversational_types: default_conversational_types(),
            draft_tag: default_draft_tag(),
            publish_tag: default_publish_tag(),
            handler_timeout_secs: default_handler_timeout(),
        }
    }
}

/// `processing_options.content_processing` block.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ContentProcessing {
    #[serde(default = "default_true")]
    pub remove_tags: bool,

    #[serde(default = "default_true")]
    pub clean_whitespace: bool,
}

impl Default for ContentProcessing {
    fn default() -> Self {
        Self {
            remove_tags: true,
            clean_whitespace: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultHandlerInfo {
    #[serde(default)]
    pub description: String,
}

/// External hashtag export extractor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Program and arguments
    pub command: Vec<String>,

    #[serde(default)]
    pub working_dir: Option<PathBuf>,

    /// Directory scanned for `all_notes_*.json` after the run
    pub output_dir: PathBuf,

    #[serde(default = "default_extractor_timeout")]
    pub timeout_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_conversational_types() -> Vec<String> {
    vec!["thought".to_string()]
}

fn default_draft_tag() -> String {
    "#draft".to_string()
}

fn default_publish_tag() -> String {
    "#cmx".to_string()
}

fn default_handler_timeout() -> u64 {
    120
}

fn default_extractor_timeout() -> u64 {
    300
}

impl RegistryConfig {
    /// Load and parse the registry config.
    ///
    /// # Errors
    ///
    /// Returns `ConfigNotFound` if the file does not exist and `Config` if it
    /// cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                Error::ConfigNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                Error::Config(format!("Failed to read {}: {e}", path.display()))
            }
        })?;

        let config = Self::parse(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {e}", path.display())))?;

        info!(
            path = %path.display(),
            handlers = config.tag_handlers.len(),
            "Registry config loaded"
        );
        Ok(config)
    }

    /// Parse registry config from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns the underlying JSON error on malformed input.
    pub fn parse(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }
}
