//! Handler descriptors.
//!
//! A descriptor names an external program and the calling convention it
//! expects. The convention is part of the handler type's contract:
//!
//! - `ContentArgs`: `program <content> [<YYYY-MM-DD HH:MM>]`
//! - `TitleStdin`: `program <title>` with the cleaned body on stdin

use std::path::PathBuf;

use serde::Serialize;

use crate::config::{CallingConventionConfig, HandlerConfig};
use crate::model::normalize_tags;

/// How a handler receives the note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CallingConvention {
    /// Content and formatted timestamp as positional arguments
    ContentArgs,
    /// Title as argument, cleaned body on stdin
    TitleStdin,
}

impl CallingConvention {
    /// Whether this handler type is conversational (posted in full).
    #[must_use]
    pub const fn is_conversational(self) -> bool {
        matches!(self, Self::ContentArgs)
    }
}

impl From<CallingConventionConfig> for CallingConvention {
    fn from(value: CallingConventionConfig) -> Self {
        match value {
            CallingConventionConfig::ContentArgs => Self::ContentArgs,
            CallingConventionConfig::TitleStdin => Self::TitleStdin,
        }
    }
}

/// A registered handler, immutable for the run.
#[derive(Debug, Clone, Serialize)]
pub struct HandlerDescriptor {
    /// Category label, e.g. "thought"
    pub kind: String,
    pub invocation_target: PathBuf,
    pub target_path: Option<String>,
    pub target_file: Option<String>,
    pub template: Option<String>,
    pub description: String,
    /// Normalized alias tags
    pub aliases: Vec<String>,
    pub convention: CallingConvention,
}

impl HandlerDescriptor {
    /// Build a descriptor from its config entry.
    ///
    /// Types listed in `conversational_types` use `ContentArgs`; everything
    /// else uses `TitleStdin`, unless the entry overrides it.
    #[must_use]
    pub fn from_config(config: &HandlerConfig, conversational_types: &[String]) -> Self {
        let convention = config.calling_convention.map_or_else(
            || {
                if conversational_types
                    .iter()
                    .any(|t| t.eq_ignore_ascii_case(&config.kind))
                {
                    CallingConvention::ContentArgs
                } else {
                    CallingConvention::TitleStdin
                }
            },
            CallingConvention::from,
        );

        Self {
            kind: config.kind.clone(),
            invocation_target: config.invocation_target.clone(),
            target_path: config.target_path.clone(),
            target_file: config.target_file.clone(),
            template: config.template.clone(),
            description: config.description.clone(),
            aliases: normalize_tags(&config.aliases),
            convention,
        }
    }
}
