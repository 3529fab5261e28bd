//! Error types for the tagsync CLI.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (3=source, 4=validation, 6=dispatch, 7=config, ...)
//! - Context-aware recovery hints
//! - Structured JSON output for piped / non-TTY consumers
//!
//! Per-note failures inside a sync run never surface here: the orchestrator
//! counts them and moves on. These errors are for whole-run conditions.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for tagsync operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Note source (exit 3)
    SourceNotFound,
    SourceError,

    // Validation (exit 4)
    InvalidArgument,

    // Dispatch (exit 6)
    HandlerError,
    PublishError,

    // Config (exit 7)
    ConfigNotFound,
    ConfigError,

    // I/O (exit 8)
    StateError,
    IoError,
    JsonError,

    // Internal (exit 1)
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::SourceNotFound => "SOURCE_NOT_FOUND",
            Self::SourceError => "SOURCE_ERROR",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::HandlerError => "HANDLER_ERROR",
            Self::PublishError => "PUBLISH_ERROR",
            Self::ConfigNotFound => "CONFIG_NOT_FOUND",
            Self::ConfigError => "CONFIG_ERROR",
            Self::StateError => "STATE_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Category-based exit code.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InternalError => 1,
            Self::SourceNotFound | Self::SourceError => 3,
            Self::InvalidArgument => 4,
            Self::HandlerError | Self::PublishError => 6,
            Self::ConfigNotFound | Self::ConfigError => 7,
            Self::StateError | Self::IoError | Self::JsonError => 8,
        }
    }

    /// Whether rerunning with corrected input is likely to help.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument | Self::HandlerError | Self::PublishError | Self::SourceError
        )
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in tagsync operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Registry config not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Note source not found: {path}")]
    SourceNotFound { path: PathBuf },

    #[error("Note source error: {0}")]
    Source(String),

    #[error("State file error: {0}")]
    State(String),

    #[error("Handler error: {0}")]
    Handler(String),

    #[error("Publish error: {0}")]
    Publish(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::ConfigNotFound { .. } => ErrorCode::ConfigNotFound,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::SourceNotFound { .. } => ErrorCode::SourceNotFound,
            Self::Source(_) => ErrorCode::SourceError,
            Self::State(_) => ErrorCode::StateError,
            Self::Handler(_) => ErrorCode::HandlerError,
            Self::Publish(_) => ErrorCode::PublishError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::ConfigNotFound { path } => Some(format!(
                "Create {} with a `tag_handlers` map, or pass --config <path>.",
                path.display()
            )),
            Self::SourceNotFound { path } => Some(format!(
                "Export your notes to {} first, or pass --notes <path>.",
                path.display()
            )),
            Self::Publish(_) => Some(
                "Check MASTODON_BASE_URL and MASTODON_ACCESS_TOKEN, or sync with --no-publish."
                    .to_string(),
            ),
            Self::State(_) => Some("Run `tagsync reset` to start from an empty state.".to_string()),
            Self::Config(_)
            | Self::Source(_)
            | Self::Handler(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::InvalidArgument(_)
            | Self::Other(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_share_exit_code() {
        let missing = Error::ConfigNotFound {
            path: PathBuf::from("multi_tag_config.json"),
        };
        let broken = Error::Config("bad json".into());
        assert_eq!(missing.exit_code(), 7);
        assert_eq!(broken.exit_code(), 7);
    }

    #[test]
    fn test_structured_json_includes_hint() {
        let err = Error::ConfigNotFound {
            path: PathBuf::from("cfg.json"),
        };
        let json = err.to_structured_json();
        assert_eq!(json["error"]["code"], "CONFIG_NOT_FOUND");
        assert!(json["error"]["hint"].as_str().unwrap().contains("cfg.json"));
        assert_eq!(json["error"]["retryable"], false);
    }

    #[test]
    fn test_structured_json_without_hint() {
        let err = Error::Other("boom".into());
        let json = err.to_structured_json();
        assert_eq!(json["error"]["exit_code"], 1);
        assert!(json["error"].get("hint").is_none());
    }
}
