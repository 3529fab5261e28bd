//! Handler dispatch.
//!
//! Runs the external program registered for a note's primary tag, or the
//! built-in default article handler when the tag is unknown. Failures are
//! reported through `DispatchOutcome`, never as errors: a failed note is
//! counted by the orchestrator and retried on the next run.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, error, info, warn};

use super::default_article::write_article;
use super::descriptor::{CallingConvention, HandlerDescriptor};
use super::output::extract_artifact_path;
use crate::error::{Error, Result};
use crate::model::TaggedNote;

/// Result of dispatching one note.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchOutcome {
    pub success: bool,
    /// Generated file, relative to the site root
    pub artifact_path: Option<PathBuf>,
    /// The built-in default handler ran
    pub used_default: bool,
}

impl DispatchOutcome {
    fn failed(used_default: bool) -> Self {
        Self {
            success: false,
            artifact_path: None,
            used_default,
        }
    }
}

/// Invokes handlers for cleaned notes.
#[derive(Debug, Clone)]
pub struct HandlerDispatcher {
    site_root: PathBuf,
    timeout: Duration,
    draft_tag: String,
}

impl HandlerDispatcher {
    pub fn new(site_root: impl Into<PathBuf>, timeout: Duration, draft_tag: impl Into<String>) -> Self {
        Self {
            site_root: site_root.into(),
            timeout,
            draft_tag: draft_tag.into(),
        }
    }

    #[must_use]
    pub fn site_root(&self) -> &Path {
        &self.site_root
    }

    /// Dispatch `content` for `note` to `descriptor`, or to the default
    /// handler when `descriptor` is `None`.
    pub async fn dispatch(
        &self,
        descriptor: Option<&HandlerDescriptor>,
        content: &str,
        note: &TaggedNote,
    ) -> DispatchOutcome {
        let Some(descriptor) = descriptor else {
            return match write_article(&self.site_root, content, note, &self.draft_tag) {
                Ok(path) => DispatchOutcome {
                    success: true,
                    artifact_path: Some(path),
                    used_default: true,
                },
                Err(e) => {
                    error!(note = %note.id(), error = %e, "Default handler failed");
                    DispatchOutcome::failed(true)
                }
            };
        };

        match tokio::time::timeout(self.timeout, self.run_external(descriptor, content, note)).await {
            Ok(Ok(artifact_path)) => {
                info!(kind = %descriptor.kind, title = %truncate(note.title(), 50), "Handler succeeded");
                DispatchOutcome {
                    success: true,
                    artifact_path,
                    used_default: false,
                }
            }
            Ok(Err(e)) => {
                error!(kind = %descriptor.kind, note = %note.id(), error = %e, "Handler failed");
                DispatchOutcome::failed(false)
            }
            Err(_elapsed) => {
                warn!(
                    kind = %descriptor.kind,
                    note = %note.id(),
                    timeout_secs = self.timeout.as_secs(),
                    "Handler timed out"
                );
                DispatchOutcome::failed(false)
            }
        }
    }

    fn resolve_target(&self, target: &Path) -> PathBuf {
        if target.is_absolute() {
            target.to_path_buf()
        } else {
            self.site_root.join(target)
        }
    }

    /// Spawn the handler and wait for it. The child is killed if this
    /// future is dropped (timeout or interrupt).
    async fn run_external(
        &self,
        descriptor: &HandlerDescriptor,
        content: &str,
        note: &TaggedNote,
    ) -> Result<Option<PathBuf>> {
        let program = self.resolve_target(&descriptor.invocation_target);
        if !program.exists() {
            return Err(Error::Handler(format!(
                "handler program not found: {}",
                program.display()
            )));
        }

        let mut cmd = Command::new(&program);
        cmd.current_dir(&self.site_root)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let stdin_payload = match descriptor.convention {
            CallingConvention::ContentArgs => {
                cmd.arg(content);
                if let Some(date) = note.note.effective_date() {
                    cmd.arg(date.format("%Y-%m-%d %H:%M").to_string());
                }
                cmd.stdin(Stdio::null());
                None
            }
            CallingConvention::TitleStdin => {
                cmd.arg(note.title());
                cmd.stdin(Stdio::piped());
                Some(content.as_bytes())
            }
        };

        debug!(program = %program.display(), convention = ?descriptor.convention, "Spawning handler");
        let mut child = cmd
            .spawn()
            .map_err(|e| Error::Handler(format!("failed to spawn {}: {e}", program.display())))?;

        let stdin = child.stdin.take();
        let feed = async move {
            if let (Some(mut pipe), Some(bytes)) = (stdin, stdin_payload) {
                pipe.write_all(bytes).await?;
                pipe.shutdown().await?;
            }
            Ok::<(), std::io::Error>(())
        };

        let (fed, output) = tokio::join!(feed, child.wait_with_output());
        if let Err(e) = fed {
            debug!(error = %e, "Handler did not consume stdin");
        }
        let output = output?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Handler(format!(
                "{} exited with {}: {}",
                descriptor.kind,
                output.status,
                stderr.trim()
            )));
        }

        Ok(extract_artifact_path(&stdout))
    }
}

/// First `max` characters of `s`.
pub(crate) fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
