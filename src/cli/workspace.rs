//! Paths and shared setup for commands.

use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, info};

use super::{Cli, HashtagArgs};
use crate::config::{resolve_config_path, resolve_notes_path, resolve_state_path, RegistryConfig};
use crate::error::{Error, Result};
use crate::extract;
use crate::handler::HandlerDispatcher;
use crate::publish::MastodonPublisher;
use crate::source::JsonFileSource;
use crate::sync::{StateStore, SyncOrchestrator};
use crate::tags::{HashtagResolver, TagRegistry};

/// Orchestrator over the JSON note dump.
pub type DumpOrchestrator = SyncOrchestrator<JsonFileSource, MastodonPublisher>;

/// Files a command works with.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub site_root: PathBuf,
    pub config_path: PathBuf,
    pub state_path: PathBuf,
    pub notes_path: PathBuf,
}

impl Workspace {
    /// Resolve paths from global flags, the environment and defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be determined or the
    /// site root does not exist.
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let site_root = match &cli.site_root {
            Some(dir) => std::path::absolute(dir)?,
            None => std::env::current_dir()
                .map_err(|e| Error::Other(format!("Failed to get current directory: {e}")))?,
        };
        if !site_root.is_dir() {
            return Err(Error::InvalidArgument(format!(
                "site root is not a directory: {}",
                site_root.display()
            )));
        }

        let workspace = Self {
            config_path: resolve_config_path(cli.config.as_deref(), &site_root),
            state_path: resolve_state_path(cli.state.as_deref(), &site_root),
            notes_path: resolve_notes_path(cli.notes.as_deref(), &site_root),
            site_root,
        };
        debug!(?workspace, "Workspace resolved");
        Ok(workspace)
    }

    /// Load the registry config.
    ///
    /// # Errors
    ///
    /// Returns `ConfigNotFound` or `Config` from [`RegistryConfig::load`].
    pub fn load_config(&self) -> Result<RegistryConfig> {
        RegistryConfig::load(&self.config_path)
    }

    /// Pick the hashtag source.
    ///
    /// Priority: disabled by flag, explicit export, a freshly extracted
    /// export, the newest export in the extractor's output directory, then
    /// note metadata.
    ///
    /// An export that turns out to be unusable falls back to metadata, and
    /// the returned path is `None`.
    #[must_use]
    pub fn hashtag_resolver(
        &self,
        config: &RegistryConfig,
        args: &HashtagArgs,
        extracted: Option<PathBuf>,
    ) -> (HashtagResolver, Option<PathBuf>) {
        if args.no_hashtags_json {
            info!("Hashtag export disabled, using note metadata");
            return (HashtagResolver::metadata_only(), None);
        }

        let export = args
            .hashtags_json
            .clone()
            .or(extracted)
            .or_else(|| {
                config
                    .extractor
                    .as_ref()
                    .and_then(|e| extract::newest_export(&extract::output_dir(e, &self.site_root)))
            });

        match export {
            Some(path) => {
                let resolver = HashtagResolver::from_export(&path);
                let used = resolver.uses_export().then_some(path);
                (resolver, used)
            }
            None => {
                debug!("No hashtag export, using note metadata");
                (HashtagResolver::metadata_only(), None)
            }
        }
    }

    /// Wire an orchestrator over the note dump, loading the state file.
    #[must_use]
    pub fn orchestrator(&self, config: &RegistryConfig, resolver: HashtagResolver) -> DumpOrchestrator {
        let processing = &config.processing_options;
        let dispatcher = HandlerDispatcher::new(
            &self.site_root,
            Duration::from_secs(processing.handler_timeout_secs),
            processing.draft_tag.clone(),
        );
        SyncOrchestrator::new(
            JsonFileSource::new(&self.notes_path),
            resolver,
            TagRegistry::from_config(config),
            processing,
            dispatcher,
            StateStore::load(&self.state_path),
        )
    }
}

/// Build the runtime async commands block on.
///
/// # Errors
///
/// Returns an error if the runtime cannot be created.
pub fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::Other(format!("Failed to create async runtime: {e}")))
}
