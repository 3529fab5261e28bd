//! Status command implementation.

use tracing::warn;

use crate::cli::workspace::Workspace;
use crate::cli::{Cli, HashtagArgs};
use crate::error::Result;
use crate::sync::{get_sync_status, print_status};
use crate::tags::TagRegistry;

/// Show the sync state and how many tagged notes are pending.
///
/// An unreadable note source is reported, not returned as an error.
///
/// # Errors
///
/// Returns an error if the config cannot be read.
pub fn execute(cli: &Cli, hashtags: &HashtagArgs, json: bool) -> Result<()> {
    let workspace = Workspace::resolve(cli)?;
    let config = workspace.load_config()?;
    let (resolver, export) = workspace.hashtag_resolver(&config, hashtags, None);
    let registry = TagRegistry::from_config(&config);

    let orchestrator = workspace.orchestrator(&config, resolver);
    let discovered = match orchestrator.discover() {
        Ok(notes) => Some(notes),
        Err(e) => {
            warn!(error = %e, "Note source unavailable");
            None
        }
    };

    let status = get_sync_status(
        orchestrator.state(),
        &workspace.config_path,
        &registry,
        export.as_deref(),
        discovered.as_deref(),
    );

    if json {
        println!("{}", serde_json::to_string(&status)?);
    } else {
        print_status(&status);
    }
    Ok(())
}
