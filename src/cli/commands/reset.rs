//! Reset command implementation.

use colored::Colorize;
use serde::Serialize;

use crate::cli::workspace::Workspace;
use crate::cli::Cli;
use crate::error::Result;
use crate::sync::StateStore;

#[derive(Serialize)]
struct ResetOutput {
    reset: bool,
    cleared: usize,
    state_file: String,
}

/// Clear the processed set and delete the state file.
///
/// # Errors
///
/// Returns a state error if the file exists but cannot be removed.
pub fn execute(cli: &Cli, json: bool) -> Result<()> {
    let workspace = Workspace::resolve(cli)?;
    let mut state = StateStore::load(&workspace.state_path);
    let cleared = state.len();
    state.reset()?;

    if json {
        let output = ResetOutput {
            reset: true,
            cleared,
            state_file: workspace.state_path.display().to_string(),
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("{} ({cleared} notes forgotten)", "Sync state reset".green());
    }
    Ok(())
}
