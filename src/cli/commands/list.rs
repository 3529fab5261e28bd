//! List command implementation.

use colored::Colorize;
use indexmap::IndexMap;
use serde::Serialize;

use crate::cli::workspace::Workspace;
use crate::cli::{Cli, HashtagArgs};
use crate::error::Result;
use crate::handler::truncate;
use crate::sync::DiscoveredNote;

#[derive(Serialize)]
struct ListOutput<'a> {
    count: usize,
    notes: &'a [DiscoveredNote],
}

/// List tagged notes grouped by handler type.
///
/// # Errors
///
/// Returns an error if the config or note source cannot be
/// read.
pub fn execute(cli: &Cli, hashtags: &HashtagArgs, json: bool) -> Result<()> {
    let workspace = Workspace::resolve(cli)?;
    let config = workspace.load_config()?;
    let (resolver, _export) = workspace.hashtag_resolver(&config, hashtags, None);
    let notes = workspace.orchestrator(&config, resolver).discover()?;

    if json {
        let output = ListOutput {
            count: notes.len(),
            notes: &notes,
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    if notes.is_empty() {
        println!("{}", "No tagged notes found.".yellow());
        return Ok(());
    }

    let mut groups: IndexMap<&str, Vec<&DiscoveredNote>> = IndexMap::new();
    for note in &notes {
        groups
            .entry(note.handler.as_deref().unwrap_or("default"))
            .or_default()
            .push(note);
    }

    println!("{}", format!("{} tagged notes", notes.len()).bold().underline());
    for (kind, group) in &groups {
        println!();
        println!("{}", format!("{} ({})", kind.to_uppercase(), group.len()).blue().bold());
        for note in group {
            let status = if note.processed {
                "processed".green()
            } else {
                "pending".yellow()
            };
            let title = if note.title.chars().count() > 40 {
                format!("{}...", truncate(&note.title, 40))
            } else {
                note.title.clone()
            };
            let modified = note
                .modified
                .map_or_else(|| "unknown".to_string(), |d| d.format("%Y-%m-%d %H:%M").to_string());
            println!(
                "  {:<9} {}  {}  {}",
                status,
                title,
                note.tags.join(", ").magenta(),
                modified.dimmed()
            );
        }
    }
    Ok(())
}
