//! Tags command implementation.

use colored::Colorize;
use serde::Serialize;

use crate::cli::workspace::Workspace;
use crate::cli::Cli;
use crate::error::Result;
use crate::handler::CallingConvention;
use crate::tags::TagRegistry;

#[derive(Serialize)]
struct TagOutput<'a> {
    tag: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    description: &'a str,
    aliases: &'a [String],
    convention: CallingConvention,
    priority: Option<usize>,
}

#[derive(Serialize)]
struct TagsOutput<'a> {
    tags: Vec<TagOutput<'a>>,
    default_handler: Option<&'a str>,
}

/// List registered tags.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded.
pub fn execute(cli: &Cli, json: bool) -> Result<()> {
    let workspace = Workspace::resolve(cli)?;
    let registry = TagRegistry::from_config(&workspace.load_config()?);

    let tags: Vec<TagOutput<'_>> = registry
        .entries()
        .iter()
        .map(|e| TagOutput {
            tag: &e.tag,
            kind: &e.descriptor.kind,
            description: &e.descriptor.description,
            aliases: &e.descriptor.aliases,
            convention: e.descriptor.convention,
            priority: registry.priority_order().iter().position(|p| p == &e.tag),
        })
        .collect();

    if json {
        let output = TagsOutput {
            tags,
            default_handler: registry.default_description(),
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!("{}", "Supported tags".bold().underline());
    println!();
    if tags.is_empty() {
        println!("{}", "No handlers registered.".dimmed());
    }
    for tag in &tags {
        let aliases = if tag.aliases.is_empty() {
            "none".to_string()
        } else {
            tag.aliases.join(", ")
        };
        println!("  {:<14} {:<10} {}", tag.tag.cyan(), tag.kind.magenta(), tag.description);
        println!("  {:<14} {}", "", format!("aliases: {aliases}").dimmed());
    }

    if let Some(description) = registry.default_description() {
        println!();
        println!("{} {description}", "Default handler:".yellow().bold());
    }
    Ok(())
}
