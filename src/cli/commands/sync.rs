//! Sync command implementation.
//!
//! Loads the registry config (fatal if missing), optionally refreshes the
//! hashtag export, then runs the orchestrator over the note dump on a
//! current-thread runtime. Ctrl-C stops the run before the next note.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use colored::Colorize;
use tracing::{debug, warn};

use crate::cli::workspace::{runtime, Workspace};
use crate::cli::{Cli, SyncArgs};
use crate::error::Result;
use crate::extract;
use crate::publish::MastodonPublisher;
use crate::sync::{NoteOutcome, SyncOptions, SyncReport};

/// Execute the sync command.
///
/// # Errors
///
/// Returns an error if the config or note source cannot be
/// read. Per-note failures are reported, not returned.
pub fn execute(cli: &Cli, args: &SyncArgs, json: bool) -> Result<()> {
    let workspace = Workspace::resolve(cli)?;
    let config = workspace.load_config()?;
    let rt = runtime()?;

    let wants_extract = !args.no_auto_extract
        && !args.hashtags.no_hashtags_json
        && args.hashtags.hashtags_json.is_none();
    let extracted = match (&config.extractor, wants_extract) {
        (Some(extractor), true) => {
            match rt.block_on(extract::run_extractor(extractor, &workspace.site_root)) {
                Ok(path) => path,
                Err(e) => {
                    warn!(error = %e, "Hashtag extraction failed, falling back to existing exports");
                    None
                }
            }
        }
        _ => None,
    };

    let (resolver, _export) = workspace.hashtag_resolver(&config, &args.hashtags, extracted);

    let cancel = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancel);
    if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst)) {
        warn!(error = %e, "Failed to install Ctrl-C handler");
    }

    let mut orchestrator = workspace
        .orchestrator(&config, resolver)
        .with_cancel_flag(cancel);

    let publish = !args.no_publish;
    if publish {
        let publisher_config = args.publisher.to_config();
        if publisher_config.is_configured() {
            match MastodonPublisher::from_config(&publisher_config) {
                Ok(publisher) => orchestrator = orchestrator.with_publisher(publisher),
                Err(e) => warn!(error = %e, "Publishing disabled"),
            }
        } else {
            debug!("No publisher configured");
        }
    }

    let options = SyncOptions {
        force: args.force,
        publish,
        delete_original: args.delete_original,
    };
    let report = rt.block_on(orchestrator.run(&options))?;

    if json {
        println!("{}", serde_json::to_string(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &SyncReport) {
    if report.tagged == 0 {
        println!("{}", "No tagged notes found.".yellow());
        return;
    }

    for note in &report.notes {
        let handler = note.handler.as_deref().unwrap_or("default");
        match note.outcome {
            NoteOutcome::Succeeded => {
                let target = note
                    .artifact_path
                    .as_ref()
                    .map(|p| format!(" → {}", p.display()))
                    .unwrap_or_default();
                println!("  {} [{handler}] {}{}", "✓".green(), note.title, target.dimmed());
            }
            NoteOutcome::Failed => {
                println!("  {} [{handler}] {}", "✗".red(), note.title);
            }
            NoteOutcome::AlreadyProcessed | NoteOutcome::Empty => {}
        }
    }
    if report.notes.iter().any(|n| !n.outcome.is_skipped()) {
        println!();
    }

    let stats = &report.stats;
    println!("{}", "Sync complete".bold().underline());
    println!("  Succeeded:     {}", stats.success.to_string().green());
    println!("  Skipped:       {}", stats.skipped);
    if stats.failed > 0 {
        println!("  Failed:        {}", stats.failed.to_string().red());
    } else {
        println!("  Failed:        0");
    }
    println!("  Unknown tags:  {}", stats.unknown_tags);

    if stats.interrupted {
        println!();
        println!("{}", "Interrupted; remaining notes will be synced next run.".yellow().bold());
    }
    if !report.state_saved {
        println!("{}", "Warning: sync state could not be saved.".yellow());
    }
}
