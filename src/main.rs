//! tagsync CLI entry point.

use clap::Parser;
use std::process::ExitCode;
use tagsync::cli::commands;
use tagsync::cli::{Cli, Commands};
use tagsync::error::Error;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    init_tracing(cli.verbose, cli.quiet);

    // Resolve effective JSON mode: --json OR non-TTY stdout
    let json = cli.json || !std::io::IsTerminal::is_terminal(&std::io::stdout());

    match run(&cli, json) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if json {
                eprintln!("{}", e.to_structured_json());
            } else if !cli.quiet {
                if let Some(hint) = e.hint() {
                    eprintln!("Error: {e}\n  Hint: {hint}");
                } else {
                    eprintln!("Error: {e}");
                }
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    if quiet {
        return;
    }

    // Honor RUST_LOG if set, otherwise use verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug,reqwest=info,hyper=info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(cli: &Cli, json: bool) -> Result<(), Error> {
    match &cli.command {
        None => commands::sync::execute(cli, &cli.sync, json),
        Some(Commands::Sync(args)) => commands::sync::execute(cli, args, json),
        Some(Commands::List { hashtags }) => commands::list::execute(cli, hashtags, json),
        Some(Commands::Tags) => commands::tags::execute(cli, json),
        Some(Commands::Status { hashtags }) => commands::status::execute(cli, hashtags, json),
        Some(Commands::Reset) => commands::reset::execute(cli, json),
        Some(Commands::Completions { shell }) => commands::completions::execute(*shell),
        Some(Commands::Version) => commands::version::execute(json),
    }
}
