//! Zimsync CLI - subscription-based ZIM archive synchronization.

mod commands;
mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use error::CliError;

#[derive(Parser)]
#[command(name = "zimsync", version, about = "Keep a local ZIM archive collection in sync")]
struct Cli {
    /// Config file (default: <config dir>/zimsync/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(long, global = true)]
    debug: bool,

    /// Only log errors
    #[arg(long, global = true, conflicts_with = "debug")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download new and updated archives, remove unsubscribed ones
    Update {
        /// Ask for confirmation before touching anything
        #[arg(short, long)]
        prompt: bool,

        /// Skip digest verification of downloaded files
        #[arg(long)]
        no_verify: bool,

        /// Skip the free-disk-space check before each download
        #[arg(long)]
        no_size_check: bool,

        /// Maximum concurrent downloads
        #[arg(short, long, default_value_t = 4)]
        jobs: usize,
    },

    /// Search the catalog and print matching subscription config blocks
    Search {
        /// Comma-separated language codes (e.g. "eng,fra")
        #[arg(short, long)]
        lang: Option<String>,

        /// Catalog category (e.g. "wikipedia")
        #[arg(long)]
        category: Option<String>,

        /// Free-text query
        #[arg(short, long)]
        query: Option<String>,
    },
}

fn init_logging(debug: bool, quiet: bool) {
    let default_level = if debug {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<bool, CliError> {
    let config_path = match cli.config {
        Some(path) => path,
        None => zimsync::Config::default_path()?,
    };
    let config = zimsync::Config::load(&config_path)?;

    match cli.command {
        Commands::Update {
            prompt,
            no_verify,
            no_size_check,
            jobs,
        } => commands::update::run(
            &config,
            commands::update::UpdateArgs {
                prompt,
                verify: !no_verify,
                check_size: !no_size_check,
                jobs,
                quiet: cli.quiet,
            },
        ),
        Commands::Search {
            lang,
            category,
            query,
        } => commands::search::run(&config, lang.as_deref(), category.as_deref(), query.as_deref()),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.debug, cli.quiet);

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
