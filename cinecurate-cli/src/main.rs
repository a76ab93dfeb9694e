//! # cinecurate
//!
//! Builds Plex movie collections from typed titles, TMDB franchises and
//! studios, or Letterboxd lists.
//!
//! Running without a subcommand opens the interactive menu. `check` reports
//! which credentials are loaded and whether the library is reachable;
//! `reconcile` runs a single pass over a file of titles.

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use cinecurate_cli::present::status_lines;
use cinecurate_cli::{Backend, LiveBackend, Session, TerminalPrompter};
use cinecurate_config::loader::DEFAULT_CONFIG_FILE;
use cinecurate_config::{Config, ConfigLoader};
use cinecurate_core::PlexLibrary;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "cinecurate")]
#[command(about = "Build curated movie collections in your Plex library")]
struct Cli {
    /// Path to the TOML config file. Credential changes are saved here.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Show what would be searched without touching Plex.
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open the interactive menu (the default).
    Menu,
    /// Print credential status and try to reach Plex.
    Check,
    /// Match a file of titles (one per line) and create a collection.
    Reconcile {
        #[arg(long)]
        titles_file: PathBuf,
        #[arg(long)]
        collection: String,
        /// Create the collection without asking.
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let loaded = ConfigLoader::new(&cli.config)
        .load()
        .with_context(|| {
            format!("failed to load configuration from {}", cli.config.display())
        })?;
    let config = Config {
        dry_run: loaded.dry_run || cli.dry_run,
        ..loaded
    };
    debug!(
        "Config loaded (file: {}, env overrides: {:?})",
        config.metadata.file_loaded, config.metadata.env_overrides
    );

    match cli.command.unwrap_or(Command::Menu) {
        Command::Menu => {
            let mut session = Session::new(
                TerminalPrompter::default(),
                LiveBackend,
                config,
                cli.config,
            )?;
            session.run().await
        }
        Command::Check => check(&config).await,
        Command::Reconcile {
            titles_file,
            collection,
            yes,
        } => {
            let titles = read_titles(&titles_file)?;
            info!(
                "Reconciling {} titles from {}",
                titles.len(),
                titles_file.display()
            );
            let mut session = Session::new(
                TerminalPrompter::default(),
                LiveBackend,
                config,
                cli.config,
            )?;
            session.run_batch(&collection, titles, yes).await?;
            Ok(())
        }
    }
}

async fn check(config: &Config) -> anyhow::Result<()> {
    for line in status_lines(config.credential_status()) {
        println!("{line}");
    }

    if !config.plex.is_configured() {
        bail!("Missing or invalid Plex Token or URL.");
    }

    let library = PlexLibrary::connect(config)
        .await
        .context("could not connect to Plex")?;
    println!(
        "Connected to Plex section '{}' (server {}).",
        library.section().title,
        library.machine_identifier()
    );

    match LiveBackend.metadata_catalog(config)? {
        Some(_) => println!("TMDb client ready."),
        None => println!("No TMDb API key; fallback lists will be used."),
    }
    Ok(())
}

fn read_titles(path: &Path) -> anyhow::Result<Vec<String>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}
