//! t4g-feed CLI
//!
//! Serves Tickets For Good listings as RSS, or fetches a single feed.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use t4g_feed::{error::Result, models::Config, pipeline};

/// t4g-feed - Tickets For Good RSS feeds
#[derive(Parser, Debug)]
#[command(name = "t4g-feed", version, about = "Tickets For Good events as RSS feeds")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve feeds over HTTP
    Serve {
        /// Address to listen on (overrides server.bind)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Refresh one feed and print it as RSS
    Fetch {
        /// Location to filter by (default: all locations)
        #[arg(short, long)]
        location: Option<String>,

        /// Listing pages to fetch (overrides feed.page_count)
        #[arg(long)]
        pages: Option<u32>,
    },

    /// Validate the configuration file
    Validate,
}

/// Level used when the configuration file could not be loaded.
const DEFAULT_LOG_LEVEL: &str = "info";

/// Initialize logging from the verbosity flag or the configured level.
/// `RUST_LOG` overrides both.
fn init_logging(verbose: bool, level: &str) {
    let level = if verbose { "debug" } else { level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Fall back to defaults when the file could not be loaded.
fn config_or_default(loaded: Result<Config>, path: &Path) -> Config {
    match loaded {
        Ok(config) => {
            log::info!("Loaded configuration from {}", path.display());
            config
        }
        Err(e) => {
            log::warn!(
                "Config load failed from {}: {}. Using defaults.",
                path.display(),
                e
            );
            Config::default()
        }
    }
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Read the file before the logger exists, report the outcome after
    let loaded = Config::load(&cli.config);
    init_logging(
        cli.verbose,
        loaded
            .as_ref()
            .map_or(DEFAULT_LOG_LEVEL, |config| config.logging.level.as_str()),
    );

    match cli.command {
        Command::Serve { bind } => {
            let mut config = config_or_default(loaded, &cli.config);
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            pipeline::run_server(&config).await?;
        }

        Command::Fetch { location, pages } => {
            let mut config = config_or_default(loaded, &cli.config);
            if let Some(pages) = pages {
                config.feed.page_count = pages;
            }
            let rss = pipeline::run_fetch(&config, location.as_deref()).await?;
            println!("{rss}");
        }

        // Strict: a broken file must not validate as the defaults
        Command::Validate => pipeline::run_validate(&cli.config)?,
    }

    Ok(())
}
