//! Integrity Hash CLI
//!
//! Command-line front end for computing erasure-coded integrity digests.
//!
//! # Commands
//! - `hash` - Hash a file, or standard input with `-`
//! - `config` - Show or initialize configuration
//!
//! # Configuration
//! Config file: ~/.integrity-hash/config.toml
//! Flags override the config file, which overrides INTEGRITY_* environment
//! variables, which override built-in defaults.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod symbols;

use commands::config::ConfigAction;
use commands::hash::HashCommandConfig;
use integrity_core::Strategy;

#[derive(Parser)]
#[command(name = "integrity-hash")]
#[command(about = "Erasure-coded integrity digest calculator")]
#[command(version)]
struct Cli {
    /// Path to config file (defaults to ~/.integrity-hash/config.toml)
    #[arg(long, global = true, env = "INTEGRITY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the integrity hash of a file or stdin
    Hash {
        /// Path to file, or `-` for stdin
        path: String,

        /// Segment size in bytes
        #[arg(short, long)]
        segment_size: Option<usize>,

        /// Number of data shards per segment
        #[arg(short, long)]
        data_shards: Option<usize>,

        /// Number of parity shards per segment
        #[arg(short, long)]
        parity_shards: Option<usize>,

        /// Hash on a single thread
        #[arg(long)]
        serial: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show or initialize configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Show config file path
    Path,

    /// Initialize config file with defaults
    Init {
        /// Overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Hash {
            path,
            segment_size,
            data_shards,
            parity_shards,
            serial,
            json,
        } => {
            let mut cfg = config::load_config(cli.config.as_deref())?;

            // CLI args override config file
            if let Some(size) = segment_size {
                cfg.segment.size = size;
            }
            if let Some(data) = data_shards {
                cfg.erasure.data_shards = data;
            }
            if let Some(parity) = parity_shards {
                cfg.erasure.parity_shards = parity;
            }
            let strategy = if serial {
                Strategy::Serial
            } else {
                cfg.segment.strategy
            };

            let config = HashCommandConfig {
                path,
                hash_config: cfg.hash_config()?,
                strategy,
                json,
            };
            commands::hash::run(config)?;
        }

        Commands::Config { command } => {
            let action = match command {
                None | Some(ConfigCommands::Show) => ConfigAction::Show,
                Some(ConfigCommands::Path) => ConfigAction::Path,
                Some(ConfigCommands::Init { force }) => ConfigAction::Init { force },
            };
            commands::config::run(action, cli.config)?;
        }
    }

    Ok(())
}
