//! Config Command
//!
//! Shows, locates and initializes the configuration file.

use crate::config::{self, IntegrityConfig};
use crate::symbols;
use anyhow::Result;
use console::style;
use std::path::PathBuf;

/// Config subcommand to run
pub enum ConfigAction {
    Show,
    Path,
    Init { force: bool },
}

/// Run config command against `path`, or the default location
pub fn run(action: ConfigAction, path: Option<PathBuf>) -> Result<()> {
    let path = match path {
        Some(path) => path,
        None => config::config_file_path()?,
    };

    match action {
        ConfigAction::Show => {
            let cfg = if path.exists() {
                config::load_config(Some(&path))?
            } else {
                IntegrityConfig::default()
            };
            show(&cfg);

            println!("{} {}", style("Config file:").dim(), path.display());
            if !path.exists() {
                println!(
                    "{} Run '{}' to create it",
                    style("(not created yet)").yellow(),
                    style("integrity-hash config init").green()
                );
            }
        }

        ConfigAction::Path => {
            println!("{}", path.display());
        }

        ConfigAction::Init { force } => {
            if path.exists() && !force {
                println!(
                    "{} Config file already exists at {}",
                    style(symbols::WARN).yellow(),
                    path.display()
                );
                println!("Use --force to overwrite");
                return Ok(());
            }

            config::save_config(&IntegrityConfig::default(), &path)?;
            println!(
                "{} Config file created at {}",
                style(symbols::CHECK).green(),
                path.display()
            );
        }
    }

    Ok(())
}

fn show(cfg: &IntegrityConfig) {
    println!();
    println!("{}", style("Integrity Hash Configuration").bold().underlined());
    println!();
    println!("{}", style("[segment]").cyan());
    println!("  size = {}", cfg.segment.size);
    println!("  strategy = \"{}\"", cfg.segment.strategy);
    println!();
    println!("{}", style("[erasure]").cyan());
    println!("  data_shards = {}", cfg.erasure.data_shards);
    println!("  parity_shards = {}", cfg.erasure.parity_shards);
    println!();
}
