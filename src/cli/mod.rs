//! Command-line interface for altsync.
//!
//! # Available Commands
//!
//! - `sync` - Synchronize catalogs with the latest upstream releases
//! - `validate` - Check curated lists without touching the network
//!
//! # Global Options
//!
//! - `--verbose` - Enable debug output
//! - `--quiet` - Only report errors
//! - `--config` - Path to `altsync.toml` (default: `./altsync.toml`, optional)
//!
//! `RUST_LOG` takes precedence over both verbosity flags.
//!
//! # Example
//!
//! ```bash
//! # Every catalog listed in altsync.toml
//! altsync sync
//!
//! # One ad-hoc catalog, no configuration file needed
//! altsync sync --apps apps.json --output source.json \
//!     --name "My Source" --identifier io.example.source
//! ```

mod sync;
mod validate;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::{CONFIG_FILE_NAME, SyncConfig};

pub use sync::SyncCommand;
pub use validate::ValidateCommand;

/// Top-level command-line interface.
#[derive(Debug, Parser)]
#[command(
    name = "altsync",
    about = "Keep a sideloading app source in sync with upstream GitHub releases",
    version,
    long_about = "altsync reads a curated list of GitHub repositories, finds their newest \
                  .ipa releases and writes an AltStore-style source catalog."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only report errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the configuration file.
    ///
    /// Without this flag `altsync.toml` in the current directory is used if it
    /// exists. An explicitly named file must exist.
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Synchronize catalogs with the latest upstream releases
    Sync(SyncCommand),

    /// Validate curated lists
    Validate(ValidateCommand),
}

impl Cli {
    /// Installs logging, loads the configuration and runs the subcommand.
    pub async fn execute(self) -> Result<()> {
        init_logging(self.log_level());
        let config = self.load_config()?;

        match self.command {
            Commands::Sync(cmd) => cmd.execute(config).await,
            Commands::Validate(cmd) => cmd.execute(&config),
        }
    }

    /// Default log filter selected by the verbosity flags.
    #[must_use]
    pub const fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "info"
        }
    }

    fn load_config(&self) -> Result<SyncConfig> {
        match &self.config {
            Some(path) => SyncConfig::load_from(path),
            None => SyncConfig::load_or_default(&PathBuf::from(CONFIG_FILE_NAME)),
        }
    }
}

/// Installs the global subscriber. `RUST_LOG` wins over `default_level`.
fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
