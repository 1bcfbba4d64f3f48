//! cli
//!
//! Command-line interface layer for vocabpub.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Load configuration layers and initialise logging
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap, merges the config
//! file with the environment, and dispatches to [`commands`]. Publication
//! logic lives in [`crate::publish`].

pub mod args;
pub mod commands;

pub use args::Cli;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::core::config::{self, Config, FileConfig};

/// Per-invocation context shared by command handlers.
#[derive(Debug, Clone)]
pub struct Context {
    /// Config file merged with the environment, before defaults
    pub layers: FileConfig,
}

impl Context {
    /// Fully resolved configuration.
    ///
    /// Only commands that talk to GitHub call this, so `render` works
    /// without credentials.
    pub fn config(&self) -> Result<Config> {
        Ok(Config::resolve(self.layers.clone())?)
    }
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();

    let mut layers = config::load_layers(cli.config.as_deref())?;
    if cli.debug {
        layers.debug_mode = Some(true);
    }
    init_tracing(layers.log_filter());

    let ctx = Context { layers };
    commands::dispatch(cli.command, &ctx)
}

/// Install the global subscriber. `RUST_LOG` wins over `default_filter`.
fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
