//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--config <path>`: Read settings from a TOML file
//! - `--debug`: Enable debug logging

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// vocabpub - Publish vocabulary documents to GitHub as pull requests
#[derive(Parser, Debug)]
#[command(name = "vocabpub")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to $VOCABPUB_CONFIG)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the upload endpoint
    #[command(
        long_about = "Run the HTTP upload endpoint.\n\n\
            Accepts POST /upload?vocabulary_name=..&repo_full_name=.. with an \
            'Authorization: Bearer <INCOMING_SECRET>' header, and publishes the \
            uploaded vocabulary as a pull request.",
        after_help = "\
EXAMPLES:
    # Listen on the configured address (BIND_ADDR, default 127.0.0.1:5000)
    vocabpub serve

    # Upload a file
    curl -H 'Authorization: Bearer $INCOMING_SECRET' \\
         -F file=@animals.rdf \\
         'http://127.0.0.1:5000/upload?vocabulary_name=animals&repo_full_name=org/vocabs'"
    )]
    Serve {
        /// Address to listen on, overriding BIND_ADDR
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },

    /// Publish a local file once and print the result
    Publish {
        /// Name of the vocabulary
        #[arg(long)]
        vocabulary_name: String,

        /// Target repository as owner/name
        #[arg(long, value_name = "OWNER/NAME")]
        repo: String,

        /// Path of the file in the repository (defaults to the local file name)
        #[arg(long)]
        file_name: Option<String>,

        /// Vocabulary file to publish
        path: PathBuf,
    },

    /// Print the branch, commit and pull request names for now
    Render {
        /// Name of the vocabulary
        #[arg(long)]
        vocabulary_name: String,
    },
}
