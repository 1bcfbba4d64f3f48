//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Async Commands
//!
//! `serve` and `publish` talk to GitHub, so their handlers build a tokio
//! runtime and block on the async implementation. `render` never leaves
//! the process.

mod publish;
mod render;
mod serve;

pub use publish::publish;
pub use render::render;
pub use serve::serve;

use std::sync::Arc;

use anyhow::{Context as _, Result};

use super::args::Command;
use super::Context;
use crate::auth::AppJwtSigner;
use crate::core::config::Config;
use crate::forge::github::GitHubIntegration;
use crate::publish::Publisher;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Serve { bind } => serve(ctx, bind.as_deref()),
        Command::Publish {
            vocabulary_name,
            repo,
            file_name,
            path,
        } => publish(ctx, &vocabulary_name, &repo, file_name.as_deref(), &path),
        Command::Render { vocabulary_name } => render(ctx, &vocabulary_name),
    }
}

/// Build a publisher backed by the GitHub App in `config`.
pub(crate) fn github_publisher(config: &Config) -> Result<Publisher> {
    let signer = AppJwtSigner::from_pem(config.github.app_id.clone(), &config.github.private_key)
        .context("GitHub App private key could not be loaded")?;
    let integration = GitHubIntegration::new(
        Arc::new(signer),
        config.github.api_base.as_str(),
        config.github.request_timeout,
    )?;
    Ok(Publisher::from_config(Arc::new(integration), config))
}
