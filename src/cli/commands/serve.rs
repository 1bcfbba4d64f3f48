//! cli::commands::serve

use anyhow::Result;
use tracing::info;

use super::github_publisher;
use crate::cli::Context;
use crate::server::{self, AppState};

/// Run the upload endpoint until interrupted.
pub fn serve(ctx: &Context, bind: Option<&str>) -> Result<()> {
    let config = ctx.config()?;
    let secret = config.incoming_secret()?;
    let publisher = github_publisher(&config)?;
    let addr = bind.unwrap_or(&config.server.bind_addr);

    info!(
        api_base = %config.github.api_base,
        default_branch = %config.github.default_branch,
        "starting upload endpoint"
    );

    let state = AppState::new(publisher, secret);
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(server::serve(state, addr))?;
    Ok(())
}
