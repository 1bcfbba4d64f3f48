//! cli::commands::publish
//!
//! Publish a local vocabulary file without going through the HTTP endpoint.
//!
//! # Example
//!
//! ```bash
//! vocabpub publish --vocabulary-name animals --repo org/vocabs ./animals.rdf
//! ```

use std::path::Path;

use anyhow::{Context as _, Result};
use chrono::Local;

use super::github_publisher;
use crate::cli::Context;
use crate::publish::PublicationRequest;

/// Run the publish command.
pub fn publish(
    ctx: &Context,
    vocabulary_name: &str,
    repo: &str,
    file_name: Option<&str>,
    path: &Path,
) -> Result<()> {
    let config = ctx.config()?;
    let publisher = github_publisher(&config)?;

    let local_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("'{}' has no usable file name", path.display()))?;
    let file_name = file_name.unwrap_or(local_name);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let content = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read '{}'", path.display()))?;
        let request = PublicationRequest::new(
            vocabulary_name,
            repo,
            file_name,
            content,
            Local::now().naive_local(),
        )?;
        let result = publisher.publish(&request).await?;

        println!("{}", serde_json::to_string_pretty(&result)?);
        eprintln!("{}", result.summary(local_name));
        Ok::<(), anyhow::Error>(())
    })
}
