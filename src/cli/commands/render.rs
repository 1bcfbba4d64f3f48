//! cli::commands::render
//!
//! Dry run of the naming templates. Needs no GitHub credentials.

use anyhow::{bail, Result};
use chrono::Local;

use crate::cli::Context;
use crate::core::naming::TemplateValues;
use crate::core::types::BranchName;

/// Print the names a publication of `vocabulary_name` would use now.
pub fn render(ctx: &Context, vocabulary_name: &str) -> Result<()> {
    if vocabulary_name.trim().is_empty() {
        bail!("vocabulary name cannot be empty");
    }

    let values = TemplateValues::new(vocabulary_name, Local::now().naive_local());
    let names = ctx.layers.templates.render(&values);

    println!("{}", serde_json::to_string_pretty(&names)?);
    if let Err(e) = BranchName::new(names.branch.as_str()) {
        eprintln!("warning: {}", e);
    }
    Ok(())
}
