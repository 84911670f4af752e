//! `changelet run` command implementation.
//!
//! Prints `{changeset, validation, values?}`. `requires_human` outcomes exit 0
//! with the status carried in the document.

use anyhow::Result;
use std::path::Path;

use super::{OutputFormat, load_pipeline, print_document, read_input};

pub fn run(config_path: &Path, raw_path: &Path, format: OutputFormat) -> Result<()> {
    let pipeline = load_pipeline(config_path)?;
    let raw = read_input(raw_path)?;

    let outcome = pipeline.run(&raw);
    tracing::info!(
        changeset_id = outcome.changeset.id.as_deref().unwrap_or("-"),
        status = %outcome.validation.status,
        "Pipeline run finished"
    );
    print_document(&format.render(&outcome)?);

    if outcome.validation.is_rejected() {
        anyhow::bail!(
            "Changeset rejected with {} error(s)",
            outcome.validation.errors.len()
        );
    }
    Ok(())
}
