//! `changelet validate` command implementation.

use anyhow::Result;
use std::path::Path;

use super::{OutputFormat, load_pipeline, print_document, read_input};

pub fn run(config_path: &Path, changeset_path: &Path, format: OutputFormat) -> Result<()> {
    let pipeline = load_pipeline(config_path)?;
    let document = read_input(changeset_path)?;

    let result = pipeline.validate(&document);
    print_document(&format.render(&result)?);

    if result.is_rejected() {
        anyhow::bail!("Changeset rejected with {} error(s)", result.errors.len());
    }
    Ok(())
}
