//! `changelet convert` command implementation.
//!
//! Converts without validating. Run `changelet validate` first, or use
//! `changelet run` which only converts accepted changesets.

use anyhow::{Context, Result};
use std::path::Path;

use changelet_core::ChangeSet;

use super::{OutputFormat, load_pipeline, print_document, read_input};

pub fn run(config_path: &Path, changeset_path: &Path, format: OutputFormat) -> Result<()> {
    let pipeline = load_pipeline(config_path)?;
    let document = read_input(changeset_path)?;
    let changeset: ChangeSet = serde_json::from_value(document).with_context(|| {
        format!(
            "{} is not a well-formed changeset (try `changelet validate`)",
            changeset_path.display()
        )
    })?;

    let values = pipeline.convert(&changeset);
    let rendered = match format {
        OutputFormat::Json => values.to_json_pretty()?,
        OutputFormat::Yaml => values.to_yaml()?,
    };
    print_document(&rendered);

    Ok(())
}
