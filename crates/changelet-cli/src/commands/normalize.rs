//! `changelet normalize` command implementation.
//!
//! Only the normalizer tables are needed, so a missing `changelet.yaml` falls
//! back to the built-in aliases and action rules.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use changelet_core::{ChangeletConfig, NormalizerConfig};
use changelet_runtime::Normalizer;

use super::{OutputFormat, print_document, read_input};

pub fn run(
    config_path: &Path,
    raw_path: &Path,
    output: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let normalizer = if config_path.exists() {
        ChangeletConfig::from_file(config_path)
            .with_context(|| format!("Failed to load configuration: {}", config_path.display()))?
            .normalizer
    } else {
        tracing::debug!(
            config = %config_path.display(),
            "No configuration file, using default normalizer tables"
        );
        NormalizerConfig::default()
    };

    let raw = read_input(raw_path)?;
    let changeset = Normalizer::new(&normalizer).normalize(&raw);
    let rendered = format.render(&changeset)?;

    match output {
        Some(path) => {
            fs::write(path, &rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("✔ Wrote changeset: {}", path.display());
        }
        None => print_document(&rendered),
    }

    Ok(())
}
