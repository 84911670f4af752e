//! CLI command implementations for Changelet.

pub mod check;
pub mod convert;
pub mod normalize;
pub mod run;
pub mod validate;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::path::Path;

use changelet_core::ChangeletConfig;
use changelet_runtime::Pipeline;

/// Encoding of documents written to stdout or `--output`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn render<T: Serialize>(self, value: &T) -> Result<String> {
        let rendered = match self {
            OutputFormat::Json => serde_json::to_string_pretty(value)?,
            OutputFormat::Yaml => serde_yaml::to_string(value)?,
        };
        Ok(rendered)
    }
}

/// Load `changelet.yaml` and every artifact it names.
pub fn load_pipeline(config_path: &Path) -> Result<Pipeline> {
    let config = ChangeletConfig::load_with_context(config_path)
        .with_context(|| format!("Failed to load configuration: {}", config_path.display()))?;
    Pipeline::from_config(&config).context("Failed to load pipeline artifacts")
}

/// Read a JSON or YAML input document (by extension).
pub fn read_input(path: &Path) -> Result<JsonValue> {
    changelet_core::read_document(path)
        .with_context(|| format!("Failed to read input document: {}", path.display()))
}

/// Print `rendered` without doubling the trailing newline YAML already carries.
pub fn print_document(rendered: &str) {
    println!("{}", rendered.trim_end_matches('\n'));
}

/// Minimal on-disk configuration for command tests: `payment`, and `order`
/// depending on `payment`.
#[cfg(test)]
pub(crate) fn write_test_config(dir: &Path) -> std::path::PathBuf {
    use std::fs;

    fs::write(
        dir.join("catalogue.yaml"),
        "services:\n  - id: payment\n    name: payment\n  - id: order\n    name: order\n    dependencies: [payment]\n",
    )
    .unwrap();
    fs::write(
        dir.join("mapping.yaml"),
        "mappings:\n  payment:\n    timeout: payment.config.timeoutSeconds\n",
    )
    .unwrap();
    let config_path = dir.join("changelet.yaml");
    fs::write(&config_path, "catalogue: catalogue.yaml\nmapping: mapping.yaml\n").unwrap();
    config_path
}
