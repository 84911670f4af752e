//! Configuration types for Changelet.
//!
//! The pipeline reads three externally provided documents (service catalogue,
//! mapping table, ChangeSet schema) plus two static tables (policy and
//! normalizer). All of them are loaded once and passed by reference.
//!
//! # Configuration Files
//!
//! - **changelet.yaml**: points at the catalogue, mapping, and (optionally)
//!   schema documents and may override the policy and normalizer tables
//! - **catalogue**: `{services: [{id, name, dependencies}]}` (YAML or JSON)
//! - **mapping**: `{mappings: {<service>: {<key>: <dotted.path>}}}` (YAML or JSON)

pub mod normalizer;
pub mod policy;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub use normalizer::{ActionRule, NormalizerConfig};
pub use policy::PolicyTables;

/// Top-level configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeletConfig {
    /// Path to the service catalogue document.
    pub catalogue: PathBuf,

    /// Path to the mapping table document.
    pub mapping: PathBuf,

    /// Path to a ChangeSet JSON Schema. The embedded schema is used when absent.
    #[serde(default)]
    pub schema: Option<PathBuf>,

    /// Permission matrix and escalation thresholds.
    #[serde(default)]
    pub policy: PolicyTables,

    /// Alias table, action inference rules, and placeholder values.
    #[serde(default)]
    pub normalizer: NormalizerConfig,
}

/// Errors raised while loading configuration documents.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ChangeletConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration and resolve document paths against the file's directory.
    pub fn load_with_context(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut config = Self::from_file(path)?;

        let base_dir = path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        config.catalogue = resolve(&base_dir, &config.catalogue);
        config.mapping = resolve(&base_dir, &config.mapping);
        config.schema = config.schema.as_ref().map(|s| resolve(&base_dir, s));

        Ok(config)
    }

    /// Semantic checks serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.policy.validate()?;
        self.normalizer.validate()?;
        Ok(())
    }
}

fn resolve(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

/// Read a document as JSON when the extension is `.json`, YAML otherwise.
pub fn read_document<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    if is_json {
        Ok(serde_json::from_str(&content)?)
    } else {
        Ok(serde_yaml::from_str(&content)?)
    }
}
