//! Mapping table from proposal config keys to deployment-value paths.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::config::{ConfigError, read_document};

/// `mappings[service][key] = "dotted.path"`.
///
/// A missing service or key means there is no explicit mapping; callers fall
/// back to `<service>.<key>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingTable {
    #[serde(default)]
    pub mappings: BTreeMap<String, ServiceMappings>,
}

/// Key-to-path entries for a single service. A bare `service:` entry in YAML
/// (null) is treated as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<BTreeMap<String, String>>")]
pub struct ServiceMappings(pub BTreeMap<String, String>);

impl From<Option<BTreeMap<String, String>>> for ServiceMappings {
    fn from(value: Option<BTreeMap<String, String>>) -> Self {
        Self(value.unwrap_or_default())
    }
}

impl MappingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a mapping table from a YAML or JSON file (chosen by extension).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        read_document(path)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(ConfigError::from)
    }

    /// Add an entry (builder style).
    pub fn with(
        mut self,
        service: impl Into<String>,
        key: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        self.mappings
            .entry(service.into())
            .or_default()
            .0
            .insert(key.into(), path.into());
        self
    }

    /// Explicit path for `(service, key)`. Empty paths count as unmapped.
    pub fn lookup(&self, service: &str, key: &str) -> Option<&str> {
        self.mappings
            .get(service)
            .and_then(|m| m.0.get(key))
            .map(String::as_str)
            .filter(|p| !p.is_empty())
    }

    /// Iterate `(service, key, path)` triples.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.mappings.iter().flat_map(|(service, keys)| {
            keys.0
                .iter()
                .map(move |(key, path)| (service.as_str(), key.as_str(), path.as_str()))
        })
    }
}
