//! Service catalogue.
//!
//! Read-only registry of known services and their declared dependencies.
//! Loaded once at process start and shared by reference.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::{ConfigError, read_document};

/// Registry of known services.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalogue {
    #[serde(default)]
    pub services: Vec<Service>,
}

/// A catalogue entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub name: String,
    /// Identifiers of services this one depends on.
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl Service {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            dependencies: Vec::new(),
        }
    }

    pub fn with_dependencies<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = deps.into_iter().map(Into::into).collect();
        self
    }

    /// Whether `ident` names this service by id or by display name.
    pub fn matches(&self, ident: &str) -> bool {
        self.id == ident || self.name == ident
    }
}

impl Catalogue {
    pub fn new(services: Vec<Service>) -> Self {
        Self { services }
    }

    /// Load a catalogue from a YAML or JSON file (chosen by extension).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        read_document(path)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(ConfigError::from)
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(content).map_err(ConfigError::from)
    }

    /// First service whose id or name equals `ident`.
    pub fn find(&self, ident: &str) -> Option<&Service> {
        self.services.iter().find(|s| s.matches(ident))
    }

    pub fn contains(&self, ident: &str) -> bool {
        self.find(ident).is_some()
    }

    /// Declared dependencies of `ident`, empty when the service is unknown.
    pub fn dependencies_of(&self, ident: &str) -> &[String] {
        self.find(ident)
            .map(|s| s.dependencies.as_slice())
            .unwrap_or(&[])
    }
}
