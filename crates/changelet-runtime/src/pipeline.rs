//! Pipeline facade over the loaded artifacts.
//!
//! A [`Pipeline`] owns the catalogue, mapping table, compiled schema, and
//! static tables for the lifetime of the process. Every method takes `&self`
//! and touches no shared mutable state, so one pipeline can be shared across
//! threads and serve concurrent invocations.

use serde::Serialize;
use serde_json::Value;

use changelet_core::{
    Catalogue, ChangeSet, ChangeletConfig, ConfigError, MappingTable, NormalizerConfig,
    PolicyTables, ValidationResult,
};
use changelet_policy::{ChangeSetSchema, ChangeSetValidator, SchemaError};

use crate::convert::{Converter, DeploymentValues};
use crate::normalize::Normalizer;

/// Errors building a pipeline from configuration.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("failed to load configuration document: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Outcome of [`Pipeline::run`].
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutcome {
    pub changeset: ChangeSet,
    pub validation: ValidationResult,
    /// Rendered values. Absent when validation rejected the changeset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<DeploymentValues>,
}

#[derive(Debug)]
pub struct Pipeline {
    catalogue: Catalogue,
    mapping: MappingTable,
    schema: ChangeSetSchema,
    policy: PolicyTables,
    normalizer: NormalizerConfig,
}

impl Pipeline {
    /// Build a pipeline with the default policy and normalizer tables.
    pub fn new(catalogue: Catalogue, mapping: MappingTable, schema: ChangeSetSchema) -> Self {
        Self {
            catalogue,
            mapping,
            schema,
            policy: PolicyTables::default(),
            normalizer: NormalizerConfig::default(),
        }
    }

    pub fn with_policy(mut self, policy: PolicyTables) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_normalizer(mut self, normalizer: NormalizerConfig) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Load every artifact named by `config`. The embedded schema is used when
    /// the config names none.
    pub fn from_config(config: &ChangeletConfig) -> Result<Self, PipelineError> {
        let catalogue = Catalogue::from_file(&config.catalogue)?;
        let mapping = MappingTable::from_file(&config.mapping)?;
        let schema = match &config.schema {
            Some(path) => {
                let document: Value = changelet_core::read_document(path)?;
                ChangeSetSchema::compile(&document)?
            }
            None => ChangeSetSchema::embedded()?,
        };

        tracing::info!(
            services = catalogue.services.len(),
            mapped_services = mapping.mappings.len(),
            custom_schema = config.schema.is_some(),
            "Pipeline artifacts loaded"
        );

        Ok(Self::new(catalogue, mapping, schema)
            .with_policy(config.policy.clone())
            .with_normalizer(config.normalizer.clone()))
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    pub fn mapping(&self) -> &MappingTable {
        &self.mapping
    }

    pub fn policy(&self) -> &PolicyTables {
        &self.policy
    }

    pub fn normalize(&self, raw: &Value) -> ChangeSet {
        Normalizer::new(&self.normalizer).normalize(raw)
    }

    fn validator(&self) -> ChangeSetValidator<'_> {
        ChangeSetValidator::new(&self.schema, &self.catalogue, &self.policy)
    }

    /// Validate an arbitrary changeset document.
    pub fn validate(&self, document: &Value) -> ValidationResult {
        self.validator().validate(document)
    }

    pub fn validate_changeset(&self, changeset: &ChangeSet) -> ValidationResult {
        self.validator().validate_changeset(changeset)
    }

    /// Convert without validating. Callers are expected to gate on validation.
    pub fn convert(&self, changeset: &ChangeSet) -> DeploymentValues {
        Converter::new(&self.mapping).convert(changeset)
    }

    /// Normalize, validate, and convert unless rejected.
    ///
    /// `requires_human` changesets are still converted so the pending values
    /// can be reviewed alongside the warnings.
    pub fn run(&self, raw: &Value) -> PipelineOutcome {
        let changeset = self.normalize(raw);
        let validation = self.validate_changeset(&changeset);
        let values = if validation.is_rejected() {
            None
        } else {
            Some(self.convert(&changeset))
        };

        PipelineOutcome {
            changeset,
            validation,
            values,
        }
    }
}
