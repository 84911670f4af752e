//! Main validator that composes the schema gate and the policy gates.
//!
//! The `ChangeSetValidator` is the primary entry point. Stages run in a fixed
//! order:
//!
//! 1. **Schema** (hard) - structural conformance
//! 2. **Existence** (hard) - every service is in the catalogue
//! 3. **Permission** (hard) - the role may perform every action
//! 4. **Dependency** (soft) - enabled services with declared dependencies
//! 5. **Risk/Confidence** (soft) - declared risk and producer confidence
//!
//! Hard stages short-circuit with `rejected`. Soft stages accumulate warnings
//! and escalate to `requires_human`.

use serde_json::Value;

use changelet_core::{Catalogue, ChangeSet, PolicyTables, ValidationResult};

use crate::dependency::DependencyGate;
use crate::error::{Severity, ValidationError};
use crate::existence::ExistenceGate;
use crate::gate::{Gate, Stage};
use crate::risk::RiskGate;
use crate::role::PermissionGate;
use crate::schema::ChangeSetSchema;

/// Validates changesets against a schema, a catalogue, and policy tables.
///
/// Holds only shared references; one validator can serve any number of
/// concurrent validations.
pub struct ChangeSetValidator<'a> {
    schema: &'a ChangeSetSchema,
    existence: ExistenceGate<'a>,
    permission: PermissionGate<'a>,
    dependency: DependencyGate<'a>,
    risk: RiskGate<'a>,
}

impl<'a> ChangeSetValidator<'a> {
    pub fn new(
        schema: &'a ChangeSetSchema,
        catalogue: &'a Catalogue,
        policy: &'a PolicyTables,
    ) -> Self {
        Self {
            schema,
            existence: ExistenceGate::new(catalogue),
            permission: PermissionGate::new(policy),
            dependency: DependencyGate::new(catalogue),
            risk: RiskGate::new(policy),
        }
    }

    /// Validate a changeset document. Never fails; every problem is reported
    /// in the returned result.
    pub fn validate(&self, document: &Value) -> ValidationResult {
        let changeset = match self.schema.check(document) {
            Ok(changeset) => changeset,
            Err(errors) => return reject(Stage::Schema, errors),
        };
        self.run_gates(&changeset)
    }

    /// Validate a typed changeset through its document form, so the schema
    /// gate sees exactly what a client would have sent.
    pub fn validate_changeset(&self, changeset: &ChangeSet) -> ValidationResult {
        match changeset.to_document() {
            Ok(document) => self.validate(&document),
            Err(e) => reject(Stage::Schema, vec![ValidationError::structural("", e)]),
        }
    }

    fn gates(&self) -> [&dyn Gate; 4] {
        [
            &self.existence,
            &self.permission,
            &self.dependency,
            &self.risk,
        ]
    }

    fn run_gates(&self, changeset: &ChangeSet) -> ValidationResult {
        let mut warnings: Vec<String> = Vec::new();

        for gate in self.gates() {
            let stage = gate.stage();
            let findings = gate.check(changeset);
            tracing::debug!(stage = %stage, findings = findings.len(), "Gate evaluated");

            if findings.is_empty() {
                continue;
            }
            match stage.severity() {
                Severity::Hard => return reject(stage, findings),
                Severity::Soft => {
                    for finding in &findings {
                        tracing::warn!(stage = %stage, "{}", finding);
                    }
                    warnings.extend(findings.into_iter().map(|f| f.message));
                }
            }
        }

        // Every soft finding escalates.
        let escalate = !warnings.is_empty();
        let result = ValidationResult::accepted(warnings, escalate);
        tracing::info!(
            changeset_id = changeset.id.as_deref().unwrap_or("-"),
            status = %result.status,
            warnings = result.warnings.len(),
            "Changeset validated"
        );
        result
    }
}

fn reject(stage: Stage, errors: Vec<ValidationError>) -> ValidationResult {
    tracing::warn!(stage = %stage, errors = errors.len(), "Changeset rejected");
    ValidationResult::rejected(errors.into_iter().map(|e| e.message).collect())
}

/// Validate `document` with the default policy tables.
pub fn validate(
    document: &Value,
    catalogue: &Catalogue,
    schema: &ChangeSetSchema,
) -> ValidationResult {
    let policy = PolicyTables::default();
    ChangeSetValidator::new(schema, catalogue, &policy).validate(document)
}
