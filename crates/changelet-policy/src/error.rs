//! Validation error types for changeset gates.
//!
//! Every gate failure is a [`ValidationError`]. Hard kinds reject the
//! changeset; soft kinds escalate it to human review. Messages are the exact
//! strings returned in a `ValidationResult`.

use serde::Serialize;
use std::fmt;

use changelet_core::{Action, Risk};

/// Error type for gate failures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    /// The kind of gate failure.
    pub kind: ValidationErrorKind,
    /// Human-readable error message.
    pub message: String,
}

impl ValidationError {
    /// Create a new validation error.
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }

    // =========================================================================
    // HARD GATES
    // =========================================================================

    /// A schema violation at `path` (segments joined by `/`, empty for the root).
    pub fn structural(path: &str, message: impl fmt::Display) -> Self {
        Self::new(
            ValidationErrorKind::Structural,
            format!("{}: {}", path, message),
        )
    }

    /// A change targets a service the catalogue does not know.
    pub fn unknown_service(service: &str) -> Self {
        Self::new(
            ValidationErrorKind::UnknownService,
            format!("Service not found in catalogue: {}", service),
        )
    }

    /// The caller's role may not perform `action`.
    pub fn permission_denied(role: &str, action: Action, service: &str) -> Self {
        Self::new(
            ValidationErrorKind::PermissionDenied,
            format!(
                "Role '{}' cannot perform action '{}' on service '{}'",
                role, action, service
            ),
        )
    }

    // =========================================================================
    // SOFT GATES
    // =========================================================================

    /// An enabled service has a dependency whose runtime state is unknown.
    pub fn dependency_uncertainty(service: &str, dependency: &str) -> Self {
        Self::new(
            ValidationErrorKind::DependencyUncertainty,
            format!(
                "Dependency check: {} depends on {} (runtime check needed).",
                service, dependency
            ),
        )
    }

    pub fn risk_policy(risk: &Risk) -> Self {
        Self::new(
            ValidationErrorKind::RiskPolicy,
            format!(
                "High risk operation (risk={}) requires human approval.",
                risk
            ),
        )
    }

    pub fn low_confidence(confidence: f64) -> Self {
        Self::new(
            ValidationErrorKind::LowConfidence,
            format!(
                "Low confidence ({:?}) - human review recommended.",
                confidence
            ),
        )
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Categories of gate failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorKind {
    /// Changeset does not conform to the declared schema.
    Structural,
    /// Change targets a service missing from the catalogue.
    UnknownService,
    /// Role is not permitted to perform the action.
    PermissionDenied,
    /// Enabled service declares dependencies that cannot be verified.
    DependencyUncertainty,
    /// Declared risk requires approval.
    RiskPolicy,
    /// Producer confidence is below threshold.
    LowConfidence,
}

impl ValidationErrorKind {
    pub fn severity(&self) -> Severity {
        match self {
            ValidationErrorKind::Structural
            | ValidationErrorKind::UnknownService
            | ValidationErrorKind::PermissionDenied => Severity::Hard,
            ValidationErrorKind::DependencyUncertainty
            | ValidationErrorKind::RiskPolicy
            | ValidationErrorKind::LowConfidence => Severity::Soft,
        }
    }
}

/// Whether a failure blocks the changeset or only escalates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Rejects and stops the gate pipeline.
    Hard,
    /// Forces human review, pipeline continues.
    Soft,
}
