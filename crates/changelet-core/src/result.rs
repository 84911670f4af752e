//! Validation outcome types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome class of a validation run.
///
/// Ordered by precedence: `Rejected` dominates `RequiresHuman`, which
/// dominates `Validated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    Validated,
    RequiresHuman,
    Rejected,
}

impl ValidationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationStatus::Validated => "validated",
            ValidationStatus::RequiresHuman => "requires_human",
            ValidationStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of running a changeset through the gate pipeline.
///
/// `errors` is non-empty iff `status == Rejected`. Construct through
/// [`ValidationResult::rejected`] and [`ValidationResult::accepted`] to keep
/// that invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub status: ValidationStatus,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// A hard-gate failure. `errors` must be non-empty.
    pub fn rejected(errors: Vec<String>) -> Self {
        debug_assert!(!errors.is_empty(), "rejected result without errors");
        Self {
            status: ValidationStatus::Rejected,
            errors,
            warnings: Vec::new(),
        }
    }

    /// All hard gates passed. `escalate` selects `RequiresHuman` over `Validated`.
    pub fn accepted(warnings: Vec<String>, escalate: bool) -> Self {
        let status = if escalate {
            ValidationStatus::RequiresHuman
        } else {
            ValidationStatus::Validated
        };
        Self {
            status,
            errors: Vec::new(),
            warnings,
        }
    }

    pub fn is_rejected(&self) -> bool {
        self.status == ValidationStatus::Rejected
    }

    pub fn is_validated(&self) -> bool {
        self.status == ValidationStatus::Validated
    }

    pub fn requires_human(&self) -> bool {
        self.status == ValidationStatus::RequiresHuman
    }
}
