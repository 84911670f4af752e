//! Gate abstraction shared by the post-schema checks.

use std::fmt;

use changelet_core::ChangeSet;

use crate::error::{Severity, ValidationError};

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Schema,
    Existence,
    Permission,
    Dependency,
    RiskConfidence,
}

impl Stage {
    /// Hard stages stop the pipeline on failure.
    pub fn severity(&self) -> Severity {
        match self {
            Stage::Schema | Stage::Existence | Stage::Permission => Severity::Hard,
            Stage::Dependency | Stage::RiskConfidence => Severity::Soft,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Schema => "schema",
            Stage::Existence => "existence",
            Stage::Permission => "permission",
            Stage::Dependency => "dependency",
            Stage::RiskConfidence => "risk_confidence",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A check over a decoded changeset.
///
/// Implementations are pure: they read the changeset and their borrowed
/// tables and return every finding for their stage, in change order.
pub trait Gate {
    fn stage(&self) -> Stage;

    fn check(&self, changeset: &ChangeSet) -> Vec<ValidationError>;
}
