//! Risk and confidence gate.

use changelet_core::{ChangeSet, PolicyTables};

use crate::error::ValidationError;
use crate::gate::{Gate, Stage};

/// Escalating risk takes precedence; low confidence is only reported when the
/// risk level does not already escalate. At most one finding is produced.
pub struct RiskGate<'a> {
    policy: &'a PolicyTables,
}

impl<'a> RiskGate<'a> {
    pub fn new(policy: &'a PolicyTables) -> Self {
        Self { policy }
    }
}

impl Gate for RiskGate<'_> {
    fn stage(&self) -> Stage {
        Stage::RiskConfidence
    }

    fn check(&self, changeset: &ChangeSet) -> Vec<ValidationError> {
        let meta = &changeset.metadata;

        if self.policy.escalates_risk(&meta.risk) {
            return vec![ValidationError::risk_policy(&meta.risk)];
        }
        if self.policy.is_low_confidence(meta.confidence) {
            return vec![ValidationError::low_confidence(meta.confidence)];
        }
        Vec::new()
    }
}
