//! Policy tables: role permission matrix and escalation thresholds.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::ConfigError;
use crate::{Action, Risk};

/// Static permission and risk policy.
///
/// Verbs are kept as strings because roles may hold permissions that never
/// appear as a change action (`user` may only `request`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyTables {
    /// Role name to permitted verbs.
    #[serde(default = "default_role_permissions")]
    pub role_permissions: BTreeMap<String, Vec<String>>,

    /// Risk levels that always force human review.
    #[serde(default = "default_escalation_risks")]
    pub escalation_risks: Vec<Risk>,

    /// Confidence strictly below this forces human review.
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,

    /// Role assumed when a request context carries none.
    #[serde(default = "default_role")]
    pub default_role: String,
}

impl Default for PolicyTables {
    fn default() -> Self {
        Self {
            role_permissions: default_role_permissions(),
            escalation_risks: default_escalation_risks(),
            min_confidence: default_min_confidence(),
            default_role: default_role(),
        }
    }
}

impl PolicyTables {
    /// Whether `role` may perform `action`. Unknown roles may do nothing.
    pub fn permits(&self, role: &str, action: Action) -> bool {
        self.role_permissions
            .get(role)
            .is_some_and(|verbs| verbs.iter().any(|v| v == action.as_str()))
    }

    pub fn escalates_risk(&self, risk: &Risk) -> bool {
        self.escalation_risks.contains(risk)
    }

    pub fn is_low_confidence(&self, confidence: f64) -> bool {
        confidence < self.min_confidence
    }

    /// Replace a role's verbs (builder style).
    pub fn with_role<I, S>(mut self, role: impl Into<String>, verbs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.role_permissions
            .insert(role.into(), verbs.into_iter().map(Into::into).collect());
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(ConfigError::Config(format!(
                "policy.min_confidence must be within 0.0..=1.0, got {}",
                self.min_confidence
            )));
        }
        if let Some(Risk::Other(label)) = self
            .escalation_risks
            .iter()
            .find(|r| matches!(r, Risk::Other(_)))
        {
            return Err(ConfigError::Config(format!(
                "policy.escalation_risks contains unknown risk level '{}'",
                label
            )));
        }
        Ok(())
    }
}

fn default_role_permissions() -> BTreeMap<String, Vec<String>> {
    let all: Vec<String> = Action::ALL.iter().map(|a| a.as_str().to_string()).collect();
    let ops: Vec<String> = Action::ALL
        .iter()
        .filter(|a| **a != Action::Delete)
        .map(|a| a.as_str().to_string())
        .collect();

    BTreeMap::from([
        ("admin".to_string(), all),
        ("ops".to_string(), ops),
        ("user".to_string(), vec!["request".to_string()]),
    ])
}

fn default_escalation_risks() -> Vec<Risk> {
    vec![Risk::High, Risk::Critical]
}

fn default_min_confidence() -> f64 {
    0.7
}

fn default_role() -> String {
    "user".to_string()
}
