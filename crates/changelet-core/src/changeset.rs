//! ChangeSet data model.
//!
//! A [`ChangeSet`] is the unit of work flowing through the pipeline. It is built
//! once (by the normalizer or supplied directly by a caller) and is read-only
//! through validation and conversion.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Proposal-level configuration keys and their values, in proposal order.
pub type ChangeConfig = Map<String, Value>;

/// Canonical description of one or more service mutations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeSet {
    /// Opaque identifier. Generated by the normalizer when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Free-text classification label.
    pub intent: String,
    /// Creation time as ISO-8601 text, kept verbatim. Its shape is whatever the
    /// schema declares; the pipeline never parses it.
    pub timestamp: String,
    pub request_context: RequestContext,
    /// Ordered mutations. Order matters for convert-time merging.
    pub changes: Vec<Change>,
    /// Services advertised as affected. Advisory only.
    #[serde(default)]
    pub impacted_services: Vec<String>,
    pub metadata: Metadata,
}

impl ChangeSet {
    /// Services touched by at least one change, in first-seen order.
    pub fn touched_services(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for change in &self.changes {
            if !seen.contains(&change.service.as_str()) {
                seen.push(change.service.as_str());
            }
        }
        seen
    }

    /// Serialize into the JSON document form the schema gate checks.
    pub fn to_document(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// Who asked for the change. `role` drives permission checks.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RequestContext {
    #[serde(default)]
    pub tenant_id: String,
    #[serde(default)]
    pub requested_by: String,
    /// Already-resolved caller role. `None` falls back to the policy default role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl RequestContext {
    /// Effective role, falling back to `default` when none was supplied.
    pub fn role_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.role.as_deref().unwrap_or(default)
    }
}

/// A single `(action, service, config)` mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub action: Action,
    pub service: String,
    #[serde(default)]
    pub config: ChangeConfig,
}

impl Change {
    pub fn new(action: Action, service: impl Into<String>) -> Self {
        Self {
            action,
            service: service.into(),
            config: ChangeConfig::new(),
        }
    }

    /// Add a config entry (builder style).
    pub fn with_config(mut self, key: impl Into<String>, value: Value) -> Self {
        self.config.insert(key.into(), value);
        self
    }
}

/// Mutation verbs a change can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Enable,
    Disable,
    Scale,
    Update,
    Delete,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Enable,
        Action::Disable,
        Action::Scale,
        Action::Update,
        Action::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Enable => "enable",
            Action::Disable => "disable",
            Action::Scale => "scale",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared risk level of a changeset.
///
/// Unrecognised labels are kept verbatim in [`Risk::Other`] so that a lenient
/// producer (the normalizer) never loses input; the schema gate rejects them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Risk {
    #[default]
    Low,
    Medium,
    High,
    Critical,
    Other(String),
}

impl Risk {
    pub fn as_str(&self) -> &str {
        match self {
            Risk::Low => "low",
            Risk::Medium => "medium",
            Risk::High => "high",
            Risk::Critical => "critical",
            Risk::Other(label) => label,
        }
    }
}

impl From<String> for Risk {
    fn from(value: String) -> Self {
        match value.as_str() {
            "low" => Risk::Low,
            "medium" => Risk::Medium,
            "high" => Risk::High,
            "critical" => Risk::Critical,
            _ => Risk::Other(value),
        }
    }
}

impl From<&str> for Risk {
    fn from(value: &str) -> Self {
        Risk::from(value.to_string())
    }
}

impl From<Risk> for String {
    fn from(value: Risk) -> Self {
        match value {
            Risk::Other(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Risk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification and provenance of a changeset.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub intent_type: String,
    /// Producer confidence in `0.0..=1.0`. Missing means no confidence at all.
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub risk: Risk,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub validator_status: String,
    #[serde(default)]
    pub notes: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn action_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Action::Scale).unwrap(), json!("scale"));
        let parsed: Action = serde_json::from_value(json!("delete")).unwrap();
        assert_eq!(parsed, Action::Delete);
        assert!(serde_json::from_value::<Action>(json!("request")).is_err());
    }

    #[test]
    fn unknown_risk_is_preserved() {
        let risk: Risk = serde_json::from_value(json!("extreme")).unwrap();
        assert_eq!(risk, Risk::Other("extreme".to_string()));
        assert_eq!(serde_json::to_value(&risk).unwrap(), json!("extreme"));

        let risk: Risk = serde_json::from_value(json!("critical")).unwrap();
        assert_eq!(risk, Risk::Critical);
    }

    #[test]
    fn minimal_document_uses_defaults() {
        let doc = json!({
            "intent": "scale_order",
            "timestamp": "2025-01-01T00:00:00Z",
            "request_context": {},
            "changes": [{"action": "scale", "service": "order"}],
            "metadata": {}
        });

        let cs: ChangeSet = serde_json::from_value(doc).unwrap();
        assert!(cs.id.is_none());
        assert_eq!(cs.timestamp, "2025-01-01T00:00:00Z");
        assert!(cs.changes[0].config.is_empty());
        assert_eq!(cs.metadata.confidence, 0.0);
        assert_eq!(cs.metadata.risk, Risk::Low);
        assert_eq!(cs.request_context.role_or("user"), "user");
    }

    #[test]
    fn touched_services_are_deduplicated_in_order() {
        let doc = json!({
            "intent": "x",
            "timestamp": "2025-01-01T00:00:00+00:00",
            "request_context": {"role": "ops"},
            "changes": [
                {"action": "enable", "service": "payment"},
                {"action": "scale", "service": "order"},
                {"action": "update", "service": "payment"}
            ],
            "metadata": {"confidence": 0.9}
        });

        let cs: ChangeSet = serde_json::from_value(doc).unwrap();
        assert_eq!(cs.touched_services(), vec!["payment", "order"]);
        assert_eq!(cs.request_context.role_or("user"), "ops");
    }

    #[test]
    fn config_keeps_proposal_order() {
        let change = Change::new(Action::Update, "payment")
            .with_config("timeout", json!(30))
            .with_config("currency", json!("EUR"))
            .with_config("retries", json!(2));

        let keys: Vec<&str> = change.config.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["timeout", "currency", "retries"]);
    }
}
