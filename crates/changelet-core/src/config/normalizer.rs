//! Normalizer tables: service aliases, action inference rules, and the
//! fallback values used for missing proposal fields.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::ConfigError;
use crate::{Action, RequestContext, Risk};

/// `intent` prefix that selects an action. Rules are evaluated in order and
/// the first match wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRule {
    pub prefix: String,
    pub action: Action,
}

impl ActionRule {
    pub fn new(prefix: impl Into<String>, action: Action) -> Self {
        Self {
            prefix: prefix.into(),
            action,
        }
    }

    /// Case-sensitive prefix match on the raw intent.
    pub fn matches(&self, intent: &str) -> bool {
        intent.starts_with(&self.prefix)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizerConfig {
    /// Proposal service name to catalogue identifier.
    #[serde(default = "default_service_aliases")]
    pub service_aliases: BTreeMap<String, String>,

    #[serde(default = "default_action_rules")]
    pub action_rules: Vec<ActionRule>,

    /// Action used when no rule matches.
    #[serde(default = "default_action")]
    pub default_action: Action,

    /// Placeholder caller identity. Upstream identity resolution overwrites it.
    #[serde(default = "default_request_context")]
    pub request_context: RequestContext,

    /// Provenance label written to `metadata.source`.
    #[serde(default = "default_source")]
    pub source: String,

    #[serde(default = "default_intent")]
    pub default_intent: String,

    #[serde(default = "default_service")]
    pub default_service: String,

    #[serde(default = "default_confidence")]
    pub default_confidence: f64,

    #[serde(default)]
    pub default_risk: Risk,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            service_aliases: default_service_aliases(),
            action_rules: default_action_rules(),
            default_action: default_action(),
            request_context: default_request_context(),
            source: default_source(),
            default_intent: default_intent(),
            default_service: default_service(),
            default_confidence: default_confidence(),
            default_risk: Risk::default(),
        }
    }
}

impl NormalizerConfig {
    /// Canonical service identifier. Unknown names pass through unchanged.
    pub fn resolve_service<'a>(&'a self, name: &'a str) -> &'a str {
        self.service_aliases
            .get(name)
            .map(String::as_str)
            .unwrap_or(name)
    }

    /// First rule whose prefix matches `intent`, else the default action.
    pub fn infer_action(&self, intent: &str) -> Action {
        self.action_rules
            .iter()
            .find(|rule| rule.matches(intent))
            .map(|rule| rule.action)
            .unwrap_or(self.default_action)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(rule) = self.action_rules.iter().find(|r| r.prefix.is_empty()) {
            return Err(ConfigError::Config(format!(
                "normalizer.action_rules: empty prefix for action '{}' would match every intent",
                rule.action
            )));
        }
        if !(0.0..=1.0).contains(&self.default_confidence) {
            return Err(ConfigError::Config(format!(
                "normalizer.default_confidence must be within 0.0..=1.0, got {}",
                self.default_confidence
            )));
        }
        Ok(())
    }
}

fn default_service_aliases() -> BTreeMap<String, String> {
    [
        ("product_catalog", "catalogue"),
        ("customer_service", "customer"),
        ("payment_service", "payment"),
        ("billing_service", "billing"),
        ("order_service", "order"),
        ("inventory_service", "inventory"),
        ("subscription_service", "subscription"),
        ("promotion_service", "promotion"),
    ]
    .into_iter()
    .map(|(from, to)| (from.to_string(), to.to_string()))
    .collect()
}

fn default_action_rules() -> Vec<ActionRule> {
    vec![
        ActionRule::new("change", Action::Update),
        ActionRule::new("update", Action::Update),
        ActionRule::new("enable", Action::Enable),
        ActionRule::new("disable", Action::Disable),
        ActionRule::new("scale", Action::Scale),
    ]
}

fn default_action() -> Action {
    Action::Update
}

fn default_request_context() -> RequestContext {
    RequestContext {
        tenant_id: "tenant-demo".to_string(),
        requested_by: "llm".to_string(),
        role: Some("admin".to_string()),
    }
}

fn default_source() -> String {
    "llm".to_string()
}

fn default_intent() -> String {
    "update_config".to_string()
}

fn default_service() -> String {
    "unknown_service".to_string()
}

fn default_confidence() -> f64 {
    0.8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_resolution() {
        let cfg = NormalizerConfig::default();
        assert_eq!(cfg.resolve_service("product_catalog"), "catalogue");
        assert_eq!(cfg.resolve_service("payment_service"), "payment");
        assert_eq!(cfg.resolve_service("shipping"), "shipping");
    }

    #[test]
    fn action_inference_first_match_wins() {
        let cfg = NormalizerConfig::default();
        assert_eq!(cfg.infer_action("change_timeout"), Action::Update);
        assert_eq!(cfg.infer_action("update_config"), Action::Update);
        assert_eq!(cfg.infer_action("enable_feature"), Action::Enable);
        assert_eq!(cfg.infer_action("disable_promotion"), Action::Disable);
        assert_eq!(cfg.infer_action("scale_out"), Action::Scale);
        assert_eq!(cfg.infer_action("remove_service"), Action::Update);
        assert_eq!(cfg.infer_action(""), Action::Update);
    }

    #[test]
    fn action_inference_is_case_sensitive() {
        let cfg = NormalizerConfig::default();
        assert_eq!(cfg.infer_action("Enable_feature"), Action::Update);
        assert_eq!(cfg.infer_action("SCALE"), Action::Update);
    }

    #[test]
    fn custom_rules_are_ordered() {
        let cfg = NormalizerConfig {
            action_rules: vec![
                ActionRule::new("scale_down_to_zero", Action::Disable),
                ActionRule::new("scale", Action::Scale),
            ],
            ..Default::default()
        };
        assert_eq!(cfg.infer_action("scale_down_to_zero_now"), Action::Disable);
        assert_eq!(cfg.infer_action("scale_up"), Action::Scale);
    }

    #[test]
    fn empty_prefix_is_rejected() {
        let cfg = NormalizerConfig {
            action_rules: vec![ActionRule::new("", Action::Delete)],
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }
}
