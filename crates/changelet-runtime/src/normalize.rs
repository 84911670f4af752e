//! Proposal normalization.
//!
//! Turns a raw agent proposal into a canonical [`ChangeSet`]. Normalization is
//! total: missing or mistyped fields degrade to the configured defaults, and
//! enforcement is left to the validator.
//!
//! Accepted input shape (every field optional):
//!
//! ```json
//! {
//!   "proposal_text": "...",
//!   "changeset": {"model": "...", "features": [{"key": "...", "value": ...}], "impacted_services": ["..."]},
//!   "metadata": {"intent": "...", "confidence": 0.8, "risk": "low"}
//! }
//! ```

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

use changelet_core::{Change, ChangeConfig, ChangeSet, Metadata, NormalizerConfig, Risk};

/// Prefix of generated changeset ids.
pub const GENERATED_ID_PREFIX: &str = "chg-auto-";

/// Value of `metadata.validator_status` before validation has run.
pub const PENDING_STATUS: &str = "pending";

pub struct Normalizer<'a> {
    config: &'a NormalizerConfig,
}

impl<'a> Normalizer<'a> {
    pub fn new(config: &'a NormalizerConfig) -> Self {
        Self { config }
    }

    /// Normalize `raw` using the current UTC time.
    pub fn normalize(&self, raw: &Value) -> ChangeSet {
        self.normalize_at(raw, Utc::now())
    }

    /// Normalize `raw` as if the current time were `now`.
    pub fn normalize_at(&self, raw: &Value, now: DateTime<Utc>) -> ChangeSet {
        let empty = Map::new();
        let proposal_text = str_field(raw, "proposal_text").unwrap_or("");
        let changeset_raw = object_field(raw, "changeset").unwrap_or(&empty);
        let metadata_raw = object_field(raw, "metadata").unwrap_or(&empty);

        let model = changeset_raw
            .get("model")
            .and_then(Value::as_str)
            .unwrap_or(&self.config.default_service);
        let service = self.config.resolve_service(model).to_string();

        let intent = metadata_raw
            .get("intent")
            .and_then(Value::as_str)
            .unwrap_or(&self.config.default_intent)
            .to_string();
        let action = self.config.infer_action(&intent);

        let confidence = metadata_raw
            .get("confidence")
            .and_then(Value::as_f64)
            .unwrap_or(self.config.default_confidence);
        let risk = metadata_raw
            .get("risk")
            .and_then(Value::as_str)
            .map(Risk::from)
            .unwrap_or_else(|| self.config.default_risk.clone());

        let changeset = ChangeSet {
            id: Some(generated_id(now)),
            intent: intent.clone(),
            timestamp: now.to_rfc3339_opts(SecondsFormat::AutoSi, false),
            request_context: self.config.request_context.clone(),
            changes: vec![Change {
                action,
                service,
                config: collect_features(changeset_raw.get("features")),
            }],
            impacted_services: string_list(changeset_raw.get("impacted_services")),
            metadata: Metadata {
                intent_type: intent,
                confidence,
                risk,
                source: self.config.source.clone(),
                validator_status: PENDING_STATUS.to_string(),
                notes: proposal_text.to_string(),
            },
        };

        tracing::debug!(
            changeset_id = changeset.id.as_deref().unwrap_or("-"),
            service = %changeset.changes[0].service,
            action = %changeset.changes[0].action,
            keys = changeset.changes[0].config.len(),
            "Normalized proposal"
        );

        changeset
    }
}

/// Normalize with the default alias table and action rules.
pub fn normalize(raw: &Value) -> ChangeSet {
    let config = NormalizerConfig::default();
    Normalizer::new(&config).normalize(raw)
}

/// `chg-auto-YYYYMMDDHHMMSS`
pub fn generated_id(now: DateTime<Utc>) -> String {
    format!("{}{}", GENERATED_ID_PREFIX, now.format("%Y%m%d%H%M%S"))
}

fn str_field<'v>(value: &'v Value, key: &str) -> Option<&'v str> {
    value.get(key).and_then(Value::as_str)
}

fn object_field<'v>(value: &'v Value, key: &str) -> Option<&'v Map<String, Value>> {
    value.get(key).and_then(Value::as_object)
}

/// Fold `[{key, value}]` pairs into a config map. Later duplicates win;
/// entries without a non-empty string key are skipped.
fn collect_features(features: Option<&Value>) -> ChangeConfig {
    let mut config = ChangeConfig::new();
    let Some(items) = features.and_then(Value::as_array) else {
        return config;
    };

    for item in items {
        let Some(key) = item.get("key").and_then(Value::as_str) else {
            continue;
        };
        if key.is_empty() {
            continue;
        }
        let value = item.get("value").cloned().unwrap_or(Value::Null);
        config.insert(key.to_string(), value);
    }
    config
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
