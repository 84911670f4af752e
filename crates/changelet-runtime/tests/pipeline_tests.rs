//! End-to-end tests for the changelet pipeline.
//!
//! Run with: cargo test --package changelet-runtime --test pipeline_tests

use std::fs;
use std::path::Path;

use changelet_core::{ChangeletConfig, ValidationStatus};
use changelet_runtime::{Pipeline, PipelineError};
use serde_json::json;

const CATALOGUE_YAML: &str = r#"
services:
  - id: payment
    name: payment
  - id: order
    name: order
    dependencies: [inventory, payment]
  - id: inventory
    name: inventory
  - id: recommendation
    name: recommendation
    dependencies: [catalogue]
  - id: catalogue
    name: catalogue
"#;

const MAPPING_YAML: &str = r#"
mappings:
  payment:
    timeout: payment.config.timeoutSeconds
    currency: payment.config.currency
  order:
    workers: order.worker.count
  inventory:
"#;

fn write_fixtures(dir: &Path, config: &str) -> std::path::PathBuf {
    fs::write(dir.join("catalogue.yaml"), CATALOGUE_YAML).unwrap();
    fs::write(dir.join("mapping.yaml"), MAPPING_YAML).unwrap();
    let config_path = dir.join("changelet.yaml");
    fs::write(&config_path, config).unwrap();
    config_path
}

fn pipeline_with(config: &str) -> Pipeline {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixtures(dir.path(), config);
    let config = ChangeletConfig::load_with_context(&path).unwrap();
    Pipeline::from_config(&config).unwrap()
}

fn default_pipeline() -> Pipeline {
    pipeline_with("catalogue: catalogue.yaml\nmapping: mapping.yaml\n")
}

// =============================================================================
// Loading
// =============================================================================

#[test]
fn test_from_config_resolves_relative_paths() {
    let pipeline = default_pipeline();
    assert_eq!(pipeline.catalogue().services.len(), 5);
    assert_eq!(
        pipeline.mapping().lookup("payment", "timeout"),
        Some("payment.config.timeoutSeconds")
    );
    assert!(pipeline.mapping().mappings["inventory"].0.is_empty());
}

#[test]
fn test_from_config_missing_catalogue() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("mapping.yaml"), MAPPING_YAML).unwrap();
    let config_path = dir.path().join("changelet.yaml");
    fs::write(&config_path, "catalogue: nowhere.yaml\nmapping: mapping.yaml\n").unwrap();

    let config = ChangeletConfig::load_with_context(&config_path).unwrap();
    let err = Pipeline::from_config(&config).unwrap_err();
    assert!(matches!(err, PipelineError::Config(_)));
}

#[test]
fn test_from_config_custom_schema() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixtures(
        dir.path(),
        "catalogue: catalogue.yaml\nmapping: mapping.yaml\nschema: strict.schema.json\n",
    );
    // Same shape as the built-in schema but caps the number of changes.
    let strict = json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object",
        "required": ["intent", "timestamp", "request_context", "changes", "metadata"],
        "properties": {
            "changes": {"type": "array", "minItems": 1, "maxItems": 1}
        }
    });
    fs::write(
        dir.path().join("strict.schema.json"),
        serde_json::to_string(&strict).unwrap(),
    )
    .unwrap();

    let config = ChangeletConfig::load_with_context(&path).unwrap();
    let pipeline = Pipeline::from_config(&config).unwrap();

    let result = pipeline.validate(&json!({
        "intent": "update_config",
        "timestamp": "2025-01-01T00:00:00Z",
        "request_context": {"tenant_id": "t", "requested_by": "me", "role": "admin"},
        "changes": [
            {"action": "update", "service": "payment", "config": {}},
            {"action": "update", "service": "order", "config": {}}
        ],
        "metadata": {"confidence": 0.9, "risk": "low"}
    }));

    assert_eq!(result.status, ValidationStatus::Rejected);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].starts_with("changes: "));
}

#[test]
fn test_from_config_invalid_schema_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixtures(
        dir.path(),
        "catalogue: catalogue.yaml\nmapping: mapping.yaml\nschema: broken.schema.json\n",
    );
    fs::write(dir.path().join("broken.schema.json"), r#"{"type": 12}"#).unwrap();

    let config = ChangeletConfig::load_with_context(&path).unwrap();
    let err = Pipeline::from_config(&config).unwrap_err();
    assert!(matches!(err, PipelineError::Schema(_)));
}

// =============================================================================
// End to end
// =============================================================================

#[test]
fn test_run_timeout_change() {
    let outcome = default_pipeline().run(&json!({
        "proposal_text": "Set payment timeout to 30 seconds and charge in EUR",
        "changeset": {
            "model": "payment_service",
            "features": [
                {"key": "timeout", "value": 30},
                {"key": "currency", "value": "EUR"},
                {"key": "retries", "value": 2}
            ]
        },
        "metadata": {"intent": "change_timeout", "confidence": 0.92, "risk": "low"}
    }));

    assert_eq!(outcome.validation.status, ValidationStatus::Validated);
    assert!(outcome.validation.errors.is_empty());
    assert!(outcome.validation.warnings.is_empty());
    assert_eq!(
        outcome.values.unwrap().into_value(),
        json!({
            "payment": {
                "config": {"timeoutSeconds": 30, "currency": "EUR"},
                "retries": 2
            }
        })
    );
}

#[test]
fn test_run_enable_with_dependencies_requires_human() {
    let outcome = default_pipeline().run(&json!({
        "changeset": {"model": "order_service", "features": [{"key": "workers", "value": 4}]},
        "metadata": {"intent": "enable_order_processing", "confidence": 0.95}
    }));

    assert_eq!(outcome.validation.status, ValidationStatus::RequiresHuman);
    assert_eq!(
        outcome.validation.warnings,
        vec![
            "Dependency check: order depends on inventory (runtime check needed).".to_string(),
            "Dependency check: order depends on payment (runtime check needed).".to_string(),
        ]
    );
    assert_eq!(
        outcome.values.unwrap().into_value(),
        json!({"order": {"enabled": true, "worker": {"count": 4}}})
    );
}

#[test]
fn test_run_high_risk_and_low_confidence() {
    let pipeline = default_pipeline();

    let high = pipeline.run(&json!({
        "changeset": {"model": "payment"},
        "metadata": {"intent": "update_limits", "confidence": 0.3, "risk": "high"}
    }));
    assert_eq!(high.validation.status, ValidationStatus::RequiresHuman);
    assert_eq!(
        high.validation.warnings,
        vec!["High risk operation (risk=high) requires human approval.".to_string()]
    );

    let unsure = pipeline.run(&json!({
        "changeset": {"model": "payment"},
        "metadata": {"intent": "update_limits", "confidence": 0.5}
    }));
    assert_eq!(unsure.validation.status, ValidationStatus::RequiresHuman);
    assert_eq!(
        unsure.validation.warnings,
        vec!["Low confidence (0.5) - human review recommended.".to_string()]
    );
}

#[test]
fn test_run_unknown_service_rejected() {
    let outcome = default_pipeline().run(&json!({
        "changeset": {"model": "shipping_service"},
        "metadata": {"intent": "update_rates", "confidence": 0.9}
    }));

    assert_eq!(outcome.validation.status, ValidationStatus::Rejected);
    assert_eq!(
        outcome.validation.errors,
        vec!["Service not found in catalogue: shipping_service".to_string()]
    );
    assert!(outcome.values.is_none());
}

#[test]
fn test_run_unknown_risk_rejected_structurally() {
    let outcome = default_pipeline().run(&json!({
        "changeset": {"model": "payment"},
        "metadata": {"risk": "apocalyptic"}
    }));

    assert_eq!(outcome.validation.status, ValidationStatus::Rejected);
    assert!(outcome.validation.errors[0].starts_with("metadata/risk: "));
}

#[test]
fn test_config_policy_overrides_apply() {
    let pipeline = pipeline_with(
        r#"
catalogue: catalogue.yaml
mapping: mapping.yaml
policy:
  min_confidence: 0.95
normalizer:
  request_context:
    tenant_id: tenant-a
    requested_by: bot
    role: ops
"#,
    );

    let outcome = pipeline.run(&json!({
        "changeset": {"model": "payment"},
        "metadata": {"intent": "update_timeout", "confidence": 0.9}
    }));
    assert_eq!(outcome.changeset.request_context.role.as_deref(), Some("ops"));
    assert_eq!(outcome.validation.status, ValidationStatus::RequiresHuman);
    assert_eq!(
        outcome.validation.warnings,
        vec!["Low confidence (0.9) - human review recommended.".to_string()]
    );
}

#[test]
fn test_run_outcome_serializes() {
    let outcome = default_pipeline().run(&json!({
        "changeset": {"model": "inventory_service", "features": [{"key": "replicas", "value": 3}]},
        "metadata": {"intent": "scale_inventory", "confidence": 0.9}
    }));

    let doc = serde_json::to_value(&outcome).unwrap();
    assert_eq!(doc["validation"]["status"], json!("validated"));
    assert_eq!(doc["changeset"]["changes"][0]["action"], json!("scale"));
    assert_eq!(doc["values"], json!({"inventory": {"replicas": 3}}));
}

#[test]
fn test_concurrent_runs_share_one_pipeline() {
    let pipeline = default_pipeline();
    let inputs = [
        ("payment_service", "change_timeout", ValidationStatus::Validated),
        ("order_service", "enable_orders", ValidationStatus::RequiresHuman),
        ("shipping", "update_rates", ValidationStatus::Rejected),
        ("inventory_service", "scale_inventory", ValidationStatus::Validated),
    ];

    std::thread::scope(|scope| {
        let handles: Vec<_> = inputs
            .iter()
            .map(|(model, intent, expected)| {
                let pipeline = &pipeline;
                scope.spawn(move || {
                    for _ in 0..25 {
                        let outcome = pipeline.run(&json!({
                            "changeset": {"model": model},
                            "metadata": {"intent": intent, "confidence": 0.9}
                        }));
                        assert_eq!(outcome.validation.status, *expected, "model {}", model);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
    });
}
