//! Structural gate: JSON Schema validation of changeset documents.
//!
//! The schema is compiled once and shared by reference across validations.

use serde_json::Value;

use changelet_core::ChangeSet;

use crate::error::ValidationError;

/// Embedded ChangeSet schema, compiled into the binary so validation works
/// without external files.
pub const EMBEDDED_CHANGESET_SCHEMA: &str =
    include_str!("../../../schemas/ChangeSet.schema.json");

/// Errors building a [`ChangeSetSchema`].
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("failed to parse ChangeSet schema: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to compile ChangeSet schema: {0}")]
    Compile(String),
}

/// A compiled ChangeSet schema (draft-07).
pub struct ChangeSetSchema {
    validator: jsonschema::Validator,
}

impl std::fmt::Debug for ChangeSetSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeSetSchema").finish_non_exhaustive()
    }
}

impl ChangeSetSchema {
    /// Compile a schema document.
    pub fn compile(schema: &Value) -> Result<Self, SchemaError> {
        let validator = jsonschema::draft7::options()
            .build(schema)
            .map_err(|e| SchemaError::Compile(e.to_string()))?;
        Ok(Self { validator })
    }

    /// Parse and compile a schema from JSON text.
    pub fn from_json(content: &str) -> Result<Self, SchemaError> {
        let schema: Value = serde_json::from_str(content)?;
        Self::compile(&schema)
    }

    /// The schema shipped with this crate.
    pub fn embedded() -> Result<Self, SchemaError> {
        Self::from_json(EMBEDDED_CHANGESET_SCHEMA)
    }

    /// Every violation in `document`, sorted by instance path.
    pub fn violations(&self, document: &Value) -> Vec<ValidationError> {
        let mut found: Vec<(Vec<PathSegment>, ValidationError)> = self
            .validator
            .iter_errors(document)
            .map(|error| {
                let pointer = error.instance_path().to_string();
                let segments = parse_pointer(&pointer);
                let path = join_segments(&segments);
                (segments, ValidationError::structural(&path, &error))
            })
            .collect();

        // Stable: violations at the same path keep the validator's order.
        found.sort_by(|a, b| a.0.cmp(&b.0));
        found.into_iter().map(|(_, e)| e).collect()
    }

    /// Check `document` and, if it conforms, decode it into a [`ChangeSet`].
    ///
    /// A document can satisfy a loose caller-supplied schema yet still fail to
    /// decode (for example an unparseable timestamp); that is reported as a
    /// root-level structural violation.
    pub fn check(&self, document: &Value) -> Result<ChangeSet, Vec<ValidationError>> {
        let violations = self.violations(document);
        if !violations.is_empty() {
            return Err(violations);
        }

        serde_json::from_value::<ChangeSet>(document.clone())
            .map_err(|e| vec![ValidationError::structural("", e)])
    }
}

/// One step of an instance path. Array indices order numerically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum PathSegment {
    Index(u64),
    Key(String),
}

impl PathSegment {
    fn as_string(&self) -> String {
        match self {
            PathSegment::Index(i) => i.to_string(),
            PathSegment::Key(k) => k.clone(),
        }
    }
}

fn parse_pointer(pointer: &str) -> Vec<PathSegment> {
    let trimmed = pointer.strip_prefix('/').unwrap_or(pointer);
    if trimmed.is_empty() {
        return Vec::new();
    }

    trimmed
        .split('/')
        .map(|raw| {
            let token = raw.replace("~1", "/").replace("~0", "~");
            match token.parse::<u64>() {
                Ok(i) => PathSegment::Index(i),
                Err(_) => PathSegment::Key(token),
            }
        })
        .collect()
}

fn join_segments(segments: &[PathSegment]) -> String {
    segments
        .iter()
        .map(PathSegment::as_string)
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_document() -> Value {
        json!({
            "id": "chg-1",
            "intent": "scale_order",
            "timestamp": "2025-01-01T00:00:00+00:00",
            "request_context": {"tenant_id": "t", "requested_by": "me", "role": "admin"},
            "changes": [{"action": "scale", "service": "order", "config": {"replicas": 3}}],
            "impacted_services": ["order"],
            "metadata": {"confidence": 0.9, "risk": "low"}
        })
    }

    #[test]
    fn embedded_schema_compiles() {
        assert!(ChangeSetSchema::embedded().is_ok());
    }

    #[test]
    fn invalid_schema_is_a_compile_error() {
        let err = ChangeSetSchema::compile(&json!({"type": 12})).unwrap_err();
        assert!(matches!(err, SchemaError::Compile(_)));
    }

    #[test]
    fn valid_document_decodes() {
        let schema = ChangeSetSchema::embedded().unwrap();
        let cs = schema.check(&valid_document()).unwrap();
        assert_eq!(cs.changes.len(), 1);
        assert_eq!(cs.changes[0].config["replicas"], 3);
    }

    #[test]
    fn missing_top_level_fields_are_reported_at_root() {
        let schema = ChangeSetSchema::embedded().unwrap();
        let errors = schema.check(&json!({"intent": "x"})).unwrap_err();

        assert_eq!(errors.len(), 4);
        for e in &errors {
            assert!(e.message.starts_with(": "), "unexpected: {}", e.message);
            assert!(e.message.contains("required"));
        }
    }

    #[test]
    fn violations_are_sorted_by_path() {
        let schema = ChangeSetSchema::embedded().unwrap();
        let mut doc = valid_document();
        doc["metadata"]["risk"] = json!("extreme");
        doc["changes"] = json!([
            {"action": "scale", "service": "order"},
            {"service": "payment"},
            {"action": "explode", "service": "billing"}
        ]);
        for i in 3..11 {
            doc["changes"]
                .as_array_mut()
                .unwrap()
                .push(json!({"action": "scale", "service": format!("svc{}", i)}));
        }
        doc["changes"][10] = json!({"action": "scale"});

        let messages: Vec<String> = schema
            .violations(&doc)
            .into_iter()
            .map(|e| e.message)
            .collect();

        let paths: Vec<&str> = messages
            .iter()
            .map(|m| m.split(": ").next().unwrap())
            .collect();
        assert_eq!(
            paths,
            vec!["changes/1", "changes/2/action", "changes/10", "metadata/risk"]
        );
    }

    #[test]
    fn timestamp_shape_is_left_to_the_schema() {
        let schema = ChangeSetSchema::embedded().unwrap();
        for timestamp in ["2025-01-01T00:00:00", "2025-01-01", "2025-01-01T00:00:00.5+02:00"] {
            let mut doc = valid_document();
            doc["timestamp"] = json!(timestamp);

            let cs = schema.check(&doc).unwrap();
            assert_eq!(cs.timestamp, timestamp);
        }
    }

    #[test]
    fn empty_timestamp_is_reported_at_its_path() {
        let schema = ChangeSetSchema::embedded().unwrap();
        let mut doc = valid_document();
        doc["timestamp"] = json!("");

        let errors = schema.check(&doc).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, crate::ValidationErrorKind::Structural);
        assert!(errors[0].message.starts_with("timestamp: "), "{}", errors[0].message);
    }

    #[test]
    fn loose_schema_decode_failure_is_root_structural() {
        let schema = ChangeSetSchema::compile(&json!({"type": "object"})).unwrap();

        let errors = schema.check(&json!({"intent": "x"})).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.starts_with(": "));
        assert!(errors[0].message.contains("missing field"));
    }

    #[test]
    fn pointer_parsing_unescapes_tokens() {
        let segments = parse_pointer("/changes/0/config/a~1b~0c");
        assert_eq!(join_segments(&segments), "changes/0/config/a/b~c");
        assert!(parse_pointer("").is_empty());
    }
}
