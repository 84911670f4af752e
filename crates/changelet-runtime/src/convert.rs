//! Deployment-values conversion.
//!
//! Projects a validated changeset onto a nested deployment-values document.
//! Changes apply in array order and later writes to the same path win.
//!
//! | action    | effect |
//! |-----------|--------|
//! | `scale`   | `<svc>.replicas = config.replicas` when present |
//! | `enable`  | `<svc>.enabled = true`, then every config key |
//! | `update`  | every config key |
//! | `disable` | `<svc>.enabled = false` |
//! | `delete`  | `<svc>.delete = true` |
//!
//! A config key goes to its mapped path when the mapping table has one and to
//! `<svc>.<key>` otherwise.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use changelet_core::{Action, Change, ChangeSet, MappingTable};

/// Config key read by `scale`.
pub const REPLICAS_KEY: &str = "replicas";

/// Nested values document keyed by service identifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeploymentValues(Map<String, Value>);

impl DeploymentValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign `value` at a dotted path, creating intermediate containers.
    ///
    /// A non-container value sitting on an intermediate segment is replaced by
    /// a container.
    pub fn set_path(&mut self, path: &str, value: Value) {
        let segments: Vec<&str> = path.split('.').collect();
        insert_at(&mut self.0, &segments, value);
    }

    /// Value at a dotted path, if present.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        segments.try_fold(self.0.get(first)?, |current, segment| current.get(segment))
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// YAML rendering in insertion order.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&self.0)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.0)
    }
}

fn insert_at(map: &mut Map<String, Value>, segments: &[&str], value: Value) {
    match segments {
        [] => {}
        [last] => {
            map.insert((*last).to_string(), value);
        }
        [head, rest @ ..] => {
            let slot = map
                .entry((*head).to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(child) = slot {
                insert_at(child, rest, value);
            } else {
                let mut child = Map::new();
                insert_at(&mut child, rest, value);
                *slot = Value::Object(child);
            }
        }
    }
}

pub struct Converter<'a> {
    mapping: &'a MappingTable,
}

impl<'a> Converter<'a> {
    pub fn new(mapping: &'a MappingTable) -> Self {
        Self { mapping }
    }

    /// Convert every change of `changeset`. Does not re-validate.
    pub fn convert(&self, changeset: &ChangeSet) -> DeploymentValues {
        let mut values = DeploymentValues::new();
        for change in &changeset.changes {
            self.apply(&mut values, change);
        }
        tracing::debug!(
            changeset_id = changeset.id.as_deref().unwrap_or("-"),
            touched = ?changeset.touched_services(),
            services = values.as_map().len(),
            "Converted changeset to deployment values"
        );
        values
    }

    /// Apply a single change onto `values`.
    pub fn apply(&self, values: &mut DeploymentValues, change: &Change) {
        let service = change.service.as_str();
        match change.action {
            Action::Scale => {
                if let Some(replicas) = change.config.get(REPLICAS_KEY) {
                    values.set_path(&format!("{}.{}", service, REPLICAS_KEY), replicas.clone());
                }
            }
            Action::Enable => {
                values.set_path(&format!("{}.enabled", service), Value::Bool(true));
                self.apply_config(values, change);
            }
            Action::Update => self.apply_config(values, change),
            Action::Disable => {
                values.set_path(&format!("{}.enabled", service), Value::Bool(false));
            }
            Action::Delete => {
                values.set_path(&format!("{}.delete", service), Value::Bool(true));
            }
        }
    }

    fn apply_config(&self, values: &mut DeploymentValues, change: &Change) {
        for (key, value) in &change.config {
            match self.mapping.lookup(&change.service, key) {
                Some(path) => values.set_path(path, value.clone()),
                None => values.set_path(&format!("{}.{}", change.service, key), value.clone()),
            }
        }
    }
}

/// Convert with `mapping`.
pub fn convert(changeset: &ChangeSet, mapping: &MappingTable) -> DeploymentValues {
    Converter::new(mapping).convert(changeset)
}
