//! Service bindings and their flattened runtime variables.
//!
//! A binding's properties become `cloud.services.<name>.<property>`; entries
//! of its `credentials` object become
//! `cloud.services.<name>.connection.<property>`.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use srvconf_merge::{MergeOutcome, find_and_update_attribute};
use srvconf_tree::Document;
use tracing::debug;

use crate::error::{Error, Result};

const CREDENTIALS: &str = "credentials";
const VARIABLE: &str = "variable";

/// One bound service instance.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceBinding {
    /// Service offering the instance was created from (the `VCAP_SERVICES` key).
    pub label: String,
    /// Instance name, unique within an application.
    pub name: String,
    /// Every property of the instance, `credentials` included.
    pub properties: Map<String, Value>,
}

impl ServiceBinding {
    pub fn credentials(&self) -> Option<&Map<String, Value>> {
        self.properties.get(CREDENTIALS).and_then(Value::as_object)
    }

    /// Whether the instance carries `tag` in its `tags` list.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.properties
            .get("tags")
            .and_then(Value::as_array)
            .is_some_and(|tags| tags.iter().any(|t| t.as_str() == Some(tag)))
    }
}

/// Parse a `VCAP_SERVICES` document: service label to list of instances.
///
/// Instances are returned grouped by label in label order.
pub fn parse_vcap_services(source: &str) -> Result<Vec<ServiceBinding>> {
    let services: BTreeMap<String, Vec<Map<String, Value>>> =
        serde_json::from_str(source).map_err(|e| Error::MalformedBindings {
            message: e.to_string(),
        })?;

    let mut bindings = Vec::new();
    for (label, instances) in services {
        for properties in instances {
            let name = properties
                .get("name")
                .and_then(Value::as_str)
                .ok_or_else(|| Error::MalformedBindings {
                    message: format!("a {label} instance has no name"),
                })?
                .to_string();
            bindings.push(ServiceBinding {
                label: label.clone(),
                name,
                properties,
            });
        }
    }
    Ok(bindings)
}

/// Renders non-string property values as variable text.
///
/// Returning `None` drops the property.
pub trait ValueFlattener {
    fn flatten(&self, key: &str, value: &Value) -> Option<String>;
}

impl<F> ValueFlattener for F
where
    F: Fn(&str, &Value) -> Option<String>,
{
    fn flatten(&self, key: &str, value: &Value) -> Option<String> {
        self(key, value)
    }
}

/// Lists are joined with `", "`, numbers and booleans use their JSON text,
/// nulls and objects are dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultFlattener;

impl ValueFlattener for DefaultFlattener {
    fn flatten(&self, _key: &str, value: &Value) -> Option<String> {
        match value {
            Value::Array(items) => Some(
                items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            Value::Number(_) | Value::Bool(_) => Some(value.to_string()),
            Value::String(s) => Some(s.clone()),
            Value::Null | Value::Object(_) => None,
        }
    }
}

/// Flatten a binding into runtime variables.
pub fn flatten_binding(
    binding: &ServiceBinding,
    flattener: &dyn ValueFlattener,
) -> BTreeMap<String, String> {
    let prefix = format!("cloud.services.{}", binding.name);
    let mut vars = BTreeMap::new();

    for (key, value) in &binding.properties {
        if let (CREDENTIALS, Value::Object(credentials)) = (key.as_str(), value) {
            for (cred_key, cred_value) in credentials {
                if let Some(text) = flatten_value(cred_key, cred_value, flattener) {
                    vars.insert(format!("{prefix}.connection.{cred_key}"), text);
                }
            }
        } else if let Some(text) = flatten_value(key, value, flattener) {
            vars.insert(format!("{prefix}.{key}"), text);
        }
    }

    vars
}

fn flatten_value(key: &str, value: &Value, flattener: &dyn ValueFlattener) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        other => flattener.flatten(key, other),
    }
}

/// Write variables as `<variable name=".." value=".."/>` under the root.
///
/// Variables already declared get their value updated wherever declared;
/// others are appended.
pub fn write_runtime_variables(doc: &mut Document, vars: &BTreeMap<String, String>) -> MergeOutcome {
    let mut changed = false;

    for (name, value) in vars {
        let declared: Vec<_> = doc
            .descendants(VARIABLE)
            .into_iter()
            .filter(|&var| doc.attribute(var, "name") == Some(name.as_str()))
            .collect();

        if declared.is_empty() {
            let root = doc.root();
            let var = doc.append_element(root, VARIABLE);
            doc.set_attribute(var, "name", name);
            doc.set_attribute(var, "value", value);
            changed = true;
        } else {
            changed |= find_and_update_attribute(doc, &declared, "value", value);
        }
    }

    debug!(count = vars.len(), changed, "Wrote runtime variables");
    if changed {
        MergeOutcome::Changed
    } else {
        MergeOutcome::Unchanged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_flattener_joins_lists() {
        let value = json!(["a", 1, true]);
        assert_eq!(
            DefaultFlattener.flatten("hosts", &value),
            Some("a, 1, true".to_string())
        );
    }

    #[test]
    fn default_flattener_drops_nested_objects() {
        assert_eq!(DefaultFlattener.flatten("x", &json!({"a": 1})), None);
        assert_eq!(DefaultFlattener.flatten("x", &Value::Null), None);
    }

    #[test]
    fn has_tag() {
        let binding = ServiceBinding {
            label: "mysql".into(),
            name: "db".into(),
            properties: json!({"tags": ["relational", "mysql"]})
                .as_object()
                .cloned()
                .unwrap_or_default(),
        };
        assert!(binding.has_tag("relational"));
        assert!(!binding.has_tag("nosql"));
    }
}
