//! Tests for service-binding translation

use std::collections::BTreeMap;

use pretty_assertions::assert_eq;
use serde_json::Value;
use srvconf_merge::MergeOutcome;
use srvconf_services::{
    DefaultFlattener, Error, flatten_binding, parse_vcap_services, write_runtime_variables,
};
use srvconf_tree::Document;

const VCAP: &str = r#"{
    "mysql": [{
        "name": "orders-db",
        "label": "mysql",
        "plan": "small",
        "tags": ["mysql", "relational"],
        "credentials": {
            "host": "10.0.0.5",
            "port": 3306,
            "uri": "mysql://10.0.0.5:3306/orders"
        }
    }],
    "cloudant": [{
        "name": "docs",
        "credentials": { "url": "https://docs.example" }
    }]
}"#;

fn vars(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_bindings_grouped_by_label() {
    let bindings = parse_vcap_services(VCAP).unwrap();

    let names: Vec<_> = bindings
        .iter()
        .map(|b| (b.label.as_str(), b.name.as_str()))
        .collect();
    assert_eq!(names, vec![("cloudant", "docs"), ("mysql", "orders-db")]);
}

#[test]
fn test_instance_without_name_is_malformed() {
    let err = parse_vcap_services(r#"{"mysql": [{"plan": "small"}]}"#).unwrap_err();
    assert!(matches!(err, Error::MalformedBindings { .. }));
}

#[test]
fn test_not_json_is_malformed() {
    let err = parse_vcap_services("mysql: []").unwrap_err();
    assert!(matches!(err, Error::MalformedBindings { .. }));
}

#[test]
fn test_flatten_default() {
    let bindings = parse_vcap_services(VCAP).unwrap();
    let mysql = bindings.iter().find(|b| b.name == "orders-db").unwrap();

    let flat = flatten_binding(mysql, &DefaultFlattener);

    assert_eq!(
        flat,
        vars(&[
            ("cloud.services.orders-db.connection.host", "10.0.0.5"),
            ("cloud.services.orders-db.connection.port", "3306"),
            (
                "cloud.services.orders-db.connection.uri",
                "mysql://10.0.0.5:3306/orders"
            ),
            ("cloud.services.orders-db.label", "mysql"),
            ("cloud.services.orders-db.name", "orders-db"),
            ("cloud.services.orders-db.plan", "small"),
            ("cloud.services.orders-db.tags", "mysql, relational"),
        ])
    );
}

#[test]
fn test_flatten_with_custom_closure() {
    let bindings = parse_vcap_services(VCAP).unwrap();
    let mysql = bindings.iter().find(|b| b.name == "orders-db").unwrap();

    let only_numbers = |_key: &str, value: &Value| value.as_u64().map(|n| format!("#{n}"));
    let flat = flatten_binding(mysql, &only_numbers);

    assert_eq!(
        flat.get("cloud.services.orders-db.connection.port").map(String::as_str),
        Some("#3306")
    );
    assert!(!flat.contains_key("cloud.services.orders-db.tags"));
    // Strings never reach the flattener.
    assert_eq!(
        flat.get("cloud.services.orders-db.plan").map(String::as_str),
        Some("small")
    );
}

#[test]
fn test_runtime_variables_appended_then_updated() {
    let mut doc = Document::parse(r#"<server><variable name="keep" value="1"/></server>"#).unwrap();

    let outcome = write_runtime_variables(&mut doc, &vars(&[("a", "x"), ("keep", "1")]));
    assert_eq!(outcome, MergeOutcome::Changed);

    let again = write_runtime_variables(&mut doc, &vars(&[("a", "x"), ("keep", "1")]));
    assert_eq!(again, MergeOutcome::Unchanged);

    write_runtime_variables(&mut doc, &vars(&[("a", "y")]));
    let rendered = doc.render().unwrap();
    assert!(rendered.contains(r#"<variable name="a" value="y"/>"#));
    assert!(rendered.contains(r#"<variable name="keep" value="1"/>"#));
    assert_eq!(doc.descendants("variable").len(), 2);
}
