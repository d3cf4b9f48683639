//! End-to-end staging of a bound application
//!
//! Exercises the complete flow over the shared fixtures: load server.xml ->
//! parse bindings -> apply plugins -> write runtime variables -> save.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use pretty_assertions::assert_eq;
use srvconf_merge::{MergeOutcome, get_api_visibility, get_features};
use srvconf_services::{
    DefaultFlattener, FileRepositoryIndex, ServiceBinding, ServicePlugin, flatten_binding,
    load_plugins, parse_vcap_services, write_runtime_variables,
};
use srvconf_tree::{Document, io};
use tempfile::TempDir;

/// tests/integration -> ../../test-fixtures/staging
fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../test-fixtures/staging")
}

struct Staging {
    _dir: TempDir,
    server: PathBuf,
    bindings: Vec<ServiceBinding>,
    plugins: Vec<ServicePlugin>,
}

fn setup() -> Staging {
    let dir = TempDir::new().unwrap();
    let server = dir.path().join("server.xml");
    fs::copy(fixtures().join("server.xml"), &server).unwrap();

    let vcap = fs::read_to_string(fixtures().join("vcap.json")).unwrap();
    Staging {
        _dir: dir,
        server,
        bindings: parse_vcap_services(&vcap).unwrap(),
        plugins: load_plugins(&fixtures().join("plugins")).unwrap(),
    }
}

/// Apply every matching plugin; returns outcomes keyed by "plugin/service".
fn stage(doc: &mut Document, staging: &Staging) -> Vec<(String, Vec<MergeOutcome>)> {
    let mut applied = Vec::new();
    for binding in &staging.bindings {
        let props = flatten_binding(binding, &DefaultFlattener);
        for plugin in &staging.plugins {
            if plugin.matches(binding).unwrap() {
                let outcomes = plugin.apply(doc, binding, &props).unwrap();
                applied.push((format!("{}/{}", plugin.name, binding.name), outcomes));
            }
        }
    }
    applied
}

#[test]
fn test_plugins_load_in_file_order() {
    let staging = setup();
    let names: Vec<_> = staging.plugins.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["mysql", "postgresql"]);
}

#[test]
fn test_full_staging_flow() {
    let staging = setup();
    let mut doc = io::load(&staging.server).unwrap();

    let applied = stage(&mut doc, &staging);

    use MergeOutcome::{Changed, Unchanged};
    assert_eq!(
        applied,
        vec![
            (
                "mysql/orders-db".to_string(),
                vec![Changed, Changed, Changed, Changed]
            ),
            (
                "postgresql/audit-db".to_string(),
                vec![Unchanged, Changed, Changed]
            ),
        ]
    );

    let features: Vec<_> = get_features(&doc).into_iter().collect();
    assert_eq!(features, vec!["jdbc-4.1", "servlet-3.1"]);

    let classloader = doc.descendants("classloader")[0];
    assert_eq!(
        doc.attribute(classloader, "commonLibraryRef"),
        Some("shared,mysql-library,postgresql-library")
    );
    assert_eq!(get_api_visibility(&doc), Some("spec,ibm-api,api"));

    let props = doc.descendants("properties")[0];
    let attrs: Vec<_> = doc.node(props).attributes().collect();
    assert_eq!(
        attrs,
        vec![
            ("id", "orders-db-props"),
            ("serverName", "${cloud.services.orders-db.connection.hostname}"),
            ("portNumber", "${cloud.services.orders-db.connection.port}"),
            ("user", "${cloud.services.orders-db.connection.username}"),
        ]
    );

    io::save(&staging.server, &doc).unwrap();
    let saved = fs::read_to_string(&staging.server).unwrap();
    assert!(saved.contains("<!-- Enable features -->"));
    assert!(saved.contains(r#"<dataSource id="audit-db" url="${cloud.services.audit-db.connection.uri}"/>"#));
}

#[test]
fn test_second_staging_is_a_noop() {
    let staging = setup();
    let mut doc = io::load(&staging.server).unwrap();
    stage(&mut doc, &staging);
    let first = doc.render().unwrap();
    let revision = doc.revision();

    let applied = stage(&mut doc, &staging);

    assert!(
        applied
            .iter()
            .flat_map(|(_, outcomes)| outcomes)
            .all(|o| *o == MergeOutcome::Unchanged)
    );
    assert_eq!(doc.revision(), revision);
    assert_eq!(doc.render().unwrap(), first);
}

#[test]
fn test_saved_document_reloads_identically() {
    let staging = setup();
    let mut doc = io::load(&staging.server).unwrap();
    stage(&mut doc, &staging);
    io::save(&staging.server, &doc).unwrap();

    let reloaded = io::load(&staging.server).unwrap();
    assert_eq!(reloaded.render().unwrap(), doc.render().unwrap());
}

#[test]
fn test_client_drivers_resolve() {
    let staging = setup();
    let repository = FileRepositoryIndex::new(fixtures());
    let urls = BTreeMap::new();

    let drivers: Vec<_> = staging
        .plugins
        .iter()
        .map(|p| p.client_driver_url(&urls, &repository).unwrap())
        .collect();

    assert_eq!(
        drivers,
        vec![
            Some("https://repo.example.net/mysql/mysql-connector-java-5.1.40.jar".to_string()),
            Some("https://repo.example.net/postgresql/postgresql-9.4.1212.jar".to_string()),
        ]
    );
}

#[test]
fn test_runtime_variables_for_all_bindings() {
    let staging = setup();
    let mut vars_doc = Document::new("server");
    let vars: BTreeMap<_, _> = staging
        .bindings
        .iter()
        .flat_map(|b| flatten_binding(b, &DefaultFlattener))
        .collect();

    assert_eq!(write_runtime_variables(&mut vars_doc, &vars), MergeOutcome::Changed);
    assert_eq!(write_runtime_variables(&mut vars_doc, &vars), MergeOutcome::Unchanged);

    let rendered = vars_doc.render().unwrap();
    assert!(rendered.contains(
        r#"<variable name="cloud.services.audit-db.connection.max_conns" value="5"/>"#
    ));
    assert!(rendered.contains(
        r#"<variable name="cloud.services.orders-db.tags" value="mysql, relational"/>"#
    ));
    assert_eq!(vars_doc.descendants("variable").len(), vars.len());
}
