//! Logical stanza behaviour over a realistic split configuration

use std::path::PathBuf;

use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};
use srvconf_merge::stanza::stanza;
use srvconf_merge::{
    MergeOutcome, SkipReason, find_and_update_attribute, find_attribute, is_logical_singleton,
    merge_stanza,
};
use srvconf_tree::{Document, io};

#[fixture]
fn server() -> Document {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../test-fixtures/staging/server.xml");
    io::load(&path).unwrap()
}

#[rstest]
fn test_split_logging_is_one_unit(server: Document) {
    let logging = stanza(&server, "logging");

    assert_eq!(logging.len(), 2);
    assert!(is_logical_singleton(&server, &logging));
    assert_eq!(find_attribute(&server, &logging, "maxFiles"), Some("2"));
    assert_eq!(
        find_attribute(&server, &logging, "traceSpecification"),
        Some("*=info")
    );
}

#[rstest]
fn test_update_lands_where_the_attribute_lives(mut server: Document) {
    let logging = stanza(&server, "logging");

    assert!(find_and_update_attribute(&mut server, &logging, "maxFiles", "10"));
    assert!(find_and_update_attribute(&mut server, &logging, "consoleLogLevel", "INFO"));

    assert_eq!(server.attribute(logging[0], "maxFiles"), Some("10"));
    assert_eq!(server.attribute(logging[1], "maxFiles"), None);
    assert_eq!(server.attribute(logging[0], "consoleLogLevel"), None);
    assert_eq!(server.attribute(logging[1], "consoleLogLevel"), Some("INFO"));
}

#[rstest]
fn test_diverging_partitions_converge(mut server: Document) {
    let logging = stanza(&server, "logging");
    server.set_attribute(logging[1], "maxFiles", "7");
    assert_eq!(find_attribute(&server, &logging, "maxFiles"), Some("7"));

    merge_stanza(&mut server, "logging", Some("log"), &[("maxFiles", "3")]);

    assert_eq!(server.attribute(logging[0], "maxFiles"), Some("3"));
    assert_eq!(server.attribute(logging[1], "maxFiles"), Some("3"));
}

#[rstest]
fn test_conflicting_ids_are_left_alone(mut server: Document) {
    let root = server.root();
    let stray = server.append_element(root, "logging");
    server.set_attribute(stray, "id", "other");
    let before = server.render().unwrap();

    let outcome = merge_stanza(&mut server, "logging", None, &[("maxFiles", "3")]);

    assert_eq!(
        outcome,
        MergeOutcome::Skipped {
            reason: SkipReason::AmbiguousStanza {
                tag: "logging".to_string(),
                found: 3
            }
        }
    );
    assert_eq!(server.render().unwrap(), before);
}

#[rstest]
#[case::same_value("2", MergeOutcome::Unchanged)]
#[case::new_value("4", MergeOutcome::Changed)]
fn test_merge_reports_effective_change(
    mut server: Document,
    #[case] value: &str,
    #[case] expected: MergeOutcome,
) {
    let outcome = merge_stanza(&mut server, "logging", Some("log"), &[("maxFiles", value)]);
    assert_eq!(outcome, expected);
}
