//! Feature (capability) merges.
//!
//! The enabled feature set is every `feature` child of every
//! `featureManager` in the document. It is recomputed from the tree on each
//! call, never cached, because callers interleave merges freely. New
//! features always go into a single canonical manager: the first one found,
//! or one appended to the root.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use srvconf_tree::{Document, NodeId};
use tracing::debug;

use crate::error::{Error, Result};
use crate::outcome::MergeOutcome;

pub const FEATURE_MANAGER: &str = "featureManager";
pub const FEATURE: &str = "feature";

/// A declarative feature merge, as written in plugin configuration.
///
/// ```yaml
/// features: [jdbc-4.0]
/// ```
///
/// or
///
/// ```yaml
/// features:
///   if: [servlet-3.0]
///   then: [jdbc-4.0]
///   else: [jdbc-4.1]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureSpec {
    List(Vec<String>),
    Conditional(ConditionalFeatures),
}

/// Raw conditional expression. All three lists must be present; an empty
/// list is fine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConditionalFeatures {
    #[serde(rename = "if", default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub then: Option<Vec<String>>,
    #[serde(rename = "else", default, skip_serializing_if = "Option::is_none")]
    pub otherwise: Option<Vec<String>>,
}

impl ConditionalFeatures {
    /// Borrow the three lists, failing on the first one missing.
    pub fn require(&self) -> Result<(&[String], &[String], &[String])> {
        let condition = self
            .condition
            .as_deref()
            .ok_or(Error::IncompleteConditional { key: "if" })?;
        let then = self
            .then
            .as_deref()
            .ok_or(Error::IncompleteConditional { key: "then" })?;
        let otherwise = self
            .otherwise
            .as_deref()
            .ok_or(Error::IncompleteConditional { key: "else" })?;
        Ok((condition, then, otherwise))
    }
}

impl FeatureSpec {
    /// Interpret a loosely-typed value (JSON or YAML shaped).
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| Error::UnrecognizedExpression {
            message: e.to_string(),
        })
    }
}

/// The set of features currently enabled by the document.
pub fn get_features(doc: &Document) -> BTreeSet<String> {
    doc.descendants(FEATURE_MANAGER)
        .into_iter()
        .flat_map(|manager| doc.child_elements(manager, FEATURE))
        .filter_map(|feature| feature_name(doc, feature))
        .collect()
}

fn feature_name(doc: &Document, feature: NodeId) -> Option<String> {
    let name = doc.text(feature)?.trim();
    (!name.is_empty()).then(|| name.to_string())
}

/// Add every feature of `features` that is not already enabled.
///
/// New `feature` elements follow the order of `features`; repeats within
/// `features` are added once.
pub fn add_features<S: AsRef<str>>(doc: &mut Document, features: &[S]) -> Result<MergeOutcome> {
    let requested = validate(features)?;
    Ok(merge_validated(doc, &requested))
}

/// Add `then` if any feature of `condition` is enabled, otherwise `otherwise`.
///
/// All three lists are validated before the document is touched.
pub fn add_features_conditional<S: AsRef<str>>(
    doc: &mut Document,
    condition: &[S],
    then: &[S],
    otherwise: &[S],
) -> Result<MergeOutcome> {
    let condition = validate(condition)?;
    let then = validate(then)?;
    let otherwise = validate(otherwise)?;

    let current = get_features(doc);
    let matched = condition.iter().any(|f| current.contains(*f));
    debug!(matched, "Evaluated conditional feature merge");

    let chosen = if matched { &then } else { &otherwise };
    Ok(merge_validated(doc, chosen))
}

/// Apply a declarative feature merge.
pub fn apply_feature_spec(doc: &mut Document, spec: &FeatureSpec) -> Result<MergeOutcome> {
    match spec {
        FeatureSpec::List(features) => add_features(doc, features),
        FeatureSpec::Conditional(conditional) => {
            let (condition, then, otherwise) = conditional.require()?;
            add_features_conditional(doc, condition, then, otherwise)
        }
    }
}

fn validate<S: AsRef<str>>(features: &[S]) -> Result<Vec<&str>> {
    features
        .iter()
        .map(|f| {
            let name = f.as_ref().trim();
            if name.is_empty() {
                Err(Error::InvalidFeature {
                    token: f.as_ref().to_string(),
                })
            } else {
                Ok(name)
            }
        })
        .collect()
}

fn merge_validated(doc: &mut Document, requested: &[&str]) -> MergeOutcome {
    let mut present = get_features(doc);
    let missing: Vec<&str> = requested
        .iter()
        .copied()
        .filter(|name| present.insert((*name).to_string()))
        .collect();

    if missing.is_empty() {
        return MergeOutcome::Unchanged;
    }

    let manager = canonical_manager(doc);
    for name in missing {
        let feature = doc.append_element(manager, FEATURE);
        doc.set_text(feature, name);
        debug!(feature = name, "Added feature");
    }
    MergeOutcome::Changed
}

fn canonical_manager(doc: &mut Document) -> NodeId {
    match doc.descendants(FEATURE_MANAGER).first() {
        Some(&manager) => manager,
        None => {
            let root = doc.root();
            doc.append_element(root, FEATURE_MANAGER)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn feature_names_are_trimmed() {
        let doc =
            Document::parse("<server><featureManager><feature>\n  jsp-2.3\n</feature></featureManager></server>")
                .unwrap();
        assert_eq!(get_features(&doc), BTreeSet::from(["jsp-2.3".to_string()]));
    }

    #[test]
    fn features_outside_manager_are_ignored() {
        let doc = Document::parse("<server><feature>jsp-2.3</feature></server>").unwrap();
        assert!(get_features(&doc).is_empty());
    }

    #[test]
    fn blank_feature_is_rejected_before_mutation() {
        let mut doc = Document::new("server");
        let err = add_features(&mut doc, &["jdbc-4.0", "  "]).unwrap_err();

        assert!(matches!(err, Error::InvalidFeature { .. }));
        assert_eq!(doc.revision(), 0);
    }

    #[test]
    fn from_value_accepts_list() {
        let spec = FeatureSpec::from_value(json!(["jdbc-4.0"])).unwrap();
        assert_eq!(spec, FeatureSpec::List(vec!["jdbc-4.0".into()]));
    }

    #[test]
    fn from_value_accepts_partial_conditional() {
        let spec = FeatureSpec::from_value(json!({"if": ["a"], "then": ["b"]})).unwrap();
        let FeatureSpec::Conditional(conditional) = spec else {
            panic!("expected conditional");
        };
        assert_eq!(
            conditional.require().unwrap_err(),
            Error::IncompleteConditional { key: "else" }
        );
    }

    #[test]
    fn from_value_rejects_other_shapes() {
        for value in [json!("jdbc-4.0"), json!(42), json!({"when": ["a"]})] {
            let err = FeatureSpec::from_value(value).unwrap_err();
            assert!(matches!(err, Error::UnrecognizedExpression { .. }));
        }
    }
}
