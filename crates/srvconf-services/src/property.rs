//! Property references into flattened service bindings

use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Reference a connection property of `service` as `${...}`.
///
/// `name` wins over `alias` when both are present.
pub fn get_cloud_property(
    properties: &BTreeMap<String, String>,
    service: &str,
    name: &str,
    alias: Option<&str>,
) -> Result<String> {
    std::iter::once(name)
        .chain(alias)
        .map(|prop| format!("cloud.services.{service}.connection.{prop}"))
        .find(|key| properties.contains_key(key))
        .map(|key| format!("${{{key}}}"))
        .ok_or_else(|| Error::MissingProperty {
            service: service.to_string(),
            property: name.to_string(),
        })
}
