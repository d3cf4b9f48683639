//! Logical stanza commands

use std::path::Path;

use colored::Colorize;
use srvconf_merge::stanza::{IDENTITY_ATTRIBUTE, stanza};
use srvconf_merge::{SkipReason, find_attribute, is_logical_singleton, merge_stanza};
use srvconf_tree::io;
use tracing::warn;

use super::{report, save_if_changed};
use crate::error::Result;

/// Prints nothing when the attribute is unset. Partitions that do not form
/// one stanza are reported on stderr instead of read.
pub fn run_stanza_get(server: &Path, tag: &str, id: Option<&str>, attribute: &str) -> Result<()> {
    let doc = io::load(server)?;
    let partitions: Vec<_> = stanza(&doc, tag)
        .into_iter()
        .filter(|&node| id.is_none() || doc.attribute(node, IDENTITY_ATTRIBUTE) == id)
        .collect();

    if !is_logical_singleton(&doc, &partitions) {
        let reason = SkipReason::AmbiguousStanza {
            tag: tag.to_string(),
            found: partitions.len(),
        };
        warn!(tag, found = partitions.len(), "Partitions do not share an id; not reading");
        eprintln!("{} {} ({}); pass --id", "skipped".yellow().bold(), tag, reason);
        return Ok(());
    }

    if let Some(value) = find_attribute(&doc, &partitions, attribute) {
        println!("{value}");
    }
    Ok(())
}

pub fn run_stanza_set(
    server: &Path,
    tag: &str,
    id: Option<&str>,
    attributes: &[(String, String)],
) -> Result<()> {
    let mut doc = io::load(server)?;
    let outcome = merge_stanza(&mut doc, tag, id, attributes);
    let subject = match id {
        Some(id) => format!("{tag}[{id}]"),
        None => tag.to_string(),
    };
    report(&subject, &outcome);
    save_if_changed(server, &doc, &[outcome])?;
    Ok(())
}
