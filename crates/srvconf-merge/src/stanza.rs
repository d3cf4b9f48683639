//! Logical stanzas: one configuration unit spread over several elements.
//!
//! Authoring tools sometimes split a unit (say, a `library` with a given id)
//! into several sibling or distant elements. These functions treat such a
//! sequence of elements as one unit without taking it apart.

use srvconf_tree::{Document, NodeId};
use tracing::{debug, warn};

use crate::outcome::{MergeOutcome, SkipReason};

/// Attribute that ties partitions of one stanza together.
pub const IDENTITY_ATTRIBUTE: &str = "id";

/// Candidate partitions for `tag`, in document order.
pub fn stanza(doc: &Document, tag: &str) -> Vec<NodeId> {
    doc.descendants(tag)
}

/// Whether `nodes` form a single logical unit.
///
/// Holds for zero or one node, or when every node carries the same `id` as
/// the first. An absent `id` compares equal to another absent `id`, so
/// several anonymous elements also count as one unit.
pub fn is_logical_singleton(doc: &Document, nodes: &[NodeId]) -> bool {
    let Some((&first, rest)) = nodes.split_first() else {
        return true;
    };
    let identity = doc.attribute(first, IDENTITY_ATTRIBUTE);
    rest.iter()
        .all(|&node| doc.attribute(node, IDENTITY_ATTRIBUTE) == identity)
}

/// Value of `name` from the last partition that defines it.
pub fn find_attribute<'d>(doc: &'d Document, nodes: &[NodeId], name: &str) -> Option<&'d str> {
    nodes.iter().rev().find_map(|&node| doc.attribute(node, name))
}

/// Set `name=value` across a stanza.
///
/// Every partition already defining `name` is rewritten, so diverging copies
/// converge. When no partition defines it, only the last partition gets it.
/// Returns `true` if the document changed.
pub fn find_and_update_attribute(
    doc: &mut Document,
    nodes: &[NodeId],
    name: &str,
    value: &str,
) -> bool {
    let holders: Vec<NodeId> = nodes
        .iter()
        .copied()
        .filter(|&node| doc.node(node).has_attribute(name))
        .collect();

    if holders.is_empty() {
        return match nodes.last() {
            Some(&last) => doc.set_attribute(last, name, value),
            None => false,
        };
    }

    let mut changed = false;
    for node in holders {
        if doc.set_attribute(node, name, value) {
            debug!(attribute = name, node = node.index(), "Updated stanza partition");
            changed = true;
        }
    }
    changed
}

/// Merge attributes into the stanza for `tag` (and `id`, when given).
///
/// Without an `id` every `tag` element is a partition; with one, only
/// elements carrying that `id`. A missing stanza is created under the root
/// with the `id` first. Partitions that do not form one logical unit are left
/// alone and the merge is skipped.
pub fn merge_stanza<K: AsRef<str>, V: AsRef<str>>(
    doc: &mut Document,
    tag: &str,
    id: Option<&str>,
    attributes: &[(K, V)],
) -> MergeOutcome {
    let partitions: Vec<NodeId> = stanza(doc, tag)
        .into_iter()
        .filter(|&node| id.is_none() || doc.attribute(node, IDENTITY_ATTRIBUTE) == id)
        .collect();

    if partitions.is_empty() {
        let root = doc.root();
        let node = doc.append_element(root, tag);
        if let Some(id) = id {
            doc.set_attribute(node, IDENTITY_ATTRIBUTE, id);
        }
        for (name, value) in attributes {
            doc.set_attribute(node, name.as_ref(), value.as_ref());
        }
        debug!(tag, id, "Created stanza");
        return MergeOutcome::Changed;
    }

    if !is_logical_singleton(doc, &partitions) {
        warn!(tag, found = partitions.len(), "Partitions do not share an id; not merging");
        return MergeOutcome::Skipped {
            reason: SkipReason::AmbiguousStanza {
                tag: tag.to_string(),
                found: partitions.len(),
            },
        };
    }

    let mut changed = false;
    for (name, value) in attributes {
        changed |= find_and_update_attribute(doc, &partitions, name.as_ref(), value.as_ref());
    }
    MergeOutcome::from_changed(changed)
}
