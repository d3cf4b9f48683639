//! Shared-library references on the application classloader.
//!
//! Both `application` and `webApplication` elements count as applications.
//! A reference can only be placed when the document holds exactly one of
//! them; otherwise the target is ambiguous and the merge is skipped.

use srvconf_tree::{Document, NodeId};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::outcome::{MergeOutcome, SkipReason};

pub const APPLICATION_TAGS: [&str; 2] = ["application", "webApplication"];
pub const CLASSLOADER: &str = "classloader";
pub const COMMON_LIBRARY_REF: &str = "commonLibraryRef";
pub const API_TYPE_VISIBILITY: &str = "apiTypeVisibility";

/// All applications, `application` elements first, then `webApplication`.
pub fn get_applications(doc: &Document) -> Vec<NodeId> {
    APPLICATION_TAGS
        .iter()
        .flat_map(|tag| doc.descendants(tag))
        .collect()
}

fn single_application(doc: &Document) -> std::result::Result<NodeId, usize> {
    match get_applications(doc).as_slice() {
        [app] => Ok(*app),
        apps => Err(apps.len()),
    }
}

/// Reference `library_id` from the application's classloader.
///
/// Without a classloader one is created carrying the reference. Otherwise
/// the first classloader holding `commonLibraryRef` gets the id appended to
/// its comma-separated list, unless already listed. If no classloader holds
/// the attribute, it is created on the first classloader.
pub fn add_library_to_app_classloader(
    doc: &mut Document,
    debug_name: &str,
    library_id: &str,
) -> Result<MergeOutcome> {
    let library_id = library_id.trim();
    if library_id.is_empty() || library_id.contains(',') {
        return Err(Error::InvalidReference {
            reference: library_id.to_string(),
        });
    }

    let app = match single_application(doc) {
        Ok(app) => app,
        Err(found) => {
            warn!(
                service = debug_name,
                library = library_id,
                found,
                "Cannot add shared library reference: expected exactly one application"
            );
            return Ok(MergeOutcome::Skipped {
                reason: SkipReason::ApplicationCount { found },
            });
        }
    };

    let classloaders = doc.child_elements(app, CLASSLOADER);
    let Some(&first) = classloaders.first() else {
        let classloader = doc.append_element(app, CLASSLOADER);
        doc.set_attribute(classloader, COMMON_LIBRARY_REF, library_id);
        debug!(service = debug_name, library = library_id, "Created classloader");
        return Ok(MergeOutcome::Changed);
    };

    let holder = classloaders.iter().find_map(|&classloader| {
        doc.attribute(classloader, COMMON_LIBRARY_REF)
            .map(|refs| (classloader, refs.to_string()))
    });

    let changed = match holder {
        Some((classloader, refs)) => {
            if references(&refs).any(|r| r == library_id) {
                return Ok(MergeOutcome::Unchanged);
            }
            doc.set_attribute(
                classloader,
                COMMON_LIBRARY_REF,
                &append_reference(&refs, library_id),
            )
        }
        None => doc.set_attribute(first, COMMON_LIBRARY_REF, library_id),
    };

    debug!(service = debug_name, library = library_id, "Added library reference");
    Ok(MergeOutcome::from_changed(changed))
}

/// The application's API type visibility, if unambiguous.
///
/// Needs exactly one application; among its classloaders the first carrying
/// `apiTypeVisibility` wins.
pub fn get_api_visibility(doc: &Document) -> Option<&str> {
    let app = match single_application(doc) {
        Ok(app) => app,
        Err(found) => {
            debug!(found, "No API visibility: expected exactly one application");
            return None;
        }
    };

    doc.child_elements(app, CLASSLOADER)
        .into_iter()
        .find_map(|classloader| doc.attribute(classloader, API_TYPE_VISIBILITY))
}

fn references(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|r| !r.is_empty())
}

fn append_reference(list: &str, reference: &str) -> String {
    if list.trim().is_empty() {
        reference.to_string()
    } else {
        format!("{list},{reference}")
    }
}
