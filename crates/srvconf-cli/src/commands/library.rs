//! Classloader commands

use std::path::Path;

use srvconf_merge::{add_library_to_app_classloader, get_api_visibility};
use srvconf_tree::io;

use super::{report, save_if_changed};
use crate::error::Result;

pub fn run_library_add(server: &Path, debug_name: &str, library_id: &str) -> Result<()> {
    let mut doc = io::load(server)?;
    let outcome = add_library_to_app_classloader(&mut doc, debug_name, library_id)?;
    report(&format!("library {library_id}"), &outcome);
    save_if_changed(server, &doc, &[outcome])?;
    Ok(())
}

/// Prints nothing when no visibility is configured.
pub fn run_visibility(server: &Path) -> Result<()> {
    let doc = io::load(server)?;
    if let Some(visibility) = get_api_visibility(&doc) {
        println!("{visibility}");
    }
    Ok(())
}
