//! Feature commands

use std::path::Path;

use srvconf_merge::{add_features, add_features_conditional, get_features};
use srvconf_tree::io;

use super::{report, save_if_changed};
use crate::error::Result;

pub fn run_features_list(server: &Path) -> Result<()> {
    let doc = io::load(server)?;
    for feature in get_features(&doc) {
        println!("{feature}");
    }
    Ok(())
}

pub fn run_features_add(server: &Path, features: &[String]) -> Result<()> {
    let mut doc = io::load(server)?;
    let outcome = add_features(&mut doc, features)?;
    report("features", &outcome);
    save_if_changed(server, &doc, &[outcome])?;
    Ok(())
}

pub fn run_features_add_if(
    server: &Path,
    condition: &[String],
    then: &[String],
    otherwise: &[String],
) -> Result<()> {
    let mut doc = io::load(server)?;
    let outcome = add_features_conditional(&mut doc, condition, then, otherwise)?;
    report("features", &outcome);
    save_if_changed(server, &doc, &[outcome])?;
    Ok(())
}
