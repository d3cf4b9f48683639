//! bootstrap.properties commands

use std::path::Path;

use colored::Colorize;
use srvconf_services::{property_matcher, update_bootstrap_properties};

use crate::error::Result;

/// `dir` defaults to the directory holding the server configuration.
pub fn run_bootstrap_set(server: &Path, dir: Option<&Path>, key: &str, value: &str) -> Result<()> {
    let dir = dir
        .or_else(|| server.parent())
        .filter(|d| !d.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let written = update_bootstrap_properties(dir, &property_matcher(key)?, &format!("{key}={value}"))?;
    if written {
        println!("{} {}", "changed".green().bold(), key);
    } else {
        println!("{} {} (already set)", "unchanged".dimmed(), key);
    }
    Ok(())
}
