//! Command implementations for srvconf-cli

pub mod bind;
pub mod bootstrap;
pub mod features;
pub mod library;
pub mod stanza;

use std::path::Path;

use colored::Colorize;
use srvconf_merge::MergeOutcome;
use srvconf_tree::Document;
use tracing::info;

use crate::error::Result;

pub use bind::{BindArgs, run_bind};
pub use bootstrap::run_bootstrap_set;
pub use features::{run_features_add, run_features_add_if, run_features_list};
pub use library::{run_library_add, run_visibility};
pub use stanza::{run_stanza_get, run_stanza_set};

/// Print one line per outcome.
pub(crate) fn report(subject: &str, outcome: &MergeOutcome) {
    match outcome {
        MergeOutcome::Changed => println!("{} {}", "changed".green().bold(), subject),
        MergeOutcome::Unchanged => println!("{} {}", "unchanged".dimmed(), subject),
        MergeOutcome::Skipped { reason } => {
            println!("{} {} ({})", "skipped".yellow().bold(), subject, reason)
        }
    }
}

/// Save `doc` to `path` if any outcome changed it. Returns whether it saved.
pub(crate) fn save_if_changed(path: &Path, doc: &Document, outcomes: &[MergeOutcome]) -> Result<bool> {
    if !outcomes.iter().any(MergeOutcome::is_changed) {
        return Ok(false);
    }
    srvconf_tree::io::save(path, doc)?;
    info!(path = %path.display(), revision = doc.revision(), "Saved server configuration");
    Ok(true)
}
