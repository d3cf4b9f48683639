//! Service binding command

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use colored::Colorize;
use srvconf_services::{
    DefaultFlattener, FileRepositoryIndex, flatten_binding, load_plugins, parse_vcap_services,
    write_runtime_variables,
};
use srvconf_tree::{Document, io};
use tracing::debug;

use super::{report, save_if_changed};
use crate::error::{CliError, Result};

const VCAP_SERVICES: &str = "VCAP_SERVICES";

pub struct BindArgs<'a> {
    pub server: &'a Path,
    pub services: Option<&'a Path>,
    pub plugins: &'a Path,
    pub runtime_vars: Option<&'a Path>,
    pub driver_urls: Option<&'a Path>,
    pub driver_repository: &'a Path,
}

/// Apply every matching plugin to every binding, then write the bindings'
/// runtime variables.
///
/// Plugins run in file-name order for each binding; bindings run in label
/// order. Nothing is saved unless some merge changed the document.
pub fn run_bind(args: &BindArgs<'_>) -> Result<()> {
    let source = match args.services {
        Some(path) => fs::read_to_string(path).map_err(|e| srvconf_services::Error::io(path, e))?,
        None => std::env::var(VCAP_SERVICES).map_err(|_| {
            CliError::user(format!("no --services file given and {VCAP_SERVICES} is not set"))
        })?,
    };
    let bindings = parse_vcap_services(&source)?;
    let plugins = load_plugins(args.plugins)?;
    let urls = load_driver_urls(args.driver_urls)?;
    let repository = FileRepositoryIndex::new(args.driver_repository);
    debug!(bindings = bindings.len(), plugins = plugins.len(), "Binding services");

    let mut doc = io::load(args.server)?;
    let mut outcomes = Vec::new();
    let mut vars = BTreeMap::new();

    for binding in &bindings {
        let properties = flatten_binding(binding, &DefaultFlattener);
        for plugin in &plugins {
            if !plugin.matches(binding)? {
                continue;
            }
            let subject = format!("{} for {}", plugin.name, binding.name);
            for outcome in plugin.apply(&mut doc, binding, &properties)? {
                report(&subject, &outcome);
                outcomes.push(outcome);
            }
            if let Some(url) = plugin.client_driver_url(&urls, &repository)? {
                println!("{} {} {}", "driver".cyan(), binding.name, url);
            }
        }
        vars.extend(properties);
    }

    match args.runtime_vars {
        Some(path) => {
            let mut vars_doc = if path.exists() {
                io::load(path)?
            } else {
                Document::new("server")
            };
            let outcome = write_runtime_variables(&mut vars_doc, &vars);
            report("runtime variables", &outcome);
            save_if_changed(path, &vars_doc, &[outcome])?;
        }
        None => {
            let outcome = write_runtime_variables(&mut doc, &vars);
            report("runtime variables", &outcome);
            outcomes.push(outcome);
        }
    }

    save_if_changed(args.server, &doc, &outcomes)?;
    Ok(())
}

fn load_driver_urls(path: Option<&Path>) -> Result<BTreeMap<String, String>> {
    let Some(path) = path else {
        return Ok(BTreeMap::new());
    };
    let source = fs::read_to_string(path).map_err(|e| srvconf_services::Error::io(path, e))?;
    serde_yaml::from_str(&source)
        .map_err(|e| CliError::user(format!("Failed to parse {}: {e}", path.display())))
}
