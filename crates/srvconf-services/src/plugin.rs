//! Declarative service plugins.
//!
//! A plugin is a YAML file describing what a kind of bound service adds to
//! the server configuration:
//!
//! ```yaml
//! name: mysql
//! service_filter: "^(mysql|cleardb)"
//! features: [jdbc-4.0]
//! library_id: mysql-library
//! stanzas:
//!   - element: dataSource
//!     id: "{service}"
//!     attributes:
//!       - name: jndiName
//!         value: "jdbc/{service}"
//!       - name: serverName
//!         value: { property: host, alias: hostname }
//! ```
//!
//! `{service}` expands to the binding's instance name. Attribute values
//! given as `property` become `${cloud.services.<name>.connection.<prop>}`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use srvconf_merge::{FeatureSpec, MergeOutcome};
use srvconf_tree::Document;
use tracing::{debug, info};

use crate::binding::ServiceBinding;
use crate::drivers::{ClientJarConfig, RepositoryIndex};
use crate::error::{Error, Result};
use crate::property::get_cloud_property;

const SERVICE_PLACEHOLDER: &str = "{service}";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServicePlugin {
    pub name: String,
    /// Regex matched against a binding's label and instance name.
    pub service_filter: String,
    #[serde(default)]
    pub features: Option<FeatureSpec>,
    /// Shared library referenced from the application's classloader.
    #[serde(default)]
    pub library_id: Option<String>,
    #[serde(default)]
    pub client_jar: Option<ClientJarConfig>,
    #[serde(default)]
    pub stanzas: Vec<StanzaTemplate>,
    #[serde(skip)]
    compiled: CompiledFilter,
}

/// `service_filter` compiled on first use.
#[derive(Debug, Clone, Default)]
struct CompiledFilter(OnceLock<Regex>);

// A cache, not part of the plugin's identity.
impl PartialEq for CompiledFilter {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for CompiledFilter {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StanzaTemplate {
    pub element: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub attributes: Vec<AttributeTemplate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttributeTemplate {
    pub name: String,
    pub value: AttributeSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeSource {
    Literal(String),
    Property {
        property: String,
        #[serde(default)]
        alias: Option<String>,
    },
}

/// A stanza template with every value resolved for one binding.
struct ResolvedStanza {
    element: String,
    id: Option<String>,
    attributes: Vec<(String, String)>,
}

impl ServicePlugin {
    /// The compiled `service_filter`, built once per plugin.
    pub fn filter(&self) -> Result<&Regex> {
        if let Some(filter) = self.compiled.0.get() {
            return Ok(filter);
        }
        let filter = Regex::new(&self.service_filter).map_err(|e| Error::InvalidFilter {
            plugin: self.name.clone(),
            filter: self.service_filter.clone(),
            message: e.to_string(),
        })?;
        Ok(self.compiled.0.get_or_init(|| filter))
    }

    pub fn matches(&self, binding: &ServiceBinding) -> Result<bool> {
        let filter = self.filter()?;
        Ok(filter.is_match(&binding.label) || filter.is_match(&binding.name))
    }

    /// Client driver download for this plugin, if it names one.
    pub fn client_driver_url(
        &self,
        urls: &BTreeMap<String, String>,
        repository: &dyn RepositoryIndex,
    ) -> Result<Option<String>> {
        match &self.client_jar {
            Some(config) => config.resolve(urls, repository),
            None => Ok(None),
        }
    }

    /// Apply the plugin's contributions for `binding` to `doc`.
    ///
    /// Every value is resolved and checked before the document is touched,
    /// so an error leaves `doc` as it was. Outcomes are returned in order:
    /// features, library reference, then one per stanza.
    pub fn apply(
        &self,
        doc: &mut Document,
        binding: &ServiceBinding,
        properties: &BTreeMap<String, String>,
    ) -> Result<Vec<MergeOutcome>> {
        let stanzas = self
            .stanzas
            .iter()
            .map(|template| self.resolve_stanza(template, binding, properties))
            .collect::<Result<Vec<_>>>()?;
        if let Some(spec) = &self.features {
            check_feature_spec(spec)?;
        }
        if let Some(id) = &self.library_id {
            check_library_id(id)?;
        }

        let mut outcomes = Vec::new();
        if let Some(spec) = &self.features {
            outcomes.push(srvconf_merge::apply_feature_spec(doc, spec)?);
        }
        if let Some(id) = &self.library_id {
            outcomes.push(srvconf_merge::add_library_to_app_classloader(
                doc,
                &binding.name,
                id,
            )?);
        }
        for stanza in &stanzas {
            outcomes.push(srvconf_merge::merge_stanza(
                doc,
                &stanza.element,
                stanza.id.as_deref(),
                &stanza.attributes,
            ));
        }

        info!(
            plugin = %self.name,
            service = %binding.name,
            changed = outcomes.iter().any(MergeOutcome::is_changed),
            "Applied service plugin"
        );
        Ok(outcomes)
    }

    fn resolve_stanza(
        &self,
        template: &StanzaTemplate,
        binding: &ServiceBinding,
        properties: &BTreeMap<String, String>,
    ) -> Result<ResolvedStanza> {
        let service = binding.name.as_str();
        let attributes = template
            .attributes
            .iter()
            .map(|attr| {
                let value = match &attr.value {
                    AttributeSource::Literal(text) => expand(text, service),
                    AttributeSource::Property { property, alias } => {
                        get_cloud_property(properties, service, property, alias.as_deref())?
                    }
                };
                Ok((attr.name.clone(), value))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ResolvedStanza {
            element: template.element.clone(),
            id: template.id.as_deref().map(|id| expand(id, service)),
            attributes,
        })
    }
}

fn expand(template: &str, service: &str) -> String {
    template.replace(SERVICE_PLACEHOLDER, service)
}

fn check_feature_spec(spec: &FeatureSpec) -> Result<()> {
    let tokens: Vec<&String> = match spec {
        FeatureSpec::List(features) => features.iter().collect(),
        FeatureSpec::Conditional(conditional) => {
            let (condition, then, otherwise) = conditional.require()?;
            condition.iter().chain(then).chain(otherwise).collect()
        }
    };
    match tokens.into_iter().find(|token| token.trim().is_empty()) {
        Some(token) => Err(srvconf_merge::Error::InvalidFeature {
            token: token.clone(),
        }
        .into()),
        None => Ok(()),
    }
}

fn check_library_id(id: &str) -> Result<()> {
    if id.trim().is_empty() || id.contains(',') {
        return Err(srvconf_merge::Error::InvalidReference {
            reference: id.to_string(),
        }
        .into());
    }
    Ok(())
}

/// Load every `*.yml` / `*.yaml` plugin in `dir`, ordered by file name.
///
/// Filters are compiled and cached here so a bad plugin fails at load time.
pub fn load_plugins(dir: &Path) -> Result<Vec<ServicePlugin>> {
    let entries = fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| Error::io(dir, e))?.path();
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == "yml" || ext == "yaml");
        if is_yaml && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();

    let mut plugins = Vec::with_capacity(paths.len());
    for path in paths {
        let source = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        let plugin: ServicePlugin =
            serde_yaml::from_str(&source).map_err(|e| Error::parse(&path, e))?;
        plugin.filter()?;
        debug!(plugin = %plugin.name, path = %path.display(), "Loaded service plugin");
        plugins.push(plugin);
    }
    Ok(plugins)
}
