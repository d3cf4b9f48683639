//! Client driver download resolution.
//!
//! Resolution order: a key into the available-URL index, then a literal URL,
//! then a versioned lookup in a driver repository. Nothing is downloaded
//! here; callers get back at most one URL.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Where a plugin's client driver comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientJarConfig {
    /// Key into the available-URL index.
    #[serde(default)]
    pub client_jar_key: Option<String>,
    /// Literal download URL.
    #[serde(default)]
    pub client_jar_url: Option<String>,
    /// Versioned repository lookup.
    #[serde(default)]
    pub driver: Option<DriverRepository>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DriverRepository {
    pub repository_root: String,
    pub version: String,
}

/// Versioned driver lookup.
pub trait RepositoryIndex {
    /// URL of the driver matching `version` under `repository_root`, if any.
    fn find(&self, repository_root: &str, version: &str) -> Result<Option<String>>;
}

impl ClientJarConfig {
    /// Resolve the driver URL, or `None` if no source applies.
    pub fn resolve(
        &self,
        urls: &BTreeMap<String, String>,
        repository: &dyn RepositoryIndex,
    ) -> Result<Option<String>> {
        if let Some(key) = &self.client_jar_key {
            debug!(key = %key, "Resolving client driver from URL index");
            return Ok(urls.get(key).cloned());
        }
        if let Some(url) = &self.client_jar_url {
            return Ok(Some(url.clone()));
        }
        if let Some(driver) = &self.driver {
            debug!(root = %driver.repository_root, version = %driver.version, "Resolving client driver from repository");
            return repository.find(&driver.repository_root, &driver.version);
        }
        Ok(None)
    }
}

/// Repository index stored as `index.yml` (version to URL) in a local
/// directory named by the repository root.
///
/// Versions ending in `+` match the highest version with that prefix.
#[derive(Debug, Clone)]
pub struct FileRepositoryIndex {
    base: PathBuf,
}

impl FileRepositoryIndex {
    pub const INDEX_FILE: &'static str = "index.yml";

    /// Repository roots are resolved relative to `base`.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    fn load(&self, repository_root: &str) -> Result<BTreeMap<String, String>> {
        let path = self
            .base
            .join(repository_root.trim_start_matches('/'))
            .join(Self::INDEX_FILE);
        let source = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        serde_yaml::from_str(&source).map_err(|e| Error::parse(&path, e))
    }
}

impl RepositoryIndex for FileRepositoryIndex {
    fn find(&self, repository_root: &str, version: &str) -> Result<Option<String>> {
        let index = self.load(repository_root)?;
        Ok(select_version(&index, version).map(str::to_string))
    }
}

fn select_version<'a>(index: &'a BTreeMap<String, String>, wanted: &str) -> Option<&'a str> {
    let Some(prefix) = wanted.strip_suffix('+') else {
        return index.get(wanted).map(String::as_str);
    };

    index
        .iter()
        .filter(|(version, _)| version.starts_with(prefix))
        .max_by(|(a, _), (b, _)| compare_versions(a, b))
        .map(|(_, url)| url.as_str())
}

/// Compare dotted versions numerically where both components are numbers.
fn compare_versions(a: &str, b: &str) -> std::cmp::Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');
    loop {
        match (left.next(), right.next()) {
            (None, None) => return std::cmp::Ordering::Equal,
            (None, Some(_)) => return std::cmp::Ordering::Less,
            (Some(_), None) => return std::cmp::Ordering::Greater,
            (Some(l), Some(r)) => {
                let ordering = match (l.parse::<u64>(), r.parse::<u64>()) {
                    (Ok(l), Ok(r)) => l.cmp(&r),
                    _ => l.cmp(r),
                };
                if ordering.is_ne() {
                    return ordering;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn wildcard_picks_highest_numeric_version() {
        let index = index(&[
            ("5.1.9", "u-9"),
            ("5.1.10", "u-10"),
            ("5.2.0", "u-520"),
        ]);
        assert_eq!(select_version(&index, "5.1.+"), Some("u-10"));
        assert_eq!(select_version(&index, "5.+"), Some("u-520"));
        assert_eq!(select_version(&index, "6.+"), None);
    }

    #[test]
    fn exact_version_must_exist() {
        let index = index(&[("1.0.0", "u")]);
        assert_eq!(select_version(&index, "1.0.0"), Some("u"));
        assert_eq!(select_version(&index, "1.0"), None);
    }

    #[test]
    fn numeric_components_compare_numerically() {
        use std::cmp::Ordering;
        assert_eq!(compare_versions("1.10", "1.9"), Ordering::Greater);
        assert_eq!(compare_versions("1.2", "1.2.1"), Ordering::Less);
        assert_eq!(compare_versions("1.2.RELEASE", "1.2.RELEASE"), Ordering::Equal);
    }
}
