//! Idempotent additions to a server's `bootstrap.properties`

use std::fs;
use std::path::Path;

use regex::Regex;
use tracing::debug;

use crate::error::{Error, Result};

pub const BOOTSTRAP_PROPERTIES: &str = "bootstrap.properties";

/// Matches any line that already sets `key`.
pub fn property_matcher(key: &str) -> Result<Regex> {
    let pattern = format!(r"^\s*{}\s*[=:]", regex::escape(key));
    Regex::new(&pattern).map_err(|e| Error::InvalidPattern {
        pattern,
        message: e.to_string(),
    })
}

/// Append `line` to `<server_dir>/bootstrap.properties` unless some existing
/// line matches `existing`.
///
/// Returns `true` if the file was written.
pub fn update_bootstrap_properties(server_dir: &Path, existing: &Regex, line: &str) -> Result<bool> {
    let path = server_dir.join(BOOTSTRAP_PROPERTIES);

    let mut content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(Error::io(&path, e)),
    };

    if content.lines().any(|l| existing.is_match(l)) {
        debug!(path = %path.display(), "Bootstrap property already set");
        return Ok(false);
    }

    if !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }
    content.push_str(line);
    content.push('\n');

    srvconf_tree::io::write_atomic(&path, content.as_bytes())?;
    debug!(path = %path.display(), line, "Appended bootstrap property");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matcher_accepts_spacing_and_colon() {
        let matcher = property_matcher("com.ibm.ws.logging.trace.specification").unwrap();
        assert!(matcher.is_match("com.ibm.ws.logging.trace.specification=*=info"));
        assert!(matcher.is_match("  com.ibm.ws.logging.trace.specification : x"));
        assert!(!matcher.is_match("# com.ibm.ws.logging.trace.specification=x"));
        assert!(!matcher.is_match("comXibm.ws.logging.trace.specification=x"));
    }
}
