//! Error types for srvconf-services

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Resource {service} does not contain a {property} property")]
    MissingProperty { service: String, property: String },

    #[error("Malformed service bindings: {message}")]
    MalformedBindings { message: String },

    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid service filter {filter:?} in plugin {plugin}: {message}")]
    InvalidFilter {
        plugin: String,
        filter: String,
        message: String,
    },

    #[error("Invalid pattern {pattern:?}: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Merge error: {0}")]
    Merge(#[from] srvconf_merge::Error),

    #[error("Document error: {0}")]
    Tree(#[from] srvconf_tree::Error),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.to_string(),
        }
    }
}
