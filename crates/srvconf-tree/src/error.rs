//! Error types for srvconf-tree

use std::path::PathBuf;

/// Result type for srvconf-tree operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while parsing, rendering or persisting a document
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("XML syntax error at byte {position}: {message}")]
    Syntax { message: String, position: u64 },

    #[error("Mismatched end tag: expected </{expected}>, found </{found}>")]
    MismatchedEndTag { expected: String, found: String },

    #[error("Unclosed element <{tag}> at end of input")]
    Unclosed { tag: String },

    #[error("Empty XML document: no root element found")]
    EmptyDocument,

    #[error("Multiple root elements: <{tag}> follows the document root")]
    MultipleRoots { tag: String },

    #[error("Failed to render document: {message}")]
    Render { message: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Lock acquisition failed for {path}")]
    LockFailed { path: PathBuf },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn syntax(message: impl ToString, position: u64) -> Self {
        Self::Syntax {
            message: message.to_string(),
            position,
        }
    }
}
