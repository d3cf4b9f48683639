//! Error types for srvconf-merge

/// Result type for merge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Contract violations in merge requests.
///
/// These are raised before the document is touched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Conditional feature merge is missing the '{key}' list")]
    IncompleteConditional { key: &'static str },

    #[error("Unrecognized feature expression: {message}")]
    UnrecognizedExpression { message: String },

    #[error("Invalid feature name {token:?}")]
    InvalidFeature { token: String },

    #[error("Invalid library reference {reference:?}")]
    InvalidReference { reference: String },
}
