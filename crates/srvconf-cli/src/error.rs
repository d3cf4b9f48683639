//! Error types for srvconf-cli

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Tree(#[from] srvconf_tree::Error),

    #[error(transparent)]
    Merge(#[from] srvconf_merge::Error),

    #[error(transparent)]
    Services(#[from] srvconf_services::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}
