//! Error types for the core library.

use thiserror::Error;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Authentication against the identity platform failed.
    #[error("Authentication error: {0}")]
    OAuth(#[from] go365_oauth::Error),

    /// Keyring access failed.
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// No token is stored.
    #[error("not authenticated: please login first")]
    NotAuthenticated,

    /// A date or duration flag could not be parsed.
    #[error("could not parse {input:?}: {reason}")]
    Parse {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// No `go365-<name>` executable on `PATH`.
    #[error("plugin 'go365-{0}' not found in PATH")]
    PluginNotFound(String),
}

impl Error {
    pub(crate) fn parse(input: &str, reason: impl Into<String>) -> Self {
        Self::Parse {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
