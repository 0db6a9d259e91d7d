//! Error types for Graph operations.

/// Result type alias for Graph operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the Graph client and the resource APIs.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport failure (DNS, TLS, connection reset, body read).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Response or request body could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Graph answered with an unexpected status.
    #[error("API request failed with status {status}: {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body, usually a Graph error document.
        body: String,
    },

    /// A required argument was missing or malformed.
    #[error("{0}")]
    InvalidArgument(String),
}

impl Error {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Returns the HTTP status for [`Error::Api`].
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
