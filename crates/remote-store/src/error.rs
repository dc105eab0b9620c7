//! Error types for the remote document store client.

use thiserror::Error;

/// Result type alias for remote store operations.
pub type Result<T> = std::result::Result<T, RemoteStoreError>;

/// Error codes the document store uses for an unprovisioned collection.
const BACKEND_DISABLED_CODES: [&str; 2] = ["FAILED_PRECONDITION", "BACKEND_DISABLED"];

/// Errors that can occur talking to the remote document store.
#[derive(Debug, Error)]
pub enum RemoteStoreError {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// API error response from the document store
    #[error("API error ({status}): {code}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// Invalid request (bad base URL, malformed document, etc.)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Authentication error (missing or invalid token)
    #[error("Authentication error: {0}")]
    Auth(String),
}

impl RemoteStoreError {
    /// Create an API error from status, code and message
    pub fn api(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            code: code.into(),
            message: message.into(),
        }
    }

    /// Create an invalid request error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create an auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    /// HTTP status if this is an API error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }

    /// True when the collection has never been provisioned on the server.
    pub fn is_backend_disabled(&self) -> bool {
        match self {
            Self::Api { status, code, .. } => {
                *status == 412 || BACKEND_DISABLED_CODES.contains(&code.as_str())
            }
            _ => false,
        }
    }
}

impl From<RemoteStoreError> for spendwise_core::Error {
    fn from(err: RemoteStoreError) -> Self {
        if err.is_backend_disabled() {
            spendwise_core::Error::backend_disabled(err.to_string())
        } else {
            spendwise_core::Error::remote_unavailable(err.to_string())
        }
    }
}
