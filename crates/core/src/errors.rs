//! Error types shared by every expense backend.

use thiserror::Error;

/// Result type alias for expense operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Input rejected before any storage attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Amount must be greater than zero")]
    NonPositiveAmount,

    #[error("Note must not be empty")]
    EmptyNote,

    #[error("Unknown category '{0}'")]
    UnknownCategory(String),
}

/// Errors surfaced by expense repositories and the expense service.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid amount, note or category
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Update target does not exist
    #[error("Expense not found: {0}")]
    NotFound(String),

    /// Local medium rejected the write
    #[error("Local storage is full: {0}")]
    StorageFull(String),

    /// Network or auth failure against the remote store
    #[error("Remote store unavailable: {0}")]
    RemoteUnavailable(String),

    /// Remote collection was never provisioned
    #[error("Remote store is not enabled: {0}")]
    BackendDisabled(String),

    /// Local I/O or serialization failure that is not a capacity problem
    #[error("Local storage error: {0}")]
    LocalStorage(String),
}

impl Error {
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound(id.into())
    }

    pub fn remote_unavailable(message: impl Into<String>) -> Self {
        Self::RemoteUnavailable(message.into())
    }

    pub fn backend_disabled(message: impl Into<String>) -> Self {
        Self::BackendDisabled(message.into())
    }

    /// True for failures that should move the service onto local storage.
    pub fn is_remote_failure(&self) -> bool {
        matches!(self, Self::RemoteUnavailable(_) | Self::BackendDisabled(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::LocalStorage(format!("JSON error: {}", err))
    }
}
