use std::io;

use thiserror::Error;

pub type StorageResult<T> = std::result::Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Storage quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Invalid storage key '{0}'")]
    InvalidKey(String),
}

impl StorageError {
    /// True when the medium refused the write for lack of space.
    pub fn is_full(&self) -> bool {
        match self {
            Self::QuotaExceeded(_) => true,
            Self::Io(err) => err.kind() == io::ErrorKind::StorageFull,
            Self::InvalidKey(_) => false,
        }
    }
}

impl From<StorageError> for spendwise_core::Error {
    fn from(err: StorageError) -> Self {
        if err.is_full() {
            spendwise_core::Error::StorageFull(err.to_string())
        } else {
            spendwise_core::Error::LocalStorage(err.to_string())
        }
    }
}
