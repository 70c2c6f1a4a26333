use std::sync::PoisonError;
use thiserror::Error;

/// Error type for key-value storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// SQLite error
    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool error
    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Lock error
    #[error("Lock error: {0}")]
    Lock(String),

    /// Blocking task failed to complete
    #[error("Storage task failed: {0}")]
    Task(String),

    /// Value could not be encoded for storage
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend refused or could not serve the request
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl<T> From<PoisonError<T>> for StorageError {
    fn from(error: PoisonError<T>) -> Self {
        StorageError::Lock(error.to_string())
    }
}

impl From<tokio::task::JoinError> for StorageError {
    fn from(error: tokio::task::JoinError) -> Self {
        StorageError::Task(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_errors_are_serialization_errors() {
        let json_error = serde_json::from_str::<u16>("-1").unwrap_err();
        let error = StorageError::from(json_error);

        assert!(matches!(error, StorageError::Serialization(_)));
        assert!(error.to_string().starts_with("Serialization error:"));
    }
}
