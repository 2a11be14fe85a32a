//! # Store Errors

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Store failures, split by whether retrying elsewhere could help
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The store could not be reached
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A statement reached the store and failed
    #[error("store execution failed: {0}")]
    Execution(String),

    /// An insert collided with an existing id
    #[error("duplicate id {id} in {table}")]
    Duplicate { table: &'static str, id: i64 },

    /// A configured reset script could not be read
    #[error("reset script {path}: {message}")]
    Script { path: String, message: String },
}

impl StoreError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => StoreError::Unavailable(err.to_string()),
            other => StoreError::Execution(other.to_string()),
        }
    }
}
