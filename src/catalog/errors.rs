//! Catalog error types

use std::path::PathBuf;

use thiserror::Error;

/// Failure to resolve a bucket id against a range condition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    /// The bucket token is not an integer
    #[error("range id is not an integer: {0:?}")]
    NotAnInteger(String),

    /// The bucket index is negative or past the last bucket
    #[error("range id {index} is out of range (0..{count})")]
    OutOfRange { index: i64, count: usize },
}

/// Failure to load the condition documents at startup.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read condition document {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed condition document {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Bucket ids must equal their position so indices stay stable
    #[error("{attribute}: bucket at position {position} declares id {id}")]
    UnstableIndex {
        attribute: &'static str,
        position: usize,
        id: i64,
    },

    #[error("{attribute}: bucket {id} has min {min} >= max {max}")]
    EmptyBucket {
        attribute: &'static str,
        id: i64,
        min: i64,
        max: i64,
    },
}

pub type CatalogResult<T> = Result<T, CatalogError>;
