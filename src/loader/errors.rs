//! # Bulk Load Errors

use thiserror::Error;

use crate::store::StoreError;

pub type LoadResult<T> = Result<T, LoadError>;

/// Why an upload was not (fully) applied
#[derive(Debug, Error)]
pub enum LoadError {
    /// A row could not be parsed; nothing was written
    #[error("row {row}: {message}")]
    Parse { row: usize, message: String },

    /// The same id appears twice in one upload
    #[error("row {row}: duplicate id {id}")]
    DuplicateId { row: usize, id: i64 },

    /// Starting or committing the primary transaction failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Writing a row to the primary store failed
    #[error("primary write of id {id} failed: {source}")]
    Primary {
        id: i64,
        #[source]
        source: StoreError,
    },

    /// Writing a row to the secondary store failed after the primary write
    #[error("secondary write of id {id} failed: {source}")]
    Secondary {
        id: i64,
        #[source]
        source: StoreError,
    },

    /// The secondary commit failed after the primary committed. `compensated`
    /// tells whether the uploaded rows were removed from the primary again.
    #[error("secondary commit failed (primary compensated: {compensated}): {source}")]
    SecondaryCommit {
        compensated: bool,
        #[source]
        source: StoreError,
    },

    /// A worker task panicked or could not be scheduled
    #[error("load worker failed: {0}")]
    Worker(String),
}

impl LoadError {
    /// The upload itself is malformed.
    pub fn is_parse(&self) -> bool {
        matches!(self, LoadError::Parse { .. } | LoadError::DuplicateId { .. })
    }

    /// The two stores disagreed about the upload.
    pub fn is_partial(&self) -> bool {
        matches!(
            self,
            LoadError::Secondary { .. } | LoadError::SecondaryCommit { .. }
        )
    }
}
