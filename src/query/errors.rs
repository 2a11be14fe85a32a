//! # Query Errors

use thiserror::Error;

use crate::catalog::RangeError;

/// Result type for query building
pub type QueryResult<T> = Result<T, QueryError>;

/// Failures while turning request parameters into a search query
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// A range parameter named a bucket that does not exist
    #[error("{param}: {source}")]
    Range {
        param: &'static str,
        #[source]
        source: RangeError,
    },

    /// No recognized filter parameter was supplied
    #[error("search requires at least one filter parameter")]
    NoSearchCriteria,

    /// A required parameter is absent
    #[error("Missing required parameter: {0}")]
    MissingParam(&'static str),

    /// A parameter is present but unusable
    #[error("Invalid query parameter {param}: {value:?}")]
    InvalidParam { param: &'static str, value: String },
}
