//! # Query Module
//!
//! Search request parsing, predicate construction and cache-key derivation.
//! Predicates render to parameterized SQL for the MySQL store and evaluate
//! directly against records for the in-memory store.

mod builder;
mod errors;
mod predicate;

pub use builder::{
    CacheKeyMode, Pagination, SearchParams, SearchQuery, SearchQueryBuilder, PAGE_PARAM,
    PER_PAGE_PARAM,
};
pub use errors::{QueryError, QueryResult};
pub use predicate::{where_clause, where_params, Param, Predicate, SortOrder};
