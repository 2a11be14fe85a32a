//! estate-search - parametric property and furniture search
//!
//! Two catalogs (properties and furniture) are searched by range buckets,
//! categorical filters, polygon containment and door-fit recommendation.
//! Writes go to a primary and a secondary store as one unit.

pub mod cache;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod geo;
pub mod http_server;
pub mod loader;
pub mod model;
pub mod observability;
pub mod query;
pub mod service;
pub mod store;
