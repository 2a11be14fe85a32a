//! # HTTP Server Module
//!
//! Axum front end of the search API.
//!
//! # Endpoints
//!
//! - `POST /initialize` - Reset both stores
//! - `/api/estate/*` - Property detail, search, polygon search, upload
//! - `/api/chair/*` - Furniture detail, search, purchase, upload
//! - `/api/recommended_estate/:id` - Properties a chair fits into

pub mod chair_routes;
pub mod config;
pub mod estate_routes;
pub mod server;
mod upload;

pub use config::HttpServerConfig;
pub use server::HttpServer;
