//! CLI module for the search service
//!
//! Provides command-line interface for:
//! - serve: Boot the stores and run the HTTP search API
//! - load: One-shot CSV bulk load into both stores

mod args;
mod commands;
mod errors;

pub use args::{Catalog, Cli, Command};
pub use commands::{load, run, run_command, serve};
pub use errors::{CliError, CliResult};
