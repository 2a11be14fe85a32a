//! CLI-specific error types
//!
//! Every CLI error is fatal: `main` prints it and exits non-zero.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::service::ServiceError;
use crate::store::StoreError;

/// CLI error
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("store connection failed: {0}")]
    Store(#[from] StoreError),

    #[error("load failed: {0}")]
    Load(#[from] ServiceError),

    #[error("failed to read {}: {source}", path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("boot failed: {0}")]
    Boot(String),
}

impl CliError {
    /// Stable error code printed alongside the message
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CLI_CONFIG_ERROR",
            Self::Catalog(_) => "CLI_CONDITION_ERROR",
            Self::Store(_) => "CLI_STORE_ERROR",
            Self::Load(_) => "CLI_LOAD_ERROR",
            Self::Input { .. } => "CLI_IO_ERROR",
            Self::Boot(_) => "CLI_BOOT_FAILED",
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
