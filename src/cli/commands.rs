//! CLI command implementations
//!
//! Both commands follow the same boot sequence:
//! 1. Configuration load
//! 2. Search condition load
//! 3. Store connection (MySQL pair or in-memory pair)
//!
//! `serve` then hands the state to the HTTP server; `load` applies one CSV
//! file through the bulk loader and exits.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::catalog::SearchConditions;
use crate::config::{Backend, Config};
use crate::http_server::HttpServer;
use crate::observability::init_logging;
use crate::service::AppState;
use crate::store::{CatalogStore, DualStore, MemoryStore, MySqlStore};

use super::args::{Catalog, Command};
use super::errors::{CliError, CliResult};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    init_logging("info");

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::Boot(format!("failed to create tokio runtime: {e}")))?;

    rt.block_on(async {
        match cmd {
            Command::Serve { config } => serve(&config).await,
            Command::Load {
                config,
                catalog,
                file,
            } => load(&config, catalog, &file).await,
        }
    })
}

/// Configuration and conditions, loaded and validated
fn boot(config_path: &Path) -> CliResult<(Config, SearchConditions)> {
    let config = Config::load(config_path)?;
    let conditions =
        SearchConditions::load(&config.property_condition_path, &config.furniture_condition_path)?;
    info!(config = %config_path.display(), backend = ?config.backend, "configuration loaded");
    Ok((config, conditions))
}

async fn connect_mysql(config: &Config) -> CliResult<DualStore<MySqlStore>> {
    let primary = MySqlStore::connect(&config.primary, config.schema_scripts.clone()).await?;
    let secondary = MySqlStore::connect(&config.secondary, config.schema_scripts.clone()).await?;
    Ok(DualStore::new(primary, secondary))
}

fn memory_stores() -> DualStore<MemoryStore> {
    DualStore::new(MemoryStore::new(), MemoryStore::new())
}

/// Start the search API
pub async fn serve(config_path: &Path) -> CliResult<()> {
    let (config, conditions) = boot(config_path)?;
    match config.backend {
        Backend::Mysql => {
            let stores = connect_mysql(&config).await?;
            serve_with(config, conditions, stores).await
        }
        Backend::Memory => serve_with(config, conditions, memory_stores()).await,
    }
}

async fn serve_with<S: CatalogStore>(
    config: Config,
    conditions: SearchConditions,
    stores: DualStore<S>,
) -> CliResult<()> {
    let state = Arc::new(AppState::new(config, conditions, stores));
    HttpServer::new(state)
        .start()
        .await
        .map_err(|e| CliError::Boot(format!("HTTP server failed: {e}")))
}

/// Load one CSV file into both stores and exit
pub async fn load(config_path: &Path, catalog: Catalog, file: &Path) -> CliResult<()> {
    let (config, conditions) = boot(config_path)?;
    let input = fs::read(file).map_err(|source| CliError::Input {
        path: file.to_path_buf(),
        source,
    })?;

    match config.backend {
        Backend::Mysql => {
            let stores = connect_mysql(&config).await?;
            load_with(config, conditions, stores, catalog, &input).await
        }
        Backend::Memory => {
            warn!("memory backend selected; loaded rows are discarded on exit");
            load_with(config, conditions, memory_stores(), catalog, &input).await
        }
    }
}

async fn load_with<S: CatalogStore>(
    config: Config,
    conditions: SearchConditions,
    stores: DualStore<S>,
    catalog: Catalog,
    input: &[u8],
) -> CliResult<()> {
    let state = AppState::new(config, conditions, stores);
    let report = match catalog {
        Catalog::Estate => state.load_properties(input).await?,
        Catalog::Chair => state.load_furniture(input).await?,
    };
    info!(rows = report.rows, catalog = ?catalog, "load finished");
    Ok(())
}
