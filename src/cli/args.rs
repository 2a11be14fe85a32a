//! CLI argument definitions using clap
//!
//! Commands:
//! - estate-search serve --config <path>
//! - estate-search load --config <path> --catalog <estate|chair> --file <csv>

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Property and furniture search service
#[derive(Parser, Debug)]
#[command(name = "estate-search")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Which catalog an offline load targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Catalog {
    Estate,
    Chair,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP search API
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./estate-search.json")]
        config: PathBuf,
    },

    /// Bulk load a CSV file into both stores and exit
    Load {
        /// Path to configuration file
        #[arg(long, default_value = "./estate-search.json")]
        config: PathBuf,

        /// Target catalog
        #[arg(long, value_enum)]
        catalog: Catalog,

        /// CSV file to load
        #[arg(long)]
        file: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_default_config() {
        let cli = Cli::try_parse_from(["estate-search", "serve"]).unwrap();
        match cli.command {
            Command::Serve { config } => assert_eq!(config, PathBuf::from("./estate-search.json")),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_load() {
        let cli = Cli::try_parse_from([
            "estate-search",
            "load",
            "--catalog",
            "chair",
            "--file",
            "chairs.csv",
        ])
        .unwrap();
        match cli.command {
            Command::Load { catalog, file, .. } => {
                assert_eq!(catalog, Catalog::Chair);
                assert_eq!(file, PathBuf::from("chairs.csv"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_load_requires_catalog() {
        assert!(Cli::try_parse_from(["estate-search", "load", "--file", "x.csv"]).is_err());
    }
}
