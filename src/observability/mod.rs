//! Observability for the search service
//!
//! - Structured logging through `tracing`
//! - Scope-based timing of long operations (bulk loads, initialize)
//!
//! # Usage
//!
//! ```ignore
//! use estate_search::observability::{init_logging, ObservationScope};
//!
//! init_logging("info");
//!
//! let scope = ObservationScope::new("initialize");
//! // ... do work ...
//! scope.complete();
//! ```

mod scope;

pub use scope::ObservationScope;

use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber.
///
/// `RUST_LOG` wins over `default_filter` when set. Calling this twice is a
/// no-op, so tests and the CLI can both call it.
pub fn init_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_twice() {
        init_logging("debug");
        init_logging("info");
    }
}
