//! ObservationScope for start/complete logging of long operations
//!
//! - Logs `begin` on creation
//! - Logs `complete` with the elapsed time when `complete()` is called
//! - Logs `failed` when `fail()` is called
//! - Warns on drop if neither happened (e.g. the request was cancelled)

use std::time::Instant;

use tracing::{debug, error, info, warn};

/// A scope that logs start and completion of one named operation
///
/// # Usage
///
/// ```ignore
/// let scope = ObservationScope::new("bulk_load");
/// // ... do work ...
/// scope.complete(); // logs bulk_load complete with elapsed_ms
/// ```
pub struct ObservationScope {
    name: &'static str,
    started: Instant,
    finished: bool,
}

impl ObservationScope {
    pub fn new(name: &'static str) -> Self {
        debug!(operation = name, "begin");
        Self {
            name,
            started: Instant::now(),
            finished: false,
        }
    }

    /// Milliseconds since the scope was created
    pub fn elapsed_ms(&self) -> u128 {
        self.started.elapsed().as_millis()
    }

    pub fn complete(mut self) {
        self.finished = true;
        info!(operation = self.name, elapsed_ms = self.elapsed_ms() as u64, "complete");
    }

    pub fn fail(mut self, reason: &str) {
        self.finished = true;
        error!(operation = self.name, elapsed_ms = self.elapsed_ms() as u64, reason, "failed");
    }
}

impl Drop for ObservationScope {
    fn drop(&mut self) {
        if !self.finished {
            warn!(operation = self.name, "scope dropped without completion");
        }
    }
}
