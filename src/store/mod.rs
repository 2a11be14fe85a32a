//! # Store Module
//!
//! The persistence capability the service runs against, a MySQL
//! implementation and an in-memory one used by tests and the `memory`
//! backend.
//!
//! Two stores hold the same catalog. The primary serves furniture reads and
//! receives purchases; the secondary serves property reads. Both receive every
//! bulk upload.

mod errors;
mod memory;
mod mysql;

use async_trait::async_trait;

pub use errors::{StoreError, StoreResult};
pub use memory::{MemoryStore, MemoryTransaction};
pub use mysql::{MySqlStore, MySqlTransaction};

use crate::geo::{BoundingBox, Polygon};
use crate::model::{Located, Record, Stocked};
use crate::query::{Predicate, SortOrder};

/// Read access plus transaction start for one catalog store.
#[async_trait]
pub trait CatalogStore: Send + Sync + 'static {
    type Tx: StoreTransaction;

    async fn begin(&self) -> StoreResult<Self::Tx>;

    async fn find_by_id<R: Record>(&self, id: i64) -> StoreResult<Option<R>>;

    async fn count<R: Record>(&self, filter: &[Predicate]) -> StoreResult<i64>;

    async fn select<R: Record>(
        &self,
        filter: &[Predicate],
        order: SortOrder,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<R>>;

    /// Items inside `bbox`, most popular first.
    async fn within_box<R: Located>(&self, bbox: &BoundingBox) -> StoreResult<Vec<R>>;

    /// The item `id` if its location lies inside `polygon`.
    async fn find_contained<R: Located>(
        &self,
        id: i64,
        polygon: &Polygon,
    ) -> StoreResult<Option<R>>;

    /// Restore the initial data set.
    async fn reset(&self) -> StoreResult<()>;
}

/// Writes staged until `commit`. Dropping without commit rolls back.
#[async_trait]
pub trait StoreTransaction: Send + 'static {
    async fn insert<R: Record>(&mut self, record: &R) -> StoreResult<()>;

    async fn delete<R: Record>(&mut self, ids: &[i64]) -> StoreResult<u64>;

    /// Read `id` and lock it for the rest of the transaction.
    async fn find_for_update<R: Record>(
        &mut self,
        id: i64,
        filter: &[Predicate],
    ) -> StoreResult<Option<R>>;

    async fn decrement_stock<R: Stocked>(&mut self, id: i64) -> StoreResult<()>;

    async fn commit(self) -> StoreResult<()>;

    async fn rollback(self) -> StoreResult<()>;
}

/// Primary and secondary copies of the catalog.
#[derive(Debug, Clone)]
pub struct DualStore<S> {
    primary: S,
    secondary: S,
}

impl<S: CatalogStore> DualStore<S> {
    pub fn new(primary: S, secondary: S) -> Self {
        Self { primary, secondary }
    }

    pub fn primary(&self) -> &S {
        &self.primary
    }

    pub fn secondary(&self) -> &S {
        &self.secondary
    }

    /// Reset both stores concurrently.
    pub async fn reset(&self) -> StoreResult<()> {
        tokio::try_join!(self.primary.reset(), self.secondary.reset())?;
        Ok(())
    }
}
