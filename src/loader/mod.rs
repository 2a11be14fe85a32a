//! # Bulk Loader
//!
//! Applies a CSV upload to both stores as one unit. Both transactions are
//! opened before any row is written; on any failure both roll back. Commit
//! order is primary, then secondary. A failed secondary commit triggers a
//! compensating delete on the primary.

mod errors;
mod parse;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tracing::{error, info, warn};

pub use errors::{LoadError, LoadResult};
pub use parse::{parse_rows, CsvRecord, Fields};

use crate::observability::ObservationScope;
use crate::store::{CatalogStore, DualStore, StoreTransaction};

/// How rows are written inside the two transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStrategy {
    /// One row at a time, in upload order
    Sequential,
    /// Rows fan out over a bounded worker pool
    Concurrent,
}

/// Outcome of a successful load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    pub rows: usize,
    pub strategy: LoadStrategy,
}

type SharedTx<T> = Arc<Mutex<T>>;

async fn write_row<T, R>(primary: &Mutex<T>, secondary: &Mutex<T>, row: &R) -> LoadResult<()>
where
    T: StoreTransaction,
    R: CsvRecord,
{
    primary
        .lock()
        .await
        .insert(row)
        .await
        .map_err(|source| LoadError::Primary { id: row.id(), source })?;
    secondary
        .lock()
        .await
        .insert(row)
        .await
        .map_err(|source| LoadError::Secondary { id: row.id(), source })?;
    Ok(())
}

fn unshare<T>(tx: SharedTx<T>) -> LoadResult<T> {
    Arc::try_unwrap(tx)
        .map(Mutex::into_inner)
        .map_err(|_| LoadError::Worker("transaction still shared after workers finished".to_string()))
}

/// Coordinates one upload across a [`DualStore`].
pub struct BulkLoader<'a, S> {
    stores: &'a DualStore<S>,
    strategy: LoadStrategy,
    workers: usize,
}

impl<'a, S: CatalogStore> BulkLoader<'a, S> {
    pub fn new(stores: &'a DualStore<S>, strategy: LoadStrategy, workers: usize) -> Self {
        Self {
            stores,
            strategy,
            workers: workers.max(1),
        }
    }

    /// Parse `input` and write every row to both stores, or nothing at all.
    pub async fn load<R: CsvRecord>(&self, input: &[u8]) -> LoadResult<LoadReport> {
        let scope = ObservationScope::new("bulk_load");
        match self.apply::<R>(input).await {
            Ok(report) => {
                scope.complete();
                Ok(report)
            }
            Err(err) => {
                scope.fail(&err.to_string());
                Err(err)
            }
        }
    }

    async fn apply<R: CsvRecord>(&self, input: &[u8]) -> LoadResult<LoadReport> {
        let primary = Arc::new(Mutex::new(self.stores.primary().begin().await?));
        let secondary = Arc::new(Mutex::new(self.stores.secondary().begin().await?));

        // dropping the open transactions on a parse error rolls them back
        let rows: Vec<R> = parse_rows(input)?;
        let ids: Vec<i64> = rows.iter().map(|r| r.id()).collect();

        let written = match self.strategy {
            LoadStrategy::Sequential => Self::write_sequential(&primary, &secondary, rows).await,
            LoadStrategy::Concurrent => {
                self.write_concurrent(primary.clone(), secondary.clone(), rows)
                    .await
            }
        };

        let primary = unshare(primary)?;
        let secondary = unshare(secondary)?;

        if let Err(err) = written {
            warn!(error = %err, table = R::TABLE.name(), "bulk load aborted, rolling back");
            if let Err(e) = primary.rollback().await {
                warn!(error = %e, "primary rollback failed");
            }
            if let Err(e) = secondary.rollback().await {
                warn!(error = %e, "secondary rollback failed");
            }
            return Err(err);
        }

        if let Err(err) = primary.commit().await {
            error!(error = %err, "primary commit failed");
            return Err(LoadError::Store(err));
        }

        if let Err(source) = secondary.commit().await {
            error!(error = %source, "secondary commit failed after primary commit");
            let compensated = self.compensate::<R>(&ids).await;
            return Err(LoadError::SecondaryCommit { compensated, source });
        }

        info!(
            rows = ids.len(),
            table = R::TABLE.name(),
            strategy = ?self.strategy,
            "bulk load committed"
        );
        Ok(LoadReport {
            rows: ids.len(),
            strategy: self.strategy,
        })
    }

    async fn write_sequential<R: CsvRecord>(
        primary: &SharedTx<S::Tx>,
        secondary: &SharedTx<S::Tx>,
        rows: Vec<R>,
    ) -> LoadResult<()> {
        for row in &rows {
            write_row(primary, secondary, row).await?;
        }
        Ok(())
    }

    async fn write_concurrent<R: CsvRecord>(
        &self,
        primary: SharedTx<S::Tx>,
        secondary: SharedTx<S::Tx>,
        rows: Vec<R>,
    ) -> LoadResult<()> {
        let permits = Arc::new(Semaphore::new(self.workers));
        let cancelled = Arc::new(AtomicBool::new(false));
        let first_error = Arc::new(parking_lot::Mutex::new(None));
        let mut tasks = JoinSet::new();

        for row in rows {
            if cancelled.load(Ordering::SeqCst) {
                break;
            }
            let permit = match permits.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    // spawned rows still hold the transactions; join them below
                    cancelled.store(true, Ordering::SeqCst);
                    first_error
                        .lock()
                        .get_or_insert_with(|| LoadError::Worker(e.to_string()));
                    break;
                }
            };

            let primary = primary.clone();
            let secondary = secondary.clone();
            let cancelled = cancelled.clone();
            let first_error = first_error.clone();
            tasks.spawn(async move {
                let _permit = permit;
                if cancelled.load(Ordering::SeqCst) {
                    return;
                }
                if let Err(err) = write_row(&primary, &secondary, &row).await {
                    if !cancelled.swap(true, Ordering::SeqCst) {
                        *first_error.lock() = Some(err);
                    }
                }
            });
        }

        let mut panicked = None;
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                panicked.get_or_insert_with(|| LoadError::Worker(e.to_string()));
            }
        }

        let first = first_error.lock().take();
        match first.or(panicked) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Remove the uploaded ids from the primary again. Returns whether that
    /// succeeded.
    async fn compensate<R: CsvRecord>(&self, ids: &[i64]) -> bool {
        let result = async {
            let mut tx = self.stores.primary().begin().await?;
            let deleted = tx.delete::<R>(ids).await?;
            tx.commit().await?;
            Ok::<_, crate::store::StoreError>(deleted)
        }
        .await;

        match result {
            Ok(deleted) => {
                warn!(deleted, table = R::TABLE.name(), "compensated primary after secondary commit failure");
                true
            }
            Err(e) => {
                error!(error = %e, table = R::TABLE.name(), "compensation failed, stores diverged");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Furniture;
    use crate::store::MemoryStore;

    fn upload(ids: impl IntoIterator<Item = i64>) -> String {
        ids.into_iter()
            .map(|id| format!("{id},chair {id},desc,/img/{id}.png,{},80,50,50,黒,,座椅子,{id},3\n", 1000 + id))
            .collect()
    }

    fn stores() -> DualStore<MemoryStore> {
        DualStore::new(MemoryStore::new(), MemoryStore::new())
    }

    #[tokio::test]
    async fn test_both_strategies_load_everything() {
        for strategy in [LoadStrategy::Sequential, LoadStrategy::Concurrent] {
            let stores = stores();
            let report = BulkLoader::new(&stores, strategy, 2)
                .load::<Furniture>(upload(1..=20).as_bytes())
                .await
                .unwrap();
            assert_eq!(report.rows, 20);
            assert_eq!(stores.primary().len::<Furniture>(), 20);
            assert_eq!(stores.secondary().len::<Furniture>(), 20);
        }
    }

    #[tokio::test]
    async fn test_primary_failure_writes_nothing() {
        for strategy in [LoadStrategy::Sequential, LoadStrategy::Concurrent] {
            let stores = stores();
            stores.primary().fail_insert(5);
            let err = BulkLoader::new(&stores, strategy, 2)
                .load::<Furniture>(upload(1..=10).as_bytes())
                .await
                .unwrap_err();
            assert!(matches!(err, LoadError::Primary { id: 5, .. }), "{err:?}");
            assert_eq!(stores.primary().len::<Furniture>(), 0);
            assert_eq!(stores.secondary().len::<Furniture>(), 0);
        }
    }

    #[tokio::test]
    async fn test_concurrent_failure_stops_later_rows() {
        let stores = stores();
        stores.primary().fail_insert(3);
        let err = BulkLoader::new(&stores, LoadStrategy::Concurrent, 1)
            .load::<Furniture>(upload(1..=50).as_bytes())
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::Primary { id: 3, .. }), "{err:?}");
        assert_eq!(stores.primary().insert_attempts(), 3);
        assert_eq!(stores.secondary().insert_attempts(), 2);
        assert_eq!(stores.primary().len::<Furniture>(), 0);
    }

    #[tokio::test]
    async fn test_secondary_failure_is_partial_and_rolled_back() {
        let stores = stores();
        stores.secondary().fail_insert(3);
        let err = BulkLoader::new(&stores, LoadStrategy::Sequential, 1)
            .load::<Furniture>(upload(1..=5).as_bytes())
            .await
            .unwrap_err();
        assert!(err.is_partial());
        assert_eq!(stores.primary().len::<Furniture>(), 0);
        assert_eq!(stores.secondary().len::<Furniture>(), 0);
    }

    #[tokio::test]
    async fn test_secondary_commit_failure_is_compensated() {
        let stores = stores();
        stores.primary().seed(csv_rows(100..=101));
        stores.secondary().fail_next_commit();

        let err = BulkLoader::new(&stores, LoadStrategy::Concurrent, 2)
            .load::<Furniture>(upload(1..=4).as_bytes())
            .await
            .unwrap_err();

        assert!(matches!(err, LoadError::SecondaryCommit { compensated: true, .. }));
        let remaining: Vec<i64> = stores.primary().rows::<Furniture>().iter().map(|f| f.id).collect();
        assert_eq!(remaining, vec![100, 101]);
        assert_eq!(stores.secondary().len::<Furniture>(), 0);
    }

    #[tokio::test]
    async fn test_malformed_trailing_row_writes_nothing() {
        let stores = stores();
        let input = format!("{}broken,row\n", upload(1..=3));
        let err = BulkLoader::new(&stores, LoadStrategy::Concurrent, 2)
            .load::<Furniture>(input.as_bytes())
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::Parse { row: 4, .. }));
        assert_eq!(stores.primary().len::<Furniture>(), 0);
    }

    fn csv_rows(ids: std::ops::RangeInclusive<i64>) -> Vec<Furniture> {
        parse_rows(upload(ids).as_bytes()).unwrap()
    }
}
