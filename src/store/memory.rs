//! In-memory catalog store.
//!
//! Rows live in one ordered map keyed by `(table, id)`. Write transactions are
//! serialized by an async mutex held from `begin` until commit or drop, and
//! stage their changes in an overlay that is applied atomically on commit.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use super::{CatalogStore, StoreError, StoreResult, StoreTransaction};
use crate::geo::{BoundingBox, Polygon};
use crate::model::{Item, Located, Record, Stocked, Table};
use crate::query::{Predicate, SortOrder};

type Key = (Table, i64);

fn key<R: Record>(id: i64) -> Key {
    (R::TABLE, id)
}

fn matches_all<R: Record>(record: &R, filter: &[Predicate]) -> bool {
    filter.iter().all(|p| p.matches(record))
}

#[derive(Default)]
struct Shared {
    rows: RwLock<BTreeMap<Key, Item>>,
    writer: Arc<AsyncMutex<()>>,
    failing_inserts: Mutex<HashSet<i64>>,
    fail_next_commit: AtomicBool,
    containment_checks: AtomicU64,
    insert_attempts: AtomicU64,
}

impl Shared {
    fn get<R: Record>(&self, id: i64) -> Option<R> {
        self.rows.read().get(&key::<R>(id)).and_then(R::from_item).cloned()
    }

    fn scan<R: Record>(&self, mut keep: impl FnMut(&R) -> bool) -> Vec<R> {
        let rows = self.rows.read();
        rows.range(key::<R>(i64::MIN)..=key::<R>(i64::MAX))
            .filter_map(|(_, item)| R::from_item(item))
            .filter(|r| keep(r))
            .cloned()
            .collect()
    }
}

/// Catalog store held entirely in process memory. Clones share state.
#[derive(Clone, Default)]
pub struct MemoryStore {
    shared: Arc<Shared>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert committed rows directly, replacing any with the same id.
    pub fn seed<R: Record>(&self, records: impl IntoIterator<Item = R>) {
        let mut rows = self.shared.rows.write();
        for record in records {
            rows.insert(key::<R>(record.id()), record.into_item());
        }
    }

    /// Every committed row of `R`, by ascending id.
    pub fn rows<R: Record>(&self) -> Vec<R> {
        self.shared.scan(|_| true)
    }

    pub fn len<R: Record>(&self) -> usize {
        let rows = self.shared.rows.read();
        rows.range(key::<R>(i64::MIN)..=key::<R>(i64::MAX)).count()
    }

    /// Make every later insert of `id` fail.
    pub fn fail_insert(&self, id: i64) {
        self.shared.failing_inserts.lock().insert(id);
    }

    /// Number of exact containment tests run so far.
    pub fn containment_checks(&self) -> u64 {
        self.shared.containment_checks.load(Ordering::Relaxed)
    }

    /// Number of transactional inserts tried so far, rejected ones included.
    pub fn insert_attempts(&self) -> u64 {
        self.shared.insert_attempts.load(Ordering::Relaxed)
    }

    /// Make the next commit fail, discarding its changes.
    pub fn fail_next_commit(&self) {
        self.shared.fail_next_commit.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    type Tx = MemoryTransaction;

    async fn begin(&self) -> StoreResult<MemoryTransaction> {
        let writer = self.shared.writer.clone().lock_owned().await;
        Ok(MemoryTransaction {
            shared: self.shared.clone(),
            staged: BTreeMap::new(),
            _writer: writer,
        })
    }

    async fn find_by_id<R: Record>(&self, id: i64) -> StoreResult<Option<R>> {
        Ok(self.shared.get(id))
    }

    async fn count<R: Record>(&self, filter: &[Predicate]) -> StoreResult<i64> {
        let rows = self.shared.rows.read();
        let count = rows
            .range(key::<R>(i64::MIN)..=key::<R>(i64::MAX))
            .filter_map(|(_, item)| R::from_item(item))
            .filter(|r| matches_all(*r, filter))
            .count();
        Ok(count as i64)
    }

    async fn select<R: Record>(
        &self,
        filter: &[Predicate],
        order: SortOrder,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<R>> {
        let mut found = self.shared.scan(|r: &R| matches_all(r, filter));
        found.sort_by(|a, b| order.compare(a, b));
        Ok(found
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(0))
            .take(usize::try_from(limit).unwrap_or(0))
            .collect())
    }

    async fn within_box<R: Located>(&self, bbox: &BoundingBox) -> StoreResult<Vec<R>> {
        let mut found = self.shared.scan(|r: &R| bbox.contains(r.location()));
        found.sort_by(|a, b| SortOrder::Popular.compare(a, b));
        Ok(found)
    }

    async fn find_contained<R: Located>(
        &self,
        id: i64,
        polygon: &Polygon,
    ) -> StoreResult<Option<R>> {
        self.shared.containment_checks.fetch_add(1, Ordering::Relaxed);
        Ok(self
            .shared
            .get::<R>(id)
            .filter(|r| polygon.contains(r.location())))
    }

    async fn reset(&self) -> StoreResult<()> {
        self.shared.rows.write().clear();
        Ok(())
    }
}

/// Staged writes against a [`MemoryStore`].
pub struct MemoryTransaction {
    shared: Arc<Shared>,
    /// `None` marks a deletion
    staged: BTreeMap<Key, Option<Item>>,
    _writer: OwnedMutexGuard<()>,
}

impl MemoryTransaction {
    fn current<R: Record>(&self, id: i64) -> Option<R> {
        match self.staged.get(&key::<R>(id)) {
            Some(staged) => staged.as_ref().and_then(R::from_item).cloned(),
            None => self.shared.get(id),
        }
    }
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
    async fn insert<R: Record>(&mut self, record: &R) -> StoreResult<()> {
        let id = record.id();
        self.shared.insert_attempts.fetch_add(1, Ordering::Relaxed);
        if self.shared.failing_inserts.lock().contains(&id) {
            return Err(StoreError::Execution(format!(
                "insert of {} {id} rejected",
                R::TABLE.name()
            )));
        }
        if self.current::<R>(id).is_some() {
            return Err(StoreError::Duplicate {
                table: R::TABLE.name(),
                id,
            });
        }
        self.staged
            .insert(key::<R>(id), Some(record.clone().into_item()));
        Ok(())
    }

    async fn delete<R: Record>(&mut self, ids: &[i64]) -> StoreResult<u64> {
        let mut deleted = 0;
        for &id in ids {
            if self.current::<R>(id).is_some() {
                self.staged.insert(key::<R>(id), None);
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    async fn find_for_update<R: Record>(
        &mut self,
        id: i64,
        filter: &[Predicate],
    ) -> StoreResult<Option<R>> {
        Ok(self
            .current::<R>(id)
            .filter(|r| matches_all(r, filter)))
    }

    async fn decrement_stock<R: Stocked>(&mut self, id: i64) -> StoreResult<()> {
        let mut record = self.current::<R>(id).ok_or_else(|| {
            StoreError::Execution(format!("{} {id} not found", R::TABLE.name()))
        })?;
        record.take_one();
        self.staged.insert(key::<R>(id), Some(record.into_item()));
        Ok(())
    }

    async fn commit(self) -> StoreResult<()> {
        if self.shared.fail_next_commit.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Execution("commit rejected".to_string()));
        }
        let mut rows = self.shared.rows.write();
        for (key, staged) in self.staged {
            match staged {
                Some(item) => {
                    rows.insert(key, item);
                }
                None => {
                    rows.remove(&key);
                }
            }
        }
        Ok(())
    }

    async fn rollback(self) -> StoreResult<()> {
        Ok(())
    }
}
