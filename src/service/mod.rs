//! # Service Layer
//!
//! The operations behind every endpoint, independent of HTTP. State shared by
//! all requests lives in [`AppState`]: configuration, the search conditions,
//! both stores and the result caches.

mod errors;
mod furniture;
mod property;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

pub use errors::{ErrorResponse, ServiceError, ServiceResult};

use crate::cache::{Caches, SearchCache};
use crate::catalog::SearchConditions;
use crate::config::Config;
use crate::geo::NazotteSearch;
use crate::loader::{BulkLoader, CsvRecord, LoadReport, LoadStrategy};
use crate::model::{InitializeResponse, Record, SearchPage};
use crate::observability::ObservationScope;
use crate::query::{SearchQuery, SortOrder};
use crate::store::{CatalogStore, DualStore};

/// Body of document requests and purchases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRequest {
    pub email: String,
}

/// Process-wide state, built once at startup.
pub struct AppState<S> {
    pub config: Config,
    pub conditions: Arc<SearchConditions>,
    pub stores: DualStore<S>,
    pub caches: Caches,
    nazotte: NazotteSearch,
}

impl<S: CatalogStore> AppState<S> {
    pub fn new(config: Config, conditions: SearchConditions, stores: DualStore<S>) -> Self {
        let caches = Caches::new(&config.cache);
        let nazotte = NazotteSearch::new(config.search.nazotte_limit);
        Self {
            config,
            conditions: Arc::new(conditions),
            stores,
            caches,
            nazotte,
        }
    }

    /// Reset both stores to their initial data and drop every cached result.
    pub async fn initialize(&self) -> ServiceResult<InitializeResponse> {
        let scope = ObservationScope::new("initialize");
        if let Err(err) = self.stores.reset().await {
            scope.fail(&err.to_string());
            return Err(err.into());
        }
        self.caches.flush_all();
        scope.complete();
        info!("stores initialized");
        Ok(InitializeResponse::default())
    }

    /// Load a CSV upload into both stores and flush the caches.
    async fn bulk_load<R: CsvRecord>(
        &self,
        input: &[u8],
        strategy: LoadStrategy,
    ) -> ServiceResult<LoadReport> {
        let report = BulkLoader::new(&self.stores, strategy, self.config.loader.workers)
            .load::<R>(input)
            .await?;
        self.caches.flush_all();
        Ok(report)
    }

    fn list_limit(&self) -> i64 {
        self.config.search.list_limit
    }
}

/// Count and page through `store`, serving the first page and the count from
/// `cache` when present.
async fn cached_search<S, R>(
    store: &S,
    cache: &SearchCache<R>,
    query: &SearchQuery,
) -> ServiceResult<SearchPage<R>>
where
    S: CatalogStore,
    R: Record,
{
    // read before any store access; a flush after this point voids the puts
    let generation = cache.generation();
    let first_page = query.pagination.is_first();
    if first_page {
        if let Some(page) = cache.page(&query.page_key) {
            return Ok(page);
        }
    }

    let count = match cache.count(&query.count_key) {
        Some(count) => count,
        None => {
            let count = store.count::<R>(&query.filter).await?;
            cache.put_count(&query.count_key, count, generation);
            count
        }
    };

    let items = store
        .select::<R>(
            &query.filter,
            SortOrder::Popular,
            query.pagination.limit(),
            query.pagination.offset(),
        )
        .await?;

    let page = SearchPage::new(count, items);
    if first_page {
        cache.put_page(&query.page_key, page.clone(), generation);
    }
    Ok(page)
}

fn parse_id(raw: &str) -> ServiceResult<i64> {
    raw.parse()
        .map_err(|_| ServiceError::Validation(format!("invalid id: {raw:?}")))
}
