//! Furniture operations. Reads and purchases go to the primary store; sold-out
//! items are invisible.

use tracing::info;

use super::{cached_search, parse_id, AppState, ContactRequest, ServiceError, ServiceResult};
use crate::loader::LoadReport;
use crate::model::{Furniture, SearchPage};
use crate::query::{Predicate, SearchParams, SearchQueryBuilder, SortOrder};
use crate::store::{CatalogStore, StoreTransaction};

impl<S: CatalogStore> AppState<S> {
    pub async fn furniture_detail(&self, id: &str) -> ServiceResult<Furniture> {
        let id = parse_id(id)?;
        self.stores
            .primary()
            .find_by_id::<Furniture>(id)
            .await?
            .filter(Furniture::in_stock)
            .ok_or_else(|| ServiceError::NotFound(format!("chair {id} not found")))
    }

    pub async fn search_furniture(&self, params: &SearchParams) -> ServiceResult<SearchPage<Furniture>> {
        let query = SearchQueryBuilder::furniture(&self.conditions.furniture)
            .key_mode(self.config.cache.key_mode)
            .build(params)?;
        cached_search(self.stores.primary(), &self.caches.furniture, &query).await
    }

    pub async fn low_priced_furniture(&self) -> ServiceResult<Vec<Furniture>> {
        Ok(self
            .stores
            .primary()
            .select::<Furniture>(
                &[Predicate::InStock],
                SortOrder::Cheapest("price"),
                self.list_limit(),
                0,
            )
            .await?)
    }

    /// Take one unit of stock. Fails with `NotFound` once the item is sold out.
    pub async fn purchase(&self, id: &str, request: &ContactRequest) -> ServiceResult<()> {
        let id = parse_id(id)?;
        let mut tx = self.stores.primary().begin().await?;

        let locked = tx
            .find_for_update::<Furniture>(id, &[Predicate::InStock])
            .await?;
        if locked.is_none() {
            tx.rollback().await?;
            return Err(ServiceError::NotFound(format!("chair {id} is not available")));
        }

        tx.decrement_stock::<Furniture>(id).await?;
        tx.commit().await?;
        self.caches.flush_all();

        info!(chair = id, email = %request.email, "chair purchased");
        Ok(())
    }

    pub async fn load_furniture(&self, input: &[u8]) -> ServiceResult<LoadReport> {
        self.bulk_load::<Furniture>(input, self.config.loader.furniture_strategy)
            .await
    }
}
