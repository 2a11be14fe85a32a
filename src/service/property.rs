//! Property operations. Reads go to the secondary store.

use tracing::info;

use super::{cached_search, parse_id, AppState, ContactRequest, ServiceError, ServiceResult};
use crate::geo::Polygon;
use crate::loader::LoadReport;
use crate::model::{Furniture, Property, SearchPage};
use crate::query::{Predicate, SearchParams, SearchQueryBuilder, SortOrder};
use crate::store::CatalogStore;

impl<S: CatalogStore> AppState<S> {
    pub async fn property_detail(&self, id: &str) -> ServiceResult<Property> {
        let id = parse_id(id)?;
        self.stores
            .secondary()
            .find_by_id::<Property>(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("estate {id} not found")))
    }

    pub async fn search_properties(&self, params: &SearchParams) -> ServiceResult<SearchPage<Property>> {
        let query = SearchQueryBuilder::property(&self.conditions.property)
            .key_mode(self.config.cache.key_mode)
            .build(params)?;
        cached_search(self.stores.secondary(), &self.caches.property, &query).await
    }

    /// Cheapest properties first.
    pub async fn low_priced_properties(&self) -> ServiceResult<Vec<Property>> {
        Ok(self
            .stores
            .secondary()
            .select::<Property>(&[], SortOrder::Cheapest("rent"), self.list_limit(), 0)
            .await?)
    }

    /// Properties located inside `polygon`.
    pub async fn nazotte_search(&self, polygon: &Polygon) -> ServiceResult<SearchPage<Property>> {
        if polygon.is_empty() {
            return Err(ServiceError::Validation(
                "polygon needs at least one coordinate".to_string(),
            ));
        }
        Ok(self.nazotte.run(self.stores.secondary(), polygon).await?)
    }

    pub async fn request_document(&self, id: &str, request: &ContactRequest) -> ServiceResult<()> {
        let id = parse_id(id)?;
        let found = self.stores.secondary().find_by_id::<Property>(id).await?;
        if found.is_none() {
            return Err(ServiceError::NotFound(format!("estate {id} not found")));
        }
        info!(estate = id, email = %request.email, "document requested");
        Ok(())
    }

    /// Most popular properties whose door the furniture item fits through.
    pub async fn recommended_properties(&self, furniture_id: &str) -> ServiceResult<Vec<Property>> {
        let id = parse_id(furniture_id)?;
        let furniture = self
            .stores
            .secondary()
            .find_by_id::<Furniture>(id)
            .await?
            .ok_or_else(|| ServiceError::Validation(format!("chair {id} not found")))?;

        let (short, long) = furniture.smallest_sides();
        let filter = [Predicate::DoorFits { short, long }];
        Ok(self
            .stores
            .secondary()
            .select::<Property>(&filter, SortOrder::Popular, self.list_limit(), 0)
            .await?)
    }

    pub async fn load_properties(&self, input: &[u8]) -> ServiceResult<LoadReport> {
        self.bulk_load::<Property>(input, self.config.loader.property_strategy)
            .await
    }
}
