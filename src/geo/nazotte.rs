//! Polygon search: bounding-box prefilter, then an exact containment test per
//! candidate in popularity order until the result cap is reached.

use tracing::debug;

use super::Polygon;
use crate::model::{Located, Record, SearchPage};
use crate::store::{CatalogStore, StoreResult};

#[derive(Debug, Clone, Copy)]
pub struct NazotteSearch {
    limit: usize,
}

impl NazotteSearch {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    /// Items of `store` inside `polygon`, most popular first, at most `limit`.
    /// An empty polygon matches nothing.
    pub async fn run<S, R>(&self, store: &S, polygon: &Polygon) -> StoreResult<SearchPage<R>>
    where
        S: CatalogStore,
        R: Located,
    {
        let Some(bbox) = polygon.bounding_box() else {
            return Ok(SearchPage::empty());
        };

        let candidates: Vec<R> = store.within_box(&bbox).await?;
        debug!(candidates = candidates.len(), "nazotte prefilter");

        let mut found = Vec::new();
        for candidate in candidates {
            if found.len() >= self.limit {
                break;
            }
            if let Some(item) = store.find_contained::<R>(candidate.id(), polygon).await? {
                found.push(item);
            }
        }

        Ok(SearchPage::new(found.len() as i64, found))
    }
}
