//! # Result Cache
//!
//! Per-catalog search result caches. Each catalog caches total counts by
//! filter and the first page of results by filter and page size. Every cache
//! is emptied through [`Caches::flush_all`] whenever the catalog changes.

mod ttl;

use std::time::Duration;

pub use ttl::{CacheStats, TtlCache};

use crate::config::CacheSettings;
use crate::model::{Furniture, Property, SearchPage};

/// Flush counters of both caches of a [`SearchCache`], read before a search
/// touches the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generation {
    counts: u64,
    pages: u64,
}

/// Count and first-page caches for one catalog.
#[derive(Debug)]
pub struct SearchCache<T> {
    counts: TtlCache<i64>,
    pages: TtlCache<SearchPage<T>>,
    count_ttl: Duration,
    page_ttl: Duration,
}

impl<T: Clone> SearchCache<T> {
    pub fn new(count_ttl: Duration, page_ttl: Duration) -> Self {
        Self {
            counts: TtlCache::new(),
            pages: TtlCache::new(),
            count_ttl,
            page_ttl,
        }
    }

    pub fn generation(&self) -> Generation {
        Generation {
            counts: self.counts.generation(),
            pages: self.pages.generation(),
        }
    }

    pub fn count(&self, key: &str) -> Option<i64> {
        self.counts.get(key)
    }

    /// Store a count computed after `generation` was read. Dropped if the
    /// cache was flushed in between.
    pub fn put_count(&self, key: &str, count: i64, generation: Generation) -> bool {
        self.counts
            .put_if_generation(key, count, self.count_ttl, generation.counts)
    }

    pub fn page(&self, key: &str) -> Option<SearchPage<T>> {
        self.pages.get(key)
    }

    /// Store a first page computed after `generation` was read. Dropped if
    /// the cache was flushed in between.
    pub fn put_page(&self, key: &str, page: SearchPage<T>, generation: Generation) -> bool {
        self.pages
            .put_if_generation(key, page, self.page_ttl, generation.pages)
    }

    pub fn flush_all(&self) {
        self.counts.flush_all();
        self.pages.flush_all();
    }

    pub fn count_stats(&self) -> CacheStats {
        self.counts.stats()
    }

    pub fn page_stats(&self) -> CacheStats {
        self.pages.stats()
    }
}

/// Every result cache the service owns.
#[derive(Debug)]
pub struct Caches {
    pub property: SearchCache<Property>,
    pub furniture: SearchCache<Furniture>,
}

impl Caches {
    pub fn new(settings: &CacheSettings) -> Self {
        let (count_ttl, page_ttl) = (settings.count_ttl(), settings.page_ttl());
        Self {
            property: SearchCache::new(count_ttl, page_ttl),
            furniture: SearchCache::new(count_ttl, page_ttl),
        }
    }

    pub fn flush_all(&self) {
        let property = self.property.page_stats().hit_rate();
        let furniture = self.furniture.page_stats().hit_rate();
        self.property.flush_all();
        self.furniture.flush_all();
        tracing::debug!(
            property_page_hit_rate = property,
            furniture_page_hit_rate = furniture,
            "search caches flushed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_pages_are_separate() {
        let cache: SearchCache<i32> =
            SearchCache::new(Duration::from_secs(60), Duration::from_secs(60));
        let generation = cache.generation();
        assert!(cache.put_count("k", 3, generation));
        assert_eq!(cache.count("k"), Some(3));
        assert!(cache.page("k").is_none());

        assert!(cache.put_page("k", SearchPage::new(3, vec![1, 2, 3]), generation));
        assert_eq!(cache.page("k").unwrap().items, vec![1, 2, 3]);
        assert_eq!(cache.page_stats().hits, 1);
        assert_eq!(cache.page_stats().misses, 1);
    }

    #[test]
    fn test_flush_all_clears_every_catalog() {
        let caches = Caches::new(&CacheSettings::default());
        let property = caches.property.generation();
        let furniture = caches.furniture.generation();
        caches.property.put_count("a", 1, property);
        caches.furniture.put_page("b", SearchPage::empty(), furniture);

        caches.flush_all();

        assert_eq!(caches.property.count_stats().entries, 0);
        assert_eq!(caches.furniture.page_stats().entries, 0);
    }

    #[test]
    fn test_results_read_before_flush_are_not_cached() {
        let caches = Caches::new(&CacheSettings::default());
        let stale = caches.property.generation();

        caches.flush_all();

        assert!(!caches.property.put_count("a", 1, stale));
        assert!(!caches.property.put_page("a", SearchPage::empty(), stale));
        assert!(caches.property.count("a").is_none());
        assert!(caches.property.page("a").is_none());
    }
}
