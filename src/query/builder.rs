//! # Search Query Builder
//!
//! Turns search request parameters into an ordered predicate list, pagination
//! and the cache keys the result cache is addressed by.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::errors::{QueryError, QueryResult};
use super::predicate::{where_clause, Predicate};
use crate::catalog::{FurnitureSearchCondition, PropertySearchCondition, RangeCondition};

/// Parameter name of the zero-based page index
pub const PAGE_PARAM: &str = "page";

/// Parameter name of the page size
pub const PER_PAGE_PARAM: &str = "perPage";

/// How the page-cache key is derived from a request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheKeyMode {
    /// Sorted `name=value` pairs of the recognized parameters
    #[default]
    Canonical,
    /// The request's raw query string, verbatim
    RawQuery,
}

/// Query parameters of one search request
#[derive(Debug, Clone, Default)]
pub struct SearchParams {
    params: HashMap<String, String>,
    raw_query: String,
}

impl SearchParams {
    pub fn new(params: HashMap<String, String>) -> Self {
        Self {
            params,
            raw_query: String::new(),
        }
    }

    pub fn with_raw_query(mut self, raw_query: impl Into<String>) -> Self {
        self.raw_query = raw_query.into();
        self
    }

    /// Value of `name`, treating the empty string as absent.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn raw_query(&self) -> &str {
        &self.raw_query
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SearchParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Zero-based page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
}

impl Pagination {
    pub fn parse(params: &SearchParams) -> QueryResult<Self> {
        let page = parse_int(params, PAGE_PARAM)?;
        if page < 0 {
            return Err(QueryError::InvalidParam {
                param: PAGE_PARAM,
                value: page.to_string(),
            });
        }

        let per_page = parse_int(params, PER_PAGE_PARAM)?;
        if per_page <= 0 {
            return Err(QueryError::InvalidParam {
                param: PER_PAGE_PARAM,
                value: per_page.to_string(),
            });
        }

        Ok(Self { page, per_page })
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }

    pub fn offset(&self) -> i64 {
        self.page.saturating_mul(self.per_page)
    }

    pub fn is_first(&self) -> bool {
        self.page == 0
    }
}

fn parse_int(params: &SearchParams, name: &'static str) -> QueryResult<i64> {
    let value = params.get(name).ok_or(QueryError::MissingParam(name))?;
    value.parse().map_err(|_| QueryError::InvalidParam {
        param: name,
        value: value.to_string(),
    })
}

/// What a filter parameter turns into
#[derive(Debug, Clone, Copy)]
enum FilterKind<'c> {
    /// Bucket id resolved against a range condition
    Range(&'c RangeCondition),
    /// Exact match
    Equals,
    /// Comma-separated tags, each required as a substring
    Tags,
}

#[derive(Debug, Clone, Copy)]
struct Filter<'c> {
    param: &'static str,
    column: &'static str,
    kind: FilterKind<'c>,
}

impl<'c> Filter<'c> {
    fn range(param: &'static str, column: &'static str, condition: &'c RangeCondition) -> Self {
        Self {
            param,
            column,
            kind: FilterKind::Range(condition),
        }
    }

    fn equals(param: &'static str, column: &'static str) -> Self {
        Self {
            param,
            column,
            kind: FilterKind::Equals,
        }
    }

    fn tags(param: &'static str, column: &'static str) -> Self {
        Self {
            param,
            column,
            kind: FilterKind::Tags,
        }
    }

    fn apply(&self, value: &str, out: &mut Vec<Predicate>) -> QueryResult<()> {
        match self.kind {
            FilterKind::Range(condition) => {
                let bucket = condition.resolve(value).map_err(|source| QueryError::Range {
                    param: self.param,
                    source,
                })?;
                if let Some(min) = bucket.min {
                    out.push(Predicate::AtLeast {
                        column: self.column,
                        value: min,
                    });
                }
                if let Some(max) = bucket.max {
                    out.push(Predicate::Below {
                        column: self.column,
                        value: max,
                    });
                }
            }
            FilterKind::Equals => out.push(Predicate::Equals {
                column: self.column,
                value: value.to_string(),
            }),
            FilterKind::Tags => {
                out.extend(value.split(',').map(|tag| Predicate::Contains {
                    column: self.column,
                    value: tag.to_string(),
                }));
            }
        }
        Ok(())
    }
}

/// A fully resolved search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub filter: Vec<Predicate>,
    pub pagination: Pagination,
    /// Addresses the total-count cache
    pub count_key: String,
    /// Addresses the first-page cache
    pub page_key: String,
}

impl SearchQuery {
    /// The conjunctive `WHERE` body in encounter order.
    pub fn where_clause(&self) -> String {
        where_clause(&self.filter)
    }
}

/// Per-catalog builder holding the fixed filter table.
#[derive(Debug, Clone)]
pub struct SearchQueryBuilder<'c> {
    filters: Vec<Filter<'c>>,
    in_stock_only: bool,
    key_mode: CacheKeyMode,
}

impl<'c> SearchQueryBuilder<'c> {
    pub fn property(condition: &'c PropertySearchCondition) -> Self {
        Self {
            filters: vec![
                Filter::range("doorHeightRangeId", "door_height", &condition.door_height),
                Filter::range("doorWidthRangeId", "door_width", &condition.door_width),
                Filter::range("rentRangeId", "rent", &condition.rent),
                Filter::tags("features", "features"),
            ],
            in_stock_only: false,
            key_mode: CacheKeyMode::default(),
        }
    }

    pub fn furniture(condition: &'c FurnitureSearchCondition) -> Self {
        Self {
            filters: vec![
                Filter::range("priceRangeId", "price", &condition.price),
                Filter::range("heightRangeId", "height", &condition.height),
                Filter::range("widthRangeId", "width", &condition.width),
                Filter::range("depthRangeId", "depth", &condition.depth),
                Filter::equals("kind", "kind"),
                Filter::equals("color", "color"),
                Filter::tags("features", "features"),
            ],
            in_stock_only: true,
            key_mode: CacheKeyMode::default(),
        }
    }

    pub fn key_mode(mut self, mode: CacheKeyMode) -> Self {
        self.key_mode = mode;
        self
    }

    pub fn build(&self, params: &SearchParams) -> QueryResult<SearchQuery> {
        let mut filter = Vec::new();
        let mut recognized = BTreeMap::new();

        for known in &self.filters {
            if let Some(value) = params.get(known.param) {
                known.apply(value, &mut filter)?;
                recognized.insert(known.param, value);
            }
        }

        if filter.is_empty() {
            return Err(QueryError::NoSearchCriteria);
        }

        if self.in_stock_only {
            filter.push(Predicate::InStock);
        }

        let pagination = Pagination::parse(params)?;

        let count_key = recognized
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("&");
        let page_key = match self.key_mode {
            CacheKeyMode::Canonical => {
                format!("{count_key}&{PER_PAGE_PARAM}={}", pagination.per_page)
            }
            CacheKeyMode::RawQuery => params.raw_query().to_string(),
        };

        Ok(SearchQuery {
            filter,
            pagination,
            count_key,
            page_key,
        })
    }
}
