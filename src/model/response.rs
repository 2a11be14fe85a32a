//! Response envelopes, shaped like the public API.

use serde::{Deserialize, Serialize};

use super::{Furniture, Property};

/// A counted page of search results, independent of the wire envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage<T> {
    pub count: i64,
    pub items: Vec<T>,
}

impl<T> SearchPage<T> {
    pub fn new(count: i64, items: Vec<T>) -> Self {
        Self { count, items }
    }

    pub fn empty() -> Self {
        Self::new(0, Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySearchResponse {
    pub count: i64,
    pub estates: Vec<Property>,
}

impl From<SearchPage<Property>> for PropertySearchResponse {
    fn from(page: SearchPage<Property>) -> Self {
        Self {
            count: page.count,
            estates: page.items,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyListResponse {
    pub estates: Vec<Property>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FurnitureSearchResponse {
    pub count: i64,
    pub chairs: Vec<Furniture>,
}

impl From<SearchPage<Furniture>> for FurnitureSearchResponse {
    fn from(page: SearchPage<Furniture>) -> Self {
        Self {
            count: page.count,
            chairs: page.items,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FurnitureListResponse {
    pub chairs: Vec<Furniture>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitializeResponse {
    pub language: String,
}

impl Default for InitializeResponse {
    fn default() -> Self {
        Self {
            language: "rust".to_string(),
        }
    }
}
