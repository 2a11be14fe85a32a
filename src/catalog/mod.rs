//! # Search Condition Catalog
//!
//! Static range buckets and option lists for both catalogs. Loaded once at
//! startup from the condition documents and shared read-only afterwards.

mod errors;
mod range;

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub use errors::{CatalogError, CatalogResult, RangeError};
pub use range::{ListCondition, RangeBucket, RangeCondition, NO_BOUND};

/// Searchable attributes of the property catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySearchCondition {
    pub door_width: RangeCondition,
    pub door_height: RangeCondition,
    pub rent: RangeCondition,
    pub feature: ListCondition,
}

impl PropertySearchCondition {
    fn validate(&self) -> CatalogResult<()> {
        self.door_width.validate("doorWidth")?;
        self.door_height.validate("doorHeight")?;
        self.rent.validate("rent")
    }
}

/// Searchable attributes of the furniture catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FurnitureSearchCondition {
    pub width: RangeCondition,
    pub height: RangeCondition,
    pub depth: RangeCondition,
    pub price: RangeCondition,
    pub color: ListCondition,
    pub feature: ListCondition,
    pub kind: ListCondition,
}

impl FurnitureSearchCondition {
    fn validate(&self) -> CatalogResult<()> {
        self.width.validate("width")?;
        self.height.validate("height")?;
        self.depth.validate("depth")?;
        self.price.validate("price")
    }
}

/// Both catalogs, immutable for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConditions {
    pub property: PropertySearchCondition,
    pub furniture: FurnitureSearchCondition,
}

impl SearchConditions {
    pub fn new(
        property: PropertySearchCondition,
        furniture: FurnitureSearchCondition,
    ) -> CatalogResult<Self> {
        property.validate()?;
        furniture.validate()?;
        Ok(Self {
            property,
            furniture,
        })
    }

    /// Load and validate both condition documents.
    pub fn load(property_path: &Path, furniture_path: &Path) -> CatalogResult<Self> {
        let property = load_document(property_path)?;
        let furniture = load_document(furniture_path)?;
        Self::new(property, furniture)
    }
}

fn load_document<T: DeserializeOwned>(path: &Path) -> CatalogResult<T> {
    let content = fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| CatalogError::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    fn buckets(bounds: &[(i64, i64)]) -> RangeCondition {
        let ranges = bounds
            .iter()
            .enumerate()
            .map(|(i, &(min, max))| {
                RangeBucket::new(
                    i as i64,
                    (min != NO_BOUND).then_some(min),
                    (max != NO_BOUND).then_some(max),
                )
            })
            .collect();
        RangeCondition::new(ranges)
    }

    pub fn conditions() -> SearchConditions {
        let size = [(-1, 80), (80, 110), (110, 150), (150, -1)];
        let property = PropertySearchCondition {
            door_width: buckets(&size),
            door_height: buckets(&size),
            rent: buckets(&[(-1, 50000), (50000, 100000), (100000, 150000), (150000, -1)]),
            feature: ListCondition {
                list: vec!["バストイレ別".to_string(), "駅から徒歩5分".to_string()],
            },
        };
        let furniture = FurnitureSearchCondition {
            width: buckets(&size),
            height: buckets(&size),
            depth: buckets(&size),
            price: buckets(&[(-1, 3000), (3000, 6000), (6000, 9000), (9000, -1)]),
            color: ListCondition {
                list: vec!["黒".to_string(), "白".to_string()],
            },
            feature: ListCondition::default(),
            kind: ListCondition {
                list: vec!["ゲーミングチェア".to_string(), "座椅子".to_string()],
            },
        };
        SearchConditions::new(property, furniture).expect("fixture conditions are valid")
    }
}
