//! Range buckets and categorical option lists.
//!
//! Clients select numeric ranges by bucket index instead of raw numbers. A
//! bucket is `[min, max)`; either side may be unbounded, which the condition
//! documents encode as `-1`.

use serde::{Deserialize, Serialize};

use super::errors::{CatalogError, CatalogResult, RangeError};

/// Sentinel used by the condition documents for a missing bound.
pub const NO_BOUND: i64 = -1;

/// One indexed interval, inclusive minimum and exclusive maximum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeBucket {
    pub id: i64,
    #[serde(with = "bound")]
    pub min: Option<i64>,
    #[serde(with = "bound")]
    pub max: Option<i64>,
}

impl RangeBucket {
    pub fn new(id: i64, min: Option<i64>, max: Option<i64>) -> Self {
        Self { id, min, max }
    }
}

/// The ordered buckets for one searchable attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeCondition {
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub suffix: String,
    pub ranges: Vec<RangeBucket>,
}

impl RangeCondition {
    pub fn new(ranges: Vec<RangeBucket>) -> Self {
        Self {
            prefix: String::new(),
            suffix: String::new(),
            ranges,
        }
    }

    /// Resolve a raw bucket token to its interval.
    pub fn resolve(&self, token: &str) -> Result<&RangeBucket, RangeError> {
        let index: i64 = token
            .parse()
            .map_err(|_| RangeError::NotAnInteger(token.to_string()))?;

        usize::try_from(index)
            .ok()
            .and_then(|i| self.ranges.get(i))
            .ok_or(RangeError::OutOfRange {
                index,
                count: self.ranges.len(),
            })
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Check that ids are positional and every bucket is non-empty.
    pub(crate) fn validate(&self, attribute: &'static str) -> CatalogResult<()> {
        for (position, bucket) in self.ranges.iter().enumerate() {
            if bucket.id != position as i64 {
                return Err(CatalogError::UnstableIndex {
                    attribute,
                    position,
                    id: bucket.id,
                });
            }
            if let (Some(min), Some(max)) = (bucket.min, bucket.max) {
                if min >= max {
                    return Err(CatalogError::EmptyBucket {
                        attribute,
                        id: bucket.id,
                        min,
                        max,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Allowed values for a categorical attribute. Only echoed to clients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListCondition {
    pub list: Vec<String>,
}

mod bound {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::NO_BOUND;

    pub fn serialize<S: Serializer>(value: &Option<i64>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(value.unwrap_or(NO_BOUND))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        Ok((raw != NO_BOUND).then_some(raw))
    }
}
