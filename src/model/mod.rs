//! # Catalog Records
//!
//! The two item kinds served by the search API and the column-level view the
//! stores use to filter, sort and persist them.

mod furniture;
mod property;
mod response;

use std::cmp::Ordering;

use serde::Serialize;
use sqlx::mysql::MySqlRow;

use crate::geo::Coordinate;

pub use furniture::Furniture;
pub use property::Property;
pub use response::{
    FurnitureListResponse, FurnitureSearchResponse, InitializeResponse, PropertyListResponse,
    PropertySearchResponse, SearchPage,
};

/// Backing table of a record kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    Property,
    Furniture,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::Property => "estate",
            Table::Furniture => "chair",
        }
    }
}

/// A borrowed column value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<'a> {
    Int(i64),
    Float(f64),
    Text(&'a str),
}

impl Cell<'_> {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Cell::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Total order within one column type; mismatched types compare equal.
    pub fn compare(&self, other: &Cell<'_>) -> Ordering {
        match (self, other) {
            (Cell::Int(a), Cell::Int(b)) => a.cmp(b),
            (Cell::Float(a), Cell::Float(b)) => a.total_cmp(b),
            (Cell::Text(a), Cell::Text(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

/// Either kind of catalog item.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Property(Property),
    Furniture(Furniture),
}

/// A row of one catalog table.
pub trait Record: Clone + Serialize + Send + Sync + Unpin + 'static {
    const TABLE: Table;

    /// Column order used for inserts and CSV ingestion.
    const COLUMNS: &'static [&'static str];

    fn id(&self) -> i64;

    fn popularity(&self) -> i64;

    fn cell(&self, column: &str) -> Option<Cell<'_>>;

    fn decode(row: &MySqlRow) -> Result<Self, sqlx::Error>;

    fn into_item(self) -> Item;

    fn from_item(item: &Item) -> Option<&Self>;
}

/// A record with a map position.
pub trait Located: Record {
    fn location(&self) -> Coordinate;
}

/// A record sold from a finite stock.
pub trait Stocked: Record {
    fn stock(&self) -> i64;

    /// Remove one unit from stock.
    fn take_one(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_compare() {
        assert_eq!(Cell::Int(1).compare(&Cell::Int(2)), Ordering::Less);
        assert_eq!(Cell::Float(2.5).compare(&Cell::Float(2.5)), Ordering::Equal);
        assert_eq!(Cell::Text("b").compare(&Cell::Text("a")), Ordering::Greater);
        assert_eq!(Cell::Int(1).compare(&Cell::Text("a")), Ordering::Equal);
    }

    #[test]
    fn test_table_names() {
        assert_eq!(Table::Property.name(), "estate");
        assert_eq!(Table::Furniture.name(), "chair");
    }
}
