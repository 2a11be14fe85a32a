//! # Predicates
//!
//! Conjunctive filter terms. Each predicate renders to a SQL fragment with `?`
//! placeholders plus its bound parameters, and can also be evaluated directly
//! against a record.

use std::cmp::Ordering;
use std::fmt;

use crate::model::{Cell, Record};

/// A bound statement parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<Cell<'_>> for Param {
    fn from(cell: Cell<'_>) -> Self {
        match cell {
            Cell::Int(v) => Param::Int(v),
            Cell::Float(v) => Param::Float(v),
            Cell::Text(v) => Param::Text(v.to_string()),
        }
    }
}

/// One filter term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `column >= value`
    AtLeast { column: &'static str, value: i64 },

    /// `column < value`
    Below { column: &'static str, value: i64 },

    /// `column = value`
    Equals { column: &'static str, value: String },

    /// `column` contains `value` as a substring
    Contains { column: &'static str, value: String },

    /// `stock > 0`
    InStock,

    /// A door that an item of sides `short <= long` fits through in either
    /// orientation
    DoorFits { short: i64, long: i64 },
}

impl Predicate {
    /// SQL fragment with `?` placeholders.
    pub fn to_sql(&self) -> String {
        match self {
            Predicate::AtLeast { column, .. } => format!("{column} >= ?"),
            Predicate::Below { column, .. } => format!("{column} < ?"),
            Predicate::Equals { column, .. } => format!("{column} = ?"),
            Predicate::Contains { column, .. } => format!("{column} LIKE CONCAT('%', ?, '%')"),
            Predicate::InStock => "stock > 0".to_string(),
            Predicate::DoorFits { .. } => {
                "((door_width >= ? AND door_height >= ?) OR (door_width >= ? AND door_height >= ?))"
                    .to_string()
            }
        }
    }

    /// Parameters bound by [`Predicate::to_sql`], in placeholder order.
    pub fn params(&self) -> Vec<Param> {
        match self {
            Predicate::AtLeast { value, .. } | Predicate::Below { value, .. } => {
                vec![Param::Int(*value)]
            }
            Predicate::Equals { value, .. } | Predicate::Contains { value, .. } => {
                vec![Param::Text(value.clone())]
            }
            Predicate::InStock => Vec::new(),
            Predicate::DoorFits { short, long } => vec![
                Param::Int(*short),
                Param::Int(*long),
                Param::Int(*long),
                Param::Int(*short),
            ],
        }
    }

    /// Evaluate against a record. Unknown columns never match.
    pub fn matches<R: Record>(&self, record: &R) -> bool {
        let int = |column: &str| record.cell(column).and_then(|c| c.as_int());
        let text = |column: &str| record.cell(column).and_then(|c| c.as_text().map(str::to_owned));

        match self {
            Predicate::AtLeast { column, value } => int(column).is_some_and(|v| v >= *value),
            Predicate::Below { column, value } => int(column).is_some_and(|v| v < *value),
            Predicate::Equals { column, value } => text(column).is_some_and(|v| v == *value),
            Predicate::Contains { column, value } => {
                text(column).is_some_and(|v| v.contains(value.as_str()))
            }
            Predicate::InStock => int("stock").is_some_and(|v| v > 0),
            Predicate::DoorFits { short, long } => {
                match (int("door_width"), int("door_height")) {
                    (Some(w), Some(h)) => (w >= *short && h >= *long) || (w >= *long && h >= *short),
                    _ => false,
                }
            }
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

/// Join predicates into a `WHERE` body; empty when there are none.
pub fn where_clause(filter: &[Predicate]) -> String {
    filter
        .iter()
        .map(Predicate::to_sql)
        .collect::<Vec<_>>()
        .join(" AND ")
}

/// All parameters of `filter`, in placeholder order.
pub fn where_params(filter: &[Predicate]) -> Vec<Param> {
    filter.iter().flat_map(Predicate::params).collect()
}

/// Result ordering. Ties always break on ascending id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// `popularity DESC, id ASC`
    Popular,
    /// `<column> ASC, id ASC`
    Cheapest(&'static str),
}

impl SortOrder {
    pub fn to_sql(&self) -> String {
        match self {
            SortOrder::Popular => "popularity DESC, id ASC".to_string(),
            SortOrder::Cheapest(column) => format!("{column} ASC, id ASC"),
        }
    }

    pub fn compare<R: Record>(&self, a: &R, b: &R) -> Ordering {
        let primary = match self {
            SortOrder::Popular => b.popularity().cmp(&a.popularity()),
            SortOrder::Cheapest(column) => match (a.cell(column), b.cell(column)) {
                (Some(x), Some(y)) => x.compare(&y),
                _ => Ordering::Equal,
            },
        };
        primary.then_with(|| a.id().cmp(&b.id()))
    }
}
