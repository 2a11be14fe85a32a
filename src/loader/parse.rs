//! Positional CSV row parsing.

use std::collections::HashSet;

use csv::StringRecord;

use super::errors::{LoadError, LoadResult};
use crate::model::{Furniture, Property, Record};

/// A record that can be read from one headerless CSV row laid out as
/// [`Record::COLUMNS`].
pub trait CsvRecord: Record {
    fn from_csv(fields: &Fields<'_>) -> Result<Self, String>;
}

/// Typed access to the fields of one row.
pub struct Fields<'a> {
    record: &'a StringRecord,
    columns: &'static [&'static str],
}

impl<'a> Fields<'a> {
    fn position(&self, column: &str) -> Result<usize, String> {
        self.columns
            .iter()
            .position(|c| *c == column)
            .ok_or_else(|| format!("unknown column {column}"))
    }

    fn raw(&self, column: &str) -> Result<&'a str, String> {
        let index = self.position(column)?;
        self.record
            .get(index)
            .ok_or_else(|| format!("missing column {column}"))
    }

    pub fn text(&self, column: &str) -> Result<String, String> {
        self.raw(column).map(str::to_string)
    }

    pub fn int(&self, column: &str) -> Result<i64, String> {
        let value = self.raw(column)?;
        value
            .parse()
            .map_err(|_| format!("{column} is not an integer: {value:?}"))
    }

    pub fn float(&self, column: &str) -> Result<f64, String> {
        let value = self.raw(column)?;
        value
            .parse()
            .map_err(|_| format!("{column} is not a number: {value:?}"))
    }
}

impl CsvRecord for Property {
    fn from_csv(fields: &Fields<'_>) -> Result<Self, String> {
        Ok(Self {
            id: fields.int("id")?,
            name: fields.text("name")?,
            description: fields.text("description")?,
            thumbnail: fields.text("thumbnail")?,
            address: fields.text("address")?,
            latitude: fields.float("latitude")?,
            longitude: fields.float("longitude")?,
            rent: fields.int("rent")?,
            door_height: fields.int("door_height")?,
            door_width: fields.int("door_width")?,
            features: fields.text("features")?,
            popularity: fields.int("popularity")?,
        })
    }
}

impl CsvRecord for Furniture {
    fn from_csv(fields: &Fields<'_>) -> Result<Self, String> {
        let stock = fields.int("stock")?;
        if stock < 0 {
            return Err(format!("stock must not be negative, found {stock}"));
        }
        Ok(Self {
            id: fields.int("id")?,
            name: fields.text("name")?,
            description: fields.text("description")?,
            thumbnail: fields.text("thumbnail")?,
            price: fields.int("price")?,
            height: fields.int("height")?,
            width: fields.int("width")?,
            depth: fields.int("depth")?,
            color: fields.text("color")?,
            features: fields.text("features")?,
            kind: fields.text("kind")?,
            popularity: fields.int("popularity")?,
            stock,
        })
    }
}

/// Parse a whole upload. Any bad row rejects the upload; rows are numbered
/// from 1.
pub fn parse_rows<R: CsvRecord>(input: &[u8]) -> LoadResult<Vec<R>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input);

    let mut rows = Vec::new();
    let mut seen = HashSet::new();

    for (index, result) in reader.records().enumerate() {
        let row = index + 1;
        let record = result.map_err(|e| LoadError::Parse {
            row,
            message: e.to_string(),
        })?;

        if record.len() != R::COLUMNS.len() {
            return Err(LoadError::Parse {
                row,
                message: format!(
                    "expected {} fields, found {}",
                    R::COLUMNS.len(),
                    record.len()
                ),
            });
        }

        let fields = Fields {
            record: &record,
            columns: R::COLUMNS,
        };
        let parsed = R::from_csv(&fields).map_err(|message| LoadError::Parse { row, message })?;

        if !seen.insert(parsed.id()) {
            return Err(LoadError::DuplicateId {
                row,
                id: parsed.id(),
            });
        }
        rows.push(parsed);
    }

    Ok(rows)
}
