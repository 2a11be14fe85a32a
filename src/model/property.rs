use serde::{Deserialize, Serialize};
use sqlx::mysql::MySqlRow;
use sqlx::Row;

use super::{Cell, Item, Located, Record, Table};
use crate::geo::Coordinate;

/// A rental property listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: i64,
    pub thumbnail: String,
    pub name: String,
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub rent: i64,
    pub door_height: i64,
    pub door_width: i64,
    pub features: String,
    /// Ranking key, never sent to clients
    #[serde(skip_serializing, default)]
    pub popularity: i64,
}

impl Record for Property {
    const TABLE: Table = Table::Property;

    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "description",
        "thumbnail",
        "address",
        "latitude",
        "longitude",
        "rent",
        "door_height",
        "door_width",
        "features",
        "popularity",
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn popularity(&self) -> i64 {
        self.popularity
    }

    fn cell(&self, column: &str) -> Option<Cell<'_>> {
        Some(match column {
            "id" => Cell::Int(self.id),
            "name" => Cell::Text(&self.name),
            "description" => Cell::Text(&self.description),
            "thumbnail" => Cell::Text(&self.thumbnail),
            "address" => Cell::Text(&self.address),
            "latitude" => Cell::Float(self.latitude),
            "longitude" => Cell::Float(self.longitude),
            "rent" => Cell::Int(self.rent),
            "door_height" => Cell::Int(self.door_height),
            "door_width" => Cell::Int(self.door_width),
            "features" => Cell::Text(&self.features),
            "popularity" => Cell::Int(self.popularity),
            _ => return None,
        })
    }

    fn decode(row: &MySqlRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            thumbnail: row.try_get("thumbnail")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            latitude: row.try_get("latitude")?,
            longitude: row.try_get("longitude")?,
            address: row.try_get("address")?,
            rent: row.try_get("rent")?,
            door_height: row.try_get("door_height")?,
            door_width: row.try_get("door_width")?,
            features: row.try_get("features")?,
            popularity: row.try_get("popularity")?,
        })
    }

    fn into_item(self) -> Item {
        Item::Property(self)
    }

    fn from_item(item: &Item) -> Option<&Self> {
        match item {
            Item::Property(p) => Some(p),
            _ => None,
        }
    }
}

impl Located for Property {
    fn location(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}
