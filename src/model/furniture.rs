use serde::{Deserialize, Serialize};
use sqlx::mysql::MySqlRow;
use sqlx::Row;

use super::{Cell, Item, Record, Stocked, Table};

/// A furniture item with limited stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Furniture {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub thumbnail: String,
    pub price: i64,
    pub height: i64,
    pub width: i64,
    pub depth: i64,
    pub color: String,
    pub features: String,
    pub kind: String,
    #[serde(skip_serializing, default)]
    pub popularity: i64,
    #[serde(skip_serializing, default)]
    pub stock: i64,
}

impl Furniture {
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// The two smallest of width, height and depth, ascending.
    pub fn smallest_sides(&self) -> (i64, i64) {
        let mut sides = [self.width, self.height, self.depth];
        sides.sort_unstable();
        (sides[0], sides[1])
    }
}

impl Record for Furniture {
    const TABLE: Table = Table::Furniture;

    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "description",
        "thumbnail",
        "price",
        "height",
        "width",
        "depth",
        "color",
        "features",
        "kind",
        "popularity",
        "stock",
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
            "price" => Cell::Int(self.price),
            "height" => Cell::Int(self.height),
            "width" => Cell::Int(self.width),
            "depth" => Cell::Int(self.depth),
            "color" => Cell::Text(&self.color),
            "features" => Cell::Text(&self.features),
            "kind" => Cell::Text(&self.kind),
            "popularity" => Cell::Int(self.popularity),
            "stock" => Cell::Int(self.stock),
            _ => return None,
        })
    }

    fn decode(row: &MySqlRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            thumbnail: row.try_get("thumbnail")?,
            price: row.try_get("price")?,
            height: row.try_get("height")?,
            width: row.try_get("width")?,
            depth: row.try_get("depth")?,
            color: row.try_get("color")?,
            features: row.try_get("features")?,
            kind: row.try_get("kind")?,
            popularity: row.try_get("popularity")?,
            stock: row.try_get("stock")?,
        })
    }

    fn into_item(self) -> Item {
        Item::Furniture(self)
    }

    fn from_item(item: &Item) -> Option<&Self> {
        match item {
            Item::Furniture(f) => Some(f),
            _ => None,
        }
    }
}

impl Stocked for Furniture {
    fn stock(&self) -> i64 {
        self.stock
    }

    fn take_one(&mut self) {
        self.stock -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chair(width: i64, height: i64, depth: i64) -> Furniture {
        Furniture {
            id: 1,
            name: "chair".to_string(),
            description: String::new(),
            thumbnail: String::new(),
            price: 5000,
            height,
            width,
            depth,
            color: "黒".to_string(),
            features: String::new(),
            kind: "座椅子".to_string(),
            popularity: 10,
            stock: 3,
        }
    }

    #[test]
    fn test_smallest_sides() {
        assert_eq!(chair(100, 50, 70).smallest_sides(), (50, 70));
        assert_eq!(chair(40, 90, 60).smallest_sides(), (40, 60));
        assert_eq!(chair(80, 80, 80).smallest_sides(), (80, 80));
    }

    #[test]
    fn test_stock_and_popularity_hidden() {
        let json = serde_json::to_value(chair(1, 2, 3)).unwrap();
        assert!(json.get("stock").is_none());
        assert!(json.get("popularity").is_none());
        assert_eq!(json["kind"], "座椅子");
    }
}
