//! # Geo Module
//!
//! Coordinates, polygons and the bounding-box prefilter used by the polygon
//! ("nazotte") search.

mod nazotte;

use serde::{Deserialize, Serialize};

pub use nazotte::NazotteSearch;

/// A point on the map, latitude first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// `POINT(lat lon)`
    pub fn to_wkt(&self) -> String {
        format!("POINT({} {})", self.latitude, self.longitude)
    }
}

/// Axis-aligned rectangle, bounds inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Coordinate,
    pub max: Coordinate,
}

impl BoundingBox {
    pub fn contains(&self, point: Coordinate) -> bool {
        point.latitude >= self.min.latitude
            && point.latitude <= self.max.latitude
            && point.longitude >= self.min.longitude
            && point.longitude <= self.max.longitude
    }
}

/// A closed ring given by its vertices; the closing edge is implicit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub coordinates: Vec<Coordinate>,
}

impl Polygon {
    pub fn new(coordinates: Vec<Coordinate>) -> Self {
        Self { coordinates }
    }

    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }

    /// Smallest box covering every vertex; `None` for an empty polygon.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let first = *self.coordinates.first()?;
        let (min, max) = self.coordinates.iter().skip(1).fold(
            (first, first),
            |(mut min, mut max), c| {
                min.latitude = min.latitude.min(c.latitude);
                min.longitude = min.longitude.min(c.longitude);
                max.latitude = max.latitude.max(c.latitude);
                max.longitude = max.longitude.max(c.longitude);
                (min, max)
            },
        );
        Some(BoundingBox { min, max })
    }

    /// `POLYGON((lat lon, ..., first))` with the ring closed.
    pub fn to_wkt(&self) -> String {
        let ring = self
            .coordinates
            .iter()
            .chain(self.coordinates.first())
            .map(|c| format!("{} {}", c.latitude, c.longitude))
            .collect::<Vec<_>>()
            .join(",");
        format!("POLYGON(({ring}))")
    }

    /// Even-odd ray casting. Fewer than three vertices contain nothing.
    pub fn contains(&self, point: Coordinate) -> bool {
        let vertices = &self.coordinates;
        if vertices.len() < 3 {
            return false;
        }

        let (px, py) = (point.longitude, point.latitude);
        let mut inside = false;
        let mut j = vertices.len() - 1;
        for (i, vi) in vertices.iter().enumerate() {
            let vj = vertices[j];
            let (xi, yi) = (vi.longitude, vi.latitude);
            let (xj, yj) = (vj.longitude, vj.latitude);
            if (yi > py) != (yj > py) && px < (xj - xi) * (py - yi) / (yj - yi) + xi {
                inside = !inside;
            }
            j = i;
        }
        inside
    }
}
