//! Shared fixtures for the integration suites.

#![allow(dead_code)]

use std::sync::Arc;

use estate_search::catalog::{
    FurnitureSearchCondition, ListCondition, PropertySearchCondition, RangeBucket, RangeCondition,
    SearchConditions,
};
use estate_search::config::{Backend, Config};
use estate_search::model::{Furniture, Property};
use estate_search::service::AppState;
use estate_search::store::{DualStore, MemoryStore};

pub type TestState = Arc<AppState<MemoryStore>>;

fn buckets(bounds: &[(Option<i64>, Option<i64>)]) -> RangeCondition {
    RangeCondition::new(
        bounds
            .iter()
            .enumerate()
            .map(|(i, &(min, max))| RangeBucket::new(i as i64, min, max))
            .collect(),
    )
}

fn list(values: &[&str]) -> ListCondition {
    ListCondition {
        list: values.iter().map(|v| v.to_string()).collect(),
    }
}

/// Size buckets: <80, 80..110, 110..150, >=150
pub fn conditions() -> SearchConditions {
    let size = [
        (None, Some(80)),
        (Some(80), Some(110)),
        (Some(110), Some(150)),
        (Some(150), None),
    ];
    let property = PropertySearchCondition {
        door_width: buckets(&size),
        door_height: buckets(&size),
        rent: buckets(&[
            (None, Some(50000)),
            (Some(50000), Some(100000)),
            (Some(100000), Some(150000)),
            (Some(150000), None),
        ]),
        feature: list(&["garden", "balcony"]),
    };
    let furniture = FurnitureSearchCondition {
        width: buckets(&size),
        height: buckets(&size),
        depth: buckets(&size),
        price: buckets(&[
            (None, Some(3000)),
            (Some(3000), Some(6000)),
            (Some(6000), Some(9000)),
            (Some(9000), None),
        ]),
        color: list(&["black", "white"]),
        feature: list(&["armrest", "casters"]),
        kind: list(&["gaming", "office"]),
    };
    SearchConditions::new(property, furniture).expect("valid test conditions")
}

pub fn config() -> Config {
    Config {
        backend: Backend::Memory,
        ..Config::default()
    }
}

pub fn state_with(config: Config) -> TestState {
    let stores = DualStore::new(MemoryStore::new(), MemoryStore::new());
    Arc::new(AppState::new(config, conditions(), stores))
}

pub fn state() -> TestState {
    state_with(config())
}

pub fn property(id: i64, rent: i64, door: (i64, i64), at: (f64, f64), popularity: i64) -> Property {
    Property {
        id,
        thumbnail: format!("/images/estate/{id}.png"),
        name: format!("estate {id}"),
        description: "quiet neighbourhood".to_string(),
        latitude: at.0,
        longitude: at.1,
        address: "1-1 Example".to_string(),
        rent,
        door_width: door.0,
        door_height: door.1,
        features: String::new(),
        popularity,
    }
}

pub fn furniture(id: i64, price: i64, size: (i64, i64, i64), popularity: i64, stock: i64) -> Furniture {
    Furniture {
        id,
        name: format!("chair {id}"),
        description: "sturdy".to_string(),
        thumbnail: format!("/images/chair/{id}.png"),
        price,
        width: size.0,
        height: size.1,
        depth: size.2,
        color: "black".to_string(),
        features: String::new(),
        kind: "office".to_string(),
        popularity,
        stock,
    }
}

/// Seed both stores, the way a bulk load would leave them.
pub fn seed_properties(state: &TestState, rows: Vec<Property>) {
    state.stores.primary().seed(rows.clone());
    state.stores.secondary().seed(rows);
}

pub fn seed_furniture(state: &TestState, rows: Vec<Furniture>) {
    state.stores.primary().seed(rows.clone());
    state.stores.secondary().seed(rows);
}

pub fn estate_csv_row(id: i64, rent: i64, popularity: i64) -> String {
    format!("{id},estate {id},desc,/img/{id}.png,addr,35.6,139.7,{rent},100,100,,{popularity}\n")
}

pub fn chair_csv_row(id: i64, price: i64, stock: i64) -> String {
    format!("{id},chair {id},desc,/img/{id}.png,{price},60,50,40,black,,office,{id},{stock}\n")
}
