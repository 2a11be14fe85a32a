//! Search Service Tests
//!
//! Exercises the service layer against in-memory stores:
//! - Parametric search filters, pagination and caching
//! - Bulk upload atomicity across both stores
//! - Polygon search cap
//! - Purchase and recommendation flows

mod common;

use common::*;
use estate_search::geo::{Coordinate, Polygon};
use estate_search::model::{Furniture, Property};
use estate_search::query::SearchParams;
use estate_search::service::{ContactRequest, ServiceError};

fn params(pairs: &[(&str, &str)]) -> SearchParams {
    pairs.iter().copied().collect()
}

fn contact() -> ContactRequest {
    ContactRequest {
        email: "buyer@example.com".to_string(),
    }
}

fn ids<T>(rows: &[T], id: impl Fn(&T) -> i64) -> Vec<i64> {
    rows.iter().map(id).collect()
}

// =============================================================================
// Parametric Search
// =============================================================================

#[tokio::test]
async fn test_search_without_filters_is_rejected() {
    let state = state();
    let err = state
        .search_properties(&params(&[("page", "0"), ("perPage", "10")]))
        .await
        .unwrap_err();
    assert_eq!(err, ServiceError::NoSearchCriteria);
    assert!(err.is_client_error());
}

#[tokio::test]
async fn test_invalid_range_id_is_validation_error() {
    let state = state();
    let err = state
        .search_properties(&params(&[("rentRangeId", "9"), ("page", "0"), ("perPage", "10")]))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)), "got {err:?}");
}

#[tokio::test]
async fn test_rent_bucket_filters_and_orders_by_popularity() {
    let state = state();
    seed_properties(
        &state,
        vec![
            property(1, 40000, (100, 100), (35.0, 139.0), 10),
            property(2, 60000, (100, 100), (35.0, 139.0), 30),
            property(3, 70000, (100, 100), (35.0, 139.0), 20),
            property(4, 160000, (100, 100), (35.0, 139.0), 99),
        ],
    );

    let page = state
        .search_properties(&params(&[("rentRangeId", "1"), ("page", "0"), ("perPage", "10")]))
        .await
        .unwrap();

    assert_eq!(page.count, 2);
    assert_eq!(ids(&page.items, |p: &Property| p.id), vec![2, 3]);
}

#[tokio::test]
async fn test_pages_are_a_prefix_of_the_full_ordering() {
    let state = state();
    seed_properties(
        &state,
        (1..=5)
            .map(|id| property(id, 60000, (100, 100), (35.0, 139.0), 100 - id))
            .collect(),
    );

    let all = state
        .search_properties(&params(&[("rentRangeId", "1"), ("page", "0"), ("perPage", "4")]))
        .await
        .unwrap();
    let first = state
        .search_properties(&params(&[("rentRangeId", "1"), ("page", "0"), ("perPage", "2")]))
        .await
        .unwrap();
    let second = state
        .search_properties(&params(&[("rentRangeId", "1"), ("page", "1"), ("perPage", "2")]))
        .await
        .unwrap();

    assert_eq!(all.count, 5);
    assert_eq!(first.count, 5);
    assert_eq!(second.count, 5);

    let mut joined = first.items.clone();
    joined.extend(second.items.clone());
    assert_eq!(joined, all.items);
}

#[tokio::test]
async fn test_furniture_search_hides_sold_out_items() {
    let state = state();
    seed_furniture(
        &state,
        vec![
            furniture(1, 5000, (60, 50, 40), 10, 1),
            furniture(2, 5000, (60, 50, 40), 20, 0),
        ],
    );

    let page = state
        .search_furniture(&params(&[("priceRangeId", "1"), ("page", "0"), ("perPage", "10")]))
        .await
        .unwrap();

    assert_eq!(page.count, 1);
    assert_eq!(ids(&page.items, |f: &Furniture| f.id), vec![1]);
}

// =============================================================================
// Caching
// =============================================================================

#[tokio::test]
async fn test_repeated_first_page_is_served_from_cache() {
    let state = state();
    seed_properties(&state, vec![property(1, 60000, (100, 100), (35.0, 139.0), 1)]);
    let query = params(&[("rentRangeId", "1"), ("page", "0"), ("perPage", "10")]);

    let first = state.search_properties(&query).await.unwrap();
    let second = state.search_properties(&query).await.unwrap();

    assert_eq!(first, second);
    let stats = state.caches.property.page_stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
}

#[tokio::test]
async fn test_bulk_load_flushes_cached_results() {
    let state = state();
    seed_properties(&state, vec![property(1, 60000, (100, 100), (35.0, 139.0), 1)]);
    let query = params(&[("rentRangeId", "1"), ("page", "0"), ("perPage", "10")]);
    assert_eq!(state.search_properties(&query).await.unwrap().count, 1);

    // a row written behind the cache's back stays invisible until a flush
    seed_properties(&state, vec![property(2, 60000, (100, 100), (35.0, 139.0), 2)]);
    assert_eq!(state.search_properties(&query).await.unwrap().count, 1);

    state
        .load_properties(estate_csv_row(3, 60000, 3).as_bytes())
        .await
        .unwrap();

    let page = state.search_properties(&query).await.unwrap();
    assert_eq!(page.count, 3);
    assert_eq!(ids(&page.items, |p: &Property| p.id), vec![3, 2, 1]);
}

// =============================================================================
// Bulk Upload
// =============================================================================

#[tokio::test]
async fn test_upload_writes_both_stores() {
    let state = state();
    let csv = format!("{}{}", chair_csv_row(1, 5000, 3), chair_csv_row(2, 7000, 1));

    let report = state.load_furniture(csv.as_bytes()).await.unwrap();

    assert_eq!(report.rows, 2);
    assert_eq!(state.stores.primary().len::<Furniture>(), 2);
    assert_eq!(state.stores.secondary().len::<Furniture>(), 2);
}

#[tokio::test]
async fn test_malformed_trailing_row_writes_nothing() {
    let state = state();
    let csv = format!(
        "{}{}1000,broken",
        estate_csv_row(1, 50000, 1),
        estate_csv_row(2, 50000, 2)
    );

    let err = state.load_properties(csv.as_bytes()).await.unwrap_err();

    assert!(matches!(err, ServiceError::IngestionParse(_)), "got {err:?}");
    assert_eq!(state.stores.primary().len::<Property>(), 0);
    assert_eq!(state.stores.secondary().len::<Property>(), 0);
}

#[tokio::test]
async fn test_negative_stock_is_rejected() {
    let state = state();
    let csv = format!("{}{}", chair_csv_row(1, 5000, 1), chair_csv_row(2, 5000, -5));

    let err = state.load_furniture(csv.as_bytes()).await.unwrap_err();

    assert!(matches!(err, ServiceError::IngestionParse(_)), "got {err:?}");
    assert!(err.to_string().contains("row 2"), "{err}");
    assert_eq!(state.stores.primary().len::<Furniture>(), 0);
    assert_eq!(state.stores.secondary().len::<Furniture>(), 0);
}

#[tokio::test]
async fn test_secondary_insert_failure_rolls_back_primary() {
    let state = state();
    state.stores.secondary().fail_insert(2);
    let csv = format!("{}{}", chair_csv_row(1, 5000, 1), chair_csv_row(2, 5000, 1));

    let err = state.load_furniture(csv.as_bytes()).await.unwrap_err();

    assert_eq!(err.status_code().as_u16(), 500);
    assert_eq!(state.stores.primary().len::<Furniture>(), 0);
    assert_eq!(state.stores.secondary().len::<Furniture>(), 0);
}

#[tokio::test]
async fn test_secondary_commit_failure_is_compensated() {
    let state = state();
    state.stores.secondary().fail_next_commit();

    let err = state
        .load_properties(estate_csv_row(1, 50000, 1).as_bytes())
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::IngestionPartialFailure(_)), "got {err:?}");
    assert_eq!(state.stores.primary().len::<Property>(), 0);
    assert_eq!(state.stores.secondary().len::<Property>(), 0);
}

// =============================================================================
// Polygon Search
// =============================================================================

fn square(min: f64, max: f64) -> Polygon {
    Polygon::new(vec![
        Coordinate::new(min, min),
        Coordinate::new(min, max),
        Coordinate::new(max, max),
        Coordinate::new(max, min),
    ])
}

#[tokio::test]
async fn test_nazotte_is_capped() {
    let state = state();
    seed_properties(
        &state,
        (1..=60)
            .map(|id| property(id, 50000, (100, 100), (1.0 + id as f64 * 0.1, 5.0), id))
            .collect(),
    );

    let page = state.nazotte_search(&square(0.0, 10.0)).await.unwrap();

    assert_eq!(page.count, 50);
    assert_eq!(page.items.len(), 50);
    // most popular first
    assert_eq!(page.items[0].id, 60);
}

#[tokio::test]
async fn test_nazotte_excludes_points_outside_polygon() {
    let state = state();
    seed_properties(
        &state,
        vec![
            property(1, 50000, (100, 100), (1.0, 1.0), 1),
            property(2, 50000, (100, 100), (20.0, 20.0), 2),
        ],
    );

    let page = state.nazotte_search(&square(0.0, 10.0)).await.unwrap();

    assert_eq!(ids(&page.items, |p: &Property| p.id), vec![1]);
}

#[tokio::test]
async fn test_nazotte_rejects_empty_polygon() {
    let state = state();
    let err = state.nazotte_search(&Polygon::default()).await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}

// =============================================================================
// Purchase and Recommendation
// =============================================================================

#[tokio::test]
async fn test_last_unit_purchase_sells_out() {
    let state = state();
    seed_furniture(&state, vec![furniture(7, 5000, (60, 50, 40), 1, 1)]);

    state.purchase("7", &contact()).await.unwrap();

    let err = state.purchase("7", &contact()).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)), "got {err:?}");

    let err = state.furniture_detail("7").await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)), "got {err:?}");
}

#[tokio::test]
async fn test_purchase_flushes_furniture_cache() {
    let state = state();
    seed_furniture(&state, vec![furniture(1, 5000, (60, 50, 40), 1, 1)]);
    let query = params(&[("priceRangeId", "1"), ("page", "0"), ("perPage", "10")]);
    assert_eq!(state.search_furniture(&query).await.unwrap().count, 1);

    state.purchase("1", &contact()).await.unwrap();

    assert_eq!(state.search_furniture(&query).await.unwrap().count, 0);
}

#[tokio::test]
async fn test_low_priced_furniture_skips_sold_out() {
    let state = state();
    seed_furniture(
        &state,
        vec![
            furniture(1, 3000, (60, 50, 40), 1, 0),
            furniture(2, 4000, (60, 50, 40), 1, 2),
            furniture(3, 2000, (60, 50, 40), 1, 5),
        ],
    );

    let chairs = state.low_priced_furniture().await.unwrap();

    assert_eq!(ids(&chairs, |f: &Furniture| f.id), vec![3, 2]);
}

#[tokio::test]
async fn test_recommendation_uses_two_smallest_sides() {
    let state = state();
    seed_furniture(&state, vec![furniture(1, 5000, (60, 50, 40), 1, 1)]);
    seed_properties(
        &state,
        vec![
            // fits upright
            property(1, 50000, (45, 55), (1.0, 1.0), 10),
            // fits rotated
            property(2, 50000, (55, 45), (1.0, 1.0), 20),
            // too narrow either way
            property(3, 50000, (30, 100), (1.0, 1.0), 30),
        ],
    );

    let estates = state.recommended_properties("1").await.unwrap();

    assert_eq!(ids(&estates, |p: &Property| p.id), vec![2, 1]);
}

#[tokio::test]
async fn test_recommendation_for_unknown_chair_is_bad_request() {
    let state = state();
    let err = state.recommended_properties("404").await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)), "got {err:?}");
}

#[tokio::test]
async fn test_initialize_clears_both_stores() {
    let state = state();
    seed_properties(&state, vec![property(1, 50000, (100, 100), (1.0, 1.0), 1)]);

    let response = state.initialize().await.unwrap();

    assert_eq!(response.language, "rust");
    assert_eq!(state.stores.primary().len::<Property>(), 0);
    assert_eq!(state.stores.secondary().len::<Property>(), 0);
}
