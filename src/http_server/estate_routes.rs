//! Estate HTTP Routes
//!
//! Property detail, search, polygon search, upload and document requests,
//! plus the furniture-based recommendation.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Multipart, Path, Query, RawQuery, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use super::upload::{read_part, upload_limit};
use crate::catalog::PropertySearchCondition;
use crate::geo::Polygon;
use crate::model::{Property, PropertyListResponse, PropertySearchResponse};
use crate::query::SearchParams;
use crate::service::{AppState, ContactRequest, ServiceResult};
use crate::store::CatalogStore;

/// Multipart part carrying the CSV upload
pub const UPLOAD_PART: &str = "estates";

/// Routes mounted under `/api/estate`.
pub fn estate_routes<S: CatalogStore>(state: Arc<AppState<S>>) -> Router {
    Router::new()
        .route(
            "/",
            post(post_estates_handler::<S>).layer(upload_limit(&state.config.server)),
        )
        .route("/search", get(search_estates_handler::<S>))
        .route("/search/condition", get(search_condition_handler::<S>))
        .route("/low_priced", get(low_priced_handler::<S>))
        .route("/nazotte", post(nazotte_handler::<S>))
        .route("/req_doc/:id", post(request_document_handler::<S>))
        .route("/:id", get(get_estate_handler::<S>))
        .with_state(state)
}

/// Routes mounted under `/api/recommended_estate`.
pub fn recommendation_routes<S: CatalogStore>(state: Arc<AppState<S>>) -> Router {
    Router::new()
        .route("/:id", get(recommended_handler::<S>))
        .with_state(state)
}

async fn get_estate_handler<S: CatalogStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> ServiceResult<Json<Property>> {
    Ok(Json(state.property_detail(&id).await?))
}

async fn post_estates_handler<S: CatalogStore>(
    State(state): State<Arc<AppState<S>>>,
    multipart: Multipart,
) -> ServiceResult<StatusCode> {
    let csv = read_part(multipart, UPLOAD_PART).await?;
    state.load_properties(&csv).await?;
    Ok(StatusCode::CREATED)
}

async fn search_estates_handler<S: CatalogStore>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<HashMap<String, String>>,
    RawQuery(raw): RawQuery,
) -> ServiceResult<Json<PropertySearchResponse>> {
    let params = SearchParams::new(params).with_raw_query(raw.unwrap_or_default());
    let page = state.search_properties(&params).await?;
    Ok(Json(page.into()))
}

async fn search_condition_handler<S: CatalogStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Json<PropertySearchCondition> {
    Json(state.conditions.property.clone())
}

async fn low_priced_handler<S: CatalogStore>(
    State(state): State<Arc<AppState<S>>>,
) -> ServiceResult<Json<PropertyListResponse>> {
    let estates = state.low_priced_properties().await?;
    Ok(Json(PropertyListResponse { estates }))
}

async fn nazotte_handler<S: CatalogStore>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<Polygon>, JsonRejection>,
) -> ServiceResult<Json<PropertySearchResponse>> {
    let Json(polygon) = payload?;
    let page = state.nazotte_search(&polygon).await?;
    Ok(Json(page.into()))
}

async fn request_document_handler<S: CatalogStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    payload: Result<Json<ContactRequest>, JsonRejection>,
) -> ServiceResult<StatusCode> {
    let Json(request) = payload?;
    state.request_document(&id, &request).await?;
    Ok(StatusCode::OK)
}

async fn recommended_handler<S: CatalogStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> ServiceResult<Json<PropertyListResponse>> {
    let estates = state.recommended_properties(&id).await?;
    Ok(Json(PropertyListResponse { estates }))
}
