//! Chair HTTP Routes

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Multipart, Path, Query, RawQuery, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use super::upload::{read_part, upload_limit};
use crate::catalog::FurnitureSearchCondition;
use crate::model::{Furniture, FurnitureListResponse, FurnitureSearchResponse};
use crate::query::SearchParams;
use crate::service::{AppState, ContactRequest, ServiceResult};
use crate::store::CatalogStore;

/// Multipart part carrying the CSV upload
pub const UPLOAD_PART: &str = "chairs";

/// Routes mounted under `/api/chair`.
pub fn chair_routes<S: CatalogStore>(state: Arc<AppState<S>>) -> Router {
    Router::new()
        .route(
            "/",
            post(post_chairs_handler::<S>).layer(upload_limit(&state.config.server)),
        )
        .route("/search", get(search_chairs_handler::<S>))
        .route("/search/condition", get(search_condition_handler::<S>))
        .route("/low_priced", get(low_priced_handler::<S>))
        .route("/buy/:id", post(buy_handler::<S>))
        .route("/:id", get(get_chair_handler::<S>))
        .with_state(state)
}

async fn get_chair_handler<S: CatalogStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> ServiceResult<Json<Furniture>> {
    Ok(Json(state.furniture_detail(&id).await?))
}

async fn post_chairs_handler<S: CatalogStore>(
    State(state): State<Arc<AppState<S>>>,
    multipart: Multipart,
) -> ServiceResult<StatusCode> {
    let csv = read_part(multipart, UPLOAD_PART).await?;
    state.load_furniture(&csv).await?;
    Ok(StatusCode::CREATED)
}

async fn search_chairs_handler<S: CatalogStore>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<HashMap<String, String>>,
    RawQuery(raw): RawQuery,
) -> ServiceResult<Json<FurnitureSearchResponse>> {
    let params = SearchParams::new(params).with_raw_query(raw.unwrap_or_default());
    let page = state.search_furniture(&params).await?;
    Ok(Json(page.into()))
}

async fn search_condition_handler<S: CatalogStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Json<FurnitureSearchCondition> {
    Json(state.conditions.furniture.clone())
}

async fn low_priced_handler<S: CatalogStore>(
    State(state): State<Arc<AppState<S>>>,
) -> ServiceResult<Json<FurnitureListResponse>> {
    let chairs = state.low_priced_furniture().await?;
    Ok(Json(FurnitureListResponse { chairs }))
}

async fn buy_handler<S: CatalogStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    payload: Result<Json<ContactRequest>, JsonRejection>,
) -> ServiceResult<StatusCode> {
    let Json(request) = payload?;
    state.purchase(&id, &request).await?;
    Ok(StatusCode::OK)
}
