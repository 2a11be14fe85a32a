//! # HTTP Server
//!
//! Combines the estate, chair and recommendation routers with the
//! initialize endpoint and the tracing, timeout and CORS layers.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::chair_routes::chair_routes;
use super::config::HttpServerConfig;
use super::estate_routes::{estate_routes, recommendation_routes};
use crate::model::InitializeResponse;
use crate::service::{AppState, ServiceResult};
use crate::store::CatalogStore;

/// HTTP server for the search API
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    pub fn new<S: CatalogStore>(state: Arc<AppState<S>>) -> Self {
        let config = state.config.server.clone();
        let router = Self::build_router(state, &config);
        Self { config, router }
    }

    /// Build the combined router with all endpoints
    fn build_router<S: CatalogStore>(state: Arc<AppState<S>>, config: &HttpServerConfig) -> Router {
        let cors = if config.cors_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        Router::new()
            .route("/initialize", post(initialize_handler::<S>))
            .with_state(state.clone())
            .nest("/api/estate", estate_routes(state.clone()))
            .nest("/api/chair", chair_routes(state.clone()))
            .nest("/api/recommended_estate", recommendation_routes(state))
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(cors)
                    .layer(TimeoutLayer::new(config.request_timeout())),
            )
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Bind and serve until the process is stopped
    pub async fn start(self) -> io::Result<()> {
        let addr: SocketAddr = self
            .config
            .socket_addr()
            .parse()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        let listener = TcpListener::bind(addr).await?;
        info!(%addr, "search API listening");
        axum::serve(listener, self.router).await
    }
}

async fn initialize_handler<S: CatalogStore>(
    State(state): State<Arc<AppState<S>>>,
) -> ServiceResult<Json<InitializeResponse>> {
    Ok(Json(state.initialize().await?))
}
