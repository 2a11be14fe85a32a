//! # Service Errors
//!
//! Every failure a request can end in, with its HTTP status.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::catalog::RangeError;
use crate::loader::LoadError;
use crate::query::QueryError;
use crate::store::StoreError;

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Malformed parameter or body
    #[error("{0}")]
    Validation(String),

    /// Unknown id
    #[error("{0}")]
    NotFound(String),

    /// A search without any filter
    #[error("search requires at least one filter parameter")]
    NoSearchCriteria,

    /// A malformed upload; nothing was written
    #[error("invalid upload: {0}")]
    IngestionParse(String),

    // ==================
    // Server Errors (5xx)
    // ==================
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("store error: {0}")]
    StoreExecution(String),

    /// The two stores disagreed while applying an upload
    #[error("upload failed on one store: {0}")]
    IngestionPartialFailure(String),
}

impl ServiceError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::NoSearchCriteria => StatusCode::BAD_REQUEST,
            ServiceError::IngestionParse(_) => StatusCode::BAD_REQUEST,

            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,

            ServiceError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ServiceError::StoreExecution(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::IngestionPartialFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

impl From<RangeError> for ServiceError {
    fn from(err: RangeError) -> Self {
        ServiceError::Validation(err.to_string())
    }
}

impl From<QueryError> for ServiceError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::NoSearchCriteria => ServiceError::NoSearchCriteria,
            other => ServiceError::Validation(other.to_string()),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => ServiceError::StoreUnavailable(msg),
            other => ServiceError::StoreExecution(other.to_string()),
        }
    }
}

impl From<LoadError> for ServiceError {
    fn from(err: LoadError) -> Self {
        if err.is_parse() {
            return ServiceError::IngestionParse(err.to_string());
        }
        if err.is_partial() {
            return ServiceError::IngestionPartialFailure(err.to_string());
        }
        match err {
            LoadError::Store(source) | LoadError::Primary { source, .. } => source.into(),
            other => ServiceError::StoreExecution(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ServiceError {
    fn from(rejection: JsonRejection) -> Self {
        ServiceError::Validation(rejection.body_text())
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl From<ServiceError> for ErrorResponse {
    fn from(err: ServiceError) -> Self {
        Self {
            code: err.status_code().as_u16(),
            error: err.to_string(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::info!(error = %self, "request rejected");
        }
        let body = Json(ErrorResponse::from(self));
        (status, body).into_response()
    }
}
