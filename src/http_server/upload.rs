//! Multipart upload extraction.

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Multipart};

use super::config::HttpServerConfig;
use crate::service::{ServiceError, ServiceResult};

/// Body limit layer for the upload routes. Uploads are uncapped unless
/// `upload_limit_bytes` is configured.
pub fn upload_limit(config: &HttpServerConfig) -> DefaultBodyLimit {
    match config.upload_limit_bytes {
        Some(limit) => DefaultBodyLimit::max(limit),
        None => DefaultBodyLimit::disable(),
    }
}

/// Contents of the part called `name`. Other parts are skipped.
pub async fn read_part(mut multipart: Multipart, name: &str) -> ServiceResult<Bytes> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServiceError::Validation(e.body_text()))?
    {
        if field.name() == Some(name) {
            return field
                .bytes()
                .await
                .map_err(|e| ServiceError::Validation(e.body_text()));
        }
    }

    Err(ServiceError::Validation(format!(
        "multipart part {name:?} is missing"
    )))
}
