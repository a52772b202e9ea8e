use axum::body::Body;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::Response;
use common::storage::{BlobStore, ContentHash};
use sea_orm::{ConnectionTrait, EntityTrait};
use tracing::warn;
use uuid::Uuid;

use crate::entity::asset;
use crate::error::AppError;

/// Load an asset row or fail with not found.
pub async fn find_asset<C: ConnectionTrait>(
    db: &C,
    asset_id: Uuid,
) -> Result<asset::Model, AppError> {
    asset::Entity::find_by_id(asset_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Image not found".into()))
}

/// Delete a blob after its row is gone, tolerating store failures.
///
/// Runs after the owning transaction committed, so a failure here leaves an
/// orphaned blob but never a dangling row. Orphans are logged for offline
/// cleanup.
pub async fn purge_blob(store: &dyn BlobStore, key: &str) {
    match store.delete(key).await {
        Ok(true) => {}
        Ok(false) => warn!(key, "blob already absent during purge"),
        Err(e) => warn!(key, error = %e, "blob purge failed; orphaned blob left behind"),
    }
}

/// Stream an asset's bytes as an HTTP response.
///
/// The content hash doubles as a strong ETag; a matching `If-None-Match`
/// short-circuits to 304 without touching the blob store.
pub async fn stream_asset(
    store: &dyn BlobStore,
    row: &asset::Model,
    request_headers: &HeaderMap,
) -> Result<Response, AppError> {
    let etag = ContentHash::from_hex(&row.content_hash)
        .map_err(|e| AppError::Internal(format!("corrupt content hash on asset {}: {e}", row.id)))?
        .etag();

    if let Some(if_none_match) = request_headers.get(header::IF_NONE_MATCH) {
        if if_none_match.as_bytes() == etag.as_bytes() {
            return Ok(Response::builder()
                .status(StatusCode::NOT_MODIFIED)
                .header(header::ETAG, &etag)
                .body(Body::empty())
                .map_err(|e| AppError::Internal(e.to_string()))?);
        }
    }

    let reader = store.get_stream(&row.id.to_string()).await?;
    let stream = tokio_util::io::ReaderStream::new(reader);

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, &row.content_type)
        .header(header::CONTENT_LENGTH, row.size.max(0))
        .header(
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{}.png\"", row.id),
        )
        .header(header::CACHE_CONTROL, "private, max-age=3600")
        .header(header::ETAG, &etag)
        .body(Body::from_stream(stream))
        .map_err(|e| AppError::Internal(e.to_string()))?)
}
