use std::io::Cursor;

use chrono::Utc;
use common::storage::{BlobStore, ContentHash, PutMeta};
use sea_orm::{ConnectionTrait, Set};
use tracing::instrument;
use uuid::Uuid;

use crate::config::StorageConfig;
use crate::entity::asset::{self, AssetVisibility};
use crate::error::AppError;
use crate::services::quota;

/// Content types accepted for upload. The stored bytes are always PNG.
pub const ACCEPTED_IMAGE_TYPES: &[&str] =
    &["image/png", "image/jpeg", "image/webp", "image/gif"];

const STORED_CONTENT_TYPE: &str = "image/png";

/// An inbound upload, as received from the transport layer.
pub struct NewUpload {
    /// Size declared by the client, before any bytes were inspected.
    pub declared_size: Option<u64>,
    /// Content type declared for the file part.
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Result of a successful ingestion: the blob is already in the store, the
/// asset row is not. The caller inserts `row` inside its own domain
/// transaction and purges the blob if that transaction fails.
pub struct IngestedAsset {
    pub id: Uuid,
    pub content_hash: ContentHash,
    pub size: i64,
    pub row: asset::ActiveModel,
}

impl IngestedAsset {
    /// Blob store key of the ingested object.
    pub fn store_key(&self) -> String {
        self.id.to_string()
    }
}

/// Validate an upload against declared values and current usage.
///
/// Checks run in a fixed order so each failure mode maps to one distinct
/// error: missing size, oversized image, quota, unaccepted content type.
pub fn validate_upload(
    declared_size: Option<u64>,
    content_type: Option<&str>,
    usage: &quota::Usage,
    cfg: &StorageConfig,
) -> Result<(), AppError> {
    let size = declared_size.ok_or_else(|| AppError::Validation("Image size is required".into()))?;

    if size > cfg.max_image_size {
        return Err(AppError::TooLarge {
            limit: cfg.max_image_size,
        });
    }

    if !usage.fits(size) {
        return Err(AppError::QuotaExceeded);
    }

    let ct = content_type
        .ok_or_else(|| AppError::Validation("Image content type is required".into()))?;
    if !ACCEPTED_IMAGE_TYPES.contains(&ct) {
        return Err(AppError::UnsupportedMedia(ct.to_string()));
    }

    Ok(())
}

/// Ingest an uploaded image for `owner`.
///
/// Validates, normalizes to canonical PNG, writes the blob under a fresh
/// asset id and returns the uncommitted asset row. The quota check here is
/// best effort: two concurrent uploads can both pass it.
#[instrument(skip(db, store, cfg, upload), fields(owner = %owner))]
pub async fn ingest<C: ConnectionTrait>(
    db: &C,
    store: &dyn BlobStore,
    cfg: &StorageConfig,
    owner: Uuid,
    visibility: AssetVisibility,
    upload: NewUpload,
) -> Result<IngestedAsset, AppError> {
    let usage = quota::usage(db, owner, cfg.max_total_storage).await?;
    validate_upload(
        upload.declared_size,
        upload.content_type.as_deref(),
        &usage,
        cfg,
    )?;

    // Decode failure is its own error condition, distinct from a wrong
    // declared content type.
    let decoded =
        image::load_from_memory(&upload.bytes).map_err(|_| AppError::UnsupportedFormat)?;

    // Normalize to RGBA PNG so stored bytes are format-canonical.
    let normalized = image::DynamicImage::ImageRgba8(decoded.to_rgba8());
    let mut png = Vec::new();
    normalized
        .write_to(&mut Cursor::new(&mut png), image::ImageOutputFormat::Png)
        .map_err(|e| AppError::Internal(format!("PNG encode failed: {e}")))?;

    let id = Uuid::now_v7();
    let meta = PutMeta {
        content_type: Some(STORED_CONTENT_TYPE.into()),
        owner: Some(owner),
    };
    let content_hash = store.put(&id.to_string(), &png, &meta).await?;

    let size = png.len() as i64;
    let row = asset::ActiveModel {
        id: Set(id),
        author: Set(owner),
        content_hash: Set(content_hash.to_hex()),
        size: Set(size),
        content_type: Set(STORED_CONTENT_TYPE.into()),
        visibility: Set(visibility),
        created_at: Set(Utc::now()),
    };

    Ok(IngestedAsset {
        id,
        content_hash,
        size,
        row,
    })
}
