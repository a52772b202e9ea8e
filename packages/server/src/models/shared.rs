use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Offset-based pagination query for list endpoints.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct PageQuery {
    /// Number of items to skip.
    #[param(example = 0)]
    pub offset: Option<u64>,
    /// Number of items to return (1-20, default 10).
    #[param(example = 10)]
    pub limit: Option<u64>,
}

pub const MAX_PAGE_LIMIT: u64 = 20;
pub const DEFAULT_PAGE_LIMIT: u64 = 10;

impl PageQuery {
    pub fn clamp(&self) -> Result<(u64, u64), AppError> {
        let offset = self.offset.unwrap_or(0);
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        if limit == 0 || limit > MAX_PAGE_LIMIT {
            return Err(AppError::Validation(format!(
                "Limit must be 1-{MAX_PAGE_LIMIT}"
            )));
        }
        Ok((offset, limit))
    }
}

/// Response for operations that create an image-backed resource.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CreatedAsset {
    /// ID of the stored image.
    pub asset_id: Uuid,
    /// Normalized size of the stored image in bytes.
    #[schema(example = 10240)]
    pub size: i64,
}

/// Validate a trimmed display name (1-128 Unicode characters).
pub fn validate_name(name: &str) -> Result<(), AppError> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > 128 {
        return Err(AppError::Validation("Name must be 1-128 characters".into()));
    }
    Ok(())
}
