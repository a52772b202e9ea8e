use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect};
use uuid::Uuid;

use crate::entity::asset;
use crate::error::AppError;

/// A user's storage usage against the configured ceiling.
#[derive(Debug, Clone, Copy)]
pub struct Usage {
    pub used_bytes: u64,
    pub limit_bytes: u64,
}

impl Usage {
    /// Whether an additional `size` bytes would fit under the ceiling.
    pub fn fits(&self, size: u64) -> bool {
        self.used_bytes + size <= self.limit_bytes
    }
}

/// Compute a user's current storage usage.
///
/// Aggregates at the asset level over the owner column, so every asset type
/// counts: avatars, story images and plant photos alike. Single read, no
/// side effects. Summed in Rust to stay backend-agnostic about the SQL type
/// a BIGINT SUM widens to.
pub async fn usage<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    limit_bytes: u64,
) -> Result<Usage, AppError> {
    let sizes: Vec<i64> = asset::Entity::find()
        .select_only()
        .column(asset::Column::Size)
        .filter(asset::Column::Author.eq(user_id))
        .into_tuple()
        .all(db)
        .await?;

    let used_bytes = sizes.into_iter().map(|s| s.max(0) as u64).sum();

    Ok(Usage {
        used_bytes,
        limit_bytes,
    })
}
