use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// One plant update in the follower feed.
#[derive(Serialize, utoipa::ToSchema)]
pub struct FeedItem {
    /// Update ID.
    pub update_id: Uuid,
    /// Plant the update was posted on.
    pub plant_id: Uuid,
    /// Display name of the plant.
    #[schema(example = "Monstera Deliciosa")]
    pub plant_name: String,
    /// Owner of the plant.
    pub owner: Uuid,
    /// Owner's username.
    #[schema(example = "fern_friend")]
    pub owner_username: String,
    /// Photo attached to the update.
    pub asset_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Updates from followed users over the last 24 hours, newest first.
#[derive(Serialize, utoipa::ToSchema)]
pub struct FeedResponse {
    pub items: Vec<FeedItem>,
}
