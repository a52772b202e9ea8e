use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::entity::story;

/// A posted story.
#[derive(Serialize, utoipa::ToSchema)]
pub struct StoryResponse {
    /// Story ID.
    pub id: Uuid,
    /// Posting user.
    pub author: Uuid,
    /// Image attached to the story.
    pub asset_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<story::Model> for StoryResponse {
    fn from(s: story::Model) -> Self {
        Self {
            id: s.id,
            author: s.author,
            asset_id: s.asset_id,
            created_at: s.created_at,
        }
    }
}

/// Stories posted by the requesting user, newest first.
#[derive(Serialize, utoipa::ToSchema)]
pub struct StoryListResponse {
    pub stories: Vec<StoryResponse>,
}
