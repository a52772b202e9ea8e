use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::entity::follower::{self, FollowStatus};

/// One edge in the follow graph.
#[derive(Serialize, utoipa::ToSchema)]
pub struct FollowResponse {
    /// Requesting user.
    pub from_user: Uuid,
    /// Target user.
    pub to_user: Uuid,
    /// Current edge status.
    #[schema(example = "pending")]
    pub status: FollowStatus,
    pub created_at: DateTime<Utc>,
}

impl From<follower::Model> for FollowResponse {
    fn from(edge: follower::Model) -> Self {
        Self {
            from_user: edge.from_user,
            to_user: edge.to_user,
            status: edge.status,
            created_at: edge.created_at,
        }
    }
}

/// Pending incoming follow requests for the requesting user.
#[derive(Serialize, utoipa::ToSchema)]
pub struct PendingListResponse {
    pub requests: Vec<FollowResponse>,
}
