use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::entity::{plant, plant_update};

/// A plant as seen by a user with read access.
#[derive(Serialize, utoipa::ToSchema)]
pub struct PlantResponse {
    /// Plant ID.
    pub id: Uuid,
    /// ID of the owning user.
    pub owner: Uuid,
    /// Display name.
    #[schema(example = "Monstera Deliciosa")]
    pub name: String,
    /// Whether the plant has been marked dead.
    pub dead: bool,
    /// Registration photo, if one was uploaded.
    pub asset_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<plant::Model> for PlantResponse {
    fn from(p: plant::Model) -> Self {
        Self {
            id: p.id,
            owner: p.owner,
            name: p.name,
            dead: p.dead,
            asset_id: p.asset_id,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// List of plants owned by the requesting user.
#[derive(Serialize, utoipa::ToSchema)]
pub struct PlantListResponse {
    pub plants: Vec<PlantResponse>,
}

/// One photo update on a plant's timeline.
#[derive(Serialize, utoipa::ToSchema)]
pub struct PlantUpdateResponse {
    /// Update ID.
    pub id: Uuid,
    /// Plant this update belongs to.
    pub plant_id: Uuid,
    /// Photo attached to the update.
    pub asset_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<plant_update::Model> for PlantUpdateResponse {
    fn from(u: plant_update::Model) -> Self {
        Self {
            id: u.id,
            plant_id: u.plant_id,
            asset_id: u.asset_id,
            created_at: u.created_at,
        }
    }
}

/// Page of updates on one plant, newest first.
#[derive(Serialize, utoipa::ToSchema)]
pub struct UpdateListResponse {
    pub updates: Vec<PlantUpdateResponse>,
}

/// Plants propagated from a parent plant.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CuttingListResponse {
    pub cuttings: Vec<PlantResponse>,
}
