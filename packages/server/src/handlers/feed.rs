use std::collections::HashMap;

use axum::extract::State;
use axum::Json;
use chrono::{Duration, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use tracing::instrument;
use uuid::Uuid;

use crate::entity::follower::{self, FollowStatus};
use crate::entity::{plant, plant_update, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::feed::{FeedItem, FeedResponse};
use crate::state::AppState;

const FEED_WINDOW_HOURS: i64 = 24;

#[utoipa::path(
    get,
    path = "/",
    tag = "Feed",
    operation_id = "getFeed",
    summary = "Recent plant updates from followed users",
    description = "Updates posted within the last 24 hours on plants owned by users the \
        caller follows with approved status. Newest first.",
    responses(
        (status = 200, description = "Feed", body = FeedResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn get_feed(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<FeedResponse>, AppError> {
    let followed: Vec<Uuid> = follower::Entity::find()
        .filter(follower::Column::FromUser.eq(auth_user.user_id))
        .filter(follower::Column::Status.eq(FollowStatus::Approved))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|edge| edge.to_user)
        .collect();

    if followed.is_empty() {
        return Ok(Json(FeedResponse { items: Vec::new() }));
    }

    let plants = plant::Entity::find()
        .filter(plant::Column::Owner.is_in(followed.clone()))
        .all(&state.db)
        .await?;

    if plants.is_empty() {
        return Ok(Json(FeedResponse { items: Vec::new() }));
    }

    let plants_by_id: HashMap<Uuid, &plant::Model> =
        plants.iter().map(|p| (p.id, p)).collect();

    let cutoff = Utc::now() - Duration::hours(FEED_WINDOW_HOURS);
    let updates = plant_update::Entity::find()
        .filter(plant_update::Column::PlantId.is_in(plants_by_id.keys().copied().collect::<Vec<_>>()))
        .filter(plant_update::Column::CreatedAt.gte(cutoff))
        .order_by_desc(plant_update::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let usernames: HashMap<Uuid, String> = user::Entity::find()
        .filter(user::Column::Id.is_in(followed))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|u| (u.id, u.username))
        .collect();

    let items = updates
        .into_iter()
        .filter_map(|u| {
            let plant = plants_by_id.get(&u.plant_id)?;
            Some(FeedItem {
                update_id: u.id,
                plant_id: plant.id,
                plant_name: plant.name.clone(),
                owner: plant.owner,
                owner_username: usernames.get(&plant.owner).cloned().unwrap_or_default(),
                asset_id: u.asset_id,
                created_at: u.created_at,
            })
        })
        .collect();

    Ok(Json(FeedResponse { items }))
}
