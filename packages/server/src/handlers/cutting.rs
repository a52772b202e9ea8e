use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::{plant, plant_cutting};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::handlers::plant::{check_plant_read, find_plant};
use crate::models::plant::{CuttingListResponse, PlantResponse};
use crate::models::shared::validate_name;
use crate::state::AppState;

/// Request body for taking a cutting.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct TakeCuttingRequest {
    /// Name for the new plant.
    #[schema(example = "Monstera Jr.")]
    pub name: String,
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Cuttings",
    operation_id = "takeCutting",
    summary = "Take a cutting from a plant",
    description = "Creates a new plant owned by the caller and records the propagation \
        edge. Requires read access to the parent plant; the new plant starts without \
        a photo.",
    params(("id" = Uuid, Path, description = "Parent plant ID")),
    responses(
        (status = 201, description = "Cutting created", body = PlantResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Parent plant not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = %auth_user.user_id, parent_id = %parent_id))]
pub async fn take_cutting(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(parent_id): Path<Uuid>,
    AppJson(payload): AppJson<TakeCuttingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let name = payload.name.trim().to_string();
    validate_name(&name)?;

    let parent = find_plant(&state.db, parent_id).await?;
    check_plant_read(&state.db, auth_user.user_id, &parent).await?;

    let now = Utc::now();
    let cutting_id = Uuid::now_v7();

    let txn = state.db.begin().await?;

    let created = plant::ActiveModel {
        id: Set(cutting_id),
        owner: Set(auth_user.user_id),
        name: Set(name),
        dead: Set(false),
        asset_id: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;

    plant_cutting::ActiveModel {
        parent_id: Set(parent_id),
        cutting_id: Set(cutting_id),
        created_at: Set(now),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    Ok((StatusCode::CREATED, Json(PlantResponse::from(created))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Cuttings",
    operation_id = "listCuttings",
    summary = "List cuttings taken from a plant",
    description = "Visibility-checked against the parent plant.",
    params(("id" = Uuid, Path, description = "Parent plant ID")),
    responses(
        (status = 200, description = "Child plants", body = CuttingListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Parent plant not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id, parent_id = %parent_id))]
pub async fn list_cuttings(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(parent_id): Path<Uuid>,
) -> Result<Json<CuttingListResponse>, AppError> {
    let parent = find_plant(&state.db, parent_id).await?;
    check_plant_read(&state.db, auth_user.user_id, &parent).await?;

    let edges = plant_cutting::Entity::find()
        .filter(plant_cutting::Column::ParentId.eq(parent_id))
        .all(&state.db)
        .await?;

    let child_ids: Vec<Uuid> = edges.into_iter().map(|e| e.cutting_id).collect();
    let children = if child_ids.is_empty() {
        Vec::new()
    } else {
        plant::Entity::find()
            .filter(plant::Column::Id.is_in(child_ids))
            .all(&state.db)
            .await?
    };

    Ok(Json(CuttingListResponse {
        cuttings: children.into_iter().map(PlantResponse::from).collect(),
    }))
}
