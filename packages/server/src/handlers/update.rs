use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use tracing::instrument;
use uuid::Uuid;

use crate::entity::{asset, plant, plant_update};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::handlers::plant::{check_plant_read, find_plant};
use crate::handlers::upload::read_upload_form;
use crate::models::plant::{PlantUpdateResponse, UpdateListResponse};
use crate::models::shared::PageQuery;
use crate::services::{assets, ingest};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/",
    tag = "Plant Updates",
    operation_id = "postPlantUpdate",
    summary = "Post a photo update on a plant",
    description = "Owner only. Multipart fields `file` and `size`, optional `visibility` \
        (default private). Touches the plant's `updated_at`.",
    params(("id" = Uuid, Path, description = "Plant ID")),
    request_body(content_type = "multipart/form-data", description = "Update photo"),
    responses(
        (status = 201, description = "Update posted", body = PlantUpdateResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Plant not found (NOT_FOUND)", body = ErrorBody),
        (status = 413, description = "Too large (IMAGE_TOO_LARGE, QUOTA_EXCEEDED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(user_id = %auth_user.user_id, plant_id = %plant_id))]
pub async fn post_update(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(plant_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let plant = find_plant(&state.db, plant_id).await?;
    if plant.owner != auth_user.user_id {
        return Err(AppError::PermissionDenied);
    }

    let form = read_upload_form(multipart).await?;

    let ingested = ingest::ingest(
        &state.db,
        &*state.blob_store,
        &state.config.storage,
        auth_user.user_id,
        form.visibility.unwrap_or_default(),
        form.upload,
    )
    .await?;

    let new_key = ingested.store_key();
    let now = Utc::now();
    let new_update = plant_update::ActiveModel {
        id: Set(Uuid::now_v7()),
        plant_id: Set(plant_id),
        asset_id: Set(ingested.id),
        created_at: Set(now),
    };

    let insert = async {
        let txn = state.db.begin().await?;
        ingested.row.insert(&txn).await?;
        let created = new_update.insert(&txn).await?;

        let mut touched: plant::ActiveModel = plant.into();
        touched.updated_at = Set(now);
        touched.update(&txn).await?;

        txn.commit().await?;
        Ok::<_, AppError>(created)
    };

    let created = match insert.await {
        Ok(created) => created,
        Err(e) => {
            assets::purge_blob(&*state.blob_store, &new_key).await;
            return Err(e);
        }
    };

    Ok((StatusCode::CREATED, Json(PlantUpdateResponse::from(created))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Plant Updates",
    operation_id = "listPlantUpdates",
    summary = "List a plant's updates",
    description = "Visibility-checked against the plant. Newest first, paginated.",
    params(
        ("id" = Uuid, Path, description = "Plant ID"),
        PageQuery,
    ),
    responses(
        (status = 200, description = "Updates", body = UpdateListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Plant not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, page), fields(user_id = %auth_user.user_id, plant_id = %plant_id))]
pub async fn list_updates(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(plant_id): Path<Uuid>,
    Query(page): Query<PageQuery>,
) -> Result<Json<UpdateListResponse>, AppError> {
    let (offset, limit) = page.clamp()?;

    let plant = find_plant(&state.db, plant_id).await?;
    check_plant_read(&state.db, auth_user.user_id, &plant).await?;

    let updates = plant_update::Entity::find()
        .filter(plant_update::Column::PlantId.eq(plant_id))
        .order_by_desc(plant_update::Column::CreatedAt)
        .offset(offset)
        .limit(limit)
        .all(&state.db)
        .await?;

    Ok(Json(UpdateListResponse {
        updates: updates.into_iter().map(PlantUpdateResponse::from).collect(),
    }))
}

#[utoipa::path(
    delete,
    path = "/{update_id}",
    tag = "Plant Updates",
    operation_id = "deletePlantUpdate",
    summary = "Delete a plant update",
    description = "Owner only. Removes the update and its image; storage is reclaimed.",
    params(
        ("id" = Uuid, Path, description = "Plant ID"),
        ("update_id" = Uuid, Path, description = "Update ID"),
    ),
    responses(
        (status = 204, description = "Update deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Plant or update not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id, plant_id = %plant_id, update_id = %update_id))]
pub async fn delete_update(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((plant_id, update_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    let plant = find_plant(&state.db, plant_id).await?;
    if plant.owner != auth_user.user_id {
        return Err(AppError::PermissionDenied);
    }

    let update = plant_update::Entity::find_by_id(update_id)
        .one(&state.db)
        .await?
        .filter(|u| u.plant_id == plant_id)
        .ok_or_else(|| AppError::NotFound("Update not found".into()))?;

    let txn = state.db.begin().await?;
    plant_update::Entity::delete_by_id(update_id)
        .exec(&txn)
        .await?;
    asset::Entity::delete_by_id(update.asset_id)
        .exec(&txn)
        .await?;
    txn.commit().await?;

    assets::purge_blob(&*state.blob_store, &update.asset_id.to_string()).await;

    Ok(StatusCode::NO_CONTENT)
}
