use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use sea_orm::sea_query::Condition;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::asset::AssetVisibility;
use crate::entity::{asset, plant, plant_cutting, plant_update};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::handlers::upload::read_upload_form;
use crate::models::plant::{PlantListResponse, PlantResponse};
use crate::models::shared::validate_name;
use crate::services::{assets, ingest, visibility};
use crate::state::AppState;

/// Load a plant row or fail with not found.
pub async fn find_plant<C: ConnectionTrait>(
    db: &C,
    plant_id: Uuid,
) -> Result<plant::Model, AppError> {
    plant::Entity::find_by_id(plant_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Plant not found".into()))
}

/// Check that `requester` may read `plant`.
///
/// A plant inherits the visibility of its registration photo; a plant
/// without one is treated as private.
pub async fn check_plant_read<C: ConnectionTrait>(
    db: &C,
    requester: Uuid,
    plant: &plant::Model,
) -> Result<(), AppError> {
    if requester == plant.owner {
        return Ok(());
    }

    let vis = match plant.asset_id {
        Some(asset_id) => assets::find_asset(db, asset_id).await?.visibility,
        None => AssetVisibility::Private,
    };

    visibility::can_read(db, requester, plant.owner, vis).await
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Plants",
    operation_id = "listPlants",
    summary = "List the current user's plants",
    responses(
        (status = 200, description = "Plants, newest first", body = PlantListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn list_plants(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<PlantListResponse>, AppError> {
    let plants = plant::Entity::find()
        .filter(plant::Column::Owner.eq(auth_user.user_id))
        .order_by_desc(plant::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(PlantListResponse {
        plants: plants.into_iter().map(PlantResponse::from).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Plants",
    operation_id = "createPlant",
    summary = "Register a new plant",
    description = "Multipart fields: `file` (registration photo), `size`, `name`, and an \
        optional `visibility` (`public` or `private`, default private). The photo's \
        visibility governs who can see the plant.",
    request_body(content_type = "multipart/form-data", description = "Plant registration"),
    responses(
        (status = 201, description = "Plant created", body = PlantResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 413, description = "Too large (IMAGE_TOO_LARGE, QUOTA_EXCEEDED)", body = ErrorBody),
        (status = 415, description = "Not an accepted image type (UNSUPPORTED_MEDIA_TYPE)", body = ErrorBody),
        (status = 422, description = "Undecodable image (UNSUPPORTED_FORMAT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(user_id = %auth_user.user_id))]
pub async fn create_plant(
    auth_user: AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let form = read_upload_form(multipart).await?;

    let name = form
        .fields
        .get("name")
        .ok_or_else(|| AppError::Validation("Missing 'name' field".into()))?
        .trim()
        .to_string();
    validate_name(&name)?;

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
    let new_plant = plant::ActiveModel {
        id: Set(Uuid::now_v7()),
        owner: Set(auth_user.user_id),
        name: Set(name),
        dead: Set(false),
        asset_id: Set(Some(ingested.id)),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let insert = async {
        let txn = state.db.begin().await?;
        ingested.row.insert(&txn).await?;
        let created = new_plant.insert(&txn).await?;
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

    Ok((StatusCode::CREATED, Json(PlantResponse::from(created))))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Plants",
    operation_id = "getPlant",
    summary = "Fetch one plant",
    params(("id" = Uuid, Path, description = "Plant ID")),
    responses(
        (status = 200, description = "Plant", body = PlantResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Plant not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id, plant_id = %plant_id))]
pub async fn get_plant(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(plant_id): Path<Uuid>,
) -> Result<Json<PlantResponse>, AppError> {
    let plant = find_plant(&state.db, plant_id).await?;
    check_plant_read(&state.db, auth_user.user_id, &plant).await?;

    Ok(Json(PlantResponse::from(plant)))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Plants",
    operation_id = "deletePlant",
    summary = "Delete a plant",
    description = "Owner only. Deletes the plant, all of its updates, its cutting edges \
        and every image the plant owned; storage is reclaimed.",
    params(("id" = Uuid, Path, description = "Plant ID")),
    responses(
        (status = 204, description = "Plant deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Plant not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id, plant_id = %plant_id))]
pub async fn delete_plant(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(plant_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let plant = find_plant(&state.db, plant_id).await?;
    if plant.owner != auth_user.user_id {
        return Err(AppError::PermissionDenied);
    }

    let txn = state.db.begin().await?;

    let updates = plant_update::Entity::find()
        .filter(plant_update::Column::PlantId.eq(plant_id))
        .all(&txn)
        .await?;

    let mut doomed_assets: Vec<Uuid> = updates.iter().map(|u| u.asset_id).collect();
    if let Some(asset_id) = plant.asset_id {
        doomed_assets.push(asset_id);
    }

    plant_update::Entity::delete_many()
        .filter(plant_update::Column::PlantId.eq(plant_id))
        .exec(&txn)
        .await?;

    plant_cutting::Entity::delete_many()
        .filter(
            Condition::any()
                .add(plant_cutting::Column::ParentId.eq(plant_id))
                .add(plant_cutting::Column::CuttingId.eq(plant_id)),
        )
        .exec(&txn)
        .await?;

    plant::Entity::delete_by_id(plant_id).exec(&txn).await?;

    if !doomed_assets.is_empty() {
        asset::Entity::delete_many()
            .filter(asset::Column::Id.is_in(doomed_assets.clone()))
            .exec(&txn)
            .await?;
    }

    txn.commit().await?;

    for asset_id in doomed_assets {
        assets::purge_blob(&*state.blob_store, &asset_id.to_string()).await;
    }

    Ok(StatusCode::NO_CONTENT)
}
