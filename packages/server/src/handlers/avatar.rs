use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use sea_orm::{ActiveModelTrait, EntityTrait, Set, TransactionTrait};
use tracing::instrument;
use uuid::Uuid;

use crate::entity::{asset, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::handlers::upload::read_upload_form;
use crate::models::shared::CreatedAsset;
use crate::services::{assets, ingest, visibility};
use crate::state::AppState;

#[utoipa::path(
    put,
    path = "/",
    tag = "Avatars",
    operation_id = "setAvatar",
    summary = "Set or replace the current user's avatar",
    description = "Uploads a new avatar image (multipart fields `file` and `size`). Avatars \
        are always public. Replacing an existing avatar swaps the reference atomically, so \
        there is no window in which the user has no readable avatar; the previous image is \
        deleted afterwards.",
    request_body(content_type = "multipart/form-data", description = "Avatar image upload"),
    responses(
        (status = 200, description = "Avatar set", body = CreatedAsset),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 413, description = "Too large (IMAGE_TOO_LARGE, QUOTA_EXCEEDED)", body = ErrorBody),
        (status = 415, description = "Not an accepted image type (UNSUPPORTED_MEDIA_TYPE)", body = ErrorBody),
        (status = 422, description = "Undecodable image (UNSUPPORTED_FORMAT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(user_id = %auth_user.user_id))]
pub async fn set_avatar(
    auth_user: AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<CreatedAsset>, AppError> {
    let form = read_upload_form(multipart).await?;

    let ingested = ingest::ingest(
        &state.db,
        &*state.blob_store,
        &state.config.storage,
        auth_user.user_id,
        asset::AssetVisibility::Public,
        form.upload,
    )
    .await?;

    let new_key = ingested.store_key();
    let (asset_id, size) = (ingested.id, ingested.size);

    let old_asset_id = match swap_avatar(&state, auth_user.user_id, ingested).await {
        Ok(old) => old,
        Err(e) => {
            assets::purge_blob(&*state.blob_store, &new_key).await;
            return Err(e);
        }
    };

    if let Some(old_id) = old_asset_id {
        assets::purge_blob(&*state.blob_store, &old_id.to_string()).await;
    }

    Ok(Json(CreatedAsset { asset_id, size }))
}

/// Insert the new asset row, repoint the user's avatar reference and delete
/// the old row, all in one transaction. Returns the replaced asset id.
async fn swap_avatar(
    state: &AppState,
    user_id: Uuid,
    ingested: ingest::IngestedAsset,
) -> Result<Option<Uuid>, AppError> {
    let txn = state.db.begin().await?;

    let user = user::Entity::find_by_id(user_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    let old_asset_id = user.avatar_asset_id;

    ingested.row.insert(&txn).await?;

    let mut active: user::ActiveModel = user.into();
    active.avatar_asset_id = Set(Some(ingested.id));
    active.update(&txn).await?;

    if let Some(old_id) = old_asset_id {
        asset::Entity::delete_by_id(old_id).exec(&txn).await?;
    }

    txn.commit().await?;
    Ok(old_asset_id)
}

#[utoipa::path(
    delete,
    path = "/",
    tag = "Avatars",
    operation_id = "deleteAvatar",
    summary = "Remove the current user's avatar",
    responses(
        (status = 204, description = "Avatar removed"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "No avatar set (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn delete_avatar(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;

    let user = user::Entity::find_by_id(auth_user.user_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let old_id = user
        .avatar_asset_id
        .ok_or_else(|| AppError::NotFound("No avatar set".into()))?;

    let mut active: user::ActiveModel = user.into();
    active.avatar_asset_id = Set(None);
    active.update(&txn).await?;

    asset::Entity::delete_by_id(old_id).exec(&txn).await?;

    txn.commit().await?;

    assets::purge_blob(&*state.blob_store, &old_id.to_string()).await;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/{user_id}",
    tag = "Avatars",
    operation_id = "getAvatar",
    summary = "Download a user's avatar",
    params(("user_id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Avatar bytes", content_type = "image/png"),
        (status = 304, description = "Not modified"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "User or avatar not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, headers), fields(user_id = %auth_user.user_id, target = %user_id))]
pub async fn get_avatar(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let user = user::Entity::find_by_id(user_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let asset_id = user
        .avatar_asset_id
        .ok_or_else(|| AppError::NotFound("No avatar set".into()))?;

    let row = assets::find_asset(&state.db, asset_id).await?;
    visibility::can_read(&state.db, auth_user.user_id, row.author, row.visibility).await?;

    assets::stream_asset(&*state.blob_store, &row, &headers).await
}
