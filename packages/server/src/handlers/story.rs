use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use tracing::instrument;
use uuid::Uuid;

use crate::entity::{asset, story};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::handlers::upload::read_upload_form;
use crate::models::story::{StoryListResponse, StoryResponse};
use crate::services::{assets, ingest, visibility};
use crate::state::AppState;

async fn find_story<C: ConnectionTrait>(db: &C, story_id: Uuid) -> Result<story::Model, AppError> {
    story::Entity::find_by_id(story_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Story not found".into()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Stories",
    operation_id = "postStory",
    summary = "Post a story",
    description = "Multipart fields `file` and `size`, optional `visibility` (default \
        private).",
    request_body(content_type = "multipart/form-data", description = "Story image"),
    responses(
        (status = 201, description = "Story posted", body = StoryResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 413, description = "Too large (IMAGE_TOO_LARGE, QUOTA_EXCEEDED)", body = ErrorBody),
        (status = 415, description = "Not an accepted image type (UNSUPPORTED_MEDIA_TYPE)", body = ErrorBody),
        (status = 422, description = "Undecodable image (UNSUPPORTED_FORMAT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(user_id = %auth_user.user_id))]
pub async fn post_story(
    auth_user: AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
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
    let new_story = story::ActiveModel {
        id: Set(Uuid::now_v7()),
        author: Set(auth_user.user_id),
        asset_id: Set(ingested.id),
        created_at: Set(Utc::now()),
    };

    let insert = async {
        let txn = state.db.begin().await?;
        ingested.row.insert(&txn).await?;
        let created = new_story.insert(&txn).await?;
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

    Ok((StatusCode::CREATED, Json(StoryResponse::from(created))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Stories",
    operation_id = "listStories",
    summary = "List the current user's stories",
    responses(
        (status = 200, description = "Stories, newest first", body = StoryListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn list_stories(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<StoryListResponse>, AppError> {
    let stories = story::Entity::find()
        .filter(story::Column::Author.eq(auth_user.user_id))
        .order_by_desc(story::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(StoryListResponse {
        stories: stories.into_iter().map(StoryResponse::from).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Stories",
    operation_id = "getStory",
    summary = "Fetch one story",
    description = "Access follows the visibility of the story's image, for everyone \
        including the author's followers.",
    params(("id" = Uuid, Path, description = "Story ID")),
    responses(
        (status = 200, description = "Story", body = StoryResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Story not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id, story_id = %story_id))]
pub async fn get_story(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(story_id): Path<Uuid>,
) -> Result<Json<StoryResponse>, AppError> {
    let story = find_story(&state.db, story_id).await?;

    let image = assets::find_asset(&state.db, story.asset_id).await?;
    visibility::can_read(&state.db, auth_user.user_id, story.author, image.visibility).await?;

    Ok(Json(StoryResponse::from(story)))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Stories",
    operation_id = "deleteStory",
    summary = "Delete a story",
    description = "Author only. Removes the story and its image; storage is reclaimed.",
    params(("id" = Uuid, Path, description = "Story ID")),
    responses(
        (status = 204, description = "Story deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Story not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id, story_id = %story_id))]
pub async fn delete_story(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(story_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let story = find_story(&state.db, story_id).await?;
    if story.author != auth_user.user_id {
        return Err(AppError::PermissionDenied);
    }

    let txn = state.db.begin().await?;
    story::Entity::delete_by_id(story_id).exec(&txn).await?;
    asset::Entity::delete_by_id(story.asset_id).exec(&txn).await?;
    txn.commit().await?;

    assets::purge_blob(&*state.blob_store, &story.asset_id.to_string()).await;

    Ok(StatusCode::NO_CONTENT)
}
