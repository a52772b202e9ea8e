use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::follow::{FollowResponse, PendingListResponse};
use crate::services::follow;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/requests/{to_user}",
    tag = "Follows",
    operation_id = "requestFollow",
    summary = "Request to follow a user",
    description = "Creates a pending follow request. At most one request per ordered user \
        pair ever exists, whatever its status.",
    params(("to_user" = Uuid, Path, description = "User to follow")),
    responses(
        (status = 201, description = "Request created", body = FollowResponse),
        (status = 400, description = "Self-follow (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Target user not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Request already exists (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(from = %auth_user.user_id, to = %to_user))]
pub async fn request_follow(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(to_user): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let edge = follow::request(&state.db, auth_user.user_id, to_user).await?;
    Ok((StatusCode::CREATED, Json(FollowResponse::from(edge))))
}

#[utoipa::path(
    get,
    path = "/requests/{to_user}",
    tag = "Follows",
    operation_id = "getFollowStatus",
    summary = "Status of the caller's request toward a user",
    params(("to_user" = Uuid, Path, description = "Target user")),
    responses(
        (status = 200, description = "Edge status", body = FollowResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "No request exists (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(from = %auth_user.user_id, to = %to_user))]
pub async fn follow_status(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(to_user): Path<Uuid>,
) -> Result<Json<FollowResponse>, AppError> {
    let edge = follow::find_edge(&state.db, auth_user.user_id, to_user)
        .await?
        .ok_or_else(|| AppError::NotFound("No such follow request".into()))?;

    Ok(Json(FollowResponse::from(edge)))
}

#[utoipa::path(
    get,
    path = "/pending",
    tag = "Follows",
    operation_id = "listPendingFollows",
    summary = "Pending incoming follow requests",
    responses(
        (status = 200, description = "Pending requests, oldest first", body = PendingListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn list_pending(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<PendingListResponse>, AppError> {
    let edges = follow::pending_incoming(&state.db, auth_user.user_id).await?;

    Ok(Json(PendingListResponse {
        requests: edges.into_iter().map(FollowResponse::from).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/pending/{from_user}/approve",
    tag = "Follows",
    operation_id = "approveFollow",
    summary = "Approve a pending follow request",
    params(("from_user" = Uuid, Path, description = "Requesting user")),
    responses(
        (status = 204, description = "Approved"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "No request exists (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Request is not pending (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(to = %auth_user.user_id, from = %from_user))]
pub async fn approve_follow(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(from_user): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    follow::approve(&state.db, auth_user.user_id, from_user).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/pending/{from_user}/reject",
    tag = "Follows",
    operation_id = "rejectFollow",
    summary = "Reject a pending follow request",
    params(("from_user" = Uuid, Path, description = "Requesting user")),
    responses(
        (status = 204, description = "Rejected"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "No request exists (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Request is not pending (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(to = %auth_user.user_id, from = %from_user))]
pub async fn reject_follow(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(from_user): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    follow::reject(&state.db, auth_user.user_id, from_user).await?;
    Ok(StatusCode::NO_CONTENT)
}
