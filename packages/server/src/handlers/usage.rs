use axum::{Json, extract::State};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::usage::UsageResponse;
use crate::services::quota;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Usage",
    operation_id = "getUsage",
    summary = "Current user's storage usage",
    responses(
        (status = 200, description = "Usage", body = UsageResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn get_usage(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<UsageResponse>, AppError> {
    let usage = quota::usage(
        &state.db,
        auth_user.user_id,
        state.config.storage.max_total_storage,
    )
    .await?;

    Ok(Json(UsageResponse::from(usage)))
}
