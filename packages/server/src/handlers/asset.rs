use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::Response;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::services::{assets, visibility};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Assets",
    operation_id = "getAsset",
    summary = "Download an image",
    description = "Streams the stored (PNG-normalized) bytes. Access follows the asset's \
        visibility: public assets are readable by any authenticated user, private assets \
        only by the owner and the owner's approved followers. Supports `If-None-Match` \
        against the content-hash ETag.",
    params(("id" = Uuid, Path, description = "Asset ID")),
    responses(
        (status = 200, description = "Image bytes", content_type = "image/png"),
        (status = 304, description = "Not modified"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Asset not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, headers), fields(user_id = %auth_user.user_id, asset_id = %asset_id))]
pub async fn get_asset(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(asset_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let row = assets::find_asset(&state.db, asset_id).await?;

    visibility::can_read(&state.db, auth_user.user_id, row.author, row.visibility).await?;

    assets::stream_asset(&*state.blob_store, &row, &headers).await
}
