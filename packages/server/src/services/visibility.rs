use sea_orm::ConnectionTrait;
use uuid::Uuid;

use crate::entity::asset::AssetVisibility;
use crate::error::AppError;
use crate::services::follow;

/// Pure visibility decision, given a resolved follow relationship.
///
/// Decision order: public allows everyone; otherwise the owner; otherwise
/// an approved follower of the owner.
pub fn decide(
    requester: Uuid,
    owner: Uuid,
    visibility: AssetVisibility,
    approved_follower: bool,
) -> bool {
    match visibility {
        AssetVisibility::Public => true,
        AssetVisibility::Private => requester == owner || approved_follower,
    }
}

/// Check whether `requester` may read an asset owned by `owner`.
///
/// Consults the follow graph only when the cheap checks fail. Deny surfaces
/// as `PermissionDenied`, never as NotFound.
pub async fn can_read<C: ConnectionTrait>(
    db: &C,
    requester: Uuid,
    owner: Uuid,
    visibility: AssetVisibility,
) -> Result<(), AppError> {
    if decide(requester, owner, visibility, false) {
        return Ok(());
    }

    if follow::is_approved_follower(db, requester, owner).await? {
        return Ok(());
    }

    Err(AppError::PermissionDenied)
}
