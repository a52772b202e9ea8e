use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    SqlErr,
};
use uuid::Uuid;

use crate::entity::follower::{self, FollowStatus};
use crate::entity::user;
use crate::error::AppError;

/// Create a pending follow request from `from` to `to`.
///
/// Fails on self-follow and on any existing edge between the ordered pair,
/// whatever its status (re-requesting after rejection is not allowed). The
/// composite primary key is the duplicate guard; a unique violation on
/// insert surfaces as a conflict, so concurrent duplicate requests cannot
/// both succeed.
pub async fn request<C: ConnectionTrait>(
    db: &C,
    from: Uuid,
    to: Uuid,
) -> Result<follower::Model, AppError> {
    if from == to {
        return Err(AppError::Validation("Cannot follow yourself".into()));
    }

    user::Entity::find_by_id(to)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let edge = follower::ActiveModel {
        from_user: Set(from),
        to_user: Set(to),
        status: Set(FollowStatus::Pending),
        created_at: Set(Utc::now()),
    };

    edge.insert(db).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("A follow request between these users already exists".into())
        }
        _ => AppError::from(e),
    })
}

/// The edge from `from` to `to`, if one exists.
pub async fn find_edge<C: ConnectionTrait>(
    db: &C,
    from: Uuid,
    to: Uuid,
) -> Result<Option<follower::Model>, AppError> {
    Ok(follower::Entity::find_by_id((from, to)).one(db).await?)
}

/// Status of the edge from `from` to `to`, if one exists.
pub async fn status<C: ConnectionTrait>(
    db: &C,
    from: Uuid,
    to: Uuid,
) -> Result<Option<FollowStatus>, AppError> {
    Ok(find_edge(db, from, to).await?.map(|edge| edge.status))
}

/// Whether `from` is an approved follower of `to`.
pub async fn is_approved_follower<C: ConnectionTrait>(
    db: &C,
    from: Uuid,
    to: Uuid,
) -> Result<bool, AppError> {
    Ok(matches!(
        status(db, from, to).await?,
        Some(FollowStatus::Approved)
    ))
}

/// All pending incoming requests for `to`, oldest first.
pub async fn pending_incoming<C: ConnectionTrait>(
    db: &C,
    to: Uuid,
) -> Result<Vec<follower::Model>, AppError> {
    Ok(follower::Entity::find()
        .filter(follower::Column::ToUser.eq(to))
        .filter(follower::Column::Status.eq(FollowStatus::Pending))
        .order_by_asc(follower::Column::CreatedAt)
        .all(db)
        .await?)
}

/// Approve the pending request from `from`; only valid for the target user.
pub async fn approve<C: ConnectionTrait>(db: &C, to: Uuid, from: Uuid) -> Result<(), AppError> {
    transition(db, from, to, FollowStatus::Approved).await
}

/// Reject the pending request from `from`; only valid for the target user.
pub async fn reject<C: ConnectionTrait>(db: &C, to: Uuid, from: Uuid) -> Result<(), AppError> {
    transition(db, from, to, FollowStatus::Rejected).await
}

/// Move a pending edge to a terminal status.
///
/// Optimistic: the status precondition is re-checked by the conditional
/// UPDATE itself, so a concurrent transition makes this fail with a
/// conflict instead of silently overwriting.
async fn transition<C: ConnectionTrait>(
    db: &C,
    from: Uuid,
    to: Uuid,
    target: FollowStatus,
) -> Result<(), AppError> {
    let edge = follower::Entity::find_by_id((from, to))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("No such follow request".into()))?;

    if edge.status != FollowStatus::Pending {
        return Err(AppError::Conflict("Follow request is not pending".into()));
    }

    let result = follower::Entity::update_many()
        .col_expr(follower::Column::Status, Expr::value(target))
        .filter(follower::Column::FromUser.eq(from))
        .filter(follower::Column::ToUser.eq(to))
        .filter(follower::Column::Status.eq(FollowStatus::Pending))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::Conflict("Follow request is not pending".into()));
    }

    Ok(())
}
