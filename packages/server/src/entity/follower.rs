use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle of a directed follow edge.
///
/// Created `pending`; only the target user moves it to `approved` or
/// `rejected`. An `approved` edge is the sole basis (besides ownership and
/// public visibility) for private-asset read access.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema,
)]
#[derive(DeriveActiveEnum, EnumIter)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum FollowStatus {
    #[default]
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "approved")]
    Approved,
}

/// Directed follow edge. At most one edge per ordered pair, enforced by the
/// composite primary key.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "follower")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub from_user: Uuid,

    #[sea_orm(primary_key, auto_increment = false)]
    pub to_user: Uuid,

    pub status: FollowStatus,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
