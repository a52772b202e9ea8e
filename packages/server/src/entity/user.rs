use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(unique)]
    pub username: String,

    #[sea_orm(unique)]
    pub email: String,

    pub password_hash: String,

    /// Current avatar asset, if one is set. Swapped atomically on replace.
    pub avatar_asset_id: Option<Uuid>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
