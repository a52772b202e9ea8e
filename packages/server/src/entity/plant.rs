use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "plant")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub owner: Uuid,

    #[sea_orm(belongs_to, from = "owner", to = "id")]
    pub owner_user: BelongsTo<super::user::Entity>,

    pub name: String,

    pub dead: bool,

    /// The plant's photo asset, set at registration.
    pub asset_id: Option<Uuid>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
