use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One entry in a plant's photo history. Owns exactly one asset.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "plant_update")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub plant_id: Uuid,

    #[sea_orm(belongs_to, from = "plant_id", to = "id")]
    pub plant: BelongsTo<super::plant::Entity>,

    pub asset_id: Uuid,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
