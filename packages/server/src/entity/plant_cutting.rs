use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Propagation edge between two plants: `cutting_id` was grown from a
/// cutting of `parent_id`. Modeled as an explicit edge table (indexed from
/// both ends via the composite key) rather than a parent pointer on the
/// plant row.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "plant_cutting")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub parent_id: Uuid,

    #[sea_orm(primary_key, auto_increment = false)]
    pub cutting_id: Uuid,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
