use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Per-asset read visibility.
///
/// `public` assets are readable by any authenticated user; `private` assets
/// only by their owner and the owner's approved followers.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema,
)]
#[derive(DeriveActiveEnum, EnumIter)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum AssetVisibility {
    #[sea_orm(string_value = "public")]
    Public,
    #[default]
    #[sea_orm(string_value = "private")]
    Private,
}

impl std::str::FromStr for AssetVisibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Self::Public),
            "private" => Ok(Self::Private),
            other => Err(format!("unknown visibility '{other}'")),
        }
    }
}

/// A stored binary object plus its metadata.
///
/// The id doubles as the blob-store object key; `content_hash` is the
/// SHA-256 identity of the stored bytes and doubles as the ETag.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "asset")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Owning user. Quota accounting aggregates over this column.
    pub author: Uuid,

    #[sea_orm(belongs_to, from = "author", to = "id")]
    pub owner: BelongsTo<super::user::Entity>,

    /// SHA-256 hex of the stored (normalized) bytes.
    pub content_hash: String,

    /// Size of the stored bytes (after normalization, not as uploaded).
    pub size: i64,

    /// MIME content type of the stored bytes.
    pub content_type: String,

    pub visibility: AssetVisibility,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
