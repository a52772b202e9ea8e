use serde::Serialize;

use crate::services::quota::Usage;

/// A user's storage consumption.
#[derive(Serialize, utoipa::ToSchema)]
pub struct UsageResponse {
    /// Bytes currently stored across all of the user's images.
    #[schema(example = 1048576)]
    pub used_bytes: u64,
    /// Per-user storage ceiling in bytes.
    #[schema(example = 104857600)]
    pub limit_bytes: u64,
}

impl From<Usage> for UsageResponse {
    fn from(usage: Usage) -> Self {
        Self {
            used_bytes: usage.used_bytes,
            limit_bytes: usage.limit_bytes,
        }
    }
}
