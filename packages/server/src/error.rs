use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::storage::StorageError;
use sea_orm::DbErr;
use serde::Serialize;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `TOKEN_MISSING`,
    /// `TOKEN_INVALID`, `INVALID_CREDENTIALS`, `PERMISSION_DENIED`, `NOT_FOUND`,
    /// `CONFLICT`, `USERNAME_TAKEN`, `EMAIL_TAKEN`, `IMAGE_TOO_LARGE`,
    /// `QUOTA_EXCEEDED`, `UNSUPPORTED_MEDIA_TYPE`, `UNSUPPORTED_FORMAT`,
    /// `STORE_UNAVAILABLE`, `INTERNAL_ERROR`.
    #[schema(example = "VALIDATION_ERROR")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Image size is required")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    TokenMissing,
    TokenInvalid,
    InvalidCredentials,
    /// Visibility or ownership check failed. Never downgraded to NotFound:
    /// one uniform policy across all read paths.
    PermissionDenied,
    NotFound(String),
    Conflict(String),
    UsernameTaken,
    EmailTaken,
    /// Single upload exceeds the per-image size limit.
    TooLarge {
        limit: u64,
    },
    /// Projected storage usage exceeds the per-user ceiling.
    QuotaExceeded,
    /// Declared content type is not an accepted image type.
    UnsupportedMedia(String),
    /// The bytes could not be decoded as an image (distinct from a wrong
    /// declared content type).
    UnsupportedFormat,
    /// The blob store could not serve the request.
    StoreUnavailable(String),
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "VALIDATION_ERROR",
                    message: msg,
                },
            ),
            AppError::TokenMissing => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "TOKEN_MISSING",
                    message: "Authentication required".into(),
                },
            ),
            AppError::TokenInvalid => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "TOKEN_INVALID",
                    message: "Invalid or expired token".into(),
                },
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "INVALID_CREDENTIALS",
                    message: "Invalid username or password".into(),
                },
            ),
            AppError::PermissionDenied => (
                StatusCode::FORBIDDEN,
                ErrorBody {
                    code: "PERMISSION_DENIED",
                    message: "Not authorized to access this resource".into(),
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "NOT_FOUND",
                    message: msg,
                },
            ),
            AppError::Conflict(msg) => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "CONFLICT",
                    message: msg,
                },
            ),
            AppError::UsernameTaken => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "USERNAME_TAKEN",
                    message: "Username is already taken".into(),
                },
            ),
            AppError::EmailTaken => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "EMAIL_TAKEN",
                    message: "Email is already registered".into(),
                },
            ),
            AppError::TooLarge { limit } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                ErrorBody {
                    code: "IMAGE_TOO_LARGE",
                    message: format!("Image too large. Maximum size is {limit} bytes"),
                },
            ),
            AppError::QuotaExceeded => (
                StatusCode::PAYLOAD_TOO_LARGE,
                ErrorBody {
                    code: "QUOTA_EXCEEDED",
                    message: "Image too large. Not enough storage space left".into(),
                },
            ),
            AppError::UnsupportedMedia(ct) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                ErrorBody {
                    code: "UNSUPPORTED_MEDIA_TYPE",
                    message: format!("Content type '{ct}' is not an accepted image type"),
                },
            ),
            AppError::UnsupportedFormat => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorBody {
                    code: "UNSUPPORTED_FORMAT",
                    message: "Unsupported or invalid image format".into(),
                },
            ),
            AppError::StoreUnavailable(detail) => {
                tracing::error!("Blob store unavailable: {}", detail);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorBody {
                        code: "STORE_UNAVAILABLE",
                        message: "Storage backend is temporarily unavailable".into(),
                    },
                )
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "INTERNAL_ERROR",
                        message: "An unexpected error occurred".into(),
                    },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => {
                tracing::warn!(key, "asset row exists but blob is missing");
                AppError::NotFound("Image not found".into())
            }
            StorageError::Unavailable(msg) => AppError::StoreUnavailable(msg),
            StorageError::Io(e) => AppError::StoreUnavailable(e.to_string()),
            // Normalization can inflate the stored bytes past the per-image
            // limit even when the declared size was within it.
            StorageError::SizeLimitExceeded { limit, .. } => AppError::TooLarge { limit },
            other => AppError::Internal(other.to_string()),
        }
    }
}
