use std::collections::HashMap;

use axum::extract::{DefaultBodyLimit, Multipart};

use crate::entity::asset::AssetVisibility;
use crate::error::AppError;
use crate::services::ingest::NewUpload;

/// Body limit for multipart image uploads, sized from the configured
/// per-image maximum. Larger than that maximum so an oversized image is
/// rejected with a structured 413 instead of a connection-level body error.
pub fn upload_body_limit(max_image_size: u64) -> DefaultBodyLimit {
    DefaultBodyLimit::max(upload_body_limit_bytes(max_image_size))
}

/// Twice the image cap, plus slack for multipart framing and text fields.
fn upload_body_limit_bytes(max_image_size: u64) -> usize {
    let bytes = max_image_size
        .saturating_mul(2)
        .saturating_add(1024 * 1024);
    usize::try_from(bytes).unwrap_or(usize::MAX)
}

/// A parsed image upload form.
///
/// Recognized fields: `file` (the image part), `size` (declared byte count),
/// `visibility` (`public` or `private`), plus any extra text fields the
/// endpoint cares about (collected into `fields`).
pub struct UploadForm {
    pub upload: NewUpload,
    pub visibility: Option<AssetVisibility>,
    pub fields: HashMap<String, String>,
}

pub async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut bytes: Option<Vec<u8>> = None;
    let mut content_type: Option<String> = None;
    let mut declared_size: Option<u64> = None;
    let mut visibility: Option<AssetVisibility> = None;
    let mut fields = HashMap::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        match field.name().map(|s| s.to_string()) {
            Some(name) if name == "file" => {
                content_type = field.content_type().map(|s| s.to_string());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read file: {e}")))?;
                bytes = Some(data.to_vec());
            }
            Some(name) if name == "size" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read size: {e}")))?;
                let parsed = text
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| AppError::Validation("Size must be a non-negative integer".into()))?;
                declared_size = Some(parsed);
            }
            Some(name) if name == "visibility" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read visibility: {e}")))?;
                let parsed = text
                    .trim()
                    .parse::<AssetVisibility>()
                    .map_err(|e| AppError::Validation(e))?;
                visibility = Some(parsed);
            }
            Some(name) => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read {name}: {e}")))?;
                fields.insert(name, text);
            }
            None => {} // Ignore unnamed fields.
        }
    }

    let bytes = bytes.ok_or_else(|| AppError::Validation("Missing 'file' field".into()))?;

    Ok(UploadForm {
        upload: NewUpload {
            declared_size,
            content_type,
            bytes,
        },
        visibility,
        fields,
    })
}
