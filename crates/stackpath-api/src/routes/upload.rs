use axum::extract::{Multipart, State};
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;

use stackpath_types::Attachment;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

const MB: u64 = 1024 * 1024;

/// Accept one multipart file field, validate it against the allow-list
/// and store it, returning a stable attachment reference.
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> ApiResult<Json<Value>> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {}", e)))?
        .ok_or_else(|| ApiError::UploadValidation {
            field: "file".to_string(),
            message: "No file field present".to_string(),
        })?;

    let name = field
        .file_name()
        .map(sanitize_file_name)
        .unwrap_or_else(|| "upload".to_string());
    let mime = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();

    let bytes = field
        .bytes()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read file field: {}", e)))?;

    validate_upload(&name, &mime, bytes.len() as u64)?;

    let key = format!("{}-{}", uuid::Uuid::new_v4(), name);
    let url = state
        .object_store
        .put(&key, &bytes)
        .await
        .map_err(|e| ApiError::Storage(e.to_string()))?;

    let attachment = Attachment {
        url,
        key,
        name,
        mime,
        size: bytes.len() as u64,
    };

    tracing::info!(key = %attachment.key, size = attachment.size, "Attachment stored");

    Ok(Json(json!({
        "success": true,
        "url": attachment.url,
        "key": attachment.key,
        "name": attachment.name,
        "type": attachment.mime,
        "size": attachment.size,
    })))
}

/// MIME allow-list with per-type size caps. Octet-stream is admitted
/// only for markdown/plain-text extensions, at the text cap.
pub fn validate_upload(name: &str, mime: &str, size: u64) -> Result<(), ApiError> {
    let max_size = match mime {
        "image/png" | "image/jpeg" | "image/jpg" => 5 * MB,
        "application/pdf" => 10 * MB,
        "text/markdown" | "text/plain" => 2 * MB,
        "application/octet-stream" => {
            let lower = name.to_lowercase();
            if lower.ends_with(".md") || lower.ends_with(".markdown") || lower.ends_with(".txt") {
                2 * MB
            } else {
                return Err(ApiError::UploadValidation {
                    field: "type".to_string(),
                    message: format!("File type not allowed: {} ({})", mime, name),
                });
            }
        }
        other => {
            return Err(ApiError::UploadValidation {
                field: "type".to_string(),
                message: format!("File type not allowed: {}", other),
            });
        }
    };

    if size > max_size {
        return Err(ApiError::UploadValidation {
            field: "size".to_string(),
            message: format!(
                "File exceeds the {}MB limit for {}",
                max_size / MB,
                mime
            ),
        });
    }

    Ok(())
}

fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
