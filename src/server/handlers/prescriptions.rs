use std::path::Path;
use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::state::AppState;

const UPLOAD_FIELD: &str = "prescription";

pub async fn upload_prescription(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid upload: {}", e)))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let original_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(|e| {
            tracing::warn!("Failed to read upload bytes: {e}");
            ApiError::BadRequest("Failed to read file data".to_string())
        })?;
        upload = Some((original_name, bytes.to_vec()));
    }

    let Some((original_name, bytes)) = upload else {
        return Err(ApiError::BadRequest("No file uploaded".to_string()));
    };

    let filename = stored_filename(&original_name, chrono::Utc::now().timestamp_millis());
    let uploads_dir = &state.paths.uploads_dir;
    tokio::fs::create_dir_all(uploads_dir)
        .await
        .map_err(ApiError::internal)?;
    let image_path = uploads_dir.join(&filename);
    tokio::fs::write(&image_path, &bytes)
        .await
        .map_err(ApiError::internal)?;

    let text = state.ocr.recognize(&image_path).await.map_err(|err| {
        tracing::error!(error = %err, file = %filename, "OCR failed");
        ApiError::Internal("Failed to process image".to_string())
    })?;

    Ok(Json(json!({
        "message": "File processed",
        "extractedText": text,
        "filePath": format!("/uploads/{}", filename)
    })))
}

/// `{millis}{.ext}`, keeping only the original extension.
fn stored_filename(original_name: &str, millis: i64) -> String {
    let extension = Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default();
    format!("{}{}", millis, extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_filename_keeps_extension_only() {
        assert_eq!(stored_filename("rx scan.PNG", 1700000000000), "1700000000000.PNG");
        assert_eq!(stored_filename("../../etc/passwd", 42), "42");
        assert_eq!(stored_filename("", 42), "42");
        assert_eq!(stored_filename("photo.jp g", 7), "7");
    }
}
