//! Handler for creative media uploads.
//!
//! Files are written under `MEDIA_DIR/<user_id>/` and served back from
//! `/media` by the router.

use std::path::PathBuf;

use axum::extract::{Multipart, State};
use axum::response::IntoResponse;
use serde::Serialize;
use adsage_core::media::{is_image, media_extension, media_object_name, validate_media_size};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::created;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UploadedMedia {
    /// Public URL to store as the creative's `media_url`.
    pub url: String,
    /// `image` or `video`.
    pub kind: &'static str,
    pub size_bytes: usize,
}

/// POST /api/v1/media
///
/// Multipart upload with a single `file` field.
pub async fn upload_media(
    auth: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let mut file_data: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or("").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            file_data = Some((filename, data.to_vec()));
        }
    }

    let (filename, data) =
        file_data.ok_or_else(|| AppError::BadRequest("Missing required 'file' field".into()))?;

    let ext = media_extension(&filename)?;
    validate_media_size(data.len())?;

    let object_name = media_object_name(
        auth.user_id,
        chrono::Utc::now().timestamp_millis(),
        &ext,
    );
    let path = PathBuf::from(&state.config.media_dir).join(&object_name);
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| AppError::InternalError(format!("Failed to create media dir: {e}")))?;
    }
    tokio::fs::write(&path, &data)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to store media: {e}")))?;

    tracing::info!(
        user_id = auth.user_id,
        object = %object_name,
        size_bytes = data.len(),
        "Media uploaded",
    );

    Ok(created(UploadedMedia {
        url: format!("{}/media/{object_name}", state.config.public_base_url),
        kind: if is_image(&ext) { "image" } else { "video" },
        size_bytes: data.len(),
    }))
}
