//! Creative media uploads: accepted formats and storage naming.

use crate::error::CoreError;
use crate::types::DbId;

/// Largest accepted upload in bytes (50 MiB).
pub const MAX_MEDIA_BYTES: usize = 50 * 1024 * 1024;

/// Accepted image file extensions.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Accepted video file extensions.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "webm"];

/// Lowercased extension of an uploaded file name, validated against the
/// accepted formats.
pub fn media_extension(file_name: &str) -> Result<String, CoreError> {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
        .ok_or_else(|| CoreError::Validation(format!("File '{file_name}' has no extension")))?;

    if IMAGE_EXTENSIONS.contains(&ext.as_str()) || VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(CoreError::Validation(format!(
            "Unsupported media type '.{ext}'. Accepted: {:?}",
            [IMAGE_EXTENSIONS, VIDEO_EXTENSIONS].concat()
        )))
    }
}

pub fn is_image(ext: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&ext)
}

/// Reject empty and oversized uploads.
pub fn validate_media_size(len: usize) -> Result<(), CoreError> {
    if len == 0 {
        return Err(CoreError::Validation("Uploaded file is empty".into()));
    }
    if len > MAX_MEDIA_BYTES {
        return Err(CoreError::Validation(format!(
            "Uploaded file exceeds the {} MiB limit",
            MAX_MEDIA_BYTES / (1024 * 1024)
        )));
    }
    Ok(())
}

/// Storage path of an upload relative to the media root: `<user_id>/<millis>.<ext>`.
pub fn media_object_name(user_id: DbId, unix_millis: i64, ext: &str) -> String {
    format!("{user_id}/{unix_millis}.{ext}")
}
