//! Route definitions for media uploads, mounted at `/media`.

use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use axum::Router;
use adsage_core::media::MAX_MEDIA_BYTES;

use crate::handlers::media;
use crate::state::AppState;

/// Room for multipart framing on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// ```text
/// POST   /   -> upload_media
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(media::upload_media))
        .layer(DefaultBodyLimit::max(MAX_MEDIA_BYTES + MULTIPART_OVERHEAD_BYTES))
}
