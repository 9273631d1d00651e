//! Thumbnail upload: bounded read, then the configured thumbnail store

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::HeaderMap,
};
use tracing::info;

use crate::{
    error::{ApiError, ApiResult},
    handlers::{essence, load_owned_video, parse_video_id},
    models::Video,
    state::AppState,
};

/// Multipart field carrying the image
pub const THUMBNAIL_FIELD: &str = "thumbnail";

/// Accepted thumbnail media types
pub const THUMBNAIL_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png"];

/// `POST /api/thumbnail_upload/:video_id`
pub async fn upload_thumbnail(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> ApiResult<Json<Video>> {
    let video_id = parse_video_id(&video_id)?;
    let user_id = state.auth.authenticate(&headers)?;

    info!(%video_id, %user_id, "Uploading thumbnail");

    let video = load_owned_video(&state, video_id, user_id).await?;

    let mut field = loop {
        match multipart.next_field().await? {
            Some(field) if field.name() == Some(THUMBNAIL_FIELD) => break field,
            Some(_) => continue,
            None => {
                return Err(ApiError::BadRequest(format!(
                    "Missing `{}` file field",
                    THUMBNAIL_FIELD
                )));
            }
        }
    };

    let content_type = essence(field.content_type().unwrap_or_default());
    if !THUMBNAIL_CONTENT_TYPES.contains(&content_type.as_str()) {
        return Err(ApiError::BadRequest(format!(
            "Unsupported content type {:?}, expected one of {}",
            content_type,
            THUMBNAIL_CONTENT_TYPES.join(", ")
        )));
    }

    let max_bytes = state.config.max_thumbnail_bytes;
    let mut data = Vec::new();
    while let Some(chunk) = field.chunk().await? {
        if data.len() + chunk.len() > max_bytes {
            return Err(ApiError::PayloadTooLarge);
        }
        data.extend_from_slice(&chunk);
    }

    if data.is_empty() {
        return Err(ApiError::BadRequest("Thumbnail is empty".to_string()));
    }

    let size = data.len();
    let thumbnail_url = state
        .thumbnails
        .store(video_id, &content_type, data)
        .await?;

    info!(%video_id, size_bytes = size, "Thumbnail stored");

    let video = video.with_thumbnail_url(thumbnail_url);
    state.videos.update(&video).await?;

    Ok(Json(video))
}
