//! Upload handlers and the steps they share

use tracing::warn;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    models::Video,
    state::AppState,
};

pub mod thumbnail_upload;
pub mod video_upload;

pub use thumbnail_upload::upload_thumbnail;
pub use video_upload::upload_video;

pub(crate) fn parse_video_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest("Invalid video ID".to_string()))
}

/// Load the video and make sure `user_id` owns it.
///
/// Returning an error here ends the request; nothing past this point runs for
/// a caller who is not the owner.
pub(crate) async fn load_owned_video(
    state: &AppState,
    video_id: Uuid,
    user_id: Uuid,
) -> ApiResult<Video> {
    let video = state
        .videos
        .get(video_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Couldn't find video".to_string()))?;

    if video.user_id != user_id {
        warn!(%video_id, %user_id, owner = %video.user_id, "Upload rejected: not the owner");
        return Err(ApiError::Forbidden("Not the owner of this video".to_string()));
    }

    Ok(video)
}

/// Media type without parameters, lowercased (`Video/MP4; codecs=x` → `video/mp4`)
pub(crate) fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}
