//! Video upload: stage, classify, store, and record the URL

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::HeaderMap,
};
use futures::TryStreamExt;
use media::generate_key;
use tokio_util::io::StreamReader;
use tracing::info;

use crate::{
    error::{ApiError, ApiResult},
    handlers::{essence, load_owned_video, parse_video_id},
    models::Video,
    state::AppState,
};

/// Multipart field carrying the video
pub const VIDEO_FIELD: &str = "video";

/// The only accepted video media type
pub const VIDEO_CONTENT_TYPE: &str = "video/mp4";

/// Extension of stored video objects
pub const VIDEO_EXTENSION: &str = "mp4";

/// `POST /api/video_upload/:video_id`
///
/// The staged file lives in a drop guard, so it is removed on every return
/// path below, including when the request future is dropped mid-upload.
pub async fn upload_video(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> ApiResult<Json<Video>> {
    let video_id = parse_video_id(&video_id)?;
    let user_id = state.auth.authenticate(&headers)?;

    info!(%video_id, %user_id, "Uploading video");

    let video = load_owned_video(&state, video_id, user_id).await?;

    let field = loop {
        match multipart.next_field().await? {
            Some(field) if field.name() == Some(VIDEO_FIELD) => break field,
            Some(_) => continue,
            None => {
                return Err(ApiError::BadRequest(format!(
                    "Missing `{}` file field",
                    VIDEO_FIELD
                )));
            }
        }
    };

    let content_type = essence(field.content_type().unwrap_or_default());
    if content_type != VIDEO_CONTENT_TYPE {
        return Err(ApiError::BadRequest(format!(
            "Unsupported content type {:?}, expected {}",
            content_type, VIDEO_CONTENT_TYPE
        )));
    }

    let reader = StreamReader::new(field.map_err(std::io::Error::other));
    tokio::pin!(reader);

    let mut staged = state.stager.stage(&mut reader).await?;
    let orientation = state.prober.classify(staged.path()).await?;
    let key = generate_key(Some(orientation.as_str()), VIDEO_EXTENSION);

    let body = staged.take_body()?;
    let video_url = state
        .objects
        .put(&key, &content_type, body, staged.size())
        .await?;
    staged.release();

    info!(%video_id, %key, %orientation, "Video stored");

    let video = video.with_video_url(video_url);
    state.videos.update(&video).await?;

    Ok(Json(video))
}
