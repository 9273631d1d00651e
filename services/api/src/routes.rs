//! API service routes

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{
    handlers::{upload_thumbnail, upload_video},
    state::AppState,
};

/// Create the router for the API service
///
/// Each upload route carries its own body limit; multipart reads past it
/// fail with 413.
pub fn create_router(state: AppState) -> Router {
    let max_video_bytes = state.config.max_video_bytes;
    let max_thumbnail_bytes = state.config.max_thumbnail_bytes;
    let assets = ServeDir::new(&state.config.assets_root);

    Router::new()
        .route("/health", get(health_check))
        .route(
            "/api/video_upload/:video_id",
            post(upload_video).layer(DefaultBodyLimit::max(max_video_bytes)),
        )
        .route(
            "/api/thumbnail_upload/:video_id",
            // Multipart framing on top of the image itself
            post(upload_thumbnail).layer(DefaultBodyLimit::max(
                max_thumbnail_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES),
            )),
        )
        .nest_service("/assets", assets)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "api-service"
    }))
}
