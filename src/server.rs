//! HTTP interface
//!
//! Exposes quote resolution and video search as JSON endpoints. The library
//! is blocking, so every request runs on tokio's blocking pool.

use crate::pipeline::QuotePipeline;
use crate::resolved_media::ResolvedMedia;
use crate::video_search::{VideoRecord, VideoSearch};
use crate::QuoteDetectiveError;
use axum::{
    Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

/// Message returned for every unexpected failure
const GENERIC_ERROR: &str = "An error occurred processing your request";

/// Shared state of all handlers
#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<QuotePipeline>,
    videos: Option<Arc<VideoSearch>>,
}

impl AppState {
    /// Creates the state; without video search `/api/youtube` always fails
    pub fn new(pipeline: Arc<QuotePipeline>, videos: Option<Arc<VideoSearch>>) -> Self {
        Self { pipeline, videos }
    }
}

#[derive(Debug, Deserialize)]
pub struct GuessRequest {
    #[serde(default)]
    quote: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GuessResponse {
    result: ResolvedMedia,
}

#[derive(Debug, Deserialize)]
pub struct VideoRequest {
    #[serde(default)]
    query: Option<String>,
    #[serde(default)]
    timecode: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VideoResponse {
    videos: Vec<VideoRecord>,
}

/// Error wrapper turning library errors into JSON responses
#[derive(Debug)]
pub struct ApiError(QuoteDetectiveError);

impl<E> From<E> for ApiError
where
    E: Into<QuoteDetectiveError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            QuoteDetectiveError::EmptyInput(_) => (StatusCode::BAD_REQUEST, self.0.to_string()),
            QuoteDetectiveError::VideoSearch(e) => {
                error!(error = %e, "Video search failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to fetch videos from YouTube".to_string(),
                )
            }
            other => {
                error!(error = %other, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_ERROR.to_string())
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Builds the application router
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/guess", post(guess))
        .route("/api/youtube", post(youtube))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Binds `addr` and serves until ctrl-c is received
pub async fn serve(state: AppState, addr: SocketAddr) -> Result<(), QuoteDetectiveError> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await?;

    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "ok": true, "version": env!("CARGO_PKG_VERSION") }))
}

async fn guess(
    State(state): State<AppState>,
    payload: Result<Json<GuessRequest>, JsonRejection>,
) -> Result<Json<GuessResponse>, ApiError> {
    let quote = accept_body(payload)
        .and_then(|req| non_blank(req.quote))
        .ok_or(QuoteDetectiveError::EmptyInput("Quote"))?;

    let pipeline = state.pipeline.clone();
    let result = tokio::task::spawn_blocking(move || pipeline.resolve_quote(&quote)).await?;

    Ok(Json(GuessResponse { result }))
}

async fn youtube(
    State(state): State<AppState>,
    payload: Result<Json<VideoRequest>, JsonRejection>,
) -> Result<Json<VideoResponse>, ApiError> {
    let Some(req) = accept_body(payload) else {
        return Err(QuoteDetectiveError::EmptyInput("Query parameter").into());
    };
    let query =
        non_blank(req.query).ok_or(QuoteDetectiveError::EmptyInput("Query parameter"))?;
    let videos = state
        .videos
        .clone()
        .ok_or(QuoteDetectiveError::Unavailable("video search"))?;

    let timecode = non_blank(req.timecode);
    let videos = tokio::task::spawn_blocking(move || {
        videos.search_videos_for_query(&query, timecode.as_deref())
    })
    .await??;

    Ok(Json(VideoResponse { videos }))
}

/// Treats an unreadable body like a missing field; the rejection text stays in the log
fn accept_body<T>(payload: Result<Json<T>, JsonRejection>) -> Option<T> {
    match payload {
        Ok(Json(req)) => Some(req),
        Err(rejection) => {
            debug!(
                status = %rejection.status(),
                error = %rejection.body_text(),
                "Rejected request body"
            );
            None
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
