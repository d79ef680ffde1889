//! Watch history endpoints backed by the progress store.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use playgate_core::Error;
use serde::{Deserialize, Serialize};

use super::error::AppError;
use super::AppContext;
use crate::progress::HistoryEntry;

#[derive(Debug, Serialize, Deserialize)]
pub struct WatchedResponse {
    pub anime_id: String,
    pub episodes: Vec<u32>,
}

pub fn history_routes() -> Router<AppContext> {
    Router::new()
        .route("/history", get(list_history).delete(clear_history))
        .route("/history/:anime_id", get(resume_point).delete(remove_history))
        .route("/watched/:anime_id", get(watched))
}

/// GET /api/history
///
/// Recently watched anime, newest first.
async fn list_history(State(ctx): State<AppContext>) -> Json<Vec<HistoryEntry>> {
    Json(ctx.progress.history().await)
}

/// DELETE /api/history
async fn clear_history(State(ctx): State<AppContext>) -> Result<StatusCode, AppError> {
    ctx.progress.clear().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/history/{anime_id}
///
/// Resume point for one anime, or 404 when it has no progress.
async fn resume_point(
    State(ctx): State<AppContext>,
    Path(anime_id): Path<String>,
) -> Result<Json<HistoryEntry>, AppError> {
    ctx.progress
        .resume_point(&anime_id)
        .await
        .map(Json)
        .ok_or_else(|| Error::not_found("history entry", anime_id).into())
}

/// DELETE /api/history/{anime_id}
async fn remove_history(
    State(ctx): State<AppContext>,
    Path(anime_id): Path<String>,
) -> Result<StatusCode, AppError> {
    ctx.progress.remove(&anime_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/watched/{anime_id}
async fn watched(
    State(ctx): State<AppContext>,
    Path(anime_id): Path<String>,
) -> Json<WatchedResponse> {
    let episodes = ctx.progress.watched(&anime_id).await;
    Json(WatchedResponse { anime_id, episodes })
}
