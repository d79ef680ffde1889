//! Playback session endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use playgate_core::{EpisodeRef, Error};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::error::AppError;
use super::AppContext;
use crate::session::{
    EpisodeView, PendingResolution, PlaybackSession, ServerChoice, SessionSnapshot,
};

// ---------------------------------------------------------------------------
// Request schemas
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    pub anime_id: String,
    pub episode: EpisodeRef,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SwitchServerRequest {
    pub choice: ServerChoice,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NavigateRequest {
    pub episode: EpisodeRef,
}

// ---------------------------------------------------------------------------
// Routes
// ---------------------------------------------------------------------------

pub fn session_routes() -> Router<AppContext> {
    Router::new()
        .route("/sessions", post(create_session))
        .route("/sessions/:id", get(get_session).delete(end_session))
        .route("/sessions/:id/server", post(switch_server))
        .route("/sessions/:id/navigate", post(navigate))
}

/// POST /api/sessions
///
/// Mount an episode view and start resolving its primary stream.
async fn create_session(
    State(ctx): State<AppContext>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionSnapshot>), AppError> {
    if req.anime_id.trim().is_empty() {
        return Err(Error::Validation("anime_id is required".into()).into());
    }

    let view = load_view(&ctx, &req.anime_id, req.episode).await?;
    let session = ctx.sessions.register(view);
    let pending = session.load();
    let snapshot = session.snapshot();
    spawn_resolution(session, pending);

    Ok((StatusCode::CREATED, Json(snapshot)))
}

/// GET /api/sessions/{id}
async fn get_session(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let session = find_session(&ctx, &id)?;
    Ok(Json(session.snapshot()))
}

/// POST /api/sessions/{id}/server
///
/// Switch to the default stream or one of the candidate servers.
async fn switch_server(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    Json(req): Json<SwitchServerRequest>,
) -> Result<(StatusCode, Json<SessionSnapshot>), AppError> {
    let session = find_session(&ctx, &id)?;
    let pending = session.switch_server(&req.choice)?;
    let snapshot = session.snapshot();
    spawn_resolution(session, pending);

    Ok((StatusCode::ACCEPTED, Json(snapshot)))
}

/// POST /api/sessions/{id}/navigate
///
/// Move the session to another episode of the same anime.
async fn navigate(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    Json(req): Json<NavigateRequest>,
) -> Result<(StatusCode, Json<SessionSnapshot>), AppError> {
    let session = find_session(&ctx, &id)?;
    let anime_id = session.view().anime_id;
    let view = load_view(&ctx, &anime_id, req.episode).await?;

    let pending = session.navigate(view);
    let snapshot = session.snapshot();
    spawn_resolution(session, pending);

    Ok((StatusCode::ACCEPTED, Json(snapshot)))
}

/// DELETE /api/sessions/{id}
async fn end_session(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if ctx.sessions.end_session(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::not_found("session", id).into())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn find_session(ctx: &AppContext, id: &str) -> Result<Arc<PlaybackSession>, AppError> {
    ctx.sessions
        .get(id)
        .ok_or_else(|| Error::not_found("session", id).into())
}

async fn load_view(
    ctx: &AppContext,
    anime_id: &str,
    episode: EpisodeRef,
) -> Result<EpisodeView, AppError> {
    let source = ctx
        .metadata
        .as_ref()
        .ok_or_else(|| Error::Internal("metadata API is not configured".into()))?;

    let view = EpisodeView::load(
        source.as_ref(),
        anime_id,
        episode,
        &ctx.config.session.excluded_content_types,
    )
    .await?;
    Ok(view)
}

fn spawn_resolution(session: Arc<PlaybackSession>, pending: PendingResolution) {
    tokio::spawn(async move {
        session.run(pending).await;
    });
}
