//! Same-origin streaming relay.
//!
//! Some providers reject cross-site media requests. The relay re-issues the
//! request with a desktop-browser identity whose `Referer`/`Origin` point at
//! the provider itself, and streams the body back without buffering.
//!
//! # Routes
//!
//! - `GET /stream?url={target}` - Relay the target URL

mod relay;

pub use relay::{stream, StreamParams, StreamingRelay};

use axum::{routing::get, Router};

use crate::server::AppContext;

/// Path the relay is mounted at, as seen by the rendering surface.
pub const RELAY_ENDPOINT: &str = "/api/stream";

/// Create the streaming relay router.
pub fn relay_router() -> Router<AppContext> {
    Router::new().route("/stream", get(stream))
}
