use crate::config::Config;
use crate::metadata::{EpisodeSource, MetadataClient};
use crate::progress::{self, ProgressStore};
use crate::resolver::{RedirectResolver, Resolve};
use crate::session::{start_cleanup_task, SessionDeps, SessionRegistry};
use crate::streaming::{self, StreamingRelay};
use anyhow::{Context, Result};
use axum::{
    http::{header, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use playgate_rules::ProviderClassifier;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

pub mod error;
pub mod routes_history;
pub mod routes_resolve;
pub mod routes_sessions;

pub use error::AppError;

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub classifier: Arc<ProviderClassifier>,
    /// Resolver used by sessions and the one-shot resolve endpoint
    pub resolver: Arc<dyn Resolve>,
    pub relay: Arc<StreamingRelay>,
    pub progress: Arc<dyn ProgressStore>,
    /// Metadata API client (absent when no base URL is configured)
    pub metadata: Option<Arc<dyn EpisodeSource>>,
    pub sessions: SessionRegistry,
}

impl AppContext {
    /// Build the context from configuration with the default collaborators.
    pub fn new(config: Config) -> Result<Self> {
        let metadata = MetadataClient::from_config(&config.metadata)
            .context("Invalid metadata configuration")?
            .map(|client| Arc::new(client) as Arc<dyn EpisodeSource>);
        let progress = progress::create_store(&config.progress);
        let resolver: Arc<dyn Resolve> = Arc::new(RedirectResolver::new(&config.resolver));

        Ok(Self::with_collaborators(config, resolver, progress, metadata))
    }

    /// Build the context around explicitly provided collaborators.
    pub fn with_collaborators(
        config: Config,
        resolver: Arc<dyn Resolve>,
        progress: Arc<dyn ProgressStore>,
        metadata: Option<Arc<dyn EpisodeSource>>,
    ) -> Self {
        let classifier = Arc::new(
            ProviderClassifier::builtin()
                .with_direct_media_relay(config.classifier.relay_direct_media),
        );

        let deps = SessionDeps {
            resolver: resolver.clone(),
            classifier: classifier.clone(),
            progress: progress.clone(),
            allowed_providers: config.session.allowed_providers.clone().into(),
        };
        let sessions =
            SessionRegistry::new(deps, Duration::from_secs(config.session.expiry_secs));

        Self {
            relay: Arc::new(StreamingRelay::new(&config.relay)),
            config: Arc::new(config),
            classifier,
            resolver,
            progress,
            metadata,
            sessions,
        }
    }
}

/// Create the Axum router with all routes
pub fn build_router(ctx: AppContext, static_dir: Option<PathBuf>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    let mut app = Router::new()
        // Health check
        .route("/health", get(health_check))
        .nest("/api", api_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx);

    // Serve static files if directory is provided
    // Uses SPA fallback: serves index.html for any route that doesn't match a file
    if let Some(dir) = static_dir {
        if dir.exists() {
            tracing::info!("Serving static files from {:?}", dir);
            let index_path = dir.join("index.html");
            app = app.fallback_service(
                ServeDir::new(&dir)
                    .append_index_html_on_directories(true)
                    .not_found_service(ServeFile::new(index_path)),
            );
        } else {
            tracing::warn!("Static directory {:?} does not exist, not serving files", dir);
        }
    }

    app
}

fn api_routes() -> Router<AppContext> {
    streaming::relay_router()
        .merge(routes_resolve::resolve_routes())
        .merge(routes_sessions::session_routes())
        .merge(routes_history::history_routes())
}

async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

/// Start the HTTP server
pub async fn start_server(config: Config) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let static_dir = config.server.static_dir.clone();
    let cleanup_interval = config.session.cleanup_interval_secs;
    let ctx = AppContext::new(config)?;

    if ctx.metadata.is_none() {
        tracing::warn!("metadata.base_url is not set; session endpoints will be unavailable");
    }

    let cleanup_handle = start_cleanup_task(ctx.sessions.clone(), cleanup_interval);
    let app = build_router(ctx, static_dir);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cleanup_handle.abort();
    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
