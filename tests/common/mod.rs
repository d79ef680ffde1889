//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which builds an [`AppContext`] around an
//! in-memory progress store and an optional metadata API. The
//! [`TestHarness::serve`] constructor starts Axum on a random port for
//! HTTP-level testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use playgate::config::Config;
use playgate::metadata::{EpisodeSource, MetadataClient};
use playgate::progress::{MemoryProgressStore, ProgressStore};
use playgate::resolver::{RedirectResolver, Resolve};
use playgate::server::{build_router, AppContext};
use playgate::session::SessionSnapshot;

/// Test harness wrapping a fully-constructed [`AppContext`].
pub struct TestHarness {
    pub ctx: AppContext,
    pub progress: Arc<MemoryProgressStore>,
}

impl TestHarness {
    /// Harness with default configuration and no metadata API.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Harness whose metadata API lives at `base_url`.
    pub fn with_metadata(base_url: &str) -> Self {
        Self::with_config(metadata_config(base_url))
    }

    /// Harness built from `config`, using the real redirect resolver.
    pub fn with_config(config: Config) -> Self {
        let resolver: Arc<dyn Resolve> = Arc::new(RedirectResolver::new(&config.resolver));
        Self::with_resolver(config, resolver)
    }

    /// Harness with an injected resolver.
    pub fn with_resolver(config: Config, resolver: Arc<dyn Resolve>) -> Self {
        let progress = Arc::new(MemoryProgressStore::new(config.progress.history_limit));
        let metadata = MetadataClient::from_config(&config.metadata)
            .expect("invalid metadata config")
            .map(|c| Arc::new(c) as Arc<dyn EpisodeSource>);

        let ctx = AppContext::with_collaborators(
            config,
            resolver,
            progress.clone() as Arc<dyn ProgressStore>,
            metadata,
        );

        Self { ctx, progress }
    }

    pub fn router(&self) -> Router {
        build_router(self.ctx.clone(), None)
    }

    /// Start an Axum server on a random port and return the bound address.
    pub async fn serve(self) -> (Self, SocketAddr) {
        let addr = spawn_app(self.router()).await;
        (self, addr)
    }

    /// Default harness served on a random port.
    pub async fn with_server() -> (Self, SocketAddr) {
        Self::new().serve().await
    }
}

/// Default configuration pointing at a metadata API.
pub fn metadata_config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.metadata.base_url = Some(base_url.to_string());
    config
}

/// Serve `app` on a random local port.
pub async fn spawn_app(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind random port");
    let addr = listener.local_addr().expect("failed to get local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    addr
}

/// Poll a session until it leaves the resolving phase.
pub async fn wait_until_ready(addr: SocketAddr, session_id: &str) -> SessionSnapshot {
    let client = reqwest::Client::new();
    let url = format!("http://{addr}/api/sessions/{session_id}");

    for _ in 0..100 {
        let snapshot: SessionSnapshot = client
            .get(&url)
            .send()
            .await
            .expect("request failed")
            .json()
            .await
            .expect("invalid snapshot");
        if !snapshot.stream.resolving {
            return snapshot;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    panic!("session {session_id} never left the resolving phase");
}
