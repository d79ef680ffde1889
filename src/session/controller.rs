//! Resolution state machine for a single episode view.
//!
//! States are `Idle -> Resolving -> Ready`, re-entering `Resolving` on
//! every new trigger. Each trigger takes a new generation number; when a
//! resolution completes after a newer trigger was issued, its result is
//! dropped instead of overwriting the newer selection.

use parking_lot::RwLock;
use playgate_core::urls::parse_http_url;
use playgate_core::{
    CandidateServer, EpisodeRef, Error, PlaybackDirective, Result, DEFAULT_SERVER_LABEL,
};
use playgate_rules::ProviderClassifier;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;

use super::view::EpisodeView;
use crate::progress::{ProgressStore, WatchRecord};
use crate::resolver::Resolve;
use crate::streaming::RELAY_ENDPOINT;

// ---------------------------------------------------------------------------
// State types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Resolving,
    Ready,
}

/// What the rendering surface shows for the current episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamSession {
    /// Directive from the last applied resolution, if any.
    pub current_directive: Option<PlaybackDirective>,
    /// While true the media surface is replaced by a resolving indicator.
    pub resolving: bool,
    /// The current directive is the raw-URL fallback.
    pub fallback: bool,
    pub selected_server_label: String,
    pub candidate_servers: Vec<CandidateServer>,
}

impl StreamSession {
    fn new(candidate_servers: Vec<CandidateServer>) -> Self {
        Self {
            current_directive: None,
            resolving: false,
            fallback: false,
            selected_server_label: DEFAULT_SERVER_LABEL.to_string(),
            candidate_servers,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub phase: Phase,
    pub stream: StreamSession,
    /// Number of the latest trigger; bumped on every trigger.
    pub generation: u64,
}

/// A server the user asked to play from.
///
/// Serialized as the string `"default"` for the episode's primary stream,
/// or as a `{provider, resolution, url}` object for an alternate server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ChoiceRepr", into = "ChoiceRepr")]
pub enum ServerChoice {
    Default,
    Server(CandidateServer),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ChoiceRepr {
    Keyword(String),
    Server(CandidateServer),
}

impl TryFrom<ChoiceRepr> for ServerChoice {
    type Error = String;

    fn try_from(repr: ChoiceRepr) -> std::result::Result<Self, Self::Error> {
        match repr {
            ChoiceRepr::Keyword(k) if k.eq_ignore_ascii_case("default") => Ok(Self::Default),
            ChoiceRepr::Keyword(k) => Err(format!("unknown server choice '{k}'")),
            ChoiceRepr::Server(server) => Ok(Self::Server(server)),
        }
    }
}

impl From<ServerChoice> for ChoiceRepr {
    fn from(choice: ServerChoice) -> Self {
        match choice {
            ServerChoice::Default => Self::Keyword("default".to_string()),
            ServerChoice::Server(server) => Self::Server(server),
        }
    }
}

/// Serializable view of a session for API clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub id: String,
    pub anime_id: String,
    pub title: String,
    pub episode: EpisodeRef,
    pub episode_label: String,
    pub phase: Phase,
    pub generation: u64,
    pub stream: StreamSession,
    /// Relay path to load when the directive needs the streaming relay.
    pub relay_path: Option<String>,
    pub has_next_episode: bool,
    pub next_episode: Option<String>,
    pub has_previous_episode: bool,
    pub previous_episode: Option<String>,
}

/// A trigger that has entered `Resolving` and still has to be run.
#[derive(Debug, Clone)]
#[must_use = "a pending resolution does nothing until it is run"]
pub struct PendingResolution {
    generation: u64,
    raw_url: String,
    provider: String,
    label: String,
    record: WatchRecord,
}

impl PendingResolution {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn raw_url(&self) -> &str {
        &self.raw_url
    }
}

/// Result of running a [`PendingResolution`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The session moved to `Ready` with the new directive.
    Applied,
    /// A newer trigger was issued meanwhile; the result was dropped.
    Discarded,
}

impl Completion {
    pub fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Collaborators shared by every session.
#[derive(Clone)]
pub struct SessionDeps {
    pub resolver: Arc<dyn Resolve>,
    pub classifier: Arc<ProviderClassifier>,
    pub progress: Arc<dyn ProgressStore>,
    /// Provider label substrings offered as alternate servers.
    pub allowed_providers: Arc<[String]>,
}

struct Inner {
    view: EpisodeView,
    state: SessionState,
}

pub struct PlaybackSession {
    id: String,
    deps: SessionDeps,
    inner: RwLock<Inner>,
    state_tx: watch::Sender<SessionState>,
}

impl PlaybackSession {
    /// Create an idle session for a freshly mounted view.
    pub fn new(id: impl Into<String>, view: EpisodeView, deps: SessionDeps) -> Self {
        let state = SessionState {
            phase: Phase::Idle,
            stream: StreamSession::new(view.detail.candidate_servers(&deps.allowed_providers)),
            generation: 0,
        };
        let (state_tx, _) = watch::channel(state.clone());

        Self {
            id: id.into(),
            deps,
            inner: RwLock::new(Inner { view, state }),
            state_tx,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> SessionState {
        self.inner.read().state.clone()
    }

    pub fn view(&self) -> EpisodeView {
        self.inner.read().view.clone()
    }

    /// Observe state transitions.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let inner = self.inner.read();
        let Inner { view, state } = &*inner;
        let detail = &view.detail;

        SessionSnapshot {
            id: self.id.clone(),
            anime_id: view.anime_id.clone(),
            title: view.anime.title.clone(),
            episode: view.episode.clone(),
            episode_label: detail.episode.clone(),
            phase: state.phase,
            generation: state.generation,
            relay_path: state
                .stream
                .current_directive
                .as_ref()
                .and_then(|d| d.relay_path(RELAY_ENDPOINT)),
            stream: state.stream.clone(),
            has_next_episode: detail.has_next_episode,
            next_episode: detail.next_episode.as_ref().map(|l| l.slug.clone()),
            has_previous_episode: detail.has_previous_episode,
            previous_episode: detail.previous_episode.as_ref().map(|l| l.slug.clone()),
        }
    }

    /// Trigger resolution of the episode's primary stream.
    pub fn load(&self) -> PendingResolution {
        let mut inner = self.inner.write();
        let raw_url = inner.view.detail.stream_url.clone();
        self.begin(&mut inner, raw_url, String::new(), DEFAULT_SERVER_LABEL.to_string())
    }

    /// Trigger resolution of a manually selected server.
    ///
    /// Only the primary stream and the session's candidate servers can be
    /// selected.
    pub fn switch_server(&self, choice: &ServerChoice) -> Result<PendingResolution> {
        let mut inner = self.inner.write();
        match choice {
            ServerChoice::Default => {
                let raw_url = inner.view.detail.stream_url.clone();
                Ok(self.begin(&mut inner, raw_url, String::new(), DEFAULT_SERVER_LABEL.to_string()))
            }
            ServerChoice::Server(server) => {
                if !inner.state.stream.candidate_servers.contains(server) {
                    return Err(Error::Validation(format!(
                        "'{}' is not an available server",
                        server.label()
                    )));
                }
                Ok(self.begin(
                    &mut inner,
                    server.url.clone(),
                    server.provider.clone(),
                    server.label(),
                ))
            }
        }
    }

    /// Replace the session with a new episode and trigger its primary stream.
    ///
    /// Nothing carries over from the previous episode; resolutions still
    /// in flight for it are discarded when they complete.
    pub fn navigate(&self, view: EpisodeView) -> PendingResolution {
        let mut inner = self.inner.write();
        tracing::info!(
            session_id = %self.id,
            anime_id = %view.anime_id,
            episode = %view.episode,
            "Navigating session to new episode"
        );

        let generation = inner.state.generation;
        inner.state = SessionState {
            phase: Phase::Idle,
            stream: StreamSession::new(view.detail.candidate_servers(&self.deps.allowed_providers)),
            generation,
        };
        let raw_url = view.detail.stream_url.clone();
        inner.view = view;

        self.begin(&mut inner, raw_url, String::new(), DEFAULT_SERVER_LABEL.to_string())
    }

    fn begin(
        &self,
        inner: &mut Inner,
        raw_url: String,
        provider: String,
        label: String,
    ) -> PendingResolution {
        inner.state.generation += 1;
        inner.state.phase = Phase::Resolving;
        inner.state.stream.resolving = true;
        self.state_tx.send_replace(inner.state.clone());

        tracing::debug!(
            session_id = %self.id,
            generation = inner.state.generation,
            url = %raw_url,
            provider = %provider,
            "Resolving playback source"
        );

        PendingResolution {
            generation: inner.state.generation,
            raw_url,
            provider,
            label,
            record: inner.view.watch_record(),
        }
    }

    /// Resolve and classify a pending trigger, then apply it if still current.
    ///
    /// Resolution errors fall back to framing the raw URL, so an applied
    /// completion always leaves the session `Ready`.
    pub async fn run(&self, pending: PendingResolution) -> Completion {
        let (directive, fallback) = match self.deps.resolver.resolve(&pending.raw_url).await {
            Ok(resolved) if parse_http_url(&resolved).is_none() => {
                tracing::warn!(
                    session_id = %self.id,
                    url = %pending.raw_url,
                    resolved = %resolved,
                    "Resolved URL is not absolute http(s), falling back to raw URL"
                );
                (PlaybackDirective::fallback(pending.raw_url.as_str()), true)
            }
            Ok(resolved) => (
                self.deps.classifier.classify(&resolved, &pending.provider),
                false,
            ),
            Err(e) => {
                tracing::warn!(
                    session_id = %self.id,
                    url = %pending.raw_url,
                    error = %e,
                    "Failed to resolve stream URL, falling back to raw URL"
                );
                (PlaybackDirective::fallback(pending.raw_url.as_str()), true)
            }
        };

        {
            let mut inner = self.inner.write();
            if inner.state.generation != pending.generation {
                tracing::debug!(
                    session_id = %self.id,
                    generation = pending.generation,
                    latest = inner.state.generation,
                    "Discarding stale resolution"
                );
                return Completion::Discarded;
            }

            let stream = &mut inner.state.stream;
            stream.current_directive = Some(directive);
            stream.resolving = false;
            stream.fallback = fallback;
            stream.selected_server_label = pending.label;
            inner.state.phase = Phase::Ready;
            self.state_tx.send_replace(inner.state.clone());
        }

        self.notify_progress(pending.record);
        Completion::Applied
    }

    /// Trigger and run the primary stream resolution in one step.
    pub async fn load_and_run(&self) -> Completion {
        let pending = self.load();
        self.run(pending).await
    }

    fn notify_progress(&self, record: WatchRecord) {
        let progress = Arc::clone(&self.deps.progress);
        let session_id = self.id.clone();
        tokio::spawn(async move {
            if let Err(e) = progress.record(record).await {
                tracing::warn!(session_id = %session_id, error = %e, "Failed to record watch progress");
            }
        });
    }
}
