//! Playback sessions: one per mounted episode view.
//!
//! A [`PlaybackSession`] sequences resolution for its episode across the
//! initial load, manual server switches and episode navigation. The
//! [`SessionRegistry`] owns the live sessions and evicts idle ones.

mod controller;
mod registry;
mod view;

pub use controller::{
    Completion, Phase, PendingResolution, PlaybackSession, ServerChoice, SessionDeps,
    SessionSnapshot, SessionState, StreamSession,
};
pub use registry::{start_cleanup_task, SessionRegistry};
pub use view::EpisodeView;
