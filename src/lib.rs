//! Playgate - playback source resolution and streaming relay
//!
//! This library crate exposes the core functionality for integration testing.

pub mod config;
pub mod metadata;
pub mod progress;
pub mod resolver;
pub mod server;
pub mod session;
pub mod streaming;
