//! playgate-core: shared types for playback source resolution.
//!
//! This crate is the foundational dependency for the other playgate crates:
//!
//! - **Directives**: [`PlaybackDirective`] and its rendering attributes
//! - **Episodes**: records returned by the metadata API and the
//!   switchable [`CandidateServer`] list derived from them
//! - **Error Handling**: the unified [`Error`] type and [`Result`] alias
//! - **URL helpers**: origin derivation shared by the resolver and relay
//!
//! # Examples
//!
//! ```
//! use playgate_core::{PlaybackDirective, PlaybackMode, ReferrerPolicy};
//!
//! let directive = PlaybackDirective::frame("https://host.example/v/1");
//! assert_eq!(directive.mode(), PlaybackMode::Frame);
//! assert_eq!(directive.referrer_policy(), ReferrerPolicy::Origin);
//! assert!(directive.sandbox_policy().is_none());
//! ```

pub mod directive;
pub mod episode;
pub mod error;
pub mod urls;

pub use directive::*;
pub use episode::*;
pub use error::{Error, Result};
