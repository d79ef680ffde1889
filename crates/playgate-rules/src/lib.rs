//! # playgate-rules
//!
//! Deterministic provider classification for third-party video links.
//!
//! A resolved URL (plus the provider label it was offered under) is mapped
//! to a [`PlaybackDirective`](playgate_core::PlaybackDirective) by walking an
//! ordered list of rules. The first enabled rule whose matcher accepts the
//! input wins; order is part of the contract.
//!
//! ## Overview
//!
//! - [`Matcher`] -- predicate over the host and path of a link.
//! - [`Transform`] -- builds the directive once a rule matched.
//! - [`ProviderRule`] -- binds a matcher to a transform, with an enable flag.
//! - [`ProviderClassifier`] -- evaluates links against the ordered rules.
//!
//! ```
//! use playgate_rules::classify;
//! use playgate_core::{PlaybackMode, ReferrerPolicy};
//!
//! let d = classify("https://mega.example/file/ABC123#KEY", "");
//! assert_eq!(d.mode(), PlaybackMode::Frame);
//! assert_eq!(d.url(), "https://mega.example/embed/ABC123#KEY");
//! assert_eq!(d.referrer_policy(), ReferrerPolicy::NoReferrer);
//! ```

pub mod classifier;
pub mod matcher;
pub mod rule;
pub mod transform;

pub use classifier::{classify, ProviderClassifier};
pub use matcher::{MatchInput, Matcher};
pub use rule::{builtin_rules, ProviderRule};
pub use transform::Transform;
