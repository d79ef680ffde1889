//! Playback directives handed to the rendering surface.
//!
//! A [`PlaybackDirective`] tells the rendering surface whether to embed the
//! source in a frame or play it through a native video element, and which
//! security attributes (sandbox, referrer policy) to apply. Directives are
//! immutable values; every resolution produces a fresh one.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sandbox allowlist applied to embeds from aggressive-ad providers.
///
/// Scripts, same-origin storage, forms, popups and presentation are allowed.
/// Top-level navigation is not, so the embed cannot redirect the page
/// without a user gesture.
pub const RESTRICTIVE_SANDBOX: &str = "allow-scripts allow-same-origin allow-forms allow-popups allow-popups-to-escape-sandbox allow-presentation";

/// How the rendering surface should present a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackMode {
    /// Embed the URL in a frame.
    Frame,
    /// Play through a video element, fetching bytes via the streaming relay.
    RelayedVideo,
    /// Play through a video element, fetching bytes directly.
    DirectVideo,
}

impl PlaybackMode {
    /// Whether this mode renders with a native video element.
    pub fn uses_video_element(self) -> bool {
        !matches!(self, Self::Frame)
    }

    /// Whether bytes must be fetched through the streaming relay.
    pub fn requires_relay(self) -> bool {
        matches!(self, Self::RelayedVideo)
    }
}

impl fmt::Display for PlaybackMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Frame => write!(f, "frame"),
            Self::RelayedVideo => write!(f, "relayed_video"),
            Self::DirectVideo => write!(f, "direct_video"),
        }
    }
}

/// Referrer information disclosed to the embedded resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ReferrerPolicy {
    /// Send no referrer at all.
    #[serde(rename = "no-referrer")]
    NoReferrer,
    /// Send only the origin of the embedding page.
    #[default]
    #[serde(rename = "origin")]
    Origin,
}

impl ReferrerPolicy {
    /// The attribute value understood by browsers.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoReferrer => "no-referrer",
            Self::Origin => "origin",
        }
    }
}

impl fmt::Display for ReferrerPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved instruction describing how to render a playback source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackDirective {
    mode: PlaybackMode,
    url: String,
    #[serde(default)]
    sandbox_policy: Option<String>,
    #[serde(default)]
    referrer_policy: ReferrerPolicy,
}

impl PlaybackDirective {
    /// Frame directive with the default `origin` referrer policy and no sandbox.
    pub fn frame(url: impl Into<String>) -> Self {
        Self {
            mode: PlaybackMode::Frame,
            url: url.into(),
            sandbox_policy: None,
            referrer_policy: ReferrerPolicy::Origin,
        }
    }

    /// Video-element directive whose bytes go through the streaming relay.
    pub fn relayed_video(url: impl Into<String>) -> Self {
        Self {
            mode: PlaybackMode::RelayedVideo,
            ..Self::frame(url)
        }
    }

    /// Directive used when resolution fails: the untouched raw URL in a frame.
    pub fn fallback(raw_url: impl Into<String>) -> Self {
        Self::frame(raw_url)
    }

    /// Return a copy with the given referrer policy.
    pub fn with_referrer_policy(self, referrer_policy: ReferrerPolicy) -> Self {
        Self {
            referrer_policy,
            ..self
        }
    }

    /// Return a copy with the given sandbox allowlist.
    pub fn with_sandbox(self, sandbox: impl Into<String>) -> Self {
        Self {
            sandbox_policy: Some(sandbox.into()),
            ..self
        }
    }

    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn sandbox_policy(&self) -> Option<&str> {
        self.sandbox_policy.as_deref()
    }

    pub fn referrer_policy(&self) -> ReferrerPolicy {
        self.referrer_policy
    }

    /// Relay request path for this directive, if its mode requires the relay.
    ///
    /// `relay_endpoint` is the path of the relay route, e.g. `/api/stream`.
    pub fn relay_path(&self, relay_endpoint: &str) -> Option<String> {
        if !self.mode.requires_relay() {
            return None;
        }
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("url", &self.url)
            .finish();
        Some(format!("{relay_endpoint}?{query}"))
    }
}
