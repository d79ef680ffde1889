//! Directive builders applied once a rule matched.

use std::sync::OnceLock;

use playgate_core::urls::origin;
use playgate_core::{PlaybackDirective, ReferrerPolicy, RESTRICTIVE_SANDBOX};
use regex::Regex;

use crate::matcher::MatchInput;

/// How a matched link is turned into a [`PlaybackDirective`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Frame the link unchanged with the default `origin` referrer policy.
    Passthrough,
    /// Rewrite `/file/` to `/embed/` (fragment key preserved), no sandbox,
    /// no referrer. The embed needs unrestricted storage and blob access.
    MegaEmbed,
    /// Rewrite `view/{id}` links to `embed-video/{id}`; pass others through.
    KrakenEmbed,
    /// Frame with no referrer inside the restrictive sandbox allowlist.
    Sandboxed,
    /// Play through a video element fed by the streaming relay.
    RelayMedia,
}

impl Transform {
    pub fn apply(&self, input: &MatchInput<'_>) -> PlaybackDirective {
        match self {
            Self::Passthrough => PlaybackDirective::frame(input.raw),
            Self::MegaEmbed => PlaybackDirective::frame(input.raw.replacen("/file/", "/embed/", 1))
                .with_referrer_policy(ReferrerPolicy::NoReferrer),
            Self::KrakenEmbed => match kraken_embed_url(input) {
                Some(embed) => PlaybackDirective::frame(embed),
                None => PlaybackDirective::frame(input.raw),
            },
            Self::Sandboxed => PlaybackDirective::frame(input.raw)
                .with_referrer_policy(ReferrerPolicy::NoReferrer)
                .with_sandbox(RESTRICTIVE_SANDBOX),
            Self::RelayMedia => PlaybackDirective::relayed_video(input.raw),
        }
    }
}

fn kraken_view_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)/view/([a-z0-9]+)").expect("static pattern is valid"))
}

fn kraken_embed_url(input: &MatchInput<'_>) -> Option<String> {
    let url = input.url.as_ref()?;
    let id = kraken_view_pattern()
        .captures(url.path())?
        .get(1)?
        .as_str();
    Some(format!("{}/embed-video/{id}", origin(url)?))
}
