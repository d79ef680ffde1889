//! The [`ProviderRule`] struct and the built-in ordered rule list.

use crate::matcher::{MatchInput, Matcher};
use crate::transform::Transform;

/// Name of the direct-media relay rule, which ships disabled.
pub const DIRECT_MEDIA_RULE: &str = "direct_media_relay";

/// A classification rule: when `matcher` accepts a link, `transform` builds
/// the directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderRule {
    /// Stable identifier, used in logs.
    pub name: &'static str,
    /// Disabled rules stay in place but are never evaluated.
    pub enabled: bool,
    pub matcher: Matcher,
    pub transform: Transform,
}

impl ProviderRule {
    pub fn new(name: &'static str, matcher: Matcher, transform: Transform) -> Self {
        Self {
            name,
            enabled: true,
            matcher,
            transform,
        }
    }

    pub fn disabled(self) -> Self {
        Self {
            enabled: false,
            ..self
        }
    }

    /// Whether this rule is enabled and accepts the link.
    pub fn applies_to(&self, input: &MatchInput<'_>) -> bool {
        self.enabled && self.matcher.matches(input)
    }
}

/// The built-in provider rules, in evaluation order.
///
/// The broad `embed`/`wish` substring rule sits late so it only catches
/// links no specific provider claimed; moving it changes which providers
/// get sandboxed.
pub fn builtin_rules() -> Vec<ProviderRule> {
    vec![
        ProviderRule::new("mega", Matcher::host_label(&["mega"]), Transform::MegaEmbed),
        ProviderRule::new(
            DIRECT_MEDIA_RULE,
            Matcher::path_extension(&["mp4", "mkv", "webm", "ogg"]),
            Transform::RelayMedia,
        )
        .disabled(),
        ProviderRule::new("gofile", Matcher::host_label(&["gofile"]), Transform::Passthrough),
        ProviderRule::new(
            "krakenfiles",
            Matcher::host_label(&["krakenfiles"]),
            Transform::KrakenEmbed,
        ),
        ProviderRule::new(
            "restrictive_embed",
            Matcher::host_or_path_contains(&["odvidhide", "vidhide", "embed", "wish"]),
            Transform::Sandboxed,
        ),
        ProviderRule::new("default", Matcher::Any, Transform::Passthrough),
    ]
}
