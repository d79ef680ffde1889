//! The [`ProviderClassifier`] evaluates links against ordered rules.

use std::sync::OnceLock;

use playgate_core::PlaybackDirective;

use crate::matcher::MatchInput;
use crate::rule::{builtin_rules, ProviderRule, DIRECT_MEDIA_RULE};

/// Ordered, first-match-wins classifier.
///
/// Classification is pure: no I/O, no interior state, and identical inputs
/// always produce identical directives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderClassifier {
    /// Rules in evaluation order.
    rules: Vec<ProviderRule>,
}

impl ProviderClassifier {
    /// Create a classifier over `rules`, evaluated in the given order.
    pub fn new(rules: Vec<ProviderRule>) -> Self {
        Self { rules }
    }

    /// Classifier with the built-in provider rules.
    pub fn builtin() -> Self {
        Self::new(builtin_rules())
    }

    /// Enable or disable routing raw media files through the relay.
    pub fn with_direct_media_relay(mut self, enabled: bool) -> Self {
        for rule in self.rules.iter_mut().filter(|r| r.name == DIRECT_MEDIA_RULE) {
            rule.enabled = enabled;
        }
        self
    }

    /// Return the first enabled rule accepting the link.
    pub fn matching_rule(&self, url: &str, provider: &str) -> Option<&ProviderRule> {
        let input = MatchInput::new(url, provider);
        self.rules.iter().find(|rule| rule.applies_to(&input))
    }

    /// Map a link to its playback directive.
    ///
    /// When no rule matches (only possible with a custom rule list lacking a
    /// catch-all) the link is framed unchanged.
    pub fn classify(&self, url: &str, provider: &str) -> PlaybackDirective {
        let input = MatchInput::new(url, provider);
        match self.rules.iter().find(|rule| rule.applies_to(&input)) {
            Some(rule) => {
                tracing::trace!(rule = rule.name, provider, "Classified playback source");
                rule.transform.apply(&input)
            }
            None => PlaybackDirective::frame(url),
        }
    }

    /// Return a reference to the internal rules slice.
    pub fn rules(&self) -> &[ProviderRule] {
        &self.rules
    }
}

impl Default for ProviderClassifier {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Classify with the built-in rules.
pub fn classify(url: &str, provider: &str) -> PlaybackDirective {
    static BUILTIN: OnceLock<ProviderClassifier> = OnceLock::new();
    BUILTIN
        .get_or_init(ProviderClassifier::builtin)
        .classify(url, provider)
}
