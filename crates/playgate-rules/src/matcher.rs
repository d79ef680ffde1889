//! Rule predicates over a link's host and path.

use url::Url;

/// Link under classification, pre-split for matching.
///
/// Host and path are lowercased so every marker comparison is
/// case-insensitive. When the raw string is not an absolute URL, `host` is
/// empty and `path` holds the whole lowercased input, so only substring
/// markers can still match.
#[derive(Debug, Clone)]
pub struct MatchInput<'a> {
    /// The link exactly as given.
    pub raw: &'a str,
    /// Provider label the link was offered under (empty for the default source).
    pub provider: &'a str,
    /// Parsed form of `raw`, if it is an absolute URL.
    pub url: Option<Url>,
    pub host: String,
    pub path: String,
}

impl<'a> MatchInput<'a> {
    pub fn new(raw: &'a str, provider: &'a str) -> Self {
        match Url::parse(raw) {
            Ok(url) => Self {
                raw,
                provider,
                host: url.host_str().unwrap_or_default().to_lowercase(),
                path: url.path().to_lowercase(),
                url: Some(url),
            },
            Err(_) => Self {
                raw,
                provider,
                url: None,
                host: String::new(),
                path: raw.to_lowercase(),
            },
        }
    }
}

/// Predicate deciding whether a rule applies to a link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matcher {
    /// A dot-separated label of the host equals one of the markers.
    HostLabel(Vec<String>),
    /// The host or the path contains one of the markers as a substring.
    HostOrPathContains(Vec<String>),
    /// The path ends with one of the file extensions (without the dot).
    PathExtension(Vec<String>),
    /// Matches everything.
    Any,
}

impl Matcher {
    pub fn host_label(markers: &[&str]) -> Self {
        Self::HostLabel(lowercase_all(markers))
    }

    pub fn host_or_path_contains(markers: &[&str]) -> Self {
        Self::HostOrPathContains(lowercase_all(markers))
    }

    pub fn path_extension(extensions: &[&str]) -> Self {
        Self::PathExtension(lowercase_all(extensions))
    }

    /// Evaluate the matcher against a link.
    pub fn matches(&self, input: &MatchInput<'_>) -> bool {
        match self {
            Self::HostLabel(markers) => input
                .host
                .split('.')
                .any(|label| markers.iter().any(|m| m == label)),
            Self::HostOrPathContains(markers) => markers
                .iter()
                .any(|m| input.host.contains(m.as_str()) || input.path.contains(m.as_str())),
            Self::PathExtension(extensions) => extensions.iter().any(|ext| {
                input
                    .path
                    .rsplit_once('.')
                    .is_some_and(|(_, suffix)| suffix == ext)
            }),
            Self::Any => true,
        }
    }
}

fn lowercase_all(markers: &[&str]) -> Vec<String> {
    markers.iter().map(|m| m.to_lowercase()).collect()
}
