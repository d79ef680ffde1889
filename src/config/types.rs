use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Desktop browser identity presented to third-party hosts.
pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub resolver: ResolverConfig,

    #[serde(default)]
    pub relay: RelayConfig,

    #[serde(default)]
    pub classifier: ClassifierConfig,

    #[serde(default)]
    pub metadata: MetadataConfig,

    #[serde(default)]
    pub progress: ProgressConfig,

    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResolverConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-hop request timeout
    #[serde(default = "default_resolver_timeout")]
    pub timeout_secs: u64,
}

fn default_user_agent() -> String {
    DESKTOP_USER_AGENT.to_string()
}
fn default_resolver_timeout() -> u64 {
    10
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_resolver_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RelayConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Content type sent when the upstream omits one
    #[serde(default = "default_content_type")]
    pub default_content_type: String,
}

fn default_connect_timeout() -> u64 {
    10
}
fn default_content_type() -> String {
    "video/mp4".to_string()
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            connect_timeout_secs: default_connect_timeout(),
            default_content_type: default_content_type(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ClassifierConfig {
    /// Route raw media files (.mp4, .mkv, ...) through the streaming relay
    #[serde(default)]
    pub relay_direct_media: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetadataConfig {
    /// Base URL of the anime metadata API (e.g. https://api.example/otakudesu)
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default = "default_metadata_timeout")]
    pub timeout_secs: u64,
}

fn default_metadata_timeout() -> u64 {
    15
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: default_metadata_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProgressConfig {
    /// JSON file for watch history; kept in memory when unset
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

fn default_history_limit() -> usize {
    20
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            path: None,
            history_limit: default_history_limit(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Idle time after which a playback session is evicted
    #[serde(default = "default_expiry")]
    pub expiry_secs: u64,

    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_secs: u64,

    /// Provider label substrings offered as alternate servers
    #[serde(default = "default_allowed_providers")]
    pub allowed_providers: Vec<String>,

    /// Upstream content types that may not be mounted for playback
    #[serde(default = "default_excluded_content_types")]
    pub excluded_content_types: Vec<String>,
}

fn default_expiry() -> u64 {
    3600
}
fn default_cleanup_interval() -> u64 {
    60
}
fn default_allowed_providers() -> Vec<String> {
    ["acefile", "mega", "kfiles", "kraken"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_excluded_content_types() -> Vec<String> {
    vec!["Movie".to_string()]
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            expiry_secs: default_expiry(),
            cleanup_interval_secs: default_cleanup_interval(),
            allowed_providers: default_allowed_providers(),
            excluded_content_types: default_excluded_content_types(),
        }
    }
}

impl Config {
    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.server.port == 0 {
            warnings.push("server.port is 0; a random port will be assigned".into());
        }

        if self.session.allowed_providers.is_empty() {
            warnings.push(
                "session.allowed_providers is empty; no alternate servers will be offered".into(),
            );
        }

        match &self.metadata.base_url {
            Some(base) if url::Url::parse(base).is_err() => {
                warnings.push(format!("metadata.base_url '{}' is not a valid URL", base));
            }
            None => {
                warnings.push("metadata.base_url is not set; sessions cannot be created".into());
            }
            _ => {}
        }

        if self.progress.history_limit == 0 {
            warnings.push("progress.history_limit is 0; history will always be empty".into());
        }

        warnings
    }
}
