mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./playgate.toml",
        "./config.toml",
        "~/.config/playgate/config.toml",
        "/etc/playgate/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    // Return default config if no file found
    Ok(Config::default())
}

/// Reject configurations the server cannot run with
fn validate_config(config: &Config) -> Result<()> {
    if config.session.expiry_secs == 0 {
        anyhow::bail!("session.expiry_secs cannot be 0");
    }

    if config.session.cleanup_interval_secs == 0 {
        anyhow::bail!("session.cleanup_interval_secs cannot be 0");
    }

    if config.relay.default_content_type.trim().is_empty() {
        anyhow::bail!("relay.default_content_type cannot be empty");
    }

    for warning in config.validate() {
        tracing::warn!("Config warning: {}", warning);
    }

    Ok(())
}
