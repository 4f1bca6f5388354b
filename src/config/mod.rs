mod types;

pub use types::*;

use anyhow::{Context, Result};
use showtape_common::{FormatCode, StreamParams};
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

    let default_paths = [
        "./config.toml",
        "./showtape.toml",
        "~/.config/showtape/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Fail unless the authorization context needed for stream requests is present.
pub fn require_stream_params(params: &StreamParams) -> Result<()> {
    if params.subscription_id.trim().is_empty() {
        anyhow::bail!("stream.subscription_id is not set");
    }
    if params.user_id.trim().is_empty() {
        anyhow::bail!("stream.user_id is not set");
    }
    Ok(())
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    if config.download.format == FormatCode::AdaptiveAac {
        anyhow::bail!("Track format must be between 1 and 5");
    }

    if !config.api.base_url.ends_with('/') {
        anyhow::bail!("api.base_url must end with '/': {}", config.api.base_url);
    }
    url::Url::parse(&config.api.base_url)
        .with_context(|| format!("Invalid api.base_url: {}", config.api.base_url))?;

    let stream = &config.stream;
    let any_set = !stream.subscription_id.is_empty() || !stream.user_id.is_empty();
    if any_set {
        require_stream_params(stream)?;
    }
    if stream.window_end < stream.window_start {
        anyhow::bail!(
            "stream.window_end ({}) is before stream.window_start ({})",
            stream.window_end,
            stream.window_start
        );
    }

    if let Some(path) = &config.tools.ffmpeg_path {
        if !path.exists() {
            tracing::warn!("Configured ffmpeg path does not exist: {:?}", path);
        }
    }

    Ok(())
}
