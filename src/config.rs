use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Optional TOML configuration. Every field has a default, so a missing file
/// (or an empty one) yields a usable config; CLI flags override whatever is
/// loaded here.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ServerConfig {
    /// Hostname of the server to query (e.g. `mastodon.social`).
    pub host: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AuthConfig {
    /// Bearer token with read scope.
    pub token: Option<String>,
    /// File whose trimmed contents are the token. `token` wins when both
    /// are set.
    pub token_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FetchConfig {
    /// Day window for the public analysis.
    #[serde(default = "default_days")]
    pub days: u32,
    /// Item ceiling for the timeline summary.
    #[serde(default = "default_max_items")]
    pub max_items: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            days: default_days(),
            max_items: default_max_items(),
        }
    }
}

fn default_days() -> u32 {
    7
}
fn default_max_items() -> u64 {
    1000
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReportConfig {
    /// Entries shown per breakdown section.
    #[serde(default = "default_top")]
    pub top: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self { top: default_top() }
    }
}

fn default_top() -> usize {
    10
}

impl Config {
    /// All-defaults config for runs without a config file.
    pub fn minimal() -> Self {
        Self::default()
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.fetch.days == 0 {
        anyhow::bail!("fetch.days must be > 0");
    }
    if config.fetch.max_items == 0 {
        anyhow::bail!("fetch.max_items must be > 0");
    }
    if config.report.top == 0 {
        anyhow::bail!("report.top must be >= 1");
    }

    Ok(config)
}

/// Resolve the bearer token from the CLI value or the config.
///
/// A CLI value starting with `@` names a file whose trimmed contents are the
/// token. Otherwise the config's inline `token` wins over `token_file`.
pub fn resolve_token(cli_token: Option<&str>, config: &Config) -> Result<Option<String>> {
    if let Some(value) = cli_token {
        if let Some(path) = value.strip_prefix('@') {
            let token = std::fs::read_to_string(path)
                .with_context(|| format!("Token file not found: {}", path))?;
            return Ok(Some(token.trim().to_string()));
        }
        return Ok(Some(value.to_string()));
    }

    if let Some(token) = &config.auth.token {
        return Ok(Some(token.clone()));
    }

    if let Some(path) = &config.auth.token_file {
        let token = std::fs::read_to_string(path)
            .with_context(|| format!("Token file not found: {}", path.display()))?;
        return Ok(Some(token.trim().to_string()));
    }

    Ok(None)
}
