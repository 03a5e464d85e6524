//! Core configuration types and loading.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use super::defaults::{
    default_join_delay_ms, default_max_concurrent_searches, default_message_delay_ms,
    default_port, default_search_timeout_secs,
};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Bot configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// IRC server to connect to.
    pub server: ServerConfig,
    /// Bot identity, access list and channel settings.
    pub bot: BotConfig,
    /// IGDB search gateway credentials.
    #[serde(default)]
    pub igdb: IgdbConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// IRC server connection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Hostname (also used as the TLS verification name).
    pub host: String,
    /// Port (default: 6667).
    #[serde(default = "default_port")]
    pub port: u16,
    /// Connect with TLS.
    #[serde(default)]
    pub tls: bool,
}

/// Bot identity and behaviour.
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Primary nickname.
    pub nick: String,
    /// Nickname to try first when the primary one is taken.
    pub alt_nick: Option<String>,
    /// Realname (GECOS) sent with USER. Defaults to the nickname.
    pub realname: Option<String>,
    /// Owner nickname; the only user allowed to `!restart`.
    pub owner: String,
    /// Admin nicknames (the owner is always an admin).
    #[serde(default)]
    pub admins: Vec<String>,
    /// Channels to join when no channel file exists yet.
    #[serde(default)]
    pub channels: Vec<String>,
    /// File the live channel list is persisted to. Unset keeps it in memory.
    pub channels_file: Option<PathBuf>,
    /// Raw lines sent after autojoin, separated by `;`.
    #[serde(default)]
    pub perform: String,
    /// Minimum milliseconds between outbound lines.
    #[serde(default = "default_message_delay_ms")]
    pub message_delay_ms: u64,
    /// Milliseconds to pause after each autojoin.
    #[serde(default = "default_join_delay_ms")]
    pub join_delay_ms: u64,
}

impl BotConfig {
    /// Realname for USER, falling back to the nickname.
    pub fn realname(&self) -> &str {
        self.realname.as_deref().unwrap_or(&self.nick)
    }

    /// Perform lines in order, blanks removed.
    pub fn perform_lines(&self) -> Vec<String> {
        self.perform
            .split(';')
            .map(str::trim)
            .filter(|cmd| !cmd.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn message_delay(&self) -> Duration {
        Duration::from_millis(self.message_delay_ms)
    }

    pub fn join_delay(&self) -> Duration {
        Duration::from_millis(self.join_delay_ms)
    }
}

/// IGDB API settings.
///
/// Either a static `access_token` or a `client_secret` (to obtain one) must
/// accompany the `client_id`, otherwise every search reports the gateway as
/// not configured.
#[derive(Debug, Clone, Deserialize)]
pub struct IgdbConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    /// Pre-issued bearer token. Skips the client-credentials exchange.
    #[serde(default)]
    pub access_token: String,
    /// Maximum searches in flight at once.
    #[serde(default = "default_max_concurrent_searches")]
    pub max_concurrent: usize,
    /// Per-request HTTP timeout in seconds.
    #[serde(default = "default_search_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for IgdbConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            access_token: String::new(),
            max_concurrent: default_max_concurrent_searches(),
            timeout_secs: default_search_timeout_secs(),
        }
    }
}

impl IgdbConfig {
    /// True when searches can be attempted at all.
    pub fn has_credentials(&self) -> bool {
        !self.client_id.is_empty()
            && (!self.access_token.is_empty() || !self.client_secret.is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
