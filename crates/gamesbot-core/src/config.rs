//! Bot configuration: serde structs for `config.json` plus the resolved,
//! immutable `BotConfig` handed to the session at startup.
//!
//! Loading failures are fatal: the caller prints the diagnostic and exits
//! before any connection is attempted.

use crate::error::{Error, Result};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Display name the game host posts under.
pub const DEFAULT_HOST_NICK: &str = "\u{2022}GamesBot\u{2022}";

pub const CONFIG_FILE: &str = "config.json";
pub const WORDS_FILE: &str = "words.json";

const DEFAULT_RECONNECT_DELAY_SECS: u64 = 5;

// ============================================================
// File format
// ============================================================

#[derive(Debug, Clone, Deserialize)]
pub struct FileConfig {
    /// Sent verbatim as the authorize payload.
    pub creds: Value,
    /// Hubs every chat post is addressed to.
    pub hub_urls: Vec<String>,
    /// Our own display name in the hub.
    pub own_nick: String,
    #[serde(default = "default_host_nick")]
    pub host_nick: String,
    /// Knowledge index location; relative paths resolve against the config dir.
    #[serde(default)]
    pub words_file: Option<PathBuf>,
    #[serde(default)]
    pub session: FileSessionConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileSessionConfig {
    pub read_timeout_secs: Option<u64>,
    pub correlate_by_id: bool,
    pub strict_auth: bool,
    pub reconnect: bool,
    pub reconnect_delay_secs: Option<u64>,
}

fn default_host_nick() -> String {
    DEFAULT_HOST_NICK.to_string()
}

impl FileConfig {
    /// Read and parse `config.json`. Missing or invalid files are errors.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::ConfigError(format!("config file not found at {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            Error::ConfigError(format!("invalid config {}: {}", path.display(), e))
        })?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Knowledge index path, resolved against `base_dir` when relative.
    pub fn words_path(&self, base_dir: &Path) -> PathBuf {
        match &self.words_file {
            Some(p) if p.is_absolute() => p.clone(),
            Some(p) => base_dir.join(p),
            None => base_dir.join(WORDS_FILE),
        }
    }
}

// ============================================================
// Resolved configuration
// ============================================================

/// How a reply is matched to the request that caused it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CorrelationMode {
    /// The next frame on the wire is the reply.
    #[default]
    ArrivalOrder,
    /// Wait for a frame echoing our `callback_id`; park everything else
    /// for the listen loop.
    ById,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionOptions {
    pub correlation: CorrelationMode,
    /// `None` blocks forever on a silent hub.
    pub read_timeout: Option<Duration>,
    /// Fail the handshake when the hub rejects our credentials.
    pub strict_auth: bool,
    /// Re-run the handshake after a timeout or dropped connection.
    pub reconnect: bool,
    pub reconnect_delay: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            correlation: CorrelationMode::ArrivalOrder,
            read_timeout: None,
            strict_auth: false,
            reconnect: false,
            reconnect_delay: Duration::from_secs(DEFAULT_RECONNECT_DELAY_SECS),
        }
    }
}

impl From<&FileSessionConfig> for SessionOptions {
    fn from(file: &FileSessionConfig) -> Self {
        Self {
            correlation: if file.correlate_by_id {
                CorrelationMode::ById
            } else {
                CorrelationMode::ArrivalOrder
            },
            read_timeout: file.read_timeout_secs.map(Duration::from_secs),
            strict_auth: file.strict_auth,
            reconnect: file.reconnect,
            reconnect_delay: Duration::from_secs(
                file.reconnect_delay_secs
                    .unwrap_or(DEFAULT_RECONNECT_DELAY_SECS),
            ),
        }
    }
}

/// Everything the bot needs, fixed for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// `host:port` of the hub service.
    pub endpoint: String,
    /// Session token for the diagnostic event endpoint.
    pub auth_token: String,
    pub credentials: Value,
    pub hub_urls: Vec<String>,
    pub own_nick: String,
    pub host_nick: String,
    pub words_path: PathBuf,
    pub session: SessionOptions,
}

impl BotConfig {
    pub fn from_file(
        file: FileConfig,
        endpoint: impl Into<String>,
        auth_token: impl Into<String>,
        base_dir: &Path,
    ) -> Result<Self> {
        let endpoint = endpoint.into();
        if endpoint.trim().is_empty() {
            return Err(Error::ConfigError("hub endpoint is empty".into()));
        }
        Ok(Self {
            words_path: file.words_path(base_dir),
            session: SessionOptions::from(&file.session),
            endpoint,
            auth_token: auth_token.into(),
            credentials: file.creds,
            hub_urls: file.hub_urls,
            own_nick: file.own_nick,
            host_nick: file.host_nick,
        })
    }

    /// WebSocket URL of the hub.
    pub fn ws_url(&self) -> String {
        format!("ws://{}", self.endpoint)
    }

    /// `POST` target for diagnostic events.
    pub fn events_url(&self) -> String {
        format!("http://{}/events", self.endpoint.trim_end_matches('/'))
    }
}
