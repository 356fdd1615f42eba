//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Endpoint the widget talks to when nothing else is configured.
pub const DEFAULT_WS_URL: &str = "wss://demo.davinciai.eu:8443/ws";

/// Analytics backend used by the REST client.
pub const DEFAULT_API_URL: &str = "https://api.enterprise.davinciai.eu:8450";

/// Hard ceiling on descriptor text length, in characters.
pub const MAX_TEXT_LEN: usize = 50;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub channel: ChannelConfig,

    #[serde(default)]
    pub scanner: ScannerConfig,

    #[serde(default)]
    pub executor: ExecutorConfig,

    #[serde(default)]
    pub host: HostConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Endpoint for new sessions: the host override, else the channel default.
    pub fn effective_ws_url(&self) -> &str {
        self.host.ws_url.as_deref().unwrap_or(&self.channel.ws_url)
    }
}

/// Session channel configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelConfig {
    #[serde(default = "default_ws_url")]
    pub ws_url: String,

    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

impl ChannelConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            ws_url: default_ws_url(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

fn default_ws_url() -> String {
    DEFAULT_WS_URL.to_string()
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

/// DOM snapshot extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Upper bound on descriptors per snapshot.
    #[serde(default = "default_max_elements")]
    pub max_elements: usize,

    #[serde(default = "default_max_text_len")]
    pub max_text_len: usize,

    /// Vertical tolerance around the viewport, in pixels.
    #[serde(default = "default_viewport_margin")]
    pub viewport_margin: f64,

    /// Derive stable ids for elements without `id`/`name`.
    #[serde(default = "default_true")]
    pub generate_ids: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            max_elements: default_max_elements(),
            max_text_len: default_max_text_len(),
            viewport_margin: default_viewport_margin(),
            generate_ids: true,
        }
    }
}

fn default_max_elements() -> usize {
    400
}

fn default_max_text_len() -> usize {
    MAX_TEXT_LEN
}

fn default_viewport_margin() -> f64 {
    100.0
}

pub(crate) fn default_true() -> bool {
    true
}

/// Command executor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Lifetime of a highlight or spotlight marker.
    #[serde(default = "default_highlight_ms")]
    pub highlight_ms: u64,

    /// Wait after a command before reporting completion.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,

    /// Settle wait after `scroll_to` and `scroll`, which animate.
    #[serde(default = "default_scroll_settle_ms")]
    pub scroll_settle_ms: u64,

    /// Pause requested by a `wait` command, before the usual settle.
    #[serde(default = "default_wait_ms")]
    pub wait_ms: u64,
}

impl ExecutorConfig {
    pub fn highlight_duration(&self) -> Duration {
        Duration::from_millis(self.highlight_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn scroll_settle(&self) -> Duration {
        Duration::from_millis(self.scroll_settle_ms)
    }

    pub fn wait(&self) -> Duration {
        Duration::from_millis(self.wait_ms)
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            highlight_ms: default_highlight_ms(),
            settle_ms: default_settle_ms(),
            scroll_settle_ms: default_scroll_settle_ms(),
            wait_ms: default_wait_ms(),
        }
    }
}

fn default_highlight_ms() -> u64 {
    3000
}

fn default_settle_ms() -> u64 {
    300
}

fn default_scroll_settle_ms() -> u64 {
    800
}

fn default_wait_ms() -> u64 {
    2000
}

/// Host adapter configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostConfig {
    /// Overrides `channel.ws_url` for sessions started by the host.
    #[serde(default)]
    pub ws_url: Option<String>,

    #[serde(default)]
    pub agent_id: Option<String>,

    /// Wait after a route change before rescanning.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
}

impl HostConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            ws_url: None,
            agent_id: None,
            settle_delay_ms: default_settle_delay_ms(),
        }
    }
}

fn default_settle_delay_ms() -> u64 {
    500
}

/// REST client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_url")]
    pub base_url: String,

    /// Bearer token; usually `${TARA_TOKEN}`.
    #[serde(default)]
    pub token: Option<String>,

    #[serde(default = "default_api_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_url(),
            token: None,
            timeout_secs: default_api_timeout_secs(),
        }
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_api_timeout_secs() -> u64 {
    30
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for rolling log files.
    #[serde(default)]
    pub dir: Option<PathBuf>,

    /// Log files kept before the oldest is deleted.
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl LoggingConfig {
    /// Log directory, falling back to `~/.tara/logs`.
    pub fn log_dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".tara")
                .join("logs")
        })
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: None,
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    30
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
