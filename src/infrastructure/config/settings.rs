use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub live: LiveConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Resource API client settings
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL every request path is appended to
    #[serde(default = "default_api_base_url")]
    pub base_url: String,
    /// Total attempts per request (first try included)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Fixed delay between attempts in milliseconds
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Per-attempt timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Live channel settings
#[derive(Debug, Clone, Deserialize)]
pub struct LiveConfig {
    #[serde(default = "default_live_url")]
    pub url: String,
    /// Keep-alive probe interval in seconds (sent only while open)
    #[serde(default = "default_keepalive_interval")]
    pub keepalive_interval_secs: u64,
    /// Fixed delay before a reconnect attempt in seconds
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_secs: u64,
    /// Re-pull the active section when the channel re-opens
    #[serde(default = "default_refresh_on_reconnect")]
    pub refresh_on_reconnect: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    /// Maximum entries kept in the activity feed
    #[serde(default = "default_activity_feed_cap")]
    pub activity_feed_cap: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    /// Bearer credential issued by the login flow
    pub token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TelemetryConfig {
    /// Emit JSON log lines instead of the human-readable format
    #[serde(default)]
    pub json: bool,
}

fn default_api_base_url() -> String {
    "http://localhost:3000/api".to_string()
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_live_url() -> String {
    "ws://localhost:3000".to_string()
}

fn default_keepalive_interval() -> u64 {
    25
}

fn default_reconnect_delay() -> u64 {
    3
}

fn default_refresh_on_reconnect() -> bool {
    true
}

fn default_activity_feed_cap() -> usize {
    10
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            .set_default("api.base_url", default_api_base_url())?
            .set_default("api.max_attempts", default_max_attempts() as i64)?
            .set_default("api.retry_delay_ms", default_retry_delay_ms() as i64)?
            .set_default("api.timeout_secs", default_timeout_secs() as i64)?
            .set_default("live.url", default_live_url())?
            .set_default("live.keepalive_interval_secs", default_keepalive_interval() as i64)?
            .set_default("live.reconnect_delay_secs", default_reconnect_delay() as i64)?
            .set_default("live.refresh_on_reconnect", default_refresh_on_reconnect())?
            .set_default("dashboard.activity_feed_cap", default_activity_feed_cap() as i64)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // CONSOLE__API__BASE_URL, CONSOLE__AUTH__TOKEN, ...
            .add_source(
                Environment::with_prefix("CONSOLE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }
}

impl ApiConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl LiveConfig {
    /// Never zero: a zero period would make the keep-alive timer spin
    pub fn keepalive_interval(&self) -> Duration {
        Duration::from_secs(self.keepalive_interval_secs.max(1))
    }

    /// Never zero: a refusing server must not be redialled in a tight loop
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs.max(1))
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            url: default_live_url(),
            keepalive_interval_secs: default_keepalive_interval(),
            reconnect_delay_secs: default_reconnect_delay(),
            refresh_on_reconnect: default_refresh_on_reconnect(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            activity_feed_cap: default_activity_feed_cap(),
        }
    }
}
