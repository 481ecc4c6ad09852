use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub parity: ParityConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Upstream API / local data configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_funding_path")]
    pub funding_path: String,

    #[serde(default = "default_listings_path")]
    pub listings_path: String,

    #[serde(default = "default_parity_path")]
    pub parity_path: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Serve canned data when a fetch fails instead of erroring out.
    #[serde(default)]
    pub mock_fallback: bool,

    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

/// Parity calculator configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ParityConfig {
    /// "all" or one of the tracked exchange keys
    #[serde(default = "default_base_exchange")]
    pub base_exchange: String,
}

/// Payload output configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default = "default_true")]
    pub pretty: bool,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_base_url() -> String {
    "https://api.cryptoradar.io/v1/".to_string()
}
fn default_funding_path() -> String {
    "funding".to_string()
}
fn default_listings_path() -> String {
    "listings".to_string()
}
fn default_parity_path() -> String {
    "parity".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    3
}
fn default_retry_delay_ms() -> u64 {
    500
}
fn default_user_agent() -> String {
    "crypto-radar/0.1 (listing and funding analytics)".to_string()
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}
fn default_base_exchange() -> String {
    "all".to_string()
}
fn default_true() -> bool {
    true
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            funding_path: default_funding_path(),
            listings_path: default_listings_path(),
            parity_path: default_parity_path(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            user_agent: default_user_agent(),
            mock_fallback: false,
            data_dir: default_data_dir(),
        }
    }
}

impl Default for ParityConfig {
    fn default() -> Self {
        Self {
            base_exchange: default_base_exchange(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { pretty: true }
    }
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides
    /// (`RADAR__SOURCE__API_KEY=...`, `RADAR__PARITY__BASE_EXCHANGE=okx`).
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(config::Environment::with_prefix("RADAR").separator("__"))
            .build()?;

        let app_cfg: AppConfig = cfg.try_deserialize().unwrap_or_else(|e| {
            warn!("Invalid configuration ({}), using defaults", e);
            AppConfig::default()
        });
        Ok(app_cfg)
    }
}
