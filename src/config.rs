//! Application configuration: env-first, optional file override, validated.
//!
//! Layers `config::Config` sources (defaults → optional file → environment)
//! plus `validator` for post-load checks.

use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;
use validator::Validate;

const DEFAULT_BASE_URL: &str = "https://bad-api-assignment.reaktor.com/v2/";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_UPDATE_INTERVAL_SECS: u64 = 300;
const DEFAULT_HEDGE_WIDTH: usize = 6;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LOG_LEVEL: &str = "info";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_update_interval_secs() -> u64 {
    DEFAULT_UPDATE_INTERVAL_SECS
}
fn default_hedge_width() -> usize {
    DEFAULT_HEDGE_WIDTH
}
fn default_http_timeout_secs() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}
fn default_categories() -> Vec<String> {
    vec![
        "gloves".to_string(),
        "facemasks".to_string(),
        "beanies".to_string(),
    ]
}
fn default_manufacturers() -> Vec<String> {
    vec![
        "fresh".to_string(),
        "vemundvik".to_string(),
        "umpante".to_string(),
        "kaltidukt".to_string(),
    ]
}
fn default_workers() -> usize {
    num_cpus::get().max(1)
}

/// Top-level application configuration.
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct AppConfig {
    /// Base URL of the upstream badapi-style service.
    #[serde(default = "default_base_url")]
    #[validate(url)]
    pub base_url: String,

    /// TCP port the read-only frontend listens on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Interval between ingestion rounds, in seconds. 0 disables the
    /// periodic scheduler (a single round still runs at startup).
    #[serde(default = "default_update_interval_secs")]
    pub update_interval_secs: u64,

    /// Product categories ingested every round.
    #[serde(default = "default_categories")]
    #[validate(length(min = 1))]
    pub categories: Vec<String>,

    /// Manufacturers whose availability is ingested every round.
    #[serde(default = "default_manufacturers")]
    #[validate(length(min = 1))]
    pub manufacturers: Vec<String>,

    /// Number of concurrent hedged attempts per availability fetch.
    #[serde(default = "default_hedge_width")]
    #[validate(range(min = 1))]
    pub hedge_width: usize,

    /// Whole-request HTTP timeout in seconds.
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// Worker-pool width for the product/availability pipelines.
    #[serde(default = "default_workers")]
    #[validate(range(min = 1))]
    pub workers: usize,

    /// `tracing-subscriber` env-filter directive.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            port: default_port(),
            update_interval_secs: default_update_interval_secs(),
            categories: default_categories(),
            manufacturers: default_manufacturers(),
            hedge_width: default_hedge_width(),
            http_timeout_secs: default_http_timeout_secs(),
            workers: default_workers(),
            log_level: default_log_level(),
        }
    }
}

impl AppConfig {
    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

/// Loads configuration from (in increasing priority order): built-in
/// defaults, an optional `config/default.toml` or file at `config_path`, and
/// `CATALOG_SYNC_*` environment variables. Validates the result.
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig, crate::errors::AppError> {
    let builder = Config::builder()
        .set_default("base_url", DEFAULT_BASE_URL)?
        .set_default("port", DEFAULT_PORT as i64)?
        .set_default("update_interval_secs", DEFAULT_UPDATE_INTERVAL_SECS)?
        .set_default("categories", default_categories())?
        .set_default("manufacturers", default_manufacturers())?
        .set_default("hedge_width", DEFAULT_HEDGE_WIDTH as i64)?
        .set_default("http_timeout_secs", DEFAULT_HTTP_TIMEOUT_SECS)?
        .set_default("workers", default_workers() as i64)?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .add_source(File::with_name(config_path.unwrap_or("config/default")).required(false));

    let raw = builder
        .add_source(
            Environment::with_prefix("CATALOG_SYNC")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let cfg: AppConfig = raw.try_deserialize()?;
    cfg.validate()?;
    Ok(cfg)
}

/// Initializes the global `tracing` subscriber from the configured log
/// level. Safe to call once at process start.
pub fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
