//! Application configuration.
//!
//! Defaults are defined in code and can be overridden through
//! `BOOKRANK_*` environment variables, e.g.
//! `BOOKRANK_DATABASE__URL=sqlite:/var/lib/bookrank/bookrank.db` or
//! `BOOKRANK_SCRAPE__COUNTRY_DELAY_MS=5000`.

use anyhow::{Context, Result};
use config::{Config, Environment};
use serde::{Deserialize, Serialize};

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub scrape: ScrapeConfig,
    pub schedule: ScheduleConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite connection URL.
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:data/bookrank.db".to_string(),
        }
    }
}

/// Settings shared by all site adapters and the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// User-Agent sent with every outbound request.
    pub user_agent: String,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,

    /// Global outbound request ceiling, enforced by the shared client.
    pub max_requests_per_second: u32,

    /// Politeness delay between countries within one run, milliseconds.
    pub country_delay_ms: u64,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            user_agent: "BookRankingBot/1.0 (+https://book-ranking.app/bot)".to_string(),
            request_timeout_seconds: 30,
            max_requests_per_second: 5,
            country_delay_ms: 3000,
        }
    }
}

/// When the weekly ingestion fires: Tuesday and Friday at `hour:minute`
/// in the configured fixed UTC offset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    pub hour: u32,
    pub minute: u32,
    pub utc_offset_hours: i32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            hour: 6,
            minute: 0,
            utc_offset_hours: 9,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: String,

    /// Emit JSON formatted logs instead of human-readable ones.
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl AppConfig {
    /// Load configuration: code defaults layered under environment overrides.
    pub fn load() -> Result<Self> {
        let config = Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(Environment::with_prefix("BOOKRANK").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}
