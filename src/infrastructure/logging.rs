//! Logging system initialization.
//!
//! Structured logging via `tracing`, with the level taken from the
//! application configuration and overridable through `RUST_LOG`.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::infrastructure::config::LoggingConfig;

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level when set, so individual
/// dependency targets (e.g. `sqlx::query`, `reqwest`) can be tuned
/// without a config change.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.level)));

    if config.json_format {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;
    }

    Ok(())
}

/// Keep chatty dependencies quiet unless explicitly requested.
fn default_directives(level: &str) -> String {
    format!("{level},sqlx::query=warn,hyper=warn,reqwest=warn,html5ever=error")
}
