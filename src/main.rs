//! Long-running ingestion daemon: seeds the database, then fires the
//! five-country scrape every Tuesday and Friday morning until stopped.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::FixedOffset;
use tracing::info;

use bookrank_worker::application::{IngestOrchestrator, OrchestratorConfig};
use bookrank_worker::infrastructure::{
    config::AppConfig, init_logging, BookRepository, DatabaseConnection, HttpClient,
};
use bookrank_worker::scheduler::cadence::WeeklyCadence;
use bookrank_worker::scheduler::daemon::spawn_weekly_daemon;
use bookrank_worker::scheduler::{ScrapeScheduler, SCRAPE_WEEKDAYS};
use bookrank_worker::scraping::ScraperRegistry;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;
    init_logging(&config.logging)?;

    let db = DatabaseConnection::new(&config.database.url).await?;
    db.migrate().await?;
    db.seed_countries().await?;

    let client = Arc::new(HttpClient::new((&config.scrape).into())?);
    let registry = ScraperRegistry::with_default_sites(client);
    let repository = BookRepository::new(Arc::new(db.pool().clone()));

    let orchestrator = Arc::new(IngestOrchestrator::new(
        registry,
        repository,
        OrchestratorConfig {
            country_delay: std::time::Duration::from_millis(config.scrape.country_delay_ms),
        },
    ));
    let scheduler = Arc::new(ScrapeScheduler::new(orchestrator));

    let offset = FixedOffset::east_opt(config.schedule.utc_offset_hours * 3600)
        .context("schedule.utc_offset_hours out of range")?;
    let cadence = WeeklyCadence::new(
        offset,
        SCRAPE_WEEKDAYS.to_vec(),
        config.schedule.hour,
        config.schedule.minute,
    );

    let daemon = spawn_weekly_daemon(Arc::clone(&scheduler), cadence);
    info!("bookrank worker started; press Ctrl-C to stop");

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!("shutdown signal received");
    daemon.abort();

    Ok(())
}
