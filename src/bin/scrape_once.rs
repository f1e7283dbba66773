//! One-shot ingestion run. Useful for cron-driven deployments and for
//! exercising the pipeline by hand without waiting for the schedule.

use std::sync::Arc;

use anyhow::Result;

use bookrank_worker::application::{IngestOrchestrator, OrchestratorConfig};
use bookrank_worker::infrastructure::{
    config::AppConfig, init_logging, BookRepository, DatabaseConnection, HttpClient,
};
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

    let orchestrator = IngestOrchestrator::new(
        registry,
        repository,
        OrchestratorConfig {
            country_delay: std::time::Duration::from_millis(config.scrape.country_delay_ms),
        },
    );
    orchestrator.run_all().await;

    Ok(())
}
