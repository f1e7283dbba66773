//! Runs every country's adapter in a fixed sequence and persists the
//! results.
//!
//! Countries are processed strictly one at a time — five third-party
//! sites are being hit, and sequential processing bounds the outbound
//! rate without per-site coordination. No failure in one country is
//! allowed to abort the run: every country gets attempted, and every
//! attempt leaves exactly one scrape-log row behind, whatever happened.

use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::domain::{CountryCode, ScrapeStatus};
use crate::infrastructure::BookRepository;
use crate::scraping::ScraperRegistry;

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Politeness delay between countries.
    pub country_delay: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            country_delay: Duration::from_millis(
                crate::infrastructure::config::ScrapeConfig::default().country_delay_ms,
            ),
        }
    }
}

pub struct IngestOrchestrator {
    registry: ScraperRegistry,
    repository: BookRepository,
    config: OrchestratorConfig,
}

impl IngestOrchestrator {
    pub fn new(
        registry: ScraperRegistry,
        repository: BookRepository,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            registry,
            repository,
            config,
        }
    }

    /// Run the full five-country ingestion. Fire-and-forget: outcomes are
    /// observable only through the persisted rows and the scrape log.
    pub async fn run_all(&self) {
        // All rankings from one run land on the day the run started.
        let ranking_date = chrono::Local::now().date_naive();
        info!(%ranking_date, "starting ingestion run");

        for country in CountryCode::ALL {
            let started = Instant::now();
            let mut status = ScrapeStatus::Success;
            let mut books_count: i64 = 0;
            let mut error_message: Option<String> = None;

            info!(country = %country, "scraping country");
            match self.ingest_country(country, ranking_date, &mut books_count).await {
                Ok(()) => {
                    info!(country = %country, books = books_count, "country ingested");
                }
                Err(err) => {
                    status = ScrapeStatus::Failed;
                    error_message = Some(err.to_string());
                    warn!(country = %country, error = %err, "country ingestion failed");
                }
            }

            // The audit row is written whatever happened above.
            if let Err(err) = self
                .repository
                .insert_scrape_log(
                    country,
                    status,
                    books_count,
                    error_message.as_deref(),
                    started.elapsed().as_millis() as i64,
                )
                .await
            {
                error!(country = %country, error = %err, "failed to record scrape log");
            }

            sleep(self.config.country_delay).await;
        }

        info!("ingestion run complete");
    }

    /// One country's pass. `books_count` is threaded as an out-parameter
    /// so books persisted before a mid-loop failure still show up in the
    /// scrape log (already-upserted rows are retained, not rolled back).
    async fn ingest_country(
        &self,
        country: CountryCode,
        ranking_date: NaiveDate,
        books_count: &mut i64,
    ) -> Result<()> {
        let scraper = self
            .registry
            .get(country)
            .ok_or_else(|| anyhow!("No scraper registered for {country}"))?;

        let result = scraper.scrape().await;
        if !result.success {
            // Adapter failure: skip persistence for this country entirely.
            return Err(anyhow!(result
                .error
                .unwrap_or_else(|| "Unknown error".to_string())));
        }

        // A missing country row is seed-data breakage, not a scrape issue.
        let country_row = self
            .repository
            .find_country(country)
            .await?
            .ok_or_else(|| anyhow!("Country not found: {country}"))?;

        for book in &result.books {
            let book_id = self.repository.upsert_book(country_row.id, book).await?;
            self.repository
                .upsert_ranking(book_id, country_row.id, book.rank, ranking_date)
                .await?;
            *books_count += 1;
        }

        Ok(())
    }
}
