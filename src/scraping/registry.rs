//! Fixed mapping from country to its site adapter.
//!
//! Variant-specific parameters (the Amazon market tuples) are closed over
//! at construction time, so the orchestrator iterates countries without
//! ever branching on adapter identity.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::CountryCode;
use crate::infrastructure::HttpClient;
use crate::scraping::amazon::{AmazonMarket, AmazonScraper};
use crate::scraping::dangdang::DangdangScraper;
use crate::scraping::yes24::Yes24Scraper;
use crate::scraping::SiteScraper;

pub struct ScraperRegistry {
    scrapers: HashMap<CountryCode, Arc<dyn SiteScraper>>,
}

impl ScraperRegistry {
    /// Registry over arbitrary adapters, keyed by each adapter's country.
    /// Used directly by tests to inject stand-ins.
    pub fn new(scrapers: impl IntoIterator<Item = Arc<dyn SiteScraper>>) -> Self {
        Self {
            scrapers: scrapers
                .into_iter()
                .map(|scraper| (scraper.country(), scraper))
                .collect(),
        }
    }

    /// The production wiring: all five countries over a shared client.
    pub fn with_default_sites(client: Arc<HttpClient>) -> Self {
        Self::new([
            Arc::new(Yes24Scraper::new(Arc::clone(&client))) as Arc<dyn SiteScraper>,
            Arc::new(AmazonScraper::new(Arc::clone(&client), AmazonMarket::Japan)),
            Arc::new(DangdangScraper::new(Arc::clone(&client))),
            Arc::new(AmazonScraper::new(Arc::clone(&client), AmazonMarket::UnitedStates)),
            Arc::new(AmazonScraper::new(client, AmazonMarket::UnitedKingdom)),
        ])
    }

    pub fn get(&self, country: CountryCode) -> Option<Arc<dyn SiteScraper>> {
        self.scrapers.get(&country).cloned()
    }
}
