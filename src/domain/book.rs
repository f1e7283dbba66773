//! Ephemeral scrape output types shared by all site adapters.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The five markets the pipeline ingests, in orchestration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CountryCode {
    KR,
    JP,
    CN,
    US,
    UK,
}

impl CountryCode {
    /// Fixed processing order for a full ingestion run.
    pub const ALL: [CountryCode; 5] = [
        CountryCode::KR,
        CountryCode::JP,
        CountryCode::CN,
        CountryCode::US,
        CountryCode::UK,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CountryCode::KR => "KR",
            CountryCode::JP => "JP",
            CountryCode::CN => "CN",
            CountryCode::US => "US",
            CountryCode::UK => "UK",
        }
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ranked book as extracted from a bestseller listing page.
///
/// `isbn` carries the site-native product identifier (ASIN, goods number)
/// when the site exposes one; persistence synthesizes a fallback key when
/// it is absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapedBook {
    /// 1-based position on the source listing.
    pub rank: u32,
    pub title: String,
    /// Falls back to the literal `"Unknown"` when unextractable.
    pub author: String,
    pub publisher: Option<String>,
    /// Textual price as shown by the site, digits/decimal-point only where
    /// the site adapter strips formatting.
    pub price: Option<String>,
    pub currency: Option<String>,
    /// Absolute https URL; protocol-relative sources are rewritten.
    pub cover_image_url: Option<String>,
    pub detail_url: String,
    pub isbn: Option<String>,
    /// Sanitized plain text from the detail page, when enrichment succeeded.
    pub description: Option<String>,
    pub category: Option<String>,
}

/// Outcome of one adapter invocation. Adapters never return `Err`; every
/// failure path resolves to `success == false` with a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperResult {
    pub success: bool,
    pub country_code: CountryCode,
    pub books: Vec<ScrapedBook>,
    pub error: Option<String>,
}

impl ScraperResult {
    pub fn ok(country_code: CountryCode, books: Vec<ScrapedBook>) -> Self {
        Self {
            success: true,
            country_code,
            books,
            error: None,
        }
    }

    /// A failed result never carries books.
    pub fn failure(country_code: CountryCode, error: impl Into<String>) -> Self {
        Self {
            success: false,
            country_code,
            books: Vec::new(),
            error: Some(error.into()),
        }
    }
}
