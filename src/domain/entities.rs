//! Persisted row types owned by the ingestion side of the schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Seeded market row; its absence at ingest time is a configuration error,
/// not a transient scrape failure.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Country {
    pub id: i64,
    pub code: String,
    pub name_en: String,
    pub bookstore_name: String,
    pub bookstore_url: String,
}

/// Outcome of one country's pass within an orchestrator run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapeStatus {
    Success,
    Failed,
}

impl ScrapeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ScrapeStatus::Success => "success",
            ScrapeStatus::Failed => "failed",
        }
    }
}

/// Append-only audit row, one per country per orchestrator invocation.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ScrapeLog {
    pub id: i64,
    pub country_code: String,
    pub status: String,
    /// Books fully persisted (book + ranking upsert), not merely scraped.
    pub books_count: i64,
    pub error_message: Option<String>,
    pub duration_ms: i64,
    pub created_at: DateTime<Utc>,
}
