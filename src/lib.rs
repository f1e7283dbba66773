//! Weekly bestseller ingestion for five book markets.
//!
//! Scrapes the public bestseller listings of YES24 (Korea), Amazon
//! (Japan, US, UK) and Dangdang (China), normalizes the results into a
//! shared book model, and upserts them into SQLite together with a
//! per-country audit log. A twice-weekly scheduler drives the runs;
//! a manual trigger is available and de-duplicated against in-flight
//! runs.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod scheduler;
pub mod scraping;
