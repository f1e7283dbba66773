//! Domain types for the bestseller ingestion pipeline.

pub mod book;
pub mod entities;

pub use book::{CountryCode, ScrapedBook, ScraperResult};
pub use entities::{Country, ScrapeLog, ScrapeStatus};
