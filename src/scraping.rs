//! Site scraping: the per-site adapters, the shared extraction helpers,
//! and the text sanitizer.
//!
//! Each adapter is hand-tuned to one site's markup and satisfies the
//! uniform [`SiteScraper`] contract: it never returns `Err` — every
//! failure path resolves to a [`ScraperResult`] with `success == false`
//! and a descriptive message.

pub mod amazon;
pub mod dangdang;
pub mod detail;
pub mod registry;
pub mod sanitize;
pub mod urls;
pub mod yes24;

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};

use crate::domain::{CountryCode, ScraperResult};

pub use registry::ScraperRegistry;
pub use sanitize::sanitize_description;

/// Uniform capability over the heterogeneous site adapters: given the
/// country it was constructed for, produce a [`ScraperResult`].
#[async_trait]
pub trait SiteScraper: Send + Sync {
    fn country(&self) -> CountryCode;

    async fn scrape(&self) -> ScraperResult;
}

/// The author sentinel used when no author can be extracted.
pub(crate) const UNKNOWN_AUTHOR: &str = "Unknown";

/// Listings are capped at the top 20 ranked items per site.
pub(crate) const MAX_LISTING_ITEMS: usize = 20;

// Selector-based extraction helpers shared by the adapters. Selectors are
// passed as strings and parsed at use; an unparsable selector simply
// yields no match, mirroring how a markup change degrades extraction.

pub(crate) fn first_text(element: &ElementRef<'_>, selector: &str) -> Option<String> {
    let parsed = Selector::parse(selector).ok()?;
    element
        .select(&parsed)
        .next()
        .map(|el| collect_text(&el))
        .filter(|text| !text.is_empty())
}

pub(crate) fn last_text(element: &ElementRef<'_>, selector: &str) -> Option<String> {
    let parsed = Selector::parse(selector).ok()?;
    element
        .select(&parsed)
        .last()
        .map(|el| collect_text(&el))
        .filter(|text| !text.is_empty())
}

/// Concatenated text of every match, like a jQuery `.text()` over a set.
pub(crate) fn all_text(element: &ElementRef<'_>, selector: &str) -> Option<String> {
    let parsed = Selector::parse(selector).ok()?;
    let combined: String = element.select(&parsed).map(|el| collect_text(&el)).collect();
    let combined = combined.trim().to_string();
    (!combined.is_empty()).then_some(combined)
}

/// Attribute of the first matching element, like `.attr()` over a
/// matched set: later matches are not consulted.
pub(crate) fn first_attr(element: &ElementRef<'_>, selector: &str, attr: &str) -> Option<String> {
    let parsed = Selector::parse(selector).ok()?;
    element
        .select(&parsed)
        .next()?
        .value()
        .attr(attr)
        .map(str::to_string)
        .filter(|value| !value.is_empty())
}

/// Raw inner HTML of the first match, trimmed; used for description
/// fragments that still need sanitization.
pub(crate) fn first_inner_html(document: &Html, selector: &str) -> Option<String> {
    let parsed = Selector::parse(selector).ok()?;
    document
        .select(&parsed)
        .next()
        .map(|el| el.inner_html().trim().to_string())
        .filter(|html| !html.is_empty())
}

pub(crate) fn meta_content(document: &Html, selector: &str) -> Option<String> {
    let parsed = Selector::parse(selector).ok()?;
    document
        .select(&parsed)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
}

/// Leading decimal digits of a label like `"3위"`, if any.
pub(crate) fn leading_number(text: &str) -> Option<u32> {
    let digits: String = text.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

fn collect_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
