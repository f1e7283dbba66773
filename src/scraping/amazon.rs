//! Amazon bestseller adapter, parameterized over the JP/US/UK markets.
//!
//! One extraction routine serves all three storefronts; the market picks
//! the base URL, bestseller URL, and currency. Listing nodes carry the
//! product identifier in a `data-asin` attribute; nodes with an empty
//! attribute are grid placeholders, not listings, and are filtered out
//! before ranks are assigned. An empty extraction is a legitimate result
//! here — Amazon markup shifts often and zero books is not by itself a
//! failure.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use scraper::{Html, Selector};
use url::Url;

use crate::domain::{CountryCode, ScrapedBook, ScraperResult};
use crate::infrastructure::http_client::{Charset, HttpClient, ACCEPT_DETAIL, ACCEPT_LISTING};
use crate::scraping::detail::enrich_descriptions;
use crate::scraping::urls::{ensure_https, join_path};
use crate::scraping::{
    first_attr, first_inner_html, first_text, meta_content, sanitize_description, SiteScraper,
    MAX_LISTING_ITEMS, UNKNOWN_AUTHOR,
};

const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";
const DETAIL_BATCH_PAUSE: Duration = Duration::from_millis(1500);

/// The three Amazon storefronts the pipeline ingests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmazonMarket {
    Japan,
    UnitedStates,
    UnitedKingdom,
}

impl AmazonMarket {
    pub fn country(self) -> CountryCode {
        match self {
            AmazonMarket::Japan => CountryCode::JP,
            AmazonMarket::UnitedStates => CountryCode::US,
            AmazonMarket::UnitedKingdom => CountryCode::UK,
        }
    }

    pub fn currency(self) -> &'static str {
        match self {
            AmazonMarket::Japan => "JPY",
            AmazonMarket::UnitedStates => "USD",
            AmazonMarket::UnitedKingdom => "GBP",
        }
    }

    fn base_url(self) -> &'static str {
        match self {
            AmazonMarket::Japan => "https://www.amazon.co.jp",
            AmazonMarket::UnitedStates => "https://www.amazon.com",
            AmazonMarket::UnitedKingdom => "https://www.amazon.co.uk",
        }
    }

    fn bestseller_url(self) -> String {
        format!("{}/gp/bestsellers/books", self.base_url())
    }
}

pub struct AmazonScraper {
    client: Arc<HttpClient>,
    market: AmazonMarket,
    base: Url,
    detail_pause: Duration,
}

impl AmazonScraper {
    pub fn new(client: Arc<HttpClient>, market: AmazonMarket) -> Self {
        let base = Url::parse(market.base_url()).expect("market base URLs are valid");
        Self {
            client,
            market,
            base,
            detail_pause: DETAIL_BATCH_PAUSE,
        }
    }

    async fn scrape_inner(&self) -> ScraperResult {
        let country = self.market.country();

        let body = match self
            .client
            .get_html(
                &self.market.bestseller_url(),
                ACCEPT_LISTING,
                ACCEPT_LANGUAGE,
                Charset::Utf8,
            )
            .await
        {
            Ok(body) => body,
            Err(err) => return ScraperResult::failure(country, err.to_string()),
        };

        let mut result = listing_result(&body, self.market, &self.base);

        enrich_descriptions(&mut result.books, self.detail_pause, |url| {
            self.fetch_description(url)
        })
        .await;

        tracing::info!(
            country = %country,
            count = result.books.len(),
            "Amazon: extracted bestseller list"
        );
        result
    }

    async fn fetch_description(&self, detail_url: String) -> Option<String> {
        let body = self
            .client
            .get_html(&detail_url, ACCEPT_DETAIL, ACCEPT_LANGUAGE, Charset::Utf8)
            .await
            .ok()?;
        extract_description(&body)
    }
}

#[async_trait]
impl SiteScraper for AmazonScraper {
    fn country(&self) -> CountryCode {
        self.market.country()
    }

    async fn scrape(&self) -> ScraperResult {
        self.scrape_inner().await
    }
}

/// Extraction wrapped as a result. Unlike YES24 there is no empty-result
/// escalation: Amazon markup shifts often and zero extracted books is a
/// successful (empty) listing, not a failure.
fn listing_result(body: &str, market: AmazonMarket, base: &Url) -> ScraperResult {
    ScraperResult::ok(market.country(), extract_listing(body, market, base))
}

fn extract_listing(body: &str, market: AmazonMarket, base: &Url) -> Vec<ScrapedBook> {
    let document = Html::parse_document(body);
    let item_selector = Selector::parse("[data-asin]").unwrap();
    let mut books = Vec::new();

    let items = document
        .select(&item_selector)
        .filter(|el| el.value().attr("data-asin").is_some_and(|v| !v.is_empty()))
        .take(MAX_LISTING_ITEMS);

    for (index, element) in items.enumerate() {
        let asin = match element.value().attr("data-asin") {
            Some(asin) => asin,
            None => continue,
        };

        let Some(title) = first_text(
            &element,
            ".p13n-sc-truncated, ._cDEzb_p13n-sc-css-line-clamp-1_1Fn1y",
        )
        .or_else(|| first_text(&element, "span.a-size-base-plus")) else {
            continue;
        };

        let author = first_text(&element, ".a-row.a-size-small .a-link-child")
            .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());

        // Price is split into whole and fraction fragments on the page,
        // e.g. "14." + "99".
        let price = first_text(&element, ".a-price-whole").map(|whole| {
            let fraction = first_text(&element, ".a-price-fraction").unwrap_or_default();
            format!("{whole}{fraction}")
        });

        let cover_image_url = first_attr(&element, "img", "src").map(|url| ensure_https(&url));

        books.push(ScrapedBook {
            rank: index as u32 + 1,
            title,
            author,
            publisher: None,
            price,
            currency: Some(market.currency().to_string()),
            cover_image_url,
            detail_url: join_path(base, &format!("dp/{asin}")),
            isbn: Some(asin.to_string()),
            description: None,
            category: None,
        });
    }

    books
}

/// Book description candidates in priority order, ending at the meta
/// description tag.
fn extract_description(body: &str) -> Option<String> {
    let document = Html::parse_document(body);

    let raw = first_inner_html(&document, "#bookDescription_feature_div .a-expander-content span")
        .or_else(|| first_inner_html(&document, "#bookDescription_feature_div noscript"))
        .or_else(|| first_inner_html(&document, "#bookDescription_feature_div"))
        .or_else(|| first_inner_html(&document, "#productDescription"))
        .or_else(|| first_inner_html(&document, ".book-description"))
        .or_else(|| meta_content(&document, r#"meta[name="description"]"#));

    sanitize_description(raw.as_deref())
}
