//! Dangdang bestseller adapter (China).
//!
//! Dangdang serves GBK-encoded pages, so both the listing and the detail
//! fetches decode the byte stream as GBK before parsing. The site exposes
//! no usable product identifier on the listing, so `isbn` stays unset and
//! persistence falls back to the synthesized title key.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use scraper::{Html, Selector};

use crate::domain::{CountryCode, ScrapedBook, ScraperResult};
use crate::infrastructure::http_client::{Charset, HttpClient, ACCEPT_DETAIL, ACCEPT_LISTING};
use crate::scraping::detail::enrich_descriptions;
use crate::scraping::urls::ensure_https;
use crate::scraping::{
    all_text, first_attr, first_inner_html, first_text, last_text, meta_content,
    sanitize_description, SiteScraper, MAX_LISTING_ITEMS, UNKNOWN_AUTHOR,
};

const BESTSELLER_URL: &str =
    "http://bang.dangdang.com/books/bestsellers/01.00.00.00.00.00-24hours-0-0-1-1";
const ACCEPT_LANGUAGE_LISTING: &str = "zh-CN,zh;q=0.9,en;q=0.8";
const ACCEPT_LANGUAGE_DETAIL: &str = "zh-CN,zh;q=0.9";
const DETAIL_BATCH_PAUSE: Duration = Duration::from_millis(1000);

pub struct DangdangScraper {
    client: Arc<HttpClient>,
    detail_pause: Duration,
}

impl DangdangScraper {
    pub fn new(client: Arc<HttpClient>) -> Self {
        Self {
            client,
            detail_pause: DETAIL_BATCH_PAUSE,
        }
    }

    async fn scrape_inner(&self) -> ScraperResult {
        let body = match self
            .client
            .get_html(
                BESTSELLER_URL,
                ACCEPT_LISTING,
                ACCEPT_LANGUAGE_LISTING,
                Charset::Gbk,
            )
            .await
        {
            Ok(body) => body,
            Err(err) => return ScraperResult::failure(CountryCode::CN, err.to_string()),
        };

        let mut books = extract_listing(&body);

        enrich_descriptions(&mut books, self.detail_pause, |url| self.fetch_description(url))
            .await;

        tracing::info!(count = books.len(), "CN (Dangdang): extracted bestseller list");
        ScraperResult::ok(CountryCode::CN, books)
    }

    async fn fetch_description(&self, detail_url: String) -> Option<String> {
        if detail_url.is_empty() {
            return None;
        }
        let url = ensure_https(&detail_url);
        let body = self
            .client
            .get_html(&url, ACCEPT_DETAIL, ACCEPT_LANGUAGE_DETAIL, Charset::Gbk)
            .await
            .ok()?;
        extract_description(&body)
    }
}

#[async_trait]
impl SiteScraper for DangdangScraper {
    fn country(&self) -> CountryCode {
        CountryCode::CN
    }

    async fn scrape(&self) -> ScraperResult {
        self.scrape_inner().await
    }
}

fn extract_listing(body: &str) -> Vec<ScrapedBook> {
    let document = Html::parse_document(body);
    let item_selector = Selector::parse(".bang_list li, .list_box li").unwrap();
    let mut books = Vec::new();

    for (index, element) in document
        .select(&item_selector)
        .take(MAX_LISTING_ITEMS)
        .enumerate()
    {
        let Some(title) = first_text(&element, ".name a, .title a") else {
            continue;
        };

        let author =
            first_text(&element, ".publisher_info a, .author a").unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());
        let publisher = last_text(&element, ".publisher_info a, .press a");

        let price = all_text(&element, ".price .price_n, .price_m")
            .map(|text| {
                text.chars()
                    .filter(|c| c.is_ascii_digit() || *c == '.')
                    .collect::<String>()
            })
            .filter(|digits| !digits.is_empty());

        let cover_image_url = first_attr(&element, "img", "src").map(|url| ensure_https(&url));

        let detail_url = first_attr(&element, ".name a, .title a", "href").unwrap_or_default();

        books.push(ScrapedBook {
            rank: index as u32 + 1,
            title,
            author,
            publisher,
            price,
            currency: Some("CNY".to_string()),
            cover_image_url,
            detail_url,
            isbn: None,
            description: None,
            category: None,
        });
    }

    books
}

fn extract_description(body: &str) -> Option<String> {
    let document = Html::parse_document(body);

    let raw = first_inner_html(
        &document,
        ".descrip, #content .descrip, .msg_desc, .product_info .descrip, #detail_describe",
    )
    .or_else(|| meta_content(&document, r#"meta[name="description"]"#));

    sanitize_description(raw.as_deref())
}
