//! YES24 bestseller adapter (Korea).
//!
//! The primary extraction pass keys off `li[data-goods-no]` list items;
//! when the site serves the alternate layout, a fallback pass keys off
//! `/Product/Goods/{n}` anchors instead. YES24 always lists at least one
//! book when reachable, so zero extracted books after both passes is
//! itself a failure (`"No books found"`) rather than a legitimate empty
//! result.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

use crate::domain::{CountryCode, ScrapedBook, ScraperResult};
use crate::infrastructure::http_client::{Charset, HttpClient, ACCEPT_DETAIL, ACCEPT_LISTING};
use crate::scraping::detail::enrich_descriptions;
use crate::scraping::urls::ensure_https;
use crate::scraping::{
    first_attr, first_text, leading_number, sanitize_description, SiteScraper, MAX_LISTING_ITEMS,
    UNKNOWN_AUTHOR,
};

const BESTSELLER_URL: &str = "https://www.yes24.com/Product/Category/BestSeller";
const ACCEPT_LANGUAGE_LISTING: &str = "ko-KR,ko;q=0.9,en-US;q=0.8,en;q=0.7";
const ACCEPT_LANGUAGE_DETAIL: &str = "ko-KR,ko;q=0.9";
const DETAIL_BATCH_PAUSE: Duration = Duration::from_millis(1000);

static GOODS_HREF_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"/Goods/(\d+)").unwrap());
static KOREAN_AUTHOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"저[^|]+").unwrap());

pub struct Yes24Scraper {
    client: Arc<HttpClient>,
    detail_pause: Duration,
}

impl Yes24Scraper {
    pub fn new(client: Arc<HttpClient>) -> Self {
        Self {
            client,
            detail_pause: DETAIL_BATCH_PAUSE,
        }
    }

    async fn scrape_inner(&self) -> ScraperResult {
        let body = match self
            .client
            .get_html(BESTSELLER_URL, ACCEPT_LISTING, ACCEPT_LANGUAGE_LISTING, Charset::Utf8)
            .await
        {
            Ok(body) => body,
            Err(err) => return ScraperResult::failure(CountryCode::KR, err.to_string()),
        };

        let mut result = listing_result(&body);
        if !result.success {
            return result;
        }

        enrich_descriptions(&mut result.books, self.detail_pause, |url| {
            self.fetch_description(url)
        })
        .await;

        tracing::info!(count = result.books.len(), "KR (YES24): extracted bestseller list");
        result
    }

    async fn fetch_description(&self, detail_url: String) -> Option<String> {
        let body = self
            .client
            .get_html(&detail_url, ACCEPT_DETAIL, ACCEPT_LANGUAGE_DETAIL, Charset::Utf8)
            .await
            .ok()?;
        extract_description(&body)
    }
}

#[async_trait]
impl SiteScraper for Yes24Scraper {
    fn country(&self) -> CountryCode {
        CountryCode::KR
    }

    async fn scrape(&self) -> ScraperResult {
        self.scrape_inner().await
    }
}

/// Both extraction passes plus the empty-result escalation. YES24 always
/// lists books when reachable, so zero extracted books is a failure, not
/// a legitimate empty listing.
fn listing_result(body: &str) -> ScraperResult {
    let mut books = extract_listing(body);
    if books.is_empty() {
        books = extract_listing_fallback(body);
    }
    if books.is_empty() {
        return ScraperResult::failure(CountryCode::KR, "No books found");
    }
    ScraperResult::ok(CountryCode::KR, books)
}

/// Primary pass over `li[data-goods-no]` items.
fn extract_listing(body: &str) -> Vec<ScrapedBook> {
    let document = Html::parse_document(body);
    let item_selector = Selector::parse("li[data-goods-no]").unwrap();
    let mut books = Vec::new();

    let items = document
        .select(&item_selector)
        .filter(|el| {
            el.value()
                .attr("data-goods-no")
                .is_some_and(|v| !v.is_empty())
        })
        .take(MAX_LISTING_ITEMS);

    for (index, element) in items.enumerate() {
        let goods_no = match element.value().attr("data-goods-no") {
            Some(goods_no) => goods_no,
            None => continue,
        };

        let Some(title) = first_text(&element, "a.gd_name") else {
            continue;
        };

        let rank = first_text(&element, ".ico.rank")
            .and_then(|label| leading_number(&label))
            .unwrap_or(index as u32 + 1);

        let cover_image_url = first_attr(&element, "img.lazy", "data-original")
            .or_else(|| first_attr(&element, "img.lazy", "src"))
            .map(|url| ensure_https(&url));

        let author = first_text(&element, ".info_auth a, .info_pubGrp .info_auth")
            .or_else(|| {
                // No dedicated author node; pull the `저...` segment out of
                // the combined info row.
                let info = first_text(&element, ".info_row")?;
                let segment = KOREAN_AUTHOR_RE.find(&info)?;
                let author = segment.as_str().replacen('저', "", 1).trim().to_string();
                (!author.is_empty()).then_some(author)
            })
            .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());

        let publisher = first_text(&element, ".info_pub a");

        let price = first_text(&element, ".info_price .txt_num em, .yes_m")
            .map(|text| text.chars().filter(char::is_ascii_digit).collect::<String>())
            .filter(|digits| !digits.is_empty());

        books.push(ScrapedBook {
            rank,
            title,
            author,
            publisher,
            price,
            currency: Some("KRW".to_string()),
            cover_image_url,
            detail_url: detail_url_for(goods_no),
            isbn: Some(goods_no.to_string()),
            description: None,
            category: None,
        });
    }

    books
}

/// Fallback pass for the alternate page layout: item units identified by
/// their `/Product/Goods/{n}` anchors.
fn extract_listing_fallback(body: &str) -> Vec<ScrapedBook> {
    let document = Html::parse_document(body);
    let item_selector = Selector::parse(".itemUnit, .goods_item").unwrap();
    let mut books = Vec::new();

    for (index, element) in document
        .select(&item_selector)
        .take(MAX_LISTING_ITEMS)
        .enumerate()
    {
        let href = first_attr(&element, r#"a[href*="/Product/Goods/"]"#, "href");
        let Some(goods_no) = href
            .as_deref()
            .and_then(|href| GOODS_HREF_RE.captures(href))
            .map(|caps| caps[1].to_string())
        else {
            continue;
        };

        let Some(title) = first_text(&element, ".gd_name")
            .or_else(|| first_text(&element, ".goods_name"))
            .or_else(|| first_text(&element, r#"a[href*="/Product/Goods/"]"#))
        else {
            continue;
        };

        let cover_image_url = first_attr(&element, "img", "data-original")
            .or_else(|| first_attr(&element, "img", "src"))
            .map(|url| ensure_https(&url));

        books.push(ScrapedBook {
            rank: index as u32 + 1,
            title,
            author: UNKNOWN_AUTHOR.to_string(),
            publisher: None,
            price: None,
            currency: Some("KRW".to_string()),
            cover_image_url,
            detail_url: detail_url_for(&goods_no),
            isbn: Some(goods_no),
            description: None,
            category: None,
        });
    }

    books
}

fn detail_url_for(goods_no: &str) -> String {
    format!("https://www.yes24.com/Product/Goods/{goods_no}")
}

/// Long-form description from the detail page: the book-intro content
/// areas in priority order, then the meta description tags.
fn extract_description(body: &str) -> Option<String> {
    let document = Html::parse_document(body);

    let raw = crate::scraping::first_inner_html(
        &document,
        ".infoWrap_txt, .txtContentText, #infoset_introduce .infoWrap_txt, #infoset_introduce, \
         .infoWrap_txt .txtContentText, .Ere_prod_mconts_LS .infoWrap_txt",
    )
    .or_else(|| crate::scraping::meta_content(&document, r#"meta[property="og:description"]"#))
    .or_else(|| crate::scraping::meta_content(&document, r#"meta[name="description"]"#));

    sanitize_description(raw.as_deref())
}
