//! End-to-end ingestion runs against an in-memory database, with stub
//! adapters standing in for the live sites.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use bookrank_worker::application::{IngestOrchestrator, OrchestratorConfig};
use bookrank_worker::domain::{CountryCode, ScrapedBook, ScraperResult};
use bookrank_worker::infrastructure::{BookRepository, DatabaseConnection};
use bookrank_worker::scheduler::{ScrapeScheduler, TriggerOutcome};
use bookrank_worker::scraping::{ScraperRegistry, SiteScraper};

fn book(rank: u32, isbn: &str, title: &str) -> ScrapedBook {
    ScrapedBook {
        rank,
        title: title.to_string(),
        author: "Stub Author".to_string(),
        publisher: Some("Stub House".to_string()),
        price: Some("9.99".to_string()),
        currency: Some("USD".to_string()),
        cover_image_url: None,
        detail_url: format!("https://books.example.com/{isbn}"),
        isbn: Some(isbn.to_string()),
        description: None,
        category: None,
    }
}

/// Adapter returning a fixed result, counting invocations.
struct FixedScraper {
    country: CountryCode,
    books: Vec<ScrapedBook>,
    error: Option<String>,
    calls: AtomicU32,
}

impl FixedScraper {
    fn ok(country: CountryCode, books: Vec<ScrapedBook>) -> Arc<Self> {
        Arc::new(Self {
            country,
            books,
            error: None,
            calls: AtomicU32::new(0),
        })
    }

    fn failing(country: CountryCode, error: &str) -> Arc<Self> {
        Arc::new(Self {
            country,
            books: Vec::new(),
            error: Some(error.to_string()),
            calls: AtomicU32::new(0),
        })
    }
}

#[async_trait]
impl SiteScraper for FixedScraper {
    fn country(&self) -> CountryCode {
        self.country
    }

    async fn scrape(&self) -> ScraperResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.error {
            Some(message) => ScraperResult::failure(self.country, message.clone()),
            None => ScraperResult::ok(self.country, self.books.clone()),
        }
    }
}

/// Adapter that parks until released, so a run can be held in flight.
struct BlockingScraper {
    country: CountryCode,
    release: Arc<Notify>,
}

#[async_trait]
impl SiteScraper for BlockingScraper {
    fn country(&self) -> CountryCode {
        self.country
    }

    async fn scrape(&self) -> ScraperResult {
        self.release.notified().await;
        ScraperResult::ok(self.country, vec![book(1, "blocked-1", "Held Book")])
    }
}

async fn in_memory_setup() -> (DatabaseConnection, BookRepository) {
    let db = DatabaseConnection::in_memory().await.unwrap();
    db.migrate().await.unwrap();
    db.seed_countries().await.unwrap();
    let repo = BookRepository::new(Arc::new(db.pool().clone()));
    (db, repo)
}

fn orchestrator(registry: ScraperRegistry, repo: BookRepository) -> IngestOrchestrator {
    IngestOrchestrator::new(
        registry,
        repo,
        OrchestratorConfig {
            country_delay: Duration::ZERO,
        },
    )
}

#[tokio::test]
async fn failing_country_does_not_stop_the_run() {
    let (db, repo) = in_memory_setup().await;

    let jp = FixedScraper::failing(CountryCode::JP, "HTTP 403: Forbidden");
    let registry = ScraperRegistry::new([
        FixedScraper::ok(CountryCode::KR, vec![book(1, "kr-1", "서울의 책")]) as Arc<dyn SiteScraper>,
        Arc::clone(&jp) as Arc<dyn SiteScraper>,
        FixedScraper::ok(CountryCode::CN, vec![book(1, "cn-1", "北京之书")]),
        FixedScraper::ok(CountryCode::US, vec![book(1, "us-1", "The Book")]),
        FixedScraper::ok(CountryCode::UK, vec![book(1, "uk-1", "A Book")]),
    ]);

    orchestrator(registry, repo).run_all().await;

    assert_eq!(jp.calls.load(Ordering::SeqCst), 1);

    let logs: Vec<(String, String, i64, Option<String>)> = sqlx::query_as(
        "SELECT country_code, status, books_count, error_message FROM scrape_logs ORDER BY id",
    )
    .fetch_all(db.pool())
    .await
    .unwrap();

    assert_eq!(logs.len(), 5);
    let codes: Vec<&str> = logs.iter().map(|l| l.0.as_str()).collect();
    assert_eq!(codes, ["KR", "JP", "CN", "US", "UK"]);

    let jp_log = &logs[1];
    assert_eq!(jp_log.1, "failed");
    assert_eq!(jp_log.2, 0);
    assert_eq!(jp_log.3.as_deref(), Some("HTTP 403: Forbidden"));
    for log in [&logs[0], &logs[2], &logs[3], &logs[4]] {
        assert_eq!(log.1, "success");
        assert_eq!(log.2, 1);
        assert_eq!(log.3, None);
    }

    // The failed country persisted nothing; the other four did.
    let book_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(book_count, 4);
}

#[tokio::test]
async fn same_day_rerun_keeps_one_ranking_row_per_book() {
    let (db, repo) = in_memory_setup().await;

    let first = ScraperRegistry::new([
        FixedScraper::ok(CountryCode::KR, vec![book(3, "977", "불변의 책")]) as Arc<dyn SiteScraper>,
    ]);
    orchestrator(first, repo.clone()).run_all().await;

    // Same book climbs to rank 1 on a rerun the same day.
    let second = ScraperRegistry::new([
        FixedScraper::ok(CountryCode::KR, vec![book(1, "977", "불변의 책")]) as Arc<dyn SiteScraper>,
    ]);
    orchestrator(second, repo).run_all().await;

    let rankings: Vec<(i64,)> = sqlx::query_as("SELECT rank FROM rankings")
        .fetch_all(db.pool())
        .await
        .unwrap();
    assert_eq!(rankings, vec![(1,)]);

    let book_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(book_count, 1);
}

#[tokio::test]
async fn manual_trigger_is_deduplicated_while_a_run_is_in_flight() {
    let (_db, repo) = in_memory_setup().await;

    let release = Arc::new(Notify::new());
    let registry = ScraperRegistry::new([Arc::new(BlockingScraper {
        country: CountryCode::KR,
        release: Arc::clone(&release),
    }) as Arc<dyn SiteScraper>]);

    let scheduler = Arc::new(ScrapeScheduler::new(Arc::new(orchestrator(registry, repo))));

    assert_eq!(scheduler.trigger_manual(), TriggerOutcome::Started);

    // Let the spawned run reach the blocking adapter.
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(scheduler.is_running());
    assert_eq!(scheduler.trigger_manual(), TriggerOutcome::AlreadyRunning);

    release.notify_one();
    for _ in 0..100 {
        if !scheduler.is_running() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(!scheduler.is_running(), "run should have finished");

    // Once the guard is released a new run may start.
    release.notify_one();
    assert_eq!(scheduler.trigger_manual(), TriggerOutcome::Started);
}
