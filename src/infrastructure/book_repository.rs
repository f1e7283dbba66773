//! Repository for books, ranking snapshots, and scrape audit logs.
//!
//! Books are keyed by `(country_id, isbn)` where `isbn` is the site-native
//! identifier when available and a synthesized `no-isbn-` key otherwise.
//! Rankings are day-granular snapshots keyed by
//! `(book_id, country_id, ranking_date)`; re-running on the same day
//! overwrites that day's rank instead of accumulating duplicates.

use anyhow::Result;
use chrono::NaiveDate;
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::domain::{Country, CountryCode, ScrapeLog, ScrapeStatus, ScrapedBook};

/// Books without a native identifier are deduplicated by the first 50
/// characters of their title. Two same-titled no-isbn books in one country
/// therefore collapse into one row; accepted limitation.
pub fn fallback_isbn(title: &str) -> String {
    let truncated: String = title.chars().take(50).collect();
    format!("no-isbn-{truncated}")
}

#[derive(Clone)]
pub struct BookRepository {
    pool: Arc<SqlitePool>,
}

impl BookRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    pub async fn find_country(&self, code: CountryCode) -> Result<Option<Country>> {
        let country = sqlx::query_as::<_, Country>(
            "SELECT id, code, name_en, bookstore_name, bookstore_url FROM countries WHERE code = ?",
        )
        .bind(code.as_str())
        .fetch_optional(&*self.pool)
        .await?;
        Ok(country)
    }

    /// Insert or update a book, returning its row id. Matching rows are
    /// overwritten with the latest scrape in full.
    pub async fn upsert_book(&self, country_id: i64, book: &ScrapedBook) -> Result<i64> {
        let isbn = book
            .isbn
            .clone()
            .unwrap_or_else(|| fallback_isbn(&book.title));

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO books
                (country_id, isbn, title, author_name, publisher, price, currency,
                 cover_image_url, detail_url, description, category)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (country_id, isbn) DO UPDATE SET
                title = excluded.title,
                author_name = excluded.author_name,
                publisher = excluded.publisher,
                price = excluded.price,
                currency = excluded.currency,
                cover_image_url = excluded.cover_image_url,
                detail_url = excluded.detail_url,
                description = excluded.description,
                category = excluded.category,
                updated_at = CURRENT_TIMESTAMP
            RETURNING id
            "#,
        )
        .bind(country_id)
        .bind(&isbn)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.publisher)
        .bind(&book.price)
        .bind(&book.currency)
        .bind(&book.cover_image_url)
        .bind(&book.detail_url)
        .bind(&book.description)
        .bind(&book.category)
        .fetch_one(&*self.pool)
        .await?;

        Ok(id)
    }

    /// Record (or overwrite) one day's rank for a book.
    pub async fn upsert_ranking(
        &self,
        book_id: i64,
        country_id: i64,
        rank: u32,
        ranking_date: NaiveDate,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO rankings (book_id, country_id, rank, ranking_date)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (book_id, country_id, ranking_date) DO UPDATE SET
                rank = excluded.rank
            "#,
        )
        .bind(book_id)
        .bind(country_id)
        .bind(rank as i64)
        .bind(ranking_date)
        .execute(&*self.pool)
        .await?;

        Ok(())
    }

    /// Append one audit row for a country's pass. Never updated afterwards.
    pub async fn insert_scrape_log(
        &self,
        country: CountryCode,
        status: ScrapeStatus,
        books_count: i64,
        error_message: Option<&str>,
        duration_ms: i64,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO scrape_logs (country_code, status, books_count, error_message, duration_ms)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(country.as_str())
        .bind(status.as_str())
        .bind(books_count)
        .bind(error_message)
        .bind(duration_ms)
        .execute(&*self.pool)
        .await?;

        Ok(())
    }

    /// The most recent audit rows, newest first. Operational surface for
    /// checking how the last runs went.
    pub async fn latest_scrape_logs(&self, limit: i64) -> Result<Vec<ScrapeLog>> {
        let logs = sqlx::query_as::<_, ScrapeLog>(
            r#"
            SELECT id, country_code, status, books_count, error_message, duration_ms, created_at
            FROM scrape_logs
            ORDER BY id DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&*self.pool)
        .await?;

        Ok(logs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::DatabaseConnection;

    fn sample_book(isbn: Option<&str>, title: &str, rank: u32) -> ScrapedBook {
        ScrapedBook {
            rank,
            title: title.to_string(),
            author: "Author".to_string(),
            publisher: None,
            price: Some("12900".to_string()),
            currency: Some("KRW".to_string()),
            cover_image_url: Some("https://img.example.com/x.jpg".to_string()),
            detail_url: "https://www.yes24.com/Product/Goods/1".to_string(),
            isbn: isbn.map(str::to_string),
            description: None,
            category: None,
        }
    }

    async fn seeded_repo() -> (DatabaseConnection, BookRepository, i64) {
        let db = DatabaseConnection::in_memory().await.unwrap();
        db.migrate().await.unwrap();
        db.seed_countries().await.unwrap();
        let repo = BookRepository::new(Arc::new(db.pool().clone()));
        let country = repo
            .find_country(CountryCode::KR)
            .await
            .unwrap()
            .expect("KR seeded");
        let id = country.id;
        (db, repo, id)
    }

    #[test]
    fn fallback_isbn_truncates_to_fifty_characters() {
        let title = "a".repeat(80);
        let key = fallback_isbn(&title);
        assert_eq!(key, format!("no-isbn-{}", "a".repeat(50)));

        // Multibyte titles truncate on character boundaries.
        let hangul = "한".repeat(60);
        let key = fallback_isbn(&hangul);
        assert_eq!(key, format!("no-isbn-{}", "한".repeat(50)));
    }

    #[tokio::test]
    async fn upsert_book_overwrites_instead_of_duplicating() {
        let (_db, repo, country_id) = seeded_repo().await;

        let first = repo
            .upsert_book(country_id, &sample_book(Some("111"), "Old Title", 1))
            .await
            .unwrap();
        let second = repo
            .upsert_book(country_id, &sample_book(Some("111"), "New Title", 1))
            .await
            .unwrap();
        assert_eq!(first, second);

        let (count, title): (i64, String) =
            sqlx::query_as("SELECT COUNT(*), MAX(title) FROM books")
                .fetch_one(&*repo.pool)
                .await
                .unwrap();
        assert_eq!(count, 1);
        assert_eq!(title, "New Title");
    }

    #[tokio::test]
    async fn same_day_ranking_rerun_overwrites_rank() {
        let (_db, repo, country_id) = seeded_repo().await;
        let book_id = repo
            .upsert_book(country_id, &sample_book(Some("222"), "Book", 3))
            .await
            .unwrap();

        let today = NaiveDate::from_ymd_opt(2026, 8, 21).unwrap();
        repo.upsert_ranking(book_id, country_id, 3, today).await.unwrap();
        repo.upsert_ranking(book_id, country_id, 7, today).await.unwrap();

        let rows: Vec<(i64,)> = sqlx::query_as("SELECT rank FROM rankings")
            .fetch_all(&*repo.pool)
            .await
            .unwrap();
        assert_eq!(rows, vec![(7,)]);
    }

    #[tokio::test]
    async fn distinct_days_accumulate_snapshots() {
        let (_db, repo, country_id) = seeded_repo().await;
        let book_id = repo
            .upsert_book(country_id, &sample_book(None, "No Isbn Book", 1))
            .await
            .unwrap();

        let tue = NaiveDate::from_ymd_opt(2026, 8, 18).unwrap();
        let fri = NaiveDate::from_ymd_opt(2026, 8, 21).unwrap();
        repo.upsert_ranking(book_id, country_id, 1, tue).await.unwrap();
        repo.upsert_ranking(book_id, country_id, 2, fri).await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM rankings")
            .fetch_one(&*repo.pool)
            .await
            .unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn scrape_log_rows_append() {
        let (_db, repo, _country_id) = seeded_repo().await;

        repo.insert_scrape_log(CountryCode::KR, ScrapeStatus::Success, 20, None, 1234)
            .await
            .unwrap();
        repo.insert_scrape_log(
            CountryCode::JP,
            ScrapeStatus::Failed,
            0,
            Some("HTTP 403: Forbidden"),
            88,
        )
        .await
        .unwrap();

        let logs = repo.latest_scrape_logs(10).await.unwrap();
        assert_eq!(logs.len(), 2);

        // Newest first.
        assert_eq!(logs[0].country_code, "JP");
        assert_eq!(logs[0].status, "failed");
        assert_eq!(logs[0].books_count, 0);
        assert_eq!(logs[0].error_message.as_deref(), Some("HTTP 403: Forbidden"));

        assert_eq!(logs[1].country_code, "KR");
        assert_eq!(logs[1].status, "success");
        assert_eq!(logs[1].books_count, 20);
        assert_eq!(logs[1].error_message, None);
    }

    #[tokio::test]
    async fn latest_scrape_logs_respects_the_limit() {
        let (_db, repo, _country_id) = seeded_repo().await;

        for country in [CountryCode::KR, CountryCode::JP, CountryCode::CN] {
            repo.insert_scrape_log(country, ScrapeStatus::Success, 5, None, 100)
                .await
                .unwrap();
        }

        let logs = repo.latest_scrape_logs(2).await.unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].country_code, "CN");
        assert_eq!(logs[1].country_code, "JP");
    }
}
