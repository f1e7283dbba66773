//! SQLite connection, schema creation, and country seed data.

use anyhow::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;

pub struct DatabaseConnection {
    pool: SqlitePool,
}

impl DatabaseConnection {
    pub async fn new(database_url: &str) -> Result<Self> {
        // sqlx will not create the database file on its own.
        let db_path = database_url
            .trim_start_matches("sqlite://")
            .trim_start_matches("sqlite:");

        if !db_path.contains(":memory:") && !Path::new(db_path).exists() {
            if let Some(parent) = Path::new(db_path).parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::File::create(db_path)?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// In-memory database on a single connection, for tests.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create the ingestion-side schema. Idempotent.
    pub async fn migrate(&self) -> Result<()> {
        let create_countries_sql = r#"
            CREATE TABLE IF NOT EXISTS countries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                code TEXT NOT NULL UNIQUE,
                name_en TEXT NOT NULL,
                bookstore_name TEXT NOT NULL,
                bookstore_url TEXT NOT NULL
            )
        "#;

        let create_books_sql = r#"
            CREATE TABLE IF NOT EXISTS books (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                country_id INTEGER NOT NULL,
                isbn TEXT NOT NULL,
                title TEXT NOT NULL,
                author_name TEXT NOT NULL,
                publisher TEXT,
                price TEXT,
                currency TEXT,
                cover_image_url TEXT,
                detail_url TEXT NOT NULL,
                description TEXT,
                category TEXT,
                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                UNIQUE (country_id, isbn),
                FOREIGN KEY (country_id) REFERENCES countries (id) ON DELETE CASCADE
            )
        "#;

        let create_rankings_sql = r#"
            CREATE TABLE IF NOT EXISTS rankings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                book_id INTEGER NOT NULL,
                country_id INTEGER NOT NULL,
                rank INTEGER NOT NULL,
                ranking_date DATE NOT NULL,
                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                UNIQUE (book_id, country_id, ranking_date),
                FOREIGN KEY (book_id) REFERENCES books (id) ON DELETE CASCADE,
                FOREIGN KEY (country_id) REFERENCES countries (id) ON DELETE CASCADE
            )
        "#;

        let create_scrape_logs_sql = r#"
            CREATE TABLE IF NOT EXISTS scrape_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                country_code TEXT NOT NULL,
                status TEXT NOT NULL,
                books_count INTEGER NOT NULL DEFAULT 0,
                error_message TEXT,
                duration_ms INTEGER NOT NULL,
                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
        "#;

        let create_indexes_sql = r#"
            CREATE INDEX IF NOT EXISTS idx_books_country_id ON books (country_id);
            CREATE INDEX IF NOT EXISTS idx_rankings_country_date ON rankings (country_id, ranking_date);
            CREATE INDEX IF NOT EXISTS idx_scrape_logs_created_at ON scrape_logs (created_at);
        "#;

        sqlx::query(create_countries_sql).execute(&self.pool).await?;
        sqlx::query(create_books_sql).execute(&self.pool).await?;
        sqlx::query(create_rankings_sql).execute(&self.pool).await?;
        sqlx::query(create_scrape_logs_sql).execute(&self.pool).await?;
        sqlx::query(create_indexes_sql).execute(&self.pool).await?;

        Ok(())
    }

    /// Upsert the five supported markets. The orchestrator treats a
    /// missing country row as a configuration failure, so seeding runs
    /// at every startup.
    pub async fn seed_countries(&self) -> Result<()> {
        const COUNTRIES: [(&str, &str, &str, &str); 5] = [
            ("KR", "South Korea", "YES24", "https://www.yes24.com"),
            ("JP", "Japan", "Amazon Japan", "https://www.amazon.co.jp"),
            ("CN", "China", "Dangdang", "https://www.dangdang.com"),
            ("US", "United States", "Amazon US", "https://www.amazon.com"),
            ("UK", "United Kingdom", "Amazon UK", "https://www.amazon.co.uk"),
        ];

        for (code, name_en, bookstore_name, bookstore_url) in COUNTRIES {
            sqlx::query(
                r#"
                INSERT INTO countries (code, name_en, bookstore_name, bookstore_url)
                VALUES (?, ?, ?, ?)
                ON CONFLICT (code) DO UPDATE SET
                    name_en = excluded.name_en,
                    bookstore_name = excluded.bookstore_name,
                    bookstore_url = excluded.bookstore_url
                "#,
            )
            .bind(code)
            .bind(name_en)
            .bind(bookstore_name)
            .bind(bookstore_url)
            .execute(&self.pool)
            .await?;
        }

        Ok(())
    }
}
