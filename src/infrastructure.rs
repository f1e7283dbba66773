//! Infrastructure concerns: configuration, logging, HTTP, persistence.

pub mod book_repository;
pub mod config;
pub mod database_connection;
pub mod http_client;
pub mod logging;

pub use book_repository::BookRepository;
pub use config::AppConfig;
pub use database_connection::DatabaseConnection;
pub use http_client::{Charset, FetchError, HttpClient, HttpClientConfig};
pub use logging::init_logging;
