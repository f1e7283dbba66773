//! Detail-page description enrichment shared by all adapters.
//!
//! Descriptions are fetched for the full extracted list in batches of 5
//! concurrent requests with a site-specific pause between batches. A
//! failed or empty fetch leaves the book's description unset; enrichment
//! never fails the adapter run.

use std::future::Future;
use std::time::Duration;

use futures::future::join_all;

use crate::domain::ScrapedBook;

/// Concurrent detail fetches per batch.
pub const DETAIL_BATCH_SIZE: usize = 5;

pub async fn enrich_descriptions<F, Fut>(
    books: &mut [ScrapedBook],
    batch_pause: Duration,
    fetch_description: F,
) where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Option<String>>,
{
    let total = books.len();
    let mut start = 0;

    while start < total {
        let end = (start + DETAIL_BATCH_SIZE).min(total);

        let fetches: Vec<_> = books[start..end]
            .iter()
            .map(|book| fetch_description(book.detail_url.clone()))
            .collect();
        let descriptions = join_all(fetches).await;

        for (book, description) in books[start..end].iter_mut().zip(descriptions) {
            if description.is_some() {
                book.description = description;
            }
        }

        start = end;
        if start < total {
            tokio::time::sleep(batch_pause).await;
        }
    }
}
