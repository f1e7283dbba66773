//! The long-running loop that fires scheduled ingestion runs.

use std::sync::Arc;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::info;

use crate::scheduler::cadence::WeeklyCadence;
use crate::scheduler::ScrapeScheduler;

/// Spawn the weekly daemon. It sleeps until the next cadence fire time,
/// runs, and repeats until the returned handle is aborted.
pub fn spawn_weekly_daemon(
    scheduler: Arc<ScrapeScheduler>,
    cadence: WeeklyCadence,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let now = Utc::now();
            let next = cadence.next_run_from(now);
            let wait = (next - now).to_std().unwrap_or_default();
            info!(
                next_run_utc = %next,
                wait_seconds = wait.as_secs(),
                "waiting for next scheduled ingestion"
            );

            sleep(wait).await;
            scheduler.run_scheduled().await;
        }
    })
}
