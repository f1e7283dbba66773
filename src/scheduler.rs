//! Scheduling: the twice-weekly cadence, the daemon loop, and the manual
//! trigger.
//!
//! Both trigger paths share one atomic in-flight guard, so neither a
//! second manual trigger nor a scheduled fire can start a run while one
//! is still going. Failed runs are not retried; recovery is the next
//! scheduled run or a human reading the logs.

pub mod cadence;
pub mod daemon;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Weekday;
use tracing::{info, warn};

use crate::application::IngestOrchestrator;

/// Ingestion fires Tuesday and Friday mornings.
pub const SCRAPE_WEEKDAYS: [Weekday; 2] = [Weekday::Tue, Weekday::Fri];

/// Result of asking for a manual run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// A run was started in the background.
    Started,
    /// A run is already in flight; nothing was started.
    AlreadyRunning,
}

pub struct ScrapeScheduler {
    orchestrator: Arc<IngestOrchestrator>,
    in_flight: AtomicBool,
}

impl ScrapeScheduler {
    pub fn new(orchestrator: Arc<IngestOrchestrator>) -> Self {
        Self {
            orchestrator,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Start an ingestion run in the background, unless one is already in
    /// flight. Returns immediately either way.
    pub fn trigger_manual(self: &Arc<Self>) -> TriggerOutcome {
        if !self.try_acquire() {
            return TriggerOutcome::AlreadyRunning;
        }

        info!("manual ingestion run triggered");
        let scheduler = Arc::clone(self);
        tokio::spawn(async move {
            scheduler.orchestrator.run_all().await;
            scheduler.release();
        });

        TriggerOutcome::Started
    }

    /// Run on behalf of the weekly daemon, skipping if a run is in flight.
    pub async fn run_scheduled(&self) {
        if !self.try_acquire() {
            warn!("skipping scheduled ingestion; a run is already in progress");
            return;
        }

        self.orchestrator.run_all().await;
        self.release();
    }

    pub fn is_running(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn try_acquire(&self) -> bool {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn release(&self) {
        self.in_flight.store(false, Ordering::Release);
    }
}
