//! Application layer: the ingestion orchestrator.

pub mod orchestrator;

pub use orchestrator::{IngestOrchestrator, OrchestratorConfig};
