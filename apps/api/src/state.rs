use std::sync::Arc;

use crate::matching::orchestrator::MatchOrchestrator;

/// Shared application state injected into all route handlers via Axum extractors.
/// Holds no per-request data; every match builds its own results.
#[derive(Clone)]
pub struct AppState {
    /// Matching engine with its collaborators (LLM, scraper) wired in at startup.
    pub matcher: Arc<MatchOrchestrator>,
}
