mod config;
mod errors;
mod llm_client;
mod matching;
mod models;
mod routes;
mod scraping;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::{LlmClient, LlmGenerate};
use crate::matching::aggregate::ScoreWeights;
use crate::matching::orchestrator::{MatchOrchestrator, MatchSettings};
use crate::matching::skills::{KeywordSkillMatcher, LlmSkillMatcher, SkillMatcher};
use crate::routes::build_router;
use crate::scraping::{HttpProfileScraper, ProfileScraper};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Matcher API v{}", env!("CARGO_PKG_VERSION"));

    let matcher = build_orchestrator(&config)?;

    // Build app state
    let state = AppState {
        matcher: Arc::new(matcher),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Wires the matching engine's collaborators from configuration.
/// Without an LLM the keyword matcher is used and no narrative is requested.
fn build_orchestrator(config: &Config) -> Result<MatchOrchestrator> {
    let llm: Option<Arc<dyn LlmGenerate>> = if config.llm_enabled {
        let client = LlmClient::new(
            &config.llm_base_url,
            config.llm_model.clone(),
            config.llm_api_key.clone(),
            config.llm_timeout,
        )?;
        info!(
            "LLM client initialized (model: {}, base url: {})",
            client.model(),
            config.llm_base_url
        );
        Some(Arc::new(client))
    } else {
        warn!("LLM disabled - keyword skill matching only");
        None
    };

    let skill_matcher: Arc<dyn SkillMatcher> = match &llm {
        Some(llm) => Arc::new(LlmSkillMatcher::new(llm.clone(), config.llm_timeout)),
        None => Arc::new(KeywordSkillMatcher),
    };

    let scraper: Option<Arc<dyn ProfileScraper>> = if config.web_scraping_enabled {
        info!(
            "Web scraping enabled (per-link timeout {:?})",
            config.web_scraping_timeout
        );
        Some(Arc::new(HttpProfileScraper::new()?))
    } else {
        None
    };

    let settings = MatchSettings {
        llm_timeout: config.llm_timeout,
        scrape_timeout: config.web_scraping_timeout,
        insights_enabled: config.llm_insights_enabled,
        weights: ScoreWeights::default(),
    };

    Ok(MatchOrchestrator::new(skill_matcher, llm, scraper, settings))
}
