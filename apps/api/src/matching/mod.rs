// Candidate-job matching engine.
// Pipeline: skills + experience + education (concurrent) and web presence
// -> weighted aggregate -> decision + recommendations -> optional LLM narrative.
// All LLM calls go through the LlmGenerate trait, all scraping through ProfileScraper.

pub mod aggregate;
pub mod education;
pub mod experience;
pub mod handlers;
pub mod orchestrator;
pub mod prompts;
pub mod recommendation;
pub mod skills;
pub mod web_presence;

/// Clamps a percentage to [0, 100]; NaN and infinities map to 0.
pub(crate) fn clamp_percent(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}
