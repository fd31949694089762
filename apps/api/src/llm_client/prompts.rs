// Shared system prompts.
// Each stage that needs LLM calls defines its own prompts alongside it.
// This file contains the cross-cutting system prompts chosen per task.

/// System prompt for structured extraction tasks; enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a professional resume parser. \
    Extract information accurately and return only valid JSON. \
    Do NOT include any text outside the JSON object. \
    Do NOT include explanations or apologies.";

/// System prompt for skill matching and candidate evaluation.
pub const RECRUITER_SYSTEM: &str =
    "You are an expert technical recruiter. Analyze skills and experience objectively.";

pub const GENERAL_SYSTEM: &str =
    "You are a helpful AI assistant. Provide accurate, concise, and professional responses.";

/// Picks a system prompt from the task the user prompt describes.
/// Recruiter tasks are checked first: skill-matching prompts also ask for JSON output.
pub fn system_prompt_for(prompt: &str) -> &'static str {
    let lower = prompt.to_lowercase();
    if ["skill", "match", "recruiter"]
        .iter()
        .any(|k| lower.contains(k))
    {
        RECRUITER_SYSTEM
    } else if ["resume", "json"].iter().any(|k| lower.contains(k)) {
        JSON_ONLY_SYSTEM
    } else {
        GENERAL_SYSTEM
    }
}
