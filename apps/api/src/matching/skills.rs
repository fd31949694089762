//! Skill matching: pluggable, trait-based matcher comparing résumé skills against job text.
//!
//! Default fallback: `KeywordSkillMatcher` (pure-Rust, deterministic, no LLM call).
//! Primary: `LlmSkillMatcher` (synonym-aware via the LLM collaborator), which degrades to the
//! keyword matcher on any error, timeout or unusable output. Neither ever fails the match.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{de, Deserialize, Deserializer, Serialize};
use tracing::{debug, info, warn};

use crate::llm_client::json::parse_embedded;
use crate::llm_client::{LlmError, LlmGenerate};
use crate::matching::clamp_percent;
use crate::matching::prompts::{fill_template, SKILL_MATCH_PROMPT_TEMPLATE};
use crate::models::job::JobPosting;

/// Score used when the candidate lists no skills at all.
pub const NEUTRAL_SKILLS_SCORE: f64 = 50.0;

const SKILL_MATCH_MAX_TOKENS: u32 = 800;
const SKILL_MATCH_TEMPERATURE: f32 = 0.3;

// ────────────────────────────────────────────────────────────────────────────
// Output data model (shared across matcher backends)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatcherBackend {
    Llm,
    Keyword,
}

/// Result of comparing the candidate's skills with the job text.
///
/// Invariants: every `matched_skills` entry is copied verbatim from `candidate_skills`;
/// `skills_score` and `match_percentage` lie in [0, 100].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillAnalysis {
    pub candidate_skills: Vec<String>,
    pub required_skills: Vec<String>,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub skills_score: f64,
    pub skills_count: usize,
    /// Share of the required skills the candidate covers.
    pub match_percentage: f64,
    /// LLM one-line summary, or a note explaining why the keyword fallback ran.
    pub llm_analysis: Option<String>,
    pub matcher_backend: MatcherBackend,
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// The skill matcher trait. Implementations are infallible: collaborator failures
/// are absorbed and reflected in the returned analysis.
#[async_trait]
pub trait SkillMatcher: Send + Sync {
    async fn match_skills(&self, candidate_skills: &[String], job: &JobPosting) -> SkillAnalysis;
}

// ────────────────────────────────────────────────────────────────────────────
// KeywordSkillMatcher: deterministic fallback
// ────────────────────────────────────────────────────────────────────────────

/// Algorithm:
/// 1. matched = candidate skills appearing as a whole term (case-insensitive) in
///    requirements + description
/// 2. skills_score = matched / candidate_count × 100, or 50 when the candidate lists none
/// 3. required_skills = known technologies named in the job text; missing = those the
///    candidate does not list
pub struct KeywordSkillMatcher;

#[async_trait]
impl SkillMatcher for KeywordSkillMatcher {
    async fn match_skills(&self, candidate_skills: &[String], job: &JobPosting) -> SkillAnalysis {
        keyword_skill_match(candidate_skills, job, None)
    }
}

pub fn keyword_skill_match(
    candidate_skills: &[String],
    job: &JobPosting,
    note: Option<String>,
) -> SkillAnalysis {
    let job_text = job.combined_text().to_lowercase();

    let matched_skills: Vec<String> = candidate_skills
        .iter()
        .filter(|skill| contains_term(&job_text, &skill.to_lowercase()))
        .cloned()
        .collect();

    let skills_score = if candidate_skills.is_empty() {
        NEUTRAL_SKILLS_SCORE
    } else {
        clamp_percent(matched_skills.len() as f64 / candidate_skills.len() as f64 * 100.0)
    };

    let required_skills = find_known_skills(&job_text);
    let missing_skills: Vec<String> = required_skills
        .iter()
        .filter(|required| !candidate_covers(candidate_skills, required))
        .cloned()
        .collect();

    let match_percentage = if required_skills.is_empty() {
        skills_score
    } else {
        let covered = required_skills.len() - missing_skills.len();
        clamp_percent(covered as f64 / required_skills.len() as f64 * 100.0)
    };

    debug!(
        "Keyword matching found {}/{} skills",
        matched_skills.len(),
        candidate_skills.len()
    );

    SkillAnalysis {
        candidate_skills: candidate_skills.to_vec(),
        required_skills,
        matched_skills,
        missing_skills,
        skills_score,
        skills_count: candidate_skills.len(),
        match_percentage,
        llm_analysis: note,
        matcher_backend: MatcherBackend::Keyword,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// LlmSkillMatcher: synonym-aware primary path
// ────────────────────────────────────────────────────────────────────────────

pub struct LlmSkillMatcher {
    llm: Arc<dyn LlmGenerate>,
    timeout: Duration,
}

impl LlmSkillMatcher {
    pub fn new(llm: Arc<dyn LlmGenerate>, timeout: Duration) -> Self {
        Self { llm, timeout }
    }

    async fn try_llm_match(
        &self,
        candidate_skills: &[String],
        job: &JobPosting,
    ) -> Result<SkillAnalysis, LlmError> {
        let prompt = build_skill_prompt(candidate_skills, job);
        let response = tokio::time::timeout(
            self.timeout,
            self.llm
                .generate(&prompt, SKILL_MATCH_MAX_TOKENS, SKILL_MATCH_TEMPERATURE),
        )
        .await
        .map_err(|_| LlmError::Timeout(self.timeout))??;

        let parsed: LlmSkillResponse = parse_embedded(&response)?;
        Ok(analysis_from_llm(candidate_skills, parsed))
    }
}

#[async_trait]
impl SkillMatcher for LlmSkillMatcher {
    async fn match_skills(&self, candidate_skills: &[String], job: &JobPosting) -> SkillAnalysis {
        if candidate_skills.is_empty() {
            return keyword_skill_match(
                candidate_skills,
                job,
                Some("No candidate skills listed - neutral score applied".to_string()),
            );
        }

        match self.try_llm_match(candidate_skills, job).await {
            Ok(analysis) => {
                info!(
                    "LLM skill analysis complete - {}/{} skills matched",
                    analysis.matched_skills.len(),
                    candidate_skills.len()
                );
                analysis
            }
            Err(e) => {
                warn!("LLM skill analysis failed: {e}, falling back to keyword matching");
                keyword_skill_match(
                    candidate_skills,
                    job,
                    Some(format!(
                        "LLM skill analysis unavailable ({e}) - keyword fallback used"
                    )),
                )
            }
        }
    }
}

/// Shape the skill-matching prompt asks the model to return.
/// `matched_skills` and `skills_score` are required; a reply without them is unusable.
#[derive(Debug, Deserialize)]
struct LlmSkillResponse {
    #[serde(default)]
    required_skills: Vec<String>,
    matched_skills: Vec<String>,
    #[serde(default)]
    missing_skills: Vec<String>,
    #[serde(deserialize_with = "number_or_numeric_string")]
    skills_score: f64,
    #[serde(default)]
    analysis: String,
}

fn build_skill_prompt(candidate_skills: &[String], job: &JobPosting) -> String {
    let skills_block = candidate_skills
        .iter()
        .map(|s| format!("  - {s}"))
        .collect::<Vec<_>>()
        .join("\n");

    fill_template(
        SKILL_MATCH_PROMPT_TEMPLATE,
        &[
            ("candidate_skills", skills_block.as_str()),
            ("job_requirements", job.requirements.as_str()),
            ("job_description", job.description.as_str()),
        ],
    )
}

fn analysis_from_llm(candidate_skills: &[String], parsed: LlmSkillResponse) -> SkillAnalysis {
    let matched_skills = retain_candidate_skills(candidate_skills, &parsed.matched_skills);
    let required_skills = dedup_preserving_order(parsed.required_skills);

    let match_percentage = if required_skills.is_empty() {
        0.0
    } else {
        clamp_percent(matched_skills.len() as f64 / required_skills.len() as f64 * 100.0)
    };

    SkillAnalysis {
        candidate_skills: candidate_skills.to_vec(),
        required_skills,
        matched_skills,
        missing_skills: dedup_preserving_order(parsed.missing_skills),
        skills_score: clamp_percent(parsed.skills_score),
        skills_count: candidate_skills.len(),
        match_percentage,
        llm_analysis: Some(parsed.analysis).filter(|a| !a.trim().is_empty()),
        matcher_backend: MatcherBackend::Llm,
    }
}

/// Keeps only LLM-reported matches present in the candidate's list (case-insensitive),
/// returned in the candidate's own spelling, without duplicates.
fn retain_candidate_skills(candidate_skills: &[String], reported: &[String]) -> Vec<String> {
    let by_lower: HashMap<String, &String> = candidate_skills
        .iter()
        .map(|s| (s.trim().to_lowercase(), s))
        .collect();

    let mut kept: Vec<String> = Vec::new();
    for entry in reported {
        match by_lower.get(&entry.trim().to_lowercase()) {
            Some(original) if !kept.contains(*original) => kept.push((*original).clone()),
            Some(_) => {}
            None => debug!("Discarding LLM match not in candidate list: {entry}"),
        }
    }
    kept
}

fn dedup_preserving_order(items: Vec<String>) -> Vec<String> {
    let mut seen = Vec::<String>::new();
    let mut out = Vec::new();
    for item in items {
        let key = item.trim().to_lowercase();
        if key.is_empty() || seen.contains(&key) {
            continue;
        }
        seen.push(key);
        out.push(item.trim().to_string());
    }
    out
}

/// Accepts `67`, `67.5` or `"67%"`; anything else fails the whole reply.
fn number_or_numeric_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Score {
        Number(f64),
        Text(String),
    }

    match Score::deserialize(deserializer)? {
        Score::Number(n) => Ok(n),
        Score::Text(s) => s
            .trim()
            .trim_end_matches('%')
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("skills_score '{s}' is not a number"))),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Term matching and the known-technology vocabulary
// ────────────────────────────────────────────────────────────────────────────

/// Whole-term, already-lowercased containment: the term must not be glued to a letter or
/// digit on either side. Works for terms with punctuation ("c++", "node.js", "ci/cd").
pub fn contains_term(haystack: &str, term: &str) -> bool {
    let term = term.trim();
    if term.is_empty() {
        return false;
    }
    haystack.match_indices(term).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + term.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

/// Technologies recognised in free text: display name followed by lowercase aliases.
/// Names that are also everyday words ("react", "swift", "spring") only count in their
/// technology-specific forms.
const KNOWN_SKILLS: &[(&str, &[&str])] = &[
    ("Python", &["python"]),
    ("JavaScript", &["javascript", "js"]),
    ("TypeScript", &["typescript", "ts"]),
    ("Java", &["java"]),
    ("C++", &["c++", "cpp"]),
    ("C#", &["c#", "csharp"]),
    ("Go", &["golang"]),
    ("Rust", &["rust"]),
    ("Ruby", &["ruby"]),
    ("PHP", &["php"]),
    ("Kotlin", &["kotlin"]),
    ("Swift", &["swiftui", "swift programming"]),
    ("SQL", &["sql"]),
    ("PostgreSQL", &["postgresql", "postgres"]),
    ("MySQL", &["mysql"]),
    ("MongoDB", &["mongodb", "mongo"]),
    ("Redis", &["redis"]),
    ("React", &["react.js", "reactjs", "react native"]),
    ("Angular", &["angular"]),
    ("Vue", &["vue", "vue.js", "vuejs"]),
    ("Node.js", &["node.js", "nodejs"]),
    ("Django", &["django"]),
    ("Flask", &["flask"]),
    ("Express", &["express.js", "expressjs"]),
    ("Spring", &["spring boot", "spring framework"]),
    ("AWS", &["aws", "amazon web services"]),
    ("Azure", &["azure", "microsoft azure"]),
    ("GCP", &["gcp", "google cloud"]),
    ("Docker", &["docker"]),
    ("Kubernetes", &["kubernetes", "k8s"]),
    ("Terraform", &["terraform"]),
    ("Git", &["git"]),
    ("CI/CD", &["ci/cd", "cicd"]),
    ("Linux", &["linux"]),
    ("GraphQL", &["graphql"]),
    ("Kafka", &["kafka"]),
    ("Machine Learning", &["machine learning"]),
    ("Data Science", &["data science"]),
    ("Artificial Intelligence", &["artificial intelligence"]),
    ("Web Development", &["web development"]),
];

/// Known technologies named in `text_lower`, in vocabulary order.
pub fn find_known_skills(text_lower: &str) -> Vec<String> {
    KNOWN_SKILLS
        .iter()
        .filter(|(_, aliases)| aliases.iter().any(|a| contains_term(text_lower, a)))
        .map(|(name, _)| name.to_string())
        .collect()
}

/// Whether any candidate skill names the given known technology (by display name or alias).
fn candidate_covers(candidate_skills: &[String], required: &str) -> bool {
    let required_lower = required.to_lowercase();
    let aliases = KNOWN_SKILLS
        .iter()
        .find(|(name, _)| name.to_lowercase() == required_lower)
        .map(|(_, aliases)| *aliases)
        .unwrap_or(&[]);

    candidate_skills.iter().any(|skill| {
        let skill = skill.trim().to_lowercase();
        skill == required_lower || aliases.contains(&skill.as_str())
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
