//! Match orchestration: runs the full scoring pipeline for one candidate/job pair.
//!
//! Flow: validate job → {skills, experience, education, web presence} concurrently →
//!       aggregate → decide → recommendations → optional LLM narrative → MatchResult.
//!
//! Collaborators are injected at construction. Nothing is spawned: every sub-call is
//! polled inside the request future, so dropping that future cancels all of them.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::tagged::parse_tagged_reply;
use crate::llm_client::LlmGenerate;
use crate::matching::aggregate::{compute_overall_score, ScoreWeights};
use crate::matching::education::{analyze_education, EducationAnalysis};
use crate::matching::experience::{analyze_experience, ExperienceAnalysis};
use crate::matching::prompts::{fill_template, INSIGHTS_PROMPT_TEMPLATE};
use crate::matching::recommendation::{build_recommendations, decide, Decision};
use crate::matching::skills::{SkillAnalysis, SkillMatcher};
use crate::matching::web_presence::{
    collect_web_presence, compute_web_score_boost, WebPresenceResult,
};
use crate::models::candidate::CandidateProfile;
use crate::models::job::JobPosting;
use crate::scraping::ProfileScraper;

pub const INSIGHTS_PLACEHOLDER: &str = "LLM analysis unavailable - using rule-based matching";
const INSIGHTS_MAX_TOKENS: u32 = 1200;
const INSIGHTS_TEMPERATURE: f32 = 0.7;

#[derive(Debug, Clone)]
pub struct MatchSettings {
    pub llm_timeout: Duration,
    pub scrape_timeout: Duration,
    pub insights_enabled: bool,
    pub weights: ScoreWeights,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            llm_timeout: Duration::from_secs(120),
            scrape_timeout: Duration::from_secs(10),
            insights_enabled: true,
            weights: ScoreWeights::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MatchRequest {
    pub profile: CandidateProfile,
    pub job: JobPosting,
    pub github_url: Option<String>,
    pub linkedin_url: Option<String>,
}

/// Terminal artifact of one match. Built once, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub match_id: Uuid,
    pub candidate_name: String,
    pub job_title: String,
    pub overall_score: f64,
    pub decision: Decision,
    pub skills_analysis: SkillAnalysis,
    pub experience_analysis: ExperienceAnalysis,
    pub education_analysis: EducationAnalysis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_presence: Option<WebPresenceResult>,
    pub web_score_boost: f64,
    pub recommendations: Vec<String>,
    pub llm_insights: Option<String>,
    /// The narrative's own proceed/stop flag, when the model gave a well-formed one.
    pub llm_recommends_interview: Option<bool>,
    pub matched_at: DateTime<Utc>,
}

pub struct MatchOrchestrator {
    skill_matcher: Arc<dyn SkillMatcher>,
    /// Narrative collaborator; `None` disables insights.
    llm: Option<Arc<dyn LlmGenerate>>,
    /// `None` disables the web-presence stage.
    scraper: Option<Arc<dyn ProfileScraper>>,
    settings: MatchSettings,
}

impl MatchOrchestrator {
    pub fn new(
        skill_matcher: Arc<dyn SkillMatcher>,
        llm: Option<Arc<dyn LlmGenerate>>,
        scraper: Option<Arc<dyn ProfileScraper>>,
        settings: MatchSettings,
    ) -> Self {
        Self {
            skill_matcher,
            llm,
            scraper,
            settings,
        }
    }

    pub async fn match_candidate(&self, request: MatchRequest) -> Result<MatchResult, AppError> {
        request.job.validate()?;

        let MatchRequest {
            profile,
            job,
            github_url,
            linkedin_url,
        } = request;
        let candidate_name = profile.display_name().to_string();
        info!("Matching {candidate_name} against '{}'", job.title);

        let job_text = job.combined_text();
        let current_year = Utc::now().year();

        let (skills, experience, education, web) = tokio::join!(
            self.skill_matcher.match_skills(&profile.skills, &job),
            async { analyze_experience(&profile.work_experience, &job_text, current_year) },
            async { analyze_education(&profile.education, &job.requirements) },
            self.web_stage(&profile, github_url.as_deref(), linkedin_url.as_deref()),
        );

        let web_score_boost = compute_web_score_boost(web.as_ref());
        let overall_score = compute_overall_score(
            skills.skills_score,
            experience.experience_score,
            education.education_score,
            web_score_boost,
            &self.settings.weights,
        );
        let decision = decide(overall_score);
        let recommendations = build_recommendations(
            &skills,
            &experience,
            &education,
            web.as_ref(),
            overall_score,
        );

        let (llm_insights, llm_recommends_interview) = self
            .narrative(&profile, &job, &skills, &experience, &education, web.as_ref(), overall_score)
            .await;

        info!(
            "Match complete for {candidate_name}: {overall_score:.1} ({})",
            decision.label()
        );

        Ok(MatchResult {
            match_id: Uuid::new_v4(),
            candidate_name,
            job_title: job.title,
            overall_score,
            decision,
            skills_analysis: skills,
            experience_analysis: experience,
            education_analysis: education,
            web_presence: web,
            web_score_boost,
            recommendations,
            llm_insights,
            llm_recommends_interview,
            matched_at: Utc::now(),
        })
    }

    async fn web_stage(
        &self,
        profile: &CandidateProfile,
        github_url: Option<&str>,
        linkedin_url: Option<&str>,
    ) -> Option<WebPresenceResult> {
        let scraper = self.scraper.as_ref()?;
        Some(
            collect_web_presence(
                scraper.as_ref(),
                &profile.personal_information.links,
                github_url,
                linkedin_url,
                &profile.skills,
                self.settings.scrape_timeout,
            )
            .await,
        )
    }

    /// One narrative call. Errors and timeouts yield the placeholder; a reply without a
    /// well-formed flag is kept verbatim with no flag.
    #[allow(clippy::too_many_arguments)]
    async fn narrative(
        &self,
        profile: &CandidateProfile,
        job: &JobPosting,
        skills: &SkillAnalysis,
        experience: &ExperienceAnalysis,
        education: &EducationAnalysis,
        web: Option<&WebPresenceResult>,
        overall_score: f64,
    ) -> (Option<String>, Option<bool>) {
        let Some(llm) = self.llm.as_ref().filter(|_| self.settings.insights_enabled) else {
            return (None, None);
        };

        let prompt = build_insights_prompt(
            profile,
            job,
            skills,
            experience,
            education,
            web,
            overall_score,
        );
        let reply = tokio::time::timeout(
            self.settings.llm_timeout,
            llm.generate(&prompt, INSIGHTS_MAX_TOKENS, INSIGHTS_TEMPERATURE),
        )
        .await;

        match reply {
            Ok(Ok(text)) => match parse_tagged_reply(&text) {
                Ok(tagged) => (Some(tagged.payload), Some(tagged.proceed)),
                Err(e) => {
                    warn!("Narrative reply had no usable flag: {e}");
                    (Some(text.trim().to_string()), None)
                }
            },
            Ok(Err(e)) => {
                warn!("LLM narrative failed: {e}");
                (Some(INSIGHTS_PLACEHOLDER.to_string()), None)
            }
            Err(_) => {
                warn!(
                    "LLM narrative timed out after {:?}",
                    self.settings.llm_timeout
                );
                (Some(INSIGHTS_PLACEHOLDER.to_string()), None)
            }
        }
    }
}

fn build_insights_prompt(
    profile: &CandidateProfile,
    job: &JobPosting,
    skills: &SkillAnalysis,
    experience: &ExperienceAnalysis,
    education: &EducationAnalysis,
    web: Option<&WebPresenceResult>,
    overall_score: f64,
) -> String {
    let experience_lines = bullet_lines(profile.work_experience.iter().take(3).map(|job| {
        let end = if job.end_date.trim().is_empty() {
            "Present"
        } else {
            job.end_date.as_str()
        };
        format!(
            "{} at {} ({} - {})",
            or_unknown(&job.job_title),
            or_unknown(&job.company),
            job.start_date,
            end
        )
    }));
    let education_lines = bullet_lines(profile.education.iter().take(2).map(|edu| {
        format!(
            "{} from {}",
            or_unknown(&edu.degree),
            or_unknown(&edu.institution)
        )
    }));

    let web_context = match web {
        Some(web) if web.successful_scrapes > 0 => format!(
            "\n\nONLINE PRESENCE:\n- GitHub Repositories: {}\n- Additional Skills Found: {}\n- Profiles Verified: {}",
            web.repositories_count,
            list_or(&web.additional_skills, 5, "None"),
            web.successful_scrapes
        ),
        _ => String::new(),
    };

    let summary = profile.personal_information.summary.trim();
    let summary = if summary.is_empty() {
        "N/A"
    } else {
        truncate_chars(summary, 400)
    };
    let skill_count = skills.skills_count.to_string();
    let work_count = profile.work_experience.len().to_string();
    let overall_score = format!("{overall_score:.1}");
    let skills_score = format!("{:.1}", skills.skills_score);
    let matched_count = skills.matched_skills.len().to_string();
    let assessed_count = (skills.matched_skills.len() + skills.missing_skills.len()).to_string();
    let experience_score = format!("{:.1}", experience.experience_score);
    let total_years = format!("{:.1}", experience.total_years);
    let required_years = format!("{:.1}", experience.required_years);
    let education_score = format!("{:.1}", education.education_score);
    let candidate_skills = list_or(&skills.candidate_skills, 25, "None listed");
    let matched_skills = list_or(&skills.matched_skills, 10, "None");
    let missing_skills = list_or(&skills.missing_skills, 10, "None identified");
    let relevant_roles = list_or(&experience.relevant_roles, 5, "None identified");

    fill_template(
        INSIGHTS_PROMPT_TEMPLATE,
        &[
            ("job_title", job.title.as_str()),
            ("job_description", truncate_chars(&job.description, 1000)),
            ("job_requirements", truncate_chars(&job.requirements, 800)),
            ("candidate_name", profile.display_name()),
            ("candidate_summary", summary),
            ("skill_count", skill_count.as_str()),
            ("skills", candidate_skills.as_str()),
            ("work_count", work_count.as_str()),
            ("experience_lines", experience_lines.as_str()),
            ("education_lines", education_lines.as_str()),
            ("overall_score", overall_score.as_str()),
            ("skills_score", skills_score.as_str()),
            ("matched_count", matched_count.as_str()),
            ("assessed_count", assessed_count.as_str()),
            ("experience_score", experience_score.as_str()),
            ("total_years", total_years.as_str()),
            ("required_years", required_years.as_str()),
            ("education_score", education_score.as_str()),
            ("candidate_degree", education.candidate_degree.label()),
            ("required_degree", education.required_degree.label()),
            ("matched_skills", matched_skills.as_str()),
            ("missing_skills", missing_skills.as_str()),
            ("relevant_roles", relevant_roles.as_str()),
            ("web_context", web_context.as_str()),
        ],
    )
}

fn bullet_lines(items: impl Iterator<Item = String>) -> String {
    let lines: Vec<String> = items.map(|line| format!("- {line}")).collect();
    if lines.is_empty() {
        "- None listed".to_string()
    } else {
        lines.join("\n")
    }
}

fn list_or(items: &[String], limit: usize, empty: &str) -> String {
    if items.is_empty() {
        empty.to_string()
    } else {
        items
            .iter()
            .take(limit)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn or_unknown(value: &str) -> &str {
    if value.trim().is_empty() {
        "Unknown"
    } else {
        value
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::LlmError;
    use crate::matching::skills::{KeywordSkillMatcher, MatcherBackend};
    use crate::models::candidate::{EducationEntry, PersonalInformation, WorkExperience};
    use crate::scraping::{GitHubProfile, ProfileData, ScrapeError};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct StubLlm {
        reply: Result<String, ()>,
        prompts: Mutex<Vec<String>>,
    }

    impl StubLlm {
        fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(text.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: Err(()),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LlmGenerate for StubLlm {
        async fn generate(&self, prompt: &str, max_tokens: u32, _: f32) -> Result<String, LlmError> {
            assert_eq!(max_tokens, INSIGHTS_MAX_TOKENS);
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone().map_err(|_| LlmError::EmptyContent)
        }
    }

    struct HangingLlm;

    #[async_trait]
    impl LlmGenerate for HangingLlm {
        async fn generate(&self, _: &str, _: u32, _: f32) -> Result<String, LlmError> {
            std::future::pending().await
        }
    }

    struct GitHubOnlyScraper;

    #[async_trait]
    impl ProfileScraper for GitHubOnlyScraper {
        async fn scrape(&self, url: &str, _: Duration) -> Result<ProfileData, ScrapeError> {
            if url.contains("github.com") {
                Ok(ProfileData::GitHub(GitHubProfile {
                    public_repos: 12,
                    languages: ["Rust", "Go", "Kafka", "Zig"]
                        .iter()
                        .map(|s| s.to_string())
                        .collect(),
                    ..Default::default()
                }))
            } else {
                Err(ScrapeError::Status(403))
            }
        }
    }

    fn orchestrator(
        llm: Option<Arc<dyn LlmGenerate>>,
        scraper: Option<Arc<dyn ProfileScraper>>,
    ) -> MatchOrchestrator {
        MatchOrchestrator::new(
            Arc::new(KeywordSkillMatcher),
            llm,
            scraper,
            MatchSettings::default(),
        )
    }

    fn scenario_request() -> MatchRequest {
        MatchRequest {
            profile: CandidateProfile {
                skills: vec!["Python".to_string(), "SQL".to_string()],
                ..Default::default()
            },
            job: JobPosting::new(
                "Data Engineer",
                "",
                "Python, SQL, AWS, 3+ years experience, Bachelor's degree",
            )
            .unwrap(),
            github_url: None,
            linkedin_url: None,
        }
    }

    #[tokio::test]
    async fn test_scenario_rule_based_moderate_match() {
        let result = orchestrator(None, None)
            .match_candidate(scenario_request())
            .await
            .unwrap();

        assert_eq!(result.skills_analysis.skills_score, 100.0);
        assert_eq!(result.skills_analysis.matcher_backend, MatcherBackend::Keyword);
        assert_eq!(result.experience_analysis.experience_score, 0.0);
        assert_eq!(result.education_analysis.education_score, 0.0);
        assert_eq!(result.web_score_boost, 0.0);
        assert_eq!(result.overall_score, 50.0);
        assert_eq!(result.decision, Decision::ModerateMatch);
        assert_eq!(result.candidate_name, "Candidate");
        assert_eq!(result.job_title, "Data Engineer");
        assert!(result.web_presence.is_none());
        assert!(result.llm_insights.is_none());
        assert_eq!(
            result.recommendations.last().unwrap(),
            "MODERATE FIT - Consider for interview if other candidates unavailable"
        );
    }

    #[tokio::test]
    async fn test_result_json_uses_decision_label_and_omits_disabled_web() {
        let result = orchestrator(None, None)
            .match_candidate(scenario_request())
            .await
            .unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["decision"], "MODERATE MATCH — review carefully");
        assert!(json.get("web_presence").is_none());
        assert!(json["match_id"].is_string());
    }

    #[tokio::test]
    async fn test_blank_job_title_fails_fast() {
        let mut request = scenario_request();
        request.job.title = "   ".to_string();
        let err = orchestrator(None, None)
            .match_candidate(request)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_narrative_flag_is_parsed() {
        let llm = StubLlm::replying("1, Strong Python depth; ask about AWS exposure.");
        let result = orchestrator(Some(llm.clone()), None)
            .match_candidate(scenario_request())
            .await
            .unwrap();

        assert_eq!(
            result.llm_insights.as_deref(),
            Some("Strong Python depth; ask about AWS exposure.")
        );
        assert_eq!(result.llm_recommends_interview, Some(true));

        let prompts = llm.prompts.lock().unwrap();
        assert!(prompts[0].contains("Title: Data Engineer"));
        assert!(prompts[0].contains("Overall Fit: 50.0%"));
        assert!(prompts[0].contains("(2/3 skills matched)"));
        assert!(prompts[0].contains("MISSING SKILLS: AWS"));
        assert!(prompts[0].contains("(None vs Bachelor required)"));
        assert!(!prompts[0].contains('{'));
    }

    #[tokio::test]
    async fn test_placeholder_text_in_job_title_is_not_expanded() {
        let llm = StubLlm::replying("0, Not a fit.");
        let mut request = scenario_request();
        request.job = JobPosting::new(
            "{skills} Lead",
            "",
            "Python, SQL, AWS, 3+ years experience, Bachelor's degree",
        )
        .unwrap();

        orchestrator(Some(llm.clone()), None)
            .match_candidate(request)
            .await
            .unwrap();

        let prompts = llm.prompts.lock().unwrap();
        assert!(prompts[0].contains("Title: {skills} Lead"));
        assert!(!prompts[0].contains("Title: Python, SQL Lead"));
    }

    #[tokio::test]
    async fn test_unflagged_narrative_is_kept_without_flag() {
        let llm = StubLlm::replying("  The candidate looks promising.  ");
        let result = orchestrator(Some(llm), None)
            .match_candidate(scenario_request())
            .await
            .unwrap();
        assert_eq!(
            result.llm_insights.as_deref(),
            Some("The candidate looks promising.")
        );
        assert_eq!(result.llm_recommends_interview, None);
    }

    #[tokio::test]
    async fn test_narrative_failure_uses_placeholder_and_keeps_scores() {
        let result = orchestrator(Some(StubLlm::failing()), None)
            .match_candidate(scenario_request())
            .await
            .unwrap();
        assert_eq!(result.llm_insights.as_deref(), Some(INSIGHTS_PLACEHOLDER));
        assert_eq!(result.overall_score, 50.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_narrative_timeout_uses_placeholder() {
        let result = orchestrator(Some(Arc::new(HangingLlm)), None)
            .match_candidate(scenario_request())
            .await
            .unwrap();
        assert_eq!(result.llm_insights.as_deref(), Some(INSIGHTS_PLACEHOLDER));
        assert_eq!(result.llm_recommends_interview, None);
    }

    #[tokio::test]
    async fn test_insights_disabled_skips_llm() {
        let llm = StubLlm::replying("1, yes");
        let orchestrator = MatchOrchestrator::new(
            Arc::new(KeywordSkillMatcher),
            Some(llm.clone()),
            None,
            MatchSettings {
                insights_enabled: false,
                ..Default::default()
            },
        );
        let result = orchestrator
            .match_candidate(scenario_request())
            .await
            .unwrap();
        assert!(result.llm_insights.is_none());
        assert!(llm.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_web_boost_flows_into_overall_score() {
        let mut request = scenario_request();
        request.github_url = Some("https://github.com/jane".to_string());
        request.profile.personal_information = PersonalInformation {
            full_name: "Jane Doe".to_string(),
            links: vec!["https://www.linkedin.com/in/jane".to_string()],
            ..Default::default()
        };

        let result = orchestrator(None, Some(Arc::new(GitHubOnlyScraper)))
            .match_candidate(request)
            .await
            .unwrap();

        let web = result.web_presence.as_ref().unwrap();
        assert_eq!(web.successful_scrapes, 1);
        assert_eq!(web.failed_scrapes, 1);
        assert!((result.web_score_boost - 6.4).abs() < 1e-9);
        assert!((result.overall_score - 56.4).abs() < 1e-9);
        assert_eq!(result.candidate_name, "Jane Doe");
        assert!(result
            .recommendations
            .contains(&"Direct GitHub URL provided for enhanced analysis".to_string()));
    }

    #[tokio::test]
    async fn test_full_profile_strong_match() {
        let request = MatchRequest {
            profile: CandidateProfile {
                skills: vec!["Rust".to_string(), "Kafka".to_string()],
                work_experience: vec![WorkExperience {
                    job_title: "Backend Engineer".to_string(),
                    company: "Acme".to_string(),
                    start_date: "2015".to_string(),
                    end_date: "2021".to_string(),
                    ..Default::default()
                }],
                education: vec![EducationEntry {
                    degree: "MSc Computer Science".to_string(),
                    institution: "ETH".to_string(),
                }],
                ..Default::default()
            },
            job: JobPosting::new(
                "Platform Engineer",
                "Build streaming systems",
                "Rust and Kafka, 5+ years of experience, Bachelor's degree",
            )
            .unwrap(),
            github_url: None,
            linkedin_url: None,
        };

        let result = orchestrator(None, None).match_candidate(request).await.unwrap();
        assert_eq!(result.experience_analysis.total_years, 6.0);
        assert_eq!(result.experience_analysis.relevant_roles, vec!["Backend Engineer"]);
        assert_eq!(result.overall_score, 100.0);
        assert_eq!(result.decision, Decision::StrongMatch);
    }

    #[test]
    fn test_truncate_chars_is_char_safe() {
        assert_eq!(truncate_chars("résumé", 3), "rés");
        assert_eq!(truncate_chars("short", 10), "short");
    }
}
