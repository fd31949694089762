//! Recommendation engine: categorical decision plus ordered, threshold-driven findings.
//! Pure functions, no LLM dependency.

use serde::{Deserialize, Serialize};

use crate::matching::education::EducationAnalysis;
use crate::matching::experience::ExperienceAnalysis;
use crate::matching::skills::SkillAnalysis;
use crate::matching::web_presence::WebPresenceResult;

const STRONG_SKILLS_THRESHOLD: f64 = 80.0;
const MODERATE_SKILLS_THRESHOLD: f64 = 60.0;
const SUFFICIENT_EXPERIENCE_THRESHOLD: f64 = 80.0;
const MAX_LISTED_WEB_SKILLS: usize = 5;

/// Hiring decision. Serialized labels are a stable contract for callers branching on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    #[serde(rename = "STRONG MATCH — proceed to interview")]
    StrongMatch,
    #[serde(rename = "GOOD MATCH — consider for interview")]
    GoodMatch,
    #[serde(rename = "MODERATE MATCH — review carefully")]
    ModerateMatch,
    #[serde(rename = "WEAK MATCH — not recommended")]
    WeakMatch,
}

impl Decision {
    /// Lower bound (inclusive) of the overall score for each decision, highest first.
    const THRESHOLDS: [(f64, Decision); 3] = [
        (75.0, Decision::StrongMatch),
        (60.0, Decision::GoodMatch),
        (40.0, Decision::ModerateMatch),
    ];

    pub fn label(self) -> &'static str {
        match self {
            Decision::StrongMatch => "STRONG MATCH — proceed to interview",
            Decision::GoodMatch => "GOOD MATCH — consider for interview",
            Decision::ModerateMatch => "MODERATE MATCH — review carefully",
            Decision::WeakMatch => "WEAK MATCH — not recommended",
        }
    }

    fn closing_line(self) -> &'static str {
        match self {
            Decision::StrongMatch => "STRONG CANDIDATE - Highly recommended for interview",
            Decision::GoodMatch => "GOOD CANDIDATE - Recommended for interview",
            Decision::ModerateMatch => {
                "MODERATE FIT - Consider for interview if other candidates unavailable"
            }
            Decision::WeakMatch => "WEAK MATCH - Not recommended at this time",
        }
    }
}

pub fn decide(overall_score: f64) -> Decision {
    Decision::THRESHOLDS
        .iter()
        .find(|(floor, _)| overall_score >= *floor)
        .map(|(_, decision)| *decision)
        .unwrap_or(Decision::WeakMatch)
}

/// Findings in fixed order: skills, experience, education, web presence, overall.
pub fn build_recommendations(
    skills: &SkillAnalysis,
    experience: &ExperienceAnalysis,
    education: &EducationAnalysis,
    web: Option<&WebPresenceResult>,
    overall_score: f64,
) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push(
        if skills.skills_score >= STRONG_SKILLS_THRESHOLD {
            "Strong skills match - Candidate has most required skills"
        } else if skills.skills_score >= MODERATE_SKILLS_THRESHOLD {
            "Moderate skills match - Some training may be needed"
        } else {
            "Skills gap identified - Significant training required"
        }
        .to_string(),
    );

    if experience.experience_score >= SUFFICIENT_EXPERIENCE_THRESHOLD {
        lines.push("Experience level meets requirements".to_string());
    } else if experience.experience_gap > 0.0 {
        lines.push(format!(
            "Experience gap: {:.1} years below requirement",
            experience.experience_gap
        ));
    }

    lines.push(
        if education.meets_requirement {
            "Education requirements met"
        } else {
            "Education level below requirement"
        }
        .to_string(),
    );

    if let Some(web) = web {
        push_web_lines(&mut lines, web);
    }

    lines.push(decide(overall_score).closing_line().to_string());
    lines
}

fn push_web_lines(lines: &mut Vec<String>, web: &WebPresenceResult) {
    if web.successful_scrapes == 0 {
        lines.push("Limited online presence found".to_string());
        return;
    }

    lines.push(format!(
        "Active online presence verified ({} profiles)",
        web.successful_scrapes
    ));
    if web.direct_github_provided {
        lines.push("Direct GitHub URL provided for enhanced analysis".to_string());
    }
    if web.direct_linkedin_provided {
        lines.push("Direct LinkedIn URL provided for enhanced analysis".to_string());
    }
    if web.repositories_count > 0 {
        lines.push(format!(
            "GitHub activity: {} public repositories",
            web.repositories_count
        ));
    }
    if !web.additional_skills.is_empty() {
        let listed: Vec<&str> = web
            .additional_skills
            .iter()
            .take(MAX_LISTED_WEB_SKILLS)
            .map(String::as_str)
            .collect();
        lines.push(format!(
            "Additional skills found via web scraping: {}",
            listed.join(", ")
        ));
    }
}
