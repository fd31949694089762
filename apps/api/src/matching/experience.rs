//! Experience analysis: total years from work history vs years asked for in the job text.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::matching::clamp_percent;
use crate::models::candidate::WorkExperience;

/// Score used when the job text names no experience requirement.
pub const UNSPECIFIED_REQUIREMENT_SCORE: f64 = 85.0;

const RELEVANT_ROLE_KEYWORDS: &[&str] = &["developer", "engineer", "manager", "analyst", "designer"];
const MAX_RELEVANT_ROLES: usize = 5;

lazy_static::lazy_static! {
    static ref YEAR_RE: Regex = Regex::new(r"\b(?:19|20)\d{2}\b").unwrap();
    // Tried in order; first match wins.
    static ref REQUIRED_YEARS_RES: [Regex; 3] = [
        Regex::new(r"(\d+)\+?\s*(?:years?|yrs?)\s*(?:of\s+)?(?:experience|exp)").unwrap(),
        Regex::new(r"(\d+)\+?\s*(?:years?|yrs?)").unwrap(),
        Regex::new(r"minimum\s+(\d+)\s*(?:years?|yrs?)").unwrap(),
    ];
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperienceAnalysis {
    pub total_years: f64,
    /// 0 means the job text names no requirement.
    pub required_years: f64,
    pub experience_score: f64,
    pub experience_gap: f64,
    pub work_entries: usize,
    pub relevant_roles: Vec<String>,
}

/// Pure analysis; `current_year` resolves "Present" and empty end dates.
pub fn analyze_experience(
    work_experience: &[WorkExperience],
    job_text: &str,
    current_year: i32,
) -> ExperienceAnalysis {
    let total_years = total_experience_years(work_experience, current_year);
    let required_years = extract_required_years(job_text);

    let experience_score = if required_years > 0.0 {
        clamp_percent(total_years / required_years * 100.0)
    } else {
        UNSPECIFIED_REQUIREMENT_SCORE
    };

    ExperienceAnalysis {
        total_years,
        required_years,
        experience_score,
        experience_gap: (required_years - total_years).max(0.0),
        work_entries: work_experience.len(),
        relevant_roles: find_relevant_roles(work_experience),
    }
}

/// Sums whole-year spans across entries with a resolvable start/end pair.
/// Entries without one, or ending before they start, contribute nothing.
pub fn total_experience_years(work_experience: &[WorkExperience], current_year: i32) -> f64 {
    let total_months: i64 = work_experience
        .iter()
        .filter_map(|job| {
            let start = extract_year(&job.start_date)?;
            let end = resolve_end_year(&job.end_date, current_year)?;
            Some(i64::from((end - start).max(0)) * 12)
        })
        .sum();

    total_months as f64 / 12.0
}

/// First 4-digit year between 1900 and 2099 in a free-form date.
pub fn extract_year(date: &str) -> Option<i32> {
    YEAR_RE.find(date).and_then(|m| m.as_str().parse().ok())
}

fn resolve_end_year(end_date: &str, current_year: i32) -> Option<i32> {
    let trimmed = end_date.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("present") {
        Some(current_year)
    } else {
        extract_year(trimmed)
    }
}

/// Years of experience the job text asks for, or 0 when none is stated.
pub fn extract_required_years(job_text: &str) -> f64 {
    let lower = job_text.to_lowercase();
    REQUIRED_YEARS_RES
        .iter()
        .find_map(|re| re.captures(&lower))
        .and_then(|caps| caps[1].parse::<f64>().ok())
        .unwrap_or(0.0)
}

fn find_relevant_roles(work_experience: &[WorkExperience]) -> Vec<String> {
    work_experience
        .iter()
        .filter(|job| {
            let title = job.job_title.to_lowercase();
            let description = job.description_text().to_lowercase();
            RELEVANT_ROLE_KEYWORDS
                .iter()
                .any(|k| title.contains(k) || description.contains(k))
        })
        .map(|job| {
            if job.job_title.trim().is_empty() {
                "Unknown Role".to_string()
            } else {
                job.job_title.clone()
            }
        })
        .take(MAX_RELEVANT_ROLES)
        .collect()
}
