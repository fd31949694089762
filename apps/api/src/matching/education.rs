//! Education analysis: ordinal degree levels, candidate's highest vs the inferred requirement.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::matching::skills::contains_term;
use crate::models::candidate::EducationEntry;

/// Score used when the job text names no degree requirement.
pub const UNSPECIFIED_REQUIREMENT_SCORE: f64 = 85.0;
pub const MEETS_REQUIREMENT_THRESHOLD: f64 = 70.0;

/// Ordinal degree vocabulary. Declaration order is the ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DegreeLevel {
    None,
    Associate,
    Bachelor,
    Master,
    #[serde(rename = "PhD")]
    Doctorate,
}

/// Degree terms per level, highest level first. Every term matches as a whole word, so
/// "mastery" and "database" name no degree. Bare "master"/"bachelor" are left out because
/// job text uses them for roles ("Scrum Master").
const DEGREE_TERMS: &[(DegreeLevel, &[&str])] = &[
    (DegreeLevel::Doctorate, &["phd", "ph.d", "doctorate", "doctoral"]),
    (
        DegreeLevel::Master,
        &["master's", "master\u{2019}s", "masters", "master of", "master degree", "msc", "m.sc", "mba"],
    ),
    (
        DegreeLevel::Bachelor,
        &["bachelor's", "bachelor\u{2019}s", "bachelors", "bachelor of", "bachelor degree", "bsc", "b.sc", "ba"],
    ),
];

/// Bare level names, accepted only in a candidate's degree field.
const DEGREE_FIELD_TERMS: &[(DegreeLevel, &[&str])] = &[
    (DegreeLevel::Master, &["master"]),
    (DegreeLevel::Bachelor, &["bachelor"]),
    (DegreeLevel::Associate, &["associate"]),
];

impl DegreeLevel {
    pub fn ordinal(self) -> u8 {
        match self {
            DegreeLevel::None => 0,
            DegreeLevel::Associate => 1,
            DegreeLevel::Bachelor => 2,
            DegreeLevel::Master => 3,
            DegreeLevel::Doctorate => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DegreeLevel::None => "None",
            DegreeLevel::Associate => "Associate",
            DegreeLevel::Bachelor => "Bachelor",
            DegreeLevel::Master => "Master",
            DegreeLevel::Doctorate => "PhD",
        }
    }

    /// Highest level any term in `tables` names in `text`.
    fn detect(text: &str, tables: &[&[(DegreeLevel, &[&str])]]) -> Option<DegreeLevel> {
        let lower = text.to_lowercase();
        tables
            .iter()
            .flat_map(|table| table.iter())
            .filter(|(_, terms)| terms.iter().any(|term| contains_term(&lower, term)))
            .map(|(level, _)| *level)
            .max()
    }
}

impl fmt::Display for DegreeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EducationAnalysis {
    pub candidate_degree: DegreeLevel,
    pub required_degree: DegreeLevel,
    pub education_score: f64,
    pub education_entries: usize,
    pub meets_requirement: bool,
}

pub fn analyze_education(education: &[EducationEntry], requirements: &str) -> EducationAnalysis {
    let required_degree = infer_required_degree(requirements);
    let candidate_degree = highest_degree(education);
    let education_score = score_education(candidate_degree, required_degree);

    EducationAnalysis {
        candidate_degree,
        required_degree,
        education_score,
        education_entries: education.len(),
        meets_requirement: education_score >= MEETS_REQUIREMENT_THRESHOLD,
    }
}

/// The highest degree the text names wins. Associate degrees are never inferred as a requirement.
pub fn infer_required_degree(requirements: &str) -> DegreeLevel {
    DegreeLevel::detect(requirements, &[DEGREE_TERMS]).unwrap_or(DegreeLevel::None)
}

pub fn highest_degree(education: &[EducationEntry]) -> DegreeLevel {
    education
        .iter()
        .filter_map(|entry| DegreeLevel::detect(&entry.degree, &[DEGREE_TERMS, DEGREE_FIELD_TERMS]))
        .max()
        .unwrap_or(DegreeLevel::None)
}

pub fn score_education(candidate: DegreeLevel, required: DegreeLevel) -> f64 {
    let required_level = required.ordinal();
    let candidate_level = candidate.ordinal();

    if required_level == 0 {
        UNSPECIFIED_REQUIREMENT_SCORE
    } else if candidate_level >= required_level {
        100.0
    } else {
        f64::from(candidate_level) / f64::from(required_level) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn degrees(items: &[&str]) -> Vec<EducationEntry> {
        items
            .iter()
            .map(|d| EducationEntry {
                degree: d.to_string(),
                institution: "State University".to_string(),
            })
            .collect()
    }

    #[test]
    fn test_required_degree_priority_order() {
        assert_eq!(
            infer_required_degree("Bachelor's required, PhD preferred"),
            DegreeLevel::Doctorate
        );
        assert_eq!(
            infer_required_degree("MSc or Bachelor in CS"),
            DegreeLevel::Master
        );
        assert_eq!(
            infer_required_degree("Bachelor's degree"),
            DegreeLevel::Bachelor
        );
        assert_eq!(infer_required_degree("BA in design"), DegreeLevel::Bachelor);
        assert_eq!(infer_required_degree("Rust, SQL"), DegreeLevel::None);
    }

    #[test]
    fn test_abbreviations_do_not_match_inside_words() {
        assert_eq!(
            infer_required_degree("Strong database skills and embassy clearance"),
            DegreeLevel::None
        );
        assert_eq!(infer_required_degree("mbappe fan club"), DegreeLevel::None);
    }

    #[test]
    fn test_role_words_are_not_degrees() {
        assert_eq!(infer_required_degree("Mastery of SQL"), DegreeLevel::None);
        assert_eq!(
            infer_required_degree("Scrum Master certification a plus"),
            DegreeLevel::None
        );
        assert_eq!(
            infer_required_degree("Scrum Master certification, Master's in CS preferred"),
            DegreeLevel::Master
        );
        assert_eq!(
            infer_required_degree("Bachelors in statistics"),
            DegreeLevel::Bachelor
        );
    }

    #[test]
    fn test_associate_is_not_inferred_as_requirement() {
        assert_eq!(
            infer_required_degree("Associate degree welcome"),
            DegreeLevel::None
        );
    }

    #[test]
    fn test_highest_degree_takes_maximum() {
        let education = degrees(&["Bachelor of Science", "MBA", "Associate of Arts"]);
        assert_eq!(highest_degree(&education), DegreeLevel::Master);
    }

    #[test]
    fn test_unknown_degrees_are_none() {
        assert_eq!(highest_degree(&degrees(&["High School Diploma", ""])), DegreeLevel::None);
        assert_eq!(highest_degree(&[]), DegreeLevel::None);
    }

    #[test]
    fn test_score_rules() {
        assert_eq!(score_education(DegreeLevel::None, DegreeLevel::None), 85.0);
        assert_eq!(score_education(DegreeLevel::Doctorate, DegreeLevel::None), 85.0);
        assert_eq!(score_education(DegreeLevel::Master, DegreeLevel::Bachelor), 100.0);
        assert_eq!(score_education(DegreeLevel::Bachelor, DegreeLevel::Master), 200.0 / 3.0);
        assert_eq!(score_education(DegreeLevel::None, DegreeLevel::Bachelor), 0.0);
        assert_eq!(score_education(DegreeLevel::Associate, DegreeLevel::Bachelor), 50.0);
    }

    #[test]
    fn test_meets_requirement_threshold() {
        let below = analyze_education(&degrees(&["Bachelor"]), "Master's required");
        assert!(!below.meets_requirement);

        let met = analyze_education(&degrees(&["Ph.D. in Physics"]), "Master's required");
        assert_eq!(met.candidate_degree, DegreeLevel::Doctorate);
        assert!(met.meets_requirement);

        let unspecified = analyze_education(&[], "Go, Kafka");
        assert_eq!(unspecified.education_score, 85.0);
        assert!(unspecified.meets_requirement);
    }

    #[test]
    fn test_degree_serializes_with_vocabulary_labels() {
        assert_eq!(
            serde_json::to_string(&DegreeLevel::Doctorate).unwrap(),
            "\"PhD\""
        );
        assert_eq!(serde_json::to_string(&DegreeLevel::None).unwrap(), "\"None\"");
        assert_eq!(DegreeLevel::Bachelor.to_string(), "Bachelor");
    }
}
