use serde::{Deserialize, Serialize};

use crate::matching::clamp_percent;

/// Fixed blend of the three primary sub-scores. The web boost is added on top.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub skills: f64,
    pub experience: f64,
    pub education: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            skills: 0.5,
            experience: 0.3,
            education: 0.2,
        }
    }
}

/// overall = 0.5*skills + 0.3*experience + 0.2*education + web_boost, clamped to [0, 100]
pub fn compute_overall_score(
    skills_score: f64,
    experience_score: f64,
    education_score: f64,
    web_score_boost: f64,
    weights: &ScoreWeights,
) -> f64 {
    clamp_percent(
        weights.skills * skills_score
            + weights.experience * experience_score
            + weights.education * education_score
            + web_score_boost,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_skills_only() {
        let w = ScoreWeights::default();
        assert_eq!(compute_overall_score(100.0, 0.0, 0.0, 0.0, &w), 50.0);
    }

    #[test]
    fn test_weighted_blend() {
        let w = ScoreWeights::default();
        // 0.5*80 + 0.3*85 + 0.2*100 = 40 + 25.5 + 20 = 85.5
        let score = compute_overall_score(80.0, 85.0, 100.0, 0.0, &w);
        assert!((score - 85.5).abs() < 1e-9, "Score was {score}");
    }

    #[test]
    fn test_boost_is_additive_and_clamped() {
        let w = ScoreWeights::default();
        assert!((compute_overall_score(0.0, 0.0, 0.0, 6.4, &w) - 6.4).abs() < 1e-9);
        assert_eq!(compute_overall_score(100.0, 100.0, 100.0, 10.0, &w), 100.0);
    }

    #[test]
    fn test_monotonic_in_each_sub_score() {
        let w = ScoreWeights::default();
        let steps = [0.0, 10.0, 39.9, 50.0, 85.0, 99.0, 100.0];
        for base in [0.0, 50.0, 100.0] {
            for pair in steps.windows(2) {
                let (lo, hi) = (pair[0], pair[1]);
                assert!(
                    compute_overall_score(lo, base, base, 0.0, &w)
                        <= compute_overall_score(hi, base, base, 0.0, &w)
                );
                assert!(
                    compute_overall_score(base, lo, base, 0.0, &w)
                        <= compute_overall_score(base, hi, base, 0.0, &w)
                );
                assert!(
                    compute_overall_score(base, base, lo, 0.0, &w)
                        <= compute_overall_score(base, base, hi, 0.0, &w)
                );
                assert!(
                    compute_overall_score(base, base, base, lo / 10.0, &w)
                        <= compute_overall_score(base, base, base, hi / 10.0, &w)
                );
            }
        }
    }

    #[test]
    fn test_always_within_bounds() {
        let w = ScoreWeights::default();
        for s in [0.0, 100.0] {
            for boost in [0.0, 10.0] {
                let score = compute_overall_score(s, s, s, boost, &w);
                assert!((0.0..=100.0).contains(&score));
            }
        }
    }
}
