//! Axum route handlers for the Matching API.

use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::Value;

use crate::errors::AppError;
use crate::matching::orchestrator::{MatchRequest, MatchResult};
use crate::models::candidate::CandidateProfile;
use crate::models::job::JobPosting;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRequestBody {
    /// Raw résumé JSON; validated into a `CandidateProfile` here.
    pub resume_data: Value,
    pub job_title: String,
    #[serde(default)]
    pub job_requirements: String,
    #[serde(default)]
    pub job_description: String,
    #[serde(default)]
    pub github_url: Option<String>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
}

impl MatchRequestBody {
    pub fn into_match_request(self) -> Result<MatchRequest, AppError> {
        let job = JobPosting::new(self.job_title, self.job_description, self.job_requirements)?;
        let profile = CandidateProfile::from_value(self.resume_data)?;
        Ok(MatchRequest {
            profile,
            job,
            github_url: self.github_url,
            linkedin_url: self.linkedin_url,
        })
    }
}

/// POST /api/v1/match
///
/// Scores one candidate against one job posting.
pub async fn handle_match(
    State(state): State<AppState>,
    Json(body): Json<MatchRequestBody>,
) -> Result<Json<MatchResult>, AppError> {
    let request = body.into_match_request()?;
    let result = state.matcher.match_candidate(request).await?;
    Ok(Json(result))
}
