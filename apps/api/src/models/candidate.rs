use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::errors::AppError;

/// Structured résumé data produced by the upstream extraction service.
/// Unknown fields are ignored; missing sections default to empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateProfile {
    #[serde(default, deserialize_with = "null_as_default")]
    pub personal_information: PersonalInformation,
    #[serde(default, deserialize_with = "null_as_default")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub work_experience: Vec<WorkExperience>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub education: Vec<EducationEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInformation {
    #[serde(default, deserialize_with = "lenient_string")]
    pub full_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub summary: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub links: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkExperience {
    #[serde(default, alias = "title", deserialize_with = "lenient_string")]
    pub job_title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub company: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub start_date: String,
    /// Free-form; "Present" or empty means the role is ongoing.
    #[serde(default, deserialize_with = "lenient_string")]
    pub end_date: String,
    #[serde(default, deserialize_with = "string_or_list")]
    pub description: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationEntry {
    #[serde(default, deserialize_with = "lenient_string")]
    pub degree: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub institution: String,
}

impl CandidateProfile {
    /// Validates raw résumé JSON once at the boundary.
    /// Shape errors (e.g. `skills` not being a list of strings) fail fast.
    pub fn from_value(value: Value) -> Result<Self, AppError> {
        if !value.is_object() {
            return Err(AppError::UnprocessableEntity(
                "resumeData must be a JSON object".to_string(),
            ));
        }
        let mut profile: CandidateProfile = serde_json::from_value(value)
            .map_err(|e| AppError::UnprocessableEntity(format!("Invalid resumeData: {e}")))?;

        profile.skills = profile
            .skills
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(profile)
    }

    pub fn display_name(&self) -> &str {
        let name = self.personal_information.full_name.trim();
        if name.is_empty() {
            "Candidate"
        } else {
            name
        }
    }
}

impl WorkExperience {
    pub fn description_text(&self) -> String {
        self.description.join(" ")
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts a string, a number (e.g. `2015`) or null.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lenient {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Option::<Lenient>::deserialize(deserializer)? {
        Some(Lenient::Text(s)) => s,
        Some(Lenient::Number(n)) => n.to_string(),
        None => String::new(),
    })
}

/// Descriptions arrive either as one paragraph or as a list of bullet strings.
fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::One(s)) => vec![s],
        Some(OneOrMany::Many(v)) => v,
        None => Vec::new(),
    })
}
