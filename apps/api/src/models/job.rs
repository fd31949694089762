use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// A job posting as plain text. Analyzers regex or prompt over it; no schema beyond strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobPosting {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub requirements: String,
}

impl JobPosting {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        requirements: impl Into<String>,
    ) -> Result<Self, AppError> {
        let posting = Self {
            title: title.into().trim().to_string(),
            description: description.into(),
            requirements: requirements.into(),
        };
        posting.validate()?;
        Ok(posting)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.title.trim().is_empty() {
            return Err(AppError::Validation("job title cannot be empty".to_string()));
        }
        if self.requirements.trim().is_empty() && self.description.trim().is_empty() {
            return Err(AppError::Validation(
                "job requirements and description cannot both be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Requirements followed by description: the text every analyzer scans.
    pub fn combined_text(&self) -> String {
        format!("{}\n{}", self.requirements, self.description)
    }
}
