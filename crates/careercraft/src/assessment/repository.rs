use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::answer::AnswerSheet;
use super::session::AssessmentResult;

/// Row written for a completed assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentRecord {
    pub assessment_type: String,
    pub score: u8,
    pub results_json: AnswerSheet,
    pub career_suggestions: Vec<String>,
    pub completed_at: DateTime<Utc>,
}

impl From<&AssessmentResult> for AssessmentRecord {
    fn from(result: &AssessmentResult) -> Self {
        Self {
            assessment_type: result.assessment_type.clone(),
            score: result.normalized_score,
            results_json: result.raw_answers.clone(),
            career_suggestions: result.recommendations.clone(),
            completed_at: result.completed_at,
        }
    }
}

/// Storage abstraction for completed assessments so sessions can be exercised in isolation.
pub trait ResultRepository: Send + Sync {
    fn insert(&self, record: AssessmentRecord) -> Result<(), PersistenceError>;
    /// Most recent records first, optionally limited to one assessment type.
    fn recent(
        &self,
        assessment_type: Option<&str>,
        limit: usize,
    ) -> Result<Vec<AssessmentRecord>, PersistenceError>;
}

/// Error enumeration for repository failures. Always retryable from the session's view.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PersistenceError {
    #[error("result already recorded")]
    Conflict,
    #[error("result store unavailable: {0}")]
    Unavailable(String),
}
