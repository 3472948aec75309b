use serde::Serialize;

use super::answer::Answer;
use super::graph::{Question, QuestionId, QuestionKind};

/// Why an answer was refused. Shown inline to the student; never fatal to a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationError {
    #[error("question {question} expects a single value")]
    ExpectedSingle { question: QuestionId },
    #[error("question {question} expects a set of selections")]
    ExpectedSelections { question: QuestionId },
    #[error("'{value}' is not an option for question {question}")]
    UnknownOption { question: QuestionId, value: String },
    #[error("question {question} requires between {min} and {max} selections (found {found})")]
    SelectionCount {
        question: QuestionId,
        min: usize,
        max: usize,
        found: usize,
    },
    #[error("question {question} requires a non-empty answer")]
    EmptyText { question: QuestionId },
    #[error("answer to question {question} exceeds {max} characters (found {found})")]
    TextTooLong {
        question: QuestionId,
        max: usize,
        found: usize,
    },
}

/// Enforces the per-type answer constraints of a question.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerValidator {
    text_max_length: Option<usize>,
}

impl AnswerValidator {
    /// `text_max_length` applies to text questions that do not set their own cap.
    pub fn new(text_max_length: Option<usize>) -> Self {
        Self { text_max_length }
    }

    pub fn validate(&self, question: &Question, answer: &Answer) -> Result<(), ValidationError> {
        let id = &question.id;
        match &question.kind {
            QuestionKind::SingleChoice(choices) => {
                let value = answer
                    .as_single()
                    .ok_or_else(|| ValidationError::ExpectedSingle { question: id.clone() })?;
                if !choices.has_option(value) {
                    return Err(ValidationError::UnknownOption {
                        question: id.clone(),
                        value: value.to_string(),
                    });
                }
                Ok(())
            }
            QuestionKind::MultiChoice { choices, bounds } => {
                let selections = answer.selections().ok_or_else(|| {
                    ValidationError::ExpectedSelections { question: id.clone() }
                })?;
                if let Some(unknown) = selections.iter().find(|value| !choices.has_option(value)) {
                    return Err(ValidationError::UnknownOption {
                        question: id.clone(),
                        value: unknown.clone(),
                    });
                }
                if !bounds.contains(selections.len()) {
                    return Err(ValidationError::SelectionCount {
                        question: id.clone(),
                        min: bounds.min,
                        max: bounds.max,
                        found: selections.len(),
                    });
                }
                Ok(())
            }
            QuestionKind::TextInput { max_length, .. } => {
                let text = answer
                    .as_single()
                    .ok_or_else(|| ValidationError::ExpectedSingle { question: id.clone() })?;
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return Err(ValidationError::EmptyText { question: id.clone() });
                }
                if let Some(max) = max_length.or(self.text_max_length) {
                    let found = trimmed.chars().count();
                    if found > max {
                        return Err(ValidationError::TextTooLong {
                            question: id.clone(),
                            max,
                            found,
                        });
                    }
                }
                Ok(())
            }
        }
    }
}
