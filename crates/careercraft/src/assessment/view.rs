use serde::Serialize;

use super::answer::Answer;
use super::graph::{ChoiceOption, Question, QuestionId, QuestionKind, QuestionType};
use super::recommendation::ScoreBand;
use super::session::{AssessmentResult, AssessmentSession, Progress};

/// Public rendering of a question; scoring weights and branch targets stay server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub id: QuestionId,
    pub prompt: String,
    pub question_type: QuestionType,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<ChoiceOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_selections: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_selections: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

impl From<&Question> for QuestionView {
    fn from(question: &Question) -> Self {
        let mut view = QuestionView {
            id: question.id.clone(),
            prompt: question.prompt.clone(),
            question_type: question.question_type(),
            options: question
                .choices()
                .map(|choices| choices.options().to_vec())
                .unwrap_or_default(),
            min_selections: None,
            max_selections: None,
            placeholder: None,
            max_length: None,
        };
        match &question.kind {
            QuestionKind::MultiChoice { bounds, .. } => {
                view.min_selections = Some(bounds.min);
                view.max_selections = Some(bounds.max);
            }
            QuestionKind::TextInput {
                placeholder,
                max_length,
            } => {
                view.placeholder = placeholder.clone();
                view.max_length = *max_length;
            }
            QuestionKind::SingleChoice(_) => {}
        }
        view
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultView {
    #[serde(flatten)]
    pub result: AssessmentResult,
    pub band: &'static str,
}

/// Snapshot of a session for API responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: String,
    pub assessment_type: String,
    pub slug: String,
    pub state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<QuestionView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<Answer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<Progress>,
    pub can_go_back: bool,
    pub is_terminal: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ResultView>,
}

impl SessionView {
    pub fn of(session_id: &str, session: &AssessmentSession) -> Self {
        let graph = session.graph();
        let result = session.result().cloned().map(|result| ResultView {
            band: ScoreBand::from_score(result.normalized_score).label(),
            result,
        });
        let in_progress = result.is_none();

        Self {
            session_id: session_id.to_string(),
            assessment_type: graph.name().to_string(),
            slug: graph.slug().to_string(),
            state: session.state().label(),
            question: in_progress
                .then(|| session.current_question().map(QuestionView::from))
                .flatten(),
            answer: in_progress.then(|| session.current_answer().cloned()).flatten(),
            progress: in_progress.then(|| session.progress()).flatten(),
            can_go_back: session.can_go_back(),
            is_terminal: in_progress && session.is_terminal(),
            result,
        }
    }
}
