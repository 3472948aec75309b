use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use super::answer::{Answer, AnswerSheet};
use super::branching::BranchResolver;
use super::graph::{Question, QuestionGraph, QuestionId};
use super::recommendation::{career_suggestions, RecommendationMapper};
use super::repository::{AssessmentRecord, PersistenceError, ResultRepository};
use super::scoring::{ScoreSummary, ScoringEngine};
use super::validator::{AnswerValidator, ValidationError};
use crate::config::AssessmentConfig;

/// Policy shared by every session a service hands out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    pub validator: AnswerValidator,
    pub fallback_recommendation: String,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::from(&AssessmentConfig::default())
    }
}

impl From<&AssessmentConfig> for SessionOptions {
    fn from(config: &AssessmentConfig) -> Self {
        Self {
            validator: AnswerValidator::new(config.text_max_length),
            fallback_recommendation: config.fallback_recommendation.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    NotStarted,
    InProgress,
    /// Scored, but the result has not been stored yet.
    SubmitPending,
    Completed,
}

impl SessionState {
    pub fn label(&self) -> &'static str {
        match self {
            SessionState::NotStarted => "not_started",
            SessionState::InProgress => "in_progress",
            SessionState::SubmitPending => "submit_pending",
            SessionState::Completed => "completed",
        }
    }
}

/// Outcome of a finished traversal, owned by the caller once emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResult {
    pub assessment_type: String,
    pub slug: String,
    pub normalized_score: u8,
    pub raw_answers: AnswerSheet,
    pub recommendations: Vec<String>,
    pub score: ScoreSummary,
    pub completed_at: DateTime<Utc>,
}

/// Position of the current question in default order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub question_number: usize,
    pub total: usize,
    pub percent: u8,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("assessment has not been started")]
    NotStarted,
    #[error("assessment already started")]
    AlreadyStarted,
    #[error("assessment already completed")]
    AlreadyCompleted,
    #[error("assessment submission is pending; retry the submit")]
    SubmitPending,
    #[error("assessment has no questions")]
    EmptyAssessment,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("question {question} has not been answered")]
    MissingAnswer { question: QuestionId },
    #[error("question {question} is the last question; submit instead")]
    AtTerminalQuestion { question: QuestionId },
    #[error("already at the first question")]
    AtFirstQuestion,
    #[error("question {question} is not the last question")]
    NotAtTerminalQuestion { question: QuestionId },
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

#[derive(Debug, Clone)]
enum Phase {
    NotStarted,
    InProgress,
    SubmitPending(AssessmentResult),
    Completed(AssessmentResult),
}

/// One student's attempt at an assessment.
///
/// Progress lives only in memory until [`AssessmentSession::submit`] stores the result; an
/// abandoned session is simply dropped and cannot be resumed.
#[derive(Debug, Clone)]
pub struct AssessmentSession {
    graph: Arc<QuestionGraph>,
    validator: AnswerValidator,
    mapper: RecommendationMapper,
    phase: Phase,
    current: Option<QuestionId>,
    history: Vec<QuestionId>,
    answers: AnswerSheet,
}

impl AssessmentSession {
    pub fn new(graph: Arc<QuestionGraph>, options: &SessionOptions) -> Self {
        let mapper = RecommendationMapper::new(
            graph.results_logic().to_vec(),
            options.fallback_recommendation.clone(),
        );
        Self {
            graph,
            validator: options.validator.clone(),
            mapper,
            phase: Phase::NotStarted,
            current: None,
            history: Vec::new(),
            answers: AnswerSheet::new(),
        }
    }

    pub fn start(&mut self) -> Result<&Question, SessionError> {
        match self.phase {
            Phase::NotStarted => {}
            Phase::InProgress => return Err(SessionError::AlreadyStarted),
            Phase::SubmitPending(_) => return Err(SessionError::SubmitPending),
            Phase::Completed(_) => return Err(SessionError::AlreadyCompleted),
        }

        let first = self
            .graph
            .first()
            .map(|question| question.id.clone())
            .ok_or(SessionError::EmptyAssessment)?;
        debug!(assessment = self.graph.slug(), question = %first, "assessment started");
        self.current = Some(first);
        self.history.clear();
        self.answers = AnswerSheet::new();
        self.phase = Phase::InProgress;
        self.current_question().ok_or(SessionError::EmptyAssessment)
    }

    /// Records an answer for the current question. Invalid answers leave the session untouched.
    pub fn answer(&mut self, answer: Answer) -> Result<(), SessionError> {
        self.ensure_in_progress()?;
        let graph = Arc::clone(&self.graph);
        let question = self.require_current(&graph)?;

        self.validator.validate(question, &answer)?;
        self.answers.insert(question.id.clone(), answer);
        Ok(())
    }

    /// Moves to the question chosen by the branch rules.
    pub fn next(&mut self) -> Result<&Question, SessionError> {
        self.ensure_in_progress()?;
        let graph = Arc::clone(&self.graph);
        let question = self.require_current(&graph)?;
        let answer = self.valid_answer(question)?;

        let next = BranchResolver::resolve(&graph, question, answer).ok_or_else(|| {
            SessionError::AtTerminalQuestion {
                question: question.id.clone(),
            }
        })?;

        debug!(from = %question.id, to = %next, "advancing assessment");
        self.history.push(question.id.clone());
        self.current = Some(next);
        self.current_question().ok_or(SessionError::NotStarted)
    }

    /// Steps back to the previously visited question. Answers are kept.
    pub fn previous(&mut self) -> Result<&Question, SessionError> {
        self.ensure_in_progress()?;
        let previous = self.history.pop().ok_or(SessionError::AtFirstQuestion)?;
        self.current = Some(previous);
        self.current_question().ok_or(SessionError::NotStarted)
    }

    /// Scores the traversal and stores the result.
    ///
    /// When the store fails the session keeps the computed result in
    /// [`SessionState::SubmitPending`]; calling `submit` again re-sends that same result.
    pub fn submit<R>(&mut self, repository: &R) -> Result<&AssessmentResult, SessionError>
    where
        R: ResultRepository + ?Sized,
    {
        match self.phase {
            Phase::NotStarted => return Err(SessionError::NotStarted),
            Phase::Completed(_) => return Err(SessionError::AlreadyCompleted),
            Phase::InProgress => {
                let result = self.compute_result()?;
                info!(
                    assessment = %result.slug,
                    score = result.normalized_score,
                    "assessment scored"
                );
                self.phase = Phase::SubmitPending(result);
            }
            Phase::SubmitPending(_) => debug!("retrying pending assessment submission"),
        }

        let record = match &self.phase {
            Phase::SubmitPending(result) => AssessmentRecord::from(result),
            _ => return Err(SessionError::NotStarted),
        };

        if let Err(err) = repository.insert(record) {
            error!(error = %err, assessment = self.graph.slug(), "failed to store assessment result");
            return Err(err.into());
        }

        self.phase = match std::mem::replace(&mut self.phase, Phase::NotStarted) {
            Phase::SubmitPending(result) => Phase::Completed(result),
            other => other,
        };
        self.result().ok_or(SessionError::NotStarted)
    }

    pub fn graph(&self) -> &QuestionGraph {
        &self.graph
    }

    pub fn state(&self) -> SessionState {
        match self.phase {
            Phase::NotStarted => SessionState::NotStarted,
            Phase::InProgress => SessionState::InProgress,
            Phase::SubmitPending(_) => SessionState::SubmitPending,
            Phase::Completed(_) => SessionState::Completed,
        }
    }

    pub fn current_id(&self) -> Option<&QuestionId> {
        self.current.as_ref()
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.current.as_ref().and_then(|id| self.graph.get(id))
    }

    pub fn current_answer(&self) -> Option<&Answer> {
        self.current.as_ref().and_then(|id| self.answers.get(id))
    }

    pub fn history(&self) -> &[QuestionId] {
        &self.history
    }

    pub fn answers(&self) -> &AnswerSheet {
        &self.answers
    }

    pub fn can_go_back(&self) -> bool {
        matches!(self.phase, Phase::InProgress) && !self.history.is_empty()
    }

    /// Whether the current question ends the traversal, so the student submits instead of
    /// advancing. Before an answer is recorded this reflects the default order only.
    pub fn is_terminal(&self) -> bool {
        let Some(question) = self.current_question() else {
            return false;
        };
        match self.answers.get(&question.id) {
            Some(answer) => BranchResolver::resolve(&self.graph, question, answer).is_none(),
            None => self.graph.next_in_order(&question.id).is_none(),
        }
    }

    pub fn progress(&self) -> Option<Progress> {
        let position = self.current.as_ref().and_then(|id| self.graph.position(id))?;
        let total = self.graph.len();
        let question_number = position + 1;
        let percent = (question_number as f64 / total as f64 * 100.0).round() as u8;
        Some(Progress {
            question_number,
            total,
            percent,
        })
    }

    pub fn result(&self) -> Option<&AssessmentResult> {
        match &self.phase {
            Phase::SubmitPending(result) | Phase::Completed(result) => Some(result),
            Phase::NotStarted | Phase::InProgress => None,
        }
    }

    fn ensure_in_progress(&self) -> Result<(), SessionError> {
        match self.phase {
            Phase::InProgress => Ok(()),
            Phase::NotStarted => Err(SessionError::NotStarted),
            Phase::SubmitPending(_) => Err(SessionError::SubmitPending),
            Phase::Completed(_) => Err(SessionError::AlreadyCompleted),
        }
    }

    fn require_current<'g>(&self, graph: &'g QuestionGraph) -> Result<&'g Question, SessionError> {
        self.current
            .as_ref()
            .and_then(|id| graph.get(id))
            .ok_or(SessionError::NotStarted)
    }

    fn valid_answer(&self, question: &Question) -> Result<&Answer, SessionError> {
        let answer = self
            .answers
            .get(&question.id)
            .ok_or_else(|| SessionError::MissingAnswer {
                question: question.id.clone(),
            })?;
        self.validator.validate(question, answer)?;
        Ok(answer)
    }

    fn compute_result(&self) -> Result<AssessmentResult, SessionError> {
        let question = self.require_current(&self.graph)?;
        let answer = self.valid_answer(question)?;
        if BranchResolver::resolve(&self.graph, question, answer).is_some() {
            return Err(SessionError::NotAtTerminalQuestion {
                question: question.id.clone(),
            });
        }

        let path = self.history.iter().chain(std::iter::once(&question.id));
        let raw_answers = self.answers.restricted_to(path);
        let score = ScoringEngine::score(&self.graph, &raw_answers);

        let mut recommendations = vec![self.mapper.recommend(score.normalized).to_string()];
        for suggestion in career_suggestions(self.graph.slug(), score.normalized) {
            if !recommendations.contains(&suggestion) {
                recommendations.push(suggestion);
            }
        }

        let assessment_type = if self.graph.name().is_empty() {
            self.graph.slug().to_string()
        } else {
            self.graph.name().to_string()
        };

        Ok(AssessmentResult {
            assessment_type,
            slug: self.graph.slug().to_string(),
            normalized_score: score.normalized,
            raw_answers,
            recommendations,
            score,
            completed_at: Utc::now(),
        })
    }
}
