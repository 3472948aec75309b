//! Adaptive assessments: authored documents become question graphs, sessions walk a graph
//! answer by answer, and finished traversals are scored and mapped to recommendations.

pub mod answer;
pub(crate) mod branching;
pub mod catalog;
pub mod document;
pub mod graph;
pub mod recommendation;
pub mod repository;
pub mod router;
pub(crate) mod scoring;
pub mod service;
pub mod session;
pub mod validator;
pub mod view;

#[cfg(test)]
mod tests;

pub use answer::{Answer, AnswerSheet};
pub use branching::{BranchResolver, GraphIntegrityError};
pub use catalog::{
    slugify, AssessmentCatalog, AssessmentSummary, CatalogError, CatalogLoadReport,
};
pub use document::{
    AssessmentDocument, BranchRuleDocument, OptionDocument, QuestionDocument,
    ResultsLogicDocument,
};
pub use graph::{
    BranchRule, ChoiceOption, ChoiceSet, DanglingTarget, LoadError, Question, QuestionGraph,
    QuestionId, QuestionKind, QuestionType, SelectionBounds,
};
pub use recommendation::{career_suggestions, RecommendationMapper, RecommendationRule, ScoreBand};
pub use repository::{AssessmentRecord, PersistenceError, ResultRepository};
pub use router::assessment_router;
pub use scoring::{normalize, ScoreComponent, ScoreSummary, ScoringEngine};
pub use service::{AssessmentService, AssessmentServiceError, SessionId};
pub use session::{
    AssessmentResult, AssessmentSession, Progress, SessionError, SessionOptions, SessionState,
};
pub use validator::{AnswerValidator, ValidationError};
pub use view::{QuestionView, ResultView, SessionView};
