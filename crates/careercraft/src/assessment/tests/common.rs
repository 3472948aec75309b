use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use axum::response::Response;
use serde_json::Value;

use crate::assessment::catalog::AssessmentCatalog;
use crate::assessment::document::{
    options, scoring, AssessmentDocument, BranchRuleDocument, QuestionDocument,
    ResultsLogicDocument,
};
use crate::assessment::graph::{Question, QuestionGraph, QuestionId};
use crate::assessment::repository::{AssessmentRecord, PersistenceError, ResultRepository};
use crate::assessment::service::AssessmentService;
use crate::assessment::session::{AssessmentSession, SessionOptions};
use crate::assessment::validator::AnswerValidator;

pub(super) fn rule(if_value: &str, go_to: &str) -> BranchRuleDocument {
    BranchRuleDocument {
        if_value: if_value.to_string(),
        go_to: go_to.to_string(),
    }
}

pub(super) fn single_choice(id: &str, weights: &[(&str, i64)]) -> QuestionDocument {
    let pairs: Vec<(&str, &str)> = weights.iter().map(|(value, _)| (*value, *value)).collect();
    QuestionDocument {
        id: Some(id.to_string()),
        question_type: Some("single_choice".to_string()),
        question_text: Some(format!("Question {id}")),
        options: options(&pairs),
        scoring: scoring(weights),
        ..QuestionDocument::default()
    }
}

pub(super) fn text_input(id: &str) -> QuestionDocument {
    QuestionDocument {
        id: Some(id.to_string()),
        question_type: Some("text_input".to_string()),
        question_text: Some(format!("Tell us about {id}")),
        ..QuestionDocument::default()
    }
}

/// `q1 -A-> q2a -> q3`, `q1 -B-> q2b -> q3`; `q2b` is a multi-choice question.
pub(super) fn branching_document() -> AssessmentDocument {
    let mut q1 = single_choice("q1", &[("A", 5), ("B", 1)]);
    q1.next_question_logic = vec![rule("A", "q2a"), rule("B", "q2b")];

    let mut q2a = single_choice("q2a", &[("X", 2), ("Y", 1)]);
    q2a.next_question_logic = vec![rule("X", "q3"), rule("Y", "q3")];

    let mut q2b = single_choice("q2b", &[("m1", 1), ("m2", 2), ("m3", 3)]);
    q2b.question_type = Some("multi_choice".to_string());
    q2b.min_selections = Some(1);
    q2b.max_selections = Some(2);

    AssessmentDocument {
        assessment_id: Some("branching-fixture".to_string()),
        name: "Branching Fixture".to_string(),
        description: "Two paths that meet again".to_string(),
        duration: "5 minutes".to_string(),
        questions: vec![q1, q2a, q2b, text_input("q3")],
        results_logic: vec![
            ResultsLogicDocument {
                if_score_range: Some([0, 50]),
                recommendation: "Explore foundational roles".to_string(),
            },
            ResultsLogicDocument {
                if_score_range: Some([51, 100]),
                recommendation: "Pursue specialist roles".to_string(),
            },
        ],
    }
}

pub(super) fn branching_graph() -> Arc<QuestionGraph> {
    Arc::new(QuestionGraph::from_document(&branching_document()).expect("fixture loads"))
}

/// `[q1: {A:5, B:1}, q2a, q2b]` with a single `A -> q2a` rule on `q1`.
pub(super) fn scenario_graph() -> QuestionGraph {
    let mut q1 = single_choice("q1", &[("A", 5), ("B", 1)]);
    q1.next_question_logic = vec![rule("A", "q2a")];
    let document = AssessmentDocument {
        assessment_id: None,
        name: "Scenario".to_string(),
        description: String::new(),
        duration: String::new(),
        questions: vec![
            q1,
            single_choice("q2a", &[("yes", 1)]),
            single_choice("q2b", &[("yes", 1)]),
        ],
        results_logic: Vec::new(),
    };
    QuestionGraph::from_document(&document).expect("scenario loads")
}

pub(super) fn question<'a>(graph: &'a QuestionGraph, id: &str) -> &'a Question {
    graph.get(&QuestionId::from(id)).expect("question present")
}

pub(super) fn options_for_test() -> SessionOptions {
    SessionOptions {
        validator: AnswerValidator::new(Some(200)),
        fallback_recommendation: "General Career Guidance Recommended".to_string(),
    }
}

pub(super) fn started_session() -> AssessmentSession {
    let mut session = AssessmentSession::new(branching_graph(), &options_for_test());
    session.start().expect("session starts");
    session
}

pub(super) fn catalog() -> Arc<AssessmentCatalog> {
    let mut catalog = AssessmentCatalog::new(true);
    catalog
        .load_document(&branching_document())
        .expect("fixture registers");
    Arc::new(catalog)
}

pub(super) fn build_service() -> (AssessmentService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = AssessmentService::new(catalog(), repository.clone(), options_for_test());
    (service, repository)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<Vec<AssessmentRecord>>>,
}

impl MemoryRepository {
    pub(super) fn records(&self) -> Vec<AssessmentRecord> {
        self.records.lock().expect("repository mutex poisoned").clone()
    }
}

impl ResultRepository for MemoryRepository {
    fn insert(&self, record: AssessmentRecord) -> Result<(), PersistenceError> {
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .push(record);
        Ok(())
    }

    fn recent(
        &self,
        assessment_type: Option<&str>,
        limit: usize,
    ) -> Result<Vec<AssessmentRecord>, PersistenceError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .iter()
            .rev()
            .filter(|record| assessment_type.map_or(true, |kind| record.assessment_type == kind))
            .take(limit)
            .cloned()
            .collect())
    }
}

/// Refuses the first `failures` inserts, then stores like [`MemoryRepository`].
#[derive(Default)]
pub(super) struct FlakyRepository {
    failures: Mutex<usize>,
    pub(super) inner: MemoryRepository,
}

impl FlakyRepository {
    pub(super) fn failing(failures: usize) -> Self {
        Self {
            failures: Mutex::new(failures),
            inner: MemoryRepository::default(),
        }
    }
}

impl ResultRepository for FlakyRepository {
    fn insert(&self, record: AssessmentRecord) -> Result<(), PersistenceError> {
        let mut failures = self.failures.lock().expect("failure mutex poisoned");
        if *failures > 0 {
            *failures -= 1;
            return Err(PersistenceError::Unavailable("database offline".to_string()));
        }
        self.inner.insert(record)
    }

    fn recent(
        &self,
        assessment_type: Option<&str>,
        limit: usize,
    ) -> Result<Vec<AssessmentRecord>, PersistenceError> {
        self.inner.recent(assessment_type, limit)
    }
}

pub(super) struct UnavailableRepository;

impl ResultRepository for UnavailableRepository {
    fn insert(&self, _record: AssessmentRecord) -> Result<(), PersistenceError> {
        Err(PersistenceError::Unavailable("database offline".to_string()))
    }

    fn recent(
        &self,
        _assessment_type: Option<&str>,
        _limit: usize,
    ) -> Result<Vec<AssessmentRecord>, PersistenceError> {
        Err(PersistenceError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn assert_not_found(response: Response) {
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
