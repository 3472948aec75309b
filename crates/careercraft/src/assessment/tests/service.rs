use super::common::*;
use crate::assessment::answer::Answer;
use crate::assessment::catalog::{AssessmentCatalog, CatalogError};
use crate::assessment::service::{AssessmentService, AssessmentServiceError, SessionId};
use crate::assessment::session::SessionError;
use std::sync::Arc;

fn session_id(view: &crate::assessment::view::SessionView) -> SessionId {
    SessionId(view.session_id.clone())
}

#[test]
fn start_returns_first_question_view() {
    let (service, _) = build_service();

    let view = service.start("Branching Fixture").expect("starts by name");
    assert_eq!(view.slug, "branching-fixture");
    assert_eq!(view.state, "in_progress");
    assert!(view.session_id.starts_with("as-"));
    let question = view.question.expect("current question");
    assert_eq!(question.id.as_str(), "q1");
    assert_eq!(question.options.len(), 2);
    assert!(!view.can_go_back);
}

#[test]
fn each_start_allocates_a_new_session() {
    let (service, _) = build_service();

    let first = service.start("branching-fixture").expect("first");
    let second = service.start("branching-fixture").expect("second");
    assert_ne!(first.session_id, second.session_id);
}

#[test]
fn full_traversal_stores_one_record() {
    let (service, repository) = build_service();
    let view = service.start("branching-fixture").expect("starts");
    let id = session_id(&view);

    service.answer(&id, Answer::single("B")).expect("q1");
    let view = service.next(&id).expect("to q2b");
    assert_eq!(view.question.as_ref().map(|q| q.id.as_str()), Some("q2b"));
    assert_eq!(view.question.as_ref().and_then(|q| q.max_selections), Some(2));
    service
        .answer(&id, Answer::multiple(["m3"]))
        .expect("q2b");
    service.next(&id).expect("to q3");
    let view = service
        .answer(&id, Answer::single("Near the ocean"))
        .expect("q3");
    assert!(view.is_terminal);

    let view = service.submit(&id).expect("submits");
    assert_eq!(view.state, "completed");
    assert!(view.question.is_none());
    let result = view.result.expect("result view");
    assert_eq!(result.result.normalized_score, 33);
    assert_eq!(result.band, "Needs Improvement");

    assert_eq!(repository.records().len(), 1);
    let recent = service
        .recent_results(Some("Branching Fixture"), 10)
        .expect("recent results");
    assert_eq!(recent.len(), 1);
}

#[test]
fn validation_failures_are_reported_per_session() {
    let (service, _) = build_service();
    let id = session_id(&service.start("branching-fixture").expect("starts"));

    match service.answer(&id, Answer::multiple(["A"])) {
        Err(AssessmentServiceError::Session(SessionError::Validation(_))) => {}
        other => panic!("expected validation error, got {other:?}"),
    }
    let view = service.view(&id).expect("still viewable");
    assert!(view.answer.is_none());
}

#[test]
fn unknown_sessions_are_reported() {
    let (service, _) = build_service();
    let missing = SessionId("as-missing".to_string());

    assert!(matches!(
        service.next(&missing),
        Err(AssessmentServiceError::UnknownSession(id)) if id == missing
    ));
    assert!(matches!(
        service.discard(&missing),
        Err(AssessmentServiceError::UnknownSession(_))
    ));
}

#[test]
fn discarded_sessions_are_gone() {
    let (service, repository) = build_service();
    let id = session_id(&service.start("branching-fixture").expect("starts"));
    service.answer(&id, Answer::single("A")).expect("answer");

    service.discard(&id).expect("discards");
    assert!(matches!(
        service.view(&id),
        Err(AssessmentServiceError::UnknownSession(_))
    ));
    assert!(repository.records().is_empty());
}

#[test]
fn builtin_fallback_serves_unknown_slugs() {
    let (service, _) = build_service();

    let view = service.start("career-aptitude").expect("built-in graph");
    assert_eq!(view.assessment_type, "Career Aptitude Test");
    assert_eq!(view.progress.map(|p| p.total), Some(2));
}

#[test]
fn disabled_fallback_reports_unavailable_assessments() {
    let service = AssessmentService::new(
        Arc::new(AssessmentCatalog::new(false)),
        Arc::new(MemoryRepository::default()),
        options_for_test(),
    );

    assert!(matches!(
        service.start("career-aptitude"),
        Err(AssessmentServiceError::Catalog(CatalogError::Unavailable(_)))
    ));
    assert!(service.assessments().is_empty());
}

#[test]
fn pending_submission_can_be_retried() {
    let repository = Arc::new(FlakyRepository::failing(1));
    let service = AssessmentService::new(catalog(), repository.clone(), options_for_test());
    let id = session_id(&service.start("career-aptitude").expect("starts"));

    service
        .answer(&id, Answer::single("very_comfortable"))
        .expect("q1");
    service.next(&id).expect("to q2");
    service.answer(&id, Answer::single("like")).expect("q2");

    match service.submit(&id) {
        Err(AssessmentServiceError::Session(SessionError::Persistence(_))) => {}
        other => panic!("expected persistence failure, got {other:?}"),
    }
    assert_eq!(service.view(&id).expect("view").state, "submit_pending");

    let view = service.submit(&id).expect("retry succeeds");
    let result = view.result.expect("result");
    assert_eq!(result.result.normalized_score, 90);
    assert_eq!(
        result.result.recommendations[1],
        "Leadership roles in Software Engineer"
    );
    assert_eq!(repository.inner.records().len(), 1);
}

fn complete_personality_attempt<R>(service: &AssessmentService<R>) -> SessionId
where
    R: crate::assessment::repository::ResultRepository + 'static,
{
    let id = session_id(&service.start("personality-assessment").expect("starts"));
    service
        .answer(&id, Answer::single("A quiet studio"))
        .expect("answers");
    service.submit(&id).expect("submits");
    id
}

#[test]
fn completed_sessions_leave_the_live_map() {
    let (service, repository) = build_service();

    let ids: Vec<SessionId> = (0..50)
        .map(|_| complete_personality_attempt(&service))
        .collect();
    let open = service.start("branching-fixture").expect("starts");

    assert_eq!(service.live_sessions(), 1);
    assert_eq!(repository.records().len(), 50);

    let view = service.view(&ids[0]).expect("completed view kept");
    assert_eq!(view.state, "completed");
    assert!(view.result.is_some());
    assert!(matches!(
        service.answer(&ids[0], Answer::single("again")),
        Err(AssessmentServiceError::Session(SessionError::AlreadyCompleted))
    ));
    assert!(matches!(
        service.submit(&ids[0]),
        Err(AssessmentServiceError::Session(SessionError::AlreadyCompleted))
    ));

    service.discard(&SessionId(open.session_id)).expect("discards");
    assert_eq!(service.live_sessions(), 0);
}

#[test]
fn completed_views_are_bounded() {
    let (service, _) = build_service();
    let service = service.with_completed_capacity(2);

    let first = complete_personality_attempt(&service);
    let second = complete_personality_attempt(&service);
    let third = complete_personality_attempt(&service);

    assert!(matches!(
        service.view(&first),
        Err(AssessmentServiceError::UnknownSession(_))
    ));
    assert!(service.view(&second).is_ok());
    assert!(service.view(&third).is_ok());

    service.discard(&third).expect("completed views can be discarded");
    assert!(matches!(
        service.view(&third),
        Err(AssessmentServiceError::UnknownSession(_))
    ));
}
