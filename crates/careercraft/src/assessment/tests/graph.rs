use super::common::*;
use crate::assessment::document::{AssessmentDocument, QuestionDocument, ResultsLogicDocument};
use crate::assessment::graph::{LoadError, QuestionGraph, QuestionId, QuestionKind, QuestionType};

#[test]
fn template_round_trips_question_and_rule_counts() {
    let template = AssessmentDocument::template();
    let json = template.to_json_pretty().expect("template serializes");
    let graph = QuestionGraph::from_json(&json).expect("template loads");

    assert_eq!(graph.len(), template.question_count());
    assert_eq!(graph.branch_rule_count(), template.branch_rule_count());
    assert_eq!(graph.slug(), "sample-assessment");
    assert_eq!(graph.results_logic().len(), 2);
}

#[test]
fn empty_question_list_is_rejected() {
    let mut document = branching_document();
    document.questions.clear();

    assert!(matches!(
        QuestionGraph::from_document(&document),
        Err(LoadError::NoQuestions)
    ));
}

#[test]
fn missing_required_fields_name_the_question_position() {
    let cases: [(fn(&mut QuestionDocument), &str); 3] = [
        (|question| question.id = None, "id"),
        (|question| question.question_type = Some("  ".to_string()), "type"),
        (|question| question.question_text = None, "questionText"),
    ];

    for (strip, expected) in cases {
        let mut document = branching_document();
        strip(&mut document.questions[1]);
        match QuestionGraph::from_document(&document) {
            Err(LoadError::MissingField { position, field }) => {
                assert_eq!(position, 1);
                assert_eq!(field, expected);
            }
            other => panic!("expected missing {expected}, got {other:?}"),
        }
    }
}

#[test]
fn choice_questions_need_options() {
    let mut document = branching_document();
    document.questions[0].options.clear();

    match QuestionGraph::from_document(&document) {
        Err(LoadError::EmptyOptions { id }) => assert_eq!(id, "q1"),
        other => panic!("expected empty options error, got {other:?}"),
    }
}

#[test]
fn text_questions_do_not_need_options() {
    let document = AssessmentDocument {
        assessment_id: None,
        name: "Reflection".to_string(),
        description: String::new(),
        duration: String::new(),
        questions: vec![text_input("only")],
        results_logic: Vec::new(),
    };

    let graph = QuestionGraph::from_document(&document).expect("text-only graph loads");
    assert_eq!(question(&graph, "only").question_type(), QuestionType::TextInput);
}

#[test]
fn unknown_types_and_duplicate_ids_are_rejected() {
    let mut unknown = branching_document();
    unknown.questions[3].question_type = Some("ranking".to_string());
    assert!(matches!(
        QuestionGraph::from_document(&unknown),
        Err(LoadError::UnknownType { found, .. }) if found == "ranking"
    ));

    let mut duplicate = branching_document();
    duplicate.questions[3].id = Some("q1".to_string());
    assert!(matches!(
        QuestionGraph::from_document(&duplicate),
        Err(LoadError::DuplicateId { id }) if id == "q1"
    ));
}

#[test]
fn selection_bounds_must_fit_the_options() {
    let mut document = branching_document();
    document.questions[2].max_selections = Some(4);
    assert!(matches!(
        QuestionGraph::from_document(&document),
        Err(LoadError::InvalidSelectionBounds { max: 4, options: 3, .. })
    ));

    let mut inverted = branching_document();
    inverted.questions[2].min_selections = Some(2);
    inverted.questions[2].max_selections = Some(1);
    assert!(QuestionGraph::from_document(&inverted).is_err());
}

#[test]
fn multi_choice_bounds_default_to_exactly_one() {
    let mut document = branching_document();
    document.questions[2].min_selections = None;
    document.questions[2].max_selections = None;
    let graph = QuestionGraph::from_document(&document).expect("loads");

    match &question(&graph, "q2b").kind {
        QuestionKind::MultiChoice { bounds, .. } => {
            assert_eq!((bounds.min, bounds.max), (1, 1));
        }
        other => panic!("expected multi choice, got {other:?}"),
    }
}

#[test]
fn dangling_branch_targets_are_recorded_not_fatal() {
    let mut document = branching_document();
    document.questions[0].next_question_logic[1].go_to = "q9".to_string();

    let graph = QuestionGraph::from_document(&document).expect("dangling target still loads");
    let dangling = graph.dangling_targets();
    assert_eq!(dangling.len(), 1);
    assert_eq!(dangling[0].question, QuestionId::from("q1"));
    assert_eq!(dangling[0].target, QuestionId::from("q9"));
}

#[test]
fn results_logic_without_a_range_is_ignored() {
    let mut document = branching_document();
    document.results_logic.insert(
        0,
        ResultsLogicDocument {
            if_score_range: None,
            recommendation: "Answer combination rule".to_string(),
        },
    );

    let graph = QuestionGraph::from_document(&document).expect("loads");
    assert_eq!(graph.results_logic().len(), 2);
    assert_eq!(graph.results_logic()[0].recommendation, "Explore foundational roles");
}

#[test]
fn slug_falls_back_to_assessment_id_for_unnamed_documents() {
    let mut document = branching_document();
    document.name = "   ".to_string();
    document.assessment_id = Some("Skills Inventory".to_string());

    let graph = QuestionGraph::from_document(&document).expect("loads");
    assert_eq!(graph.slug(), "skills-inventory");
    assert_eq!(graph.name(), "");
}

#[test]
fn default_order_follows_document_order() {
    let graph = branching_graph();

    assert_eq!(graph.first().map(|q| q.id.as_str()), Some("q1"));
    assert_eq!(
        graph
            .next_in_order(&QuestionId::from("q2a"))
            .map(|q| q.id.as_str()),
        Some("q2b")
    );
    assert!(graph.next_in_order(&QuestionId::from("q3")).is_none());
    assert_eq!(graph.position(&QuestionId::from("q3")), Some(3));
}
