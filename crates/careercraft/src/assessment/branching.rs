use tracing::warn;

use super::answer::Answer;
use super::graph::{BranchRule, Question, QuestionGraph, QuestionId, QuestionKind};

/// A matched branch rule pointed outside the graph. Logged and recovered from by
/// falling back to default order; never surfaced to the student.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("branch rule on question {question} targets unknown question {target}")]
pub struct GraphIntegrityError {
    pub question: QuestionId,
    pub target: QuestionId,
}

/// Picks the question that follows an answered one.
pub struct BranchResolver;

impl BranchResolver {
    /// Returns the next question id, or `None` when `question` ends the traversal.
    ///
    /// The returned id is always present in `graph`.
    pub fn resolve(graph: &QuestionGraph, question: &Question, answer: &Answer) -> Option<QuestionId> {
        for rule in question.branch_rules() {
            if !rule_matches(&question.kind, rule, answer) {
                continue;
            }
            if let Some(target) = graph.get(&rule.go_to) {
                return Some(target.id.clone());
            }
            let error = GraphIntegrityError {
                question: question.id.clone(),
                target: rule.go_to.clone(),
            };
            warn!(%error, "ignoring branch rule with unknown target");
        }

        graph
            .next_in_order(&question.id)
            .map(|next| next.id.clone())
    }
}

fn rule_matches(kind: &QuestionKind, rule: &BranchRule, answer: &Answer) -> bool {
    match kind {
        QuestionKind::SingleChoice(_) => answer.as_single() == Some(rule.if_value.as_str()),
        QuestionKind::MultiChoice { .. } => answer
            .selections()
            .is_some_and(|selected| selected.contains(&rule.if_value)),
        QuestionKind::TextInput { .. } => false,
    }
}
