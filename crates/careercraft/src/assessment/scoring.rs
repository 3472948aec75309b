use serde::{Deserialize, Serialize};

use super::answer::{Answer, AnswerSheet};
use super::graph::{Question, QuestionGraph, QuestionId, QuestionKind};

/// Per-question contribution, kept for transparent audits of a score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreComponent {
    pub question_id: QuestionId,
    pub raw: i64,
    pub max: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSummary {
    pub raw: i64,
    pub max: i64,
    /// `raw / max` as a whole percentage in `0..=100`.
    pub normalized: u8,
    pub components: Vec<ScoreComponent>,
}

/// Aggregates option weights into raw, best-attainable, and normalized scores.
pub struct ScoringEngine;

impl ScoringEngine {
    /// `max` covers every question in the graph, including ones the traversal branched past,
    /// while `raw` only counts answered questions. Sums saturate at the `i64` bounds.
    pub fn score(graph: &QuestionGraph, answers: &AnswerSheet) -> ScoreSummary {
        let mut raw: i64 = 0;
        let mut max: i64 = 0;
        let mut components = Vec::with_capacity(graph.len());

        for question in graph.questions() {
            let component = ScoreComponent {
                question_id: question.id.clone(),
                raw: answers
                    .get(&question.id)
                    .map(|answer| question_raw(question, answer))
                    .unwrap_or(0),
                max: question_max(question),
            };
            raw = raw.saturating_add(component.raw);
            max = max.saturating_add(component.max);
            components.push(component);
        }

        ScoreSummary {
            raw,
            max,
            normalized: normalize(raw, max),
            components,
        }
    }
}

/// Rounds `raw / max * 100` half-up and clamps it into `0..=100`; zero when `max <= 0`.
pub fn normalize(raw: i64, max: i64) -> u8 {
    if max <= 0 {
        return 0;
    }
    let percentage = (raw as f64 / max as f64 * 100.0).round();
    percentage.clamp(0.0, 100.0) as u8
}

fn question_raw(question: &Question, answer: &Answer) -> i64 {
    match &question.kind {
        QuestionKind::SingleChoice(choices) => {
            answer.as_single().map(|value| choices.weight(value)).unwrap_or(0)
        }
        QuestionKind::MultiChoice { choices, .. } => answer
            .values()
            .into_iter()
            .map(|value| choices.weight(value))
            .fold(0, i64::saturating_add),
        QuestionKind::TextInput { .. } => 0,
    }
}

fn question_max(question: &Question) -> i64 {
    match &question.kind {
        QuestionKind::SingleChoice(choices) => {
            choices.scoring().values().copied().max().unwrap_or(0)
        }
        QuestionKind::MultiChoice { choices, bounds } => {
            let best_case = bounds.max.min(choices.options().len());
            let mut weights: Vec<i64> = choices.scoring().values().copied().collect();
            weights.sort_unstable_by(|a, b| b.cmp(a));
            weights.into_iter().take(best_case).fold(0, i64::saturating_add)
        }
        QuestionKind::TextInput { .. } => 0,
    }
}
