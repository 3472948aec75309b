use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::graph::LoadError;

/// Assessment definition as produced by the authoring tool.
///
/// Required question fields are kept optional here so a missing `id`, `type`, or
/// `questionText` surfaces as a [`LoadError`] naming the offending question rather than an
/// opaque deserialization failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assessment_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub questions: Vec<QuestionDocument>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub results_logic: Vec<ResultsLogicDocument>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub question_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionDocument>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub scoring: BTreeMap<String, i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub next_question_logic: Vec<BranchRuleDocument>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_selections: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_selections: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionDocument {
    pub text: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchRuleDocument {
    pub if_value: String,
    pub go_to: String,
}

/// Entries without a score range describe answer-combination conditions and are not used for
/// score mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsLogicDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub if_score_range: Option<[i64; 2]>,
    pub recommendation: String,
}

impl AssessmentDocument {
    pub fn from_json(raw: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn branch_rule_count(&self) -> usize {
        self.questions
            .iter()
            .map(|question| question.next_question_logic.len())
            .sum()
    }

    /// Starter document handed to assessment authors.
    pub fn template() -> Self {
        Self {
            assessment_id: Some("unique-assessment-id".to_string()),
            name: "Sample Assessment".to_string(),
            description: "A sample assessment to demonstrate the structure".to_string(),
            duration: "20-30 minutes".to_string(),
            questions: vec![
                QuestionDocument {
                    id: Some("q1".to_string()),
                    question_type: Some("single_choice".to_string()),
                    question_text: Some("What energizes you the most?".to_string()),
                    options: options(&[
                        ("Solving complex problems", "problem_solving"),
                        ("Creating something beautiful", "creativity"),
                        ("Helping others succeed", "helping_others"),
                    ]),
                    scoring: scoring(&[
                        ("problem_solving", 5),
                        ("creativity", 3),
                        ("helping_others", 4),
                    ]),
                    next_question_logic: vec![
                        BranchRuleDocument {
                            if_value: "problem_solving".to_string(),
                            go_to: "q2_technical".to_string(),
                        },
                        BranchRuleDocument {
                            if_value: "creativity".to_string(),
                            go_to: "q2_creative".to_string(),
                        },
                    ],
                    ..QuestionDocument::default()
                },
                QuestionDocument {
                    id: Some("q2_technical".to_string()),
                    question_type: Some("multi_choice".to_string()),
                    question_text: Some("Which technical skills do you enjoy using?".to_string()),
                    options: options(&[
                        ("Coding", "coding"),
                        ("Data Analysis", "data_analysis"),
                        ("Network Management", "network_management"),
                    ]),
                    scoring: scoring(&[("coding", 2), ("data_analysis", 3)]),
                    min_selections: Some(1),
                    max_selections: Some(2),
                    ..QuestionDocument::default()
                },
                QuestionDocument {
                    id: Some("q2_creative".to_string()),
                    question_type: Some("text_input".to_string()),
                    question_text: Some(
                        "Describe your ideal creative work environment:".to_string(),
                    ),
                    placeholder: Some(
                        "e.g., collaborative studio, quiet space, fast-paced team...".to_string(),
                    ),
                    ..QuestionDocument::default()
                },
            ],
            results_logic: vec![
                ResultsLogicDocument {
                    if_score_range: Some([0, 10]),
                    recommendation: "Introductory careers in your area of interest".to_string(),
                },
                ResultsLogicDocument {
                    if_score_range: Some([11, 20]),
                    recommendation: "Growth-oriented careers with leadership potential"
                        .to_string(),
                },
            ],
        }
    }
}

pub(crate) fn options(pairs: &[(&str, &str)]) -> Vec<OptionDocument> {
    pairs
        .iter()
        .map(|(text, value)| OptionDocument {
            text: (*text).to_string(),
            value: (*value).to_string(),
        })
        .collect()
}

pub(crate) fn scoring(pairs: &[(&str, i64)]) -> BTreeMap<String, i64> {
    pairs
        .iter()
        .map(|(value, weight)| ((*value).to_string(), *weight))
        .collect()
}
