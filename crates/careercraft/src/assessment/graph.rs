use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::catalog::slugify;
use super::document::{AssessmentDocument, QuestionDocument};
use super::recommendation::RecommendationRule;

/// Identifier of a question, unique within its graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(pub String);

impl QuestionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QuestionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    SingleChoice,
    MultiChoice,
    TextInput,
}

impl QuestionType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "single_choice" => Some(Self::SingleChoice),
            "multi_choice" => Some(Self::MultiChoice),
            "text_input" => Some(Self::TextInput),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SingleChoice => "single_choice",
            Self::MultiChoice => "multi_choice",
            Self::TextInput => "text_input",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub text: String,
    pub value: String,
}

/// Conditional edge: when the answer carries `if_value`, continue at `go_to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchRule {
    pub if_value: String,
    pub go_to: QuestionId,
}

/// Options, weights, and branch rules shared by both choice question kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceSet {
    options: Vec<ChoiceOption>,
    scoring: BTreeMap<String, i64>,
    branch_rules: Vec<BranchRule>,
}

impl ChoiceSet {
    pub fn options(&self) -> &[ChoiceOption] {
        &self.options
    }

    pub fn has_option(&self, value: &str) -> bool {
        self.options.iter().any(|option| option.value == value)
    }

    pub fn scoring(&self) -> &BTreeMap<String, i64> {
        &self.scoring
    }

    /// Weight of an option value; unscored values weigh nothing.
    pub fn weight(&self, value: &str) -> i64 {
        self.scoring.get(value).copied().unwrap_or(0)
    }

    pub fn branch_rules(&self) -> &[BranchRule] {
        &self.branch_rules
    }
}

/// Inclusive bounds on the number of options a multi-choice answer may select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionBounds {
    pub min: usize,
    pub max: usize,
}

impl SelectionBounds {
    pub fn contains(&self, count: usize) -> bool {
        (self.min..=self.max).contains(&count)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionKind {
    SingleChoice(ChoiceSet),
    MultiChoice {
        choices: ChoiceSet,
        bounds: SelectionBounds,
    },
    TextInput {
        placeholder: Option<String>,
        max_length: Option<usize>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub id: QuestionId,
    pub prompt: String,
    pub kind: QuestionKind,
}

impl Question {
    pub fn question_type(&self) -> QuestionType {
        match self.kind {
            QuestionKind::SingleChoice(_) => QuestionType::SingleChoice,
            QuestionKind::MultiChoice { .. } => QuestionType::MultiChoice,
            QuestionKind::TextInput { .. } => QuestionType::TextInput,
        }
    }

    pub fn choices(&self) -> Option<&ChoiceSet> {
        match &self.kind {
            QuestionKind::SingleChoice(choices) | QuestionKind::MultiChoice { choices, .. } => {
                Some(choices)
            }
            QuestionKind::TextInput { .. } => None,
        }
    }

    pub fn branch_rules(&self) -> &[BranchRule] {
        self.choices()
            .map(ChoiceSet::branch_rules)
            .unwrap_or_default()
    }
}

/// Branch rule whose target is not part of the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingTarget {
    pub question: QuestionId,
    pub target: QuestionId,
}

/// Reasons an assessment definition cannot be administered.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("assessment document is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unable to read assessment document {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("assessment must contain at least one question")]
    NoQuestions,
    #[error("question #{position} is missing required field `{field}`")]
    MissingField {
        position: usize,
        field: &'static str,
    },
    #[error("question {id} has unknown type '{found}'")]
    UnknownType { id: String, found: String },
    #[error("question {id} must have a non-empty options list")]
    EmptyOptions { id: String },
    #[error("question id {id} is used more than once")]
    DuplicateId { id: String },
    #[error("question {id} selection bounds {min}..={max} are invalid for {options} option(s)")]
    InvalidSelectionBounds {
        id: String,
        min: usize,
        max: usize,
        options: usize,
    },
}

/// Loaded assessment definition: questions in default order plus an id index.
#[derive(Debug, Clone)]
pub struct QuestionGraph {
    name: String,
    slug: String,
    description: String,
    duration: String,
    questions: Vec<Question>,
    index: HashMap<QuestionId, usize>,
    results_logic: Vec<RecommendationRule>,
    dangling: Vec<DanglingTarget>,
}

impl QuestionGraph {
    pub fn from_json(raw: &str) -> Result<Self, LoadError> {
        let document = AssessmentDocument::from_json(raw)?;
        Self::from_document(&document)
    }

    pub fn from_document(document: &AssessmentDocument) -> Result<Self, LoadError> {
        if document.questions.is_empty() {
            return Err(LoadError::NoQuestions);
        }

        let mut questions = Vec::with_capacity(document.questions.len());
        let mut index = HashMap::with_capacity(document.questions.len());
        for (position, raw) in document.questions.iter().enumerate() {
            let question = build_question(position, raw)?;
            if index.insert(question.id.clone(), position).is_some() {
                return Err(LoadError::DuplicateId {
                    id: question.id.0.clone(),
                });
            }
            questions.push(question);
        }

        let mut dangling = Vec::new();
        for question in &questions {
            for rule in question.branch_rules() {
                if !index.contains_key(&rule.go_to) {
                    warn!(
                        question = %question.id,
                        target = %rule.go_to,
                        "branch rule targets unknown question; default order will be used"
                    );
                    dangling.push(DanglingTarget {
                        question: question.id.clone(),
                        target: rule.go_to.clone(),
                    });
                }
            }
        }

        let results_logic = document
            .results_logic
            .iter()
            .filter_map(|entry| {
                entry.if_score_range.map(|[min, max]| RecommendationRule {
                    min_score: min,
                    max_score: max,
                    recommendation: entry.recommendation.clone(),
                })
            })
            .collect();

        let name = document.name.trim().to_string();
        let slug_source = if name.is_empty() {
            document.assessment_id.as_deref().unwrap_or("assessment")
        } else {
            name.as_str()
        };
        let slug = slugify(slug_source);

        Ok(Self {
            name,
            slug,
            description: document.description.clone(),
            duration: document.duration.clone(),
            questions,
            index,
            results_logic,
            dangling,
        })
    }

    /// Override the derived slug, used when a graph is served under a fixed route.
    pub fn with_slug(mut self, slug: impl AsRef<str>) -> Self {
        self.slug = slugify(slug.as_ref());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn duration(&self) -> &str {
        &self.duration
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn first(&self) -> Option<&Question> {
        self.questions.first()
    }

    pub fn get(&self, id: &QuestionId) -> Option<&Question> {
        self.index.get(id).map(|&position| &self.questions[position])
    }

    pub fn contains(&self, id: &QuestionId) -> bool {
        self.index.contains_key(id)
    }

    /// Zero-based position of the question in default order.
    pub fn position(&self, id: &QuestionId) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Question following `id` in default order, `None` after the last one.
    pub fn next_in_order(&self, id: &QuestionId) -> Option<&Question> {
        self.position(id)
            .and_then(|position| self.questions.get(position + 1))
    }

    pub fn results_logic(&self) -> &[RecommendationRule] {
        &self.results_logic
    }

    pub fn dangling_targets(&self) -> &[DanglingTarget] {
        &self.dangling
    }

    pub fn branch_rule_count(&self) -> usize {
        self.questions
            .iter()
            .map(|question| question.branch_rules().len())
            .sum()
    }
}

fn required<'a>(
    value: &'a Option<String>,
    position: usize,
    field: &'static str,
) -> Result<&'a str, LoadError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(LoadError::MissingField { position, field })
}

fn build_question(position: usize, raw: &QuestionDocument) -> Result<Question, LoadError> {
    let id = required(&raw.id, position, "id")?;
    let raw_type = required(&raw.question_type, position, "type")?;
    let prompt = required(&raw.question_text, position, "questionText")?;

    let question_type = QuestionType::parse(raw_type).ok_or_else(|| LoadError::UnknownType {
        id: id.to_string(),
        found: raw_type.to_string(),
    })?;

    let kind = match question_type {
        QuestionType::TextInput => QuestionKind::TextInput {
            placeholder: raw.placeholder.clone(),
            max_length: raw.max_length.filter(|&max| max > 0),
        },
        QuestionType::SingleChoice => QuestionKind::SingleChoice(build_choices(id, raw)?),
        QuestionType::MultiChoice => {
            let choices = build_choices(id, raw)?;
            let bounds = SelectionBounds {
                min: raw.min_selections.unwrap_or(1),
                max: raw.max_selections.unwrap_or(1),
            };
            let option_count = choices.options.len();
            if bounds.min < 1 || bounds.min > bounds.max || bounds.max > option_count {
                return Err(LoadError::InvalidSelectionBounds {
                    id: id.to_string(),
                    min: bounds.min,
                    max: bounds.max,
                    options: option_count,
                });
            }
            QuestionKind::MultiChoice { choices, bounds }
        }
    };

    Ok(Question {
        id: QuestionId(id.to_string()),
        prompt: prompt.to_string(),
        kind,
    })
}

fn build_choices(id: &str, raw: &QuestionDocument) -> Result<ChoiceSet, LoadError> {
    if raw.options.is_empty() {
        return Err(LoadError::EmptyOptions { id: id.to_string() });
    }

    Ok(ChoiceSet {
        options: raw
            .options
            .iter()
            .map(|option| ChoiceOption {
                text: option.text.clone(),
                value: option.value.clone(),
            })
            .collect(),
        scoring: raw.scoring.clone(),
        branch_rules: raw
            .next_question_logic
            .iter()
            .map(|rule| BranchRule {
                if_value: rule.if_value.clone(),
                go_to: QuestionId(rule.go_to.clone()),
            })
            .collect(),
    })
}
