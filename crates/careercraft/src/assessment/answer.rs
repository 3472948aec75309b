use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::graph::QuestionId;

/// A student's response: one value (single choice or free text) or a set of selections.
///
/// Serialized untagged, so `"a"` is a single value and `["a", "b"]` a selection set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Single(String),
    Multiple(BTreeSet<String>),
}

impl Answer {
    pub fn single(value: impl Into<String>) -> Self {
        Self::Single(value.into())
    }

    pub fn multiple<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Multiple(values.into_iter().map(Into::into).collect())
    }

    pub fn as_single(&self) -> Option<&str> {
        match self {
            Self::Single(value) => Some(value),
            Self::Multiple(_) => None,
        }
    }

    pub fn selections(&self) -> Option<&BTreeSet<String>> {
        match self {
            Self::Single(_) => None,
            Self::Multiple(values) => Some(values),
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        match self {
            Self::Single(single) => single == value,
            Self::Multiple(values) => values.contains(value),
        }
    }

    pub fn values(&self) -> Vec<&str> {
        match self {
            Self::Single(value) => vec![value.as_str()],
            Self::Multiple(values) => values.iter().map(String::as_str).collect(),
        }
    }
}

/// Answers keyed by question id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSheet(BTreeMap<QuestionId, Answer>);

impl AnswerSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &QuestionId) -> Option<&Answer> {
        self.0.get(id)
    }

    pub fn insert(&mut self, id: QuestionId, answer: Answer) -> Option<Answer> {
        self.0.insert(id, answer)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&QuestionId, &Answer)> {
        self.0.iter()
    }

    /// Copy of the sheet holding only answers to the given questions.
    pub fn restricted_to<'a, I>(&self, ids: I) -> AnswerSheet
    where
        I: IntoIterator<Item = &'a QuestionId>,
    {
        let mut restricted = AnswerSheet::new();
        for id in ids {
            if let Some(answer) = self.0.get(id) {
                restricted.insert(id.clone(), answer.clone());
            }
        }
        restricted
    }
}

impl FromIterator<(QuestionId, Answer)> for AnswerSheet {
    fn from_iter<T: IntoIterator<Item = (QuestionId, Answer)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
