use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::document::{options, scoring, AssessmentDocument, QuestionDocument};
use super::graph::{LoadError, QuestionGraph};

/// URL form of an assessment name: lower case, whitespace and dashes collapsed into `-`.
pub fn slugify(name: &str) -> String {
    name.split(|c: char| c.is_whitespace() || c == '-')
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("assessment '{0}' is unavailable")]
    Unavailable(String),
    #[error(transparent)]
    Load(#[from] LoadError),
}

/// Listing entry for the assessment picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentSummary {
    pub slug: String,
    pub name: String,
    pub description: String,
    pub estimated_duration: String,
    pub question_count: usize,
    pub builtin: bool,
}

impl AssessmentSummary {
    fn of(graph: &QuestionGraph, builtin: bool) -> Self {
        Self {
            slug: graph.slug().to_string(),
            name: graph.name().to_string(),
            description: graph.description().to_string(),
            estimated_duration: graph.duration().to_string(),
            question_count: graph.len(),
            builtin,
        }
    }
}

/// Outcome of scanning a document directory.
#[derive(Debug, Default)]
pub struct CatalogLoadReport {
    pub loaded: Vec<String>,
    pub failed: Vec<(PathBuf, LoadError)>,
}

/// Registry of administrable assessments, keyed by slug.
#[derive(Debug, Clone)]
pub struct AssessmentCatalog {
    authored: BTreeMap<String, Arc<QuestionGraph>>,
    builtin_fallback: bool,
}

impl Default for AssessmentCatalog {
    fn default() -> Self {
        Self::new(true)
    }
}

impl AssessmentCatalog {
    pub fn new(builtin_fallback: bool) -> Self {
        Self {
            authored: BTreeMap::new(),
            builtin_fallback,
        }
    }

    /// Registers a graph, returning any graph previously served under the same slug.
    pub fn register(&mut self, graph: QuestionGraph) -> Option<Arc<QuestionGraph>> {
        self.authored
            .insert(graph.slug().to_string(), Arc::new(graph))
    }

    pub fn load_document(
        &mut self,
        document: &AssessmentDocument,
    ) -> Result<Arc<QuestionGraph>, LoadError> {
        let graph = QuestionGraph::from_document(document)?;
        let slug = graph.slug().to_string();
        self.register(graph);
        Ok(Arc::clone(&self.authored[&slug]))
    }

    /// Loads every `*.json` document in `dir`. Documents that fail to load are reported and
    /// skipped so the remaining assessments stay available.
    pub fn load_dir(&mut self, dir: &Path) -> Result<CatalogLoadReport, std::io::Error> {
        let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        let mut report = CatalogLoadReport::default();
        for path in paths {
            let loaded = fs::read_to_string(&path)
                .map_err(|source| LoadError::Io {
                    path: path.clone(),
                    source,
                })
                .and_then(|raw| QuestionGraph::from_json(&raw));
            match loaded {
                Ok(graph) => {
                    info!(path = %path.display(), slug = graph.slug(), "loaded assessment document");
                    report.loaded.push(graph.slug().to_string());
                    self.register(graph);
                }
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "skipping assessment document");
                    report.failed.push((path, err));
                }
            }
        }
        Ok(report)
    }

    /// Authored graph for `slug`, else the built-in one when fallbacks are enabled.
    pub fn resolve(&self, slug: &str) -> Result<Arc<QuestionGraph>, CatalogError> {
        let slug = slugify(slug);
        if let Some(graph) = self.authored.get(&slug) {
            return Ok(Arc::clone(graph));
        }
        if !self.builtin_fallback || slug.is_empty() {
            return Err(CatalogError::Unavailable(slug));
        }

        warn!(assessment = %slug, "no authored assessment found; serving built-in questions");
        let graph = QuestionGraph::from_document(&builtin_document(&slug))?.with_slug(&slug);
        Ok(Arc::new(graph))
    }

    /// Authored assessments, or the built-in set when nothing has been authored.
    pub fn summaries(&self) -> Vec<AssessmentSummary> {
        if !self.authored.is_empty() {
            return self
                .authored
                .values()
                .map(|graph| AssessmentSummary::of(graph, false))
                .collect();
        }
        if !self.builtin_fallback {
            return Vec::new();
        }

        BUILTIN_SLUGS
            .iter()
            .filter_map(|slug| {
                QuestionGraph::from_document(&builtin_document(slug))
                    .ok()
                    .map(|graph| AssessmentSummary::of(&graph.with_slug(slug), true))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.authored.len()
    }

    pub fn is_empty(&self) -> bool {
        self.authored.is_empty()
    }
}

const BUILTIN_SLUGS: [&str; 3] = ["career-aptitude", "interest-profiler", "personality-assessment"];

fn builtin_document(slug: &str) -> AssessmentDocument {
    let (name, description, duration, questions) = match slug {
        "career-aptitude" => (
            "Career Aptitude Test".to_string(),
            "Discover your natural talents and abilities across different career domains.",
            "20-30 minutes",
            vec![
                QuestionDocument {
                    id: Some("q1".to_string()),
                    question_type: Some("single_choice".to_string()),
                    question_text: Some(
                        "How comfortable are you with analyzing complex data?".to_string(),
                    ),
                    options: options(&[
                        ("Very comfortable", "very_comfortable"),
                        ("Somewhat comfortable", "somewhat_comfortable"),
                        ("Neutral", "neutral"),
                        ("Somewhat uncomfortable", "somewhat_uncomfortable"),
                        ("Very uncomfortable", "very_uncomfortable"),
                    ]),
                    scoring: scoring(&[
                        ("very_comfortable", 5),
                        ("somewhat_comfortable", 4),
                        ("neutral", 3),
                        ("somewhat_uncomfortable", 2),
                        ("very_uncomfortable", 1),
                    ]),
                    ..QuestionDocument::default()
                },
                QuestionDocument {
                    id: Some("q2".to_string()),
                    question_type: Some("single_choice".to_string()),
                    question_text: Some("How much do you enjoy leading teams?".to_string()),
                    options: options(&[
                        ("Love it", "love"),
                        ("Like it", "like"),
                        ("Neutral", "neutral"),
                        ("Dislike it", "dislike"),
                        ("Hate it", "hate"),
                    ]),
                    scoring: scoring(&[
                        ("love", 5),
                        ("like", 4),
                        ("neutral", 3),
                        ("dislike", 2),
                        ("hate", 1),
                    ]),
                    ..QuestionDocument::default()
                },
            ],
        ),
        "interest-profiler" => (
            "Interest Profiler".to_string(),
            "Identify what truly motivates and interests you in potential career paths.",
            "15-20 minutes",
            vec![QuestionDocument {
                id: Some("q1".to_string()),
                question_type: Some("multi_choice".to_string()),
                question_text: Some(
                    "Which environments appeal to you most? (Select up to 2)".to_string(),
                ),
                options: options(&[
                    ("Office setting", "office"),
                    ("Outdoor environment", "outdoor"),
                    ("Laboratory", "lab"),
                    ("Creative studio", "studio"),
                    ("Healthcare facility", "healthcare"),
                ]),
                scoring: scoring(&[
                    ("office", 3),
                    ("outdoor", 4),
                    ("lab", 5),
                    ("studio", 2),
                    ("healthcare", 4),
                ]),
                min_selections: Some(1),
                max_selections: Some(2),
                ..QuestionDocument::default()
            }],
        ),
        "personality-assessment" => (
            "Personality Assessment".to_string(),
            "Understand your personality type and how it relates to career success.",
            "25-35 minutes",
            vec![QuestionDocument {
                id: Some("q1".to_string()),
                question_type: Some("text_input".to_string()),
                question_text: Some(
                    "Describe your ideal work environment in a few sentences:".to_string(),
                ),
                placeholder: Some(
                    "e.g., collaborative team, quiet space, fast-paced environment...".to_string(),
                ),
                ..QuestionDocument::default()
            }],
        ),
        other => (
            title_case(other),
            "General career guidance questions.",
            "5 minutes",
            vec![QuestionDocument {
                id: Some("q1".to_string()),
                question_type: Some("single_choice".to_string()),
                question_text: Some("This is a sample question for this assessment.".to_string()),
                options: options(&[
                    ("Option A", "a"),
                    ("Option B", "b"),
                    ("Option C", "c"),
                    ("Option D", "d"),
                ]),
                scoring: scoring(&[("a", 1), ("b", 2), ("c", 3), ("d", 4)]),
                ..QuestionDocument::default()
            }],
        ),
    };

    AssessmentDocument {
        assessment_id: Some(slug.to_string()),
        name,
        description: description.to_string(),
        duration: duration.to_string(),
        questions,
        results_logic: Vec::new(),
    }
}

fn title_case(slug: &str) -> String {
    slug.split('-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
