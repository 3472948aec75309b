use careercraft::assessment::{
    AssessmentCatalog, AssessmentDocument, AssessmentRecord, PersistenceError, ResultRepository,
};
use careercraft::config::AssessmentConfig;
use careercraft::error::AppError;
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local result store. Records live until the process exits.
#[derive(Default, Clone)]
pub(crate) struct InMemoryResultRepository {
    records: Arc<Mutex<Vec<AssessmentRecord>>>,
}

impl ResultRepository for InMemoryResultRepository {
    fn insert(&self, record: AssessmentRecord) -> Result<(), PersistenceError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|_| PersistenceError::Unavailable("result store lock poisoned".to_string()))?;
        guard.push(record);
        Ok(())
    }

    fn recent(
        &self,
        assessment_type: Option<&str>,
        limit: usize,
    ) -> Result<Vec<AssessmentRecord>, PersistenceError> {
        let guard = self
            .records
            .lock()
            .map_err(|_| PersistenceError::Unavailable("result store lock poisoned".to_string()))?;
        Ok(guard
            .iter()
            .rev()
            .filter(|record| assessment_type.map_or(true, |kind| record.assessment_type == kind))
            .take(limit)
            .cloned()
            .collect())
    }
}

/// Catalog seeded from the configured document directory.
pub(crate) fn build_catalog(config: &AssessmentConfig) -> Result<AssessmentCatalog, AppError> {
    let mut catalog = AssessmentCatalog::new(config.builtin_fallback);
    let Some(dir) = config.document_dir.as_deref() else {
        return Ok(catalog);
    };

    let report = catalog.load_dir(dir)?;
    for (path, error) in &report.failed {
        warn!(path = %path.display(), %error, "assessment document rejected");
    }
    info!(
        dir = %dir.display(),
        loaded = report.loaded.len(),
        failed = report.failed.len(),
        "assessment catalog loaded"
    );
    Ok(catalog)
}

/// Registers a single authored document on top of an existing catalog.
pub(crate) fn register_document(
    catalog: &mut AssessmentCatalog,
    path: &Path,
) -> Result<String, AppError> {
    let raw = std::fs::read_to_string(path)?;
    let document = AssessmentDocument::from_json(&raw)?;
    let graph = catalog.load_document(&document)?;
    Ok(graph.slug().to_string())
}
