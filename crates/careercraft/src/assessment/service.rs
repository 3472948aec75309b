use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::answer::Answer;
use super::catalog::{AssessmentCatalog, AssessmentSummary, CatalogError};
use super::repository::{AssessmentRecord, PersistenceError, ResultRepository};
use super::session::{AssessmentSession, SessionError, SessionOptions};
use super::view::SessionView;

/// Identifier handed to clients for an in-flight assessment attempt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

static SESSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_session_id() -> SessionId {
    let id = SESSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    SessionId(format!("as-{id:06}"))
}

type SharedSession = Arc<Mutex<AssessmentSession>>;

const COMPLETED_SESSION_CAPACITY: usize = 1024;

/// Final views of submitted attempts, oldest evicted first once full.
#[derive(Debug)]
struct CompletedSessions {
    capacity: usize,
    order: VecDeque<SessionId>,
    views: HashMap<SessionId, SessionView>,
}

impl CompletedSessions {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            order: VecDeque::new(),
            views: HashMap::new(),
        }
    }

    fn insert(&mut self, id: SessionId, view: SessionView) {
        if self.capacity == 0 {
            return;
        }
        while self.order.len() >= self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.views.remove(&evicted);
            }
        }
        self.order.push_back(id.clone());
        self.views.insert(id, view);
    }

    fn get(&self, id: &SessionId) -> Option<&SessionView> {
        self.views.get(id)
    }

    fn remove(&mut self, id: &SessionId) -> Option<SessionView> {
        let view = self.views.remove(id)?;
        self.order.retain(|kept| kept != id);
        Some(view)
    }
}

/// Service composing the catalog, live sessions, and the result repository.
///
/// Each session sits behind its own lock, so operations on one attempt run strictly one at a
/// time while separate attempts proceed independently. A submitted attempt leaves the live
/// map and only its final view is kept, in a bounded store.
pub struct AssessmentService<R> {
    catalog: Arc<AssessmentCatalog>,
    repository: Arc<R>,
    options: SessionOptions,
    sessions: Mutex<HashMap<SessionId, SharedSession>>,
    completed: Mutex<CompletedSessions>,
}

impl<R> AssessmentService<R>
where
    R: ResultRepository + 'static,
{
    pub fn new(catalog: Arc<AssessmentCatalog>, repository: Arc<R>, options: SessionOptions) -> Self {
        Self {
            catalog,
            repository,
            options,
            sessions: Mutex::new(HashMap::new()),
            completed: Mutex::new(CompletedSessions::new(COMPLETED_SESSION_CAPACITY)),
        }
    }

    /// Caps how many completed attempts stay viewable.
    pub fn with_completed_capacity(self, capacity: usize) -> Self {
        *lock(&self.completed) = CompletedSessions::new(capacity);
        self
    }

    /// Attempts that are started but not yet completed.
    pub fn live_sessions(&self) -> usize {
        lock(&self.sessions).len()
    }

    pub fn catalog(&self) -> &AssessmentCatalog {
        &self.catalog
    }

    pub fn assessments(&self) -> Vec<AssessmentSummary> {
        self.catalog.summaries()
    }

    /// Begin a fresh attempt. Retakes always get a new session.
    pub fn start(&self, slug: &str) -> Result<SessionView, AssessmentServiceError> {
        let graph = self.catalog.resolve(slug)?;
        let mut session = AssessmentSession::new(graph, &self.options);
        session.start()?;

        let id = next_session_id();
        let view = SessionView::of(&id.0, &session);
        info!(session = %id, assessment = %view.slug, "assessment session opened");
        lock(&self.sessions).insert(id, Arc::new(Mutex::new(session)));
        Ok(view)
    }

    pub fn view(&self, id: &SessionId) -> Result<SessionView, AssessmentServiceError> {
        if let Some(view) = lock(&self.completed).get(id) {
            return Ok(view.clone());
        }
        self.with_session(id, |_| Ok(()))
    }

    pub fn answer(
        &self,
        id: &SessionId,
        answer: Answer,
    ) -> Result<SessionView, AssessmentServiceError> {
        self.with_session(id, |session| session.answer(answer))
    }

    pub fn next(&self, id: &SessionId) -> Result<SessionView, AssessmentServiceError> {
        self.with_session(id, |session| session.next().map(|_| ()))
    }

    pub fn previous(&self, id: &SessionId) -> Result<SessionView, AssessmentServiceError> {
        self.with_session(id, |session| session.previous().map(|_| ()))
    }

    /// Score and store the attempt. A failed store leaves the session pending for a retry.
    pub fn submit(&self, id: &SessionId) -> Result<SessionView, AssessmentServiceError> {
        let repository = Arc::clone(&self.repository);
        let view = self.with_session(id, move |session| {
            session.submit(repository.as_ref()).map(|_| ())
        })?;

        if lock(&self.sessions).remove(id).is_some() {
            debug!(session = %id, "completed assessment session retired");
        }
        lock(&self.completed).insert(id.clone(), view.clone());
        Ok(view)
    }

    /// Drop an attempt. Nothing was persisted, so there is nothing to roll back.
    pub fn discard(&self, id: &SessionId) -> Result<(), AssessmentServiceError> {
        let live = lock(&self.sessions).remove(id).is_some();
        let completed = lock(&self.completed).remove(id).is_some();
        if live || completed {
            info!(session = %id, "assessment session discarded");
            Ok(())
        } else {
            Err(AssessmentServiceError::UnknownSession(id.clone()))
        }
    }

    pub fn recent_results(
        &self,
        assessment_type: Option<&str>,
        limit: usize,
    ) -> Result<Vec<AssessmentRecord>, AssessmentServiceError> {
        Ok(self.repository.recent(assessment_type, limit)?)
    }

    fn with_session<F>(&self, id: &SessionId, operation: F) -> Result<SessionView, AssessmentServiceError>
    where
        F: FnOnce(&mut AssessmentSession) -> Result<(), SessionError>,
    {
        let Some(session) = lock(&self.sessions).get(id).cloned() else {
            return Err(self.missing(id));
        };

        let mut session = lock(&session);
        operation(&mut session)?;
        Ok(SessionView::of(&id.0, &session))
    }

    fn missing(&self, id: &SessionId) -> AssessmentServiceError {
        if lock(&self.completed).get(id).is_some() {
            SessionError::AlreadyCompleted.into()
        } else {
            AssessmentServiceError::UnknownSession(id.clone())
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Error raised by the assessment service.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentServiceError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error("assessment session {0} not found")]
    UnknownSession(SessionId),
}
