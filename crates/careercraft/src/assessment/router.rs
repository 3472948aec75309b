use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::answer::Answer;
use super::catalog::CatalogError;
use super::document::AssessmentDocument;
use super::repository::ResultRepository;
use super::service::{AssessmentService, AssessmentServiceError, SessionId};
use super::session::SessionError;

const DEFAULT_RESULT_LIMIT: usize = 20;

/// Router builder exposing the assessment catalog, session navigation, and stored results.
pub fn assessment_router<R>(service: Arc<AssessmentService<R>>) -> Router
where
    R: ResultRepository + 'static,
{
    Router::new()
        .route("/api/v1/assessments", get(list_handler::<R>))
        .route("/api/v1/assessments/template", get(template_handler))
        .route(
            "/api/v1/assessments/:slug/sessions",
            post(start_handler::<R>),
        )
        .route(
            "/api/v1/sessions/:session_id",
            get(view_handler::<R>).delete(discard_handler::<R>),
        )
        .route(
            "/api/v1/sessions/:session_id/answer",
            put(answer_handler::<R>),
        )
        .route("/api/v1/sessions/:session_id/next", post(next_handler::<R>))
        .route(
            "/api/v1/sessions/:session_id/previous",
            post(previous_handler::<R>),
        )
        .route(
            "/api/v1/sessions/:session_id/submit",
            post(submit_handler::<R>),
        )
        .route("/api/v1/results", get(results_handler::<R>))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct AnswerRequest {
    pub answer: Answer,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResultsQuery {
    pub assessment_type: Option<String>,
    pub limit: Option<usize>,
}

pub(crate) async fn list_handler<R>(State(service): State<Arc<AssessmentService<R>>>) -> Response
where
    R: ResultRepository + 'static,
{
    (StatusCode::OK, axum::Json(service.assessments())).into_response()
}

pub(crate) async fn template_handler() -> Response {
    (StatusCode::OK, axum::Json(AssessmentDocument::template())).into_response()
}

pub(crate) async fn start_handler<R>(
    State(service): State<Arc<AssessmentService<R>>>,
    Path(slug): Path<String>,
) -> Response
where
    R: ResultRepository + 'static,
{
    match service.start(&slug) {
        Ok(view) => (StatusCode::CREATED, axum::Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn view_handler<R>(
    State(service): State<Arc<AssessmentService<R>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: ResultRepository + 'static,
{
    respond(service.view(&SessionId(session_id)))
}

pub(crate) async fn answer_handler<R>(
    State(service): State<Arc<AssessmentService<R>>>,
    Path(session_id): Path<String>,
    axum::Json(request): axum::Json<AnswerRequest>,
) -> Response
where
    R: ResultRepository + 'static,
{
    respond(service.answer(&SessionId(session_id), request.answer))
}

pub(crate) async fn next_handler<R>(
    State(service): State<Arc<AssessmentService<R>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: ResultRepository + 'static,
{
    respond(service.next(&SessionId(session_id)))
}

pub(crate) async fn previous_handler<R>(
    State(service): State<Arc<AssessmentService<R>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: ResultRepository + 'static,
{
    respond(service.previous(&SessionId(session_id)))
}

pub(crate) async fn submit_handler<R>(
    State(service): State<Arc<AssessmentService<R>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: ResultRepository + 'static,
{
    respond(service.submit(&SessionId(session_id)))
}

pub(crate) async fn discard_handler<R>(
    State(service): State<Arc<AssessmentService<R>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: ResultRepository + 'static,
{
    match service.discard(&SessionId(session_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn results_handler<R>(
    State(service): State<Arc<AssessmentService<R>>>,
    Query(query): Query<ResultsQuery>,
) -> Response
where
    R: ResultRepository + 'static,
{
    let limit = query.limit.unwrap_or(DEFAULT_RESULT_LIMIT);
    match service.recent_results(query.assessment_type.as_deref(), limit) {
        Ok(records) => (StatusCode::OK, axum::Json(records)).into_response(),
        Err(err) => error_response(err),
    }
}

fn respond<T: serde::Serialize>(result: Result<T, AssessmentServiceError>) -> Response {
    match result {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: AssessmentServiceError) -> Response {
    let status = status_for(&err);
    let payload = match &err {
        AssessmentServiceError::Session(SessionError::Validation(validation)) => json!({
            "error": err.to_string(),
            "validation": validation,
        }),
        _ => json!({
            "error": err.to_string(),
        }),
    };
    (status, axum::Json(payload)).into_response()
}

fn status_for(err: &AssessmentServiceError) -> StatusCode {
    match err {
        AssessmentServiceError::UnknownSession(_)
        | AssessmentServiceError::Catalog(CatalogError::Unavailable(_)) => StatusCode::NOT_FOUND,
        AssessmentServiceError::Catalog(CatalogError::Load(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        AssessmentServiceError::Persistence(_)
        | AssessmentServiceError::Session(SessionError::Persistence(_)) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        AssessmentServiceError::Session(
            SessionError::AlreadyCompleted
            | SessionError::AlreadyStarted
            | SessionError::SubmitPending,
        ) => StatusCode::CONFLICT,
        AssessmentServiceError::Session(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}
