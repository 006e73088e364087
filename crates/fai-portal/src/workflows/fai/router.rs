use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use super::analysis::AnalysisCollaborator;
use super::domain::{Actor, ActorRole, DocumentUpload, SubmissionDraft, SubmissionId, Verdict};
use super::repository::{RepositoryError, SubmissionRepository};
use super::service::{FaiServiceError, FaiSubmissionService, ValidationError};

pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";
pub const ACTOR_ORGANIZATION_HEADER: &str = "x-actor-organization";

/// Router builder exposing the FAI submission lifecycle over HTTP. The actor
/// identity arrives via trusted headers set by the upstream identity layer.
pub fn fai_router<R, C>(service: Arc<FaiSubmissionService<R, C>>) -> Router
where
    R: SubmissionRepository + 'static,
    C: AnalysisCollaborator + 'static,
{
    Router::new()
        .route(
            "/api/v1/fai/submissions",
            post(submit_handler::<R, C>).get(list_handler::<R, C>),
        )
        .route(
            "/api/v1/fai/submissions/:submission_id",
            get(detail_handler::<R, C>),
        )
        .route(
            "/api/v1/fai/submissions/:submission_id/decision",
            post(decision_handler::<R, C>),
        )
        .route(
            "/api/v1/fai/submissions/:submission_id/resubmit",
            post(resubmit_handler::<R, C>),
        )
        .route(
            "/api/v1/fai/submissions/:submission_id/acknowledge",
            post(acknowledge_handler::<R, C>),
        )
        .route("/api/v1/fai/queue", get(queue_handler::<R, C>))
        .route("/api/v1/fai/stats", get(stats_handler::<R, C>))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct DecisionRequest {
    pub(crate) verdict: Verdict,
    pub(crate) remarks: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResubmitRequest {
    pub(crate) files: Vec<DocumentUpload>,
}

fn actor_from_headers(headers: &HeaderMap) -> Result<Actor, Response> {
    let forbidden = |message: &str| {
        (
            StatusCode::FORBIDDEN,
            axum::Json(json!({ "error": message })),
        )
            .into_response()
    };

    let role = headers
        .get(ACTOR_ROLE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| forbidden("missing or unreadable actor role header"))?;
    let role = match role {
        "SUPPLIER" => ActorRole::Supplier,
        "IQA" => ActorRole::Iqa,
        _ => return Err(forbidden("unrecognized actor role")),
    };

    let organization = headers
        .get(ACTOR_ORGANIZATION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| forbidden("missing actor organization header"))?;

    Ok(Actor {
        role,
        organization: organization.to_string(),
    })
}

fn error_response(error: FaiServiceError) -> Response {
    let status = match &error {
        FaiServiceError::Validation(
            ValidationError::RoleNotPermitted { .. } | ValidationError::NotSubmissionOwner,
        ) => StatusCode::FORBIDDEN,
        FaiServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        FaiServiceError::StateConflict(_) => StatusCode::CONFLICT,
        FaiServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        FaiServiceError::Repository(
            RepositoryError::Conflict | RepositoryError::StatusMismatch { .. },
        ) => StatusCode::CONFLICT,
        FaiServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn submit_handler<R, C>(
    State(service): State<Arc<FaiSubmissionService<R, C>>>,
    headers: HeaderMap,
    axum::Json(draft): axum::Json<SubmissionDraft>,
) -> Response
where
    R: SubmissionRepository + 'static,
    C: AnalysisCollaborator + 'static,
{
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    match service.submit(&actor, draft).await {
        Ok(submission) => {
            (StatusCode::ACCEPTED, axum::Json(submission.view())).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_handler<R, C>(
    State(service): State<Arc<FaiSubmissionService<R, C>>>,
    headers: HeaderMap,
) -> Response
where
    R: SubmissionRepository + 'static,
    C: AnalysisCollaborator + 'static,
{
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    match service.list_for_actor(&actor) {
        Ok(submissions) => {
            let views: Vec<_> = submissions.iter().map(|s| s.view()).collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn detail_handler<R, C>(
    State(service): State<Arc<FaiSubmissionService<R, C>>>,
    headers: HeaderMap,
    Path(submission_id): Path<String>,
) -> Response
where
    R: SubmissionRepository + 'static,
    C: AnalysisCollaborator + 'static,
{
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    match service.get(&actor, &SubmissionId(submission_id)) {
        Ok(submission) => (StatusCode::OK, axum::Json(submission.view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn decision_handler<R, C>(
    State(service): State<Arc<FaiSubmissionService<R, C>>>,
    headers: HeaderMap,
    Path(submission_id): Path<String>,
    axum::Json(request): axum::Json<DecisionRequest>,
) -> Response
where
    R: SubmissionRepository + 'static,
    C: AnalysisCollaborator + 'static,
{
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    let id = SubmissionId(submission_id);
    match service.record_decision(&actor, &id, request.verdict, &request.remarks) {
        Ok(submission) => (StatusCode::OK, axum::Json(submission.view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn resubmit_handler<R, C>(
    State(service): State<Arc<FaiSubmissionService<R, C>>>,
    headers: HeaderMap,
    Path(submission_id): Path<String>,
    axum::Json(request): axum::Json<ResubmitRequest>,
) -> Response
where
    R: SubmissionRepository + 'static,
    C: AnalysisCollaborator + 'static,
{
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    let id = SubmissionId(submission_id);
    match service.resubmit(&actor, &id, request.files).await {
        Ok(submission) => (StatusCode::OK, axum::Json(submission.view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn acknowledge_handler<R, C>(
    State(service): State<Arc<FaiSubmissionService<R, C>>>,
    headers: HeaderMap,
    Path(submission_id): Path<String>,
) -> Response
where
    R: SubmissionRepository + 'static,
    C: AnalysisCollaborator + 'static,
{
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    let id = SubmissionId(submission_id);
    match service.acknowledge_verdict(&actor, &id) {
        Ok(submission) => (StatusCode::OK, axum::Json(submission.view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn queue_handler<R, C>(
    State(service): State<Arc<FaiSubmissionService<R, C>>>,
) -> Response
where
    R: SubmissionRepository + 'static,
    C: AnalysisCollaborator + 'static,
{
    match service.review_queue() {
        Ok(submissions) => {
            let views: Vec<_> = submissions.iter().map(|s| s.view()).collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn stats_handler<R, C>(
    State(service): State<Arc<FaiSubmissionService<R, C>>>,
) -> Response
where
    R: SubmissionRepository + 'static,
    C: AnalysisCollaborator + 'static,
{
    match service.dashboard_stats(Utc::now()) {
        Ok(stats) => (StatusCode::OK, axum::Json(stats)).into_response(),
        Err(error) => error_response(error),
    }
}
