use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::domain::{ApplicantId, ApplicantStatus, ApplicantSubmission};
use super::repository::ApplicantRepository;
use super::service::{ApplicantService, ApplicantServiceError};
use crate::auth::{AuthenticatedUser, UserRole};
use crate::error::RepositoryError;

const REVIEWERS: [UserRole; 2] = [UserRole::HrManager, UserRole::Admin];

/// Router builder for applicant intake and review under `/api/applicants`.
pub fn applicant_router<R>(service: Arc<ApplicantService<R>>) -> Router
where
    R: ApplicantRepository + 'static,
{
    Router::new()
        .route(
            "/api/applicants",
            post(submit_handler::<R>).get(list_handler::<R>),
        )
        .route("/api/applicants/import", post(import_handler::<R>))
        .route(
            "/api/applicants/shortlisted",
            get(shortlisted_handler::<R>),
        )
        .route("/api/applicants/approved", get(approved_handler::<R>))
        .route("/api/applicants/:applicant_id", get(detail_handler::<R>))
        .route(
            "/api/applicants/:applicant_id/status",
            patch(status_handler::<R>),
        )
        .route(
            "/api/applicants/:applicant_id/form",
            get(form_handler::<R>),
        )
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListQuery {
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusChange {
    status: String,
}

impl IntoResponse for ApplicantServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApplicantServiceError::Validation(_) | ApplicantServiceError::Csv(_) => {
                StatusCode::BAD_REQUEST
            }
            ApplicantServiceError::InvalidTransition { .. }
            | ApplicantServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
            ApplicantServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
            ApplicantServiceError::FormUnavailable
            | ApplicantServiceError::Repository(RepositoryError::Unavailable(_)) => {
                error!(error = %self, "applicant request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = match &self {
            ApplicantServiceError::Repository(RepositoryError::Conflict) => {
                "An application with this email already exists".to_string()
            }
            ApplicantServiceError::Repository(RepositoryError::NotFound) => {
                "Applicant not found".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

fn parse_status(raw: &str) -> Result<ApplicantStatus, Response> {
    raw.parse::<ApplicantStatus>().map_err(|err| {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": err.to_string() })),
        )
            .into_response()
    })
}

fn listing<R>(service: &ApplicantService<R>, status: Option<ApplicantStatus>) -> Response
where
    R: ApplicantRepository + 'static,
{
    match service.list(status) {
        Ok(records) => (
            StatusCode::OK,
            Json(json!({ "count": records.len(), "applicants": records })),
        )
            .into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn submit_handler<R>(
    State(service): State<Arc<ApplicantService<R>>>,
    Json(submission): Json<ApplicantSubmission>,
) -> Response
where
    R: ApplicantRepository + 'static,
{
    match service.submit(submission) {
        Ok(record) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "Application submitted successfully",
                "registrationNumber": record.registration_number,
                "applicant": record,
            })),
        )
            .into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn import_handler<R>(
    State(service): State<Arc<ApplicantService<R>>>,
    user: AuthenticatedUser,
    body: Bytes,
) -> Response
where
    R: ApplicantRepository + 'static,
{
    if let Err(err) = user.require_role(&REVIEWERS) {
        return err.into_response();
    }
    match service.import_csv(body.as_ref()) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn list_handler<R>(
    State(service): State<Arc<ApplicantService<R>>>,
    _user: AuthenticatedUser,
    Query(query): Query<ListQuery>,
) -> Response
where
    R: ApplicantRepository + 'static,
{
    let status = match query.status.as_deref().map(parse_status).transpose() {
        Ok(status) => status,
        Err(response) => return response,
    };
    listing(&service, status)
}

pub(crate) async fn shortlisted_handler<R>(
    State(service): State<Arc<ApplicantService<R>>>,
    _user: AuthenticatedUser,
) -> Response
where
    R: ApplicantRepository + 'static,
{
    listing(&service, Some(ApplicantStatus::Shortlisted))
}

pub(crate) async fn approved_handler<R>(
    State(service): State<Arc<ApplicantService<R>>>,
    _user: AuthenticatedUser,
) -> Response
where
    R: ApplicantRepository + 'static,
{
    listing(&service, Some(ApplicantStatus::Approved))
}

pub(crate) async fn detail_handler<R>(
    State(service): State<Arc<ApplicantService<R>>>,
    _user: AuthenticatedUser,
    Path(applicant_id): Path<String>,
) -> Response
where
    R: ApplicantRepository + 'static,
{
    match service.get(&ApplicantId(applicant_id)) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn status_handler<R>(
    State(service): State<Arc<ApplicantService<R>>>,
    user: AuthenticatedUser,
    Path(applicant_id): Path<String>,
    Json(change): Json<StatusChange>,
) -> Response
where
    R: ApplicantRepository + 'static,
{
    if let Err(err) = user.require_role(&REVIEWERS) {
        return err.into_response();
    }
    let next = match parse_status(&change.status) {
        Ok(next) => next,
        Err(response) => return response,
    };

    match service.transition(&ApplicantId(applicant_id), next, &user.email) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn form_handler<R>(
    State(service): State<Arc<ApplicantService<R>>>,
    _user: AuthenticatedUser,
    Path(applicant_id): Path<String>,
) -> Response
where
    R: ApplicantRepository + 'static,
{
    match service.application_form(&ApplicantId(applicant_id)).await {
        Ok(form) => {
            let disposition = format!("attachment; filename=\"{}\"", form.filename);
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, form.content_type.to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                form.content,
            )
                .into_response()
        }
        Err(err) => err.into_response(),
    }
}
