use crate::infra::{AppState, STORAGE_BACKEND};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::Utc;
use intern_intake::applicants::{applicant_router, ApplicantRepository, ApplicantService};
use intern_intake::auth::{auth_router, AuthService, AuthenticatedUser, UserRepository};
use intern_intake::mail::{
    DispatchError, EmailRequestPayload, MailDispatcher, MailError, MailTransport,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

/// Dispatcher shared by the email routes; `None` when SMTP credentials are missing.
pub(crate) type Mailer<T> = Option<Arc<MailDispatcher<T>>>;

pub(crate) fn api_router<A, U, T>(
    applicants: Arc<ApplicantService<A>>,
    auth: Arc<AuthService<U>>,
    mailer: Mailer<T>,
) -> Router
where
    A: ApplicantRepository + 'static,
    U: UserRepository + 'static,
    T: MailTransport + 'static,
{
    applicant_router(applicants)
        .merge(auth_router(auth))
        .merge(email_router(mailer))
        .route("/api/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/shortlisted", get(legacy_shortlisted))
        .route("/api/approved", get(legacy_approved))
}

pub(crate) fn email_router<T>(mailer: Mailer<T>) -> Router
where
    T: MailTransport + 'static,
{
    Router::new()
        .route("/api/send-email", post(send_email_handler::<T>))
        .route("/api/send-bulk-emails", post(send_bulk_handler::<T>))
        .route("/api/test-email", post(test_email_handler::<T>))
        .with_state(mailer)
}

pub(crate) async fn healthcheck(Extension(state): Extension<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "OK",
        "timestamp": Utc::now().to_rfc3339(),
        "storage": STORAGE_BACKEND,
        "email": if state.email_configured { "Configured" } else { "Not Configured" },
    }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn legacy_shortlisted(_user: AuthenticatedUser) -> Redirect {
    Redirect::to("/api/applicants/shortlisted")
}

pub(crate) async fn legacy_approved(_user: AuthenticatedUser) -> Redirect {
    Redirect::to("/api/applicants/approved")
}

fn failure(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({ "success": false, "message": message.into() })),
    )
        .into_response()
}

fn not_configured(message: &str) -> Response {
    warn!("email requested but SMTP credentials are not configured");
    failure(StatusCode::INTERNAL_SERVER_ERROR, message)
}

pub(crate) async fn send_email_handler<T>(
    State(mailer): State<Mailer<T>>,
    user: AuthenticatedUser,
    Json(payload): Json<EmailRequestPayload>,
) -> Response
where
    T: MailTransport + 'static,
{
    let request = match payload.validate() {
        Ok(request) => request,
        Err(err) => return failure(StatusCode::BAD_REQUEST, err.to_string()),
    };
    let Some(dispatcher) = mailer else {
        return not_configured(&MailError::NotConfigured.to_string());
    };

    info!(
        to = %request.to,
        subject = %request.subject,
        attach_template = request.attach_template,
        by = %user.email,
        "email sending request received"
    );
    match dispatcher.send(request).await {
        Ok(receipt) => Json(json!({
            "success": true,
            "message": "Email sent successfully",
            "messageId": receipt.message_id,
            "attachment": receipt.attachment,
        }))
        .into_response(),
        Err(err) => failure(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

/// Entries stay raw JSON until dispatch so one malformed recipient cannot reject the batch.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct BulkEmailRequest {
    #[serde(default)]
    emails: Option<Value>,
}

pub(crate) async fn send_bulk_handler<T>(
    State(mailer): State<Mailer<T>>,
    user: AuthenticatedUser,
    Json(payload): Json<BulkEmailRequest>,
) -> Response
where
    T: MailTransport + 'static,
{
    let emails = match payload.emails {
        Some(Value::Array(emails)) if !emails.is_empty() => emails,
        _ => return failure(StatusCode::BAD_REQUEST, DispatchError::EmptyBatch.to_string()),
    };
    let Some(dispatcher) = mailer else {
        return not_configured("Email configuration not found");
    };

    info!(count = emails.len(), by = %user.email, "bulk email request received");
    match dispatcher.send_bulk(emails).await {
        Ok(report) => Json(json!({
            "success": true,
            "message": report.message(),
            "results": report.results,
            "summary": report.summary,
            "batches": report.batches,
        }))
        .into_response(),
        Err(DispatchError::Verification(_)) => failure(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Email service configuration error",
        ),
        Err(DispatchError::EmptyBatch) => {
            failure(StatusCode::BAD_REQUEST, DispatchError::EmptyBatch.to_string())
        }
        Err(DispatchError::Delivery(_)) => {
            failure(StatusCode::INTERNAL_SERVER_ERROR, "Failed to send bulk emails")
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TestEmailRequest {
    #[serde(default)]
    to: Option<String>,
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    html: Option<String>,
}

pub(crate) async fn test_email_handler<T>(
    State(mailer): State<Mailer<T>>,
    Json(payload): Json<TestEmailRequest>,
) -> Response
where
    T: MailTransport + 'static,
{
    let present = |value: &Option<String>| value.as_deref().is_some_and(|text| !text.trim().is_empty());
    if !(present(&payload.to) && present(&payload.subject) && present(&payload.html)) {
        return failure(
            StatusCode::BAD_REQUEST,
            "Missing required fields: to, subject, html",
        );
    }

    let request = EmailRequestPayload {
        to: payload.to,
        subject: payload.subject,
        html: payload.html,
        ..EmailRequestPayload::default()
    };
    let request = match request.validate() {
        Ok(request) => request,
        Err(err) => return failure(StatusCode::BAD_REQUEST, err.to_string()),
    };
    let Some(dispatcher) = mailer else {
        return not_configured(&MailError::NotConfigured.to_string());
    };

    match dispatcher.send(request).await {
        Ok(receipt) => Json(json!({
            "success": true,
            "message": "Test email sent successfully",
            "messageId": receipt.message_id,
        }))
        .into_response(),
        Err(err @ DispatchError::Verification(_)) => {
            failure(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
        Err(DispatchError::Delivery(
            err @ (MailError::Authentication(_) | MailError::Connection(_)),
        )) => failure(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
        Err(_) => failure(StatusCode::INTERNAL_SERVER_ERROR, "Failed to send test email"),
    }
}

#[cfg(test)]
mod tests;
