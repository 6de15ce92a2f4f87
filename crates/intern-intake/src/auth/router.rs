use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tracing::warn;

use super::domain::{LoginRequest, NewUser};
use super::guard::AuthenticatedUser;
use super::repository::UserRepository;
use super::service::AuthService;
use super::AuthError;

/// Login, current-user and registration endpoints under `/api/auth`.
pub fn auth_router<R>(service: Arc<AuthService<R>>) -> Router
where
    R: UserRepository + 'static,
{
    Router::new()
        .route("/api/auth/login", post(login_handler::<R>))
        .route("/api/auth/me", get(me_handler::<R>))
        .route("/api/auth/register", post(register_handler::<R>))
        .with_state(service)
}

/// Run a bcrypt-bound service call off the async workers.
async fn blocking<R, T, F>(service: Arc<AuthService<R>>, task: F) -> Result<T, AuthError>
where
    R: UserRepository + 'static,
    T: Send + 'static,
    F: FnOnce(&AuthService<R>) -> Result<T, AuthError> + Send + 'static,
{
    tokio::task::spawn_blocking(move || task(&service))
        .await
        .map_err(|err| AuthError::Worker(err.to_string()))?
}

pub(crate) async fn login_handler<R>(
    State(service): State<Arc<AuthService<R>>>,
    Json(request): Json<LoginRequest>,
) -> Response
where
    R: UserRepository + 'static,
{
    match blocking(service, move |service| service.login(request)).await {
        Ok(session) => (StatusCode::OK, Json(session)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn me_handler<R>(
    State(service): State<Arc<AuthService<R>>>,
    user: AuthenticatedUser,
) -> Response
where
    R: UserRepository + 'static,
{
    match service.current_user(&user) {
        Ok(view) => (StatusCode::OK, Json(json!({ "user": view }))).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn register_handler<R>(
    State(service): State<Arc<AuthService<R>>>,
    user: AuthenticatedUser,
    Json(request): Json<NewUser>,
) -> Response
where
    R: UserRepository + 'static,
{
    match blocking(service, move |service| service.register(&user, request)).await {
        Ok(view) => (
            StatusCode::CREATED,
            Json(json!({ "message": "User created successfully", "user": view })),
        )
            .into_response(),
        Err(err) => {
            warn!(error = %err, "user registration failed");
            err.into_response()
        }
    }
}
