//! Staff accounts, password hashing, JWT sessions and route guards.

pub mod domain;
pub mod guard;
pub mod password;
pub mod repository;
pub mod router;
pub mod service;
pub mod token;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::error::RepositoryError;

pub use domain::{LoginRequest, LoginResponse, NewUser, UserAccount, UserId, UserRole, UserView};
pub use guard::AuthenticatedUser;
pub use password::{hash_password, verify_password, PASSWORD_COST};
pub use repository::UserRepository;
pub use router::auth_router;
pub use service::{AuthService, DEFAULT_USERS};
pub use token::{Claims, IssuedToken, TokenIssuer};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Account is deactivated")]
    AccountDisabled,
    #[error("Access token required")]
    MissingToken,
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error("Insufficient permissions")]
    Forbidden,
    #[error("User with this email or employee ID already exists")]
    Duplicate,
    #[error("{0}")]
    Validation(String),
    #[error("password hashing failed: {0}")]
    Hashing(#[from] bcrypt::BcryptError),
    #[error("token signing failed: {0}")]
    Signing(String),
    #[error("token verification is not configured")]
    IssuerMissing,
    #[error("authentication worker failed: {0}")]
    Worker(String),
    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for AuthError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::Conflict => AuthError::Duplicate,
            other => AuthError::Repository(other),
        }
    }
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredentials | AuthError::MissingToken | AuthError::InvalidToken => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::AccountDisabled | AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::Duplicate => StatusCode::CONFLICT,
            AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
            AuthError::Hashing(_)
            | AuthError::Signing(_)
            | AuthError::IssuerMissing
            | AuthError::Worker(_)
            | AuthError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests;
