use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use super::domain::{UserId, UserRole};
use super::token::TokenIssuer;
use super::AuthError;

/// Caller identity extracted from an `Authorization: Bearer` header.
///
/// The [`TokenIssuer`] is read from request extensions, so routers using this extractor must
/// be wrapped in `Extension(Arc<TokenIssuer>)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: UserId,
    pub email: String,
    pub role: UserRole,
}

impl AuthenticatedUser {
    pub fn require_role(&self, allowed: &[UserRole]) -> Result<(), AuthError> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(AuthError::Forbidden)
        }
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let issuer = parts
            .extensions
            .get::<Arc<TokenIssuer>>()
            .cloned()
            .ok_or(AuthError::IssuerMissing)?;
        let token = bearer_token(parts).ok_or(AuthError::MissingToken)?;
        let claims = issuer.verify(token)?;

        Ok(AuthenticatedUser {
            id: UserId(claims.sub),
            email: claims.email,
            role: claims.role,
        })
    }
}
