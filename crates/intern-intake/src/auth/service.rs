use std::sync::Arc;

use chrono::Utc;
use lettre::Address;
use tracing::{info, warn};

use super::domain::{LoginRequest, LoginResponse, NewUser, UserAccount, UserRole, UserView};
use super::guard::AuthenticatedUser;
use super::password::{hash_password, verify_password};
use super::repository::UserRepository;
use super::token::TokenIssuer;
use super::AuthError;

const MIN_PASSWORD_LEN: usize = 6;

/// Account created on first start when the user store is empty.
#[derive(Debug, Clone, Copy)]
pub struct DefaultUser {
    pub email: &'static str,
    pub password: &'static str,
    pub name: &'static str,
    pub role: UserRole,
    pub department: &'static str,
    pub employee_id: &'static str,
}

pub const DEFAULT_USERS: [DefaultUser; 2] = [
    DefaultUser {
        email: "hr@ongc.co.in",
        password: "password123",
        name: "HR Manager",
        role: UserRole::HrManager,
        department: "Human Resources",
        employee_id: "HR001",
    },
    DefaultUser {
        email: "admin@ongc.co.in",
        password: "admin123",
        name: "System Administrator",
        role: UserRole::Admin,
        department: "IT",
        employee_id: "IT001",
    },
];

fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

/// Login, session lookup and account provisioning over a [`UserRepository`].
///
/// Every method hashes or verifies bcrypt passwords synchronously; async callers should run
/// them on the blocking pool.
pub struct AuthService<R> {
    repository: Arc<R>,
    issuer: Arc<TokenIssuer>,
}

impl<R> AuthService<R>
where
    R: UserRepository + 'static,
{
    pub fn new(repository: Arc<R>, issuer: Arc<TokenIssuer>) -> Self {
        Self { repository, issuer }
    }

    pub fn issuer(&self) -> Arc<TokenIssuer> {
        Arc::clone(&self.issuer)
    }

    pub fn login(&self, request: LoginRequest) -> Result<LoginResponse, AuthError> {
        let email = normalize_email(&request.email);
        if email.is_empty() || request.password.is_empty() {
            return Err(AuthError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        let mut account = self
            .repository
            .find_by_email(&email)?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(&request.password, &account.password_hash) {
            warn!(%email, "login rejected: bad credentials");
            return Err(AuthError::InvalidCredentials);
        }
        if !account.is_active {
            warn!(%email, "login rejected: account deactivated");
            return Err(AuthError::AccountDisabled);
        }

        account.last_login = Some(Utc::now());
        self.repository.update(account.clone())?;

        let issued = self.issuer.issue(&account)?;
        info!(%email, role = account.role.label(), "staff login");
        Ok(LoginResponse {
            token: issued.token,
            user: account.view(),
        })
    }

    /// Resolve the account behind a verified token.
    pub fn current_user(&self, user: &AuthenticatedUser) -> Result<UserView, AuthError> {
        let account = self
            .repository
            .find_by_id(&user.id)?
            .ok_or(AuthError::InvalidToken)?;
        if !account.is_active {
            return Err(AuthError::AccountDisabled);
        }
        Ok(account.view())
    }

    /// Create a staff account. Only administrators may register users.
    pub fn register(
        &self,
        actor: &AuthenticatedUser,
        request: NewUser,
    ) -> Result<UserView, AuthError> {
        actor.require_role(&[UserRole::Admin])?;

        let email = normalize_email(&request.email);
        if email.parse::<Address>().is_err() {
            return Err(AuthError::Validation("A valid email is required".to_string()));
        }
        if request.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        let name = request.name.trim();
        let employee_id = request.employee_id.trim();
        if name.is_empty() || employee_id.is_empty() {
            return Err(AuthError::Validation(
                "Name and employee ID are required".to_string(),
            ));
        }

        let account = UserAccount {
            id: self.repository.next_id()?,
            email,
            password_hash: hash_password(&request.password)?,
            name: name.to_string(),
            role: request.role.unwrap_or_default(),
            department: request
                .department
                .map(|department| department.trim().to_string())
                .filter(|department| !department.is_empty())
                .unwrap_or_else(|| "Human Resources".to_string()),
            employee_id: employee_id.to_string(),
            is_active: true,
            last_login: None,
            created_at: Utc::now(),
        };

        let stored = self.repository.insert(account)?;
        info!(email = %stored.email, role = stored.role.label(), by = %actor.email, "staff account created");
        Ok(stored.view())
    }

    /// Insert [`DEFAULT_USERS`] when no account exists yet. Returns how many were created.
    pub fn seed_defaults(&self) -> Result<usize, AuthError> {
        if self.repository.count()? > 0 {
            return Ok(0);
        }

        for user in DEFAULT_USERS {
            self.repository.insert(UserAccount {
                id: self.repository.next_id()?,
                email: user.email.to_string(),
                password_hash: hash_password(user.password)?,
                name: user.name.to_string(),
                role: user.role,
                department: user.department.to_string(),
                employee_id: user.employee_id.to_string(),
                is_active: true,
                last_login: None,
                created_at: Utc::now(),
            })?;
        }

        info!(count = DEFAULT_USERS.len(), "default staff accounts created");
        Ok(DEFAULT_USERS.len())
    }
}
