use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use axum::{Extension, Router};
use serde_json::Value;

use crate::auth::domain::{UserAccount, UserId, UserRole};
use crate::auth::{auth_router, AuthService, AuthenticatedUser, TokenIssuer, UserRepository};
use crate::error::RepositoryError;

#[derive(Default, Clone)]
pub(super) struct MemoryUsers {
    pub(super) accounts: Arc<Mutex<HashMap<UserId, UserAccount>>>,
    ids: Arc<AtomicU64>,
}

impl MemoryUsers {
    pub(super) fn by_email(&self, email: &str) -> Option<UserAccount> {
        self.find_by_email(email).expect("lookup succeeds")
    }

    pub(super) fn count_accounts(&self) -> usize {
        self.count().expect("count succeeds")
    }

    pub(super) fn deactivate(&self, email: &str) {
        let mut account = self.by_email(email).expect("account exists");
        account.is_active = false;
        self.update(account).expect("update succeeds");
    }
}

impl UserRepository for MemoryUsers {
    fn insert(&self, account: UserAccount) -> Result<UserAccount, RepositoryError> {
        let mut guard = self.accounts.lock().expect("repository mutex poisoned");
        if guard
            .values()
            .any(|existing| existing.email == account.email || existing.employee_id == account.employee_id)
        {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(account.id.clone(), account.clone());
        Ok(account)
    }

    fn update(&self, account: UserAccount) -> Result<(), RepositoryError> {
        let mut guard = self.accounts.lock().expect("repository mutex poisoned");
        if !guard.contains_key(&account.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(account.id.clone(), account);
        Ok(())
    }

    fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, RepositoryError> {
        let guard = self.accounts.lock().expect("repository mutex poisoned");
        Ok(guard.values().find(|account| account.email == email).cloned())
    }

    fn find_by_id(&self, id: &UserId) -> Result<Option<UserAccount>, RepositoryError> {
        let guard = self.accounts.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn count(&self) -> Result<usize, RepositoryError> {
        Ok(self.accounts.lock().expect("repository mutex poisoned").len())
    }

    fn next_id(&self) -> Result<UserId, RepositoryError> {
        Ok(UserId::from_sequence(self.ids.fetch_add(1, Ordering::Relaxed) + 1))
    }
}

pub(super) fn seeded_service() -> (Arc<AuthService<MemoryUsers>>, MemoryUsers) {
    let users = MemoryUsers::default();
    let service = AuthService::new(
        Arc::new(users.clone()),
        Arc::new(TokenIssuer::new("test-secret", 24)),
    );
    service.seed_defaults().expect("seed succeeds");
    (Arc::new(service), users)
}

pub(super) fn router(service: &Arc<AuthService<MemoryUsers>>) -> Router {
    auth_router(service.clone()).layer(Extension(service.issuer()))
}

pub(super) fn actor(users: &MemoryUsers, email: &str) -> AuthenticatedUser {
    let account = users.by_email(email).expect("account exists");
    AuthenticatedUser {
        id: account.id,
        email: account.email,
        role: account.role,
    }
}

pub(super) fn admin(users: &MemoryUsers) -> AuthenticatedUser {
    let user = actor(users, "admin@ongc.co.in");
    assert_eq!(user.role, UserRole::Admin);
    user
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
