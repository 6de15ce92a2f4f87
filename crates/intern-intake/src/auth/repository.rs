use super::domain::{UserAccount, UserId};
use crate::error::RepositoryError;

/// Storage seam for staff accounts.
///
/// `insert` must return [`RepositoryError::Conflict`] when the email or employee ID is taken.
pub trait UserRepository: Send + Sync {
    fn insert(&self, account: UserAccount) -> Result<UserAccount, RepositoryError>;
    fn update(&self, account: UserAccount) -> Result<(), RepositoryError>;
    fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, RepositoryError>;
    fn find_by_id(&self, id: &UserId) -> Result<Option<UserAccount>, RepositoryError>;
    fn count(&self) -> Result<usize, RepositoryError>;
    /// Fresh identifier, unique within this store.
    fn next_id(&self) -> Result<UserId, RepositoryError>;
}
