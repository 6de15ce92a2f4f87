use super::domain::{ApplicantId, ApplicantRecord, ApplicantStatus};
use crate::error::RepositoryError;

/// Storage abstraction for applicant records. Records are never deleted.
///
/// `insert` must return [`RepositoryError::Conflict`] when the (case-insensitive) email is
/// already registered.
pub trait ApplicantRepository: Send + Sync {
    fn insert(&self, record: ApplicantRecord) -> Result<ApplicantRecord, RepositoryError>;
    fn update(&self, record: ApplicantRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ApplicantId) -> Result<Option<ApplicantRecord>, RepositoryError>;
    /// Case-insensitive lookup by applicant email.
    fn find_by_email(&self, email: &str) -> Result<Option<ApplicantRecord>, RepositoryError>;
    /// Records in submission order, optionally limited to one status.
    fn list(&self, status: Option<ApplicantStatus>) -> Result<Vec<ApplicantRecord>, RepositoryError>;
    /// Next per-year sequence number for registration numbers, starting at 1.
    fn next_sequence(&self, year: i32) -> Result<u32, RepositoryError>;
    /// Fresh identifier, unique within this store.
    fn next_id(&self) -> Result<ApplicantId, RepositoryError>;
}
