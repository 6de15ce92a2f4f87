use intern_intake::applicants::{ApplicantId, ApplicantRecord, ApplicantRepository, ApplicantStatus};
use intern_intake::auth::{UserAccount, UserId, UserRepository};
use intern_intake::error::RepositoryError;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

pub(crate) const STORAGE_BACKEND: &str = "in-memory";

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) email_configured: bool,
}

#[derive(Default)]
struct ApplicantTable {
    records: Vec<ApplicantRecord>,
    index: HashMap<ApplicantId, usize>,
    sequences: HashMap<i32, u32>,
    issued_ids: u64,
}

/// Applicant store kept in submission order.
#[derive(Default, Clone)]
pub(crate) struct InMemoryApplicantRepository {
    table: Arc<Mutex<ApplicantTable>>,
}

impl ApplicantRepository for InMemoryApplicantRepository {
    fn insert(&self, record: ApplicantRecord) -> Result<ApplicantRecord, RepositoryError> {
        let mut guard = self.table.lock().expect("repository mutex poisoned");
        let duplicate = guard.index.contains_key(&record.id)
            || guard
                .records
                .iter()
                .any(|existing| existing.details.email.eq_ignore_ascii_case(&record.details.email));
        if duplicate {
            return Err(RepositoryError::Conflict);
        }

        let position = guard.records.len();
        guard.index.insert(record.id.clone(), position);
        guard.records.push(record.clone());
        Ok(record)
    }

    fn update(&self, record: ApplicantRecord) -> Result<(), RepositoryError> {
        let mut guard = self.table.lock().expect("repository mutex poisoned");
        let position = *guard.index.get(&record.id).ok_or(RepositoryError::NotFound)?;
        guard.records[position] = record;
        Ok(())
    }

    fn fetch(&self, id: &ApplicantId) -> Result<Option<ApplicantRecord>, RepositoryError> {
        let guard = self.table.lock().expect("repository mutex poisoned");
        Ok(guard
            .index
            .get(id)
            .map(|position| guard.records[*position].clone()))
    }

    fn find_by_email(&self, email: &str) -> Result<Option<ApplicantRecord>, RepositoryError> {
        let guard = self.table.lock().expect("repository mutex poisoned");
        Ok(guard
            .records
            .iter()
            .find(|record| record.details.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    fn list(
        &self,
        status: Option<ApplicantStatus>,
    ) -> Result<Vec<ApplicantRecord>, RepositoryError> {
        let guard = self.table.lock().expect("repository mutex poisoned");
        Ok(guard
            .records
            .iter()
            .filter(|record| status.map_or(true, |status| record.status == status))
            .cloned()
            .collect())
    }

    fn next_sequence(&self, year: i32) -> Result<u32, RepositoryError> {
        let mut guard = self.table.lock().expect("repository mutex poisoned");
        let sequence = guard.sequences.entry(year).or_insert(0);
        *sequence += 1;
        Ok(*sequence)
    }

    fn next_id(&self) -> Result<ApplicantId, RepositoryError> {
        let mut guard = self.table.lock().expect("repository mutex poisoned");
        guard.issued_ids += 1;
        Ok(ApplicantId::from_sequence(guard.issued_ids))
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryUserRepository {
    accounts: Arc<Mutex<HashMap<UserId, UserAccount>>>,
    issued_ids: Arc<AtomicU64>,
}

impl UserRepository for InMemoryUserRepository {
    fn insert(&self, account: UserAccount) -> Result<UserAccount, RepositoryError> {
        let mut guard = self.accounts.lock().expect("repository mutex poisoned");
        let taken = guard.values().any(|existing| {
            existing.email.eq_ignore_ascii_case(&account.email)
                || existing.employee_id == account.employee_id
        });
        if taken || guard.contains_key(&account.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(account.id.clone(), account.clone());
        Ok(account)
    }

    fn update(&self, account: UserAccount) -> Result<(), RepositoryError> {
        let mut guard = self.accounts.lock().expect("repository mutex poisoned");
        if guard.contains_key(&account.id) {
            guard.insert(account.id.clone(), account);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, RepositoryError> {
        let guard = self.accounts.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .find(|account| account.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    fn find_by_id(&self, id: &UserId) -> Result<Option<UserAccount>, RepositoryError> {
        let guard = self.accounts.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn count(&self) -> Result<usize, RepositoryError> {
        Ok(self.accounts.lock().expect("repository mutex poisoned").len())
    }

    fn next_id(&self) -> Result<UserId, RepositoryError> {
        Ok(UserId::from_sequence(
            self.issued_ids.fetch_add(1, Ordering::Relaxed) + 1,
        ))
    }
}
