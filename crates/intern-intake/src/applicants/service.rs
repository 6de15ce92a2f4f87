use std::io::Read;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use lettre::Address;
use serde::Serialize;
use tracing::{info, warn};

use super::domain::{
    ApplicantId, ApplicantRecord, ApplicantStatus, ApplicantSubmission, QuotaCategory, Term,
};
use super::repository::ApplicantRepository;
use crate::error::RepositoryError;
use crate::mail::{AttachmentResolver, EmailAttachment};

pub fn registration_number(year: i32, sequence: u32) -> String {
    format!("SAIL-{year}-{sequence:04}")
}

/// Outcome of a CSV import. Rows are numbered from 1, excluding the header.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub imported: usize,
    pub failed: Vec<ImportFailure>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportFailure {
    pub row: usize,
    pub error: String,
}

/// Intake, review and form rendering over an [`ApplicantRepository`].
pub struct ApplicantService<R> {
    repository: Arc<R>,
    forms: AttachmentResolver,
}

impl<R> ApplicantService<R>
where
    R: ApplicantRepository + 'static,
{
    pub fn new(repository: Arc<R>, forms: AttachmentResolver) -> Self {
        Self { repository, forms }
    }

    pub fn submit(
        &self,
        submission: ApplicantSubmission,
    ) -> Result<ApplicantRecord, ApplicantServiceError> {
        self.submit_at(submission, Utc::now())
    }

    pub(crate) fn submit_at(
        &self,
        mut submission: ApplicantSubmission,
        now: DateTime<Utc>,
    ) -> Result<ApplicantRecord, ApplicantServiceError> {
        submission.email = submission.email.trim().to_ascii_lowercase();
        submission.name = submission.name.trim().to_string();
        submission.cpf = submission.cpf.trim().to_string();

        if submission.email.is_empty() || submission.name.is_empty() || submission.cpf.is_empty()
        {
            return Err(ApplicantServiceError::Validation(
                "Missing required fields: email, name and cpf".to_string(),
            ));
        }
        if submission.email.parse::<Address>().is_err() {
            return Err(ApplicantServiceError::Validation(format!(
                "invalid email address '{}'",
                submission.email
            )));
        }

        // Duplicates are refused before a registration number is spent.
        if self.repository.find_by_email(&submission.email)?.is_some() {
            return Err(RepositoryError::Conflict.into());
        }

        let submitted_at = *submission.submission_timestamp.get_or_insert(now);
        let sequence = self.repository.next_sequence(now.year())?;
        let record = ApplicantRecord {
            id: self.repository.next_id()?,
            registration_number: registration_number(now.year(), sequence),
            status: ApplicantStatus::Pending,
            term: Term::for_date(submitted_at),
            quota_category: QuotaCategory::from_category(submission.category.as_deref()),
            upload_date: now,
            processed_by: None,
            details: submission,
        };

        let stored = self.repository.insert(record)?;
        info!(
            id = %stored.id,
            registration = %stored.registration_number,
            term = ?stored.term,
            quota = ?stored.quota_category,
            "application received"
        );
        Ok(stored)
    }

    pub fn list(
        &self,
        status: Option<ApplicantStatus>,
    ) -> Result<Vec<ApplicantRecord>, ApplicantServiceError> {
        Ok(self.repository.list(status)?)
    }

    pub fn get(&self, id: &ApplicantId) -> Result<ApplicantRecord, ApplicantServiceError> {
        let record = self.repository.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    /// Move an application to `next`, recording who made the decision.
    pub fn transition(
        &self,
        id: &ApplicantId,
        next: ApplicantStatus,
        processed_by: &str,
    ) -> Result<ApplicantRecord, ApplicantServiceError> {
        let mut record = self.get(id)?;
        if !record.status.can_transition_to(next) {
            return Err(ApplicantServiceError::InvalidTransition {
                from: record.status,
                to: next,
            });
        }

        let previous = record.status;
        record.status = next;
        record.processed_by = Some(processed_by.to_string());
        self.repository.update(record.clone())?;

        info!(%id, from = %previous, to = %next, by = processed_by, "application status changed");
        Ok(record)
    }

    /// Submit every CSV row independently. A malformed header fails the whole import; a
    /// bad row is recorded and skipped.
    pub fn import_csv<Rd: Read>(&self, input: Rd) -> Result<ImportReport, ApplicantServiceError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(input);
        reader.headers()?;

        let mut report = ImportReport::default();
        for (index, row) in reader.deserialize::<ApplicantSubmission>().enumerate() {
            let row_number = index + 1;
            let outcome = row
                .map_err(|err| ApplicantServiceError::Validation(err.to_string()))
                .and_then(|submission| self.submit(submission));

            match outcome {
                Ok(_) => report.imported += 1,
                Err(err) => {
                    warn!(row = row_number, error = %err, "skipping CSV row");
                    report.failed.push(ImportFailure {
                        row: row_number,
                        error: err.to_string(),
                    });
                }
            }
        }

        info!(
            imported = report.imported,
            failed = report.failed.len(),
            "CSV import finished"
        );
        Ok(report)
    }

    /// Filled application form for a stored applicant, or the blank template.
    pub async fn application_form(
        &self,
        id: &ApplicantId,
    ) -> Result<EmailAttachment, ApplicantServiceError> {
        let record = self.get(id)?;
        self.forms
            .filled_or_template(
                Some(record.form_data()),
                Some(record.registration_number.clone()),
            )
            .await
            .ok_or(ApplicantServiceError::FormUnavailable)
    }
}

/// Error raised by the applicant service.
#[derive(Debug, thiserror::Error)]
pub enum ApplicantServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("cannot move application from {from} to {to}")]
    InvalidTransition {
        from: ApplicantStatus,
        to: ApplicantStatus,
    },
    #[error("invalid CSV input: {0}")]
    Csv(#[from] csv::Error),
    #[error("application form is unavailable")]
    FormUnavailable,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
