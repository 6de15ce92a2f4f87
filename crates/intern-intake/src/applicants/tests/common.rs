use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use axum::{Extension, Router};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::applicants::domain::{ApplicantId, ApplicantRecord, ApplicantStatus, ApplicantSubmission};
use crate::applicants::repository::ApplicantRepository;
use crate::applicants::{applicant_router, ApplicantService};
use crate::auth::domain::{UserAccount, UserId, UserRole};
use crate::auth::TokenIssuer;
use crate::error::RepositoryError;
use crate::forms::FormAssembler;
use crate::mail::AttachmentResolver;

#[derive(Default, Clone)]
pub(super) struct MemoryApplicants {
    records: Arc<Mutex<Vec<ApplicantRecord>>>,
    sequences: Arc<Mutex<HashMap<i32, u32>>>,
    ids: Arc<AtomicU64>,
}

impl MemoryApplicants {
    pub(super) fn len(&self) -> usize {
        self.records.lock().expect("repository mutex poisoned").len()
    }
}

impl ApplicantRepository for MemoryApplicants {
    fn insert(&self, record: ApplicantRecord) -> Result<ApplicantRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard
            .iter()
            .any(|existing| existing.details.email.eq_ignore_ascii_case(&record.details.email))
        {
            return Err(RepositoryError::Conflict);
        }
        guard.push(record.clone());
        Ok(record)
    }

    fn update(&self, record: ApplicantRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let slot = guard
            .iter_mut()
            .find(|existing| existing.id == record.id)
            .ok_or(RepositoryError::NotFound)?;
        *slot = record;
        Ok(())
    }

    fn fetch(&self, id: &ApplicantId) -> Result<Option<ApplicantRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.iter().find(|record| &record.id == id).cloned())
    }

    fn find_by_email(&self, email: &str) -> Result<Option<ApplicantRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .iter()
            .find(|record| record.details.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    fn list(&self, status: Option<ApplicantStatus>) -> Result<Vec<ApplicantRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .iter()
            .filter(|record| status.map_or(true, |status| record.status == status))
            .cloned()
            .collect())
    }

    fn next_sequence(&self, year: i32) -> Result<u32, RepositoryError> {
        let mut guard = self.sequences.lock().expect("sequence mutex poisoned");
        let next = guard.entry(year).or_insert(0);
        *next += 1;
        Ok(*next)
    }

    fn next_id(&self) -> Result<ApplicantId, RepositoryError> {
        Ok(ApplicantId::from_sequence(self.ids.fetch_add(1, Ordering::Relaxed) + 1))
    }
}

pub(super) struct UnavailableApplicants;

impl ApplicantRepository for UnavailableApplicants {
    fn insert(&self, _record: ApplicantRecord) -> Result<ApplicantRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: ApplicantRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ApplicantId) -> Result<Option<ApplicantRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn find_by_email(&self, _email: &str) -> Result<Option<ApplicantRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self, _status: Option<ApplicantStatus>) -> Result<Vec<ApplicantRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn next_sequence(&self, _year: i32) -> Result<u32, RepositoryError> {
        Ok(1)
    }

    fn next_id(&self) -> Result<ApplicantId, RepositoryError> {
        Ok(ApplicantId::from_sequence(1))
    }
}

pub(super) fn template_path() -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "intern-intake-applicants-template-{}.pdf",
        std::process::id()
    ));
    std::fs::write(&path, b"%PDF-1.3 blank application form").expect("write template");
    path
}

pub(super) fn forms() -> AttachmentResolver {
    let assembler = FormAssembler::from_font_path(
        std::env::temp_dir().join("intern-intake-applicants-no-font.ttf"),
    );
    AttachmentResolver::new(assembler, template_path())
}

pub(super) fn build_service() -> (Arc<ApplicantService<MemoryApplicants>>, MemoryApplicants) {
    let repository = MemoryApplicants::default();
    let service = ApplicantService::new(Arc::new(repository.clone()), forms());
    (Arc::new(service), repository)
}

pub(super) fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 10, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn submission(email: &str) -> ApplicantSubmission {
    ApplicantSubmission {
        email: email.to_string(),
        name: "Asha Verma".to_string(),
        cpf: "123456".to_string(),
        age: Some(21),
        gender: Some("female".to_string()),
        category: Some("OBC".to_string()),
        mobile_no: Some("9876543210".to_string()),
        present_institute: Some("Graphic Era University".to_string()),
        areas_of_training: Some("Computer Science".to_string()),
        last_semester_sgpa: Some(8.7),
        designation: Some("Chief Engineer".to_string()),
        ..ApplicantSubmission::default()
    }
}

pub(super) fn token(issuer: &TokenIssuer, role: UserRole) -> String {
    let account = UserAccount {
        id: UserId("usr-test".to_string()),
        email: format!("{}@ongc.co.in", role.label()),
        password_hash: String::new(),
        name: "Reviewer".to_string(),
        role,
        department: "Human Resources".to_string(),
        employee_id: "T001".to_string(),
        is_active: true,
        last_login: None,
        created_at: Utc::now(),
    };
    issuer.issue(&account).expect("token issued").token
}

pub(super) fn router(
    service: &Arc<ApplicantService<MemoryApplicants>>,
    issuer: &Arc<TokenIssuer>,
) -> Router {
    applicant_router(service.clone()).layer(Extension(issuer.clone()))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 256 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
