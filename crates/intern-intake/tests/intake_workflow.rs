//! Applicant intake through review to notification, exercised via the public service facades.

mod common {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::{Arc, Mutex};

    use intern_intake::applicants::{
        ApplicantId, ApplicantRecord, ApplicantRepository, ApplicantService, ApplicantStatus,
    };
    use intern_intake::error::RepositoryError;
    use intern_intake::forms::FormAssembler;
    use intern_intake::mail::{
        AttachmentResolver, MailError, MailTransport, MessageId, OutboundEmail,
    };

    #[derive(Default, Clone)]
    pub(super) struct Store {
        records: Arc<Mutex<Vec<ApplicantRecord>>>,
        sequences: Arc<Mutex<HashMap<i32, u32>>>,
        ids: Arc<AtomicU64>,
    }

    impl ApplicantRepository for Store {
        fn insert(&self, record: ApplicantRecord) -> Result<ApplicantRecord, RepositoryError> {
            let mut guard = self.records.lock().expect("store mutex poisoned");
            if guard
                .iter()
                .any(|existing| existing.details.email == record.details.email)
            {
                return Err(RepositoryError::Conflict);
            }
            guard.push(record.clone());
            Ok(record)
        }

        fn update(&self, record: ApplicantRecord) -> Result<(), RepositoryError> {
            let mut guard = self.records.lock().expect("store mutex poisoned");
            let slot = guard
                .iter_mut()
                .find(|existing| existing.id == record.id)
                .ok_or(RepositoryError::NotFound)?;
            *slot = record;
            Ok(())
        }

        fn fetch(&self, id: &ApplicantId) -> Result<Option<ApplicantRecord>, RepositoryError> {
            let guard = self.records.lock().expect("store mutex poisoned");
            Ok(guard.iter().find(|record| &record.id == id).cloned())
        }

        fn find_by_email(
            &self,
            email: &str,
        ) -> Result<Option<ApplicantRecord>, RepositoryError> {
            let guard = self.records.lock().expect("store mutex poisoned");
            Ok(guard
                .iter()
                .find(|record| record.details.email.eq_ignore_ascii_case(email))
                .cloned())
        }

        fn list(
            &self,
            status: Option<ApplicantStatus>,
        ) -> Result<Vec<ApplicantRecord>, RepositoryError> {
            let guard = self.records.lock().expect("store mutex poisoned");
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
            Ok(ApplicantId::from_sequence(
                self.ids.fetch_add(1, Ordering::Relaxed) + 1,
            ))
        }
    }

    #[derive(Default)]
    pub(super) struct Outbox {
        pub(super) sent: Mutex<Vec<OutboundEmail>>,
    }

    impl MailTransport for Outbox {
        async fn verify(&self) -> Result<(), MailError> {
            Ok(())
        }

        async fn send(&self, email: OutboundEmail) -> Result<MessageId, MailError> {
            let mut sent = self.sent.lock().expect("outbox mutex poisoned");
            sent.push(email);
            Ok(MessageId(format!("<{}@outbox>", sent.len())))
        }
    }

    pub(super) fn forms() -> AttachmentResolver {
        let dir = std::env::temp_dir();
        let template = dir.join(format!("intern-intake-workflow-{}.pdf", std::process::id()));
        std::fs::write(&template, b"%PDF-1.3 blank form").expect("write template");
        AttachmentResolver::new(
            FormAssembler::from_font_path(dir.join("intern-intake-workflow-no-font.ttf")),
            template,
        )
    }

    pub(super) fn service() -> ApplicantService<Store> {
        ApplicantService::new(Arc::new(Store::default()), forms())
    }
}

use std::sync::Arc;
use std::time::Duration;

use common::*;
use intern_intake::applicants::{ApplicantStatus, ApplicantSubmission};
use intern_intake::mail::{BulkPolicy, MailDispatcher, TEMPLATE_FORM_FILENAME};

fn submission(email: &str, name: &str) -> ApplicantSubmission {
    serde_json::from_value(serde_json::json!({
        "email": email,
        "name": name,
        "cpf": "778899",
        "age": "22",
        "gender": "male",
        "category": "SC",
        "presentInstitute": "IIT Roorkee",
        "lastSemesterSGPA": 9.1
    }))
    .expect("submission parses")
}

#[tokio::test]
async fn shortlisted_applicants_receive_forms_by_email() {
    let applicants = service();
    let names = ["Ravi Kumar", "Meera Joshi", "Arjun Negi"];
    for (index, name) in names.iter().enumerate() {
        applicants
            .submit(submission(&format!("intern{index}@example.com"), name))
            .expect("submission accepted");
    }

    let pending = applicants
        .list(Some(ApplicantStatus::Pending))
        .expect("pending list");
    assert_eq!(pending.len(), 3);
    for record in pending.iter().take(2) {
        applicants
            .transition(&record.id, ApplicantStatus::Shortlisted, "hr@ongc.co.in")
            .expect("shortlisted");
    }

    let shortlisted = applicants
        .list(Some(ApplicantStatus::Shortlisted))
        .expect("shortlist");
    assert_eq!(shortlisted.len(), 2);

    let outbox = Arc::new(Outbox::default());
    let dispatcher = MailDispatcher::new(
        outbox.clone(),
        forms(),
        BulkPolicy {
            batch_size: 5,
            pause: Duration::ZERO,
        },
    );
    let emails: Vec<serde_json::Value> = shortlisted
        .iter()
        .map(|record| {
            serde_json::json!({
                "to": record.details.email,
                "subject": "Shortlisted for ONGC internship",
                "html": format!(
                    "<p>Dear {}, your Registration number is: {}</p>",
                    record.details.name, record.registration_number
                ),
                "attachTemplate": true,
                "applicantData": record.form_data(),
            })
        })
        .collect();

    let report = dispatcher.send_bulk(emails).await.expect("bulk send");
    assert_eq!(report.summary.sent, 2);
    assert_eq!(report.summary.failed, 0);
    assert_eq!(report.batches, 1);

    let sent = outbox.sent.lock().expect("outbox mutex poisoned");
    assert_eq!(sent.len(), 2);
    for email in sent.iter() {
        assert_eq!(email.attachments.len(), 1);
        assert_eq!(email.attachments[0].filename, TEMPLATE_FORM_FILENAME);
        assert!(email.text.contains("SAIL-"));
    }
}

#[tokio::test]
async fn rejected_applicants_cannot_be_revived() {
    let applicants = service();
    let record = applicants
        .submit(submission("late@example.com", "Late Applicant"))
        .expect("submission accepted");

    applicants
        .transition(&record.id, ApplicantStatus::Rejected, "admin@ongc.co.in")
        .expect("rejected");
    assert!(applicants
        .transition(&record.id, ApplicantStatus::Shortlisted, "admin@ongc.co.in")
        .is_err());

    let stored = applicants.get(&record.id).expect("record kept");
    assert_eq!(stored.status, ApplicantStatus::Rejected);
    assert_eq!(stored.registration_number, record.registration_number);
}
