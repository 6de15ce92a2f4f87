//! Applicant intake, review workflow and per-applicant application forms.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicantId, ApplicantRecord, ApplicantStatus, ApplicantSubmission, QuotaCategory, Term,
    UnknownStatus,
};
pub use repository::ApplicantRepository;
pub use router::applicant_router;
pub use service::{
    registration_number, ApplicantService, ApplicantServiceError, ImportFailure, ImportReport,
};
