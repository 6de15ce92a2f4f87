use std::path::{Path, PathBuf};

use tracing::{error, warn};

use super::message::{EmailAttachment, EmailRequest};
use crate::forms::{ApplicantFormData, FormAssembler};

pub const FILLED_FORM_FILENAME: &str = "ONGC_Internship_Application_Form_Filled.pdf";
pub const TEMPLATE_FORM_FILENAME: &str = "ONGC_Internship_Application_Form.pdf";

/// Chooses the application form attached to an email: a freshly rendered, pre-filled form
/// when possible, otherwise the static blank template.
#[derive(Debug, Clone)]
pub struct AttachmentResolver {
    assembler: FormAssembler,
    template_path: PathBuf,
}

impl AttachmentResolver {
    pub fn new(assembler: FormAssembler, template_path: impl Into<PathBuf>) -> Self {
        Self {
            assembler,
            template_path: template_path.into(),
        }
    }

    pub fn template_path(&self) -> &Path {
        &self.template_path
    }

    /// Attachment for `request`, or `None` when no template was asked for or nothing
    /// could be produced.
    pub async fn resolve(&self, request: &EmailRequest) -> Option<EmailAttachment> {
        if !request.attach_template {
            return None;
        }
        self.filled_or_template(request.applicant_data.clone(), request.registration_number())
            .await
    }

    pub async fn filled_or_template(
        &self,
        applicant: Option<ApplicantFormData>,
        registration_number: Option<String>,
    ) -> Option<EmailAttachment> {
        if let Some(applicant) = applicant {
            if let Some(content) = self.render(applicant, registration_number).await {
                return Some(EmailAttachment {
                    filename: FILLED_FORM_FILENAME.to_string(),
                    content_type: mime::APPLICATION_PDF,
                    content,
                });
            }
        }
        self.template().await
    }

    async fn render(
        &self,
        applicant: ApplicantFormData,
        registration_number: Option<String>,
    ) -> Option<Vec<u8>> {
        let assembler = self.assembler.clone();
        let rendered = tokio::task::spawn_blocking(move || {
            assembler.create_application_form(&applicant, registration_number.as_deref())
        })
        .await;

        match rendered {
            Ok(Ok(bytes)) if !bytes.is_empty() => Some(bytes),
            Ok(Ok(_)) => {
                warn!("form renderer returned an empty document");
                None
            }
            Ok(Err(err)) => {
                error!(error = %err, "error creating filled application form");
                None
            }
            Err(err) => {
                error!(error = %err, "form rendering task failed");
                None
            }
        }
    }

    async fn template(&self) -> Option<EmailAttachment> {
        match tokio::fs::read(&self.template_path).await {
            Ok(content) => Some(EmailAttachment {
                filename: TEMPLATE_FORM_FILENAME.to_string(),
                content_type: mime::APPLICATION_PDF,
                content,
            }),
            Err(err) => {
                warn!(
                    path = %self.template_path.display(),
                    error = %err,
                    "template PDF not available"
                );
                None
            }
        }
    }
}
