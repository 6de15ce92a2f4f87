use lettre::Address;
use serde::Deserialize;

use crate::forms::ApplicantFormData;

/// Email request as it arrives on the wire. Every field is optional until
/// [`EmailRequestPayload::validate`] runs.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailRequestPayload {
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub attach_template: bool,
    #[serde(default)]
    pub applicant_data: Option<ApplicantFormData>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmailValidationError {
    #[error("Missing required fields: to, subject, and html/text content")]
    MissingFields,
    #[error("invalid recipient address '{0}'")]
    InvalidRecipient(String),
}

/// A request that passed validation and can be dispatched.
#[derive(Debug, Clone)]
pub struct EmailRequest {
    pub to: Address,
    pub subject: String,
    pub html: Option<String>,
    pub text: Option<String>,
    pub attach_template: bool,
    pub applicant_data: Option<ApplicantFormData>,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

impl EmailRequestPayload {
    pub fn validate(self) -> Result<EmailRequest, EmailValidationError> {
        let to = present(self.to);
        let subject = present(self.subject);
        let html = present(self.html);
        let text = present(self.text);

        let (Some(to), Some(subject)) = (to, subject) else {
            return Err(EmailValidationError::MissingFields);
        };
        if html.is_none() && text.is_none() {
            return Err(EmailValidationError::MissingFields);
        }

        let to = to
            .trim()
            .parse::<Address>()
            .map_err(|_| EmailValidationError::InvalidRecipient(to.clone()))?;

        Ok(EmailRequest {
            to,
            subject,
            html,
            text,
            attach_template: self.attach_template,
            applicant_data: self.applicant_data,
        })
    }
}

impl EmailRequest {
    /// Plain-text body: the explicit text, or the HTML with tags removed.
    pub fn plain_text(&self) -> String {
        match (&self.text, &self.html) {
            (Some(text), _) => text.clone(),
            (None, Some(html)) => strip_html_tags(html),
            (None, None) => String::new(),
        }
    }

    pub fn registration_number(&self) -> Option<String> {
        self.html.as_deref().and_then(extract_registration_number)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAttachment {
    pub filename: String,
    pub content_type: mime::Mime,
    pub content: Vec<u8>,
}

/// Fully resolved message handed to a [`super::MailTransport`].
#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub to: Address,
    pub subject: String,
    pub html: Option<String>,
    pub text: String,
    pub attachments: Vec<EmailAttachment>,
}

/// Drop everything between `<` and `>`.
pub fn strip_html_tags(html: &str) -> String {
    let mut plain = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(open) = rest.find('<') {
        plain.push_str(&rest[..open]);
        match rest[open..].find('>') {
            Some(close) => rest = &rest[open + close + 1..],
            None => {
                plain.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    plain.push_str(rest);
    plain
}

const REGISTRATION_PREFIX: &str = "SAIL-";

/// First `SAIL-dddd-dddd` token in `body`.
pub fn extract_registration_number(body: &str) -> Option<String> {
    body.match_indices(REGISTRATION_PREFIX)
        .map(|(start, _)| &body[start..])
        .find(|candidate| is_registration_number(candidate))
        .map(|candidate| candidate[..REGISTRATION_PREFIX.len() + 9].to_string())
}

fn is_registration_number(candidate: &str) -> bool {
    let digits = &candidate.as_bytes()[REGISTRATION_PREFIX.len()..];
    digits.len() >= 9
        && digits[..4].iter().all(u8::is_ascii_digit)
        && digits[4] == b'-'
        && digits[5..9].iter().all(u8::is_ascii_digit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: serde_json::Value) -> EmailRequestPayload {
        serde_json::from_value(value).expect("payload parses")
    }

    #[test]
    fn validation_requires_recipient_subject_and_body() {
        let missing_body = payload(json!({ "to": "a@example.com", "subject": "Hi" }));
        assert_eq!(
            missing_body.validate().unwrap_err(),
            EmailValidationError::MissingFields
        );

        let blank_subject = payload(json!({ "to": "a@example.com", "subject": " ", "text": "x" }));
        assert_eq!(
            blank_subject.validate().unwrap_err(),
            EmailValidationError::MissingFields
        );

        let bad_address = payload(json!({ "to": "not-an-address", "subject": "Hi", "text": "x" }));
        assert!(matches!(
            bad_address.validate(),
            Err(EmailValidationError::InvalidRecipient(_))
        ));
    }

    #[test]
    fn validated_request_keeps_optional_fields() {
        let request = payload(json!({
            "to": "asha@example.com",
            "subject": "Selection",
            "html": "<p>Your Registration number is: <b>SAIL-2025-0042</b></p>",
            "attachTemplate": true,
            "applicantData": { "name": "Asha", "age": 21 }
        }))
        .validate()
        .expect("valid request");

        assert!(request.attach_template);
        assert_eq!(request.to.to_string(), "asha@example.com");
        assert_eq!(
            request.plain_text(),
            "Your Registration number is: SAIL-2025-0042"
        );
        assert_eq!(request.registration_number().as_deref(), Some("SAIL-2025-0042"));
        let applicant = request.applicant_data.expect("applicant data");
        assert_eq!(applicant.age.as_deref(), Some("21"));
    }

    #[test]
    fn registration_number_needs_exact_digit_groups() {
        assert_eq!(extract_registration_number("SAIL-25-0001"), None);
        assert_eq!(
            extract_registration_number("ref SAIL-12-3 then SAIL-2024-1234X"),
            Some("SAIL-2024-1234".to_string())
        );
        assert_eq!(extract_registration_number("SAIL-"), None);
    }

    #[test]
    fn strip_tags_keeps_unterminated_text() {
        assert_eq!(strip_html_tags("<h1>Hello</h1> world"), "Hello world");
        assert_eq!(strip_html_tags("a < b"), "a < b");
    }
}
