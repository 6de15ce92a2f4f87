use std::fmt;
use std::future::Future;

use serde::Serialize;

use super::message::OutboundEmail;

/// Message-ID header value assigned to a sent email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MessageId(pub String);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Transport failures, grouped by what the operator has to fix.
#[derive(Debug, Clone, thiserror::Error)]
pub enum MailError {
    #[error("Email configuration not found. Please configure EMAIL_USER and EMAIL_PASS in environment variables.")]
    NotConfigured,
    #[error("Email authentication failed. Please check your email credentials.")]
    Authentication(String),
    #[error("Failed to connect to email server. Please check your network connection.")]
    Connection(String),
    #[error("Email rejected by recipient server. Please check the recipient email address.")]
    Rejected(String),
    #[error("unable to build email: {0}")]
    Message(String),
    #[error("Failed to send email: {0}")]
    Transport(String),
}

impl MailError {
    /// Underlying transport detail, for logs only.
    pub fn detail(&self) -> Option<&str> {
        match self {
            MailError::NotConfigured => None,
            MailError::Authentication(detail)
            | MailError::Connection(detail)
            | MailError::Rejected(detail)
            | MailError::Message(detail)
            | MailError::Transport(detail) => Some(detail),
        }
    }
}

/// Outbound mail seam so dispatch logic can run against fakes.
pub trait MailTransport: Send + Sync {
    /// Check that the relay accepts our connection and credentials.
    fn verify(&self) -> impl Future<Output = Result<(), MailError>> + Send;

    fn send(&self, email: OutboundEmail)
        -> impl Future<Output = Result<MessageId, MailError>> + Send;
}
