//! Outbound email: validated requests, attachment resolution and (bulk) dispatch.

pub mod attachments;
pub mod dispatch;
pub mod message;
pub mod smtp;
pub mod transport;

pub use attachments::{AttachmentResolver, FILLED_FORM_FILENAME, TEMPLATE_FORM_FILENAME};
pub use dispatch::{
    BulkPolicy, BulkReport, BulkSummary, DispatchError, MailDispatcher, RecipientOutcome,
    SendReceipt,
};
pub use message::{
    extract_registration_number, strip_html_tags, EmailAttachment, EmailRequest,
    EmailRequestPayload, EmailValidationError, OutboundEmail,
};
pub use smtp::SmtpMailTransport;
pub use transport::{MailError, MailTransport, MessageId};
