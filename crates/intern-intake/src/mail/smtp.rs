use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::response::Code;
use lettre::transport::smtp::Error as SmtpError;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, info};

use super::message::OutboundEmail;
use super::transport::{MailError, MailTransport, MessageId};
use crate::config::MailConfig;

/// STARTTLS SMTP relay backed by lettre.
pub struct SmtpMailTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    sequence: AtomicU64,
}

impl std::fmt::Debug for SmtpMailTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpMailTransport")
            .field("from", &self.from.to_string())
            .finish_non_exhaustive()
    }
}

impl SmtpMailTransport {
    pub fn from_config(config: &MailConfig) -> Result<Self, MailError> {
        let credentials = config.credentials.as_ref().ok_or(MailError::NotConfigured)?;

        let address = credentials
            .username
            .parse()
            .map_err(|err| MailError::Message(format!("invalid EMAIL_USER address: {err}")))?;
        let from = Mailbox::new(Some(config.from_name.clone()), address);

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|err| MailError::Connection(err.to_string()))?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                credentials.username.clone(),
                credentials.password.clone(),
            ))
            .build();

        info!(
            host = %config.smtp_host,
            port = config.smtp_port,
            user = %credentials.username,
            "email transporter configured"
        );

        Ok(Self {
            transport,
            from,
            sequence: AtomicU64::new(1),
        })
    }

    fn next_message_id(&self) -> MessageId {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let domain = self.from.email.domain();
        MessageId(format!(
            "<{}.{sequence:06}@{domain}>",
            Utc::now().timestamp_millis()
        ))
    }

    fn build_message(&self, email: OutboundEmail, id: &MessageId) -> Result<Message, MailError> {
        let builder = Message::builder()
            .from(self.from.clone())
            .to(Mailbox::new(None, email.to))
            .subject(email.subject)
            .message_id(Some(id.0.clone()));

        let body = match email.html {
            Some(html) => MultiPart::alternative_plain_html(email.text, html),
            None => MultiPart::mixed().singlepart(SinglePart::plain(email.text)),
        };

        let body = if email.attachments.is_empty() {
            body
        } else {
            let mut mixed = MultiPart::mixed().multipart(body);
            for attachment in email.attachments {
                let content_type = ContentType::parse(attachment.content_type.as_ref())
                    .map_err(|err| MailError::Message(err.to_string()))?;
                mixed = mixed.singlepart(
                    Attachment::new(attachment.filename).body(attachment.content, content_type),
                );
            }
            mixed
        };

        builder
            .multipart(body)
            .map_err(|err| MailError::Message(err.to_string()))
    }
}

/// How the relay conversation broke down, before it is mapped onto [`MailError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Failure {
    /// 5xx reply.
    Permanent(Option<Code>),
    /// 4xx reply.
    Transient(Option<Code>),
    /// Client-side protocol trouble: unparseable reply, no usable auth mechanism.
    Protocol,
    /// Socket, TLS or timeout; the relay was never properly reached.
    Network,
}

impl Failure {
    fn of(err: &SmtpError) -> Self {
        if err.is_permanent() {
            Failure::Permanent(err.status())
        } else if err.is_transient() {
            Failure::Transient(err.status())
        } else if (err.is_client() || err.is_response()) && !err.is_timeout() {
            Failure::Protocol
        } else {
            Failure::Network
        }
    }

    fn into_error(self, detail: String) -> MailError {
        match self {
            Failure::Permanent(Some(code)) | Failure::Transient(Some(code))
                if is_auth_reply(code) =>
            {
                MailError::Authentication(detail)
            }
            Failure::Permanent(_) => MailError::Rejected(detail),
            Failure::Transient(_) | Failure::Protocol => MailError::Transport(detail),
            Failure::Network => MailError::Connection(detail),
        }
    }
}

// 454 temporary auth failure, 530 auth required, 534 mechanism too weak, 535 bad credentials.
fn is_auth_reply(code: Code) -> bool {
    matches!(code.to_string().as_str(), "454" | "530" | "534" | "535")
}

fn classify(err: SmtpError) -> MailError {
    Failure::of(&err).into_error(err.to_string())
}

impl MailTransport for SmtpMailTransport {
    async fn verify(&self) -> Result<(), MailError> {
        match self.transport.test_connection().await {
            Ok(true) => Ok(()),
            Ok(false) => Err(MailError::Connection(
                "relay refused the connection test".to_string(),
            )),
            Err(err) => Err(classify(err)),
        }
    }

    async fn send(&self, email: OutboundEmail) -> Result<MessageId, MailError> {
        let id = self.next_message_id();
        let to = email.to.to_string();
        let message = self.build_message(email, &id)?;

        let response = self.transport.send(message).await.map_err(classify)?;
        debug!(%to, code = %response.code(), "relay accepted message");
        Ok(id)
    }
}
