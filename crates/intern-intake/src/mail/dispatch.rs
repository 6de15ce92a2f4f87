use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use super::attachments::AttachmentResolver;
use super::message::{EmailRequest, EmailRequestPayload, OutboundEmail};
use super::transport::{MailError, MailTransport, MessageId};
use crate::config::MailConfig;

/// Pacing for bulk sends: recipients per batch and the pause between batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkPolicy {
    pub batch_size: usize,
    pub pause: Duration,
}

impl Default for BulkPolicy {
    fn default() -> Self {
        Self {
            batch_size: 5,
            pause: Duration::from_secs(1),
        }
    }
}

impl From<&MailConfig> for BulkPolicy {
    fn from(config: &MailConfig) -> Self {
        Self {
            batch_size: config.batch_size.max(1),
            pause: config.batch_pause,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendReceipt {
    pub to: String,
    pub message_id: MessageId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipientOutcome {
    pub to: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<MessageId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RecipientOutcome {
    fn sent(to: String, message_id: MessageId) -> Self {
        Self {
            to,
            success: true,
            message_id: Some(message_id),
            error: None,
        }
    }

    fn failed(to: String, error: impl ToString) -> Self {
        Self {
            to,
            success: false,
            message_id: None,
            error: Some(error.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BulkSummary {
    pub total: usize,
    pub sent: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkReport {
    pub results: Vec<RecipientOutcome>,
    pub summary: BulkSummary,
    pub batches: usize,
}

impl BulkReport {
    pub fn message(&self) -> String {
        format!(
            "Bulk email sending completed. {} sent, {} failed.",
            self.summary.sent, self.summary.failed
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Email service configuration error. Please check your email credentials.")]
    Verification(#[source] MailError),
    #[error(transparent)]
    Delivery(#[from] MailError),
    #[error("Invalid emails array provided")]
    EmptyBatch,
}

/// Sends validated email requests through a [`MailTransport`], attaching application
/// forms on request.
pub struct MailDispatcher<T> {
    transport: Arc<T>,
    attachments: AttachmentResolver,
    policy: BulkPolicy,
}

impl<T> MailDispatcher<T>
where
    T: MailTransport + 'static,
{
    pub fn new(transport: Arc<T>, attachments: AttachmentResolver, policy: BulkPolicy) -> Self {
        Self {
            transport,
            attachments,
            policy,
        }
    }

    pub fn policy(&self) -> BulkPolicy {
        self.policy
    }

    async fn verify(&self) -> Result<(), DispatchError> {
        self.transport.verify().await.map_err(|err| {
            error!(error = %err, detail = ?err.detail(), "email transporter verification failed");
            DispatchError::Verification(err)
        })
    }

    /// Verify the relay, then deliver one email.
    pub async fn send(&self, request: EmailRequest) -> Result<SendReceipt, DispatchError> {
        self.verify().await?;

        let to = request.to.to_string();
        let (message_id, attachment) =
            deliver(self.transport.as_ref(), &self.attachments, request)
                .await
                .map_err(|err| {
                    error!(%to, error = %err, detail = ?err.detail(), "email sending failed");
                    err
                })?;

        info!(%to, %message_id, attachment = ?attachment, "email sent");
        Ok(SendReceipt {
            to,
            message_id,
            attachment,
        })
    }

    /// Deliver many emails in fixed-size batches. Entries arrive as raw JSON so that a
    /// malformed or failing recipient is recorded and the remaining recipients are still
    /// attempted.
    pub async fn send_bulk(&self, requests: Vec<Value>) -> Result<BulkReport, DispatchError> {
        if requests.is_empty() {
            return Err(DispatchError::EmptyBatch);
        }
        self.verify().await?;

        let total = requests.len();
        let batch_size = self.policy.batch_size.max(1);
        let mut results: Vec<Option<RecipientOutcome>> = vec![None; total];
        let mut labels: Vec<String> = Vec::with_capacity(total);
        let mut pending = requests.into_iter().enumerate().peekable();
        let mut batches = 0;

        while pending.peek().is_some() {
            batches += 1;
            let mut tasks = JoinSet::new();

            for (index, entry) in pending.by_ref().take(batch_size) {
                let (label, request) = parse_entry(entry);
                labels.push(label.clone());

                let request = match request {
                    Ok(request) => request,
                    Err(err) => {
                        warn!(to = %label, error = %err, "skipping invalid bulk email entry");
                        results[index] = Some(RecipientOutcome::failed(label, err));
                        continue;
                    }
                };

                let transport = Arc::clone(&self.transport);
                let attachments = self.attachments.clone();
                tasks.spawn(async move {
                    let outcome = match deliver(transport.as_ref(), &attachments, request).await {
                        Ok((message_id, _)) => RecipientOutcome::sent(label, message_id),
                        Err(err) => {
                            error!(to = %label, error = %err, "failed to send email");
                            RecipientOutcome::failed(label, err)
                        }
                    };
                    (index, outcome)
                });
            }

            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok((index, outcome)) => results[index] = Some(outcome),
                    Err(err) => error!(error = %err, "bulk email task aborted"),
                }
            }

            if pending.peek().is_some() && !self.policy.pause.is_zero() {
                tokio::time::sleep(self.policy.pause).await;
            }
        }

        let results: Vec<RecipientOutcome> = results
            .into_iter()
            .zip(labels)
            .map(|(outcome, label)| {
                outcome.unwrap_or_else(|| RecipientOutcome::failed(label, "delivery task aborted"))
            })
            .collect();
        let sent = results.iter().filter(|outcome| outcome.success).count();
        let summary = BulkSummary {
            total,
            sent,
            failed: total - sent,
        };

        info!(total, sent, failed = summary.failed, batches, "bulk email run finished");
        Ok(BulkReport {
            results,
            summary,
            batches,
        })
    }
}

/// Recipient label and validated request for one raw bulk entry.
fn parse_entry(entry: Value) -> (String, Result<EmailRequest, String>) {
    let label = match entry.get("to") {
        Some(Value::String(to)) => to.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };
    let request = serde_json::from_value::<EmailRequestPayload>(entry)
        .map_err(|err| format!("Invalid email entry: {err}"))
        .and_then(|payload| payload.validate().map_err(|err| err.to_string()));
    (label, request)
}

async fn deliver<T: MailTransport>(
    transport: &T,
    attachments: &AttachmentResolver,
    request: EmailRequest,
) -> Result<(MessageId, Option<String>), MailError> {
    let attachment = attachments.resolve(&request).await;
    let attachment_name = attachment.as_ref().map(|item| item.filename.clone());
    let text = request.plain_text();

    let email = OutboundEmail {
        to: request.to,
        subject: request.subject,
        html: request.html,
        text,
        attachments: attachment.into_iter().collect(),
    };

    let message_id = transport.send(email).await?;
    Ok((message_id, attachment_name))
}
