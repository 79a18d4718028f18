pub mod templates;

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::{SmtpConfig, TlsMode};
use crate::db::BoxError;
use crate::models::Submission;

/// Sends an alert for each accepted submission.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, submission: &Submission) -> Result<(), DeliveryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("the notification email could not be composed")]
    Message(#[source] BoxError),
    #[error("the notification email could not be delivered")]
    Transport(#[source] BoxError),
}

impl DeliveryError {
    pub fn code(&self) -> &'static str {
        match self {
            DeliveryError::Message(_) => "delivery_message_invalid",
            DeliveryError::Transport(_) => "delivery_failed",
        }
    }
}

pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpNotifier {
    pub fn new(config: &SmtpConfig) -> Result<Self, String> {
        let from: Mailbox = config
            .from
            .parse()
            .map_err(|e| format!("Invalid sender address: {e}"))?;
        let to: Mailbox = config
            .notify_to
            .parse()
            .map_err(|e| format!("Invalid recipient address: {e}"))?;

        let transport = build_transport(config)?;

        Ok(Self {
            transport,
            from,
            to,
        })
    }

    fn compose(&self, submission: &Submission) -> Result<Message, DeliveryError> {
        let (subject, body) = templates::render_notification(submission);

        let mut builder = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject)
            .header(ContentType::TEXT_PLAIN);

        match submission.email().parse::<Mailbox>() {
            Ok(reply_to) => builder = builder.reply_to(reply_to),
            Err(e) => tracing::debug!("Skipping Reply-To header: {e}"),
        }

        builder
            .body(body)
            .map_err(|e| DeliveryError::Message(Box::new(e)))
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    #[tracing::instrument(name = "Sending submission notification", skip_all)]
    async fn notify(&self, submission: &Submission) -> Result<(), DeliveryError> {
        let message = self.compose(submission)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| DeliveryError::Transport(Box::new(e)))?;

        Ok(())
    }
}

fn build_transport(config: &SmtpConfig) -> Result<AsyncSmtpTransport<Tokio1Executor>, String> {
    let creds = Credentials::new(config.user.clone(), config.pass.clone());

    let transport = match config.tls {
        TlsMode::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .map_err(|e| format!("SMTP relay error: {e}"))?
            .port(config.port)
            .credentials(creds)
            .build(),
        TlsMode::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| format!("SMTP starttls error: {e}"))?
            .port(config.port)
            .credentials(creds)
            .build(),
        TlsMode::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
            .port(config.port)
            .credentials(creds)
            .build(),
    };

    Ok(transport)
}
