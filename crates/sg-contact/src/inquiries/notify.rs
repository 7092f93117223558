use std::time::Duration;

use async_trait::async_trait;
use lettre::address::AddressError;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use super::domain::Inquiry;
use super::message::{InquiryEmail, SENDER_NAME};
use crate::config::{EmailConfig, EmailSettings};

const SMTP_TIMEOUT: Duration = Duration::from_secs(15);

/// Outbound announcement of a freshly stored inquiry.
#[async_trait]
pub trait InquiryNotifier: Send + Sync {
    async fn notify(&self, inquiry: &Inquiry) -> Result<NotifyOutcome, NotificationError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    Sent,
    /// Notifications are not configured; nothing was attempted.
    Skipped,
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("invalid e-mail address '{address}': {source}")]
    Address {
        address: String,
        #[source]
        source: AddressError,
    },
    #[error("failed to build notification message: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("failed to set up SMTP transport: {0}")]
    Transport(#[source] lettre::transport::smtp::Error),
    #[error("SMTP delivery failed: {0}")]
    Send(#[source] lettre::transport::smtp::Error),
}

type SmtpTransport = AsyncSmtpTransport<Tokio1Executor>;

/// SMTP notifier. Inert unless the e-mail options are complete.
///
/// The transport is built on first use and then shared for the life of the process;
/// concurrent first sends wait on the same initialization.
pub struct SmtpNotifier {
    settings: Option<EmailSettings>,
    transport: OnceCell<SmtpTransport>,
}

impl SmtpNotifier {
    pub fn new(config: &EmailConfig) -> Self {
        Self {
            settings: config.settings().cloned(),
            transport: OnceCell::new(),
        }
    }

    pub fn disabled() -> Self {
        Self::new(&EmailConfig::Disabled)
    }

    pub fn is_active(&self) -> bool {
        self.settings.is_some()
    }

    async fn transport(
        &self,
        settings: &EmailSettings,
    ) -> Result<&SmtpTransport, NotificationError> {
        self.transport
            .get_or_try_init(|| async { build_transport(settings) })
            .await
    }
}

fn build_transport(settings: &EmailSettings) -> Result<SmtpTransport, NotificationError> {
    let tls_parameters =
        TlsParameters::new(settings.host.clone()).map_err(NotificationError::Transport)?;
    let tls = if settings.implicit_tls {
        Tls::Wrapper(tls_parameters)
    } else {
        Tls::Opportunistic(tls_parameters)
    };

    debug!(
        host = %settings.host,
        port = settings.port,
        implicit_tls = settings.implicit_tls,
        "building SMTP transport"
    );

    Ok(SmtpTransport::builder_dangerous(settings.host.as_str())
        .port(settings.port)
        .tls(tls)
        .credentials(Credentials::new(
            settings.username.clone(),
            settings.password.clone(),
        ))
        .timeout(Some(SMTP_TIMEOUT))
        .build())
}

fn mailbox(name: Option<&str>, address: &str) -> Result<Mailbox, NotificationError> {
    let parsed = address
        .trim()
        .parse()
        .map_err(|source| NotificationError::Address {
            address: address.to_string(),
            source,
        })?;
    Ok(Mailbox::new(name.map(str::to_string), parsed))
}

/// Assemble the multipart message sent for an inquiry.
pub fn build_message(
    settings: &EmailSettings,
    email: InquiryEmail,
) -> Result<Message, NotificationError> {
    let InquiryEmail {
        subject,
        reply_to,
        text_body,
        html_body,
    } = email;

    let message = Message::builder()
        .from(mailbox(Some(SENDER_NAME), &settings.from)?)
        .reply_to(mailbox(None, &reply_to)?)
        .to(mailbox(None, &settings.to)?)
        .subject(subject)
        .multipart(MultiPart::alternative_plain_html(text_body, html_body))?;
    Ok(message)
}

#[async_trait]
impl InquiryNotifier for SmtpNotifier {
    async fn notify(&self, inquiry: &Inquiry) -> Result<NotifyOutcome, NotificationError> {
        let Some(settings) = self.settings.as_ref() else {
            debug!(inquiry_id = %inquiry.id, "email not configured, skipping notification");
            return Ok(NotifyOutcome::Skipped);
        };

        let message = build_message(settings, InquiryEmail::compose(inquiry))?;
        let transport = self.transport(settings).await?;
        transport
            .send(message)
            .await
            .map_err(NotificationError::Send)?;

        info!(inquiry_id = %inquiry.id, "inquiry notification sent");
        Ok(NotifyOutcome::Sent)
    }
}
