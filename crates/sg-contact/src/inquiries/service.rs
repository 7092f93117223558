use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, error, info};

use super::domain::Inquiry;
use super::notify::{InquiryNotifier, NotifyOutcome};
use super::store::{InquiryStore, StoreError};
use super::validation::{validate_submission, ValidationError};

pub const DEFAULT_NOTIFY_TIMEOUT: Duration = Duration::from_secs(10);

/// Service composing validation, the inquiry store, and the notifier.
pub struct InquiryService<S, N> {
    store: Arc<S>,
    notifier: Arc<N>,
    notify_timeout: Duration,
}

impl<S, N> InquiryService<S, N>
where
    S: InquiryStore + 'static,
    N: InquiryNotifier + 'static,
{
    pub fn new(store: Arc<S>, notifier: Arc<N>) -> Self {
        Self::with_notify_timeout(store, notifier, DEFAULT_NOTIFY_TIMEOUT)
    }

    pub fn with_notify_timeout(store: Arc<S>, notifier: Arc<N>, notify_timeout: Duration) -> Self {
        Self {
            store,
            notifier,
            notify_timeout,
        }
    }

    /// Validate and persist a raw submission, then announce it.
    ///
    /// Only validation and storage failures are returned. The notification attempt runs
    /// after the write is durable and its outcome, including a timeout, is only logged.
    pub async fn submit(&self, payload: &Value) -> Result<Inquiry, InquiryServiceError> {
        let input = validate_submission(payload).inspect_err(|err| {
            debug!(field = %err.field, reason = %err.message, "inquiry rejected");
        })?;

        let inquiry = self.store.create_inquiry(input).await?;
        info!(inquiry_id = %inquiry.id, "inquiry stored");

        self.notify(&inquiry).await;
        Ok(inquiry)
    }

    async fn notify(&self, inquiry: &Inquiry) {
        match tokio::time::timeout(self.notify_timeout, self.notifier.notify(inquiry)).await {
            Ok(Ok(NotifyOutcome::Sent)) => {}
            Ok(Ok(NotifyOutcome::Skipped)) => {
                debug!(inquiry_id = %inquiry.id, "inquiry notification skipped");
            }
            Ok(Err(err)) => {
                error!(
                    inquiry_id = %inquiry.id,
                    error.message = %err,
                    error.cause_chain = ?err,
                    "failed to send email notification for inquiry"
                );
            }
            Err(_) => {
                error!(
                    inquiry_id = %inquiry.id,
                    timeout_secs = self.notify_timeout.as_secs_f64(),
                    "email notification for inquiry timed out"
                );
            }
        }
    }
}

/// Error raised by the inquiry service.
#[derive(Debug, thiserror::Error)]
pub enum InquiryServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
