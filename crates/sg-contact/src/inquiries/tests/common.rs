use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::http::{header, Method, Request};
use axum::response::Response;
use serde_json::{json, Value};
use tracing_subscriber::fmt::MakeWriter;

use crate::inquiries::domain::{Inquiry, InquiryId, NewInquiry};
use crate::inquiries::notify::{InquiryNotifier, NotificationError, NotifyOutcome};
use crate::inquiries::store::{InMemoryInquiryStore, InquiryStore, StoreError};
use crate::inquiries::{inquiry_router, InquiryService, SmtpNotifier, CONTACT_PATH};

pub(super) fn submission() -> Value {
    json!({
        "name": "Ada Lovelace",
        "email": "ada@example.com",
        "phone": "+44 20 7946 0018",
        "company": "Analytical Engines Ltd",
        "message": "We would like to discuss a market entry strategy.",
    })
}

pub(super) fn required_only_submission() -> Value {
    json!({
        "name": "Grace Hopper",
        "email": "grace@example.com",
        "message": "Please call me back about a compiler audit.",
    })
}

pub(super) fn new_inquiry() -> NewInquiry {
    NewInquiry {
        name: "Ada Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        phone: None,
        company: Some("Analytical Engines Ltd".to_string()),
        message: "We would like to discuss a market entry strategy.".to_string(),
    }
}

pub(super) fn build_service() -> (
    InquiryService<InMemoryInquiryStore, MemoryNotifier>,
    Arc<InMemoryInquiryStore>,
    Arc<MemoryNotifier>,
) {
    let store = Arc::new(InMemoryInquiryStore::default());
    let notifier = Arc::new(MemoryNotifier::default());
    let service = InquiryService::new(store.clone(), notifier.clone());
    (service, store, notifier)
}

pub(super) fn unconfigured_router() -> (axum::Router, Arc<InMemoryInquiryStore>) {
    let store = Arc::new(InMemoryInquiryStore::default());
    let service = InquiryService::new(store.clone(), Arc::new(SmtpNotifier::disabled()));
    (inquiry_router(Arc::new(service)), store)
}

#[derive(Default)]
pub(super) struct MemoryNotifier {
    sent: Mutex<Vec<InquiryId>>,
}

impl MemoryNotifier {
    pub(super) fn sent(&self) -> Vec<InquiryId> {
        self.sent.lock().expect("notifier mutex poisoned").clone()
    }
}

#[async_trait]
impl InquiryNotifier for MemoryNotifier {
    async fn notify(&self, inquiry: &Inquiry) -> Result<NotifyOutcome, NotificationError> {
        self.sent
            .lock()
            .expect("notifier mutex poisoned")
            .push(inquiry.id);
        Ok(NotifyOutcome::Sent)
    }
}

/// Simulates an SMTP server that rejects the message.
pub(super) struct FailingNotifier;

#[async_trait]
impl InquiryNotifier for FailingNotifier {
    async fn notify(&self, _inquiry: &Inquiry) -> Result<NotifyOutcome, NotificationError> {
        let source = "not an address"
            .parse::<lettre::Address>()
            .expect_err("address is invalid");
        Err(NotificationError::Address {
            address: "not an address".to_string(),
            source,
        })
    }
}

pub(super) struct HangingNotifier;

#[async_trait]
impl InquiryNotifier for HangingNotifier {
    async fn notify(&self, _inquiry: &Inquiry) -> Result<NotifyOutcome, NotificationError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(NotifyOutcome::Sent)
    }
}

pub(super) struct UnavailableStore;

#[async_trait]
impl InquiryStore for UnavailableStore {
    async fn create_inquiry(&self, _input: NewInquiry) -> Result<Inquiry, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn get_inquiry(&self, _id: InquiryId) -> Result<Option<Inquiry>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn list_recent(&self, _limit: usize) -> Result<Vec<Inquiry>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn json_request(method: Method, body: &Value) -> Request<axum::body::Body> {
    raw_request(method, serde_json::to_vec(body).expect("serialize body"))
}

pub(super) fn raw_request(method: Method, body: Vec<u8>) -> Request<axum::body::Body> {
    Request::builder()
        .method(method)
        .uri(CONTACT_PATH)
        .header(header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(body))
        .expect("request builds")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Log sink for asserting on what the pipeline reports.
#[derive(Clone, Default)]
pub(super) struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub(super) fn contents(&self) -> String {
        let bytes = self.0.lock().expect("log mutex poisoned").clone();
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .expect("log mutex poisoned")
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Route events on the current thread into a buffer until the guard drops.
pub(super) fn capture_logs() -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (logs, guard)
}
