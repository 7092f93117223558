//! Contact inquiry pipeline: validate the submitted form, persist it, announce it by e-mail.

pub mod domain;
pub mod message;
pub mod notify;
pub mod router;
pub mod service;
pub mod store;
pub mod validation;

#[cfg(test)]
mod tests;

pub use domain::{Inquiry, InquiryId, NewInquiry};
pub use message::{escape_html, InquiryEmail};
pub use notify::{InquiryNotifier, NotificationError, NotifyOutcome, SmtpNotifier};
pub use router::{inquiry_router, CONTACT_PATH};
pub use service::{InquiryService, InquiryServiceError};
pub use store::{InMemoryInquiryStore, InquiryStore, PgInquiryStore, StoreError};
pub use validation::{validate_submission, ValidationError};
