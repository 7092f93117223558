use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-assigned identifier of an inquiry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct InquiryId(pub i32);

impl fmt::Display for InquiryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Validated contact form content, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInquiry {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub message: String,
}

/// A persisted contact form submission. Never updated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Inquiry {
    pub id: InquiryId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Inquiry {
    /// Attach the store-assigned identity and timestamp to validated input.
    pub fn from_new(id: InquiryId, input: NewInquiry, created_at: DateTime<Utc>) -> Self {
        let NewInquiry {
            name,
            email,
            phone,
            company,
            message,
        } = input;

        Self {
            id,
            name,
            email,
            phone,
            company,
            message,
            created_at,
        }
    }
}
