use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use super::domain::{Inquiry, InquiryId, NewInquiry};

/// Durable storage for contact inquiries.
///
/// `create_inquiry` must not return before the record is durable. Identity and the
/// creation timestamp are always assigned here, never by the caller.
#[async_trait]
pub trait InquiryStore: Send + Sync {
    async fn create_inquiry(&self, input: NewInquiry) -> Result<Inquiry, StoreError>;
    async fn get_inquiry(&self, id: InquiryId) -> Result<Option<Inquiry>, StoreError>;
    /// Newest first.
    async fn list_recent(&self, limit: usize) -> Result<Vec<Inquiry>, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("inquiry database error")]
    Database(#[from] sqlx::Error),
    #[error("inquiry store unavailable: {0}")]
    Unavailable(String),
}

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS inquiries (
    id SERIAL PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    phone TEXT,
    company TEXT,
    message TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

const INSERT_INQUIRY: &str = r#"
INSERT INTO inquiries (name, email, phone, company, message, created_at)
VALUES ($1, $2, $3, $4, $5, $6)
RETURNING id, name, email, phone, company, message, created_at
"#;

const SELECT_INQUIRY: &str = r#"
SELECT id, name, email, phone, company, message, created_at
FROM inquiries
WHERE id = $1
"#;

const SELECT_RECENT: &str = r#"
SELECT id, name, email, phone, company, message, created_at
FROM inquiries
ORDER BY created_at DESC, id DESC
LIMIT $1
"#;

/// Postgres-backed store. Each insert runs as its own committed statement.
#[derive(Clone)]
pub struct PgInquiryStore {
    pool: PgPool,
}

impl PgInquiryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect lazily; the first query establishes the connection.
    pub fn connect_lazy(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect_lazy(url)?;
        Ok(Self::new(pool))
    }

    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl InquiryStore for PgInquiryStore {
    async fn create_inquiry(&self, input: NewInquiry) -> Result<Inquiry, StoreError> {
        let inquiry = sqlx::query_as::<_, Inquiry>(INSERT_INQUIRY)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.company)
            .bind(&input.message)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;
        Ok(inquiry)
    }

    async fn get_inquiry(&self, id: InquiryId) -> Result<Option<Inquiry>, StoreError> {
        let inquiry = sqlx::query_as::<_, Inquiry>(SELECT_INQUIRY)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(inquiry)
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<Inquiry>, StoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let inquiries = sqlx::query_as::<_, Inquiry>(SELECT_RECENT)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(inquiries)
    }
}

/// Process-local store used when no database is configured.
#[derive(Debug, Default)]
pub struct InMemoryInquiryStore {
    records: Mutex<Vec<Inquiry>>,
}

impl InMemoryInquiryStore {
    pub fn len(&self) -> usize {
        self.records.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn poisoned() -> StoreError {
        StoreError::Unavailable("in-memory store lock poisoned".to_string())
    }
}

#[async_trait]
impl InquiryStore for InMemoryInquiryStore {
    async fn create_inquiry(&self, input: NewInquiry) -> Result<Inquiry, StoreError> {
        let mut guard = self.records.lock().map_err(|_| Self::poisoned())?;
        let next = guard.last().map_or(1, |last| last.id.0 + 1);
        let inquiry = Inquiry::from_new(InquiryId(next), input, Utc::now());
        guard.push(inquiry.clone());
        Ok(inquiry)
    }

    async fn get_inquiry(&self, id: InquiryId) -> Result<Option<Inquiry>, StoreError> {
        let guard = self.records.lock().map_err(|_| Self::poisoned())?;
        Ok(guard.iter().find(|inquiry| inquiry.id == id).cloned())
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<Inquiry>, StoreError> {
        let guard = self.records.lock().map_err(|_| Self::poisoned())?;
        Ok(guard.iter().rev().take(limit).cloned().collect())
    }
}
