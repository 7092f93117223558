use metrics_exporter_prometheus::PrometheusHandle;
use sg_contact::config::{AppConfig, DatabaseConfig, EmailConfig};
use sg_contact::error::AppError;
use sg_contact::inquiries::{InquiryStore, PgInquiryStore};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Open the Postgres store when a database is configured and make sure its table exists.
pub(crate) async fn connect_store(
    database: &DatabaseConfig,
) -> Result<Option<PgInquiryStore>, AppError> {
    let Some(url) = database.url.as_deref() else {
        return Ok(None);
    };

    let store = PgInquiryStore::connect_lazy(url, database.max_connections)?;
    store.ensure_schema().await?;
    Ok(Some(store))
}

pub(crate) fn log_email_config(email: &EmailConfig) {
    match email {
        EmailConfig::Enabled(settings) => info!(
            host = %settings.host,
            port = settings.port,
            implicit_tls = settings.implicit_tls,
            to = %settings.to,
            "email notifications enabled"
        ),
        EmailConfig::Disabled => info!("email notifications disabled"),
        EmailConfig::Incomplete { missing } => warn!(
            missing = ?missing,
            "email configuration incomplete; set EMAIL_ENABLED=true and all SMTP_* and EMAIL_* variables to enable email notifications"
        ),
        EmailConfig::Invalid { reason } => {
            warn!(%reason, "email configuration invalid; notifications disabled")
        }
    }
}

pub(crate) async fn list_recent_inquiries(limit: usize) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let Some(store) = connect_store(&config.database).await? else {
        println!("DATABASE_URL is not set; inquiries are only kept in memory by a running server.");
        return Ok(());
    };

    let inquiries = store.list_recent(limit).await?;
    if inquiries.is_empty() {
        println!("No inquiries stored yet.");
        return Ok(());
    }

    for inquiry in inquiries {
        println!(
            "{} {} | {} <{}>{}",
            inquiry.id,
            inquiry.created_at.format("%Y-%m-%d %H:%M"),
            inquiry.name,
            inquiry.email,
            inquiry
                .company
                .as_deref()
                .filter(|company| !company.is_empty())
                .map(|company| format!(" | {company}"))
                .unwrap_or_default()
        );
    }
    Ok(())
}
