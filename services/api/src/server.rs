use crate::cli::ServeArgs;
use crate::infra::{connect_store, log_email_config, AppState};
use crate::routes::with_inquiry_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use sg_contact::config::AppConfig;
use sg_contact::error::AppError;
use sg_contact::inquiries::{InMemoryInquiryStore, InquiryService, InquiryStore, SmtpNotifier};
use sg_contact::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;
    log_email_config(&config.email);

    let notifier = Arc::new(SmtpNotifier::new(&config.email));
    let app = match connect_store(&config.database).await? {
        Some(store) => {
            info!("storing inquiries in postgres");
            inquiry_app(Arc::new(store), notifier, &config)
        }
        None => {
            warn!("DATABASE_URL not set; inquiries are kept in process memory only");
            inquiry_app(Arc::new(InMemoryInquiryStore::default()), notifier, &config)
        }
    };

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let app = app.layer(Extension(app_state)).layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "contact inquiry service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn inquiry_app<S>(store: Arc<S>, notifier: Arc<SmtpNotifier>, config: &AppConfig) -> axum::Router
where
    S: InquiryStore + 'static,
{
    let service = InquiryService::with_notify_timeout(store, notifier, config.notify_timeout);
    with_inquiry_routes(Arc::new(service))
}
