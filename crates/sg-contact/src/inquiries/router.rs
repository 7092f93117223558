use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::{json, Map, Value};
use tracing::error;

use super::notify::InquiryNotifier;
use super::service::{InquiryService, InquiryServiceError};
use super::store::InquiryStore;
use super::validation::ValidationError;

pub const CONTACT_PATH: &str = "/api/contact";

/// Router exposing the contact form endpoint. Only `POST` is routed; every other method
/// is answered with 405 before the body is looked at.
pub fn inquiry_router<S, N>(service: Arc<InquiryService<S, N>>) -> Router
where
    S: InquiryStore + 'static,
    N: InquiryNotifier + 'static,
{
    Router::new()
        .route(
            CONTACT_PATH,
            post(submit_handler::<S, N>).fallback(method_not_allowed),
        )
        .with_state(service)
}

fn parse_body(body: &[u8]) -> Result<Value, ValidationError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(body).map_err(|_| ValidationError::new("", "Invalid JSON body"))
}

fn validation_response(err: ValidationError) -> Response {
    (StatusCode::BAD_REQUEST, Json(err)).into_response()
}

pub(crate) async fn submit_handler<S, N>(
    State(service): State<Arc<InquiryService<S, N>>>,
    body: Bytes,
) -> Response
where
    S: InquiryStore + 'static,
    N: InquiryNotifier + 'static,
{
    let payload = match parse_body(&body) {
        Ok(payload) => payload,
        Err(err) => return validation_response(err),
    };

    match service.submit(&payload).await {
        Ok(inquiry) => (StatusCode::CREATED, Json(inquiry)).into_response(),
        Err(InquiryServiceError::Validation(err)) => validation_response(err),
        Err(InquiryServiceError::Store(err)) => {
            error!(
                error.message = %err,
                error.cause_chain = ?err,
                "error processing contact form"
            );
            let payload = json!({ "message": err.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn method_not_allowed() -> Response {
    let payload = json!({ "message": "Method not allowed" });
    (StatusCode::METHOD_NOT_ALLOWED, Json(payload)).into_response()
}
