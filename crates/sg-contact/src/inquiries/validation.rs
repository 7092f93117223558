use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::OnceLock;

use super::domain::NewInquiry;

/// Minimum message length, counted in UTF-16 code units like the browser form does.
pub const MESSAGE_MIN_CHARS: usize = 10;

/// First rule a submission broke. `field` is the dot-path of the offending input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub message: String,
    pub field: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field: field.into(),
        }
    }
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?i)[a-z0-9_'+\-.]*[a-z0-9_+\-]@([a-z0-9][a-z0-9\-]*\.)+[a-z]{2,}$")
            .expect("email pattern compiles")
    })
}

/// Loose RFC-ish address check: local part may not start with a dot or contain `..`.
pub fn is_valid_email(candidate: &str) -> bool {
    let local = candidate.split('@').next().unwrap_or_default();
    !local.starts_with('.') && !candidate.contains("..") && email_pattern().is_match(candidate)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn required_string(fields: &Map<String, Value>, field: &str) -> Result<String, ValidationError> {
    match fields.get(field) {
        None => Err(ValidationError::new(field, "Required")),
        Some(Value::String(value)) => Ok(value.clone()),
        Some(other) => Err(ValidationError::new(
            field,
            format!("Expected string, received {}", type_name(other)),
        )),
    }
}

/// May be omitted, but `null` is a type error.
fn optional_string(
    fields: &Map<String, Value>,
    field: &str,
) -> Result<Option<String>, ValidationError> {
    match fields.get(field) {
        None => Ok(None),
        Some(_) => required_string(fields, field).map(Some),
    }
}

/// May be omitted or `null`; nullable columns accept both.
fn nullable_string(
    fields: &Map<String, Value>,
    field: &str,
) -> Result<Option<String>, ValidationError> {
    match fields.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(_) => required_string(fields, field).map(Some),
    }
}

/// Check an untyped payload field by field, stopping at the first violation.
///
/// Fields are visited in form order: name, email, phone, company, message. Unknown keys are
/// ignored and accepted values are kept exactly as submitted.
pub fn validate_submission(payload: &Value) -> Result<NewInquiry, ValidationError> {
    let fields = match payload {
        Value::Object(fields) => fields,
        other => {
            return Err(ValidationError::new(
                "",
                format!("Expected object, received {}", type_name(other)),
            ))
        }
    };

    let name = required_string(fields, "name")?;
    if name.trim().is_empty() {
        return Err(ValidationError::new("name", "Name is required"));
    }

    let email = required_string(fields, "email")?;
    if !is_valid_email(&email) {
        return Err(ValidationError::new("email", "Invalid email"));
    }

    let phone = optional_string(fields, "phone")?;
    let company = nullable_string(fields, "company")?;

    let message = required_string(fields, "message")?;
    if message.encode_utf16().count() < MESSAGE_MIN_CHARS {
        return Err(ValidationError::new(
            "message",
            format!("Message must be at least {MESSAGE_MIN_CHARS} characters"),
        ));
    }

    Ok(NewInquiry {
        name,
        email,
        phone,
        company,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid() -> Value {
        json!({
            "name": "Ada Lovelace",
            "email": "ada@example.com",
            "message": "We need help scaling our analytics team.",
        })
    }

    #[test]
    fn accepts_required_fields_only() {
        let input = validate_submission(&valid()).expect("valid payload");
        assert_eq!(input.name, "Ada Lovelace");
        assert_eq!(input.phone, None);
        assert_eq!(input.company, None);
    }

    #[test]
    fn keeps_optional_fields_as_given() {
        let mut payload = valid();
        payload["phone"] = json!("+1 555 0100");
        payload["company"] = json!("");
        let input = validate_submission(&payload).expect("valid payload");
        assert_eq!(input.phone.as_deref(), Some("+1 555 0100"));
        assert_eq!(input.company.as_deref(), Some(""));
    }

    #[test]
    fn null_company_is_absent() {
        let mut payload = valid();
        payload["company"] = Value::Null;
        let input = validate_submission(&payload).expect("valid payload");
        assert_eq!(input.company, None);
    }

    #[test]
    fn null_phone_is_a_type_error() {
        let mut payload = valid();
        payload["phone"] = Value::Null;
        payload["company"] = Value::Null;
        let err = validate_submission(&payload).expect_err("phone may not be null");
        assert_eq!(
            err,
            ValidationError::new("phone", "Expected string, received null")
        );
    }

    #[test]
    fn short_message_is_rejected() {
        let mut payload = valid();
        payload["message"] = json!("Too short");
        let err = validate_submission(&payload).expect_err("message too short");
        assert_eq!(err.field, "message");
        assert_eq!(err.message, "Message must be at least 10 characters");
    }

    #[test]
    fn message_length_counts_utf16_units() {
        let mut payload = valid();
        payload["message"] = json!("héllo wörl");
        assert!(validate_submission(&payload).is_ok());

        // Each emoji is a surrogate pair, so five of them reach the minimum.
        payload["message"] = json!("\u{1F680}\u{1F680}\u{1F680}\u{1F680}\u{1F680}");
        assert!(validate_submission(&payload).is_ok());

        payload["message"] = json!("\u{1F680}\u{1F680}\u{1F680}\u{1F680}");
        let err = validate_submission(&payload).expect_err("eight units is too short");
        assert_eq!(err.field, "message");
    }

    #[test]
    fn invalid_email_is_rejected() {
        for email in ["not-an-email", "a@b", ".ada@example.com", "ada..l@example.com", "@x.io"] {
            let mut payload = valid();
            payload["email"] = json!(email);
            let err = validate_submission(&payload).expect_err("invalid email");
            assert_eq!(err.field, "email", "email {email:?}");
            assert_eq!(err.message, "Invalid email");
        }
    }

    #[test]
    fn accepts_common_address_shapes() {
        for email in [
            "ada@example.com",
            "ada.lovelace+contact@mail.example.co.uk",
            "O'Brien@Example.IE",
        ] {
            assert!(is_valid_email(email), "email {email:?}");
        }
    }

    #[test]
    fn reports_first_violation_only() {
        let payload = json!({ "name": "", "email": "nope", "message": "short" });
        let err = validate_submission(&payload).expect_err("invalid payload");
        assert_eq!(err, ValidationError::new("name", "Name is required"));
    }

    #[test]
    fn missing_and_mistyped_fields_name_the_type() {
        let err = validate_submission(&json!({ "name": "Ada" })).expect_err("missing email");
        assert_eq!(err, ValidationError::new("email", "Required"));

        let mut payload = valid();
        payload["company"] = json!(42);
        let err = validate_submission(&payload).expect_err("company must be a string");
        assert_eq!(
            err,
            ValidationError::new("company", "Expected string, received number")
        );
    }

    #[test]
    fn non_object_payload_is_rejected_at_the_root() {
        let err = validate_submission(&json!(["Ada"])).expect_err("array payload");
        assert_eq!(err.field, "");
        assert_eq!(err.message, "Expected object, received array");
    }
}
