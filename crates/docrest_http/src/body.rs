//! Request body parsing.

use docrest_core::{ApiError, DocumentData};
use serde_json::Value;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Parses a raw request body into an optional field mapping.
///
/// Empty/whitespace bodies are absent (`Ok(None)`) whatever the content type.
/// Form bodies decode into string fields; every other body is read as JSON,
/// where `null` is absent, an object is the body and anything else is a 400.
pub fn parse_body(
    content_type: Option<&str>,
    bytes: &[u8],
) -> Result<Option<DocumentData>, ApiError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    if content_type.is_some_and(is_form) {
        return parse_form(bytes).map(Some);
    }

    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Null) => Ok(None),
        Ok(Value::Object(fields)) => Ok(Some(fields)),
        Ok(_) => Err(ApiError::BadRequest("The body must be a JSON object".to_string())),
        Err(err) => Err(ApiError::BadRequest(format!("The body is not valid JSON: {err}"))),
    }
}

fn is_form(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
}

/// Repeated keys collect into an array of strings, in body order.
fn parse_form(bytes: &[u8]) -> Result<DocumentData, ApiError> {
    let pairs = serde_urlencoded::from_bytes::<Vec<(String, String)>>(bytes)
        .map_err(|err| ApiError::BadRequest(format!("The body is not valid form data: {err}")))?;

    let mut fields = DocumentData::new();
    for (key, value) in pairs {
        match fields.get_mut(&key) {
            Some(Value::Array(values)) => values.push(Value::String(value)),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, Value::String(value)]);
            }
            None => {
                fields.insert(key, Value::String(value));
            }
        }
    }
    Ok(fields)
}
