//! Request payload checks shared by every mutating endpoint.

use serde_json::{Map, Value};

use crate::app_error::AppError;

/// Ensures `payload` is a non-empty JSON object carrying every key in `fields`.
///
/// The error lists all missing keys, in the order they were requested.
pub fn require_fields<'a>(
    payload: Option<&'a Value>,
    fields: &[&str],
) -> Result<&'a Map<String, Value>, AppError> {
    let object = match payload {
        Some(Value::Object(object)) if !object.is_empty() => object,
        _ => return Err(AppError::Validation("No data received".into())),
    };

    let missing: Vec<&str> = fields
        .iter()
        .copied()
        .filter(|field| !object.contains_key(*field))
        .collect();

    if !missing.is_empty() {
        return Err(AppError::Validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }

    Ok(object)
}

/// Parses `value` as a strictly positive integer.
///
/// JSON integers and numeric strings are accepted; anything else, or a value
/// outside the `i32` range, is reported as an invalid integer for `field`.
pub fn positive_int(value: &Value, field: &str) -> Result<i32, AppError> {
    let parsed = match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    };

    let invalid = || AppError::Validation(format!("{field} must be a valid integer"));

    let parsed = parsed.ok_or_else(invalid)?;
    if parsed <= 0 {
        return Err(AppError::Validation(format!(
            "{field} must be a positive number"
        )));
    }

    i32::try_from(parsed).map_err(|_| invalid())
}

/// [`positive_int`] for raw path segments.
pub fn positive_id(raw: &str, field: &str) -> Result<i32, AppError> {
    positive_int(&Value::String(raw.to_owned()), field)
}

/// Parses a JSON request body, treating an empty body as absent.
pub fn parse_body(body: &[u8]) -> Result<Option<Value>, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    serde_json::from_slice(body)
        .map(Some)
        .map_err(|err| AppError::Validation(format!("Request body is not valid JSON: {err}")))
}
