use super::PositionUpdate;
use chrono::Utc;
use serde_json::{Map, Value};
use std::fmt;

/// Rejection reasons for a submitted position
#[derive(Debug, Clone, PartialEq)]
pub enum AdmissionError {
    /// Body could not be parsed as a JSON object
    MalformedPayload(String),
    /// Structurally parseable, but required fields are missing or not finite numbers
    InvalidFields(Vec<&'static str>),
}

impl AdmissionError {
    /// Machine-readable reason tag for API responses
    pub fn reason(&self) -> &'static str {
        match self {
            AdmissionError::MalformedPayload(_) => "malformed_payload",
            AdmissionError::InvalidFields(_) => "invalid_fields",
        }
    }

    /// Names of the offending fields, if any
    pub fn fields(&self) -> &[&'static str] {
        match self {
            AdmissionError::MalformedPayload(_) => &[],
            AdmissionError::InvalidFields(fields) => fields,
        }
    }
}

impl fmt::Display for AdmissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdmissionError::MalformedPayload(msg) => write!(f, "malformed payload: {}", msg),
            AdmissionError::InvalidFields(fields) => {
                write!(f, "missing or invalid fields: {}", fields.join(", "))
            }
        }
    }
}

impl std::error::Error for AdmissionError {}

/// Validates a raw submission and enriches it into a PositionUpdate.
///
/// Validation rules:
/// - Body must parse as a JSON object (an empty body counts as an empty object)
/// - `lat` and `lng` must be present and be finite numbers
///
/// Enrichment on success:
/// - `received_at_ms` stamped with the current wall clock
/// - `ip` taken from the caller-provided address signal (may be absent)
///
/// Never touches engine state; rejection leaves nothing behind.
pub fn admit(body: &[u8], ip: Option<String>) -> Result<PositionUpdate, AdmissionError> {
    let raw: Value = if body.is_empty() {
        Value::Object(Map::new())
    } else {
        serde_json::from_slice(body)
            .map_err(|e| AdmissionError::MalformedPayload(e.to_string()))?
    };

    let mut object = match raw {
        Value::Object(map) => map,
        other => {
            return Err(AdmissionError::MalformedPayload(format!(
                "expected a JSON object, got {}",
                json_type_name(&other)
            )))
        }
    };

    let (lat, lng) = match (
        finite_number(object.get("lat")),
        finite_number(object.get("lng")),
    ) {
        (Some(lat), Some(lng)) => (lat, lng),
        (lat, lng) => {
            let mut invalid = Vec::new();
            if lat.is_none() {
                invalid.push("lat");
            }
            if lng.is_none() {
                invalid.push("lng");
            }
            return Err(AdmissionError::InvalidFields(invalid));
        }
    };

    object.remove("lat");
    object.remove("lng");
    // System stamps win over caller-supplied values of the same name
    object.remove("received_at_ms");
    object.remove("ip");

    Ok(PositionUpdate {
        lat,
        lng,
        received_at_ms: Utc::now().timestamp_millis(),
        ip,
        extra: object,
    })
}

fn finite_number(value: Option<&Value>) -> Option<f64> {
    value.and_then(Value::as_f64).filter(|n| n.is_finite())
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
