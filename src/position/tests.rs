use super::*;
use serde_json::json;

#[test]
fn test_valid_submission_passes_admission() {
    let body = br#"{"lat": 48.8566, "lng": 2.3522}"#;

    let update = admit(body, Some("10.0.0.1".to_string())).unwrap();
    assert_eq!(update.lat, 48.8566);
    assert_eq!(update.lng, 2.3522);
    assert!(update.received_at_ms > 0);
    assert_eq!(update.ip.as_deref(), Some("10.0.0.1"));
    assert!(update.extra.is_empty());
}

#[test]
fn test_integer_coordinates_accepted() {
    let body = br#"{"lat": 48, "lng": 2}"#;

    let update = admit(body, None).unwrap();
    assert_eq!(update.lat, 48.0);
    assert_eq!(update.lng, 2.0);
}

#[test]
fn test_extra_fields_pass_through_verbatim() {
    let body = br#"{"lat": 1.0, "lng": 2.0, "speed": 4.2, "label": "bus-12", "tags": ["a", "b"]}"#;

    let update = admit(body, None).unwrap();
    assert_eq!(update.extra.get("speed"), Some(&json!(4.2)));
    assert_eq!(update.extra.get("label"), Some(&json!("bus-12")));
    assert_eq!(update.extra.get("tags"), Some(&json!(["a", "b"])));
}

#[test]
fn test_system_stamps_win_over_caller_values() {
    let body = br#"{"lat": 1.0, "lng": 2.0, "received_at_ms": 1, "ip": "spoofed"}"#;

    let update = admit(body, None).unwrap();
    assert!(update.received_at_ms > 1);
    assert_eq!(update.ip, None);
    assert!(!update.extra.contains_key("received_at_ms"));
    assert!(!update.extra.contains_key("ip"));
}

#[test]
fn test_missing_lat_names_the_field() {
    let body = br#"{"lng": 2.0}"#;

    let err = admit(body, None).unwrap_err();
    assert_eq!(err, AdmissionError::InvalidFields(vec!["lat"]));
    assert_eq!(err.reason(), "invalid_fields");
}

#[test]
fn test_wrong_type_lat_names_the_field() {
    let body = br#"{"lat": "x", "lng": 2.0}"#;

    let err = admit(body, None).unwrap_err();
    assert_eq!(err, AdmissionError::InvalidFields(vec!["lat"]));
}

#[test]
fn test_both_fields_invalid_names_both() {
    let body = br#"{"lat": null, "lng": true}"#;

    let err = admit(body, None).unwrap_err();
    assert_eq!(err, AdmissionError::InvalidFields(vec!["lat", "lng"]));
    assert_eq!(err.fields(), &["lat", "lng"]);
}

#[test]
fn test_empty_body_rejected_as_missing_fields() {
    let err = admit(b"", None).unwrap_err();
    assert_eq!(err, AdmissionError::InvalidFields(vec!["lat", "lng"]));
}

#[test]
fn test_unparseable_body_is_malformed() {
    let err = admit(b"{not json", None).unwrap_err();
    assert!(matches!(err, AdmissionError::MalformedPayload(_)));
    assert_eq!(err.reason(), "malformed_payload");
    assert!(err.fields().is_empty());
}

#[test]
fn test_non_object_body_is_malformed() {
    let err = admit(b"[1, 2]", None).unwrap_err();
    assert!(matches!(err, AdmissionError::MalformedPayload(_)));
    assert!(err.to_string().contains("an array"));
}

#[test]
fn test_serialization_flattens_extra_and_keeps_null_ip() {
    let body = br#"{"lat": 1.5, "lng": -2.5, "speed": 10}"#;
    let update = admit(body, None).unwrap();

    let value = serde_json::to_value(&update).unwrap();
    assert_eq!(value["lat"], json!(1.5));
    assert_eq!(value["lng"], json!(-2.5));
    assert_eq!(value["speed"], json!(10));
    assert!(value["received_at_ms"].is_i64());
    // ip is explicit null, never omitted
    assert!(value.get("ip").is_some());
    assert!(value["ip"].is_null());
}
