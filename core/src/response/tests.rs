use crate::pipeline::aggregate::ViolationReport;
use crate::response::{
    create_response, error_response, serialize_response_body, status, ErrorPayload, HttpResponse,
    ResponseBody,
};
use crate::types::Channel;
use crate::validation::{ValidationResult, Violation};
use serde_json::json;

#[cfg(test)]
mod tests {
    use super::*;

    fn report_with_body_violation() -> ViolationReport {
        let body = ValidationResult {
            violations: vec![Violation::new(
                "id",
                json!("abc"),
                "This value should be of type integer.",
            )],
            ..ValidationResult::default()
        };
        let clean = ValidationResult::default();
        ViolationReport::from_results(vec![(Channel::Body, &body), (Channel::Query, &clean)])
    }

    // **CONTENT TYPE TESTS**
    #[test]
    fn test_content_type_per_body_kind() {
        let cases = [
            (ResponseBody::Json(json!({})), Some("application/json")),
            (ResponseBody::Text("ok".to_string()), Some("text/plain")),
            (ResponseBody::Binary(vec![0xFF]), Some("application/octet-stream")),
            (ResponseBody::Empty, None),
        ];

        for (body, expected) in cases {
            let response = create_response(status::OK, body);
            assert_eq!(
                response.headers.get("Content-Type").map(String::as_str),
                expected
            );
        }
    }

    #[test]
    fn test_with_header_overrides() {
        let response = HttpResponse::json(status::OK, json!({"ok": true}))
            .with_header("Content-Type", "application/problem+json")
            .with_header("X-Request-Id", "r-7");

        assert_eq!(
            response.headers.get("Content-Type"),
            Some(&"application/problem+json".to_string())
        );
        assert_eq!(response.headers.get("X-Request-Id"), Some(&"r-7".to_string()));
    }

    // **ERROR PAYLOAD TESTS**
    #[test]
    fn test_error_payload_with_detail() {
        let payload = ErrorPayload::new("RUST_CORE_PIPELINE_MALFORMED_BODY", "Malformed JSON")
            .with_detail("EOF while parsing an object at line 1 column 1");
        let response = error_response(status::BAD_REQUEST, &payload);

        assert_eq!(response.status_code, 400);
        assert_eq!(
            response.json_body(),
            Some(&json!({
                "error": "RUST_CORE_PIPELINE_MALFORMED_BODY",
                "message": "Malformed JSON",
                "detail": "EOF while parsing an object at line 1 column 1"
            }))
        );
    }

    #[test]
    fn test_error_payload_with_violations() {
        let payload = ErrorPayload::new("RUST_CORE_PIPELINE_MALFORMED_REQUEST", "Malformed request data")
            .with_violations(report_with_body_violation());
        let response = error_response(status::BAD_REQUEST, &payload);

        let body = response.json_body().unwrap();
        assert_eq!(
            body["violations"],
            json!({
                "body": {"id": {"message": "This value should be of type integer.", "value": "abc"}},
                "query": {}
            })
        );
        assert!(body.get("detail").is_none());
    }

    #[test]
    fn test_violation_report_key_order_preserved() {
        let payload = ErrorPayload::new("CODE", "Malformed request data")
            .with_violations(report_with_body_violation());
        let response = error_response(status::BAD_REQUEST, &payload);

        let bytes = serialize_response_body(&response.body);
        let text = String::from_utf8(bytes).unwrap();
        let body_at = text.find("\"body\"").unwrap();
        let query_at = text.find("\"query\"").unwrap();
        assert!(body_at < query_at);
    }

    // **SERIALIZATION TESTS**
    #[test]
    fn test_serialize_response_bodies() {
        assert_eq!(
            serialize_response_body(&ResponseBody::Json(json!({"key": "value"}))),
            br#"{"key":"value"}"#
        );
        assert_eq!(
            serialize_response_body(&ResponseBody::Text("plain".to_string())),
            b"plain"
        );
        assert_eq!(
            serialize_response_body(&ResponseBody::Binary(vec![0x00, 0xFF])),
            vec![0x00, 0xFF]
        );
        assert!(serialize_response_body(&ResponseBody::Empty).is_empty());
    }

    #[test]
    fn test_serialize_unicode_violation_value() {
        let body = ResponseBody::Json(json!({"value": "こんにちは 🌍"}));
        let bytes = serialize_response_body(&body);
        let back: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(back["value"], "こんにちは 🌍");
    }
}
