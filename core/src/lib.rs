//! # FORZIUM CORE LIBRARY
//!
//! **MULTI-CHANNEL REQUEST VALIDATION AND NORMALIZATION PIPELINE**
//!
//! **ARCHITECTURE**: Request → channel extraction → per-channel schema validation →
//! violation aggregation → handler dispatch. One [`pipeline::Pipeline`] per endpoint.
//! **GUARANTEE**: A handler only ever sees schema-validated data. Any violation in any
//! channel short-circuits before dispatch.
//! **SEAMS**: [`validation::ValidationEngine`] for the schema engine,
//! [`pipeline::FailureResponder`] / [`pipeline::DispatchHooks`] for responses.

pub mod api;
pub mod config;
pub mod errors;
pub mod pipeline;
pub mod request;
pub mod response;
pub mod types;

// **VALIDATION MODULE REGISTRATION**
pub mod validation;

#[cfg(test)]
mod tests {
    use crate::api::*;
    use serde_json::json;
    use std::convert::Infallible;

    fn user_endpoint() -> Endpoint {
        Endpoint::new("update_user")
            .body(
                Schema::new()
                    .require_field("name", ScalarType::String)
                    .field("age", Element::integer().optional().range(Some(0.0), None)),
            )
            .path(Schema::new().field("userId", Element::integer()))
            .headers(Schema::new().require_field("X-Request-Id", ScalarType::String))
    }

    // **FACADE WIRING TESTS**
    #[test]
    fn test_full_endpoint_success() {
        let pipeline = Pipeline::new(user_endpoint());
        let request = HttpRequest::new(HttpMethod::PUT, "/users/42")
            .with_json(&json!({"name": "Ada", "age": 36}))
            .with_header("X-Request-Id", "r-1")
            .with_route_param("userId", "42");

        let validated = pipeline.validate(&request).unwrap();
        assert_eq!(json!(validated.data.path), json!({"userId": 42}));
        assert_eq!(json!(validated.data.headers), json!({"x-request-id": "r-1"}));
        assert_eq!(validated.extra.headers["content-type"], json!("application/json"));
    }

    #[test]
    fn test_violations_in_several_channels() {
        let pipeline = Pipeline::new(user_endpoint());
        let request = HttpRequest::new(HttpMethod::PUT, "/users/abc")
            .with_json(&json!({"age": -3}))
            .with_route_param("userId", "abc");

        let response = pipeline
            .handle(&request, &|_: &RequestData, _: &ExtraData| {
                Ok::<_, Infallible>(HttpResponse::text(status::OK, "unreachable"))
            })
            .unwrap();

        assert_eq!(response.status_code, status::BAD_REQUEST);
        let violations = &response.json_body().unwrap()["violations"];
        assert_eq!(violations["body"]["name"]["message"], json!("This field is missing."));
        assert!(violations["body"]["age"].is_object());
        assert!(violations["headers"]["x-request-id"].is_object());
        assert_eq!(violations["path"]["userId"]["value"], json!("abc"));
        assert_eq!(violations["query"], json!({}));
        assert_eq!(violations["cookies"], json!({}));
    }

    #[test]
    fn test_error_code_in_payload() {
        let pipeline = Pipeline::new(user_endpoint());
        let request = HttpRequest::new(HttpMethod::PUT, "/users/1")
            .with_content_type("application/json")
            .with_body("{\"name\": ");

        let err = pipeline.validate(&request).unwrap_err();
        let response = pipeline.failure_response(&err);
        assert_eq!(response.json_body().unwrap()["error"], json!(err.code()));
        assert_eq!(err.code(), error_codes::MALFORMED_BODY);
    }
}
