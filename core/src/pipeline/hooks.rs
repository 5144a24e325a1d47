//! Customization points around the pipeline.
//!
//! [`FailureResponder`] turns each failure kind into an HTTP response, [`DispatchHooks`]
//! wrap the handler call, and [`Handler`] is the endpoint logic itself.

use crate::errors::{error_codes, SchemaDefinitionError};
use crate::pipeline::aggregate::ViolationReport;
use crate::response::{error_response, status, ErrorPayload, HttpResponse};
use crate::types::{Channel, ExtraData, RequestData};

/// **FAILURE RESPONSE HOOKS**
///
/// Every method has a default producing the canned response. Override any of them
/// to change one failure's response without touching the others. The per-channel
/// schema hooks fall back to [`FailureResponder::invalid_schema`].
pub trait FailureResponder: Send + Sync {
    /// 406 - request content type not acceptable.
    fn content_type_rejected(&self, content_type: &str) -> HttpResponse {
        let payload = ErrorPayload::new(error_codes::CONTENT_TYPE_REJECTED, "Not acceptable")
            .with_detail(format!("content type '{}' is not accepted", content_type));
        error_response(status::NOT_ACCEPTABLE, &payload)
    }

    /// 500 - a schema is malformed. Generic fallback for the channel hooks below.
    fn invalid_schema(&self, error: &SchemaDefinitionError) -> HttpResponse {
        let payload = ErrorPayload::new(
            error_codes::INVALID_SCHEMA,
            format!("Invalid {} schema", error.channel),
        )
        .with_detail(error.to_string());
        error_response(status::INTERNAL_SERVER_ERROR, &payload)
    }

    fn invalid_body_schema(&self, error: &SchemaDefinitionError) -> HttpResponse {
        self.invalid_schema(error)
    }

    fn invalid_headers_schema(&self, error: &SchemaDefinitionError) -> HttpResponse {
        self.invalid_schema(error)
    }

    fn invalid_query_schema(&self, error: &SchemaDefinitionError) -> HttpResponse {
        self.invalid_schema(error)
    }

    fn invalid_path_schema(&self, error: &SchemaDefinitionError) -> HttpResponse {
        self.invalid_schema(error)
    }

    fn invalid_cookies_schema(&self, error: &SchemaDefinitionError) -> HttpResponse {
        self.invalid_schema(error)
    }

    /// 400 - body could not be parsed.
    fn malformed_body(&self, detail: &str) -> HttpResponse {
        let payload =
            ErrorPayload::new(error_codes::MALFORMED_BODY, "Malformed JSON").with_detail(detail);
        error_response(status::BAD_REQUEST, &payload)
    }

    /// 406 - the engine could not match a channel's data against its schema.
    fn incompatible_input(&self, channel: Channel, message: &str) -> HttpResponse {
        let payload = ErrorPayload::new(error_codes::INCOMPATIBLE_INPUT, "Not acceptable")
            .with_detail(format!("{}: {}", channel, message));
        error_response(status::NOT_ACCEPTABLE, &payload)
    }

    /// 400 - at least one field violation in at least one channel.
    fn malformed_request(&self, report: &ViolationReport) -> HttpResponse {
        let payload = ErrorPayload::new(error_codes::MALFORMED_REQUEST, "Malformed request data")
            .with_violations(report.clone());
        error_response(status::BAD_REQUEST, &payload)
    }
}

/// Canned responses for every failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultResponder;

impl FailureResponder for DefaultResponder {}

/// **DISPATCH HOOKS**
///
/// `before_handle` runs right before the handler, `after_handle` right after it
/// succeeds and may replace the response. Neither runs when validation failed.
pub trait DispatchHooks: Send + Sync {
    fn before_handle(&self, _data: &RequestData, _extra: &ExtraData) {}

    fn after_handle(
        &self,
        response: HttpResponse,
        _data: &RequestData,
        _extra: &ExtraData,
    ) -> HttpResponse {
        response
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl DispatchHooks for NoHooks {}

/// **ENDPOINT HANDLER**
///
/// Receives validated data and extra data, never raw input. Errors propagate to the
/// caller of [`Pipeline::handle`](crate::pipeline::Pipeline::handle) unmodified.
pub trait Handler {
    type Error;

    fn handle(&self, data: &RequestData, extra: &ExtraData) -> Result<HttpResponse, Self::Error>;
}

impl<F, E> Handler for F
where
    F: Fn(&RequestData, &ExtraData) -> Result<HttpResponse, E>,
{
    type Error = E;

    fn handle(&self, data: &RequestData, extra: &ExtraData) -> Result<HttpResponse, E> {
        self(data, extra)
    }
}
