use crate::pipeline::aggregate::ViolationReport;
use serde::Serialize;
use std::collections::HashMap;

/// Status codes the pipeline emits on its own.
pub mod status {
    pub const OK: u16 = 200;
    pub const BAD_REQUEST: u16 = 400;
    pub const NOT_ACCEPTABLE: u16 = 406;
    pub const INTERNAL_SERVER_ERROR: u16 = 500;
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: ResponseBody,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Empty,
    Json(serde_json::Value),
    Text(String),
    Binary(Vec<u8>),
}

impl HttpResponse {
    pub fn json(status: u16, value: serde_json::Value) -> Self {
        super::create_response(status, ResponseBody::Json(value))
    }

    pub fn text(status: u16, text: impl Into<String>) -> Self {
        super::create_response(status, ResponseBody::Text(text.into()))
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn json_body(&self) -> Option<&serde_json::Value> {
        match &self.body {
            ResponseBody::Json(value) => Some(value),
            _ => None,
        }
    }
}

/// **ERROR PAYLOAD**
///
/// JSON body of every canned failure response: a stable error code, a readable
/// message, and the parser detail or violations report when there is one.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorPayload {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub violations: Option<ViolationReport>,
}

impl ErrorPayload {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            error: code.to_string(),
            message: message.into(),
            detail: None,
            violations: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_violations(mut self, report: ViolationReport) -> Self {
        self.violations = Some(report);
        self
    }
}
