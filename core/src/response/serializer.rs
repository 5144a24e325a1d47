use crate::response::types::{ErrorPayload, HttpResponse, ResponseBody};
use log::error;
use std::collections::HashMap;

pub fn serialize_json_response(value: &serde_json::Value) -> Vec<u8> {
    serde_json::to_vec(value).unwrap_or_default()
}

pub fn create_response(status: u16, body: ResponseBody) -> HttpResponse {
    let mut headers = HashMap::new();

    let content_type = match &body {
        ResponseBody::Json(_) => Some("application/json"),
        ResponseBody::Text(_) => Some("text/plain"),
        ResponseBody::Binary(_) => Some("application/octet-stream"),
        ResponseBody::Empty => None,
    };
    if let Some(content_type) = content_type {
        headers.insert("Content-Type".to_string(), content_type.to_string());
    }

    HttpResponse {
        status_code: status,
        headers,
        body,
    }
}

/// Builds a JSON failure response from an [`ErrorPayload`].
pub fn error_response(status: u16, payload: &ErrorPayload) -> HttpResponse {
    match serde_json::to_value(payload) {
        Ok(value) => create_response(status, ResponseBody::Json(value)),
        Err(e) => {
            error!("failed to serialize error payload {}: {}", payload.error, e);
            create_response(status, ResponseBody::Text(payload.message.clone()))
        }
    }
}

pub fn serialize_response_body(body: &ResponseBody) -> Vec<u8> {
    match body {
        ResponseBody::Empty => vec![],
        ResponseBody::Json(value) => serialize_json_response(value),
        ResponseBody::Text(text) => text.as_bytes().to_vec(),
        ResponseBody::Binary(data) => data.clone(),
    }
}
