//! Channel extraction.
//!
//! Reads raw, untyped data for each active channel out of an [`HttpRequest`].
//! Nothing here validates fields; the only failure is a body that cannot be decoded.

use crate::config::PipelineConfig;
use crate::errors::PipelineError;
use crate::request::parser::{
    is_form_media_type, is_json_media_type, media_type, parse_form_body, parse_json_body,
    parse_query_string,
};
use crate::request::types::HttpRequest;
use crate::types::{Channel, ChannelSet, JsonMap};
use crate::validation::{BufferValidator, Validator};
use log::trace;
use serde_json::Value as JsonValue;

/// Raw per-channel input. The body may hold any JSON value, the other
/// channels always hold objects.
#[derive(Debug, Clone, PartialEq)]
pub struct RawChannels {
    body: JsonValue,
    headers: JsonValue,
    query: JsonValue,
    path: JsonValue,
    cookies: JsonValue,
}

impl Default for RawChannels {
    fn default() -> Self {
        let empty = || JsonValue::Object(JsonMap::new());
        Self {
            body: empty(),
            headers: empty(),
            query: empty(),
            path: empty(),
            cookies: empty(),
        }
    }
}

impl RawChannels {
    pub fn get(&self, channel: Channel) -> &JsonValue {
        match channel {
            Channel::Body => &self.body,
            Channel::Headers => &self.headers,
            Channel::Query => &self.query,
            Channel::Path => &self.path,
            Channel::Cookies => &self.cookies,
        }
    }

    fn set(&mut self, channel: Channel, value: JsonValue) {
        let slot = match channel {
            Channel::Body => &mut self.body,
            Channel::Headers => &mut self.headers,
            Channel::Query => &mut self.query,
            Channel::Path => &mut self.path,
            Channel::Cookies => &mut self.cookies,
        };
        *slot = value;
    }
}

/// Extracts every active channel; inactive channels stay empty.
pub fn extract_channels(
    request: &HttpRequest,
    active: ChannelSet,
    config: &PipelineConfig,
) -> Result<RawChannels, PipelineError> {
    let mut raw = RawChannels::default();

    for channel in active.iter() {
        let value = match channel {
            Channel::Body => extract_body(request, config.max_body_size)?,
            Channel::Headers => JsonValue::Object(extract_headers(request)),
            Channel::Query => JsonValue::Object(extract_query(request)),
            Channel::Path => {
                JsonValue::Object(extract_path(request, &config.reserved_attribute_prefix))
            }
            Channel::Cookies => JsonValue::Object(extract_cookies(request)),
        };
        trace!("extracted {} channel from {} {}", channel, request.method, request.path);
        raw.set(channel, value);
    }

    Ok(raw)
}

/// JSON bodies are parsed, form bodies decoded, anything else yields an empty object.
pub fn extract_body(request: &HttpRequest, max_body_size: usize) -> Result<JsonValue, PipelineError> {
    BufferValidator::new(max_body_size)
        .validate(request.body.len())
        .map_err(|e| PipelineError::MalformedBody { detail: e.0 })?;

    let media = request.content_type().map(media_type).unwrap_or_default();

    if is_json_media_type(&media) {
        if request.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(JsonValue::Object(JsonMap::new()));
        }
        return parse_json_body(&request.body);
    }

    if is_form_media_type(&media) {
        return parse_form_body(&request.body).map(JsonValue::Object);
    }

    Ok(JsonValue::Object(JsonMap::new()))
}

/// Header names are lower-cased; names differing only in case are joined with `", "`.
pub fn extract_headers(request: &HttpRequest) -> JsonMap {
    let mut names: Vec<(&String, &String)> = request.headers.iter().collect();
    names.sort();

    let mut headers = JsonMap::new();
    for (name, value) in names {
        let key = name.to_ascii_lowercase();
        match headers.get_mut(&key) {
            Some(JsonValue::String(existing)) => {
                existing.push_str(", ");
                existing.push_str(value);
            }
            _ => {
                headers.insert(key, JsonValue::String(value.clone()));
            }
        }
    }
    headers
}

pub fn extract_query(request: &HttpRequest) -> JsonMap {
    parse_query_string(request.query_string.trim_start_matches('?'))
}

/// Route parameters when present, otherwise every non-reserved request attribute.
pub fn extract_path(request: &HttpRequest, reserved_prefix: &str) -> JsonMap {
    match &request.route_params {
        Some(params) => params
            .iter()
            .map(|(k, v)| (k.clone(), JsonValue::String(v.clone())))
            .collect(),
        None => request
            .attributes
            .iter()
            .filter(|(name, _)| reserved_prefix.is_empty() || !name.starts_with(reserved_prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    }
}

pub fn extract_cookies(request: &HttpRequest) -> JsonMap {
    request
        .cookies
        .iter()
        .map(|(k, v)| (k.clone(), JsonValue::String(v.clone())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::types::HttpMethod;
    use serde_json::json;

    fn post() -> HttpRequest {
        HttpRequest::new(HttpMethod::POST, "/users")
    }

    #[test]
    fn test_extract_json_body() {
        let request = post().with_json(&json!({"id": 5}));
        assert_eq!(extract_body(&request, 1024).unwrap(), json!({"id": 5}));
    }

    #[test]
    fn test_extract_empty_json_body() {
        let request = post().with_content_type("application/json");
        assert_eq!(extract_body(&request, 1024).unwrap(), json!({}));
    }

    #[test]
    fn test_extract_malformed_json_body() {
        let request = post()
            .with_content_type("application/json; charset=utf-8")
            .with_body(r#"{"id": 5,}"#);
        assert!(matches!(
            extract_body(&request, 1024),
            Err(PipelineError::MalformedBody { .. })
        ));
    }

    #[test]
    fn test_extract_non_object_json_passes_through() {
        let request = post().with_content_type("application/json").with_body("[1,2]");
        assert_eq!(extract_body(&request, 1024).unwrap(), json!([1, 2]));
    }

    #[test]
    fn test_extract_form_body_skips_json_parsing() {
        let request = post()
            .with_content_type("application/x-www-form-urlencoded")
            .with_body("name=Ann&tags[]=a&tags[]=b");
        assert_eq!(
            extract_body(&request, 1024).unwrap(),
            json!({"name": "Ann", "tags": ["a", "b"]})
        );
    }

    #[test]
    fn test_extract_other_content_type_is_empty() {
        let request = post().with_content_type("text/plain").with_body("{not json");
        assert_eq!(extract_body(&request, 1024).unwrap(), json!({}));
    }

    #[test]
    fn test_extract_body_too_large() {
        let request = post().with_json(&json!({"name": "a very long value"}));
        let err = extract_body(&request, 8).unwrap_err();
        assert!(err.to_string().contains("exceeds maximum allowed size 8"));
    }

    #[test]
    fn test_extract_headers_lowercased_and_joined() {
        let request = post()
            .with_header("X-Trace", "a")
            .with_header("x-trace", "b")
            .with_header("Accept", "text/html");
        let headers = extract_headers(&request);

        assert_eq!(headers.get("accept"), Some(&json!("text/html")));
        assert_eq!(headers.get("x-trace"), Some(&json!("a, b")));
    }

    #[test]
    fn test_extract_path_prefers_route_params() {
        let request = post()
            .with_route_param("userId", "42")
            .with_attribute("tenant", json!("acme"));
        let path = extract_path(&request, "_");

        assert_eq!(path.get("userId"), Some(&json!("42")));
        assert!(!path.contains_key("tenant"));
    }

    #[test]
    fn test_extract_path_falls_back_to_attributes() {
        let request = post()
            .with_attribute("userId", json!("42"))
            .with_attribute("_controller", json!("UserController"))
            .with_attribute("_route", json!("user_show"));
        let path = extract_path(&request, "_");

        assert_eq!(path.len(), 1);
        assert_eq!(path.get("userId"), Some(&json!("42")));
    }

    #[test]
    fn test_extract_channels_only_active() {
        let request = post()
            .with_json(&json!({"id": 1}))
            .with_query("page=2")
            .with_cookie("session", "abc");
        let active = ChannelSet::json_only();
        let raw = extract_channels(&request, active, &PipelineConfig::default()).unwrap();

        assert_eq!(raw.get(Channel::Body), &json!({"id": 1}));
        assert_eq!(raw.get(Channel::Query), &json!({}));
        assert_eq!(raw.get(Channel::Cookies), &json!({}));
    }

    #[test]
    fn test_extract_channels_all() {
        let request = post()
            .with_json(&json!({"id": 1}))
            .with_query("?page=2")
            .with_route_param("userId", "7")
            .with_cookie("session", "abc");
        let raw = extract_channels(&request, ChannelSet::all(), &PipelineConfig::default()).unwrap();

        assert_eq!(raw.get(Channel::Query), &json!({"page": "2"}));
        assert_eq!(raw.get(Channel::Path), &json!({"userId": "7"}));
        assert_eq!(raw.get(Channel::Cookies), &json!({"session": "abc"}));
        assert_eq!(raw.get(Channel::Headers)["content-type"], "application/json");
    }
}
