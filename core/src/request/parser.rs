use crate::errors::PipelineError;
use crate::types::JsonMap;
use crate::validation::{Utf8Validator, Validator};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value as JsonValue;

// `name[a][]` → base `name`, suffix `[a][]`
static BRACKET_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([^\[\]]+)((?:\[[^\[\]]*\])+)$").expect("valid bracket key regex"));
static BRACKET_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\[\]]*)\]").expect("valid bracket segment regex"));

/// Deepest bracket nesting decoded. Brackets past it stay literal text in one final key.
pub const MAX_BRACKET_DEPTH: usize = 64;

/// Decodes a query string (or form body) into a JSON object.
///
/// Plain keys give strings (last occurrence wins), `key[]` appends to an array and
/// `key[name]` nests an object, so `a[]=1&a[]=2&b[c]=3` → `{"a": ["1", "2"], "b": {"c": "3"}}`.
/// Pairs that fail percent-decoding are skipped.
pub fn parse_query_string(query: &str) -> JsonMap {
    let mut map = JsonMap::new();

    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (raw_key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
        let (Some(key), Some(value)) = (decode_component(raw_key), decode_component(raw_value))
        else {
            continue;
        };
        if key.is_empty() {
            continue;
        }

        let (base, segments) = split_key(&key);
        let slot = map.entry(base).or_insert(JsonValue::Null);
        assign(slot, &segments, JsonValue::String(value));
    }

    map
}

pub fn parse_json_body(data: &[u8]) -> Result<JsonValue, PipelineError> {
    serde_json::from_slice(data).map_err(|e| PipelineError::MalformedBody {
        detail: format!("Invalid JSON: {}", e),
    })
}

pub fn parse_form_body(data: &[u8]) -> Result<JsonMap, PipelineError> {
    let body = Utf8Validator::new()
        .validate(data.to_vec())
        .map_err(|e| PipelineError::MalformedBody {
            detail: format!("Invalid form body: {}", e),
        })?;

    Ok(parse_query_string(&body))
}

/// Splits a `Cookie:` header into name/value pairs, percent-decoding values.
pub fn parse_cookie_header(header: &str) -> Vec<(String, String)> {
    header
        .split(';')
        .filter_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            let value = value.trim().trim_matches('"');
            let value = urlencoding::decode(value)
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| value.to_string());
            Some((name.to_string(), value))
        })
        .collect()
}

/// Media type of a Content-Type value: parameters stripped, lower-cased.
pub fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

pub fn is_json_media_type(media_type: &str) -> bool {
    media_type == "application/json" || media_type.ends_with("+json")
}

pub fn is_form_media_type(media_type: &str) -> bool {
    media_type == "application/x-www-form-urlencoded"
}

fn decode_component(raw: &str) -> Option<String> {
    let raw = raw.replace('+', " ");
    urlencoding::decode(&raw).ok().map(|s| s.into_owned())
}

fn split_key(key: &str) -> (String, Vec<String>) {
    let Some(captures) = BRACKET_KEY.captures(key) else {
        return (key.to_string(), Vec::new());
    };

    let suffix = &captures[2];
    let mut segments = Vec::new();
    for segment in BRACKET_SEGMENT.captures_iter(suffix) {
        if segments.len() == MAX_BRACKET_DEPTH {
            let start = segment.get(0).map_or(suffix.len(), |m| m.start());
            segments.push(suffix[start..].to_string());
            break;
        }
        segments.push(segment[1].to_string());
    }
    (captures[1].to_string(), segments)
}

fn assign(target: &mut JsonValue, segments: &[String], value: JsonValue) {
    let Some((segment, rest)) = segments.split_first() else {
        *target = value;
        return;
    };

    if segment.is_empty() {
        if !target.is_array() && !target.is_object() {
            *target = JsonValue::Array(Vec::new());
        }
        let mut slot = JsonValue::Null;
        assign(&mut slot, rest, value);
        match target {
            JsonValue::Array(list) => list.push(slot),
            JsonValue::Object(map) => {
                let index = map.len().to_string();
                map.insert(index, slot);
            }
            _ => {}
        }
        return;
    }

    if let JsonValue::Array(list) = target {
        // named segment under an array: re-key the items by index
        let map = std::mem::take(list)
            .into_iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v))
            .collect();
        *target = JsonValue::Object(map);
    }
    if !target.is_object() {
        *target = JsonValue::Object(JsonMap::new());
    }
    if let JsonValue::Object(map) = target {
        let slot = map.entry(segment.clone()).or_insert(JsonValue::Null);
        assign(slot, rest, value);
    }
}
