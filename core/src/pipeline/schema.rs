//! Schema resolution and content-type acceptability.

use crate::errors::SchemaDefinitionError;
use crate::request::parser::media_type;
use crate::types::{Channel, ChannelSet};
use crate::validation::Schema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// **ENDPOINT SCHEMA DECLARATIONS**
///
/// One schema per channel, each empty ("no fields expected") unless declared.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointSchemas {
    pub body: Schema,
    pub headers: Schema,
    pub query: Schema,
    pub path: Schema,
    pub cookies: Schema,
}

impl EndpointSchemas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, channel: Channel) -> &Schema {
        match channel {
            Channel::Body => &self.body,
            Channel::Headers => &self.headers,
            Channel::Query => &self.query,
            Channel::Path => &self.path,
            Channel::Cookies => &self.cookies,
        }
    }

    pub fn with(mut self, channel: Channel, schema: Schema) -> Self {
        let slot = match channel {
            Channel::Body => &mut self.body,
            Channel::Headers => &mut self.headers,
            Channel::Query => &mut self.query,
            Channel::Path => &mut self.path,
            Channel::Cookies => &mut self.cookies,
        };
        *slot = schema;
        self
    }
}

/// Schemas that passed channel constraint checks, normalized for validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSchemas(EndpointSchemas);

impl ResolvedSchemas {
    pub fn get(&self, channel: Channel) -> &Schema {
        self.0.get(channel)
    }
}

/// Resolves every active channel's schema, stopping at the first channel (in fixed
/// order) whose schema is malformed. Inactive channels resolve to empty schemas.
pub fn resolve_schemas(
    schemas: &EndpointSchemas,
    active: ChannelSet,
) -> Result<ResolvedSchemas, SchemaDefinitionError> {
    let mut resolved = EndpointSchemas::default();
    for channel in active.iter() {
        resolved = resolved.with(channel, resolve_schema(channel, schemas.get(channel).clone())?);
    }
    Ok(ResolvedSchemas(resolved))
}

/// Applies one channel's constraints:
/// - headers: keys lower-cased, scalar fields only
/// - path: scalar fields only, all forced non-strict (path values are always strings)
/// - cookies: scalar fields only
/// - query: scalar or collection-of-scalar fields
/// - body: anything
pub fn resolve_schema(channel: Channel, schema: Schema) -> Result<Schema, SchemaDefinitionError> {
    let mut schema = match channel {
        Channel::Headers => lowercase_header_names(schema)?,
        _ => schema,
    };

    for (name, element) in schema.iter() {
        let (allowed, reason) = match channel {
            Channel::Body => (true, ""),
            Channel::Query => (
                element.is_scalar_or_collection(),
                "must be a scalar or a collection of scalars",
            ),
            Channel::Headers | Channel::Path | Channel::Cookies => {
                (element.is_scalar(), "must be a scalar element")
            }
        };
        if !allowed {
            return Err(SchemaDefinitionError {
                channel,
                field: name.clone(),
                reason: reason.to_string(),
            });
        }
    }

    if channel == Channel::Path {
        for (_, element) in schema.iter_mut() {
            element.relax();
        }
    }

    Ok(schema)
}

// Header names are case-insensitive, so two declarations folding to one name conflict.
fn lowercase_header_names(schema: Schema) -> Result<Schema, SchemaDefinitionError> {
    let mut seen = HashSet::with_capacity(schema.len());
    for (name, _) in schema.iter() {
        if !seen.insert(name.to_ascii_lowercase()) {
            return Err(SchemaDefinitionError {
                channel: Channel::Headers,
                field: name.clone(),
                reason: "is declared more than once (header names are case-insensitive)".to_string(),
            });
        }
    }
    Ok(schema.map_keys(|k| k.to_ascii_lowercase()))
}

/// **CONTENT-TYPE POLICY**
///
/// Entries compare against the media type (parameters stripped, lower-cased).
/// An entry ending in `/*` matches every subtype. Requests without a content
/// type are always accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "types", rename_all = "lowercase")]
pub enum ContentTypePolicy {
    #[default]
    Any,
    Allow(Vec<String>),
    Deny(Vec<String>),
}

impl ContentTypePolicy {
    pub fn accepts(&self, content_type: Option<&str>) -> bool {
        let Some(content_type) = content_type else {
            return true;
        };
        let media = media_type(content_type);
        match self {
            ContentTypePolicy::Any => true,
            ContentTypePolicy::Allow(list) => list.iter().any(|entry| matches_entry(entry, &media)),
            ContentTypePolicy::Deny(list) => !list.iter().any(|entry| matches_entry(entry, &media)),
        }
    }
}

fn matches_entry(entry: &str, media: &str) -> bool {
    let entry = entry.trim().to_ascii_lowercase();
    match entry.strip_suffix('*') {
        Some(prefix) if prefix.ends_with('/') => media.starts_with(prefix),
        _ => entry == media,
    }
}
