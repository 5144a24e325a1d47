use crate::pipeline::schema::{ContentTypePolicy, EndpointSchemas};
use crate::types::{Channel, ChannelSet};
use crate::validation::Schema;
use serde::{Deserialize, Serialize};

/// **ENDPOINT DEFINITION**
///
/// Everything the pipeline needs to know about one endpoint: which channels it
/// validates, the schema for each, and the content types it accepts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoint {
    pub name: String,
    pub channels: ChannelSet,
    pub schemas: EndpointSchemas,
    pub content_types: ContentTypePolicy,
}

impl Endpoint {
    /// Full endpoint: all five channels, empty schemas, any content type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// **JSON-ONLY ENDPOINT** - validates the body channel alone
    pub fn json_only(name: impl Into<String>) -> Self {
        Self::new(name).with_channels(ChannelSet::json_only())
    }

    pub fn with_channels(mut self, channels: ChannelSet) -> Self {
        self.channels = channels;
        self
    }

    pub fn with_schema(mut self, channel: Channel, schema: Schema) -> Self {
        self.schemas = self.schemas.with(channel, schema);
        self
    }

    pub fn body(self, schema: Schema) -> Self {
        self.with_schema(Channel::Body, schema)
    }

    pub fn headers(self, schema: Schema) -> Self {
        self.with_schema(Channel::Headers, schema)
    }

    pub fn query(self, schema: Schema) -> Self {
        self.with_schema(Channel::Query, schema)
    }

    pub fn path(self, schema: Schema) -> Self {
        self.with_schema(Channel::Path, schema)
    }

    pub fn cookies(self, schema: Schema) -> Self {
        self.with_schema(Channel::Cookies, schema)
    }

    pub fn allow_content_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.content_types = ContentTypePolicy::Allow(types.into_iter().map(Into::into).collect());
        self
    }

    pub fn deny_content_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.content_types = ContentTypePolicy::Deny(types.into_iter().map(Into::into).collect());
        self
    }

    /// Loads a declarative endpoint definition.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
