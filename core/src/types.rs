//! # FORZIUM CHANNEL TYPES
//!
//! **CRITICAL**: Channel identifiers and the per-channel data containers handed to handlers
//! **MANDATE**: Channels are ALWAYS visited in `Channel::ALL` order

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::fmt;
use std::ops::Deref;

/// String-keyed JSON object, the shape of every channel's data.
pub type JsonMap = Map<String, JsonValue>;

/// **REQUEST INPUT CHANNEL**
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Body,
    Headers,
    Query,
    Path,
    Cookies,
}

impl Channel {
    /// **FIXED CHANNEL ORDER** - validation and reporting order
    pub const ALL: [Channel; 5] = [
        Channel::Body,
        Channel::Headers,
        Channel::Query,
        Channel::Path,
        Channel::Cookies,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Channel::Body => "body",
            Channel::Headers => "headers",
            Channel::Query => "query",
            Channel::Path => "path",
            Channel::Cookies => "cookies",
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// **ACTIVE CHANNEL SET**
///
/// **PURPOSE**: Declares which channels an endpoint validates. A JSON-only endpoint
/// declares `{body}`, a full endpoint declares all five.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelSet(u8);

impl ChannelSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn all() -> Self {
        Self(0b1_1111)
    }

    /// **JSON-ONLY VARIANT** - body channel alone
    pub fn json_only() -> Self {
        Self::empty().with(Channel::Body)
    }

    pub fn with(self, channel: Channel) -> Self {
        Self(self.0 | channel.bit())
    }

    pub fn contains(self, channel: Channel) -> bool {
        self.0 & channel.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Active channels in fixed order.
    pub fn iter(self) -> impl Iterator<Item = Channel> {
        Channel::ALL.into_iter().filter(move |c| self.contains(*c))
    }
}

impl Default for ChannelSet {
    fn default() -> Self {
        Self::all()
    }
}

impl FromIterator<Channel> for ChannelSet {
    fn from_iter<I: IntoIterator<Item = Channel>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), Self::with)
    }
}

impl fmt::Debug for ChannelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl Serialize for ChannelSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for ChannelSet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let channels = Vec::<Channel>::deserialize(deserializer)?;
        Ok(channels.into_iter().collect())
    }
}

/// **PER-CHANNEL DATA CONTAINER**
///
/// **GUARANTEE**: One slot per channel, inactive channels hold an empty map.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChannelData {
    pub body: JsonMap,
    pub headers: JsonMap,
    pub query: JsonMap,
    pub path: JsonMap,
    pub cookies: JsonMap,
}

impl ChannelData {
    pub fn get(&self, channel: Channel) -> &JsonMap {
        match channel {
            Channel::Body => &self.body,
            Channel::Headers => &self.headers,
            Channel::Query => &self.query,
            Channel::Path => &self.path,
            Channel::Cookies => &self.cookies,
        }
    }

    pub fn set(&mut self, channel: Channel, map: JsonMap) {
        let slot = match channel {
            Channel::Body => &mut self.body,
            Channel::Headers => &mut self.headers,
            Channel::Query => &mut self.query,
            Channel::Path => &mut self.path,
            Channel::Cookies => &mut self.cookies,
        };
        *slot = map;
    }
}

/// **VALIDATED REQUEST DATA**
///
/// **PURPOSE**: Schema-declared fields of every channel, normalized to their declared types.
/// This is the handler's primary input.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RequestData(ChannelData);

/// **EXTRA (UNSCHEMED) DATA**
///
/// **PURPOSE**: Input fields absent from each channel's schema. Kept apart from
/// [`RequestData`] so a handler never mistakes them for validated input.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ExtraData(ChannelData);

impl RequestData {
    pub fn new(data: ChannelData) -> Self {
        Self(data)
    }

    pub fn into_inner(self) -> ChannelData {
        self.0
    }
}

impl ExtraData {
    pub fn new(data: ChannelData) -> Self {
        Self(data)
    }

    pub fn into_inner(self) -> ChannelData {
        self.0
    }
}

impl Deref for RequestData {
    type Target = ChannelData;

    fn deref(&self) -> &ChannelData {
        &self.0
    }
}

impl Deref for ExtraData {
    type Target = ChannelData;

    fn deref(&self) -> &ChannelData {
        &self.0
    }
}
