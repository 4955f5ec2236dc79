//! Channel events reported by the switch for a call leg

use std::collections::HashMap;

pub const HEADER_EVENT_NAME: &str = "Event-Name";
pub const HEADER_UNIQUE_ID: &str = "Unique-ID";
pub const HEADER_CALLER_ID_NUMBER: &str = "Caller-Caller-ID-Number";
pub const HEADER_DESTINATION_NUMBER: &str = "Caller-Destination-Number";
pub const HEADER_DOMAIN_NAME: &str = "variable_domain_name";
pub const HEADER_CALLER_CONTEXT: &str = "Caller-Context";
pub const HEADER_BRIDGE_HANGUP_CAUSE: &str = "variable_bridge_hangup_cause";
pub const HEADER_HANGUP_CAUSE: &str = "Hangup-Cause";

pub const EVENT_CHANNEL_BRIDGE: &str = "CHANNEL_BRIDGE";
pub const EVENT_CHANNEL_HANGUP_COMPLETE: &str = "CHANNEL_HANGUP_COMPLETE";

/// An event (or command reply) received from the switch.
///
/// The handler only ever reads well-known fields by name; anything absent
/// reads as an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelEvent {
    name: String,
    fields: HashMap<String, String>,
}

impl ChannelEvent {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let mut fields = HashMap::new();
        if !name.is_empty() {
            fields.insert(HEADER_EVENT_NAME.to_string(), name.clone());
        }
        Self { name, fields }
    }

    /// Build an event from already-decoded headers. The name is taken from
    /// `Event-Name`.
    pub fn from_fields(fields: HashMap<String, String>) -> Self {
        let name = fields.get(HEADER_EVENT_NAME).cloned().unwrap_or_default();
        Self { name, fields }
    }

    /// Parse a `text/event-plain` body: `Key: value` lines with
    /// percent-encoded values, up to the first blank line.
    pub fn parse_plain(body: &str) -> Self {
        let mut fields = HashMap::new();
        for line in body.lines() {
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                break;
            }
            if let Some((key, value)) = split_header(line) {
                fields.insert(key.to_string(), decode_value(value));
            }
        }
        Self::from_fields(fields)
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        if key == HEADER_EVENT_NAME {
            self.name = value.clone();
        }
        self.fields.insert(key, value);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field value by name, empty when absent.
    pub fn get(&self, key: &str) -> &str {
        self.fields.get(key).map(String::as_str).unwrap_or("")
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn fields(&self) -> &HashMap<String, String> {
        &self.fields
    }
}

/// Split a `Key: value` header line.
pub(crate) fn split_header(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once(':')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key, value.trim_start()))
}

/// Percent-decode a header value, keeping the raw text if it is not valid UTF-8
/// once decoded.
pub(crate) fn decode_value(value: &str) -> String {
    match urlencoding::decode(value) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => value.to_string(),
    }
}
