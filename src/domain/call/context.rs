//! Call metadata taken from the handshake reply

use super::event::{
    ChannelEvent, HEADER_CALLER_CONTEXT, HEADER_CALLER_ID_NUMBER, HEADER_DESTINATION_NUMBER,
    HEADER_DOMAIN_NAME, HEADER_UNIQUE_ID,
};
use crate::domain::shared::{CallControlError, Result};
use serde::Serialize;

/// Metadata of the call leg behind one control connection.
///
/// Built once from the `connect` reply and never modified afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CallContext {
    uuid: String,
    caller_id: String,
    destination: String,
    domain: String,
    context: String,
}

impl CallContext {
    pub fn new(
        uuid: impl Into<String>,
        caller_id: impl Into<String>,
        destination: impl Into<String>,
        domain: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self {
            uuid: uuid.into(),
            caller_id: caller_id.into(),
            destination: destination.into(),
            domain: domain.into(),
            context: context.into(),
        }
    }

    /// Extract the call context. Missing fields become empty strings.
    pub fn from_event(event: &ChannelEvent) -> Self {
        Self::new(
            event.get(HEADER_UNIQUE_ID),
            event.get(HEADER_CALLER_ID_NUMBER),
            event.get(HEADER_DESTINATION_NUMBER),
            event.get(HEADER_DOMAIN_NAME),
            event.get(HEADER_CALLER_CONTEXT),
        )
    }

    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    pub fn caller_id(&self) -> &str {
        &self.caller_id
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn is_valid(&self) -> bool {
        !self.uuid.is_empty()
    }

    /// A handshake without a channel UUID cannot be bridged.
    pub fn validate(&self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(CallControlError::InvalidHandshake(
                "handshake reply carries no Unique-ID".to_string(),
            ))
        }
    }
}
