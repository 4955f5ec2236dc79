//! Event socket framing
//!
//! Every message from the switch is a block of `Key: value` headers ended by
//! a blank line, optionally followed by `Content-Length` bytes of body.

use crate::domain::call::event::{decode_value, split_header};
use crate::domain::call::{ChannelEvent, EslError};
use bytes::Bytes;
use std::collections::HashMap;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

pub const CONTENT_TYPE_COMMAND_REPLY: &str = "command/reply";
pub const CONTENT_TYPE_API_RESPONSE: &str = "api/response";
pub const CONTENT_TYPE_EVENT_PLAIN: &str = "text/event-plain";
pub const CONTENT_TYPE_DISCONNECT_NOTICE: &str = "text/disconnect-notice";

const HEADER_CONTENT_DISPOSITION: &str = "Content-Disposition";
const DISPOSITION_LINGER: &str = "linger";

/// Largest body accepted from the switch
pub const MAX_BODY_LEN: usize = 4 * 1024 * 1024;

/// One framed message read off the socket
#[derive(Debug, Clone, Default)]
pub struct Frame {
    headers: HashMap<String, String>,
    body: Option<Bytes>,
}

impl Frame {
    pub fn header(&self, key: &str) -> &str {
        self.headers.get(key).map(String::as_str).unwrap_or("")
    }

    pub fn content_type(&self) -> &str {
        self.header("Content-Type")
    }

    pub fn reply_text(&self) -> &str {
        self.header("Reply-Text")
    }

    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    pub fn is_reply(&self) -> bool {
        matches!(
            self.content_type(),
            CONTENT_TYPE_COMMAND_REPLY | CONTENT_TYPE_API_RESPONSE
        )
    }

    /// Disconnect notice sent in linger mode: the channel is gone but the
    /// switch keeps delivering its remaining events.
    pub fn is_linger_notice(&self) -> bool {
        self.content_type() == CONTENT_TYPE_DISCONNECT_NOTICE
            && self.header(HEADER_CONTENT_DISPOSITION) == DISPOSITION_LINGER
    }

    /// Error text carried by a reply, if the switch rejected the command.
    pub fn failure(&self) -> Option<String> {
        if self.content_type() == CONTENT_TYPE_API_RESPONSE {
            let body = self.body_text();
            return body.starts_with("-ERR").then(|| body.trim().to_string());
        }
        let reply = self.reply_text();
        reply.starts_with("-ERR").then(|| reply.to_string())
    }

    pub fn body_text(&self) -> String {
        self.body
            .as_ref()
            .map(|b| String::from_utf8_lossy(b).into_owned())
            .unwrap_or_default()
    }

    /// Turn a reply into a `ChannelEvent` carrying its headers.
    pub fn into_event(self) -> ChannelEvent {
        ChannelEvent::from_fields(self.headers)
    }

    /// Parse the body of a `text/event-plain` frame.
    pub fn to_plain_event(&self) -> ChannelEvent {
        ChannelEvent::parse_plain(&self.body_text())
    }

    /// Read the next frame. A clean EOF before any header is `Disconnected`.
    pub async fn read<R>(reader: &mut R) -> Result<Frame, EslError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut headers = HashMap::new();
        let mut line = String::new();

        loop {
            line.clear();
            let n = reader.read_line(&mut line).await?;
            if n == 0 {
                return Err(EslError::Disconnected);
            }

            let trimmed = line.trim_end_matches(['\r', '\n']);
            if trimmed.is_empty() {
                // Stray blank lines between frames are legal
                if headers.is_empty() {
                    continue;
                }
                break;
            }

            match split_header(trimmed) {
                Some((key, value)) => {
                    headers.insert(key.to_string(), decode_value(value));
                }
                None => {
                    return Err(EslError::Protocol(format!(
                        "Malformed header line: {}",
                        trimmed
                    )))
                }
            }
        }

        let body = match headers.get("Content-Length") {
            Some(len) => {
                let len: usize = len
                    .trim()
                    .parse()
                    .map_err(|_| EslError::Protocol(format!("Invalid Content-Length: {}", len)))?;
                if len > MAX_BODY_LEN {
                    return Err(EslError::Protocol(format!(
                        "Content-Length {} exceeds {} bytes",
                        len, MAX_BODY_LEN
                    )));
                }
                let mut buf = vec![0u8; len];
                reader.read_exact(&mut buf).await?;
                Some(Bytes::from(buf))
            }
            None => None,
        };

        Ok(Frame { headers, body })
    }
}
