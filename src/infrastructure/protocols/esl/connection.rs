//! Outbound event socket connection
//!
//! The switch dials us once per call leg. Commands are answered in order by a
//! `command/reply`; channel events may arrive at any time in between, so they
//! are queued until the handler asks for them.

use super::message::{Frame, CONTENT_TYPE_DISCONNECT_NOTICE, CONTENT_TYPE_EVENT_PLAIN};
use crate::domain::call::{ChannelEvent, EslConnection, EslError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::net::SocketAddr;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{debug, warn};

/// Event socket connection over any byte stream (TCP in production)
pub struct TcpEslConnection<S = TcpStream> {
    stream: BufReader<S>,
    peer: Option<SocketAddr>,
    pending: VecDeque<ChannelEvent>,
    closed: bool,
}

impl TcpEslConnection<TcpStream> {
    pub fn from_tcp(stream: TcpStream) -> Self {
        let peer = stream.peer_addr().ok();
        let mut conn = Self::new(stream);
        conn.peer = peer;
        conn
    }
}

impl<S> TcpEslConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(stream: S) -> Self {
        Self {
            stream: BufReader::new(stream),
            peer: None,
            pending: VecDeque::new(),
            closed: false,
        }
    }

    pub fn peer(&self) -> Option<SocketAddr> {
        self.peer
    }

    /// Number of events received while waiting for replies
    pub fn pending_events(&self) -> usize {
        self.pending.len()
    }

    async fn write_message(&mut self, message: &str) -> Result<(), EslError> {
        if self.closed {
            return Err(EslError::Disconnected);
        }
        debug!("Sending ESL message: {:?}", message.lines().next().unwrap_or(""));
        let writer = self.stream.get_mut();
        writer.write_all(message.as_bytes()).await?;
        writer.flush().await?;
        Ok(())
    }

    /// Read frames until the reply to the last command shows up.
    async fn await_reply(&mut self) -> Result<ChannelEvent, EslError> {
        loop {
            let frame = Frame::read(&mut self.stream).await?;

            if frame.is_reply() {
                if let Some(reason) = frame.failure() {
                    return Err(EslError::CommandFailed(reason));
                }
                return Ok(frame.into_event());
            }

            match frame.content_type() {
                CONTENT_TYPE_EVENT_PLAIN => {
                    self.pending.push_back(frame.to_plain_event());
                }
                CONTENT_TYPE_DISCONNECT_NOTICE if frame.is_linger_notice() => {
                    debug!("Linger notice while waiting for reply");
                }
                CONTENT_TYPE_DISCONNECT_NOTICE => {
                    debug!("Disconnect notice while waiting for reply");
                    return Err(EslError::Disconnected);
                }
                other => {
                    debug!("Skipping frame with content type {:?}", other);
                }
            }
        }
    }
}

/// Build a `sendmsg` block executing `app` on the current channel.
pub fn execute_message(app: &str, args: &str, blocking: bool) -> String {
    let mut message = format!(
        "sendmsg\ncall-command: execute\nexecute-app-name: {}\n",
        app
    );
    if !args.is_empty() {
        message.push_str(&format!("execute-app-arg: {}\n", args));
    }
    if blocking {
        message.push_str("event-lock: true\n");
    }
    message.push('\n');
    message
}

#[async_trait]
impl<S> EslConnection for TcpEslConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn send(&mut self, command: &str) -> Result<ChannelEvent, EslError> {
        let command = command.trim_end();
        self.write_message(&format!("{}\n\n", command)).await?;
        self.await_reply().await
    }

    async fn execute(
        &mut self,
        app: &str,
        args: &str,
        blocking: bool,
    ) -> Result<ChannelEvent, EslError> {
        self.write_message(&execute_message(app, args, blocking))
            .await?;
        self.await_reply().await
    }

    async fn read_event(&mut self) -> Result<ChannelEvent, EslError> {
        if let Some(event) = self.pending.pop_front() {
            return Ok(event);
        }
        if self.closed {
            return Err(EslError::Disconnected);
        }

        loop {
            let frame = Frame::read(&mut self.stream).await?;
            match frame.content_type() {
                CONTENT_TYPE_EVENT_PLAIN => return Ok(frame.to_plain_event()),
                CONTENT_TYPE_DISCONNECT_NOTICE if frame.is_linger_notice() => {
                    debug!("Channel hung up, lingering for remaining events");
                }
                CONTENT_TYPE_DISCONNECT_NOTICE => return Err(EslError::Disconnected),
                other => {
                    debug!("Ignoring frame with content type {:?} while reading events", other);
                }
            }
        }
    }

    async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(e) = self.stream.get_mut().shutdown().await {
            warn!("Failed to shut down ESL connection {:?}: {}", self.peer, e);
        }
    }
}
