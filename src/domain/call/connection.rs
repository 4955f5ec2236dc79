//! Control connection interface
//!
//! The handler drives a call leg through this port; the event socket transport
//! in the infrastructure layer is the production adapter.

use super::event::ChannelEvent;
use async_trait::async_trait;
use thiserror::Error;

/// Transport-level failures of a control connection
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EslError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("Connection closed by switch")]
    Disconnected,
}

impl From<std::io::Error> for EslError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::UnexpectedEof
            | std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::BrokenPipe => EslError::Disconnected,
            _ => EslError::Io(err.to_string()),
        }
    }
}

/// A control connection for a single call leg
#[async_trait]
pub trait EslConnection: Send {
    /// Send a command and wait for its reply
    async fn send(&mut self, command: &str) -> Result<ChannelEvent, EslError>;

    /// Execute a dialplan application on the channel
    async fn execute(
        &mut self,
        app: &str,
        args: &str,
        blocking: bool,
    ) -> Result<ChannelEvent, EslError>;

    /// Block until the next channel event arrives
    async fn read_event(&mut self) -> Result<ChannelEvent, EslError>;

    /// Release the connection
    async fn close(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_closed_socket_is_disconnect() {
        for kind in [ErrorKind::UnexpectedEof, ErrorKind::ConnectionReset, ErrorKind::BrokenPipe] {
            assert_eq!(EslError::from(Error::from(kind)), EslError::Disconnected);
        }
    }

    #[test]
    fn test_other_io_error_is_kept() {
        let err = EslError::from(Error::new(ErrorKind::PermissionDenied, "denied"));
        assert_eq!(err, EslError::Io("denied".to_string()));
    }
}
