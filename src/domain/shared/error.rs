//! Call control errors

use thiserror::Error;

use crate::domain::call::EslError;

/// Failures a single call (or the service start-up) can run into.
///
/// None of these ever crosses the per-call boundary: the handler logs them
/// and finishes the call locally.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallControlError {
    #[error("Setup error: {0}")]
    Setup(String),

    #[error("Handshake failed on '{command}': {reason}")]
    Handshake { command: String, reason: String },

    #[error("Invalid handshake: {0}")]
    InvalidHandshake(String),

    #[error("Action '{app} {args}' failed: {reason}")]
    Action {
        app: String,
        args: String,
        reason: String,
    },

    #[error("Transport read error: {0}")]
    TransportRead(String),

    #[error("No route found for '{destination}@{domain}'")]
    NoRouteFound { destination: String, domain: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CallControlError {
    pub fn handshake(command: &str, err: EslError) -> Self {
        CallControlError::Handshake {
            command: command.to_string(),
            reason: err.to_string(),
        }
    }

    pub fn action(app: &str, args: &str, err: EslError) -> Self {
        CallControlError::Action {
            app: app.to_string(),
            args: args.to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<EslError> for CallControlError {
    fn from(err: EslError) -> Self {
        CallControlError::TransportRead(err.to_string())
    }
}

impl From<config::ConfigError> for CallControlError {
    fn from(err: config::ConfigError) -> Self {
        CallControlError::Config(err.to_string())
    }
}
