//! Event Socket (ESL) plumbing
//!
//! The switch runs the `socket` dialplan application and connects to us in
//! outbound mode, one TCP connection per call leg:
//! ```text
//! switch ──TCP──▶ EslServer ──spawn──▶ EslService::handle(Box<dyn EslConnection>)
//! ```
//! Only the subset of the protocol call control needs is implemented:
//! plain-text commands, `sendmsg` execute, `text/event-plain` events.

pub mod connection;
pub mod manager;
pub mod message;
pub mod server;
pub mod service;

pub use crate::domain::call::{ChannelEvent, EslConnection, EslError};
pub use connection::TcpEslConnection;
pub use manager::Manager;
pub use message::Frame;
pub use server::EslServer;
pub use service::{EslService, ModuleRegistry};
