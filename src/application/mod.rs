//! Application layer - call handling use cases
//!
//! This layer orchestrates domain objects over an ESL connection:
//! - Bridging a call leg to its dial target
//! - Running one call from handshake to reported outcome

pub mod bridge;
pub mod call_control;

pub use bridge::BridgeOrchestrator;
pub use call_control::CallControlService;
