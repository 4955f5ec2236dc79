//! Infrastructure layer - Technical implementations
//!
//! This layer contains:
//! - The event socket protocol (framing, connections)
//! - The outbound socket server and service registry

pub mod protocols;
