//! Domain layer - call control rules
//!
//! This layer contains:
//! - Call context extraction from the handshake
//! - Dial target resolution
//! - The outcome monitor state machine
//! - Call records and their reporting sink

pub mod call;
pub mod cdr;
pub mod routing;
pub mod shared;

// Re-export commonly used types
pub use shared::{CallControlError, Result};
