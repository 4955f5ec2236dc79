//! Callcontrol - outbound event socket call-control handler
//!
//! The switch connects once per call leg. The handler reads the call's
//! metadata, bridges it to a dial target and reports how the leg ended.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types
pub use domain::shared::error::CallControlError;
pub use domain::shared::result::Result;
