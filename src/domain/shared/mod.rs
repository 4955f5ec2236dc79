//! Shared kernel - types used across the call control domain

pub mod error;
pub mod result;

pub use error::CallControlError;
pub use result::Result;
