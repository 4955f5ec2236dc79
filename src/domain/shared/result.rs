//! Domain result type

use super::error::CallControlError;

/// Standard result type for call control operations
pub type Result<T> = std::result::Result<T, CallControlError>;
