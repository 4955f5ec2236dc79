//! Final outcome of a call leg

use serde::Serialize;

/// Hangup cause recorded when no route could be resolved
pub const CAUSE_NO_ROUTE: &str = "NO_ROUTE_DESTINATION";

/// Hangup cause recorded when a pre-bridge or bridge action was rejected
pub const CAUSE_BRIDGE_ACTION_FAILED: &str = "BRIDGE_ACTION_FAILED";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub bridged: bool,
    pub hangup_cause: String,
}

impl Outcome {
    pub fn new(bridged: bool, hangup_cause: impl Into<String>) -> Self {
        Self {
            bridged,
            hangup_cause: hangup_cause.into(),
        }
    }

    /// Outcome of a call that never reached the bridge
    pub fn failed(cause: impl Into<String>) -> Self {
        Self::new(false, cause)
    }
}
