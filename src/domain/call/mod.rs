//! Call leg model: context in, outcome out

pub mod connection;
pub mod context;
pub mod event;
pub mod monitor;
pub mod outcome;

pub use connection::{EslConnection, EslError};
pub use context::CallContext;
pub use event::ChannelEvent;
pub use monitor::{MonitorState, MonitorTransition, OutcomeMonitor};
pub use outcome::{Outcome, CAUSE_BRIDGE_ACTION_FAILED, CAUSE_NO_ROUTE};
