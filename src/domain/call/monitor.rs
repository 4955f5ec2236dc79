//! Outcome Monitor
//!
//! Consumes channel events after the bridge was issued until the leg ends:
//! ```text
//! AwaitingOutcome ──CHANNEL_BRIDGE──▶ Bridged
//!        │                              │
//!        └──CHANNEL_HANGUP_COMPLETE / read error──▶ Terminated
//! ```
//! Any other event leaves the state unchanged.

use super::connection::{EslConnection, EslError};
use super::event::{
    ChannelEvent, EVENT_CHANNEL_BRIDGE, EVENT_CHANNEL_HANGUP_COMPLETE, HEADER_BRIDGE_HANGUP_CAUSE,
    HEADER_HANGUP_CAUSE,
};
use super::outcome::Outcome;
use crate::domain::shared::CallControlError;
use tracing::{debug, info, warn};

/// Monitor state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    /// Bridge issued, nothing decisive seen yet
    AwaitingOutcome,
    /// CHANNEL_BRIDGE seen; still waiting for the hangup
    Bridged,
    /// Leg is gone
    Terminated,
}

impl MonitorState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, MonitorState::Terminated)
    }

    pub fn name(&self) -> &'static str {
        match self {
            MonitorState::AwaitingOutcome => "AwaitingOutcome",
            MonitorState::Bridged => "Bridged",
            MonitorState::Terminated => "Terminated",
        }
    }
}

/// What an input did to the monitor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorTransition {
    Bridged,
    Terminated { cause: String },
    Ignored,
}

/// Pick the hangup cause: the bridged leg's cause wins over the channel's own.
pub fn hangup_cause(event: &ChannelEvent) -> &str {
    let bridge_cause = event.get(HEADER_BRIDGE_HANGUP_CAUSE);
    if !bridge_cause.is_empty() {
        return bridge_cause;
    }
    event.get(HEADER_HANGUP_CAUSE)
}

#[derive(Debug, Clone)]
pub struct OutcomeMonitor {
    state: MonitorState,
    bridged: bool,
    hangup_cause: String,
}

impl OutcomeMonitor {
    pub fn new() -> Self {
        Self {
            state: MonitorState::AwaitingOutcome,
            bridged: false,
            hangup_cause: String::new(),
        }
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    pub fn is_terminated(&self) -> bool {
        self.state.is_terminal()
    }

    /// Feed one event into the machine
    pub fn on_event(&mut self, event: &ChannelEvent) -> MonitorTransition {
        if self.state.is_terminal() {
            return MonitorTransition::Ignored;
        }

        match event.name() {
            EVENT_CHANNEL_BRIDGE => {
                self.bridged = true;
                self.state = MonitorState::Bridged;
                MonitorTransition::Bridged
            }
            EVENT_CHANNEL_HANGUP_COMPLETE => {
                let cause = hangup_cause(event).to_string();
                self.terminate(cause.clone());
                MonitorTransition::Terminated { cause }
            }
            _ => MonitorTransition::Ignored,
        }
    }

    /// The connection failed or closed: the leg is over, cause unknown.
    pub fn on_read_error(&mut self) -> MonitorTransition {
        if self.state.is_terminal() {
            return MonitorTransition::Ignored;
        }
        self.terminate(String::new());
        MonitorTransition::Terminated {
            cause: String::new(),
        }
    }

    fn terminate(&mut self, cause: String) {
        self.hangup_cause = cause;
        self.state = MonitorState::Terminated;
    }

    pub fn outcome(&self) -> Outcome {
        Outcome::new(self.bridged, self.hangup_cause.clone())
    }

    /// Read events until the leg terminates. No iteration or time bound.
    pub async fn run<C>(mut self, conn: &mut C) -> Outcome
    where
        C: EslConnection + ?Sized,
    {
        while !self.is_terminated() {
            let transition = match conn.read_event().await {
                Ok(event) => {
                    debug!(event = event.name(), state = self.state.name(), "Channel event");
                    self.on_event(&event)
                }
                Err(EslError::Disconnected) => {
                    debug!("Connection closed while monitoring");
                    self.on_read_error()
                }
                Err(e) => {
                    let err = CallControlError::from(e);
                    warn!(error = %err, "Event read failed while monitoring");
                    self.on_read_error()
                }
            };

            if transition == MonitorTransition::Bridged {
                info!("Call bridged successfully");
            }
        }
        self.outcome()
    }
}

impl Default for OutcomeMonitor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hangup(bridge_cause: Option<&str>, cause: Option<&str>) -> ChannelEvent {
        let mut event = ChannelEvent::new(EVENT_CHANNEL_HANGUP_COMPLETE);
        if let Some(c) = bridge_cause {
            event = event.with_field(HEADER_BRIDGE_HANGUP_CAUSE, c);
        }
        if let Some(c) = cause {
            event = event.with_field(HEADER_HANGUP_CAUSE, c);
        }
        event
    }

    #[test]
    fn test_bridge_then_hangup() {
        let mut monitor = OutcomeMonitor::new();
        assert_eq!(monitor.state(), MonitorState::AwaitingOutcome);

        assert_eq!(
            monitor.on_event(&ChannelEvent::new(EVENT_CHANNEL_BRIDGE)),
            MonitorTransition::Bridged
        );
        assert_eq!(monitor.state(), MonitorState::Bridged);

        let transition = monitor.on_event(&hangup(Some("NORMAL_CLEARING"), None));
        assert_eq!(
            transition,
            MonitorTransition::Terminated {
                cause: "NORMAL_CLEARING".to_string()
            }
        );
        assert!(monitor.is_terminated());
        assert_eq!(monitor.outcome(), Outcome::new(true, "NORMAL_CLEARING"));
    }

    #[test]
    fn test_bridge_cause_takes_precedence() {
        let mut monitor = OutcomeMonitor::new();
        monitor.on_event(&hangup(Some("NORMAL_CLEARING"), Some("ORIGINATOR_CANCEL")));
        assert_eq!(monitor.outcome().hangup_cause, "NORMAL_CLEARING");
    }

    #[test]
    fn test_falls_back_to_hangup_cause() {
        let mut monitor = OutcomeMonitor::new();
        monitor.on_event(&hangup(None, Some("USER_BUSY")));
        assert_eq!(monitor.outcome(), Outcome::new(false, "USER_BUSY"));

        let mut monitor = OutcomeMonitor::new();
        monitor.on_event(&hangup(Some(""), Some("USER_BUSY")));
        assert_eq!(monitor.outcome().hangup_cause, "USER_BUSY");
    }

    #[test]
    fn test_no_cause_is_empty_not_error() {
        let mut monitor = OutcomeMonitor::new();
        monitor.on_event(&hangup(None, None));
        assert!(monitor.is_terminated());
        assert_eq!(monitor.outcome().hangup_cause, "");
    }

    #[test]
    fn test_other_events_ignored() {
        let mut monitor = OutcomeMonitor::new();
        for name in ["CHANNEL_EXECUTE", "CHANNEL_ANSWER", "CHANNEL_UNBRIDGE", ""] {
            assert_eq!(monitor.on_event(&ChannelEvent::new(name)), MonitorTransition::Ignored);
        }
        assert_eq!(monitor.state(), MonitorState::AwaitingOutcome);
    }

    #[test]
    fn test_read_error_terminates_with_empty_cause() {
        let mut monitor = OutcomeMonitor::new();
        monitor.on_event(&ChannelEvent::new(EVENT_CHANNEL_BRIDGE));

        monitor.on_read_error();
        assert!(monitor.is_terminated());
        assert_eq!(monitor.outcome(), Outcome::new(true, ""));
    }

    #[test]
    fn test_terminated_is_final() {
        let mut monitor = OutcomeMonitor::new();
        monitor.on_event(&hangup(None, Some("USER_BUSY")));

        assert_eq!(
            monitor.on_event(&ChannelEvent::new(EVENT_CHANNEL_BRIDGE)),
            MonitorTransition::Ignored
        );
        assert_eq!(monitor.on_read_error(), MonitorTransition::Ignored);
        assert_eq!(monitor.outcome(), Outcome::new(false, "USER_BUSY"));
    }

    #[test]
    fn test_state_helpers() {
        assert!(!MonitorState::AwaitingOutcome.is_terminal());
        assert!(!MonitorState::Bridged.is_terminal());
        assert!(MonitorState::Terminated.is_terminal());
        assert_eq!(MonitorState::Bridged.name(), "Bridged");
    }
}
