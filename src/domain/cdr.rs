//! Call record reporting
//!
//! One record per handled call leg, emitted once the leg is over. Reporting is
//! a sink: it never feeds back into call handling.

use super::call::{CallContext, Outcome};
use super::routing::DialTarget;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

/// Outcome record of one call leg
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallRecord {
    pub uuid: String,
    pub caller: String,
    pub destination: String,
    pub domain: String,
    pub context: String,
    /// Dial string the bridge was sent to, if one was resolved
    pub dial_target: Option<String>,
    pub bridged: bool,
    /// Hangup cause, empty if the switch never told us
    pub result: String,
    pub ended_at: DateTime<Utc>,
}

impl CallRecord {
    pub fn new(ctx: &CallContext, target: Option<&DialTarget>, outcome: &Outcome) -> Self {
        Self {
            uuid: ctx.uuid().to_string(),
            caller: ctx.caller_id().to_string(),
            destination: ctx.destination().to_string(),
            domain: ctx.domain().to_string(),
            context: ctx.context().to_string(),
            dial_target: target.map(|t| t.as_str().to_string()),
            bridged: outcome.bridged,
            result: outcome.hangup_cause.clone(),
            ended_at: Utc::now(),
        }
    }
}

/// Where finished call records go
pub trait CallReporter: Send + Sync {
    fn report(&self, record: &CallRecord);
}

/// Reports each call as one structured log line
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl CallReporter for TracingReporter {
    fn report(&self, record: &CallRecord) {
        info!(
            uuid = %record.uuid,
            caller = %record.caller,
            destination = %record.destination,
            domain = %record.domain,
            context = %record.context,
            dial_target = record.dial_target.as_deref().unwrap_or(""),
            bridged = record.bridged,
            result = %record.result,
            "Callcontrol: call ended"
        );
    }
}
