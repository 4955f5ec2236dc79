//! Test doubles shared by the integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use callcontrol::domain::cdr::{CallRecord, CallReporter};
use callcontrol::infrastructure::protocols::esl::{ChannelEvent, EslConnection, EslError};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// Everything the handler did to a connection, in order
pub type ActionLog = Arc<Mutex<Vec<String>>>;

/// In-memory connection driven by a fixed script.
///
/// Once the scripted events run out, `read_event` reports a disconnect so a
/// test can never hang.
pub struct ScriptedConnection {
    log: ActionLog,
    handshake: Result<ChannelEvent, EslError>,
    send_failures: HashMap<String, EslError>,
    execute_failures: HashMap<String, EslError>,
    events: VecDeque<Result<ChannelEvent, EslError>>,
}

impl ScriptedConnection {
    pub fn new(handshake: Result<ChannelEvent, EslError>) -> (Self, ActionLog) {
        let log = ActionLog::default();
        let conn = Self {
            log: log.clone(),
            handshake,
            send_failures: HashMap::new(),
            execute_failures: HashMap::new(),
            events: VecDeque::new(),
        };
        (conn, log)
    }

    pub fn fail_send(mut self, command: &str, err: EslError) -> Self {
        self.send_failures.insert(command.to_string(), err);
        self
    }

    pub fn fail_execute(mut self, app: &str, err: EslError) -> Self {
        self.execute_failures.insert(app.to_string(), err);
        self
    }

    pub fn event(mut self, event: ChannelEvent) -> Self {
        self.events.push_back(Ok(event));
        self
    }

    pub fn read_error(mut self, err: EslError) -> Self {
        self.events.push_back(Err(err));
        self
    }

    fn record(&self, entry: String) {
        self.log.lock().unwrap().push(entry);
    }
}

#[async_trait]
impl EslConnection for ScriptedConnection {
    async fn send(&mut self, command: &str) -> Result<ChannelEvent, EslError> {
        self.record(format!("send {}", command));
        if command == "connect" {
            return self.handshake.clone();
        }
        match self.send_failures.get(command) {
            Some(err) => Err(err.clone()),
            None => Ok(ChannelEvent::default()),
        }
    }

    async fn execute(
        &mut self,
        app: &str,
        args: &str,
        blocking: bool,
    ) -> Result<ChannelEvent, EslError> {
        self.record(format!("execute {} {} blocking={}", app, args, blocking));
        match self.execute_failures.get(app) {
            Some(err) => Err(err.clone()),
            None => Ok(ChannelEvent::default()),
        }
    }

    async fn read_event(&mut self) -> Result<ChannelEvent, EslError> {
        let next = self
            .events
            .pop_front()
            .unwrap_or(Err(EslError::Disconnected));
        match &next {
            Ok(event) => self.record(format!("read {}", event.name())),
            Err(e) => self.record(format!("read error {}", e)),
        }
        next
    }

    async fn close(&mut self) {
        self.record("close".to_string());
    }
}

/// Collects every reported call record
#[derive(Clone, Default)]
pub struct RecordingReporter {
    records: Arc<Mutex<Vec<CallRecord>>>,
}

impl RecordingReporter {
    pub fn records(&self) -> Vec<CallRecord> {
        self.records.lock().unwrap().clone()
    }
}

impl CallReporter for RecordingReporter {
    fn report(&self, record: &CallRecord) {
        self.records.lock().unwrap().push(record.clone());
    }
}

/// Captures formatted log output for assertions
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    /// Install a thread-local subscriber writing into this capture
    pub fn install() -> (Self, tracing::subscriber::DefaultGuard) {
        let capture = LogCapture::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(capture.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        (capture, guard)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    pub fn lines_with(&self, needle: &str) -> usize {
        self.contents().lines().filter(|l| l.contains(needle)).count()
    }
}

impl std::io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Handshake reply for the reference call
pub fn handshake(uuid: &str) -> ChannelEvent {
    ChannelEvent::new("CHANNEL_DATA")
        .with_field("Unique-ID", uuid)
        .with_field("Caller-Caller-ID-Number", "1001")
        .with_field("Caller-Destination-Number", "2002")
        .with_field("variable_domain_name", "example.test")
        .with_field("Caller-Context", "default")
}

pub fn hangup_complete(bridge_cause: &str, hangup_cause: &str) -> ChannelEvent {
    let mut event = ChannelEvent::new("CHANNEL_HANGUP_COMPLETE");
    if !bridge_cause.is_empty() {
        event = event.with_field("variable_bridge_hangup_cause", bridge_cause);
    }
    if !hangup_cause.is_empty() {
        event = event.with_field("Hangup-Cause", hangup_cause);
    }
    event
}
