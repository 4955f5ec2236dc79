//! Call control service
//!
//! Handles one outbound connection per call leg:
//! handshake → context → resolve → bridge → monitor → report.
//! Every failure stays inside the call; the connection is closed exactly once
//! whichever way handling ends.

use super::bridge::BridgeOrchestrator;
use crate::config::ServiceConfig;
use crate::domain::call::{
    CallContext, Outcome, OutcomeMonitor, CAUSE_BRIDGE_ACTION_FAILED, CAUSE_NO_ROUTE,
};
use crate::domain::cdr::{CallRecord, CallReporter, TracingReporter};
use crate::domain::routing::{DialTarget, DialTargetResolver, UserDirectoryResolver};
use crate::domain::shared::{CallControlError, Result};
use crate::domain::call::EslConnection;
use crate::infrastructure::protocols::esl::{EslService, Manager};
use async_trait::async_trait;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, info_span, warn, Instrument};

/// Commands that keep the socket open after hangup and subscribe to the
/// channel's own events
const SESSION_COMMANDS: [&str; 2] = ["linger", "myevents"];

pub struct CallControlService {
    name: String,
    address: String,
    manager: RwLock<Option<Arc<Manager>>>,
    resolver: Arc<dyn DialTargetResolver>,
    reporter: Arc<dyn CallReporter>,
}

impl CallControlService {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            manager: RwLock::new(None),
            resolver: Arc::new(UserDirectoryResolver::new()),
            reporter: Arc::new(TracingReporter),
        }
    }

    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(config.name.clone(), config.listen_address.clone())
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn DialTargetResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn CallReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub async fn manager(&self) -> Option<Arc<Manager>> {
        self.manager.read().await.clone()
    }

    async fn handle_call(&self, conn: &mut dyn EslConnection) {
        let Some(manager) = self.manager().await else {
            error!("Callcontrol: manager not initialized");
            return;
        };

        let handshake = match conn.send("connect").await {
            Ok(event) => event,
            Err(e) => {
                error!(error = %e, "Callcontrol: connect failed");
                return;
            }
        };

        let ctx = CallContext::from_event(&handshake);
        let span = info_span!(
            "call",
            uuid = %ctx.uuid(),
            caller = %ctx.caller_id(),
            destination = %ctx.destination(),
            domain = %ctx.domain(),
            context = %ctx.context()
        );
        self.run_call(conn, &manager, ctx).instrument(span).await;
    }

    async fn run_call(&self, conn: &mut dyn EslConnection, manager: &Manager, ctx: CallContext) {
        info!("Callcontrol: handling call");

        if let Err(e) = ctx.validate() {
            warn!(error = %e, "Callcontrol: rejecting call");
            return;
        }

        if let Err(e) = Self::start_session(conn).await {
            error!(error = %e, "Callcontrol: session setup failed");
            return;
        }

        let target = match self.resolver.resolve(&ctx) {
            Ok(target) => target,
            Err(e) => {
                warn!(error = %e, "Callcontrol: no route");
                self.report(&ctx, None, &Outcome::failed(CAUSE_NO_ROUTE));
                return;
            }
        };

        let orchestrator = BridgeOrchestrator::new(manager.config().call.ringback.clone());
        if let Err(e) = orchestrator.bridge(conn, &target).await {
            error!(error = %e, dial_string = %target, "Callcontrol: bridge failed");
            self.report(&ctx, Some(&target), &Outcome::failed(CAUSE_BRIDGE_ACTION_FAILED));
            return;
        }

        let outcome = OutcomeMonitor::new().run(conn).await;
        self.report(&ctx, Some(&target), &outcome);
    }

    async fn start_session(conn: &mut dyn EslConnection) -> Result<()> {
        for command in SESSION_COMMANDS {
            conn.send(command)
                .await
                .map_err(|e| CallControlError::handshake(command, e))?;
        }
        Ok(())
    }

    fn report(&self, ctx: &CallContext, target: Option<&DialTarget>, outcome: &Outcome) {
        self.reporter.report(&CallRecord::new(ctx, target, outcome));
    }
}

#[async_trait]
impl EslService for CallControlService {
    fn name(&self) -> &str {
        &self.name
    }

    fn address(&self) -> &str {
        &self.address
    }

    async fn init(&self, manager: Arc<Manager>) -> Result<()> {
        self.address.parse::<SocketAddr>().map_err(|e| {
            CallControlError::Setup(format!("invalid listen address {}: {}", self.address, e))
        })?;

        *self.manager.write().await = Some(manager);
        info!("Call control service initialized");
        Ok(())
    }

    async fn handle(&self, mut conn: Box<dyn EslConnection>) {
        self.handle_call(conn.as_mut()).await;
        conn.close().await;
    }
}
