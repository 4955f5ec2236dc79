//! Outbound ESL server - the switch connects here once per call leg

use super::connection::TcpEslConnection;
use crate::domain::call::EslError;
use super::service::EslService;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, Instrument};
use uuid::Uuid;

pub struct EslServer {
    name: String,
    bind_addr: SocketAddr,
    service: Arc<dyn EslService>,
    local_addr: Option<SocketAddr>,
    shutdown_tx: Option<watch::Sender<bool>>,
    accept_task: Option<JoinHandle<()>>,
}

impl EslServer {
    pub fn new(name: impl Into<String>, bind_addr: SocketAddr, service: Arc<dyn EslService>) -> Self {
        Self {
            name: name.into(),
            bind_addr,
            service,
            local_addr: None,
            shutdown_tx: None,
            accept_task: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    pub fn is_running(&self) -> bool {
        self.accept_task
            .as_ref()
            .map(|task| !task.is_finished())
            .unwrap_or(false)
    }

    pub async fn start(&mut self) -> Result<SocketAddr, EslError> {
        if self.is_running() {
            return Err(EslError::Protocol(format!(
                "server {} already running",
                self.name
            )));
        }

        info!("Starting ESL server {} on {}", self.name, self.bind_addr);
        let listener = TcpListener::bind(self.bind_addr)
            .await
            .map_err(|e| EslError::Io(format!("Failed to bind {}: {}", self.bind_addr, e)))?;
        let local_addr = listener.local_addr()?;
        info!("ESL server {} listening on {}", self.name, local_addr);

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let service = self.service.clone();
        let name = self.name.clone();
        self.accept_task = Some(tokio::spawn(async move {
            Self::accept_loop(name, listener, service, shutdown_rx).await;
        }));
        self.shutdown_tx = Some(shutdown_tx);
        self.local_addr = Some(local_addr);

        Ok(local_addr)
    }

    async fn accept_loop(
        name: String,
        listener: TcpListener,
        service: Arc<dyn EslService>,
        mut shutdown_rx: watch::Receiver<bool>,
    ) {
        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        debug!("Incoming ESL connection from {} on {}", peer, name);
                        let service = service.clone();
                        let span = tracing::info_span!("esl_connection", service = %name, session = %Uuid::new_v4(), %peer);
                        // Each call leg runs on its own task; a failing call never touches the others.
                        tokio::spawn(
                            async move {
                                let conn = TcpEslConnection::from_tcp(stream);
                                service.handle(Box::new(conn)).await;
                            }
                            .instrument(span),
                        );
                    }
                    Err(e) => {
                        error!("Failed to accept ESL connection on {}: {}", name, e);
                    }
                },
                _ = shutdown_rx.changed() => {
                    debug!("Accept loop for {} shutting down", name);
                    break;
                }
            }
        }
    }

    /// Stop accepting connections. Calls already in progress run until the
    /// switch ends them.
    pub async fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(true);
        }
        if let Some(task) = self.accept_task.take() {
            if let Err(e) = task.await {
                error!("ESL server {} accept task failed: {}", self.name, e);
            }
        }
        self.local_addr = None;
        info!("ESL server {} stopped", self.name);
    }
}
