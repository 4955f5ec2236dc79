//! ESL service modules and their registry

use crate::domain::call::EslConnection;
use super::manager::Manager;
use super::server::EslServer;
use crate::domain::shared::{CallControlError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// A module the switch hands call legs to.
///
/// `handle` is invoked exactly once per accepted connection, on its own task,
/// and reports everything through logging.
#[async_trait]
pub trait EslService: Send + Sync {
    /// Unique name of the service
    fn name(&self) -> &str;

    /// Listen address the dispatcher binds for this service
    fn address(&self) -> &str;

    /// Initialize the service with access to the manager
    async fn init(&self, manager: Arc<Manager>) -> Result<()>;

    /// Process one connection from the switch
    async fn handle(&self, conn: Box<dyn EslConnection>);

    /// Release anything the service holds
    async fn shutdown(&self) {}
}

/// Registry of ESL service modules and their socket servers
#[derive(Default)]
pub struct ModuleRegistry {
    services: RwLock<HashMap<String, Arc<dyn EslService>>>,
    servers: RwLock<HashMap<String, EslServer>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, service: Arc<dyn EslService>) -> Result<()> {
        let mut services = self.services.write().await;
        let name = service.name().to_string();
        if services.contains_key(&name) {
            return Err(CallControlError::Setup(format!(
                "service {} already registered",
                name
            )));
        }

        info!("Registered ESL module: {} at {}", name, service.address());
        services.insert(name, service);
        Ok(())
    }

    pub async fn init_all(&self, manager: Arc<Manager>) -> Result<()> {
        let services = self.services.read().await;
        for (name, service) in services.iter() {
            info!("Initializing ESL module: {}", name);
            service.init(manager.clone()).await.map_err(|e| {
                CallControlError::Setup(format!("failed to init {}: {}", name, e))
            })?;
        }
        Ok(())
    }

    pub async fn start_all(&self) -> Result<()> {
        let services = self.services.read().await;
        let mut servers = self.servers.write().await;

        for (name, service) in services.iter() {
            if servers.contains_key(name) {
                continue;
            }

            let bind_addr: SocketAddr = service.address().parse().map_err(|e| {
                CallControlError::Setup(format!(
                    "invalid listen address {} for {}: {}",
                    service.address(),
                    name,
                    e
                ))
            })?;

            info!("Starting ESL module server: {} at {}", name, bind_addr);
            let mut server = EslServer::new(name.clone(), bind_addr, service.clone());
            server.start().await.map_err(|e| {
                CallControlError::Setup(format!("failed to start {}: {}", name, e))
            })?;
            servers.insert(name.clone(), server);
        }
        Ok(())
    }

    pub async fn stop_all(&self) {
        let services = self.services.read().await;
        for (name, service) in services.iter() {
            info!("Stopping ESL module: {}", name);
            service.shutdown().await;
        }

        let mut servers = self.servers.write().await;
        for (name, mut server) in servers.drain() {
            info!("Stopping ESL server: {}", name);
            server.stop().await;
        }
    }

    pub async fn get(&self, name: &str) -> Option<Arc<dyn EslService>> {
        self.services.read().await.get(name).cloned()
    }

    pub async fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.services.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    /// Address a started service is actually listening on
    pub async fn local_addr(&self, name: &str) -> Option<SocketAddr> {
        self.servers
            .read()
            .await
            .get(name)
            .and_then(|server| server.local_addr())
    }
}
