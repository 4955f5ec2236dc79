//! Shared handle given to every ESL service at initialization

use crate::config::Config;

/// Process-wide context for ESL services.
///
/// Read-only once built; services keep an `Arc` to it.
#[derive(Debug, Clone)]
pub struct Manager {
    config: Config,
}

impl Manager {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
