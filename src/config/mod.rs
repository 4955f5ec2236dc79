//! Configuration management
//!
//! Layered: built-in defaults, then an optional TOML file, then environment
//! variables such as `CALLCONTROL__SERVICE__LISTEN_ADDRESS`.

use crate::domain::shared::Result;
use serde::{Deserialize, Serialize};

pub const ENV_PREFIX: &str = "CALLCONTROL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub call: CallConfig,
    pub logging: LoggingConfig,
}

/// Identity the dispatcher routes connections by
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub listen_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallConfig {
    /// Value for the `ringback` channel variable set before bridging
    pub ringback: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                name: "callcontrol".to_string(),
                listen_address: "127.0.0.1:9001".to_string(),
            },
            call: CallConfig {
                ringback: "${us-ring}".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                json: false,
            },
        }
    }
}

impl Config {
    /// Load configuration, reading `path` if given (it must exist then).
    pub fn load(path: Option<&str>) -> Result<Self> {
        let defaults = Config::default();
        let mut builder = config::Config::builder()
            .set_default("service.name", defaults.service.name)?
            .set_default("service.listen_address", defaults.service.listen_address)?
            .set_default("call.ringback", defaults.call.ringback)?
            .set_default("logging.level", defaults.logging.level)?
            .set_default("logging.json", defaults.logging.json)?;

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }

        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
