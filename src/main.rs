use callcontrol::application::CallControlService;
use callcontrol::config::{Config, LoggingConfig};
use callcontrol::infrastructure::protocols::esl::{Manager, ModuleRegistry};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable naming an optional TOML configuration file
const CONFIG_PATH_ENV: &str = "CALLCONTROL_CONFIG";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config_path = std::env::var(CONFIG_PATH_ENV).ok();
    let config = Config::load(config_path.as_deref())?;

    // Initialize tracing
    init_tracing(&config.logging)?;

    info!("Starting call control service");
    info!("Configuration loaded: {:?}", config);

    let registry = ModuleRegistry::new();
    registry
        .register(Arc::new(CallControlService::from_config(&config.service)))
        .await?;

    let manager = Arc::new(Manager::new(config.clone()));
    registry.init_all(manager).await?;
    registry.start_all().await?;

    info!(
        "Service {} listening on {}",
        config.service.name, config.service.listen_address
    );

    // Keep the server running
    tokio::signal::ctrl_c().await?;
    info!("Shutting down...");

    registry.stop_all().await;

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    if logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init()?;
    }

    Ok(())
}
