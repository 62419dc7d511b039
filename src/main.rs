//! chanrelayd - the chanrelay server binary.

use chanrelay::config::{Config, ConfigError, validation};
use chanrelay::network::Gateway;
use chanrelay::state::Matrix;
use chanrelay::state::managers::account::AccountManager;
use chanrelay::{http, metrics};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %config_path, "Config file not found, using defaults");
            Config::default()
        }
        Err(e) => {
            error!(path = %config_path, error = %e, "Failed to load config");
            return Err(e.into());
        }
    };

    if let Err(errors) = validation::validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        anyhow::bail!("{} configuration error(s) in {}", errors.len(), config_path);
    }

    info!(
        server = %config.server.name,
        listen = %config.listen.address,
        "Starting chanrelayd"
    );

    let accounts = AccountManager::load(&config.accounts.path)?;
    info!(
        path = %config.accounts.path.display(),
        count = accounts.len(),
        "Loaded accounts"
    );

    // Prometheus metrics are optional; 0 disables the endpoint
    match config.server.metrics_port {
        Some(port) if port != 0 => {
            metrics::init();
            tokio::spawn(http::run_http_server(port));
        }
        _ => info!("Prometheus metrics disabled"),
    }

    let matrix = Arc::new(Matrix::new(&config, accounts));
    let gateway = Gateway::bind(config.listen.address, Arc::clone(&matrix)).await?;

    tokio::select! {
        result = gateway.run() => {
            if let Err(e) = result {
                error!(error = %e, "Gateway stopped");
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown requested");
        }
    }

    matrix.accounts.save(&config.accounts.path)?;
    info!(
        path = %config.accounts.path.display(),
        count = matrix.accounts.len(),
        "Saved accounts"
    );

    Ok(())
}
