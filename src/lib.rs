pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod models;
pub mod server;
pub mod validation;

use config::AppConfig;
use engine::DesignService;
use error::AppError;
use server::AppState;

/// Load configuration, start logging, and serve the API until Ctrl-C.
pub fn run() -> Result<(), AppError> {
    let config = AppConfig::from_env()?;
    logging::init(config.log_dir.as_deref());

    tracing::info!("Starting Brad server v{}", env!("CARGO_PKG_VERSION"));

    let service = match DesignService::from_config(&config) {
        Ok(service) => {
            tracing::info!(
                chat_model = %config.chat_model,
                html_model = %config.html_model,
                "Model provider configured"
            );
            Some(service)
        }
        Err(e) => {
            // The server still starts; model-backed endpoints answer with the config error.
            tracing::warn!("{}", e);
            None
        }
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl-C: {}", e);
            }
            let _ = shutdown_tx.send(true);
        });

        server::start_server(AppState::new(service), config.bind_addr, shutdown_rx).await
    })
}
