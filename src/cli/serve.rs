use std::sync::Arc;

use crate::{config::IntermediaryConfig, error, info, server, spotify::provider::ProviderTokenClient};

/// Runs the token intermediary on its own.
pub async fn serve() {
    let config = match IntermediaryConfig::from_env() {
        Ok(config) => config,
        Err(e) => error!("Invalid intermediary configuration: {}", e),
    };

    let provider = match ProviderTokenClient::new(&config) {
        Ok(provider) => Arc::new(provider),
        Err(e) => error!("Cannot create HTTP client: {}", e),
    };

    let listener = match server::bind(config.server_addr).await {
        Ok(listener) => listener,
        Err(e) => error!("Cannot listen on {}: {}", config.server_addr, e),
    };

    info!("Token intermediary listening on {}", config.server_addr);
    if let Err(e) = server::start_api_server(listener, server::router(None, Some(provider))).await {
        error!("Server stopped: {}", e);
    }
}
