use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use tokio::net::TcpListener;
use tracing::{debug, error, info, trace};

use crate::config::{initialize_app_state, AppConfig};
use crate::router::create_router;

pub async fn serve(config_path: Option<&Path>, bind_address: Option<String>) -> Result<()> {
    trace!("Entering serve function");
    info!("pricecast application starting up");

    let config = AppConfig::load(config_path)?;
    let bind_address = bind_address.unwrap_or_else(|| config.server.bind_address.clone());
    debug!("Bind address: {}", bind_address);
    debug!("Forecast settings: {:?}", config.forecast);

    // Initialize application state
    trace!("Initializing application state");
    let state = match initialize_app_state(&config) {
        Ok(state) => {
            debug!("Application state initialized successfully");
            state
        }
        Err(e) => {
            error!("Failed to initialize application state: {}", e);
            return Err(e);
        }
    };

    // Create router
    trace!("Creating application router");
    let app = create_router(
        state,
        Duration::from_secs(config.server.request_timeout_secs),
    );
    debug!("Router created successfully");

    // Start server
    info!("Starting server on {}", bind_address);
    trace!("Attempting to bind TCP listener to {}", bind_address);
    let listener = match TcpListener::bind(&bind_address).await {
        Ok(listener) => {
            debug!("Successfully bound to address: {}", bind_address);
            listener
        }
        Err(e) => {
            error!("Failed to bind to address {}: {}", bind_address, e);
            return Err(e.into());
        }
    };

    info!("pricecast server running on http://{}", bind_address);
    info!("Swagger UI available at http://{}/swagger-ui", bind_address);
    debug!("Server is ready to accept connections");

    trace!("Starting axum server");
    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    info!("Server shutdown gracefully");
    Ok(())
}
