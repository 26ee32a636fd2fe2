//! Countdown Timer - A state-managed HTTP countdown timer
//!
//! This is the main entry point for the countdown-timer application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use countdown_timer::{
    api::create_router,
    config::Config,
    state::{AppState, Collaborators},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("countdown_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting countdown-timer server v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, data_dir={}, tick={}ms",
        config.host,
        config.port,
        config.data_dir.display(),
        config.tick_ms
    );

    // Create application state, restoring settings and history
    let collaborators = Collaborators::with_data_dir(config.data_dir.clone());
    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        config.tick_period(),
        collaborators,
    ));

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  PUT  /timer/input          - Set hours/minutes/seconds");
    info!("  POST /timer/start          - Start or resume");
    info!("  POST /timer/pause          - Pause");
    info!("  POST /timer/reset          - Reset");
    info!("  POST /timer/preset/:min    - Apply a preset");
    info!("  GET  /history              - Completed runs");
    info!("  POST /history/:index/load  - Reuse a completed run");
    info!("  POST /settings/sound       - Toggle sound");
    info!("  POST /settings/theme       - Toggle theme");
    info!("  POST /keys/:code           - Keyboard shortcut (Space, KeyR)");
    info!("  GET  /status               - Timer and server status");
    info!("  GET  /health               - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    state.shutdown();
    info!("Server shutdown complete");
    Ok(())
}
