//! # Ads Server
//!
//! Entry point: configuration, database connection, HTTP listener lifecycle.

mod config;
mod handlers;
mod middleware;
mod server;
mod state;
mod telemetry;

use config::AppConfig;
use server::ServerController;
use state::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().map_err(std::io::Error::other)?;
    let log_guard = telemetry::init_telemetry(&config.telemetry);

    let (state, connection) = match AppState::from_config(&config.mongo).await {
        Ok(connected) => connected,
        Err(e) => telemetry::fatal("No connection to the database", &e, log_guard),
    };

    let bound = server::bind(&config.server, state)?;
    let controller = ServerController::new(config.server.shutdown_timeout);
    let lifecycle = controller.lifecycle();

    let trigger = controller
        .run(bound, server::shutdown_signal(), async move {
            if let Some(connection) = connection {
                connection.shutdown().await;
            }
        })
        .await;
    tracing::debug!(?trigger, state = ?lifecycle.state(), "Shutdown complete");

    Ok(())
}
