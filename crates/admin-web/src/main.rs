//! Admin web interface for the K1 Telegram bot.
//!
//! Provides user, chat, broadcast, document and staff pages via HTMX +
//! server-rendered HTML.

use admin_web::{app, AppState, Config};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!(
        addr = %config.addr,
        backend = %config.backend_url,
        rag = %config.rag_url,
        "Starting admin web server"
    );

    // Build application state
    let state = AppState::new(config.client_config(), config.session_idle);

    let _gc = state.spawn_gc(config.gc_interval);

    // Start server
    let app = app(state);
    info!(addr = %config.addr, "Admin web server listening");
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
