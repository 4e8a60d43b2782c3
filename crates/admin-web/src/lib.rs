//! Admin console for the K1 Telegram bot.
//!
//! Server-rendered pages (askama + HTMX) over the primary backend and the
//! retrieval API. This process plays the part of the operator's page: each
//! browser gets a console holding its session, query caches and form state,
//! and pages are served as HTML.
//!
//! - `/users` lists end users with their onboarding state
//! - `/chat/:telegram_id` shows a live transcript and a compose box
//! - `/broadcast` sends or schedules a message to selected users
//! - `/documents` manages the retrieval corpus (dev and admin only)
//! - `/admin/users` manages staff accounts (dev and admin only)

pub mod config;
pub mod console;
pub mod error;
pub mod guard;
pub mod queries;
pub mod routes;
pub mod session;
pub mod state;
pub mod views;

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::get;
use axum::Router;
use tower_http::services::ServeDir;

pub use crate::config::Config;
pub use crate::console::Console;
pub use crate::error::{AdminError, Result};
pub use crate::state::AppState;

/// Largest accepted form post; attachments and documents are buffered.
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// The full application: pages, static assets and shared state.
pub fn app(state: AppState) -> Router {
    routes::router()
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            console::attach,
        ))
        .route("/health", get(routes::health::health))
        .nest_service("/static", ServeDir::new("static"))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
