//! Route handlers for the admin web interface.

pub mod admin_users;
pub mod auth;
pub mod broadcast;
pub mod chat;
pub mod documents;
pub mod form_data;
pub mod health;
pub mod users;

use axum::response::Redirect;
use axum::routing::{get, post};
use axum::Router;

use crate::guard::Route;
use crate::state::AppState;

/// Build the router with every console page.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to(Route::Users.path()) }))
        // Session
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
        // HTML pages
        .route("/users", get(users::users_page))
        .route("/users/:telegram_id/onboarding", get(users::onboarding_card))
        .route("/chat/:telegram_id", get(chat::chat_page).post(chat::submit))
        .route("/chat/:telegram_id/stream", get(chat::stream))
        .route(
            "/broadcast",
            get(broadcast::broadcast_page).post(broadcast::submit),
        )
        .route(
            "/documents",
            get(documents::documents_page).post(documents::upload),
        )
        .route("/documents/:name/update", post(documents::update))
        .route("/documents/:name/delete", post(documents::delete))
        .route(
            "/admin/users",
            get(admin_users::admin_users_page).post(admin_users::create),
        )
        .route("/admin/users/:id", post(admin_users::update))
        .route("/admin/users/:id/delete", post(admin_users::delete))
}
