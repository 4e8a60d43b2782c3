//! Login and logout.

use admin_client::LoginRequest;
use askama::Template;
use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tracing::{info, warn};

use crate::console::{self, Console};
use crate::guard::{Nav, Route};
use crate::session::Session;
use crate::state::AppState;

/// Login page template.
#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub nav: Option<Nav>,
    pub username: String,
    pub error: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Render the login page, or skip it when already signed in.
///
/// A held session is re-checked with the backend first: pages redirect here
/// when the backend cookie has expired, and the stale session must go.
pub async fn login_page(console: Console) -> Response {
    if console.session.current().is_some() {
        if console.session.restore(&console.client).await.is_some() {
            return Redirect::to(Route::Users.path()).into_response();
        }
        info!(console = %console.id(), "Backend session expired");
        console.sign_out();
    }
    LoginTemplate {
        nav: None,
        username: String::new(),
        error: None,
    }
    .into_response()
}

/// Submit credentials to the backend.
pub async fn login(console: Console, Form(form): Form<LoginForm>) -> Response {
    let username = form.username.trim().to_string();
    if username.is_empty() || form.password.is_empty() {
        return LoginTemplate {
            nav: None,
            username,
            error: Some("Enter username and password.".to_string()),
        }
        .into_response();
    }

    let request = LoginRequest::new(username.clone(), form.password);
    match console.client.auth().login(&request).await {
        Ok(response) => {
            info!(
                console = %console.id(),
                username = %response.username,
                role = %response.role,
                "Operator signed in"
            );
            console.queries.clear();
            console.session.set(Session::from(response));
            Redirect::to(Route::Users.path()).into_response()
        }
        Err(err) => {
            warn!(username = %username, error = %err, "Login failed");
            let error = if err.is_unauthorized() {
                "Invalid username or password."
            } else {
                "Login failed, try again later."
            };
            LoginTemplate {
                nav: None,
                username,
                error: Some(error.to_string()),
            }
            .into_response()
        }
    }
}

/// End the backend session and close this browser's console.
pub async fn logout(
    State(state): State<AppState>,
    console: Console,
    jar: CookieJar,
) -> (CookieJar, Redirect) {
    if let Err(err) = console.client.auth().logout().await {
        warn!(error = %err, "Backend logout failed");
    }
    console.sign_out();
    state.close(console.id());
    (console::forget(jar), Redirect::to("/login"))
}
