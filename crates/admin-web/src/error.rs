//! Error types for the admin web interface.

use admin_client::ClientError;
use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use query_cache::FetchError;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::guard::Denied;

/// Errors that can occur in the admin web interface.
#[derive(Debug, Error)]
pub enum AdminError {
    /// No session, or the role may not open the page.
    #[error("Access denied: {0:?}")]
    Denied(Denied),

    /// A direct backend call failed.
    #[error("Backend error: {0}")]
    Client(#[from] ClientError),

    /// A cached read failed.
    #[error("Backend error: {0}")]
    Fetch(#[from] FetchError),

    /// The submitted form could not be read.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<Denied> for AdminError {
    fn from(denied: Denied) -> Self {
        AdminError::Denied(denied)
    }
}

impl AdminError {
    /// Whether the operator should be sent to the login page.
    pub fn needs_login(&self) -> bool {
        match self {
            AdminError::Denied(_) => true,
            AdminError::Client(err) => err.is_unauthorized(),
            AdminError::Fetch(err) => err
                .downcast_ref::<ClientError>()
                .is_some_and(ClientError::is_unauthorized),
            AdminError::BadRequest(_) | AdminError::Internal(_) => false,
        }
    }
}

/// Full-page error.
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub status: u16,
    pub message: String,
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        if self.needs_login() {
            info!(reason = %self, "Redirecting to login");
            return Redirect::to("/login").into_response();
        }

        let (status, message) = match &self {
            AdminError::Client(err) => {
                warn!("Backend error: {}", err);
                (StatusCode::BAD_GATEWAY, "The backend request failed.".to_string())
            }
            AdminError::Fetch(err) => {
                warn!("Backend error: {}", err);
                (StatusCode::BAD_GATEWAY, "The backend request failed.".to_string())
            }
            AdminError::BadRequest(msg) => {
                warn!("Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            AdminError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
            AdminError::Denied(_) => (StatusCode::FORBIDDEN, "Access denied.".to_string()),
        };

        let page = ErrorTemplate {
            status: status.as_u16(),
            message,
        };
        match page.render() {
            Ok(body) => (status, Html(body)).into_response(),
            Err(err) => {
                error!("Failed to render error page: {}", err);
                (status, page.message).into_response()
            }
        }
    }
}

/// Result type for admin operations.
pub type Result<T> = std::result::Result<T, AdminError>;
