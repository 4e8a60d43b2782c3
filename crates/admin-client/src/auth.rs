//! Authentication endpoints of the primary backend.

use reqwest::Method;
use tracing::info;

use crate::client::{ApiClient, Upstream};
use crate::error::Result;
use crate::types::{CurrentUser, LoginRequest, LoginResponse};

/// `/auth/*` endpoints.
#[derive(Debug, Clone, Copy)]
pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AuthApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Log in; the backend answers with a session cookie kept by the client.
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse> {
        info!(username = %request.username, "Logging in");
        self.client
            .send_json(Method::POST, Upstream::Backend, "/auth/login", request)
            .await
    }

    /// End the backend session.
    pub async fn logout(&self) -> Result<()> {
        info!("Logging out");
        self.client
            .send_empty(Method::POST, Upstream::Backend, "/auth/logout")
            .await
    }

    /// Ask the backend who the current session belongs to.
    pub async fn me(&self) -> Result<CurrentUser> {
        self.client.get_json(Upstream::Backend, "/auth/me").await
    }
}
