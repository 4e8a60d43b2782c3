//! Staff account endpoints of the primary backend.

use reqwest::Method;
use tracing::info;

use crate::client::{ApiClient, Upstream};
use crate::error::Result;
use crate::types::{AdminUser, AdminUserCreate, AdminUserUpdate};

/// `/admin/users/*` endpoints.
#[derive(Debug, Clone, Copy)]
pub struct AdminUsersApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AdminUsersApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// List staff accounts.
    pub async fn list(&self) -> Result<Vec<AdminUser>> {
        self.client.get_json(Upstream::Backend, "/admin/users").await
    }

    /// Create a staff account.
    pub async fn create(&self, request: &AdminUserCreate) -> Result<AdminUser> {
        info!(username = %request.username, role = %request.role, "Creating admin user");
        self.client
            .send_json(Method::POST, Upstream::Backend, "/admin/users", request)
            .await
    }

    /// Change some fields of a staff account.
    pub async fn update(&self, id: i64, request: &AdminUserUpdate) -> Result<AdminUser> {
        info!(
            id,
            username = request.username.is_some(),
            password = request.password.is_some(),
            role = request.role.is_some(),
            "Updating admin user"
        );
        self.client
            .send_json(
                Method::PUT,
                Upstream::Backend,
                &format!("/admin/users/{}", id),
                request,
            )
            .await
    }

    /// Delete a staff account.
    pub async fn delete(&self, id: i64) -> Result<()> {
        info!(id, "Deleting admin user");
        self.client
            .send_empty(
                Method::DELETE,
                Upstream::Backend,
                &format!("/admin/users/{}", id),
            )
            .await
    }
}
