//! End-user endpoints of the primary backend.

use crate::client::{ApiClient, Upstream};
use crate::error::Result;
use crate::types::{OnboardingData, User};

/// `/users/*` endpoints. Users are addressed by Telegram id.
#[derive(Debug, Clone, Copy)]
pub struct UsersApi<'a> {
    client: &'a ApiClient,
}

impl<'a> UsersApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// List every user.
    pub async fn list(&self) -> Result<Vec<User>> {
        self.client.get_json(Upstream::Backend, "/users").await
    }

    /// Get one user.
    pub async fn get(&self, telegram_id: i64) -> Result<User> {
        self.client
            .get_json(Upstream::Backend, &format!("/users/{}", telegram_id))
            .await
    }

    /// Get the onboarding fields extracted for a user.
    pub async fn onboarding_data(&self, telegram_id: i64) -> Result<OnboardingData> {
        self.client
            .get_json(
                Upstream::Backend,
                &format!("/users/{}/onboarding/data", telegram_id),
            )
            .await
    }
}
