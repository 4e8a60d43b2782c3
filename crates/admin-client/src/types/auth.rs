//! Authentication types.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use super::{secret, Role};

/// Credentials for `/auth/login`.
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub username: String,
    #[serde(serialize_with = "secret::serialize")]
    pub password: SecretString,
}

impl LoginRequest {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }
}

/// Successful login.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoginResponse {
    pub username: String,
    pub role: Role,
    pub message: String,
}

/// Identity behind the current backend session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CurrentUser {
    pub username: String,
    pub role: Role,
}
