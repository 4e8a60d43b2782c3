//! Staff accounts and roles.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{secret, timestamp};

/// Staff role. The backend knows exactly these three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Dev,
    Admin,
    Manager,
}

impl Role {
    /// Every role, in the order the role pickers list them.
    pub const ALL: [Role; 3] = [Role::Manager, Role::Admin, Role::Dev];

    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Dev => "dev",
            Role::Admin => "admin",
            Role::Manager => "manager",
        }
    }

    /// Human label.
    pub fn label(self) -> &'static str {
        match self {
            Role::Dev => "Dev",
            Role::Admin => "Admin",
            Role::Manager => "Manager",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A role name the backend does not define.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "dev" => Ok(Role::Dev),
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// A staff account.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AdminUser {
    pub id: i64,
    pub username: String,
    pub role: Role,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /admin/users`.
#[derive(Debug, Serialize)]
pub struct AdminUserCreate {
    pub username: String,
    #[serde(serialize_with = "secret::serialize")]
    pub password: SecretString,
    pub role: Role,
}

impl AdminUserCreate {
    pub fn new(username: impl Into<String>, password: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
            role,
        }
    }
}

/// Body of `PUT /admin/users/{id}`. Absent fields are left unchanged.
#[derive(Debug, Default, Serialize)]
pub struct AdminUserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "secret::serialize_opt"
    )]
    pub password: Option<SecretString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl AdminUserUpdate {
    /// True when the update would not change anything.
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.password.is_none() && self.role.is_none()
    }
}
