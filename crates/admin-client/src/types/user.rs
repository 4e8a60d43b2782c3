//! End-user records.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{flag, timestamp};

/// A Telegram user known to the backend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct User {
    /// Internal backend id.
    pub id: i64,
    /// Telegram chat id; every per-user endpoint is keyed by this.
    pub telegram_id: i64,
    pub username: Option<String>,
    pub phone: Option<String>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    pub mouse_keyboard_skill: Option<String>,
    pub programming_experience: Option<String>,
    pub child_age: Option<i64>,
    pub child_name: Option<String>,
    #[serde(deserialize_with = "flag::deserialize")]
    pub onboarding_completed: bool,
}

impl User {
    /// `@username` when known, `#telegram_id` otherwise.
    pub fn display_name(&self) -> String {
        match &self.username {
            Some(username) => format!("@{}", username),
            None => format!("#{}", self.telegram_id),
        }
    }

    /// Link that opens the user's Telegram profile.
    pub fn telegram_link(&self) -> String {
        match &self.username {
            Some(username) => format!("https://t.me/{}", username),
            None => format!("https://t.me/{}", self.telegram_id),
        }
    }
}

/// Fields the backend extracted from the onboarding conversation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExtractedFields {
    pub mouse_keyboard_skill: Option<String>,
    pub programming_experience: Option<String>,
    pub child_age: Option<i64>,
    pub child_name: Option<String>,
}

/// Server-side onboarding extraction state for one user.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OnboardingData {
    pub extracted: ExtractedFields,
    pub needs_clarification: bool,
    pub clarification_question: Option<String>,
}
