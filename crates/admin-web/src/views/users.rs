//! Users table and onboarding card.

use admin_client::{OnboardingData, User};

/// Table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    pub telegram_id: i64,
    pub username: String,
    pub phone: String,
    pub link: String,
    pub status: &'static str,
    pub completed: bool,
    pub registered: String,
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        Self {
            telegram_id: user.telegram_id,
            username: user
                .username
                .as_ref()
                .map(|name| format!("@{}", name))
                .unwrap_or_else(|| "-".to_string()),
            phone: user.phone.clone().unwrap_or_else(|| "-".to_string()),
            link: user.telegram_link(),
            status: onboarding_status(user.onboarding_completed),
            completed: user.onboarding_completed,
            registered: user.created_at.format("%d.%m.%Y").to_string(),
        }
    }
}

pub fn rows(users: &[User]) -> Vec<UserRow> {
    users.iter().map(UserRow::from).collect()
}

pub fn onboarding_status(completed: bool) -> &'static str {
    if completed {
        "Completed"
    } else {
        "In progress"
    }
}

/// One labelled value on the onboarding card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardField {
    pub label: &'static str,
    pub value: String,
}

/// What the onboarding dialogue extracted so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnboardingCard {
    pub fields: Vec<CardField>,
    pub clarification: Option<String>,
}

impl From<&OnboardingData> for OnboardingCard {
    fn from(data: &OnboardingData) -> Self {
        let extracted = &data.extracted;
        let text = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());

        let fields = vec![
            CardField {
                label: "Child name",
                value: text(&extracted.child_name),
            },
            CardField {
                label: "Child age",
                value: extracted
                    .child_age
                    .map(|age| age.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            },
            CardField {
                label: "Mouse & keyboard",
                value: text(&extracted.mouse_keyboard_skill),
            },
            CardField {
                label: "Programming experience",
                value: text(&extracted.programming_experience),
            },
        ];

        let clarification = if data.needs_clarification {
            Some(
                data.clarification_question
                    .clone()
                    .unwrap_or_else(|| "Clarification needed".to_string()),
            )
        } else {
            None
        };

        Self {
            fields,
            clarification,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use admin_client::ExtractedFields;
    use chrono::Utc;

    #[test]
    fn test_row_placeholders() {
        let user = User {
            id: 1,
            telegram_id: 42,
            username: None,
            phone: None,
            created_at: Utc::now(),
            mouse_keyboard_skill: None,
            programming_experience: None,
            child_age: None,
            child_name: None,
            onboarding_completed: true,
        };
        let row = UserRow::from(&user);
        assert_eq!(row.username, "-");
        assert_eq!(row.phone, "-");
        assert_eq!(row.link, "https://t.me/42");
        assert_eq!(row.status, "Completed");
        assert_eq!(onboarding_status(false), "In progress");
    }

    #[test]
    fn test_card_clarification() {
        let data = OnboardingData {
            extracted: ExtractedFields {
                child_age: Some(8),
                ..Default::default()
            },
            needs_clarification: true,
            clarification_question: None,
        };
        let card = OnboardingCard::from(&data);
        assert_eq!(card.fields[1].value, "8");
        assert_eq!(card.fields[0].value, "-");
        assert_eq!(card.clarification.as_deref(), Some("Clarification needed"));
    }
}
