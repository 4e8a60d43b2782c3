//! Users table.

use askama::Template;
use axum::extract::Path;

use crate::console::Console;
use crate::error::Result;
use crate::guard::{Nav, Route};
use crate::views::users::{self, OnboardingCard, UserRow};
use crate::views::Load;

/// Users page template.
#[derive(Template)]
#[template(path = "users.html")]
pub struct UsersTemplate {
    pub nav: Option<Nav>,
    pub users: Load<Vec<UserRow>>,
}

/// Onboarding card fragment, loaded when a row is expanded.
#[derive(Template)]
#[template(path = "user_card.html")]
pub struct UserCardTemplate {
    pub card: Load<OnboardingCard>,
}

/// Render the users table.
pub async fn users_page(console: Console) -> Result<UsersTemplate> {
    let session = console.authorize(Route::Users).await?;
    let result = console.queries.users(&console.client).await;

    Ok(UsersTemplate {
        nav: Some(Nav::new(&session, Route::Users)),
        users: Load::from_result(result, |list| users::rows(&list)),
    })
}

/// Render one user's onboarding card.
pub async fn onboarding_card(
    console: Console,
    Path(telegram_id): Path<i64>,
) -> Result<UserCardTemplate> {
    console.authorize(Route::Users).await?;
    let result = console.queries.onboarding(&console.client, telegram_id).await;

    Ok(UserCardTemplate {
        card: Load::from_result(result, |data| OnboardingCard::from(&data)),
    })
}
