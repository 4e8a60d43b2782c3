//! Staff account management.

use admin_client::{AdminUser, Role};
use askama::Template;
use axum::extract::{Path, Query};
use axum::Form;
use serde::Deserialize;
use tracing::warn;

use crate::console::Console;
use crate::error::{AdminError, Result};
use crate::guard::{Nav, Route};
use crate::queries::admin_users_key;
use crate::session::Session;
use crate::views::admin_users::{AdminUserEdit, AdminUserRow, CreateAdminForm};
use crate::views::Load;

/// Admin users page template.
#[derive(Template)]
#[template(path = "admin_users.html")]
pub struct AdminUsersTemplate {
    pub nav: Option<Nav>,
    pub admins: Load<Vec<AdminUserRow>>,
    pub create: CreateAdminForm,
    pub edit: Option<AdminUserEdit>,
    pub roles: [Role; 3],
    pub notice: Option<String>,
}

impl AdminUsersTemplate {
    pub fn edit_error(&self) -> Option<&str> {
        self.edit.as_ref().and_then(AdminUserEdit::error)
    }

    pub fn edit_username(&self) -> &str {
        self.edit.as_ref().map_or("", |edit| edit.username.as_str())
    }

    pub fn edit_has_role(&self, role: &Role) -> bool {
        self.edit.as_ref().is_some_and(|edit| edit.role == *role)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    /// Row to show in edit mode.
    pub edit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateForm {
    pub username: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct EditForm {
    pub username: String,
    pub role: Role,
    #[serde(default)]
    pub password: String,
}

/// Render the staff table, optionally with one row in edit mode.
pub async fn admin_users_page(
    console: Console,
    Query(query): Query<PageQuery>,
) -> Result<AdminUsersTemplate> {
    let session = console.authorize(Route::AdminUsers).await?;
    let result = console.queries.admin_users(&console.client).await;

    let edit = match (&result, query.edit) {
        (Ok(admins), Some(id)) => admins
            .iter()
            .find(|admin| admin.id == id)
            .cloned()
            .map(AdminUserEdit::new),
        _ => None,
    };

    Ok(render(&session, result, CreateAdminForm::new(), edit, None))
}

/// Create a staff account.
pub async fn create(console: Console, Form(input): Form<CreateForm>) -> Result<AdminUsersTemplate> {
    let session = console.authorize(Route::AdminUsers).await?;

    let mut form = CreateAdminForm::with_input(input.username, input.role);
    if let Some(request) = form.begin_submit(&input.password) {
        let result = console
            .mutations
            .create_admin
            .run(console.client.admin_users().create(&request), |_| {
                invalidate(&console);
            })
            .await;
        match result {
            Ok(created) => form.succeed(&created),
            Err(err) => form.fail(format!("Failed to create admin: {}", err)),
        }
    }

    let admins = console.queries.admin_users(&console.client).await;
    Ok(render(&session, admins, form, None, None))
}

/// Save an inline edit. Only changed fields are sent.
pub async fn update(
    console: Console,
    Path(id): Path<i64>,
    Form(input): Form<EditForm>,
) -> Result<AdminUsersTemplate> {
    let session = console.authorize(Route::AdminUsers).await?;

    let original = find(&console, id).await?;
    let mut edit = AdminUserEdit::new(original);
    edit.set_username(input.username);
    edit.set_role(input.role);
    edit.set_password(input.password);

    let (edit, notice) = save_edit(&console, edit).await;
    let admins = console.queries.admin_users(&console.client).await;
    Ok(render(&session, admins, CreateAdminForm::new(), edit, notice))
}

/// Run the update call for an edit.
///
/// Returns the edit back (with its error) if it failed, or `None` plus a
/// notice when the row can leave edit mode.
pub async fn save_edit(
    console: &Console,
    mut edit: AdminUserEdit,
) -> (Option<AdminUserEdit>, Option<String>) {
    let id = edit.id();
    let Some(update) = edit.begin_submit() else {
        return (Some(edit), None);
    };
    if update.is_empty() {
        return (None, Some("Nothing to save.".to_string()));
    }

    let result = console
        .mutations
        .update_admin
        .run(console.client.admin_users().update(id, &update), |_| {
            invalidate(console);
        })
        .await;

    match result {
        Ok(updated) => (None, Some(format!("Admin {} saved.", updated.username))),
        Err(err) => {
            edit.fail(format!("Failed to save: {}", err));
            (Some(edit), None)
        }
    }
}

/// Delete a staff account. The page asks for confirmation before posting.
pub async fn delete(console: Console, Path(id): Path<i64>) -> Result<AdminUsersTemplate> {
    let session = console.authorize(Route::AdminUsers).await?;

    let result = console
        .mutations
        .delete_admin
        .run(console.client.admin_users().delete(id), |_| {
            invalidate(&console);
        })
        .await;
    let notice = match result {
        Ok(()) => "Admin deleted.".to_string(),
        Err(err) => {
            warn!(id, error = %err, "Failed to delete admin");
            format!("Failed to delete admin: {}", err)
        }
    };

    let admins = console.queries.admin_users(&console.client).await;
    Ok(render(&session, admins, CreateAdminForm::new(), None, Some(notice)))
}

async fn find(console: &Console, id: i64) -> Result<AdminUser> {
    console
        .queries
        .admin_users(&console.client)
        .await?
        .into_iter()
        .find(|admin| admin.id == id)
        .ok_or_else(|| AdminError::BadRequest(format!("No admin with id {}", id)))
}

fn invalidate(console: &Console) {
    console.queries.admin_users.invalidate(&admin_users_key());
}

fn render(
    session: &Session,
    admins: std::result::Result<Vec<AdminUser>, query_cache::FetchError>,
    create: CreateAdminForm,
    edit: Option<AdminUserEdit>,
    notice: Option<String>,
) -> AdminUsersTemplate {
    let editing = edit.as_ref().map(AdminUserEdit::id);

    AdminUsersTemplate {
        nav: Some(Nav::new(session, Route::AdminUsers)),
        admins: Load::from_result(admins, |admins| AdminUserRow::rows(&admins, editing)),
        create,
        edit,
        roles: Role::ALL,
        notice,
    }
}
