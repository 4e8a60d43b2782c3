//! Staff account forms.

use admin_client::{AdminUser, AdminUserCreate, AdminUserUpdate, Role};
use secrecy::SecretString;

use super::form::FormPhase;

/// Table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminUserRow {
    pub id: i64,
    pub username: String,
    pub role: Role,
    pub created: String,
    pub editing: bool,
}

impl AdminUserRow {
    pub fn rows(users: &[AdminUser], editing: Option<i64>) -> Vec<AdminUserRow> {
        users
            .iter()
            .map(|user| AdminUserRow {
                id: user.id,
                username: user.username.clone(),
                role: user.role,
                created: user.created_at.format("%d.%m.%Y").to_string(),
                editing: editing == Some(user.id),
            })
            .collect()
    }

    pub fn role_label(&self) -> &'static str {
        self.role.label()
    }

    pub fn has_role(&self, role: &Role) -> bool {
        self.role == *role
    }
}

/// The "new admin" form.
#[derive(Debug, Clone)]
pub struct CreateAdminForm {
    pub username: String,
    pub role: Role,
    phase: FormPhase,
    notice: Option<String>,
}

impl Default for CreateAdminForm {
    fn default() -> Self {
        Self {
            username: String::new(),
            role: Role::Manager,
            phase: FormPhase::Idle,
            notice: None,
        }
    }
}

impl CreateAdminForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(username: impl Into<String>, role: Role) -> Self {
        let mut form = Self {
            username: username.into(),
            role,
            ..Self::default()
        };
        form.phase.edit();
        form
    }

    /// Validate and build the request. The password is never kept on the form.
    pub fn begin_submit(&mut self, password: &str) -> Option<AdminUserCreate> {
        let username = self.username.trim();
        if username.is_empty() || password.is_empty() {
            self.phase.fail("Username and password are required.");
            return None;
        }
        if !self.phase.submit() {
            return None;
        }
        self.notice = None;
        Some(AdminUserCreate::new(username, password, self.role))
    }

    pub fn succeed(&mut self, created: &AdminUser) {
        self.username.clear();
        self.role = Role::Manager;
        self.notice = Some(format!("Admin {} created.", created.username));
        self.phase.succeed();
    }

    pub fn fail(&mut self, error: impl Into<String>) {
        self.phase.fail(error);
    }

    pub fn error(&self) -> Option<&str> {
        self.phase.error()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn has_role(&self, role: &Role) -> bool {
        self.role == *role
    }
}

/// Inline edit of one row.
#[derive(Debug, Clone)]
pub struct AdminUserEdit {
    original: AdminUser,
    pub username: String,
    pub role: Role,
    password: String,
    phase: FormPhase,
}

impl AdminUserEdit {
    /// Start editing with the current values.
    pub fn new(original: AdminUser) -> Self {
        Self {
            username: original.username.clone(),
            role: original.role,
            original,
            password: String::new(),
            phase: FormPhase::Editing { error: None },
        }
    }

    pub fn id(&self) -> i64 {
        self.original.id
    }

    pub fn set_username(&mut self, username: impl Into<String>) {
        self.username = username.into();
    }

    pub fn set_role(&mut self, role: Role) {
        self.role = role;
    }

    /// A blank password means "keep the current one".
    pub fn set_password(&mut self, password: impl Into<String>) {
        self.password = password.into();
    }

    /// Only the fields that differ from the original.
    pub fn changes(&self) -> AdminUserUpdate {
        let username = self.username.trim();
        AdminUserUpdate {
            username: (!username.is_empty() && username != self.original.username)
                .then(|| username.to_string()),
            password: (!self.password.is_empty())
                .then(|| SecretString::from(self.password.clone())),
            role: (self.role != self.original.role).then_some(self.role),
        }
    }

    pub fn begin_submit(&mut self) -> Option<AdminUserUpdate> {
        if !self.phase.submit() {
            return None;
        }
        Some(self.changes())
    }

    pub fn fail(&mut self, error: impl Into<String>) {
        self.password.clear();
        self.phase.fail(error);
    }

    pub fn error(&self) -> Option<&str> {
        self.phase.error()
    }
}
