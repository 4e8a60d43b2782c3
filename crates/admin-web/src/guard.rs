//! Route access control.
//!
//! Every page belongs to a [`Route`]. Before a handler touches any data it
//! asks the guard whether the session role may open the route; if not the
//! operator is sent to the login page.

use std::fmt;

use admin_client::Role;

use crate::session::Session;

/// The pages of the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Users,
    Chat,
    Broadcast,
    Documents,
    AdminUsers,
}

impl Route {
    /// Pages listed in the navigation bar, in display order.
    pub const NAV: [Route; 4] = [
        Route::Users,
        Route::Broadcast,
        Route::Documents,
        Route::AdminUsers,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Route::Users => "/users",
            Route::Chat => "/chat",
            Route::Broadcast => "/broadcast",
            Route::Documents => "/documents",
            Route::AdminUsers => "/admin/users",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Route::Users => "Users",
            Route::Chat => "Chat",
            Route::Broadcast => "Broadcast",
            Route::Documents => "Documents",
            Route::AdminUsers => "Admins",
        }
    }

    /// Whether `role` may open this route.
    pub fn allows(self, role: Role) -> bool {
        match (self, role) {
            (Route::Users | Route::Chat | Route::Broadcast, _) => true,
            (Route::Documents | Route::AdminUsers, Role::Dev | Role::Admin) => true,
            (Route::Documents | Route::AdminUsers, Role::Manager) => false,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Why the guard turned a request away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Denied {
    Unauthenticated,
    Forbidden { role: Role, route: Route },
}

/// Check a session against a route.
pub fn check(session: Option<Session>, route: Route) -> Result<Session, Denied> {
    let session = session.ok_or(Denied::Unauthenticated)?;
    if route.allows(session.role) {
        Ok(session)
    } else {
        Err(Denied::Forbidden {
            role: session.role,
            route,
        })
    }
}

/// One navigation bar entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub href: &'static str,
    pub label: &'static str,
    pub active: bool,
}

/// Navigation bar contents for a signed-in operator.
#[derive(Debug, Clone)]
pub struct Nav {
    pub username: String,
    pub role: Role,
    pub links: Vec<NavLink>,
}

impl Nav {
    /// Only the routes the session role may open are listed.
    pub fn new(session: &Session, active: Route) -> Self {
        let links = Route::NAV
            .into_iter()
            .filter(|route| route.allows(session.role))
            .map(|route| NavLink {
                href: route.path(),
                label: route.title(),
                active: route == active,
            })
            .collect();

        Self {
            username: session.username.clone(),
            role: session.role,
            links,
        }
    }

    pub fn role_label(&self) -> &'static str {
        self.role.label()
    }
}
