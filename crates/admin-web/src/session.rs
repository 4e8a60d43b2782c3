//! The operator session held by one browser's console.
//!
//! The backend session cookie lives in the console's own [`ApiClient`] cookie
//! jar, and the identity it belongs to is kept here. It is established by
//! asking the backend "who am I" on first use or by a successful login, and
//! dropped on logout.

use std::sync::{Arc, PoisonError, RwLock};

use admin_client::{ApiClient, CurrentUser, LoginResponse, Role};
use tracing::{debug, info};

/// Who is signed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub username: String,
    pub role: Role,
}

impl From<CurrentUser> for Session {
    fn from(user: CurrentUser) -> Self {
        Self {
            username: user.username,
            role: user.role,
        }
    }
}

impl From<LoginResponse> for Session {
    fn from(login: LoginResponse) -> Self {
        Self {
            username: login.username,
            role: login.role,
        }
    }
}

/// Shared slot for the current [`Session`].
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<Option<Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current session, if any.
    pub fn current(&self) -> Option<Session> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set(&self, session: Session) {
        info!(username = %session.username, role = %session.role, "Session established");
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Some(session);
    }

    /// Drop the session, returning what was held.
    pub fn clear(&self) -> Option<Session> {
        let previous = self
            .inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(session) = &previous {
            info!(username = %session.username, "Session cleared");
        }
        previous
    }

    /// Ask the backend who the cookie jar belongs to and remember the answer.
    ///
    /// Any failure leaves the store empty.
    pub async fn restore(&self, client: &ApiClient) -> Option<Session> {
        match client.auth().me().await {
            Ok(user) => {
                let session = Session::from(user);
                self.set(session.clone());
                Some(session)
            }
            Err(err) => {
                debug!(error = %err, "No backend session");
                None
            }
        }
    }
}
