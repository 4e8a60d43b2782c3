//! Per-browser console state.
//!
//! Every browser gets its own [`Console`]: the signed-in operator, a backend
//! client with a private cookie jar, the read caches, write state and queued
//! attachments. The console id travels in the `k1_console` cookie and
//! [`attach`] resolves it before any handler runs.

use admin_client::ApiClient;
use axum::async_trait;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use query_cache::Mutation;
use tracing::debug;
use uuid::Uuid;

use crate::error::AdminError;
use crate::guard::{self, Route};
use crate::queries::Queries;
use crate::session::{Session, SessionStore};
use crate::state::AppState;
use crate::views::attachments::Drafts;

/// Name of the cookie carrying the console id.
pub const CONSOLE_COOKIE: &str = "k1_console";

/// Named write operations, one per form trigger.
#[derive(Debug, Clone)]
pub struct Mutations {
    pub send_message: Mutation,
    pub broadcast: Mutation,
    pub upload_document: Mutation,
    pub update_document: Mutation,
    pub delete_document: Mutation,
    pub create_admin: Mutation,
    pub update_admin: Mutation,
    pub delete_admin: Mutation,
}

impl Default for Mutations {
    fn default() -> Self {
        Self {
            send_message: Mutation::new("send_message"),
            broadcast: Mutation::new("broadcast"),
            upload_document: Mutation::new("upload_document"),
            update_document: Mutation::new("update_document"),
            delete_document: Mutation::new("delete_document"),
            create_admin: Mutation::new("create_admin"),
            update_admin: Mutation::new("update_admin"),
            delete_admin: Mutation::new("delete_admin"),
        }
    }
}

/// One browser's view of the admin console.
#[derive(Debug, Clone)]
pub struct Console {
    id: Uuid,
    /// Backend and retrieval API client, with this browser's cookies.
    pub client: ApiClient,
    /// The signed-in operator.
    pub session: SessionStore,
    /// Read caches.
    pub queries: Queries,
    /// Write operations.
    pub mutations: Mutations,
    /// Attachments queued on open forms.
    pub drafts: Drafts,
}

impl Console {
    pub fn new(id: Uuid, client: ApiClient) -> Self {
        Self {
            id,
            client,
            session: SessionStore::new(),
            queries: Queries::new(),
            mutations: Mutations::default(),
            drafts: Drafts::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Check the session against `route` before any data is read.
    ///
    /// With no session in memory the backend is asked once who the cookie
    /// jar belongs to.
    pub async fn authorize(&self, route: Route) -> Result<Session, AdminError> {
        let session = match self.session.current() {
            Some(session) => Some(session),
            None => self.session.restore(&self.client).await,
        };

        guard::check(session, route).map_err(|denied| {
            debug!(console = %self.id, ?denied, %route, "Guard rejected request");
            AdminError::from(denied)
        })
    }

    /// Forget the operator and everything fetched on their behalf.
    pub fn sign_out(&self) {
        self.session.clear();
        self.queries.clear();
        self.drafts.clear_all();
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Console
where
    S: Send + Sync,
{
    type Rejection = AdminError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Console>()
            .cloned()
            .ok_or_else(|| AdminError::Internal("No console attached to request".to_string()))
    }
}

/// Attach the caller's console to the request.
///
/// A browser without a known console cookie gets a fresh console and the
/// cookie is set on the response.
pub async fn attach(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let known = jar
        .get(CONSOLE_COOKIE)
        .and_then(|cookie| cookie.value().parse::<Uuid>().ok())
        .and_then(|id| state.find(id));

    if let Some(console) = known {
        request.extensions_mut().insert(console);
        return next.run(request).await;
    }

    let console = match state.open() {
        Ok(console) => console,
        Err(err) => return AdminError::from(err).into_response(),
    };
    let cookie = console_cookie(console.id());
    request.extensions_mut().insert(console);

    let response = next.run(request).await;
    (jar.add(cookie), response).into_response()
}

/// Expire the console cookie in the browser.
pub fn forget(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(CONSOLE_COOKIE).path("/"))
}

fn console_cookie(id: Uuid) -> Cookie<'static> {
    Cookie::build((CONSOLE_COOKIE, id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}
