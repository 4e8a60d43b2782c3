//! HTTP client shared by all resource modules.

use std::sync::Arc;

use reqwest::cookie::Jar;
use reqwest::multipart::Form;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::admin_users::AdminUsersApi;
use crate::auth::AuthApi;
use crate::config::ClientConfig;
use crate::documents::DocumentsApi;
use crate::error::{ClientError, Result};
use crate::messages::MessagesApi;
use crate::users::UsersApi;

/// Which upstream service a request goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Upstream {
    Backend,
    Rag,
}

/// Client for the primary backend and the retrieval API.
///
/// Holds one JSON and one multipart client per upstream. The backend pair
/// shares a cookie jar so the session cookie set by `/auth/login` is sent on
/// every later call. The retrieval pair carries request timeouts instead.
#[derive(Clone)]
pub struct ApiClient {
    backend: Client,
    backend_form: Client,
    rag: Client,
    rag_form: Client,
    cookies: Arc<Jar>,
    config: ClientConfig,
}

impl ApiClient {
    /// Build a client for the given configuration.
    ///
    /// No request is made; connectivity problems surface on the first call.
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.backend_url.is_empty() || config.rag_url.is_empty() {
            return Err(ClientError::Config("base URLs must not be empty".to_string()));
        }

        let cookies = Arc::new(Jar::default());

        let backend = Client::builder()
            .cookie_provider(Arc::clone(&cookies))
            .build()?;
        let backend_form = Client::builder()
            .cookie_provider(Arc::clone(&cookies))
            .build()?;
        let rag = Client::builder().timeout(config.rag_timeout).build()?;
        let rag_form = Client::builder()
            .timeout(config.rag_upload_timeout)
            .build()?;

        Ok(Self {
            backend,
            backend_form,
            rag,
            rag_form,
            cookies,
            config,
        })
    }

    /// Authentication endpoints.
    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    /// End-user endpoints.
    pub fn users(&self) -> UsersApi<'_> {
        UsersApi::new(self)
    }

    /// Transcript and delivery endpoints.
    pub fn messages(&self) -> MessagesApi<'_> {
        MessagesApi::new(self)
    }

    /// Retrieval corpus endpoints.
    pub fn documents(&self) -> DocumentsApi<'_> {
        DocumentsApi::new(self)
    }

    /// Staff account endpoints.
    pub fn admin_users(&self) -> AdminUsersApi<'_> {
        AdminUsersApi::new(self)
    }

    /// Get the configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the cookie jar backing the backend session.
    pub fn cookie_jar(&self) -> &Arc<Jar> {
        &self.cookies
    }

    /// GET a JSON resource.
    pub(crate) async fn get_json<R: DeserializeOwned>(
        &self,
        upstream: Upstream,
        path: &str,
    ) -> Result<R> {
        self.call(Method::GET, upstream, path).await
    }

    /// Send a bodiless request and decode a JSON response.
    pub(crate) async fn call<R: DeserializeOwned>(
        &self,
        method: Method,
        upstream: Upstream,
        path: &str,
    ) -> Result<R> {
        let label = method.to_string();
        let request = self
            .json_client(upstream)
            .request(method, self.url(upstream, path));
        decode(self.execute(request, &label, path).await?).await
    }

    /// Send a JSON body and decode a JSON response.
    pub(crate) async fn send_json<B: Serialize, R: DeserializeOwned>(
        &self,
        method: Method,
        upstream: Upstream,
        path: &str,
        body: &B,
    ) -> Result<R> {
        let label = method.to_string();
        let request = self
            .json_client(upstream)
            .request(method, self.url(upstream, path))
            .json(body);
        decode(self.execute(request, &label, path).await?).await
    }

    /// Send a multipart form and decode a JSON response.
    pub(crate) async fn send_form<R: DeserializeOwned>(
        &self,
        method: Method,
        upstream: Upstream,
        path: &str,
        form: Form,
    ) -> Result<R> {
        let label = method.to_string();
        let request = self
            .form_client(upstream)
            .request(method, self.url(upstream, path))
            .multipart(form);
        decode(self.execute(request, &label, path).await?).await
    }

    /// Send a bodiless request and discard the response body.
    pub(crate) async fn send_empty(
        &self,
        method: Method,
        upstream: Upstream,
        path: &str,
    ) -> Result<()> {
        let label = method.to_string();
        let request = self
            .json_client(upstream)
            .request(method, self.url(upstream, path));
        self.execute(request, &label, path).await?;
        Ok(())
    }

    fn json_client(&self, upstream: Upstream) -> &Client {
        match upstream {
            Upstream::Backend => &self.backend,
            Upstream::Rag => &self.rag,
        }
    }

    fn form_client(&self, upstream: Upstream) -> &Client {
        match upstream {
            Upstream::Backend => &self.backend_form,
            Upstream::Rag => &self.rag_form,
        }
    }

    fn url(&self, upstream: Upstream, path: &str) -> String {
        match upstream {
            Upstream::Backend => self.config.backend_endpoint(path),
            Upstream::Rag => self.config.rag_endpoint(path),
        }
    }

    async fn execute(&self, request: RequestBuilder, method: &str, path: &str) -> Result<Response> {
        debug!(method, path, "API call");

        let response = request.send().await.map_err(|e| {
            warn!(method, path, error = %e, "API call failed");
            ClientError::Http(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(method, path, status = status.as_u16(), "API call rejected");
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }
}

async fn decode<R: DeserializeOwned>(response: Response) -> Result<R> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(ClientError::Json)
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.config)
            .finish()
    }
}
