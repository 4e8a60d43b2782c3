//! Read keys and caches for every view.
//!
//! Views never call the client directly for reads; they go through these
//! caches so concurrent requests share a fetch and mutations can invalidate.

use std::time::Duration;

use admin_client::{AdminUser, ApiClient, DocumentsResponse, Message, OnboardingData, User};
use query_cache::{CachePolicy, FetchError, QueryCache, QueryKey, Subscription};

/// How often an open chat re-fetches its transcript.
pub const CHAT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// The document list is fresh for a minute and kept for five.
pub const DOCUMENTS_POLICY: CachePolicy =
    CachePolicy::new(Duration::from_secs(60), Duration::from_secs(300));

pub fn users_key() -> QueryKey {
    QueryKey::new("users")
}

pub fn user_key(telegram_id: i64) -> QueryKey {
    QueryKey::with_id("user", telegram_id)
}

pub fn messages_key(telegram_id: i64) -> QueryKey {
    QueryKey::with_id("messages", telegram_id)
}

pub fn onboarding_key(telegram_id: i64) -> QueryKey {
    QueryKey::with_id("onboarding", telegram_id)
}

pub fn documents_key() -> QueryKey {
    QueryKey::new("documents")
}

pub fn admin_users_key() -> QueryKey {
    QueryKey::new("admin_users")
}

/// One typed cache per resource.
#[derive(Debug, Clone)]
pub struct Queries {
    pub users: QueryCache<Vec<User>>,
    pub user: QueryCache<User>,
    pub messages: QueryCache<Vec<Message>>,
    pub onboarding: QueryCache<OnboardingData>,
    pub documents: QueryCache<DocumentsResponse>,
    pub admin_users: QueryCache<Vec<AdminUser>>,
}

impl Default for Queries {
    fn default() -> Self {
        Self::new()
    }
}

impl Queries {
    pub fn new() -> Self {
        Self {
            users: QueryCache::new("users"),
            user: QueryCache::new("user"),
            messages: QueryCache::new("messages"),
            onboarding: QueryCache::new("onboarding"),
            documents: QueryCache::with_policy("documents", DOCUMENTS_POLICY),
            admin_users: QueryCache::new("admin_users"),
        }
    }

    pub async fn users(&self, client: &ApiClient) -> Result<Vec<User>, FetchError> {
        let client = client.clone();
        self.users
            .fetch(&users_key(), move || async move { client.users().list().await })
            .await
    }

    pub async fn user(&self, client: &ApiClient, telegram_id: i64) -> Result<User, FetchError> {
        let client = client.clone();
        self.user
            .fetch(&user_key(telegram_id), move || async move {
                client.users().get(telegram_id).await
            })
            .await
    }

    pub async fn onboarding(
        &self,
        client: &ApiClient,
        telegram_id: i64,
    ) -> Result<OnboardingData, FetchError> {
        let client = client.clone();
        self.onboarding
            .fetch(&onboarding_key(telegram_id), move || async move {
                client.users().onboarding_data(telegram_id).await
            })
            .await
    }

    pub async fn documents(&self, client: &ApiClient) -> Result<DocumentsResponse, FetchError> {
        let client = client.clone();
        self.documents
            .fetch(&documents_key(), move || async move {
                client.documents().list().await
            })
            .await
    }

    pub async fn admin_users(&self, client: &ApiClient) -> Result<Vec<AdminUser>, FetchError> {
        let client = client.clone();
        self.admin_users
            .fetch(&admin_users_key(), move || async move {
                client.admin_users().list().await
            })
            .await
    }

    /// Poll a user's transcript every [`CHAT_POLL_INTERVAL`] until the
    /// subscription is dropped.
    pub fn watch_messages(&self, client: &ApiClient, telegram_id: i64) -> Subscription<Vec<Message>> {
        let client = client.clone();
        self.messages.watch(
            &messages_key(telegram_id),
            CHAT_POLL_INTERVAL,
            move || {
                let client = client.clone();
                async move { client.messages().list_for_user(telegram_id).await }
            },
        )
    }

    /// Drop everything, e.g. when the operator signs out.
    pub fn clear(&self) {
        self.users.clear();
        self.user.clear();
        self.messages.clear();
        self.onboarding.clear();
        self.documents.clear();
        self.admin_users.clear();
    }

    /// Evict idle entries from every cache. Returns the number evicted.
    pub fn collect_garbage(&self) -> usize {
        self.users.collect_garbage()
            + self.user.collect_garbage()
            + self.messages.collect_garbage()
            + self.onboarding.collect_garbage()
            + self.documents.collect_garbage()
            + self.admin_users.collect_garbage()
    }
}
