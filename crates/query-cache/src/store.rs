//! The keyed query store.

use std::collections::HashMap;
use std::error::Error;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::error::FetchError;
use crate::key::QueryKey;
use crate::policy::CachePolicy;
use crate::state::{QueryState, Snapshot};

/// One cache entry: status and value (in the watch channel), subscriber
/// count and fetch bookkeeping.
///
/// `generation` tells apart entries that reuse a key after eviction or
/// `clear`, so a subscription only ever releases the entry it was taken on.
struct Entry<V> {
    generation: u64,
    sender: watch::Sender<Snapshot<V>>,
    in_flight: bool,
    fetched_at: Option<Instant>,
    invalidated: bool,
    subscribers: usize,
    last_used: Instant,
}

impl<V> Entry<V> {
    fn new(generation: u64, now: Instant) -> Self {
        let (sender, _) = watch::channel(Snapshot::default());
        Self {
            generation,
            sender,
            in_flight: false,
            fetched_at: None,
            invalidated: false,
            subscribers: 0,
            last_used: now,
        }
    }

    fn is_fresh(&self, now: Instant, stale_time: Duration) -> bool {
        !self.invalidated
            && self
                .fetched_at
                .is_some_and(|at| now.duration_since(at) < stale_time)
    }

    fn is_expired(&self, now: Instant, cache_time: Duration) -> bool {
        self.subscribers == 0 && !self.in_flight && now.duration_since(self.last_used) >= cache_time
    }

    /// Mark a fetch as started. A fetch that starts after an invalidation
    /// reflects it, so the flag is cleared here and not on settle.
    fn begin_fetch(&mut self) {
        self.in_flight = true;
        self.invalidated = false;
        self.sender.send_modify(|snapshot| snapshot.is_fetching = true);
    }
}

struct Inner<V> {
    name: &'static str,
    policy: CachePolicy,
    entries: Mutex<HashMap<QueryKey, Entry<V>>>,
    generations: AtomicU64,
}

impl<V> Inner<V> {
    fn lock(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn new_entry(&self, now: Instant) -> Entry<V> {
        Entry::new(self.generations.fetch_add(1, Ordering::Relaxed), now)
    }

    fn settle(&self, key: &QueryKey, result: Result<V, FetchError>) {
        let mut entries = self.lock();
        let Some(entry) = entries.get_mut(key) else {
            debug!(cache = self.name, key = %key, "Fetch settled for evicted entry");
            return;
        };

        entry.in_flight = false;
        let state = match result {
            Ok(value) => {
                entry.fetched_at = Some(Instant::now());
                debug!(cache = self.name, key = %key, "Query settled");
                QueryState::Success(value)
            }
            Err(err) => {
                entry.fetched_at = None;
                warn!(cache = self.name, key = %key, error = %err, "Query failed");
                QueryState::Error(err)
            }
        };

        entry.sender.send_replace(Snapshot {
            state,
            is_fetching: false,
        });
    }

    fn release(&self, key: &QueryKey, generation: u64) {
        let mut entries = self.lock();
        match entries.get_mut(key) {
            Some(entry) if entry.generation == generation => {
                entry.subscribers = entry.subscribers.saturating_sub(1);
                entry.last_used = Instant::now();
            }
            _ => debug!(cache = self.name, key = %key, "Subscription outlived its entry"),
        }
    }
}

/// A keyed store of fetched values of type `V`.
///
/// Cloning is cheap and every clone shares the same entries.
pub struct QueryCache<V> {
    inner: Arc<Inner<V>>,
}

impl<V> Clone for QueryCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V: Clone + Send + Sync + 'static> QueryCache<V> {
    /// Create a cache with the default policy. `name` is used in logs.
    pub fn new(name: &'static str) -> Self {
        Self::with_policy(name, CachePolicy::default())
    }

    /// Create a cache with an explicit freshness/retention policy.
    pub fn with_policy(name: &'static str, policy: CachePolicy) -> Self {
        Self {
            inner: Arc::new(Inner {
                name,
                policy,
                entries: Mutex::new(HashMap::new()),
                generations: AtomicU64::new(0),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.inner.name
    }

    pub fn policy(&self) -> CachePolicy {
        self.inner.policy
    }

    /// Read a key.
    ///
    /// A fresh value is returned without calling `fetcher`. If a fetch for the
    /// key is already in flight the caller waits for that one. Otherwise
    /// `fetcher` is invoked once and its result is stored and broadcast to all
    /// subscribers of the key.
    pub async fn fetch<F, Fut, E>(&self, key: &QueryKey, fetcher: F) -> Result<V, FetchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
        E: Error + Send + Sync + 'static,
    {
        let now = Instant::now();
        let (mut receiver, start) = {
            let mut entries = self.inner.lock();
            self.evict_if_expired(&mut entries, key, now);

            let entry = entries.entry(*key).or_insert_with(|| self.inner.new_entry(now));
            entry.last_used = now;

            if !entry.in_flight && entry.is_fresh(now, self.inner.policy.stale_time) {
                if let QueryState::Success(value) = &entry.sender.borrow().state {
                    debug!(cache = self.inner.name, key = %key, "Cache hit");
                    return Ok(value.clone());
                }
            }

            let start = !entry.in_flight;
            if start {
                entry.begin_fetch();
            }
            (entry.sender.subscribe(), start)
        };

        if start {
            self.spawn_fetch(*key, fetcher());
        } else {
            drop(fetcher);
        }

        wait_settled(&mut receiver).await
    }

    /// Start a fetch for `key` regardless of freshness, unless one is already
    /// in flight. Returns whether `fetcher` was invoked.
    pub fn refetch<F, Fut, E>(&self, key: &QueryKey, fetcher: F) -> bool
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
        E: Error + Send + Sync + 'static,
    {
        let now = Instant::now();
        {
            let mut entries = self.inner.lock();
            let entry = entries.entry(*key).or_insert_with(|| self.inner.new_entry(now));
            entry.last_used = now;
            if entry.in_flight {
                return false;
            }
            entry.begin_fetch();
        }

        self.spawn_fetch(*key, fetcher());
        true
    }

    /// Register interest in a key without fetching it.
    ///
    /// The entry is not evicted while the subscription lives.
    pub fn subscribe(&self, key: &QueryKey) -> Subscription<V> {
        let now = Instant::now();
        let mut entries = self.inner.lock();
        let entry = entries.entry(*key).or_insert_with(|| self.inner.new_entry(now));
        entry.subscribers += 1;
        entry.last_used = now;

        Subscription {
            cache: self.clone(),
            key: *key,
            generation: entry.generation,
            receiver: entry.sender.subscribe(),
            poller: None,
        }
    }

    /// Subscribe to a key and re-fetch it every `interval`, starting now.
    ///
    /// Polling stops when the returned subscription is dropped.
    pub fn watch<F, Fut, E>(&self, key: &QueryKey, interval: Duration, fetcher: F) -> Subscription<V>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
        E: Error + Send + Sync + 'static,
    {
        let mut subscription = self.subscribe(key);

        let cache = self.clone();
        let key = *key;
        let poller = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(cache = cache.inner.name, key = %key, ?interval, "Polling started");

            loop {
                ticker.tick().await;
                cache.refetch(&key, &fetcher);
            }
        });

        subscription.poller = Some(poller);
        subscription
    }

    /// Mark a key stale so the next read goes to the network.
    ///
    /// Returns false if the key is not cached.
    pub fn invalidate(&self, key: &QueryKey) -> bool {
        let mut entries = self.inner.lock();
        match entries.get_mut(key) {
            Some(entry) => {
                entry.invalidated = true;
                debug!(cache = self.inner.name, key = %key, "Invalidated");
                true
            }
            None => false,
        }
    }

    /// Invalidate every key of a resource. Returns how many were marked.
    pub fn invalidate_resource(&self, resource: &str) -> usize {
        let mut entries = self.inner.lock();
        let mut count = 0;
        for (key, entry) in entries.iter_mut() {
            if key.resource() == resource {
                entry.invalidated = true;
                count += 1;
            }
        }
        debug!(cache = self.inner.name, resource, count, "Invalidated resource");
        count
    }

    /// Whether the next read of `key` would go to the network.
    pub fn is_stale(&self, key: &QueryKey) -> bool {
        let entries = self.inner.lock();
        entries
            .get(key)
            .map_or(true, |entry| !entry.is_fresh(Instant::now(), self.inner.policy.stale_time))
    }

    /// Current state of a key without triggering a fetch.
    pub fn snapshot(&self, key: &QueryKey) -> Snapshot<V> {
        let entries = self.inner.lock();
        entries
            .get(key)
            .map(|entry| entry.sender.borrow().clone())
            .unwrap_or_default()
    }

    /// Evict entries that have had no subscribers for longer than the
    /// retention window. Returns the number evicted.
    pub fn collect_garbage(&self) -> usize {
        let now = Instant::now();
        let cache_time = self.inner.policy.cache_time;
        let mut entries = self.inner.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now, cache_time));
        let evicted = before - entries.len();
        if evicted > 0 {
            debug!(cache = self.inner.name, evicted, "Evicted idle entries");
        }
        evicted
    }

    /// Drop every entry. Pending readers receive an eviction error.
    pub fn clear(&self) {
        let mut entries = self.inner.lock();
        entries.clear();
        debug!(cache = self.inner.name, "Cleared");
    }

    /// Whether `key` currently has an entry.
    pub fn contains(&self, key: &QueryKey) -> bool {
        self.inner.lock().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn evict_if_expired(
        &self,
        entries: &mut HashMap<QueryKey, Entry<V>>,
        key: &QueryKey,
        now: Instant,
    ) {
        let expired = entries
            .get(key)
            .is_some_and(|entry| entry.is_expired(now, self.inner.policy.cache_time));
        if expired {
            entries.remove(key);
            debug!(cache = self.inner.name, key = %key, "Evicted expired entry");
        }
    }

    fn spawn_fetch<Fut, E>(&self, key: QueryKey, future: Fut)
    where
        Fut: Future<Output = Result<V, E>> + Send + 'static,
        E: Error + Send + Sync + 'static,
    {
        debug!(cache = self.inner.name, key = %key, "Fetching");
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let result = future.await.map_err(FetchError::new);
            inner.settle(&key, result);
        });
    }
}

impl<V> std::fmt::Debug for QueryCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("name", &self.inner.name)
            .field("policy", &self.inner.policy)
            .finish()
    }
}

async fn wait_settled<V: Clone>(
    receiver: &mut watch::Receiver<Snapshot<V>>,
) -> Result<V, FetchError> {
    let snapshot = receiver
        .wait_for(|snapshot| !snapshot.is_fetching)
        .await
        .map_err(|_| FetchError::evicted())?;

    match &snapshot.state {
        QueryState::Success(value) => Ok(value.clone()),
        QueryState::Error(err) => Err(err.clone()),
        QueryState::Loading => Err(FetchError::evicted()),
    }
}

/// A live interest in one key.
///
/// Holds the entry in the cache and, for [`QueryCache::watch`], owns the
/// polling task. Dropping it is the unmount.
pub struct Subscription<V> {
    cache: QueryCache<V>,
    key: QueryKey,
    generation: u64,
    receiver: watch::Receiver<Snapshot<V>>,
    poller: Option<JoinHandle<()>>,
}

impl<V: Clone> Subscription<V> {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    /// The latest snapshot, marking it as seen.
    pub fn current(&mut self) -> Snapshot<V> {
        self.receiver.borrow_and_update().clone()
    }

    /// Wait for the next change of the key's state.
    ///
    /// Returns `None` if the entry was removed from the cache.
    pub async fn changed(&mut self) -> Option<Snapshot<V>> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    pub fn is_polling(&self) -> bool {
        self.poller.is_some()
    }
}

impl<V> Drop for Subscription<V> {
    fn drop(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.abort();
            info!(cache = self.cache.inner.name, key = %self.key, "Polling stopped");
        }
        self.cache.inner.release(&self.key, self.generation);
    }
}
