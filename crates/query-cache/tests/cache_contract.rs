//! Behavioural tests for the query store.
//!
//! All tests run on a paused clock so freshness windows and polling
//! intervals are exact.

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use query_cache::{CachePolicy, Mutation, QueryCache, QueryKey};

type Fetch = Pin<Box<dyn Future<Output = Result<usize, io::Error>> + Send>>;

/// A fetcher that counts its invocations and resolves to the call number.
fn counted(calls: &Arc<AtomicUsize>, delay: Duration) -> impl Fn() -> Fetch + Send + Sync + 'static {
    let calls = Arc::clone(calls);
    move || {
        let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
        Box::pin(async move {
            tokio::time::sleep(delay).await;
            Ok(n)
        })
    }
}

fn failing(calls: &Arc<AtomicUsize>) -> impl Fn() -> Fetch + Send + Sync + 'static {
    let calls = Arc::clone(calls);
    move || {
        calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async { Err(io::Error::new(io::ErrorKind::ConnectionRefused, "down")) })
    }
}

fn documents_policy() -> CachePolicy {
    CachePolicy::new(Duration::from_secs(60), Duration::from_secs(300))
}

mod read_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_readers_share_one_fetch() {
        let cache = QueryCache::new("users");
        let key = QueryKey::new("users");
        let calls = Arc::new(AtomicUsize::new(0));
        let fetch = counted(&calls, Duration::from_millis(50));

        let (a, b, c) = tokio::join!(
            cache.fetch(&key, &fetch),
            cache.fetch(&key, &fetch),
            cache.fetch(&key, &fetch),
        );

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(a.unwrap(), 1);
        assert_eq!(b.unwrap(), 1);
        assert_eq!(c.unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_settled_value() {
        let cache = QueryCache::new("users");
        let key = QueryKey::new("users");
        let calls = Arc::new(AtomicUsize::new(0));

        let mut subscriber = cache.subscribe(&key);
        assert!(subscriber.current().is_loading());

        cache
            .fetch(&key, counted(&calls, Duration::from_millis(10)))
            .await
            .unwrap();

        let snapshot = subscriber.current();
        assert_eq!(snapshot.data(), Some(&1));
        assert!(!snapshot.is_fetching);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_is_stored_and_retried_on_next_read() {
        let cache: QueryCache<usize> = QueryCache::with_policy("documents", documents_policy());
        let key = QueryKey::new("documents");
        let calls = Arc::new(AtomicUsize::new(0));
        let mut subscriber = cache.subscribe(&key);

        let err = cache.fetch(&key, failing(&calls)).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<io::Error>().map(io::Error::kind),
            Some(io::ErrorKind::ConnectionRefused)
        );
        assert!(subscriber.current().error().is_some());

        // Errors are never fresh.
        assert!(cache.is_stale(&key));
        let value = cache
            .fetch(&key, counted(&Arc::new(AtomicUsize::new(0)), Duration::ZERO))
            .await
            .unwrap();
        assert_eq!(value, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(subscriber.current().data(), Some(&1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_policy_refetches_every_read() {
        let cache = QueryCache::new("users");
        let key = QueryKey::new("users");
        let calls = Arc::new(AtomicUsize::new(0));
        let fetch = counted(&calls, Duration::ZERO);

        assert_eq!(cache.fetch(&key, &fetch).await.unwrap(), 1);
        assert_eq!(cache.fetch(&key, &fetch).await.unwrap(), 2);
    }
}

mod staleness_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_documents_freshness_and_retention_windows() {
        let cache = QueryCache::with_policy("documents", documents_policy());
        let key = QueryKey::new("documents");
        let calls = Arc::new(AtomicUsize::new(0));
        let fetch = counted(&calls, Duration::ZERO);

        cache.fetch(&key, &fetch).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Inside the freshness window: served from cache.
        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(cache.fetch(&key, &fetch).await.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Stale but retained: exactly one new call.
        tokio::time::advance(Duration::from_secs(31)).await;
        assert!(cache.is_stale(&key));
        assert_eq!(cache.fetch(&key, &fetch).await.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.fetch(&key, &fetch).await.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_entries_are_evicted_after_retention() {
        let cache = QueryCache::with_policy("documents", documents_policy());
        let idle = QueryKey::new("documents");
        let watched = QueryKey::with_id("documents", 1);
        let calls = Arc::new(AtomicUsize::new(0));

        cache.fetch(&idle, counted(&calls, Duration::ZERO)).await.unwrap();
        let _subscriber = cache.subscribe(&watched);

        tokio::time::advance(Duration::from_secs(299)).await;
        assert_eq!(cache.collect_garbage(), 0);

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(cache.collect_garbage(), 1);
        assert!(!cache.contains(&idle));
        assert!(cache.contains(&watched));
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscription_from_before_clear_spares_new_entry() {
        let cache: QueryCache<usize> = QueryCache::with_policy("documents", documents_policy());
        let key = QueryKey::new("documents");

        let before_clear = cache.subscribe(&key);
        cache.clear();
        let _live = cache.subscribe(&key);
        drop(before_clear);

        tokio::time::advance(Duration::from_secs(301)).await;
        assert_eq!(cache.collect_garbage(), 0);
        assert!(cache.contains(&key));
    }
}

mod invalidation_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_invalidate_forces_next_read() {
        let cache = QueryCache::with_policy("admin_users", documents_policy());
        let key = QueryKey::new("admin_users");
        let calls = Arc::new(AtomicUsize::new(0));
        let fetch = counted(&calls, Duration::ZERO);

        cache.fetch(&key, &fetch).await.unwrap();
        assert!(!cache.is_stale(&key));

        assert!(cache.invalidate(&key));
        assert!(cache.is_stale(&key));
        assert_eq!(cache.fetch(&key, &fetch).await.unwrap(), 2);
        assert!(!cache.is_stale(&key));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate_unknown_key() {
        let cache: QueryCache<usize> = QueryCache::new("users");
        assert!(!cache.invalidate(&QueryKey::new("users")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate_resource_marks_every_id() {
        let cache = QueryCache::with_policy("messages", documents_policy());
        let calls = Arc::new(AtomicUsize::new(0));
        let fetch = counted(&calls, Duration::ZERO);

        for id in [1, 2] {
            cache.fetch(&QueryKey::with_id("messages", id), &fetch).await.unwrap();
        }
        assert_eq!(cache.invalidate_resource("messages"), 2);
        assert!(cache.is_stale(&QueryKey::with_id("messages", 1)));
        assert!(cache.is_stale(&QueryKey::with_id("messages", 2)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidation_during_fetch_survives_settle() {
        let cache = QueryCache::with_policy("admin_users", documents_policy());
        let key = QueryKey::new("admin_users");
        let calls = Arc::new(AtomicUsize::new(0));
        let fetch = counted(&calls, Duration::from_millis(100));

        let reader = cache.clone();
        let slow = {
            let fetch = counted(&calls, Duration::from_millis(100));
            tokio::spawn(async move { reader.fetch(&key, fetch).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        cache.invalidate(&key);
        slow.await.unwrap().unwrap();

        assert!(cache.is_stale(&key));
        assert_eq!(cache.fetch(&key, &fetch).await.unwrap(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_mutation_leaves_value_untouched() {
        let cache = QueryCache::with_policy("admin_users", documents_policy());
        let key = QueryKey::new("admin_users");
        let calls = Arc::new(AtomicUsize::new(0));
        cache.fetch(&key, counted(&calls, Duration::ZERO)).await.unwrap();

        let mutation = Mutation::new("update_admin_user");
        let result = mutation
            .run(
                async { Err::<(), _>(io::Error::new(io::ErrorKind::Other, "rejected")) },
                |_| {
                    cache.invalidate(&key);
                },
            )
            .await;

        assert!(result.is_err());
        assert!(!cache.is_stale(&key));
        assert_eq!(cache.snapshot(&key).data(), Some(&1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_drops_everything() {
        let cache = QueryCache::new("users");
        let calls = Arc::new(AtomicUsize::new(0));
        cache
            .fetch(&QueryKey::new("users"), counted(&calls, Duration::ZERO))
            .await
            .unwrap();
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }
}

mod polling_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_watch_polls_until_dropped() {
        let cache = QueryCache::new("messages");
        let key = QueryKey::with_id("messages", 42);
        let calls = Arc::new(AtomicUsize::new(0));

        let subscription = cache.watch(&key, Duration::from_secs(3), counted(&calls, Duration::ZERO));
        assert!(subscription.is_polling());

        // Ticks at 0s, 3s, 6s and 9s.
        tokio::time::sleep(Duration::from_millis(9_500)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 4);

        drop(subscription);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 4);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_watch_notifies_subscriber_of_each_poll() {
        let cache = QueryCache::new("messages");
        let key = QueryKey::with_id("messages", 7);
        let calls = Arc::new(AtomicUsize::new(0));

        let mut subscription =
            cache.watch(&key, Duration::from_secs(3), counted(&calls, Duration::from_millis(5)));

        let mut seen = Vec::new();
        while seen.len() < 3 {
            let snapshot = subscription.changed().await.unwrap();
            if let Some(value) = snapshot.data().copied() {
                if !snapshot.is_fetching && seen.last() != Some(&value) {
                    seen.push(value);
                }
            }
        }
        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_poll_retries_on_next_tick() {
        let cache: QueryCache<usize> = QueryCache::new("messages");
        let key = QueryKey::with_id("messages", 9);
        let calls = Arc::new(AtomicUsize::new(0));

        let mut subscription = cache.watch(&key, Duration::from_secs(3), failing(&calls));
        tokio::time::sleep(Duration::from_millis(3_500)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(subscription.current().error().is_some());
    }
}
