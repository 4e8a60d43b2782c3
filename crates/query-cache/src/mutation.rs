//! Named write operations.

use std::fmt::Display;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{info, warn};

/// A named create/update/delete operation.
///
/// There is no optimistic local patch: the cache is only touched through the
/// `on_success` hook, typically to invalidate the affected read keys. The
/// pending flag lets a view disable its trigger while the call is running; it
/// does not serialize concurrent runs.
#[derive(Debug, Clone)]
pub struct Mutation {
    name: &'static str,
    pending: Arc<AtomicBool>,
}

impl Mutation {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            pending: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst)
    }

    /// Run the operation. `on_success` runs only if it succeeds; on failure
    /// the error is returned to the caller untouched.
    pub async fn run<T, E, Fut, S>(&self, operation: Fut, on_success: S) -> Result<T, E>
    where
        Fut: Future<Output = Result<T, E>>,
        S: FnOnce(&T),
        E: Display,
    {
        let _pending = PendingGuard::set(&self.pending);

        match operation.await {
            Ok(value) => {
                on_success(&value);
                info!(mutation = self.name, "Mutation succeeded");
                Ok(value)
            }
            Err(err) => {
                warn!(mutation = self.name, error = %err, "Mutation failed");
                Err(err)
            }
        }
    }
}

struct PendingGuard<'a>(&'a AtomicBool);

impl<'a> PendingGuard<'a> {
    fn set(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_success_runs_hook() {
        let mutation = Mutation::new("create");
        let mut invalidated = false;

        let result: Result<u32, String> = mutation
            .run(async { Ok(5) }, |value| invalidated = *value == 5)
            .await;

        assert_eq!(result, Ok(5));
        assert!(invalidated);
        assert!(!mutation.is_pending());
    }

    #[tokio::test]
    async fn test_failure_skips_hook() {
        let mutation = Mutation::new("delete");
        let mut invalidated = false;

        let result: Result<u32, String> = mutation
            .run(async { Err("boom".to_string()) }, |_| invalidated = true)
            .await;

        assert_eq!(result, Err("boom".to_string()));
        assert!(!invalidated);
        assert!(!mutation.is_pending());
    }

    #[tokio::test]
    async fn test_pending_while_running() {
        let mutation = Mutation::new("update");
        let observer = mutation.clone();

        let result: Result<bool, String> = mutation
            .run(async move { Ok(observer.is_pending()) }, |_| {})
            .await;

        assert_eq!(result, Ok(true));
        assert!(!mutation.is_pending());
    }
}
