//! Freshness and retention policy.

use std::time::Duration;

/// How long idle entries are kept by default.
pub const DEFAULT_CACHE_TIME: Duration = Duration::from_secs(5 * 60);

/// Freshness and retention windows for the entries of one cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// A value younger than this is served without a network call.
    pub stale_time: Duration,
    /// An entry with no subscribers is evicted after being idle this long.
    pub cache_time: Duration,
}

impl CachePolicy {
    pub const fn new(stale_time: Duration, cache_time: Duration) -> Self {
        Self {
            stale_time,
            cache_time,
        }
    }
}

impl Default for CachePolicy {
    /// Values are stale as soon as they arrive; idle entries live five minutes.
    fn default() -> Self {
        Self::new(Duration::ZERO, DEFAULT_CACHE_TIME)
    }
}
