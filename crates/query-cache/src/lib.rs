//! Keyed query store for the admin console.
//!
//! Views read data through a [`QueryCache`] instead of calling the backend
//! directly. Each cache entry is identified by a [`QueryKey`] and tracks its
//! status, last value, subscriber count and last fetch time:
//!
//! - concurrent reads of a key share one in-flight fetch
//! - fresh values (per [`CachePolicy`]) are served without a network call
//! - [`QueryCache::invalidate`] marks a key stale after a mutation
//! - [`QueryCache::watch`] re-fetches a key on a fixed interval until the
//!   returned [`Subscription`] is dropped
//! - idle entries are evicted after the retention window
//!
//! # Example
//!
//! ```no_run
//! use query_cache::{QueryCache, QueryKey};
//!
//! # async fn example() -> Result<(), query_cache::FetchError> {
//! let cache: QueryCache<Vec<String>> = QueryCache::new("names");
//! let key = QueryKey::new("names");
//!
//! let names = cache
//!     .fetch(&key, || async { Ok::<_, std::io::Error>(vec!["a".to_string()]) })
//!     .await?;
//! assert_eq!(names.len(), 1);
//!
//! // After a write, force the next read to go to the network.
//! cache.invalidate(&key);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod key;
pub mod mutation;
pub mod policy;
pub mod state;
pub mod store;

pub use error::FetchError;
pub use key::QueryKey;
pub use mutation::Mutation;
pub use policy::CachePolicy;
pub use state::{QueryState, Snapshot};
pub use store::{QueryCache, Subscription};
