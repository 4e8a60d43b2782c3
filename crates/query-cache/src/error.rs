//! Error type stored by the cache.

use std::error::Error;
use std::sync::Arc;

use thiserror::Error;

/// A failed fetch, shared by every reader of the key.
///
/// The underlying error is kept behind an `Arc` so one failure can be handed
/// to all subscribers; use [`FetchError::downcast_ref`] to inspect it.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct FetchError(Arc<dyn Error + Send + Sync + 'static>);

/// The entry was removed (e.g. the cache was cleared) before its fetch settled.
#[derive(Debug, Error)]
#[error("query was evicted before it settled")]
struct Evicted;

impl FetchError {
    pub fn new<E: Error + Send + Sync + 'static>(err: E) -> Self {
        Self(Arc::new(err))
    }

    pub(crate) fn evicted() -> Self {
        Self::new(Evicted)
    }

    /// Borrow the original error if it is of type `E`.
    pub fn downcast_ref<E: Error + 'static>(&self) -> Option<&E> {
        self.0.downcast_ref::<E>()
    }
}
