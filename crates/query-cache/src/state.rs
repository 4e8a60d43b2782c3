//! Observable state of a cache entry.

use crate::error::FetchError;

/// Result of the most recent settled fetch of a key.
#[derive(Debug, Clone)]
pub enum QueryState<V> {
    /// Nothing has settled yet.
    Loading,
    Success(V),
    Error(FetchError),
}

/// What subscribers of a key see.
#[derive(Debug, Clone)]
pub struct Snapshot<V> {
    pub state: QueryState<V>,
    /// A fetch for this key is in flight. `state` still holds the last result.
    pub is_fetching: bool,
}

impl<V> Snapshot<V> {
    pub fn data(&self) -> Option<&V> {
        match &self.state {
            QueryState::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match &self.state {
            QueryState::Error(err) => Some(err),
            _ => None,
        }
    }

    /// True until the first fetch settles.
    pub fn is_loading(&self) -> bool {
        matches!(self.state, QueryState::Loading)
    }
}

impl<V> Default for Snapshot<V> {
    fn default() -> Self {
        Self {
            state: QueryState::Loading,
            is_fetching: false,
        }
    }
}
