//! View state: what each page renders, independent of HTML.
//!
//! Everything here is plain data plus the transitions the pages drive, so it
//! can be tested without a server.

pub mod admin_users;
pub mod attachments;
pub mod broadcast;
pub mod chat;
pub mod documents;
pub mod emoji;
pub mod form;
pub mod users;

use query_cache::{QueryState, Snapshot};

/// How a cached read looks to a view.
#[derive(Debug, Clone)]
pub enum Load<T> {
    Loading,
    Ready(T),
    Failed,
}

impl<T> Load<T> {
    /// Build from a cache snapshot, converting the value for display.
    pub fn from_snapshot<V>(snapshot: &Snapshot<V>, convert: impl FnOnce(&V) -> T) -> Self {
        match &snapshot.state {
            QueryState::Loading => Load::Loading,
            QueryState::Success(value) => Load::Ready(convert(value)),
            QueryState::Error(_) => Load::Failed,
        }
    }

    /// Build from a settled read.
    pub fn from_result<V, E>(result: Result<V, E>, convert: impl FnOnce(V) -> T) -> Self {
        match result {
            Ok(value) => Load::Ready(convert(value)),
            Err(_) => Load::Failed,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Load::Loading)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Load::Failed)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Load::Ready(value) => Some(value),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use query_cache::FetchError;

    #[test]
    fn test_from_snapshot() {
        let loading: Snapshot<u32> = Snapshot::default();
        assert!(Load::from_snapshot(&loading, |v| *v).is_loading());

        let ready = Snapshot {
            state: QueryState::Success(2u32),
            is_fetching: true,
        };
        assert_eq!(Load::from_snapshot(&ready, |v| v * 10).ready(), Some(&20));

        let failed: Snapshot<u32> = Snapshot {
            state: QueryState::Error(FetchError::new(std::fmt::Error)),
            is_fetching: false,
        };
        assert!(Load::from_snapshot(&failed, |v| *v).is_failed());
    }
}
