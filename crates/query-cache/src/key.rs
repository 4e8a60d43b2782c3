//! Cache keys.

use std::fmt;

/// Identifies one unit of fetched data: a resource name and an optional id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryKey {
    resource: &'static str,
    id: Option<i64>,
}

impl QueryKey {
    /// Key for a whole collection, e.g. `("users")`.
    pub const fn new(resource: &'static str) -> Self {
        Self { resource, id: None }
    }

    /// Key for one member of a resource, e.g. `("messages", 42)`.
    pub const fn with_id(resource: &'static str, id: i64) -> Self {
        Self {
            resource,
            id: Some(id),
        }
    }

    pub fn resource(&self) -> &'static str {
        self.resource
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => write!(f, "{}/{}", self.resource, id),
            None => f.write_str(self.resource),
        }
    }
}
