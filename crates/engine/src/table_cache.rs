//! Table existence cache
//!
//! Remembers which kinds are known to have a table, so creation and
//! migration run at most once per kind for as long as the cache lives.
//! Entries are never removed. Share one cache between stores with `Arc` to
//! get process-wide behavior, or give each test its own.

use dashmap::DashSet;

/// Set of kind names whose table is known to exist
#[derive(Debug, Default)]
pub struct TableCache {
    known: DashSet<String>,
}

impl TableCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// True if `kind` was already marked
    pub fn contains(&self, kind: &str) -> bool {
        self.known.contains(kind)
    }

    /// Mark `kind` as existing. Returns `true` if it was not marked before.
    pub fn mark(&self, kind: &str) -> bool {
        self.known.insert(kind.to_string())
    }

    /// Number of marked kinds
    pub fn len(&self) -> usize {
        self.known.len()
    }

    /// True if no kind is marked
    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }
}
