use dashmap::DashMap;
use std::sync::Arc;

/// Every name ever decoded from a valid record.
///
/// Grows monotonically, never pruned. Clones share the same map: the
/// aggregator holds the only writer path, everything else reads.
#[derive(Clone, Default)]
pub struct NameSet {
    names: Arc<DashMap<String, ()>>,
}

impl NameSet {
    pub fn new() -> Self {
        Self {
            names: Arc::new(DashMap::new()),
        }
    }

    /// Insert a name. Returns true if it was not present before.
    pub(crate) fn insert(&self, name: &str) -> bool {
        if self.names.contains_key(name) {
            return false;
        }
        self.names.insert(name.to_owned(), ()).is_none()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// All names, sorted.
    pub fn snapshot(&self) -> Vec<String> {
        let mut names: Vec<String> = self.names.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }
}
