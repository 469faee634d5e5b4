//! Per-request value lookup cache.

use std::collections::HashMap;

/// Cache for `(site_id, key)` value lookups, owned by one store instance
/// and therefore scoped to one logical request. Populated lazily, cleared
/// after every write so readers never see stale values.
#[derive(Debug, Default)]
pub struct LookupCache {
    entries: HashMap<i64, HashMap<String, Option<String>>>,
}

impl LookupCache {
    /// Outer `None` means "never looked up"; inner `None` is a cached miss.
    pub fn get(&self, site_id: i64, key: &str) -> Option<Option<String>> {
        self.entries.get(&site_id).and_then(|m| m.get(key)).cloned()
    }

    pub fn insert(&mut self, site_id: i64, key: &str, value: Option<String>) {
        self.entries
            .entry(site_id)
            .or_default()
            .insert(key.to_string(), value);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }
}
