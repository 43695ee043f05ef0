use indexmap::IndexMap;

pub const DEFAULT_CACHE_CAPACITY: usize = 128;

/// Labels cached for one query.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CachedLabels {
    pub labels: Vec<String>,
    /// The last label is the query itself, added so it can be created.
    pub query_appended: bool,
}

impl From<Vec<String>> for CachedLabels {
    fn from(labels: Vec<String>) -> Self {
        Self {
            labels,
            query_appended: false,
        }
    }
}

/// Query → labels cache with least-recently-used eviction.
///
/// Insertion order doubles as recency order: the front entry is the one
/// evicted when the cache grows past its capacity.
#[derive(Debug, Clone)]
pub struct ResultCache {
    entries: IndexMap<String, CachedLabels>,
    capacity: usize,
}

impl ResultCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: IndexMap::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, query: &str) -> bool {
        self.entries.contains_key(query)
    }

    /// Look up `query` and mark it as most recently used.
    pub fn get(&mut self, query: &str) -> Option<&CachedLabels> {
        let index = self.entries.get_index_of(query)?;
        let last = self.entries.len() - 1;
        self.entries.move_index(index, last);
        self.entries.get(query)
    }

    pub fn insert(&mut self, query: String, labels: impl Into<CachedLabels>) {
        self.entries.shift_remove(&query);
        self.entries.insert(query, labels.into());
        while self.entries.len() > self.capacity {
            self.entries.shift_remove_index(0);
        }
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn labels_of(cache: &mut ResultCache, query: &str) -> Option<Vec<String>> {
        cache.get(query).map(|hit| hit.labels.clone())
    }

    #[test]
    fn get_returns_inserted_labels() {
        let mut cache = ResultCache::new(4);
        cache.insert("ab".into(), labels(&["abc", "abd"]));
        assert_eq!(labels_of(&mut cache, "ab"), Some(labels(&["abc", "abd"])));
        assert!(cache.get("zz").is_none());
    }

    #[test]
    fn insert_replaces_existing_key() {
        let mut cache = ResultCache::new(4);
        cache.insert("ab".into(), labels(&["abc"]));
        cache.insert("ab".into(), labels(&["abd"]));
        assert_eq!(cache.len(), 1);
        assert_eq!(labels_of(&mut cache, "ab"), Some(labels(&["abd"])));
    }

    #[test]
    fn evicts_least_recently_used() {
        let mut cache = ResultCache::new(2);
        cache.insert("a".into(), labels(&["a1"]));
        cache.insert("b".into(), labels(&["b1"]));
        // Touch "a" so "b" becomes the oldest.
        assert!(cache.get("a").is_some());
        cache.insert("c".into(), labels(&["c1"]));

        assert_eq!(cache.len(), 2);
        assert!(cache.contains("a"));
        assert!(!cache.contains("b"));
        assert!(cache.contains("c"));
    }

    #[test]
    fn zero_capacity_still_holds_one_entry() {
        let mut cache = ResultCache::new(0);
        cache.insert("a".into(), labels(&["a1"]));
        cache.insert("b".into(), labels(&["b1"]));
        assert_eq!(cache.capacity(), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.contains("b"));
    }

    #[test]
    fn appended_query_flag_is_kept() {
        let mut cache = ResultCache::new(4);
        cache.insert(
            "gar".into(),
            CachedLabels {
                labels: labels(&["garden", "gar"]),
                query_appended: true,
            },
        );
        assert!(cache.get("gar").unwrap().query_appended);
    }

    #[test]
    fn empty_query_is_a_valid_key() {
        let mut cache = ResultCache::default();
        assert!(cache.is_empty());
        cache.insert(String::new(), labels(&["everything"]));
        assert_eq!(labels_of(&mut cache, ""), Some(labels(&["everything"])));
    }
}
