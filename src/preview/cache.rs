use super::index::RowIndex;
use crate::types::ObjectVersion;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;

type CacheKey = (String, String);

/// Row indexes keyed by `(bucket, key)`, valid only for the object version they were built from
pub struct RowIndexCache {
    capacity: usize,
    inner: RwLock<CacheState>,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<CacheKey, Arc<RowIndex>>,
    insertion_order: VecDeque<CacheKey>,
}

impl RowIndexCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: RwLock::new(CacheState::default()),
        }
    }

    /// Cached index for this exact version of the object, if any
    pub async fn get(&self, bucket: &str, key: &str, version: &ObjectVersion) -> Option<Arc<RowIndex>> {
        let state = self.inner.read().await;
        let index = state.entries.get(&(bucket.to_string(), key.to_string()))?;

        if &index.version == version {
            Some(Arc::clone(index))
        } else {
            tracing::debug!("Row index for {}/{} is stale", bucket, key);
            None
        }
    }

    /// Store `index`, replacing any entry for the same object
    pub async fn insert(&self, bucket: &str, key: &str, index: RowIndex) -> Arc<RowIndex> {
        let index = Arc::new(index);
        let cache_key = (bucket.to_string(), key.to_string());

        let mut state = self.inner.write().await;
        if state
            .entries
            .insert(cache_key.clone(), Arc::clone(&index))
            .is_none()
        {
            state.insertion_order.push_back(cache_key);
        }

        while state.entries.len() > self.capacity {
            let Some(oldest) = state.insertion_order.pop_front() else {
                break;
            };
            state.entries.remove(&oldest);
            tracing::debug!("Evicted row index for {}/{}", oldest.0, oldest.1);
        }

        index
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::index::RowIndexBuilder;

    fn version(etag: &str) -> ObjectVersion {
        ObjectVersion {
            etag: etag.to_string(),
            last_modified: chrono::DateTime::default(),
            size: 4,
        }
    }

    fn index(etag: &str, data: &str) -> RowIndex {
        let mut builder = RowIndexBuilder::new(10);
        builder.feed(data.as_bytes()).unwrap();
        builder.finish(version(etag)).unwrap()
    }

    #[tokio::test]
    async fn test_hit_only_for_same_version() {
        let cache = RowIndexCache::new(4);
        cache.insert("b", "k", index("v1", "h\n1\n")).await;

        assert!(cache.get("b", "k", &version("v1")).await.is_some());
        assert!(cache.get("b", "k", &version("v2")).await.is_none());
        assert!(cache.get("b", "other", &version("v1")).await.is_none());
    }

    #[tokio::test]
    async fn test_new_version_replaces_entry() {
        let cache = RowIndexCache::new(4);
        let old = cache.insert("b", "k", index("v1", "h\n1\n")).await;
        cache.insert("b", "k", index("v2", "h\n1\n2\n")).await;

        assert_eq!(cache.len().await, 1);
        let current = cache.get("b", "k", &version("v2")).await.unwrap();
        assert_eq!(current.total_rows(), 2);
        // Readers holding the old snapshot keep a consistent view
        assert_eq!(old.total_rows(), 1);
    }

    #[tokio::test]
    async fn test_capacity_evicts_oldest() {
        let cache = RowIndexCache::new(2);
        cache.insert("b", "one", index("v", "h\n")).await;
        cache.insert("b", "two", index("v", "h\n")).await;
        cache.insert("b", "three", index("v", "h\n")).await;

        assert_eq!(cache.len().await, 2);
        assert!(cache.get("b", "one", &version("v")).await.is_none());
        assert!(cache.get("b", "three", &version("v")).await.is_some());
    }
}
