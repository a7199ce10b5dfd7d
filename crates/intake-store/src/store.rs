//! The id-keyed content store.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use dashmap::DashMap;
use tracing::{debug, trace};
use uuid::Uuid;

/// An uploaded file as stored.
///
/// Cloning is cheap: the bytes are shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub id: String,
    pub content: Arc<[u8]>,
    pub original_name: String,
    pub mime_type: String,
    pub stored_at: SystemTime,
}

impl FileRecord {
    /// Time since the record was stored; zero if the clock went backwards.
    pub fn age(&self, now: SystemTime) -> Duration {
        now.duration_since(self.stored_at).unwrap_or_default()
    }

    fn is_expired(&self, now: SystemTime, ttl: Duration) -> bool {
        self.age(now) > ttl
    }
}

struct Inner {
    records: DashMap<String, FileRecord>,
    ttl: Duration,
}

/// Concurrent store of uploaded files with time-based expiry.
///
/// Cheaply cloneable via `Arc`; all clones share the same records.
#[derive(Clone)]
pub struct ContentStore {
    inner: Arc<Inner>,
}

impl ContentStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                records: DashMap::new(),
                ttl,
            }),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.inner.ttl
    }

    /// Stores `content` under a fresh id and returns the id.
    ///
    /// Ids are random; storing identical bytes twice yields two records.
    pub fn put(
        &self,
        content: impl Into<Arc<[u8]>>,
        original_name: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> String {
        let id = Uuid::new_v4().to_string();
        let record = FileRecord {
            id: id.clone(),
            content: content.into(),
            original_name: original_name.into(),
            mime_type: mime_type.into(),
            stored_at: SystemTime::now(),
        };
        debug!(
            file_id = %id,
            name = %record.original_name,
            bytes = record.content.len(),
            "stored file"
        );
        self.inner.records.insert(id.clone(), record);
        id
    }

    /// Snapshot of the record for `id`.
    ///
    /// A record past its time-to-live is evicted here rather than returned,
    /// even if the sweeper has not reached it yet.
    pub fn get(&self, id: &str) -> Option<FileRecord> {
        let now = SystemTime::now();
        let ttl = self.inner.ttl;
        let record = self.inner.records.get(id).map(|entry| entry.value().clone())?;
        if record.is_expired(now, ttl) {
            self.inner
                .records
                .remove_if(id, |_, record| record.is_expired(now, ttl));
            debug!(file_id = %id, "expired file evicted on read");
            return None;
        }
        Some(record)
    }

    pub fn exists(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Removes `id`; removing an absent id is a no-op. Returns whether a
    /// record was removed.
    pub fn remove(&self, id: &str) -> bool {
        let removed = self.inner.records.remove(id).is_some();
        trace!(file_id = %id, removed, "remove");
        removed
    }

    pub fn count(&self) -> usize {
        self.inner.records.len()
    }

    /// Evicts every record older than the time-to-live at `now`.
    /// Returns the number evicted.
    pub fn sweep_expired(&self, now: SystemTime) -> usize {
        let ttl = self.inner.ttl;
        let mut evicted = 0;
        self.inner.records.retain(|id, record| {
            let keep = !record.is_expired(now, ttl);
            if !keep {
                trace!(file_id = %id, "evicting expired file");
                evicted += 1;
            }
            keep
        });
        if evicted > 0 {
            debug!(evicted, remaining = self.count(), "swept expired files");
        }
        evicted
    }
}

impl std::fmt::Debug for ContentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentStore")
            .field("records", &self.count())
            .field("ttl", &self.inner.ttl)
            .finish()
    }
}
