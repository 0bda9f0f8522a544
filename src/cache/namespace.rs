//! A single namespace: its own key space behind its own mutex.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

use super::entry::Entry;
use super::lock::mutex_lock;
use super::stats::{EntryInfo, NamespaceStats};

/// Type-erased payload; readers downcast to the type they wrote.
pub(crate) type Payload = Box<dyn Any + Send + Sync>;

/// Result of a read against one namespace.
#[derive(Debug)]
pub(crate) enum ReadOutcome<T> {
    Hit(T),
    Missing,
    /// The entry had expired and was removed by this read.
    Expired,
    /// The stored payload is not a `T`; the entry is left untouched.
    TypeMismatch,
}

/// Result of a presence check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Presence {
    Live,
    Missing,
    Expired,
}

pub(crate) struct NamespaceStore {
    name: String,
    entries: Mutex<HashMap<String, Entry<Payload>>>,
}

impl NamespaceStore {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn insert(&self, key: &str, data: Payload, ttl: Duration, now: Instant) {
        mutex_lock(&self.entries, "namespace.insert")
            .insert(key.to_owned(), Entry::new(data, ttl, now));
    }

    /// Expiry check, eviction and accounting happen under one lock so a
    /// concurrent sweep can never remove an entry this read is returning.
    pub(crate) fn read<T>(&self, key: &str, now: Instant) -> ReadOutcome<T>
    where
        T: Clone + 'static,
    {
        let mut entries = mutex_lock(&self.entries, "namespace.read");
        let Some(entry) = entries.get_mut(key) else {
            return ReadOutcome::Missing;
        };

        if entry.is_expired_at(now) {
            entries.remove(key);
            return ReadOutcome::Expired;
        }

        if !entry.data().is::<T>() {
            return ReadOutcome::TypeMismatch;
        }

        match entry.touch(now).downcast_ref::<T>() {
            Some(value) => ReadOutcome::Hit(value.clone()),
            None => ReadOutcome::TypeMismatch,
        }
    }

    pub(crate) fn presence(&self, key: &str, now: Instant) -> Presence {
        let mut entries = mutex_lock(&self.entries, "namespace.presence");
        let expired = match entries.get(key) {
            None => return Presence::Missing,
            Some(entry) => entry.is_expired_at(now),
        };

        if expired {
            entries.remove(key);
            Presence::Expired
        } else {
            Presence::Live
        }
    }

    pub(crate) fn remove(&self, key: &str) -> bool {
        mutex_lock(&self.entries, "namespace.remove")
            .remove(key)
            .is_some()
    }

    /// Drop every entry whose TTL has elapsed; returns how many were removed.
    pub(crate) fn purge_expired(&self, now: Instant) -> usize {
        let mut entries = mutex_lock(&self.entries, "namespace.purge_expired");
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_at(now));
        before - entries.len()
    }

    pub(crate) fn stats(&self) -> NamespaceStats {
        let entries = mutex_lock(&self.entries, "namespace.stats");
        NamespaceStats {
            entries: entries.len(),
            total_access_count: entries.values().map(Entry::access_count).sum(),
        }
    }

    pub(crate) fn info(&self, key: &str, now: Instant) -> Option<EntryInfo> {
        let entries = mutex_lock(&self.entries, "namespace.info");
        entries.get(key).map(|entry| EntryInfo {
            age: entry.age_at(now),
            ttl: entry.ttl(),
            access_count: entry.access_count(),
            since_last_access: now.saturating_duration_since(entry.last_accessed_at()),
            expired: entry.is_expired_at(now),
        })
    }

    pub(crate) fn len(&self) -> usize {
        mutex_lock(&self.entries, "namespace.len").len()
    }

    #[cfg(test)]
    pub(crate) fn entries_for_test(
        &self,
    ) -> std::sync::MutexGuard<'_, HashMap<String, Entry<Payload>>> {
        mutex_lock(&self.entries, "namespace.entries_for_test")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINUTE: Duration = Duration::from_secs(60);

    fn store_with(
        key: &str,
        value: &'static str,
        ttl: Duration,
        now: Instant,
    ) -> NamespaceStore {
        let store = NamespaceStore::new("materials");
        store.insert(key, Box::new(value), ttl, now);
        store
    }

    #[test]
    fn read_hit_counts_access() {
        let now = Instant::now();
        let store = store_with("mat1", "red", MINUTE, now);

        assert!(matches!(store.read::<&str>("mat1", now), ReadOutcome::Hit("red")));
        assert!(matches!(store.read::<&str>("mat1", now), ReadOutcome::Hit("red")));
        assert_eq!(store.stats().total_access_count, 2);
    }

    #[test]
    fn expired_read_evicts() {
        let now = Instant::now();
        let store = store_with("mat1", "red", MINUTE, now);

        let later = now + MINUTE;
        assert!(matches!(store.read::<&str>("mat1", later), ReadOutcome::Expired));
        assert_eq!(store.len(), 0);
        assert!(matches!(store.read::<&str>("mat1", later), ReadOutcome::Missing));
    }

    #[test]
    fn type_mismatch_leaves_entry_and_counters_alone() {
        let now = Instant::now();
        let store = store_with("mat1", "red", MINUTE, now);

        assert!(matches!(store.read::<u32>("mat1", now), ReadOutcome::TypeMismatch));
        assert_eq!(store.len(), 1);
        assert_eq!(store.stats().total_access_count, 0);
    }

    #[test]
    fn presence_does_not_touch_counters() {
        let now = Instant::now();
        let store = store_with("mat1", "red", MINUTE, now);

        assert_eq!(store.presence("mat1", now), Presence::Live);
        assert_eq!(store.presence("other", now), Presence::Missing);
        assert_eq!(store.stats().total_access_count, 0);
        assert_eq!(store.presence("mat1", now + MINUTE), Presence::Expired);
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn purge_only_removes_expired() {
        let now = Instant::now();
        let store = NamespaceStore::new("bounds");
        store.insert("short", Box::new(1_u8), Duration::from_secs(1), now);
        store.insert("long", Box::new(2_u8), MINUTE, now);

        assert_eq!(store.purge_expired(now + Duration::from_secs(2)), 1);
        assert_eq!(store.len(), 1);
        assert!(store.info("long", now).is_some());
        assert!(store.info("short", now).is_none());
    }

    #[test]
    fn info_reports_without_evicting() {
        let now = Instant::now();
        let store = store_with("mat1", "red", MINUTE, now);

        let info = store.info("mat1", now + MINUTE).expect("entry info");
        assert!(info.expired);
        assert_eq!(info.ttl, MINUTE);
        assert_eq!(store.len(), 1);
    }
}
