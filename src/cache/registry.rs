//! Process-wide cache registry.
//!
//! Owns every namespace store and exposes the generic get/set/has/delete/clear
//! contract. One registry is built at startup and handed to collaborators as
//! an `Arc<CacheRegistry>`.

use std::any::type_name;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use metrics::counter;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::adapters::{BoundsCache, MaterialCache, TextureCache};
use super::config::CacheConfig;
use super::error::CacheError;
use super::lock::{mutex_lock, rw_read, rw_write};
use super::namespace::{NamespaceStore, Payload, Presence, ReadOutcome};
use super::stats::{CacheStats, EntryInfo, StatsReport};
use super::sweeper::Sweeper;

const METRIC_CACHE_HIT: &str = "scenecache_cache_hit_total";
const METRIC_CACHE_MISS: &str = "scenecache_cache_miss_total";
const METRIC_CACHE_EXPIRED: &str = "scenecache_cache_expired_total";

/// Namespaced TTL cache shared by every subsystem.
///
/// Lock order is always registry map first, then a single namespace. Creating
/// or removing namespaces takes the map's write lock; everything else only
/// reads the map and locks the one namespace it touches.
pub struct CacheRegistry {
    config: CacheConfig,
    namespaces: RwLock<HashMap<String, NamespaceStore>>,
    sweeper: Mutex<Option<Sweeper>>,
    disposed: AtomicBool,
    /// Makes the next sweep tick panic.
    #[cfg(test)]
    fail_next_sweep: AtomicBool,
}

impl CacheRegistry {
    /// Create a registry without a background sweep.
    ///
    /// Expired entries are still dropped when read; call [`cleanup`] or
    /// [`start_cleanup_interval`] to reclaim cold keys.
    ///
    /// [`cleanup`]: Self::cleanup
    /// [`start_cleanup_interval`]: Self::start_cleanup_interval
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            namespaces: RwLock::new(HashMap::new()),
            sweeper: Mutex::new(None),
            disposed: AtomicBool::new(false),
            #[cfg(test)]
            fail_next_sweep: AtomicBool::new(false),
        }
    }

    /// Create a shared registry and start its periodic sweep.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(config: CacheConfig) -> Result<Arc<Self>, CacheError> {
        let registry = Arc::new(Self::new(config));
        registry.start_cleanup_interval()?;
        Ok(registry)
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    // ========================================================================
    // Generic contract
    // ========================================================================

    /// Insert or overwrite `key` in `namespace` with the default TTL.
    pub fn set<T>(&self, namespace: &str, key: &str, data: T)
    where
        T: Send + Sync + 'static,
    {
        self.insert(namespace, key, Box::new(data), None);
    }

    /// Insert or overwrite `key` in `namespace` with an explicit TTL.
    pub fn set_with_ttl<T>(&self, namespace: &str, key: &str, data: T, ttl: Duration)
    where
        T: Send + Sync + 'static,
    {
        self.insert(namespace, key, Box::new(data), Some(ttl));
    }

    /// Return a copy of the cached value, or `None` on a miss.
    ///
    /// An expired entry is removed by this call. A hit bumps the entry's
    /// access count.
    pub fn get<T>(&self, namespace: &str, key: &str) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let namespaces = rw_read(&self.namespaces, "registry.get");
        let Some(store) = namespaces.get(namespace) else {
            record_miss(namespace);
            return None;
        };

        match store.read::<T>(key, Instant::now()) {
            ReadOutcome::Hit(value) => {
                counter!(METRIC_CACHE_HIT, "namespace" => namespace.to_owned()).increment(1);
                Some(value)
            }
            ReadOutcome::Missing => {
                record_miss(namespace);
                None
            }
            ReadOutcome::Expired => {
                record_read_expiry(namespace, key);
                record_miss(namespace);
                None
            }
            ReadOutcome::TypeMismatch => {
                warn!(
                    namespace,
                    key,
                    expected = type_name::<T>(),
                    "Cached payload has a different type than requested"
                );
                record_miss(namespace);
                None
            }
        }
    }

    /// Whether a live entry exists. Removes it if expired; never counts as a read.
    pub fn has(&self, namespace: &str, key: &str) -> bool {
        let namespaces = rw_read(&self.namespaces, "registry.has");
        let Some(store) = namespaces.get(namespace) else {
            return false;
        };

        match store.presence(key, Instant::now()) {
            Presence::Live => true,
            Presence::Missing => false,
            Presence::Expired => {
                record_read_expiry(namespace, key);
                false
            }
        }
    }

    /// Remove `key`, reporting whether anything was there.
    pub fn delete(&self, namespace: &str, key: &str) -> bool {
        let namespaces = rw_read(&self.namespaces, "registry.delete");
        let deleted = namespaces
            .get(namespace)
            .is_some_and(|store| store.remove(key));
        if deleted {
            debug!(namespace, key, "Deleted cache entry");
        }
        deleted
    }

    /// Drop one namespace, or all of them when `namespace` is `None`.
    pub fn clear(&self, namespace: Option<&str>) {
        let mut namespaces = rw_write(&self.namespaces, "registry.clear");
        match namespace {
            Some(name) => {
                if namespaces.remove(name).is_some() {
                    debug!(namespace = name, "Cleared cache namespace");
                }
            }
            None => {
                namespaces.clear();
                debug!("Cleared all cache namespaces");
            }
        }
    }

    /// Per-namespace entry and access totals.
    ///
    /// Does not filter or purge expired entries.
    pub fn stats(&self) -> CacheStats {
        rw_read(&self.namespaces, "registry.stats")
            .iter()
            .map(|(name, store)| (name.clone(), store.stats()))
            .collect()
    }

    /// [`stats`](Self::stats) plus totals and a timestamp.
    pub fn report(&self) -> StatsReport {
        StatsReport::from_stats(self.stats())
    }

    /// Diagnostics for one entry; neither evicts nor counts as a read.
    pub fn entry_info(&self, namespace: &str, key: &str) -> Option<EntryInfo> {
        rw_read(&self.namespaces, "registry.entry_info")
            .get(namespace)
            .and_then(|store| store.info(key, Instant::now()))
    }

    /// Number of physically present entries in `namespace`, expired or not.
    pub fn len(&self, namespace: &str) -> usize {
        rw_read(&self.namespaces, "registry.len")
            .get(namespace)
            .map_or(0, NamespaceStore::len)
    }

    // ========================================================================
    // Domain adapters
    // ========================================================================

    pub fn bounds(&self) -> BoundsCache<'_> {
        BoundsCache::new(self)
    }

    pub fn materials(&self) -> MaterialCache<'_> {
        MaterialCache::new(self)
    }

    pub fn textures(&self) -> TextureCache<'_> {
        TextureCache::new(self)
    }

    // ========================================================================
    // Sweep and lifecycle
    // ========================================================================

    /// Remove every expired entry in every namespace.
    ///
    /// Namespaces are locked one at a time; returns the number removed.
    pub fn cleanup(&self) -> usize {
        let now = Instant::now();
        let namespaces = rw_read(&self.namespaces, "registry.cleanup");

        let mut total = 0;
        for store in namespaces.values() {
            let removed = store.purge_expired(now);
            if removed > 0 {
                debug!(
                    namespace = store.name(),
                    removed, "Cleaned expired entries from cache namespace"
                );
                counter!(
                    METRIC_CACHE_EXPIRED,
                    "namespace" => store.name().to_owned(),
                    "path" => "sweep"
                )
                .increment(removed as u64);
            }
            total += removed;
        }
        drop(namespaces);

        if total > 0 {
            info!(removed = total, "Cache cleanup completed");
        }
        total
    }

    /// One scheduled sweep tick.
    pub(crate) fn sweep_tick(&self) -> usize {
        #[cfg(test)]
        if self.fail_next_sweep.swap(false, Ordering::AcqRel) {
            panic!("injected sweep failure");
        }
        self.cleanup()
    }

    /// Start the periodic sweep on the current tokio runtime.
    ///
    /// Returns `Ok(false)` when a sweep is already running or the registry
    /// has been disposed.
    pub fn start_cleanup_interval(self: &Arc<Self>) -> Result<bool, CacheError> {
        let mut sweeper = mutex_lock(&self.sweeper, "registry.start_cleanup_interval");

        if self.is_disposed() {
            warn!("Refusing to start cache sweep on a disposed registry");
            return Ok(false);
        }
        if sweeper.as_ref().is_some_and(Sweeper::is_running) {
            return Ok(false);
        }

        *sweeper = Some(Sweeper::spawn(
            Arc::downgrade(self),
            self.config.sweep_interval(),
        )?);
        Ok(true)
    }

    /// Stop the periodic sweep. Returns whether one was running.
    pub fn stop_cleanup_interval(&self) -> bool {
        let sweeper = mutex_lock(&self.sweeper, "registry.stop_cleanup_interval").take();
        match sweeper {
            Some(sweeper) => {
                let was_running = sweeper.is_running();
                sweeper.stop();
                was_running
            }
            None => false,
        }
    }

    pub fn is_sweeping(&self) -> bool {
        mutex_lock(&self.sweeper, "registry.is_sweeping")
            .as_ref()
            .is_some_and(Sweeper::is_running)
    }

    /// Stop the sweep and drop every namespace.
    ///
    /// Safe to call more than once. Later writes are ignored.
    pub fn dispose(&self) {
        let first = !self.disposed.swap(true, Ordering::AcqRel);
        self.stop_cleanup_interval();
        self.clear(None);
        if first {
            info!("Cache registry disposed");
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    fn insert(&self, namespace: &str, key: &str, data: Payload, ttl: Option<Duration>) {
        let ttl = ttl.unwrap_or_else(|| self.config.default_ttl());
        let now = Instant::now();

        {
            let namespaces = rw_read(&self.namespaces, "registry.set");
            if self.rejects_writes(namespace, key) {
                return;
            }
            if let Some(store) = namespaces.get(namespace) {
                store.insert(key, data, ttl, now);
                debug!(namespace, key, ttl_ms = ttl.as_millis() as u64, "Cached item");
                return;
            }
        }

        let mut namespaces = rw_write(&self.namespaces, "registry.set.create_namespace");
        if self.rejects_writes(namespace, key) {
            return;
        }
        namespaces
            .entry(namespace.to_owned())
            .or_insert_with(|| NamespaceStore::new(namespace))
            .insert(key, data, ttl, now);
        debug!(namespace, key, ttl_ms = ttl.as_millis() as u64, "Cached item");
    }

    /// Checked while holding the map lock so a write cannot slip in after
    /// `dispose` has cleared everything.
    fn rejects_writes(&self, namespace: &str, key: &str) -> bool {
        let disposed = self.is_disposed();
        if disposed {
            warn!(namespace, key, "Ignoring write to a disposed cache registry");
        }
        disposed
    }
}

impl Drop for CacheRegistry {
    fn drop(&mut self) {
        self.stop_cleanup_interval();
    }
}

fn record_miss(namespace: &str) {
    counter!(METRIC_CACHE_MISS, "namespace" => namespace.to_owned()).increment(1);
}

fn record_read_expiry(namespace: &str, key: &str) {
    debug!(namespace, key, "Expired cache entry removed");
    counter!(
        METRIC_CACHE_EXPIRED,
        "namespace" => namespace.to_owned(),
        "path" => "read"
    )
    .increment(1);
}
