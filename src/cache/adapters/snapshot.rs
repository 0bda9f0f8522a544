//! Clone-on-write adapter shared by the material and texture caches.

use std::marker::PhantomData;
use std::time::Duration;

use crate::cache::config::CacheConfig;
use crate::cache::error::CacheError;
use crate::cache::registry::CacheRegistry;
use crate::domain::DomainError;

/// How to take an independent copy of a live engine object.
///
/// The copy must share no mutable state with the source: later edits to
/// either side must not be visible through the other.
pub trait Snapshot: Sized {
    fn snapshot(&self, cache_id: &str) -> Result<Self, DomainError>;
}

/// Where and for how long a snapshot type is cached.
pub trait SnapshotPolicy: Snapshot + Clone + Send + Sync + 'static {
    const NAMESPACE: &'static str;
    /// Noun used in error messages.
    const KIND: &'static str;

    fn ttl(config: &CacheConfig) -> Duration;
}

/// Stores snapshots of `T`, never the live object.
pub struct SnapshotCache<'a, T> {
    registry: &'a CacheRegistry,
    _kind: PhantomData<fn() -> T>,
}

impl<'a, T: SnapshotPolicy> SnapshotCache<'a, T> {
    pub(crate) fn new(registry: &'a CacheRegistry) -> Self {
        Self {
            registry,
            _kind: PhantomData,
        }
    }

    /// Snapshot `live` and cache the copy under `id`.
    ///
    /// If the snapshot fails nothing is written and any previous entry for
    /// `id` stays as it was.
    pub fn set(&self, id: &str, live: &T) -> Result<(), CacheError> {
        let copy = live
            .snapshot(id)
            .map_err(|source| CacheError::snapshot(T::KIND, id, source))?;
        self.registry
            .set_with_ttl(T::NAMESPACE, id, copy, T::ttl(self.registry.config()));
        Ok(())
    }

    /// An independent copy of the cached snapshot.
    pub fn get(&self, id: &str) -> Option<T> {
        self.registry.get(T::NAMESPACE, id)
    }

    pub fn has(&self, id: &str) -> bool {
        self.registry.has(T::NAMESPACE, id)
    }

    pub fn delete(&self, id: &str) -> bool {
        self.registry.delete(T::NAMESPACE, id)
    }
}
