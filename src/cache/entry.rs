//! The unit of storage: a payload plus its expiry and access bookkeeping.

use std::time::Duration;

use tokio::time::Instant;

/// A cached payload with its time-to-live and access counters.
///
/// The TTL is fixed at insertion; reads never extend it.
#[derive(Debug, Clone)]
pub struct Entry<T> {
    data: T,
    created_at: Instant,
    ttl: Duration,
    access_count: u64,
    last_accessed_at: Instant,
}

impl<T> Entry<T> {
    pub fn new(data: T, ttl: Duration, now: Instant) -> Self {
        Self {
            data,
            created_at: now,
            ttl,
            access_count: 0,
            last_accessed_at: now,
        }
    }

    /// An entry is dead once its age reaches the TTL: the boundary is
    /// inclusive, so a read at exactly `created_at + ttl` misses.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        self.age_at(now) >= self.ttl
    }

    pub fn age_at(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created_at)
    }

    /// Record a successful read and hand out the payload.
    pub fn touch(&mut self, now: Instant) -> &T {
        self.access_count += 1;
        self.last_accessed_at = now;
        &self.data
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn access_count(&self) -> u64 {
        self.access_count
    }

    pub fn last_accessed_at(&self) -> Instant {
        self.last_accessed_at
    }
}
