//! Cache configuration.
//!
//! Controls default and per-domain TTLs and the sweep period. Loaded from the
//! `[cache]` section of `scenecache.toml`; every field is optional.

use std::time::Duration;

use serde::{Deserialize, Serialize};

// Default values for cache configuration
const DEFAULT_TTL_MS: u64 = 5 * 60 * 1000;
const DEFAULT_BOUNDS_TTL_MS: u64 = 10 * 60 * 1000;
const DEFAULT_MATERIAL_TTL_MS: u64 = 15 * 60 * 1000;
const DEFAULT_TEXTURE_TTL_MS: u64 = 30 * 60 * 1000;
const DEFAULT_SWEEP_INTERVAL_MS: u64 = 5 * 60 * 1000;

/// Cache configuration from `scenecache.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// TTL applied when a caller does not pass one (ms).
    pub default_ttl_ms: u64,
    /// TTL for mesh bounding volumes (ms).
    pub bounds_ttl_ms: u64,
    /// TTL for material snapshots (ms).
    pub material_ttl_ms: u64,
    /// TTL for texture snapshots (ms).
    pub texture_ttl_ms: u64,
    /// Period of the background sweep (ms).
    pub sweep_interval_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl_ms: DEFAULT_TTL_MS,
            bounds_ttl_ms: DEFAULT_BOUNDS_TTL_MS,
            material_ttl_ms: DEFAULT_MATERIAL_TTL_MS,
            texture_ttl_ms: DEFAULT_TEXTURE_TTL_MS,
            sweep_interval_ms: DEFAULT_SWEEP_INTERVAL_MS,
        }
    }
}

impl CacheConfig {
    pub fn default_ttl(&self) -> Duration {
        Duration::from_millis(self.default_ttl_ms)
    }

    pub fn bounds_ttl(&self) -> Duration {
        Duration::from_millis(self.bounds_ttl_ms)
    }

    pub fn material_ttl(&self) -> Duration {
        Duration::from_millis(self.material_ttl_ms)
    }

    pub fn texture_ttl(&self) -> Duration {
        Duration::from_millis(self.texture_ttl_ms)
    }

    /// Sweep period, clamped to at least one millisecond.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms.max(1))
    }
}
