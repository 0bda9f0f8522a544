//! Scene cache system.
//!
//! A namespaced, TTL-keyed in-memory store for artifacts that are expensive
//! to derive again:
//!
//! - **Registry**: generic `get`/`set`/`has`/`delete`/`clear` over named namespaces
//! - **Sweep**: a periodic task that drops entries nobody read after expiry
//! - **Adapters**: bounds, material and texture façades that cache snapshots,
//!   never live engine objects
//!
//! ## Configuration
//!
//! TTLs and the sweep period come from `scenecache.toml`:
//!
//! ```toml
//! [cache]
//! default_ttl_ms = 300000
//! bounds_ttl_ms = 600000
//! # ... see config.rs for all options
//! ```

pub mod adapters;
mod config;
mod entry;
mod error;
mod lock;
mod namespace;
mod registry;
mod stats;
mod sweeper;

pub use adapters::{
    BOUNDS_NAMESPACE, BoundsCache, MATERIAL_NAMESPACE, MaterialCache, Snapshot, SnapshotCache,
    SnapshotPolicy, TEXTURE_NAMESPACE, TextureCache,
};
pub use config::CacheConfig;
pub use entry::Entry;
pub use error::CacheError;
pub use registry::CacheRegistry;
pub use stats::{CacheStats, EntryInfo, NamespaceStats, StatsReport};
