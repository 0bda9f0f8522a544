use std::time::Duration;

use crate::cache::config::CacheConfig;
use crate::domain::DomainError;
use crate::domain::material::Material;

use super::snapshot::{Snapshot, SnapshotCache, SnapshotPolicy};

pub const MATERIAL_NAMESPACE: &str = "materials";

pub type MaterialCache<'a> = SnapshotCache<'a, Material>;

impl Snapshot for Material {
    /// Cached copies carry the cache id as their name.
    fn snapshot(&self, cache_id: &str) -> Result<Self, DomainError> {
        self.clone_named(cache_id)
    }
}

impl SnapshotPolicy for Material {
    const NAMESPACE: &'static str = MATERIAL_NAMESPACE;
    const KIND: &'static str = "material";

    fn ttl(config: &CacheConfig) -> Duration {
        config.material_ttl()
    }
}
